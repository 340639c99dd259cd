//! Runs the HubSpot OAuth 2.0 quickstart server.

// crates.io
use crm_oauth_quickstart::{
	config::{self, AppConfig},
	obs, server,
};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	config::load_dotenv()?;
	obs::init_logging()?;

	let config = AppConfig::from_env()?;

	tracing::debug!(?config, "Loaded configuration.");

	server::serve(config).await?;

	Ok(())
}
