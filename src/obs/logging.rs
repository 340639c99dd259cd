// crates.io
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "crm_oauth_quickstart=info,tower_http=info";

/// Installs the `color-eyre` report handler and a global fmt subscriber.
///
/// `RUST_LOG` overrides [`DEFAULT_LOG_FILTER`]. Call once, before serving.
pub fn init_logging() -> color_eyre::Result<()> {
	color_eyre::install()?;

	tracing_subscriber::registry()
		.with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
		.with(tracing_subscriber::fmt::layer())
		.try_init()?;

	Ok(())
}
