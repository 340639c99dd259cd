//! Environment-sourced application configuration.
//!
//! | Variable            | Default                      |
//! |---------------------|------------------------------|
//! | `PORT`              | `3000`                       |
//! | `BASE_URL`          | `http://localhost:{PORT}`    |
//! | `CLIENT_ID`         | required                     |
//! | `CLIENT_SECRET`     | required                     |
//! | `SCOPE`             | `crm.objects.contacts.read`  |
//! | `HTTP_TIMEOUT_SECS` | `10`                         |
//!
//! The redirect URI is always `{BASE_URL}/oauth-callback`.

// std
use std::time::Duration as StdDuration;
// self
use crate::{
	_prelude::*,
	auth::ScopeList,
	error::ConfigError,
	http::DEFAULT_TIMEOUT,
	provider::ProviderEndpoints,
};

/// Port used when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 3000;
/// Path of the OAuth callback route, appended to `BASE_URL` to form the redirect URI.
pub const CALLBACK_PATH: &str = "/oauth-callback";

/// Settings the app needs at startup.
#[derive(Clone)]
pub struct AppConfig {
	/// Listening port.
	pub port: u16,
	/// Public base URL of the app.
	pub base_url: Url,
	/// OAuth client identifier.
	pub client_id: String,
	/// OAuth client secret.
	pub client_secret: String,
	/// Scopes requested during authorization.
	pub scopes: ScopeList,
	/// `{BASE_URL}/oauth-callback`.
	pub redirect_uri: Url,
	/// Timeout applied to every outbound request.
	pub http_timeout: StdDuration,
	/// Provider endpoints.
	pub endpoints: ProviderEndpoints,
}
impl AppConfig {
	/// Reads the configuration from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Reads the configuration through `lookup`, which returns the raw value of a variable.
	///
	/// Blank values are treated as unset.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let var = |name: &str| lookup(name).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());
		let port = match var("PORT") {
			Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::InvalidVar {
				name: "PORT",
				reason: e.to_string(),
			})?,
			None => DEFAULT_PORT,
		};
		let raw_base_url = var("BASE_URL").unwrap_or_else(|| format!("http://localhost:{port}"));
		let base_url = Url::parse(&raw_base_url)
			.map_err(|source| ConfigError::InvalidUrl { name: "BASE_URL", source })?;
		let redirect_uri = redirect_uri_for(&raw_base_url)?;
		let client_id = var("CLIENT_ID").ok_or(ConfigError::MissingVar { name: "CLIENT_ID" })?;
		let client_secret =
			var("CLIENT_SECRET").ok_or(ConfigError::MissingVar { name: "CLIENT_SECRET" })?;
		let scopes = match var("SCOPE") {
			Some(raw) => ScopeList::parse(&raw).map_err(|e| ConfigError::InvalidVar {
				name: "SCOPE",
				reason: e.to_string(),
			})?,
			None => ScopeList::default(),
		};
		let http_timeout = match var("HTTP_TIMEOUT_SECS") {
			Some(raw) => match raw.parse::<u64>() {
				Ok(0) => Err(ConfigError::InvalidVar {
					name: "HTTP_TIMEOUT_SECS",
					reason: "timeout must be positive".into(),
				}),
				Ok(secs) => Ok(StdDuration::from_secs(secs)),
				Err(e) =>
					Err(ConfigError::InvalidVar { name: "HTTP_TIMEOUT_SECS", reason: e.to_string() }),
			}?,
			None => DEFAULT_TIMEOUT,
		};

		Ok(Self {
			port,
			base_url,
			client_id,
			client_secret,
			scopes,
			redirect_uri,
			http_timeout,
			endpoints: ProviderEndpoints::hubspot()?,
		})
	}
}
impl Debug for AppConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AppConfig")
			.field("port", &self.port)
			.field("base_url", &self.base_url)
			.field("client_id", &self.client_id)
			.field("client_secret_set", &!self.client_secret.is_empty())
			.field("scopes", &self.scopes)
			.field("redirect_uri", &self.redirect_uri)
			.field("http_timeout", &self.http_timeout)
			.finish()
	}
}

/// Loads a `.env` file from the working directory when one exists.
///
/// Variables already present in the environment win.
#[cfg(feature = "server")]
pub fn load_dotenv() -> Result<(), ConfigError> {
	match dotenvy::dotenv() {
		Ok(_path) => {
			#[cfg(feature = "tracing")]
			tracing::debug!(path = %_path.display(), "Loaded .env file.");

			Ok(())
		},
		Err(e) if e.not_found() => Ok(()),
		Err(e) => Err(ConfigError::InvalidVar { name: ".env", reason: e.to_string() }),
	}
}

// Plain concatenation keeps any path prefix on the base URL, matching `{BASE_URL}/oauth-callback`.
fn redirect_uri_for(base_url: &str) -> Result<Url, ConfigError> {
	let raw = format!("{}{CALLBACK_PATH}", base_url.trim_end_matches('/'));

	Url::parse(&raw).map_err(|source| ConfigError::InvalidUrl { name: "BASE_URL", source })
}
