//! Token lifecycle orchestration.
//!
//! [`Broker`] owns the visitor-keyed [`RefreshTokenStore`] and [`AccessTokenCache`] together with
//! the transport and client credentials. Each submodule adds one piece of the lifecycle:
//!
//! - `authorize` builds the provider authorization URL.
//! - `callback` completes authorization with the code from the redirect.
//! - `exchange` performs a token request and records the issued credentials.
//! - `resolve` serves cached access tokens and refreshes them on demand.

pub mod authorize;
pub mod callback;
pub mod exchange;
pub mod resolve;

mod metrics;

pub use authorize::*;
pub use metrics::ExchangeMetrics;

// self
use crate::{
	_prelude::*,
	api::CrmClient,
	auth::{ScopeList, VisitorId},
	config::AppConfig,
	http::{ReqwestHttpClient, TokenHttpClient},
	provider::ProviderEndpoints,
	store::{AccessTokenCache, RefreshTokenStore},
};

type RefreshGuards = Arc<Mutex<HashMap<VisitorId, Arc<AsyncMutex<()>>>>>;

/// Broker specialized for the crate's reqwest transport.
pub type ReqwestBroker = Broker<ReqwestHttpClient>;

/// Coordinates the token lifecycle for every visitor against a single provider.
///
/// Cloning is cheap and every clone shares the same store, cache, transport, and counters, so a
/// broker can be handed to each request handler directly.
pub struct Broker<C = ReqwestHttpClient>
where
	C: ?Sized + TokenHttpClient,
{
	/// HTTP client used for every token request.
	pub http_client: Arc<C>,
	/// Provider endpoints.
	pub endpoints: ProviderEndpoints,
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// Redirect URI registered with the provider.
	pub redirect_uri: Url,
	/// Scopes requested during authorization.
	pub scopes: ScopeList,
	pub(crate) store: RefreshTokenStore,
	/// Visitor → access credential cache.
	pub cache: AccessTokenCache,
	/// Exchange counters shared by all clones.
	pub exchange_metrics: Arc<ExchangeMetrics>,
	client_secret: String,
	coalesce_refreshes: bool,
	refresh_guards: RefreshGuards,
}
impl<C> Broker<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Creates a broker that uses the caller-provided transport.
	pub fn with_http_client(
		endpoints: ProviderEndpoints,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		redirect_uri: Url,
		scopes: ScopeList,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			endpoints,
			client_id: client_id.into(),
			redirect_uri,
			scopes,
			store: Default::default(),
			cache: Default::default(),
			exchange_metrics: Default::default(),
			client_secret: client_secret.into(),
			coalesce_refreshes: false,
			refresh_guards: Default::default(),
		}
	}

	/// Serializes refreshes per visitor so concurrent cache misses share one exchange.
	///
	/// Off by default: concurrent misses for the same visitor may each refresh. Turn it on when
	/// the provider rotates refresh tokens on use.
	pub fn with_refresh_coalescing(mut self, enabled: bool) -> Self {
		self.coalesce_refreshes = enabled;

		self
	}

	/// Returns true when refresh coalescing is enabled.
	pub fn coalesces_refreshes(&self) -> bool {
		self.coalesce_refreshes
	}
}
impl Broker<ReqwestHttpClient> {
	/// Creates a reqwest-backed broker from the app configuration.
	pub fn from_config(config: &AppConfig) -> Result<Self> {
		let http_client = ReqwestHttpClient::with_timeout(config.http_timeout)?;

		Ok(Self::with_http_client(
			config.endpoints.clone(),
			config.client_id.clone(),
			config.client_secret.clone(),
			config.redirect_uri.clone(),
			config.scopes.clone(),
			http_client,
		))
	}

	/// CRM API client sharing this broker's connection pool and timeout.
	pub fn crm_client(&self) -> CrmClient {
		CrmClient::new(self.http_client.0.clone(), self.endpoints.api_base.clone())
	}
}
impl<C> Clone for Broker<C>
where
	C: ?Sized + TokenHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			endpoints: self.endpoints.clone(),
			client_id: self.client_id.clone(),
			redirect_uri: self.redirect_uri.clone(),
			scopes: self.scopes.clone(),
			store: self.store.clone(),
			cache: self.cache.clone(),
			exchange_metrics: self.exchange_metrics.clone(),
			client_secret: self.client_secret.clone(),
			coalesce_refreshes: self.coalesce_refreshes,
			refresh_guards: self.refresh_guards.clone(),
		}
	}
}
impl<C> Debug for Broker<C>
where
	C: ?Sized + TokenHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Broker")
			.field("endpoints", &self.endpoints)
			.field("client_id", &self.client_id)
			.field("client_secret_set", &!self.client_secret.is_empty())
			.field("redirect_uri", &self.redirect_uri)
			.field("scopes", &self.scopes)
			.field("coalesce_refreshes", &self.coalesce_refreshes)
			.finish()
	}
}
