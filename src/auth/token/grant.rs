//! Parsed token endpoint success payload and cache lifetime math.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Tokens issued by a successful exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenGrant {
	/// Short-lived access credential.
	pub access_token: TokenSecret,
	/// Long-lived refresh credential; absent when the provider keeps the previous one valid.
	pub refresh_token: Option<TokenSecret>,
	/// Provider-declared lifetime of the access token, in seconds.
	pub expires_in: u64,
}
impl TokenGrant {
	/// How long the access token may be served from cache.
	///
	/// Equals `round(expires_in * 0.75)` seconds so a cached token is dropped well before the
	/// provider stops honoring it.
	pub fn cache_ttl(&self) -> Duration {
		cache_ttl_secs(self.expires_in)
	}
}

/// `round(expires_in * 0.75)` computed in integers, half rounding up.
pub fn cache_ttl_secs(expires_in: u64) -> Duration {
	let secs = (expires_in.saturating_mul(3).saturating_add(2)) / 4;

	Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX))
}
