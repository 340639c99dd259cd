//! Provider endpoints and grant labels.
//!
//! The quickstart talks to exactly one provider. Endpoints default to HubSpot's public hosts and
//! stay overridable so integration tests can point every call at a mock server.

// self
use crate::{_prelude::*, error::ConfigError};

/// HubSpot authorization endpoint the visitor's browser is redirected to.
pub const AUTHORIZATION_ENDPOINT: &str = "https://app.hubspot.com/oauth/authorize";
/// HubSpot token endpoint used by both grants.
pub const TOKEN_ENDPOINT: &str = "https://api.hubapi.com/oauth/v1/token";
/// Base URL of the CRM REST API.
pub const API_BASE: &str = "https://api.hubapi.com";

/// OAuth 2.0 grants the quickstart performs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GrantType {
	/// Authorization code received on the callback route.
	AuthorizationCode,
	/// Refresh of an expired access token.
	RefreshToken,
}
impl GrantType {
	/// Returns the RFC 6749 identifier for the grant type.
	pub const fn as_str(self) -> &'static str {
		match self {
			GrantType::AuthorizationCode => "authorization_code",
			GrantType::RefreshToken => "refresh_token",
		}
	}
}
impl Display for GrantType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Endpoint set for the provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderEndpoints {
	/// Browser-facing authorization endpoint.
	pub authorization: Url,
	/// Token endpoint for code exchanges and refreshes.
	pub token: Url,
	/// Base URL for CRM API calls.
	pub api_base: Url,
}
impl ProviderEndpoints {
	/// HubSpot production endpoints.
	pub fn hubspot() -> Result<Self, ConfigError> {
		Ok(Self {
			authorization: parse_endpoint("authorization endpoint", AUTHORIZATION_ENDPOINT)?,
			token: parse_endpoint("token endpoint", TOKEN_ENDPOINT)?,
			api_base: parse_endpoint("API base", API_BASE)?,
		})
	}
}

fn parse_endpoint(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
	Url::parse(raw).map_err(|source| ConfigError::InvalidUrl { name, source })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn hubspot_endpoints_match_public_hosts() {
		let endpoints =
			ProviderEndpoints::hubspot().expect("HubSpot endpoint constants should parse.");

		assert_eq!(endpoints.authorization.as_str(), AUTHORIZATION_ENDPOINT);
		assert_eq!(endpoints.token.as_str(), TOKEN_ENDPOINT);
		assert_eq!(endpoints.api_base.host_str(), Some("api.hubapi.com"));
	}

	#[test]
	fn grant_labels_follow_rfc_6749() {
		assert_eq!(GrantType::AuthorizationCode.to_string(), "authorization_code");
		assert_eq!(GrantType::RefreshToken.as_str(), "refresh_token");
	}
}
