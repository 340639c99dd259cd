//! HubSpot OAuth 2.0 quickstart: authorization code exchange, a per-visitor access token cache
//! with refresh-on-demand, and a thin axum front end that reads one CRM record.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod flows;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod provider;
#[cfg(feature = "server")] pub mod server;
pub mod store;
#[doc(hidden)]
pub mod _preludet {
	//! Convenience re-exports and helpers shared by integration tests.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::{ScopeList, TokenSecret, VisitorId},
		flows::Broker,
		http::ReqwestHttpClient,
		provider::ProviderEndpoints,
	};

	/// Client identifier used by test brokers.
	pub const TEST_CLIENT_ID: &str = "client-it";
	/// Client secret used by test brokers.
	pub const TEST_CLIENT_SECRET: &str = "secret-it";

	/// Points every provider endpoint at a mock server rooted at `base`.
	pub fn mock_endpoints(base: &str) -> ProviderEndpoints {
		let base = Url::parse(base).expect("Mock server base URL should parse.");

		ProviderEndpoints {
			authorization: base.join("/oauth/authorize").expect("Authorize path should join."),
			token: base.join("/oauth/v1/token").expect("Token path should join."),
			api_base: base,
		}
	}

	/// Builds a reqwest-backed [`Broker`] whose endpoints live on the mock server at `base`.
	pub fn build_test_broker(base: &str) -> Broker<ReqwestHttpClient> {
		let http_client = ReqwestHttpClient::with_timeout(std::time::Duration::from_secs(5))
			.expect("Failed to build reqwest client for tests.");
		let redirect_uri = Url::parse("http://localhost:3000/oauth-callback")
			.expect("Redirect URI fixture should parse.");

		Broker::with_http_client(
			mock_endpoints(base),
			TEST_CLIENT_ID,
			TEST_CLIENT_SECRET,
			redirect_uri,
			ScopeList::default(),
			http_client,
		)
	}

	/// Stores `token` as `visitor`'s refresh credential, as a prior exchange would have.
	pub fn seed_refresh_token(
		broker: &Broker<ReqwestHttpClient>,
		visitor: &VisitorId,
		token: &str,
	) {
		broker.store.save(visitor, TokenSecret::new(token));
	}

	/// Refresh credential currently stored for `visitor`.
	pub fn stored_refresh_token(
		broker: &Broker<ReqwestHttpClient>,
		visitor: &VisitorId,
	) -> Option<String> {
		broker.store.fetch(visitor).map(|token| token.expose().to_owned())
	}

	/// Canonical token endpoint success body.
	pub fn token_body(access: &str, refresh: Option<&str>, expires_in: u64) -> String {
		match refresh {
			Some(refresh) => format!(
				"{{\"access_token\":\"{access}\",\"refresh_token\":\"{refresh}\",\"token_type\":\"bearer\",\"expires_in\":{expires_in}}}"
			),
			None => format!(
				"{{\"access_token\":\"{access}\",\"token_type\":\"bearer\",\"expires_in\":{expires_in}}}"
			),
		}
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, tokio as _, tower as _};
