//! Token endpoint facade over the `oauth2` crate.
//!
//! Both grants POST a form-encoded body carrying `grant_type`, `client_id`, and `client_secret`
//! plus the grant-specific fields. Responses are parsed into [`TokenGrant`]; every failure mode
//! is converted into an [`ExchangeError`] here so nothing else leaks past the exchanger.

pub use oauth2;

// std
use std::borrow::Cow;
// crates.io
use oauth2::{
	AuthType, AuthorizationCode, ClientId, ClientSecret, EndpointNotSet, EndpointSet,
	HttpClientError, RedirectUrl, RefreshToken, RequestTokenError, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError, BasicTokenResponse},
};
// self
use crate::{
	_prelude::*,
	auth::{TokenGrant, TokenSecret},
	error::ExchangeError,
	http::{ResponseMetadata, ResponseMetadataSlot, TokenHttpClient},
	provider::GrantType,
};

type ConfiguredBasicClient =
	BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Largest `expires_in` accepted from the provider (roughly 68 years).
const MAX_EXPIRES_IN: u64 = i32::MAX as u64;

/// Grant-specific half of a token request.
#[derive(Clone, Debug)]
pub enum ExchangeRequest {
	/// Authorization code received on the callback route.
	AuthorizationCode {
		/// Code from the `code` query parameter.
		code: String,
		/// Redirect URI registered with the provider; must match the one used to authorize.
		redirect_uri: Url,
	},
	/// Refresh of an expired access token.
	RefreshToken {
		/// Stored refresh credential.
		refresh_token: TokenSecret,
	},
}
impl ExchangeRequest {
	/// Builds an authorization-code request.
	pub fn authorization_code(code: impl Into<String>, redirect_uri: Url) -> Self {
		Self::AuthorizationCode { code: code.into(), redirect_uri }
	}

	/// Builds a refresh request.
	pub fn refresh(refresh_token: TokenSecret) -> Self {
		Self::RefreshToken { refresh_token }
	}

	/// Grant performed by this request.
	pub fn grant(&self) -> GrantType {
		match self {
			Self::AuthorizationCode { .. } => GrantType::AuthorizationCode,
			Self::RefreshToken { .. } => GrantType::RefreshToken,
		}
	}
}

/// Error document the provider returns on rejected token requests, e.g.
/// `{"status":"BAD_AUTH_CODE","message":"missing or unknown auth code"}`.
#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
	message: String,
}

pub(crate) struct BasicFacade<'a, C>
where
	C: ?Sized + TokenHttpClient,
{
	oauth_client: ConfiguredBasicClient,
	http_client: &'a C,
}
impl<'a, C> BasicFacade<'a, C>
where
	C: ?Sized + TokenHttpClient,
{
	pub(crate) fn new(
		token_endpoint: &Url,
		client_id: &str,
		client_secret: &str,
		http_client: &'a C,
	) -> Self {
		let oauth_client = BasicClient::new(ClientId::new(client_id.to_owned()))
			.set_client_secret(ClientSecret::new(client_secret.to_owned()))
			.set_token_uri(TokenUrl::from_url(token_endpoint.clone()))
			.set_auth_type(AuthType::RequestBody);

		Self { oauth_client, http_client }
	}

	pub(crate) async fn request_tokens(
		&self,
		request: &ExchangeRequest,
	) -> Result<TokenGrant, ExchangeError> {
		let meta = ResponseMetadataSlot::default();
		let handle = self.http_client.with_metadata(meta.clone());
		let response = match request {
			ExchangeRequest::AuthorizationCode { code, redirect_uri } =>
				self.oauth_client
					.exchange_code(AuthorizationCode::new(code.to_owned()))
					.set_redirect_uri(Cow::Owned(RedirectUrl::from_url(redirect_uri.clone())))
					.request_async(&handle)
					.await,
			ExchangeRequest::RefreshToken { refresh_token } => {
				let refresh_token = RefreshToken::new(refresh_token.expose().to_owned());

				self.oauth_client
					.exchange_refresh_token(&refresh_token)
					.request_async(&handle)
					.await
			},
		};

		response
			.map_err(|err| map_request_error(meta.take(), err, self.http_client))
			.and_then(map_token_response)
	}
}

fn map_token_response(response: BasicTokenResponse) -> Result<TokenGrant, ExchangeError> {
	let expires_in = response
		.expires_in()
		.ok_or(ExchangeError::InvalidResponse { reason: "expires_in is missing" })?
		.as_secs();

	if expires_in == 0 {
		return Err(ExchangeError::InvalidResponse { reason: "expires_in must be positive" });
	}
	if expires_in > MAX_EXPIRES_IN {
		return Err(ExchangeError::InvalidResponse {
			reason: "expires_in exceeds the supported range",
		});
	}

	Ok(TokenGrant {
		access_token: TokenSecret::new(response.access_token().secret().to_owned()),
		refresh_token: response
			.refresh_token()
			.map(|token| TokenSecret::new(token.secret().to_owned())),
		expires_in,
	})
}

fn map_request_error<C>(
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<C::TransportError>>,
	http_client: &C,
) -> ExchangeError
where
	C: ?Sized + TokenHttpClient,
{
	let status = meta.as_ref().and_then(|value| value.status);
	let body_message = meta
		.as_ref()
		.and_then(|value| value.error_body.as_deref())
		.and_then(provider_message);

	match err {
		RequestTokenError::ServerResponse(response) => ExchangeError::Provider {
			message: body_message.unwrap_or_else(|| oauth_error_message(&response)),
			status,
		},
		RequestTokenError::Parse(source, body) =>
			match body_message.or_else(|| provider_message(&body)) {
				Some(message) => ExchangeError::Provider { message, status },
				None => ExchangeError::MalformedResponse { source, status },
			},
		RequestTokenError::Request(error) => http_client.map_transport_error(error),
		RequestTokenError::Other(message) => match body_message {
			Some(message) => ExchangeError::Provider { message, status },
			None => ExchangeError::UnexpectedResponse { message, status },
		},
	}
}

fn oauth_error_message(response: &BasicErrorResponse) -> String {
	response
		.error_description()
		.cloned()
		.unwrap_or_else(|| response.error().as_ref().to_owned())
}

fn provider_message(body: &[u8]) -> Option<String> {
	serde_json::from_slice::<ProviderErrorBody>(body).ok().map(|body| body.message)
}
