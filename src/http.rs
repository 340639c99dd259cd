//! Transport primitives for token exchanges.
//!
//! [`TokenHttpClient`] is the exchanger's only dependency on an HTTP stack. Each token request
//! gets a fresh [`ResponseMetadataSlot`]; the transport records the HTTP status and, for
//! non-success responses, the raw body so the exchanger can surface the provider's own error
//! message even when the body is not a standard OAuth error document.

// std
use std::{ops::Deref, time::Duration as StdDuration};
// crates.io
use oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse};
// self
use crate::{
	_prelude::*,
	error::{ConfigError, ExchangeError},
};

/// Default timeout applied to every outbound request.
pub const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(10);

/// Largest error body retained in [`ResponseMetadata`].
const ERROR_BODY_LIMIT: usize = 16 * 1024;

/// Abstraction over HTTP transports able to execute token exchanges.
///
/// Implementations must be `Send + Sync + 'static` so a single transport can be shared by every
/// request handler, and the handles they return must own their state so request futures stay
/// `Send` for the whole exchange.
pub trait TokenHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// [`AsyncHttpClient`] handle tied to a [`ResponseMetadataSlot`].
	type Handle: for<'c> AsyncHttpClient<
			'c,
			Error = HttpClientError<Self::TransportError>,
			Future: 'c + Send,
		>
		+ 'static
		+ Send
		+ Sync;

	/// Builds a handle that records response metadata in `slot`.
	///
	/// Call [`ResponseMetadataSlot::take`] before dispatching and [`ResponseMetadataSlot::store`]
	/// once the status (and, on failure, the body) is known.
	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle;

	/// Converts a transport failure into an [`ExchangeError`]; timeouts must map to
	/// [`ExchangeError::Timeout`].
	fn map_transport_error(&self, error: HttpClientError<Self::TransportError>) -> ExchangeError;
}

/// Metadata captured from the most recent token endpoint response.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadata {
	/// HTTP status code, if a response arrived.
	pub status: Option<u16>,
	/// Raw body of a non-success response, truncated to a bounded size.
	pub error_body: Option<Vec<u8>>,
}

/// Thread-safe slot sharing [`ResponseMetadata`] between transport and error mapping.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadataSlot(Arc<Mutex<Option<ResponseMetadata>>>);
impl ResponseMetadataSlot {
	/// Stores metadata for the current request.
	pub fn store(&self, meta: ResponseMetadata) {
		*self.0.lock() = Some(meta);
	}

	/// Returns the captured metadata, consuming it from the slot.
	pub fn take(&self) -> Option<ResponseMetadata> {
		self.0.lock().take()
	}
}

/// Reqwest transport shared by the exchanger and the CRM API client.
///
/// Redirects are not followed; token endpoints answer directly.
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient(pub ReqwestClient);
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client whose requests fail with a timeout error after `timeout`.
	pub fn with_timeout(timeout: StdDuration) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder()
			.redirect(reqwest::redirect::Policy::none())
			.timeout(timeout)
			.build()?;

		Ok(Self(client))
	}
}
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl TokenHttpClient for ReqwestHttpClient {
	type Handle = InstrumentedHandle;
	type TransportError = ReqwestError;

	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
		InstrumentedHandle(Arc::new(InstrumentedHttpClient { client: self.0.clone(), slot }))
	}

	fn map_transport_error(&self, error: HttpClientError<ReqwestError>) -> ExchangeError {
		match error {
			HttpClientError::Reqwest(inner) if inner.is_timeout() => ExchangeError::Timeout,
			HttpClientError::Reqwest(inner) => ExchangeError::transport(*inner),
			HttpClientError::Http(inner) => ExchangeError::transport(inner),
			HttpClientError::Io(inner) => ExchangeError::transport(inner),
			HttpClientError::Other(message) =>
				ExchangeError::UnexpectedResponse { message, status: None },
			_ => ExchangeError::UnexpectedResponse {
				message: "HTTP client error occurred while calling the token endpoint".into(),
				status: None,
			},
		}
	}
}

struct InstrumentedHttpClient {
	client: ReqwestClient,
	slot: ResponseMetadataSlot,
}

/// Handle returned by [`ReqwestHttpClient::with_metadata`].
#[derive(Clone)]
pub struct InstrumentedHandle(Arc<InstrumentedHttpClient>);
impl<'c> AsyncHttpClient<'c> for InstrumentedHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let client = Arc::clone(&self.0);

		Box::pin(async move {
			client.slot.take();

			let response = client
				.client
				.execute(request.try_into().map_err(Box::new)?)
				.await
				.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let body = response.bytes().await.map_err(Box::new)?.to_vec();
			let error_body = (!status.is_success())
				.then(|| body.iter().copied().take(ERROR_BODY_LIMIT).collect::<Vec<_>>());

			client.slot.store(ResponseMetadata { status: Some(status.as_u16()), error_body });

			let mut response_new = HttpResponse::new(body);

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}
