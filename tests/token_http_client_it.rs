// self
use crm_oauth_quickstart::{
	_preludet::*,
	auth::{ScopeList, TokenSecret, VisitorId},
	error::ExchangeError,
	flows::Broker,
	http::{ResponseMetadata, ResponseMetadataSlot, TokenHttpClient},
	oauth::{
		ExchangeRequest,
		oauth2::{
			AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse,
			http::{HeaderValue, StatusCode, header::CONTENT_TYPE},
		},
	},
};

#[derive(Debug)]
enum FakeTransportError {
	Reset,
}
impl Display for FakeTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Reset => write!(f, "Connection reset by fake transport."),
		}
	}
}
impl StdError for FakeTransportError {}

#[derive(Clone, Copy, Debug)]
enum Reply {
	Json(u16, &'static str),
	Reset,
}

#[derive(Clone)]
struct FakeHttpClient {
	reply: Reply,
	requests: Arc<Mutex<Vec<String>>>,
}
impl FakeHttpClient {
	fn new(reply: Reply) -> Self {
		Self { reply, requests: Default::default() }
	}

	fn recorded_bodies(&self) -> Vec<String> {
		self.requests.lock().clone()
	}
}
impl TokenHttpClient for FakeHttpClient {
	type Handle = FakeHttpHandle;
	type TransportError = FakeTransportError;

	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
		FakeHttpHandle { slot, reply: self.reply, requests: self.requests.clone() }
	}

	fn map_transport_error(&self, error: HttpClientError<FakeTransportError>) -> ExchangeError {
		match error {
			HttpClientError::Reqwest(inner) => ExchangeError::transport(*inner),
			other => ExchangeError::UnexpectedResponse { message: other.to_string(), status: None },
		}
	}
}

struct FakeHttpHandle {
	slot: ResponseMetadataSlot,
	reply: Reply,
	requests: Arc<Mutex<Vec<String>>>,
}
impl<'a> AsyncHttpClient<'a> for FakeHttpHandle {
	type Error = HttpClientError<FakeTransportError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'a + Send + Sync>>;

	fn call(&'a self, request: HttpRequest) -> Self::Future {
		let slot = self.slot.clone();
		let reply = self.reply;

		self.requests.lock().push(String::from_utf8_lossy(request.body()).into_owned());

		Box::pin(async move {
			assert!(
				slot.take().is_none(),
				"ResponseMetadataSlot must be clear before dispatching a request."
			);

			match reply {
				Reply::Json(status, body) => {
					let status = StatusCode::from_u16(status).expect("Fixture status is valid.");
					let error_body = (!status.is_success()).then(|| body.as_bytes().to_vec());

					slot.store(ResponseMetadata { status: Some(status.as_u16()), error_body });

					let mut response = HttpResponse::new(body.as_bytes().to_vec());

					*response.status_mut() = status;
					response
						.headers_mut()
						.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

					Ok(response)
				},
				Reply::Reset => Err(HttpClientError::Reqwest(Box::new(FakeTransportError::Reset))),
			}
		})
	}
}

fn build_broker(http_client: FakeHttpClient) -> Broker<FakeHttpClient> {
	Broker::with_http_client(
		mock_endpoints("https://mock.example.com"),
		TEST_CLIENT_ID,
		TEST_CLIENT_SECRET,
		Url::parse("http://localhost:3000/oauth-callback").expect("Redirect URI should parse."),
		ScopeList::default(),
		http_client,
	)
}

#[tokio::test]
async fn refresh_posts_client_credentials_in_the_form_body() {
	let http_client = FakeHttpClient::new(Reply::Json(
		200,
		"{\"access_token\":\"access-2\",\"token_type\":\"bearer\",\"expires_in\":1800}",
	));
	let broker = build_broker(http_client.clone());
	let visitor = VisitorId::new("visitor-fake");
	let token = broker
		.exchange(&visitor, ExchangeRequest::refresh(TokenSecret::new("refresh-1")))
		.await
		.expect("Canned success should map to a token.");

	assert_eq!(token.expose(), "access-2");

	let bodies = http_client.recorded_bodies();

	assert_eq!(bodies.len(), 1);

	for field in [
		"grant_type=refresh_token",
		"refresh_token=refresh-1",
		"client_id=client-it",
		"client_secret=secret-it",
	] {
		assert!(bodies[0].contains(field), "Form body should contain `{field}`: {}", bodies[0]);
	}
}

#[tokio::test]
async fn provider_message_and_status_come_from_captured_metadata() {
	let http_client = FakeHttpClient::new(Reply::Json(
		400,
		"{\"status\":\"BAD_AUTH_CODE\",\"message\":\"missing or unknown auth code\"}",
	));
	let broker = build_broker(http_client);
	let visitor = VisitorId::new("visitor-fake");
	let err = broker
		.complete_authorization(&visitor, "stale-code")
		.await
		.expect_err("Provider rejection should surface.");

	match err {
		ExchangeError::Provider { message, status } => {
			assert_eq!(message, "missing or unknown auth code");
			assert_eq!(status, Some(400));
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}

	assert!(!broker.is_authorized(&visitor));
	assert_eq!(broker.exchange_metrics.failures(), 1);
}

#[tokio::test]
async fn transport_failures_go_through_the_client_mapper() {
	let broker = build_broker(FakeHttpClient::new(Reply::Reset));
	let visitor = VisitorId::new("visitor-fake");
	let err = broker
		.exchange(&visitor, ExchangeRequest::refresh(TokenSecret::new("refresh-1")))
		.await
		.expect_err("Transport failure should surface.");

	match err {
		ExchangeError::Transport { source } =>
			assert_eq!(source.to_string(), "Connection reset by fake transport."),
		other => panic!("Unexpected error variant: {other:?}."),
	}

	assert!(broker.cache.peek(&visitor).is_none());
}
