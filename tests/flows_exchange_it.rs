// std
use std::time::Duration as StdDuration;
// crates.io
use httpmock::prelude::*;
// self
use crm_oauth_quickstart::{
	_preludet::*,
	auth::{ScopeList, TokenSecret, VisitorId},
	error::ExchangeError,
	flows::{Broker, ReqwestBroker},
	http::ReqwestHttpClient,
};

const TOKEN_PATH: &str = "/oauth/v1/token";

#[tokio::test]
async fn code_exchange_stores_tokens_and_serves_from_cache() {
	let server = MockServer::start_async().await;
	let broker = build_test_broker(&server.base_url());
	let visitor = VisitorId::new("visitor-code");
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(TOKEN_PATH)
				.header("content-type", "application/x-www-form-urlencoded")
				.form_urlencoded_tuple("grant_type", "authorization_code")
				.form_urlencoded_tuple("code", "code-1")
				.form_urlencoded_tuple("redirect_uri", "http://localhost:3000/oauth-callback")
				.form_urlencoded_tuple("client_id", TEST_CLIENT_ID)
				.form_urlencoded_tuple("client_secret", TEST_CLIENT_SECRET);
			then.status(200)
				.header("content-type", "application/json")
				.body(token_body("access-1", Some("refresh-1"), 1800));
		})
		.await;

	broker
		.complete_authorization(&visitor, "code-1")
		.await
		.expect("Authorization code exchange should succeed.");

	assert!(broker.is_authorized(&visitor));
	assert_eq!(stored_refresh_token(&broker, &visitor).as_deref(), Some("refresh-1"));

	let cached = broker.cache.peek(&visitor).expect("Access token should be cached.");
	let ttl = cached.expires_at - OffsetDateTime::now_utc();

	assert!(ttl <= Duration::seconds(1350) && ttl > Duration::seconds(1340), "TTL was {ttl}.");

	let token = broker.access_token(&visitor).await.expect("Cached token should be served.");

	assert_eq!(token.expose(), "access-1");

	mock.assert_calls_async(1).await;

	assert_eq!(broker.exchange_metrics.code_exchanges(), 1);
	assert_eq!(broker.exchange_metrics.refreshes(), 0);
}

#[tokio::test]
async fn provider_error_leaves_existing_state_untouched() {
	let server = MockServer::start_async().await;
	let broker = build_test_broker(&server.base_url());
	let visitor = VisitorId::new("visitor-invalid");

	seed_refresh_token(&broker, &visitor, "refresh-old");
	broker.cache.insert(&visitor, TokenSecret::new("access-old"), Duration::minutes(10));

	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"status\":\"BAD_AUTH_CODE\",\"message\":\"invalid_grant\"}");
		})
		.await;
	let err = broker
		.complete_authorization(&visitor, "bad-code")
		.await
		.expect_err("Rejected code should surface as an exchange error.");

	mock.assert_async().await;

	assert!(matches!(
		err,
		ExchangeError::Provider { ref message, status: Some(400) } if message == "invalid_grant"
	));
	assert_eq!(err.message(), "invalid_grant");
	assert_eq!(stored_refresh_token(&broker, &visitor).as_deref(), Some("refresh-old"));
	assert_eq!(
		broker.cache.peek(&visitor).map(|cached| cached.token.expose().to_owned()).as_deref(),
		Some("access-old")
	);
	assert_eq!(broker.exchange_metrics.failures(), 1);
}

#[tokio::test]
async fn standard_oauth_error_documents_are_understood() {
	let server = MockServer::start_async().await;
	let broker = build_test_broker(&server.base_url());
	let visitor = VisitorId::new("visitor-oauth-error");
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_grant\",\"error_description\":\"code expired\"}");
		})
		.await;
	let err = broker
		.complete_authorization(&visitor, "old-code")
		.await
		.expect_err("Rejected code should surface as an exchange error.");

	assert_eq!(err.message(), "code expired");
	assert_eq!(err.status(), Some(400));
	assert!(!broker.is_authorized(&visitor));
}

#[tokio::test]
async fn malformed_success_body_is_a_parse_error() {
	let server = MockServer::start_async().await;
	let broker = build_test_broker(&server.base_url());
	let visitor = VisitorId::new("visitor-malformed");
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200).header("content-type", "application/json").body("{\"unexpected\":1}");
		})
		.await;
	let err = broker
		.complete_authorization(&visitor, "code")
		.await
		.expect_err("Malformed body should fail.");

	assert!(matches!(err, ExchangeError::MalformedResponse { status: Some(200), .. }));
	assert!(!broker.is_authorized(&visitor));
	assert!(broker.cache.is_empty());
}

#[tokio::test]
async fn zero_expiry_is_rejected() {
	let server = MockServer::start_async().await;
	let broker = build_test_broker(&server.base_url());
	let visitor = VisitorId::new("visitor-zero");
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body(token_body("access", Some("refresh"), 0));
		})
		.await;
	let err = broker
		.complete_authorization(&visitor, "code")
		.await
		.expect_err("Zero expiry should be rejected.");

	assert!(matches!(err, ExchangeError::InvalidResponse { .. }));
	assert!(!broker.is_authorized(&visitor));
}

#[tokio::test]
async fn slow_token_endpoint_times_out() {
	let server = MockServer::start_async().await;
	let http_client = ReqwestHttpClient::with_timeout(StdDuration::from_millis(200))
		.expect("Reqwest client should build with a timeout.");
	let broker: ReqwestBroker = Broker::with_http_client(
		mock_endpoints(&server.base_url()),
		TEST_CLIENT_ID,
		TEST_CLIENT_SECRET,
		Url::parse("http://localhost:3000/oauth-callback").expect("Redirect URI should parse."),
		ScopeList::default(),
		http_client,
	);
	let visitor = VisitorId::new("visitor-slow");
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.delay(StdDuration::from_secs(2))
				.body(token_body("late", Some("late"), 1800));
		})
		.await;
	let err = broker
		.complete_authorization(&visitor, "code")
		.await
		.expect_err("Slow endpoint should time out.");

	assert!(matches!(err, ExchangeError::Timeout));
	assert!(!broker.is_authorized(&visitor));
}
