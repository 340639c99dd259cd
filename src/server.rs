//! Thin axum front end over the token core.
//!
//! | Route                   | Behavior                                                        |
//! |-------------------------|-----------------------------------------------------------------|
//! | `GET /install`          | 302 to the provider's authorization URL.                        |
//! | `GET /oauth-callback`   | Exchanges `code`; 302 to `/` or to `/error?msg=...`.            |
//! | `GET /`                 | Install link, or the first contact's name once authorized.      |
//! | `GET /error?msg=...`    | Echoes the message, HTML-escaped.                               |

pub mod html;
pub mod session;

pub use session::*;

// std
use std::net::{Ipv4Addr, SocketAddr};
// crates.io
use axum::{
	Router,
	extract::{Query, State},
	http::{
		HeaderMap, HeaderValue, StatusCode,
		header::{LOCATION, SET_COOKIE},
	},
	response::{Html, IntoResponse, Response},
	routing::get,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	api::CrmClient,
	auth::VisitorId,
	config::AppConfig,
	flows::ReqwestBroker,
	server::html::HomeView,
};

/// Shared state handed to every route.
#[derive(Clone)]
pub struct AppState {
	/// Token broker.
	pub broker: ReqwestBroker,
	/// CRM API client.
	pub crm: CrmClient,
	/// Visitor identification strategy.
	pub visitors: Arc<dyn VisitorIdProvider>,
}
impl AppState {
	/// Creates state around `broker` with cookie-backed visitor ids.
	pub fn new(broker: ReqwestBroker) -> Self {
		let crm = broker.crm_client();

		Self { broker, crm, visitors: Arc::new(CookieVisitorIds::default()) }
	}

	/// Replaces the visitor identification strategy.
	pub fn with_visitor_ids(mut self, visitors: impl VisitorIdProvider) -> Self {
		self.visitors = Arc::new(visitors);

		self
	}
}

#[derive(Debug, Deserialize)]
struct CallbackParams {
	code: Option<String>,
	error: Option<String>,
	error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorParams {
	msg: Option<String>,
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/", get(home))
		.route("/install", get(install))
		.route("/oauth-callback", get(oauth_callback))
		.route("/error", get(error_page))
		.layer(TraceLayer::new_for_http())
		.with_state(state)
}

/// Binds `0.0.0.0:{PORT}` and serves until Ctrl-C.
pub async fn serve(config: AppConfig) -> Result<()> {
	let broker = ReqwestBroker::from_config(&config)?;
	let listener = TcpListener::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port))).await?;

	tracing::info!("Server running on {}", config.base_url);

	axum::serve(listener, router(AppState::new(broker)))
		.with_graceful_shutdown(shutdown_signal())
		.await?;

	Ok(())
}

async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		tracing::error!(error = %e, "Failed to listen for Ctrl-C; serving until killed.");

		std::future::pending::<()>().await;
	}

	tracing::info!("Shutting down.");
}

async fn install(State(state): State<AppState>, headers: HeaderMap) -> Response {
	let session = state.visitors.resolve(&headers);

	with_session(found(state.broker.authorization_url().as_str()), &session)
}

async fn oauth_callback(
	State(state): State<AppState>,
	headers: HeaderMap,
	Query(params): Query<CallbackParams>,
) -> Response {
	let session = state.visitors.resolve(&headers);
	let response = match params.code.as_deref().filter(|code| !code.is_empty()) {
		Some(code) => match state.broker.complete_authorization(&session.id, code).await {
			Ok(()) => found("/"),
			Err(e) => error_redirect(&e.message()),
		},
		None => {
			let message = params
				.error_description
				.or(params.error)
				.unwrap_or_else(|| "Missing authorization code.".into());

			tracing::warn!(%message, "Callback arrived without an authorization code.");

			error_redirect(&message)
		},
	};

	with_session(response, &session)
}

async fn home(State(state): State<AppState>, headers: HeaderMap) -> Response {
	let session = state.visitors.resolve(&headers);
	let view = home_view(&state, &session.id).await;

	with_session(Html(html::home(&view)).into_response(), &session)
}

async fn home_view(state: &AppState, visitor: &VisitorId) -> HomeView {
	if !state.broker.is_authorized(visitor) {
		return HomeView::Install;
	}

	let token = match state.broker.access_token(visitor).await {
		Ok(token) => token,
		Err(Error::NotAuthorized { .. }) => return HomeView::Install,
		Err(Error::Exchange(e)) => return HomeView::Failure(e.message()),
		Err(e) => return HomeView::Failure(e.to_string()),
	};

	match state.crm.first_contact(&token).await {
		Ok(Some(contact)) => HomeView::Contact(contact.display_name()),
		Ok(None) => HomeView::NoContacts,
		Err(e) => HomeView::Failure(e.to_string()),
	}
}

async fn error_page(Query(params): Query<ErrorParams>) -> Html<String> {
	Html(html::error(params.msg.as_deref().unwrap_or_default()))
}

fn found(location: &str) -> Response {
	match HeaderValue::from_str(location) {
		Ok(location) => (StatusCode::FOUND, [(LOCATION, location)]).into_response(),
		Err(e) => {
			tracing::error!(error = %e, "Redirect target is not a valid header value.");

			StatusCode::INTERNAL_SERVER_ERROR.into_response()
		},
	}
}

fn error_redirect(message: &str) -> Response {
	let msg = form_urlencoded::byte_serialize(message.as_bytes()).collect::<String>();

	found(&format!("/error?msg={msg}"))
}

fn with_session(mut response: Response, session: &VisitorSession) -> Response {
	if let Some(cookie) = &session.set_cookie {
		response.headers_mut().append(SET_COOKIE, cookie.clone());
	}

	response
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn error_redirect_encodes_the_message() {
		let response = error_redirect("invalid_grant: code & state <bad>");

		assert_eq!(response.status(), StatusCode::FOUND);
		assert_eq!(
			response.headers().get(LOCATION).and_then(|v| v.to_str().ok()),
			Some("/error?msg=invalid_grant%3A+code+%26+state+%3Cbad%3E")
		);
	}

	#[test]
	fn new_sessions_set_a_cookie_once() {
		let session = CookieVisitorIds::default().resolve(&HeaderMap::new());
		let response = with_session(found("/"), &session);

		assert_eq!(response.headers().get_all(SET_COOKIE).iter().count(), 1);

		let known = VisitorSession { id: VisitorId::new("abc"), set_cookie: None };

		assert!(with_session(found("/"), &known).headers().get(SET_COOKIE).is_none());
	}
}
