//! Visitor identification for the web surface.
//!
//! The token core only needs a stable [`VisitorId`] per browser. [`CookieVisitorIds`] keeps it in
//! an `sid` cookie and mints a random one on the first request. Only ids this process handed out
//! are honored; any other `sid` value is replaced, so a client cannot pick the id it runs under.

// std
use std::collections::HashSet;
// crates.io
use axum::http::{HeaderMap, HeaderValue, header::COOKIE};
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{_prelude::*, auth::VisitorId};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "sid";

const SESSION_ID_LEN: usize = 32;

/// Visitor resolved for one request.
#[derive(Clone, Debug)]
pub struct VisitorSession {
	/// Stable identifier for the browser.
	pub id: VisitorId,
	/// `Set-Cookie` value to attach to the response when the id was just issued.
	pub set_cookie: Option<HeaderValue>,
}

/// Maps incoming requests to visitor identifiers.
pub trait VisitorIdProvider
where
	Self: 'static + Send + Sync,
{
	/// Resolves the visitor behind a request, issuing a new identity if needed.
	fn resolve(&self, headers: &HeaderMap) -> VisitorSession;
}

/// Cookie-backed [`VisitorIdProvider`].
///
/// Clones share the set of issued ids. The set lives as long as the process, like the token
/// store it keys into.
#[derive(Clone, Debug, Default)]
pub struct CookieVisitorIds {
	issued: Arc<RwLock<HashSet<String>>>,
}
impl CookieVisitorIds {
	/// Mints a fresh id, records it as issued, and returns it.
	pub fn issue(&self) -> VisitorId {
		let mut issued = self.issued.write();

		loop {
			let id = generate_session_id();

			if issued.insert(id.clone()) {
				return VisitorId::new(id);
			}
		}
	}

	/// Returns true when `id` was handed out by this provider.
	pub fn is_issued(&self, id: &str) -> bool {
		self.issued.read().contains(id)
	}

	fn existing(&self, headers: &HeaderMap) -> Option<VisitorId> {
		headers
			.get_all(COOKIE)
			.iter()
			.filter_map(|value| value.to_str().ok())
			.flat_map(|value| value.split(';'))
			.filter_map(|pair| pair.trim().split_once('='))
			.filter(|(name, _)| *name == SESSION_COOKIE)
			.map(|(_, value)| value.trim())
			.find(|value| is_session_id(value) && self.is_issued(value))
			.map(VisitorId::from)
	}
}
impl VisitorIdProvider for CookieVisitorIds {
	fn resolve(&self, headers: &HeaderMap) -> VisitorSession {
		if let Some(id) = self.existing(headers) {
			return VisitorSession { id, set_cookie: None };
		}

		let id = self.issue();
		// Alphanumeric ids are always valid header bytes.
		let set_cookie = HeaderValue::from_str(&format!(
			"{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
			id.as_str()
		))
		.ok();

		VisitorSession { id, set_cookie }
	}
}

fn generate_session_id() -> String {
	rand::rng().sample_iter(Alphanumeric).take(SESSION_ID_LEN).map(char::from).collect()
}

fn is_session_id(value: &str) -> bool {
	value.len() == SESSION_ID_LEN && value.bytes().all(|b| b.is_ascii_alphanumeric())
}
