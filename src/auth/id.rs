//! Visitor identifiers supplied by the session layer.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

/// Opaque key identifying one browser session.
///
/// The value comes from whatever session mechanism fronts the app; the token lifecycle treats it
/// as a stable partition key and never inspects or validates its contents.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisitorId(String);
impl VisitorId {
	/// Wraps a session-provided identifier.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the raw identifier.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl Deref for VisitorId {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for VisitorId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for VisitorId {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl From<String> for VisitorId {
	fn from(value: String) -> Self {
		Self(value)
	}
}
impl From<&str> for VisitorId {
	fn from(value: &str) -> Self {
		Self(value.to_owned())
	}
}
impl From<VisitorId> for String {
	fn from(value: VisitorId) -> Self {
		value.0
	}
}
impl Debug for VisitorId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Visitor({})", self.0)
	}
}
impl Display for VisitorId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
