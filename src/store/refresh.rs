//! Refresh credential store.

// self
use crate::{
	_prelude::*,
	auth::{TokenSecret, VisitorId},
};

type RefreshMap = Arc<RwLock<HashMap<VisitorId, TokenSecret>>>;

/// Visitor → refresh credential map.
///
/// Entries are inserted or overwritten by successful exchanges and never deleted. Reading a
/// credential back is crate-internal; callers outside the token core only learn whether one exists.
#[derive(Clone, Debug, Default)]
pub struct RefreshTokenStore(RefreshMap);
impl RefreshTokenStore {
	/// Stores `secret` for `visitor`, replacing any previous credential.
	pub(crate) fn save(&self, visitor: &VisitorId, secret: TokenSecret) {
		self.0.write().insert(visitor.clone(), secret);
	}

	/// Returns the stored credential for `visitor`.
	pub(crate) fn fetch(&self, visitor: &VisitorId) -> Option<TokenSecret> {
		self.0.read().get(visitor).cloned()
	}

	/// Returns true when `visitor` has completed an authorization-code exchange.
	pub fn contains(&self, visitor: &VisitorId) -> bool {
		self.0.read().contains_key(visitor)
	}

	/// Number of visitors with a stored credential.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns true when no credential is stored.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn save_overwrites_per_visitor() {
		let store = RefreshTokenStore::default();
		let alice = VisitorId::new("alice");
		let bob = VisitorId::new("bob");

		store.save(&alice, TokenSecret::new("refresh-a1"));
		store.save(&bob, TokenSecret::new("refresh-b1"));
		store.save(&alice, TokenSecret::new("refresh-a2"));

		assert_eq!(store.len(), 2);
		assert_eq!(store.fetch(&alice).as_ref().map(TokenSecret::expose), Some("refresh-a2"));
		assert_eq!(store.fetch(&bob).as_ref().map(TokenSecret::expose), Some("refresh-b1"));
		assert!(store.fetch(&VisitorId::new("carol")).is_none());
	}

	#[test]
	fn clones_share_state() {
		let store = RefreshTokenStore::default();
		let handle = store.clone();
		let visitor = VisitorId::new("visitor");

		handle.save(&visitor, TokenSecret::new("refresh"));

		assert!(store.contains(&visitor));
		assert!(!store.is_empty());
	}
}
