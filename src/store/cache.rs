//! Self-expiring access credential cache.

// self
use crate::{
	_prelude::*,
	auth::{TokenSecret, VisitorId},
};

type CacheMap = Arc<RwLock<HashMap<VisitorId, CachedAccessToken>>>;

/// Access credential plus the instant it stops being servable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CachedAccessToken {
	/// Access credential.
	pub token: TokenSecret,
	/// First instant at which the entry is considered expired.
	pub expires_at: OffsetDateTime,
}
impl CachedAccessToken {
	/// Returns true once `instant` reaches the expiry.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.expires_at
	}
}

/// Visitor → access credential map with per-entry expiry.
///
/// Expiry is checked on read: an expired entry is removed and reported as absent, so callers can
/// never observe a credential past its computed lifetime. There is no background sweep.
#[derive(Clone, Debug, Default)]
pub struct AccessTokenCache(CacheMap);
impl AccessTokenCache {
	/// Caches `token` for `visitor` for `ttl`, starting now.
	pub fn insert(&self, visitor: &VisitorId, token: TokenSecret, ttl: Duration) {
		self.insert_at(visitor, token, ttl, OffsetDateTime::now_utc());
	}

	/// Caches `token` for `visitor` for `ttl`, starting at `now`.
	pub fn insert_at(
		&self,
		visitor: &VisitorId,
		token: TokenSecret,
		ttl: Duration,
		now: OffsetDateTime,
	) {
		// An unrepresentable expiry degrades to "already expired" rather than panicking.
		let expires_at = now.checked_add(ttl).unwrap_or(now);

		self.0.write().insert(visitor.clone(), CachedAccessToken { token, expires_at });
	}

	/// Returns the live credential for `visitor`, evicting it if expired.
	pub fn fetch(&self, visitor: &VisitorId) -> Option<TokenSecret> {
		self.fetch_at(visitor, OffsetDateTime::now_utc())
	}

	/// Returns the credential for `visitor` if it is still live at `now`, evicting it otherwise.
	pub fn fetch_at(&self, visitor: &VisitorId, now: OffsetDateTime) -> Option<TokenSecret> {
		{
			let guard = self.0.read();

			match guard.get(visitor) {
				Some(entry) if !entry.is_expired_at(now) => return Some(entry.token.clone()),
				Some(_) => (),
				None => return None,
			}
		}

		let mut guard = self.0.write();

		// Another writer may have replaced the entry between the two locks.
		match guard.get(visitor) {
			Some(entry) if !entry.is_expired_at(now) => Some(entry.token.clone()),
			Some(_) => {
				guard.remove(visitor);

				None
			},
			None => None,
		}
	}

	/// Returns the raw entry for `visitor` without evicting it, expired or not.
	pub fn peek(&self, visitor: &VisitorId) -> Option<CachedAccessToken> {
		self.0.read().get(visitor).cloned()
	}

	/// Number of entries currently held, including expired ones not yet read.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns true when the cache holds no entries.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;

	#[test]
	fn entries_are_served_until_expiry() {
		let cache = AccessTokenCache::default();
		let visitor = VisitorId::new("visitor");
		let now = datetime!(2026-01-01 00:00 UTC);

		cache.insert_at(&visitor, TokenSecret::new("access"), Duration::seconds(1350), now);

		let served = cache
			.fetch_at(&visitor, now + Duration::seconds(1349))
			.expect("Entry should be live before its expiry.");

		assert_eq!(served.expose(), "access");
		assert_eq!(
			cache.peek(&visitor).map(|entry| entry.expires_at),
			Some(now + Duration::seconds(1350))
		);
	}

	#[test]
	fn expired_entries_are_evicted_on_read() {
		let cache = AccessTokenCache::default();
		let visitor = VisitorId::new("visitor");
		let now = datetime!(2026-01-01 00:00 UTC);

		cache.insert_at(&visitor, TokenSecret::new("access"), Duration::seconds(10), now);

		assert!(cache.fetch_at(&visitor, now + Duration::seconds(10)).is_none());
		assert!(cache.peek(&visitor).is_none(), "Expired entry must be removed.");
		assert!(cache.is_empty());
	}

	#[test]
	fn insert_overwrites_previous_entry() {
		let cache = AccessTokenCache::default();
		let visitor = VisitorId::new("visitor");
		let now = datetime!(2026-01-01 00:00 UTC);

		cache.insert_at(&visitor, TokenSecret::new("old"), Duration::seconds(10), now);
		cache.insert_at(&visitor, TokenSecret::new("new"), Duration::seconds(60), now);

		let served = cache
			.fetch_at(&visitor, now + Duration::seconds(30))
			.expect("Overwritten entry should carry the new lifetime.");

		assert_eq!(served.expose(), "new");
		assert_eq!(cache.len(), 1);
	}

	#[test]
	fn visitors_do_not_share_entries() {
		let cache = AccessTokenCache::default();
		let now = datetime!(2026-01-01 00:00 UTC);

		cache.insert_at(&VisitorId::new("a"), TokenSecret::new("a"), Duration::seconds(60), now);

		assert!(cache.fetch_at(&VisitorId::new("b"), now).is_none());
	}

	#[test]
	fn zero_ttl_is_never_served() {
		let cache = AccessTokenCache::default();
		let visitor = VisitorId::new("visitor");
		let now = datetime!(2026-01-01 00:00 UTC);

		cache.insert_at(&visitor, TokenSecret::new("access"), Duration::ZERO, now);

		assert!(cache.fetch_at(&visitor, now).is_none());
	}
}
