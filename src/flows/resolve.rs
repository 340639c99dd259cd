//! Access token resolution with refresh-on-demand.
//!
//! [`Broker::access_token`] serves the cached access token when one is live and otherwise runs a
//! `grant_type=refresh_token` exchange with the visitor's stored refresh credential. Visitors
//! without a refresh credential get [`Error::NotAuthorized`] and no request is sent.
//!
//! The cache check and the refresh are not one atomic step. Unless refresh coalescing is enabled,
//! two requests that miss the cache for the same visitor at the same time both refresh; each gets
//! a valid token and the later write wins. That is harmless while the provider keeps refresh
//! tokens reusable. With coalescing enabled, refreshes for a visitor run behind a per-visitor
//! async guard and waiters re-check the cache before refreshing again.

// self
use crate::{
	_prelude::*,
	auth::{TokenSecret, VisitorId},
	flows::Broker,
	http::TokenHttpClient,
	oauth::ExchangeRequest,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

impl<C> Broker<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Returns a usable access token for `visitor`, refreshing it when the cache has none.
	pub async fn access_token(&self, visitor: &VisitorId) -> Result<TokenSecret> {
		const KIND: FlowKind = FlowKind::Resolve;

		let span = FlowSpan::new(KIND, "access_token");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async {
				if let Some(token) = self.cache.fetch(visitor) {
					obs::record_flow_outcome(KIND, FlowOutcome::CacheHit);

					return Ok(token);
				}
				if !self.coalesce_refreshes {
					return self.refresh(visitor).await;
				}

				self.coalesced_refresh(visitor).await
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Returns true when `visitor` has a stored refresh credential.
	pub fn is_authorized(&self, visitor: &VisitorId) -> bool {
		self.store.contains(visitor)
	}

	async fn refresh(&self, visitor: &VisitorId) -> Result<TokenSecret> {
		let refresh_token = self
			.store
			.fetch(visitor)
			.ok_or_else(|| Error::NotAuthorized { visitor: visitor.clone() })?;

		#[cfg(feature = "tracing")]
		tracing::debug!("Access token missing or expired; refreshing.");

		Ok(self.exchange(visitor, ExchangeRequest::refresh(refresh_token)).await?)
	}

	async fn coalesced_refresh(&self, visitor: &VisitorId) -> Result<TokenSecret> {
		let guard = self.refresh_guard(visitor);
		let result = {
			let _singleflight = guard.lock().await;

			// The previous holder may already have refreshed.
			match self.cache.fetch(visitor) {
				Some(token) => {
					obs::record_flow_outcome(FlowKind::Resolve, FlowOutcome::CacheHit);

					Ok(token)
				},
				None => self.refresh(visitor).await,
			}
		};

		drop(guard);
		self.release_refresh_guard(visitor);

		result
	}

	fn refresh_guard(&self, visitor: &VisitorId) -> Arc<AsyncMutex<()>> {
		let mut guards = self.refresh_guards.lock();

		guards.entry(visitor.clone()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
	}

	// Clones are only taken under the map lock, so a count of one means nobody is waiting.
	fn release_refresh_guard(&self, visitor: &VisitorId) {
		let mut guards = self.refresh_guards.lock();

		if guards.get(visitor).is_some_and(|guard| Arc::strong_count(guard) == 1) {
			guards.remove(visitor);
		}
	}
}
