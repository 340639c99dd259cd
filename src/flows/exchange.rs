//! Token exchange with store and cache side effects.
//!
//! [`Broker::exchange`] sends one token request and, on success, overwrites the visitor's refresh
//! credential (when the provider issued one) and caches the access credential for
//! `round(expires_in * 0.75)` seconds. On failure nothing is written, so whatever the visitor had
//! before stays in place.

// self
use crate::{
	_prelude::*,
	auth::{TokenGrant, TokenSecret, VisitorId},
	error::ExchangeError,
	flows::Broker,
	http::TokenHttpClient,
	oauth::{BasicFacade, ExchangeRequest},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

impl<C> Broker<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Performs `request` for `visitor` and returns the issued access token.
	///
	/// Every transport, status, and parsing failure comes back as an [`ExchangeError`].
	pub async fn exchange(
		&self,
		visitor: &VisitorId,
		request: ExchangeRequest,
	) -> Result<TokenSecret, ExchangeError> {
		let grant_type = request.grant();
		let kind = FlowKind::from(grant_type);
		let span = FlowSpan::new(kind, "exchange");

		obs::record_flow_outcome(kind, FlowOutcome::Attempt);
		self.exchange_metrics.record_attempt(grant_type);

		let result = span
			.instrument(async {
				let facade = BasicFacade::new(
					&self.endpoints.token,
					&self.client_id,
					&self.client_secret,
					self.http_client.as_ref(),
				);
				let grant = facade.request_tokens(&request).await?;

				Ok::<_, ExchangeError>(self.record_grant(visitor, grant))
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(kind, FlowOutcome::Success),
			Err(_err) => {
				#[cfg(feature = "tracing")]
				tracing::warn!(
					grant = grant_type.as_str(),
					status = ?_err.status(),
					error = %_err,
					"Token exchange failed."
				);

				self.exchange_metrics.record_failure();
				obs::record_flow_outcome(kind, FlowOutcome::Failure);
			},
		}

		result
	}

	fn record_grant(&self, visitor: &VisitorId, grant: TokenGrant) -> TokenSecret {
		let ttl = grant.cache_ttl();
		let TokenGrant { access_token, refresh_token, .. } = grant;

		if let Some(refresh_token) = refresh_token {
			self.store.save(visitor, refresh_token);
		}

		self.cache.insert(visitor, access_token.clone(), ttl);

		#[cfg(feature = "tracing")]
		tracing::debug!(ttl_secs = ttl.whole_seconds(), "Cached access token.");

		access_token
	}
}
