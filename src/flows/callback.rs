//! Completion of the authorization redirect.

// self
use crate::{
	auth::VisitorId,
	error::ExchangeError,
	flows::Broker,
	http::TokenHttpClient,
	oauth::ExchangeRequest,
};

impl<C> Broker<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Exchanges the authorization `code` from the callback for the visitor's first token pair.
	///
	/// The code is single use; on failure the caller shows the error and the visitor starts over
	/// from the install link.
	pub async fn complete_authorization(
		&self,
		visitor: &VisitorId,
		code: &str,
	) -> Result<(), ExchangeError> {
		let request = ExchangeRequest::authorization_code(code, self.redirect_uri.clone());

		self.exchange(visitor, request).await.map(|_| ())
	}
}
