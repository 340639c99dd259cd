//! Authorization URL construction.

// self
use crate::{_prelude::*, auth::ScopeList, flows::Broker, http::TokenHttpClient};

/// Builds the URL the visitor's browser is sent to in order to grant access.
///
/// Appends `client_id`, the space-joined `scope`, and `redirect_uri` as query parameters, after
/// any query the endpoint already carries. Spaces are written as `%20` rather than the form
/// encoder's `+`; literal plus signs are already escaped as `%2B`, so the swap is lossless.
pub fn build_authorization_url(
	authorize_endpoint: &Url,
	client_id: &str,
	scopes: &ScopeList,
	redirect_uri: &Url,
) -> Url {
	let mut url = authorize_endpoint.clone();
	let mut pairs = url.query_pairs_mut();

	pairs.append_pair("client_id", client_id);
	pairs.append_pair("scope", &scopes.joined());
	pairs.append_pair("redirect_uri", redirect_uri.as_str());

	drop(pairs);

	let query = url.query().map(|query| query.replace('+', "%20"));

	url.set_query(query.as_deref());

	url
}

impl<C> Broker<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Authorization URL for the configured client, scopes, and redirect URI.
	pub fn authorization_url(&self) -> Url {
		build_authorization_url(
			&self.endpoints.authorization,
			&self.client_id,
			&self.scopes,
			&self.redirect_uri,
		)
	}
}
