//! CRM REST API client.
//!
//! The quickstart makes one read-only call: the first contact of the portal's "all contacts"
//! list, fetched with the visitor's bearer token.

// crates.io
use reqwest::header::{ACCEPT, AUTHORIZATION};
// self
use crate::{_prelude::*, auth::TokenSecret, error::ApiError};

/// Path of the contacts list endpoint, relative to the API base.
pub const CONTACTS_PATH: &str = "contacts/v1/lists/all/contacts/all";

/// Thin client over the provider's CRM API.
#[derive(Clone, Debug)]
pub struct CrmClient {
	http: ReqwestClient,
	api_base: Url,
}
impl CrmClient {
	/// Creates a client sending requests through `http` to `api_base`.
	pub fn new(http: ReqwestClient, api_base: Url) -> Self {
		Self { http, api_base }
	}

	/// Fetches the first contact visible to the token's portal, if any.
	pub async fn first_contact(&self, token: &TokenSecret) -> Result<Option<Contact>, ApiError> {
		let mut url = self.api_base.join(CONTACTS_PATH).map_err(|e| ApiError::Transport {
			source: Box::new(e),
		})?;

		url.query_pairs_mut().append_pair("count", "1");

		let response = self
			.http
			.get(url)
			.header(AUTHORIZATION, token.bearer())
			.header(ACCEPT, "application/json")
			.send()
			.await?;
		let status = response.status();
		let body = response.bytes().await?;

		if !status.is_success() {
			let message = serde_json::from_slice::<ApiErrorBody>(&body)
				.map(|body| body.message)
				.unwrap_or_else(|_| status.canonical_reason().unwrap_or("unknown status").to_owned());

			#[cfg(feature = "tracing")]
			tracing::warn!(status = status.as_u16(), %message, "CRM API call failed.");

			return Err(ApiError::Status { status: status.as_u16(), message });
		}

		let list: ContactList =
			serde_path_to_error::deserialize(&mut serde_json::Deserializer::from_slice(&body))
				.map_err(|source| ApiError::MalformedResponse { source })?;

		Ok(list.contacts.into_iter().next())
	}
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
	message: String,
}

#[derive(Debug, Deserialize)]
struct ContactList {
	contacts: Vec<Contact>,
}

/// Contact record as returned by the contacts list endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
	/// Numeric contact identifier.
	pub vid: u64,
	/// Property name → latest value.
	#[serde(default)]
	pub properties: HashMap<String, PropertyValue>,
}
impl Contact {
	/// First and last name joined by a space; the `vid` when neither is set.
	pub fn display_name(&self) -> String {
		let name = ["firstname", "lastname"]
			.into_iter()
			.filter_map(|key| self.property(key))
			.filter(|value| !value.trim().is_empty())
			.collect::<Vec<_>>()
			.join(" ");

		if name.is_empty() { format!("Contact {}", self.vid) } else { name }
	}

	/// Value of property `name`, if present.
	pub fn property(&self, name: &str) -> Option<&str> {
		self.properties.get(name).map(|property| property.value.as_str())
	}
}

/// Single property value wrapper.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyValue {
	/// Raw value.
	pub value: String,
}
