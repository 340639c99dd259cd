//! Crate-level error types shared by the exchanger, resolver, API client, and configuration.

// self
use crate::{_prelude::*, auth::VisitorId};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Startup configuration problem; fatal.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Token endpoint exchange failed.
	#[error(transparent)]
	Exchange(#[from] ExchangeError),
	/// CRM API call failed after a token was obtained.
	#[error(transparent)]
	Api(#[from] ApiError),
	/// Listener socket failure while serving.
	#[error("Server I/O failed.")]
	Io(#[from] std::io::Error),

	/// No refresh credential is stored for the visitor, so the app must be installed first.
	#[error("Visitor {visitor} has not authorized the app.")]
	NotAuthorized {
		/// Visitor whose credentials are missing.
		visitor: VisitorId,
	},
}

/// Configuration failures raised while assembling the app.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A required environment variable is absent or blank.
	#[error("Missing required environment variable `{name}`.")]
	MissingVar {
		/// Variable name.
		name: &'static str,
	},
	/// An environment variable holds a value that cannot be used.
	#[error("Environment variable `{name}` is invalid: {reason}.")]
	InvalidVar {
		/// Variable name.
		name: &'static str,
		/// Human-readable explanation.
		reason: String,
	},
	/// A configured URL cannot be parsed.
	#[error("Configured URL `{name}` is invalid.")]
	InvalidUrl {
		/// Setting that produced the URL.
		name: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Token exchange failures. Every failure of an authorization-code or refresh exchange is
/// converted into one of these variants before leaving the exchanger.
#[derive(Debug, ThisError)]
pub enum ExchangeError {
	/// Provider rejected the request and supplied a message.
	#[error("Token endpoint rejected the request: {message}.")]
	Provider {
		/// Provider-supplied message.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// The request did not complete before the configured timeout.
	#[error("Token endpoint request timed out.")]
	Timeout,
	/// Network failure (DNS, TCP, TLS).
	#[error("Network error occurred while calling the token endpoint.")]
	Transport {
		/// Transport-specific error.
		#[source]
		source: BoxError,
	},
	/// Token endpoint responded with JSON that does not match the expected shape.
	#[error("Token endpoint returned malformed JSON.")]
	MalformedResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint returned something the client could not interpret at all.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	UnexpectedResponse {
		/// Description of the problem.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Response parsed but violates the token contract.
	#[error("Token endpoint response is invalid: {reason}.")]
	InvalidResponse {
		/// Violated expectation.
		reason: &'static str,
	},
}
impl ExchangeError {
	/// Wraps a transport-specific network error.
	pub fn transport(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Transport { source: Box::new(src) }
	}

	/// Message shown to the visitor when an exchange fails.
	///
	/// Provider rejections surface the provider's own text verbatim.
	pub fn message(&self) -> String {
		match self {
			Self::Provider { message, .. } => message.clone(),
			_ => self.to_string(),
		}
	}

	/// HTTP status reported by the token endpoint, if one was received.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Provider { status, .. }
			| Self::MalformedResponse { status, .. }
			| Self::UnexpectedResponse { status, .. } => *status,
			_ => None,
		}
	}
}

/// CRM API call failures.
#[derive(Debug, ThisError)]
pub enum ApiError {
	/// The request did not complete before the configured timeout.
	#[error("CRM API request timed out.")]
	Timeout,
	/// Network failure while calling the API.
	#[error("Network error occurred while calling the CRM API.")]
	Transport {
		/// Transport-specific error.
		#[source]
		source: BoxError,
	},
	/// The API answered with a non-success status.
	#[error("CRM API returned HTTP {status}: {message}.")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Provider-supplied message, or the canonical reason phrase.
		message: String,
	},
	/// The API response body does not match the expected shape.
	#[error("CRM API returned malformed JSON.")]
	MalformedResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
impl From<ReqwestError> for ApiError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::Timeout } else { Self::Transport { source: Box::new(e) } }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn provider_message_is_surfaced_verbatim() {
		let err = ExchangeError::Provider { message: "invalid_grant".into(), status: Some(400) };

		assert_eq!(err.message(), "invalid_grant");
		assert_eq!(err.status(), Some(400));
		assert_eq!(err.to_string(), "Token endpoint rejected the request: invalid_grant.");
	}

	#[test]
	fn non_provider_failures_use_display_text() {
		assert_eq!(ExchangeError::Timeout.message(), "Token endpoint request timed out.");
		assert_eq!(ExchangeError::Timeout.status(), None);
	}

	#[test]
	fn not_authorized_is_distinct_from_exchange_failures() {
		let err = Error::NotAuthorized { visitor: VisitorId::new("visitor-1") };

		assert!(matches!(err, Error::NotAuthorized { .. }));
		assert!(err.to_string().contains("visitor-1"));

		let err: Error = ExchangeError::Timeout.into();

		assert!(matches!(err, Error::Exchange(ExchangeError::Timeout)));
	}

	#[test]
	fn exchange_error_keeps_transport_source() {
		let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
		let err: Error = ExchangeError::transport(io).into();
		let source = StdError::source(&err).expect("Transparent wrapper should expose the source.");

		assert_eq!(source.to_string(), "refused");
	}
}
