//! Observability helpers for token flows.
//!
//! # Feature Flags
//!
//! - `tracing` (default) wraps every flow in a span named `crm_oauth.flow` with the `flow` and
//!   `stage` fields.
//! - `metrics` increments the `crm_oauth_flow_total` counter for every attempt/outcome, labeled by
//!   `flow` + `outcome`.
//! - `server` adds [`init_logging`], which installs the fmt subscriber used by the binary.

#[cfg(feature = "server")] mod logging;
mod metrics;
mod tracing;

#[cfg(feature = "server")] pub use logging::*;
pub use metrics::*;
pub use tracing::*;

// self
use crate::{_prelude::*, provider::GrantType};

/// Token flows observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Authorization-code exchange.
	AuthorizationCode,
	/// Refresh-token exchange.
	Refresh,
	/// Access token resolution (cache lookup plus optional refresh).
	Resolve,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::AuthorizationCode => "authorization_code",
			FlowKind::Refresh => "refresh",
			FlowKind::Resolve => "resolve",
		}
	}
}
impl From<GrantType> for FlowKind {
	fn from(grant: GrantType) -> Self {
		match grant {
			GrantType::AuthorizationCode => FlowKind::AuthorizationCode,
			GrantType::RefreshToken => FlowKind::Refresh,
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a flow.
	Attempt,
	/// Resolution served from the access token cache.
	CacheHit,
	/// Successful completion.
	Success,
	/// Failure returned to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::CacheHit => "cache_hit",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
