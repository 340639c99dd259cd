//! `crm_oauth_flow_total` counter.

// self
use crate::obs::{FlowKind, FlowOutcome};

/// Metric name for flow outcomes.
pub const FLOW_COUNTER: &str = "crm_oauth_flow_total";

/// Bumps [`FLOW_COUNTER`] for `kind` and `outcome`.
///
/// Goes to whatever recorder the host installed; does nothing without the `metrics` feature or
/// without a recorder.
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	metrics::counter!(FLOW_COUNTER, "flow" => kind.as_str(), "outcome" => outcome.as_str())
		.increment(1);

	#[cfg(not(feature = "metrics"))]
	let _ = (kind, outcome);
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recording_without_a_recorder_is_a_no_op() {
		for outcome in
			[FlowOutcome::Attempt, FlowOutcome::CacheHit, FlowOutcome::Success, FlowOutcome::Failure]
		{
			record_flow_outcome(FlowKind::Resolve, outcome);
		}
	}
}
