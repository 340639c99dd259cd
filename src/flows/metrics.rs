// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::provider::GrantType;

/// Thread-safe counters for token exchanges.
#[derive(Debug, Default)]
pub struct ExchangeMetrics {
	code_exchanges: AtomicU64,
	refreshes: AtomicU64,
	failures: AtomicU64,
}
impl ExchangeMetrics {
	/// Number of authorization-code exchanges attempted.
	pub fn code_exchanges(&self) -> u64 {
		self.code_exchanges.load(Ordering::Relaxed)
	}

	/// Number of refresh exchanges attempted.
	pub fn refreshes(&self) -> u64 {
		self.refreshes.load(Ordering::Relaxed)
	}

	/// Number of exchanges, of either grant, that failed.
	pub fn failures(&self) -> u64 {
		self.failures.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self, grant: GrantType) {
		let counter = match grant {
			GrantType::AuthorizationCode => &self.code_exchanges,
			GrantType::RefreshToken => &self.refreshes,
		};

		counter.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failures.fetch_add(1, Ordering::Relaxed);
	}
}
