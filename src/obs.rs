//! Observability helpers for the submodule.
//!
//! # Feature Flags
//!
//! - `tracing` (default) emits the submodule's log events under the `digital_audience_id`
//!   target and wraps each bakery call in a `digital_audience_id.request` span with a `stage`
//!   field.
//! - `metrics` increments the `digital_audience_id_request_total` counter for every outcome,
//!   labeled by `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for each resolution attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestOutcome {
	/// The host invoked the deferred request.
	Attempt,
	/// The bakery returned a visitor id.
	Resolved,
	/// The bakery answered without a usable visitor id.
	Empty,
	/// The request failed at the network or HTTP layer.
	TransportError,
	/// Configuration was rejected before any I/O.
	ConfigError,
	/// The consent gate refused to issue the request.
	ConsentBlocked,
}
impl RequestOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RequestOutcome::Attempt => "attempt",
			RequestOutcome::Resolved => "resolved",
			RequestOutcome::Empty => "empty",
			RequestOutcome::TransportError => "transport_error",
			RequestOutcome::ConfigError => "config_error",
			RequestOutcome::ConsentBlocked => "consent_blocked",
		}
	}
}
impl Display for RequestOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
