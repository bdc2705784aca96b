//! Optional observability helpers for engine flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `oauth2_identity.flow` with `flow`, `stage`,
//!   and `provider` fields, a debug event per [`FlowStage`] transition, and a warn event when a
//!   flow fails.
//! - Enable `metrics` to increment the `oauth2_identity_flow_total` counter for every
//!   attempt/success/failure, labeled by `flow` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::{_prelude::*, flows::FlowStage};

/// Engine operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Building the authorization redirect.
	Initiate,
	/// Handling the provider callback through profile normalization.
	Callback,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::Initiate => "initiate",
			FlowKind::Callback => "complete_callback",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to an engine operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
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

/// Records the final outcome of a flow, emitting the failure event when needed.
pub(crate) fn finish_flow<T>(kind: FlowKind, result: &Result<T>) {
	match result {
		Ok(_) => record_flow_outcome(kind, FlowOutcome::Success),
		Err(err) => {
			record_stage(kind, FlowStage::Failed);
			record_failure(kind, err);
			record_flow_outcome(kind, FlowOutcome::Failure);
		},
	}
}
