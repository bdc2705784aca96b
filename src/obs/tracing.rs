// self
use crate::{_prelude::*, flows::FlowStage, obs::FlowKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// A span builder used by engine flows.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Creates a new span tagged with the flow kind, call site, and provider.
	pub fn new(kind: FlowKind, stage: &'static str, provider: &str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span =
				tracing::info_span!("oauth2_identity.flow", flow = kind.as_str(), stage, provider);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage, provider);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a debug event for a stage transition.
pub fn record_stage(kind: FlowKind, stage: FlowStage) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(flow = kind.as_str(), stage = stage.as_str(), "flow stage entered");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, stage);
	}
}

/// Emits a warn event describing a failed flow.
pub fn record_failure(kind: FlowKind, error: &Error) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(flow = kind.as_str(), error = %error, "flow failed");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, error);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn stage_events_noop_without_tracing() {
		record_stage(FlowKind::Initiate, FlowStage::AwaitingCallback);
		record_failure(FlowKind::Callback, &Error::MissingCode);
	}

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = FlowSpan::new(FlowKind::Callback, "instrument_wraps_future", "fixture");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
