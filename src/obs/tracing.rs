// self
use crate::_prelude::*;

/// Log target shared by every event the submodule emits.
pub const LOG_TARGET: &str = "digital_audience_id";

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedRequest<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedRequest<F> = F;

/// Span wrapped around a single bakery request.
#[derive(Clone, Debug)]
pub struct ResolveSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl ResolveSpan {
	/// Creates a new span tagged with the provided stage.
	pub fn new(stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(target: LOG_TARGET, "digital_audience_id.request", stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = stage;

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedRequest<Fut>
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

/// Logs a failure the publisher must fix (bad configuration).
pub fn log_error(message: &dyn Display) {
	#[cfg(feature = "tracing")]
	{
		tracing::error!(target: LOG_TARGET, "{message}");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = message;
	}
}

/// Logs an expected, non-actionable condition (consent blocks, network hiccups).
pub fn log_info(message: &dyn Display, cause: Option<&dyn StdError>) {
	#[cfg(feature = "tracing")]
	{
		match cause {
			Some(cause) => tracing::info!(target: LOG_TARGET, error = %cause, "{message}"),
			None => tracing::info!(target: LOG_TARGET, "{message}"),
		}
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (message, cause);
	}
}
