// self
use crate::{_prelude::*, obs::TokenOp};

/// A span builder used around token operations.
#[derive(Clone, Debug)]
pub struct OpSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OpSpan {
	/// Creates a new span tagged with the provided operation + stage.
	pub fn new(op: TokenOp, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::debug_span!("portal_tokens.op", op = op.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (op, stage);

			Self {}
		}
	}

	/// Enters the span for the rest of the current scope.
	pub fn entered(self) -> OpSpanGuard {
		#[cfg(feature = "tracing")]
		{
			OpSpanGuard { guard: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			OpSpanGuard {}
		}
	}
}

/// RAII guard returned by [`OpSpan::entered`].
pub struct OpSpanGuard {
	#[cfg(feature = "tracing")]
	#[allow(dead_code)]
	guard: tracing::span::EnteredSpan,
}
impl Debug for OpSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("OpSpanGuard(..)")
	}
}

/// Emits a `debug` event explaining why an operation failed.
pub fn trace_rejection(op: TokenOp, reason: &'static str) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(op = op.as_str(), reason, "token operation rejected");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (op, reason);
	}
}

/// Emits an `info` event noting that `key` was unset and its default applies.
pub fn trace_config_default(key: &'static str) {
	#[cfg(feature = "tracing")]
	{
		tracing::info!(key, "configuration value not set, using default");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = key;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn op_span_noop_without_tracing() {
		let _guard = OpSpan::new(TokenOp::Verify, "test").entered();

		trace_rejection(TokenOp::Verify, "malformed");
		trace_config_default("PORTAL_TOKEN_QUOTE_TTL_HOURS");
	}
}
