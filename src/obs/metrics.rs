// self
use crate::obs::{OpOutcome, TokenOp};

/// Records an operation outcome via the global metrics recorder (when enabled).
pub fn record_op_outcome(op: TokenOp, outcome: OpOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"portal_tokens_op_total",
			"op" => op.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (op, outcome);
	}
}
