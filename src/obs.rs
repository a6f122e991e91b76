//! Optional observability helpers for token operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `portal_tokens.op` with the `op` and `stage`
//!   fields, plus `debug` events naming why a token was rejected. Tokens and secrets are never
//!   recorded.
//! - Enable `metrics` to increment the `portal_tokens_op_total` counter for every
//!   success/failure, labeled by `op` + `outcome`.

mod metrics;
mod tracing;

pub use self::metrics::*;
pub use self::tracing::*;

// self
use crate::_prelude::*;

/// Token operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenOp {
	/// Signing a new token.
	Issue,
	/// Verifying a presented token.
	Verify,
	/// Validating a one-shot action token.
	ValidateAction,
	/// Consulting the attempt limiter.
	RateLimit,
	/// Evicting elapsed rate-limit windows.
	Sweep,
}
impl TokenOp {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			TokenOp::Issue => "issue",
			TokenOp::Verify => "verify",
			TokenOp::ValidateAction => "validate_action",
			TokenOp::RateLimit => "rate_limit",
			TokenOp::Sweep => "sweep",
		}
	}
}
impl Display for TokenOp {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpOutcome {
	/// The operation succeeded.
	Success,
	/// The operation failed (invalid token, denied attempt, ...).
	Failure,
}
impl OpOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpOutcome::Success => "success",
			OpOutcome::Failure => "failure",
		}
	}
}
impl Display for OpOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
