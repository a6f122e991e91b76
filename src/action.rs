//! One-shot action links: signature and expiry checks plus a per-client attempt budget.
//!
//! A leaked action link should not be replayable at scale. Every presentation, valid or not,
//! counts against the presenting client's budget; once the budget is spent the validator
//! refuses regardless of signature validity until the window closes.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};
// self
use crate::{
	_prelude::*,
	error::ActionTokenError,
	grant::{ActionGrant, ActionKind},
	obs::{self, OpOutcome, OpSpan, TokenOp},
	rate_limit::{RateLimitConfig, RateLimiter},
	token::{TokenCodec, TokenPayload},
};

/// Default attempts allowed per window.
pub const DEFAULT_ACTION_MAX_ATTEMPTS: u32 = 5;
/// Default attempt window: 15 minutes.
pub const DEFAULT_ACTION_WINDOW_SECS: i64 = 15 * 60;

const KEY_PREFIX: &str = "action";
const TOKEN_FINGERPRINT_BYTES: usize = 12;

/// What an attempt counter is keyed by.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ActionKeyScope {
	/// One budget per client address, shared across tokens.
	#[default]
	ClientIp,
	/// One budget per client address and token.
	ClientIpAndToken,
}

/// Validates one-shot action tokens.
#[derive(Clone, Debug)]
pub struct ActionTokenValidator {
	codec: Arc<TokenCodec>,
	limiter: RateLimiter,
	budget: RateLimitConfig,
	scope: ActionKeyScope,
}
impl ActionTokenValidator {
	/// Creates a validator sharing `codec` and counting attempts in `limiter`.
	pub fn new(codec: Arc<TokenCodec>, limiter: RateLimiter, budget: RateLimitConfig) -> Self {
		Self { codec, limiter, budget, scope: ActionKeyScope::default() }
	}

	/// Changes what the attempt counter is keyed by.
	pub fn with_key_scope(mut self, scope: ActionKeyScope) -> Self {
		self.scope = scope;

		self
	}

	/// Attempt budget in force.
	pub fn budget(&self) -> &RateLimitConfig {
		&self.budget
	}

	/// Limiter holding the attempt counters.
	pub fn limiter(&self) -> &RateLimiter {
		&self.limiter
	}

	/// Verifies `token` and charges one attempt to `client_ip`.
	///
	/// Returns [`ActionTokenError::RateLimited`] once the budget is spent, even for a valid token;
	/// otherwise the verification outcome.
	pub fn validate(
		&self,
		token: &str,
		client_ip: IpAddr,
	) -> Result<TokenPayload, ActionTokenError> {
		let _guard = OpSpan::new(TokenOp::ValidateAction, "validate").entered();
		let verified = self.codec.verify_detailed(token);
		let decision = self.limiter.check(&self.attempt_key(token, client_ip), &self.budget);
		let result = if decision.success {
			verified.map_err(ActionTokenError::from)
		} else {
			Err(ActionTokenError::RateLimited { reset_at: decision.reset_at })
		};

		if let Err(e) = &result {
			obs::trace_rejection(
				TokenOp::ValidateAction,
				match e {
					ActionTokenError::RateLimited { .. } => "rate_limited",
					ActionTokenError::Rejected(reason) => reason.as_str(),
					ActionTokenError::WrongAction { .. } => "wrong_action",
					ActionTokenError::Payload(_) => "payload",
				},
			);
		}

		obs::record_op_outcome(
			TokenOp::ValidateAction,
			if result.is_ok() { OpOutcome::Success } else { OpOutcome::Failure },
		);

		result
	}

	/// Validates `token` and checks it authorizes exactly `expected`.
	pub fn validate_action(
		&self,
		token: &str,
		client_ip: IpAddr,
		expected: ActionKind,
	) -> Result<ActionGrant, ActionTokenError> {
		let grant = self.validate(token, client_ip)?.decode::<ActionGrant>()?;

		if grant.action_type != expected {
			obs::trace_rejection(TokenOp::ValidateAction, "wrong_action");

			return Err(ActionTokenError::WrongAction { expected, found: grant.action_type });
		}

		Ok(grant)
	}

	fn attempt_key(&self, token: &str, client_ip: IpAddr) -> String {
		match self.scope {
			ActionKeyScope::ClientIp => format!("{KEY_PREFIX}:{client_ip}"),
			ActionKeyScope::ClientIpAndToken =>
				format!("{KEY_PREFIX}:{client_ip}:{}", token_fingerprint(token)),
		}
	}
}

// Bounded-length stand-in for the token so oversized garbage cannot bloat the counter map.
fn token_fingerprint(token: &str) -> String {
	let digest = Sha256::digest(token.as_bytes());

	URL_SAFE_NO_PAD.encode(&digest[..TOKEN_FINGERPRINT_BYTES])
}
