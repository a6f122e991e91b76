//! Crate-level error types shared across the codec, validators, and configuration.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical error exposed by fallible public APIs.
///
/// Attacker-controlled input never produces this type; verification failures are reported through
/// [`VerifyError`] (or collapsed to `None`) and action failures through [`ActionTokenError`].
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem, raised at startup.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Token issuance failed because of a caller bug.
	#[error(transparent)]
	Issue(#[from] IssueError),
	/// Presented token could not be verified.
	#[error(transparent)]
	Verify(#[from] VerifyError),
	/// Action token was rejected.
	#[error(transparent)]
	Action(#[from] ActionTokenError),
	/// Verified payload did not match the expected capability shape.
	#[error(transparent)]
	Payload(#[from] PayloadError),
}

/// Configuration and validation failures raised while assembling a codec.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// No signing secret was configured.
	#[error("Signing secret `{key}` is not configured.")]
	MissingSecret {
		/// Environment key that was consulted.
		key: &'static str,
	},
	/// A configured signing secret is unusable.
	#[error("Signing secret is invalid.")]
	InvalidSecret(#[from] crate::token::SecretError),
	/// Secret file could not be read.
	#[error("Signing secret file `{path}` could not be read.")]
	SecretFile {
		/// Path that failed to load.
		path: String,
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
	/// A configuration value failed to parse.
	#[error("Configuration value `{key}` is invalid: {reason}.")]
	InvalidValue {
		/// Environment key that failed to parse.
		key: &'static str,
		/// Parser-supplied reason.
		reason: String,
	},
	/// Rate limit budget must allow at least one attempt.
	#[error("Rate limit must allow at least one attempt per window.")]
	ZeroAttempts,
	/// Rate limit window must be positive.
	#[error("Rate limit window must be positive.")]
	NonPositiveWindow,
	/// Background work was started outside a tokio runtime.
	#[error("No tokio runtime is available to run the sweeper.")]
	NoAsyncRuntime,
}

/// Failures raised while issuing a token. These indicate caller bugs, never attacker input.
#[derive(Debug, ThisError)]
pub enum IssueError {
	/// Payload did not serialize to a JSON object.
	#[error("Token payload must serialize to a JSON object, found {found}.")]
	PayloadNotObject {
		/// JSON kind that was produced instead.
		found: &'static str,
	},
	/// Payload could not be serialized.
	#[error("Token payload could not be serialized.")]
	Serialize(#[from] serde_json::Error),
	/// Expiry instant falls outside the representable millisecond range.
	#[error("Token expiry is out of range.")]
	ExpiryOutOfRange,
}

/// Reasons a presented token failed verification.
///
/// Pages shown to end users must not reveal which variant occurred; the distinction exists for
/// logs and for callers that offer a "request a new link" flow on [`VerifyError::Expired`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum VerifyError {
	/// Token shape, base64url, or JSON decoding failed.
	#[error("Token is malformed.")]
	Malformed,
	/// Signature does not match any configured secret.
	#[error("Token signature is invalid.")]
	BadSignature,
	/// Payload carries no usable `expires_at`.
	#[error("Token payload has no expiry.")]
	MissingExpiry,
	/// Token expired at the contained millisecond instant.
	#[error("Token expired at {expired_at} ms.")]
	Expired {
		/// Expiry instant embedded in the token, milliseconds since the Unix epoch.
		expired_at: i64,
	},
}
impl VerifyError {
	/// Returns `true` when the token was authentic but past its expiry.
	pub fn is_expired(&self) -> bool {
		matches!(self, Self::Expired { .. })
	}

	/// Stable label for logs and metrics.
	pub const fn as_str(&self) -> &'static str {
		match self {
			Self::Malformed => "malformed",
			Self::BadSignature => "bad_signature",
			Self::MissingExpiry => "missing_expiry",
			Self::Expired { .. } => "expired",
		}
	}
}

/// Failures returned by the one-shot action validator.
#[derive(Debug, ThisError)]
pub enum ActionTokenError {
	/// Too many attempts from the same identifier; callers should answer 429.
	#[error("Too many action attempts; retry after {reset_at}.")]
	RateLimited {
		/// Instant the current window closes.
		reset_at: OffsetDateTime,
	},
	/// Token failed verification; callers should answer 401.
	#[error(transparent)]
	Rejected(#[from] VerifyError),
	/// Token authorizes a different action than the endpoint performs.
	#[error("Token authorizes `{found}` but `{expected}` was requested.")]
	WrongAction {
		/// Action the endpoint performs.
		expected: crate::grant::ActionKind,
		/// Action embedded in the token.
		found: crate::grant::ActionKind,
	},
	/// Verified payload is not a valid action grant.
	#[error(transparent)]
	Payload(#[from] PayloadError),
}
impl ActionTokenError {
	/// Returns `true` when the failure came from the attempt limiter.
	pub fn is_rate_limited(&self) -> bool {
		matches!(self, Self::RateLimited { .. })
	}
}

/// Verified payload could not be decoded into the requested grant type.
#[derive(Debug, ThisError)]
#[error("Token payload does not match the expected shape at `{path}`.")]
pub struct PayloadError {
	/// JSON path of the offending field.
	pub path: String,
	/// Structured decoding failure.
	#[source]
	pub source: serde_json::Error,
}
impl From<serde_path_to_error::Error<serde_json::Error>> for PayloadError {
	fn from(e: serde_path_to_error::Error<serde_json::Error>) -> Self {
		let path = e.path().to_string();

		Self { path, source: e.into_inner() }
	}
}
