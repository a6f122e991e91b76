//! Issues and verifies signed tokens.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde_json::{Map, Value};
// self
use crate::{
	_prelude::*,
	clock::{self, Clock},
	error::{IssueError, VerifyError},
	grant::{Grant, TtlPolicy},
	obs::{self, OpOutcome, OpSpan, TokenOp},
	token::{
		SecretRing,
		payload::{EXPIRES_AT_FIELD, TokenPayload, json_kind, read_expires_at},
	},
};

const SEGMENT_SEPARATOR: char = '.';

/// Stateless encoder/verifier for capability tokens.
///
/// The codec holds the secret ring, the clock, and the per-capability TTL policy. It performs no
/// I/O and keeps no per-token state, so one instance can be shared across request handlers behind
/// an [`Arc`].
#[derive(Clone)]
pub struct TokenCodec {
	secrets: SecretRing,
	clock: Arc<dyn Clock>,
	ttl_policy: TtlPolicy,
}
impl TokenCodec {
	/// Creates a codec using the wall clock and the default TTL policy.
	pub fn new(secrets: SecretRing) -> Self {
		Self { secrets, clock: clock::shared_system_clock(), ttl_policy: TtlPolicy::default() }
	}

	/// Replaces the clock used for expiry stamping and checks.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;

		self
	}

	/// Replaces the per-capability TTL policy.
	pub fn with_ttl_policy(mut self, policy: TtlPolicy) -> Self {
		self.ttl_policy = policy;

		self
	}

	/// Secrets accepted by this codec.
	pub fn secrets(&self) -> &SecretRing {
		&self.secrets
	}

	/// TTL policy applied by [`issue`](Self::issue).
	pub fn ttl_policy(&self) -> &TtlPolicy {
		&self.ttl_policy
	}

	/// Clock driving expiry.
	pub fn clock(&self) -> &Arc<dyn Clock> {
		&self.clock
	}

	/// Encodes `payload` with an `expires_at` of now + `ttl` and signs it with the primary secret.
	///
	/// `payload` must serialize to a JSON object. A caller-supplied `expires_at` is overwritten in
	/// place; otherwise the field is appended after the caller's fields. Negative TTLs yield
	/// tokens that are already expired.
	pub fn generate<P>(&self, payload: &P, ttl: Duration) -> Result<String, IssueError>
	where
		P: ?Sized + Serialize,
	{
		let _guard = OpSpan::new(TokenOp::Issue, "generate").entered();
		let result = self.encode(payload, ttl);

		obs::record_op_outcome(
			TokenOp::Issue,
			if result.is_ok() { OpOutcome::Success } else { OpOutcome::Failure },
		);

		result
	}

	/// Issues a token for a typed grant using the TTL its capability is assigned.
	pub fn issue<G>(&self, grant: &G) -> Result<String, IssueError>
	where
		G: Grant,
	{
		self.generate(grant, self.ttl_policy.ttl_for(G::CAPABILITY))
	}

	/// Issues a token for a typed grant with an explicit TTL.
	pub fn issue_with_ttl<G>(&self, grant: &G, ttl: Duration) -> Result<String, IssueError>
	where
		G: Grant,
	{
		self.generate(grant, ttl)
	}

	/// Verifies `token`, collapsing every failure to `None`.
	///
	/// Never panics on attacker-controlled input. Callers map `None` to a generic "not found or
	/// expired" response.
	pub fn verify(&self, token: &str) -> Option<TokenPayload> {
		self.verify_detailed(token).ok()
	}

	/// Verifies `token` and reports why it was rejected.
	///
	/// The signature is checked against every secret in the ring before the payload is decoded.
	/// Expiry is a strict comparison against the codec clock with no skew allowance.
	pub fn verify_detailed(&self, token: &str) -> Result<TokenPayload, VerifyError> {
		let _guard = OpSpan::new(TokenOp::Verify, "verify").entered();
		let result = self.decode(token);

		match &result {
			Ok(_) => obs::record_op_outcome(TokenOp::Verify, OpOutcome::Success),
			Err(e) => {
				obs::trace_rejection(TokenOp::Verify, e.as_str());
				obs::record_op_outcome(TokenOp::Verify, OpOutcome::Failure);
			},
		}

		result
	}

	/// Verifies `token` and decodes its payload into the grant type `G`.
	pub fn verify_grant<G>(&self, token: &str) -> Result<G>
	where
		G: Grant,
	{
		let payload = self.verify_detailed(token)?;

		Ok(payload.decode()?)
	}

	fn encode<P>(&self, payload: &P, ttl: Duration) -> Result<String, IssueError>
	where
		P: ?Sized + Serialize,
	{
		let mut fields: Map<String, Value> = match serde_json::to_value(payload)? {
			Value::Object(fields) => fields,
			other => return Err(IssueError::PayloadNotObject { found: json_kind(&other) }),
		};
		let expires_at =
			i64::try_from(i128::from(self.clock.now_millis()) + ttl.whole_milliseconds())
				.map_err(|_| IssueError::ExpiryOutOfRange)?;

		fields.insert(EXPIRES_AT_FIELD.into(), Value::from(expires_at));

		let json = serde_json::to_vec(&fields)?;
		let payload_segment = URL_SAFE_NO_PAD.encode(json);
		let signature_segment = self.secrets.primary().sign(payload_segment.as_bytes());

		Ok(format!("{payload_segment}{SEGMENT_SEPARATOR}{signature_segment}"))
	}

	fn decode(&self, token: &str) -> Result<TokenPayload, VerifyError> {
		let (payload_segment, signature_segment) = split_segments(token)?;

		if !self.secrets.verify(payload_segment.as_bytes(), signature_segment) {
			return Err(VerifyError::BadSignature);
		}

		let json = URL_SAFE_NO_PAD.decode(payload_segment).map_err(|_| VerifyError::Malformed)?;
		let fields = match serde_json::from_slice::<Value>(&json) {
			Ok(Value::Object(fields)) => fields,
			_ => return Err(VerifyError::Malformed),
		};
		let expires_at = read_expires_at(&fields).ok_or(VerifyError::MissingExpiry)?;

		if expires_at <= self.clock.now_millis() {
			return Err(VerifyError::Expired { expired_at: expires_at });
		}

		Ok(TokenPayload::new(expires_at, fields))
	}
}
impl Debug for TokenCodec {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenCodec")
			.field("secrets", &self.secrets.len())
			.field("ttl_policy", &self.ttl_policy)
			.finish()
	}
}

fn split_segments(token: &str) -> Result<(&str, &str), VerifyError> {
	let mut segments = token.split(SEGMENT_SEPARATOR);
	let (Some(payload), Some(signature), None) =
		(segments.next(), segments.next(), segments.next())
	else {
		return Err(VerifyError::Malformed);
	};

	if payload.is_empty() || signature.is_empty() {
		return Err(VerifyError::Malformed);
	}

	Ok((payload, signature))
}
