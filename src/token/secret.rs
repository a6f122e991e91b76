//! HMAC signing secrets that redact key material, plus the rotation ring.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;
use subtle::{Choice, ConstantTimeEq};
// self
use crate::_prelude::*;

type HmacSha256 = Hmac<Sha256>;

/// Shortest accepted secret, in bytes.
pub const MIN_SECRET_LEN: usize = 16;
const GENERATED_SECRET_BYTES: usize = 32;

/// Errors raised while constructing a [`SigningSecret`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum SecretError {
	/// The secret is shorter than [`MIN_SECRET_LEN`] bytes.
	#[error("Signing secret must be at least {min} bytes, found {actual}.")]
	TooShort {
		/// Minimum accepted length.
		min: usize,
		/// Length that was supplied.
		actual: usize,
	},
	/// The HMAC implementation refused the key.
	#[error("Signing secret cannot key HMAC-SHA256.")]
	InvalidKey,
}

/// Redacted HMAC-SHA256 key. The keyed MAC state is prepared once and cloned per signature.
#[derive(Clone)]
pub struct SigningSecret {
	value: String,
	mac: HmacSha256,
}
impl SigningSecret {
	/// Wraps a secret string; its UTF-8 bytes key the HMAC.
	pub fn new(value: impl Into<String>) -> Result<Self, SecretError> {
		let value = value.into();

		if value.len() < MIN_SECRET_LEN {
			return Err(SecretError::TooShort { min: MIN_SECRET_LEN, actual: value.len() });
		}

		let mac =
			HmacSha256::new_from_slice(value.as_bytes()).map_err(|_| SecretError::InvalidKey)?;

		Ok(Self { value, mac })
	}

	/// Generates a fresh random secret encoded as base64url, suitable for configuration files.
	pub fn generate() -> Result<Self, SecretError> {
		let mut bytes = [0_u8; GENERATED_SECRET_BYTES];

		rand::rng().fill(&mut bytes);

		Self::new(URL_SAFE_NO_PAD.encode(bytes))
	}

	/// Returns the raw secret. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.value
	}

	/// Signs `data` and returns the base64url (no padding) encoded MAC.
	pub fn sign(&self, data: &[u8]) -> String {
		let mut mac = self.mac.clone();

		mac.update(data);

		URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
	}

	/// Compares `signature` with the MAC of `data` in constant time.
	pub fn matches(&self, data: &[u8], signature: &str) -> Choice {
		self.sign(data).as_bytes().ct_eq(signature.as_bytes())
	}
}
impl PartialEq for SigningSecret {
	fn eq(&self, other: &Self) -> bool {
		self.value.as_bytes().ct_eq(other.value.as_bytes()).into()
	}
}
impl Eq for SigningSecret {}
impl Debug for SigningSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("SigningSecret").field(&"<redacted>").finish()
	}
}
impl Display for SigningSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Ordered set of secrets: the primary signs new tokens, every entry may verify.
///
/// Rotating means promoting a new primary and keeping the old one in `previous` until the
/// longest-lived token it signed has expired.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecretRing {
	primary: SigningSecret,
	previous: Vec<SigningSecret>,
}
impl SecretRing {
	/// Creates a ring holding only `primary`.
	pub fn new(primary: SigningSecret) -> Self {
		Self { primary, previous: Vec::new() }
	}

	/// Appends a retired secret that is still accepted for verification.
	pub fn with_previous(mut self, secret: SigningSecret) -> Self {
		if secret != self.primary && !self.previous.contains(&secret) {
			self.previous.push(secret);
		}

		self
	}

	/// Secret used for signing.
	pub fn primary(&self) -> &SigningSecret {
		&self.primary
	}

	/// Secrets accepted for verification, primary first.
	pub fn iter(&self) -> impl Iterator<Item = &SigningSecret> {
		std::iter::once(&self.primary).chain(self.previous.iter())
	}

	/// Number of secrets accepted for verification.
	pub fn len(&self) -> usize {
		1 + self.previous.len()
	}

	/// Always `false`; a ring holds at least its primary.
	pub fn is_empty(&self) -> bool {
		false
	}

	/// Returns whether `signature` is valid for `data` under any secret.
	///
	/// Every secret is checked so the timing does not depend on which one matched.
	pub fn verify(&self, data: &[u8], signature: &str) -> bool {
		self.iter()
			.fold(Choice::from(0), |acc, secret| acc | secret.matches(data, signature))
			.into()
	}
}
