//! Verified token payloads and typed accessors for the fields callers embed.

// crates.io
use serde_json::{Map, Value};
// self
use crate::{
	_prelude::*,
	clock,
	error::PayloadError,
	id::{CompanyId, ContactId, QuoteId, UserId},
};

/// Field the encoder stamps on every payload.
pub const EXPIRES_AT_FIELD: &str = "expires_at";

/// JSON object recovered from a token whose signature and expiry checked out.
///
/// `fields` holds every key exactly as it was signed, `expires_at` included, so
/// [`into_value`](Self::into_value) reproduces the issued object.
#[derive(Clone, Debug, PartialEq)]
pub struct TokenPayload {
	expires_at: i64,
	fields: Map<String, Value>,
}
impl TokenPayload {
	pub(crate) fn new(expires_at: i64, fields: Map<String, Value>) -> Self {
		Self { expires_at, fields }
	}

	/// Expiry instant in milliseconds since the Unix epoch.
	pub fn expires_at(&self) -> i64 {
		self.expires_at
	}

	/// Expiry instant as a UTC timestamp, when representable.
	pub fn expires_at_utc(&self) -> Option<OffsetDateTime> {
		clock::from_unix_millis(self.expires_at)
	}

	/// Returns the raw value for `key`.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.fields.get(key)
	}

	/// Returns the string value for `key`, if present and a string.
	pub fn get_str(&self, key: &str) -> Option<&str> {
		self.get(key).and_then(Value::as_str)
	}

	/// Company the link was issued for.
	pub fn company_id(&self) -> Option<CompanyId> {
		self.get("company_id").and_then(|v| CompanyId::from_value(v).ok())
	}

	/// Contact the link was personalized for.
	pub fn contact_id(&self) -> Option<ContactId> {
		self.get("contact_id").and_then(|v| ContactId::from_value(v).ok())
	}

	/// Quote the link grants access to.
	pub fn quote_id(&self) -> Option<QuoteId> {
		self.get("quote_id").and_then(|v| QuoteId::from_value(v).ok())
	}

	/// Staff user who issued the link.
	pub fn user_id(&self) -> Option<UserId> {
		self.get("user_id").and_then(|v| UserId::from_value(v).ok())
	}

	/// Whether the link was issued as a test send. Absent means `false`.
	pub fn is_test(&self) -> bool {
		self.get("is_test").and_then(Value::as_bool).unwrap_or(false)
	}

	/// Borrows every signed field, `expires_at` included.
	pub fn as_map(&self) -> &Map<String, Value> {
		&self.fields
	}

	/// Returns the signed object.
	pub fn into_value(self) -> Value {
		Value::Object(self.fields)
	}

	/// Decodes the payload into a typed shape, reporting the path of the first mismatch.
	pub fn decode<T>(&self) -> Result<T, PayloadError>
	where
		T: DeserializeOwned,
	{
		let value = Value::Object(self.fields.clone());

		Ok(serde_path_to_error::deserialize(value)?)
	}
}

/// Reads `expires_at` as integer milliseconds; anything non-numeric is treated as absent.
///
/// Fractional values round up, so the strict `expires_at > now` check against whole-millisecond
/// clocks gives the same answer as comparing the raw number.
pub(crate) fn read_expires_at(fields: &Map<String, Value>) -> Option<i64> {
	let value = fields.get(EXPIRES_AT_FIELD)?;

	if let Some(millis) = value.as_i64() {
		return Some(millis);
	}

	value
		.as_f64()
		.filter(|millis| millis.is_finite() && (i64::MIN as f64..=i64::MAX as f64).contains(millis))
		.map(|millis| millis.ceil() as i64)
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "boolean",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	}
}
