//! CRM record keys carried inside capability payloads.
//!
//! The CRM owns these keys and links only echo them back, so any non-blank string is accepted as
//! is. Older payloads carry integer keys; those are read as their decimal text so lookups work the
//! same either way. Keys always serialize as JSON strings.

// std
use std::{borrow::Borrow, ops::Deref};
// crates.io
use serde::{Deserializer, de};
use serde_json::Value;
// self
use crate::{_prelude::*, token::payload::json_kind};

/// Error returned when a payload value cannot address a record.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum IdentifierError {
	/// The key was empty or whitespace only.
	#[error("{kind} key is blank.")]
	Blank {
		/// Record kind (company, contact, quote, user).
		kind: &'static str,
	},
	/// The JSON value is neither a string nor an integer.
	#[error("{kind} key must be a string or an integer, found {found}.")]
	Unsupported {
		/// Record kind (company, contact, quote, user).
		kind: &'static str,
		/// JSON kind that was found instead.
		found: &'static str,
	},
}

macro_rules! record_key {
	($name:ident, $kind:literal, $doc:literal) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
		#[serde(transparent)]
		pub struct $name(String);
		impl $name {
			/// Record kind named in errors.
			pub const KIND: &'static str = $kind;

			/// Wraps a CRM key, rejecting blank input.
			pub fn new(key: impl Into<String>) -> Result<Self, IdentifierError> {
				let key = key.into();

				if key.trim().is_empty() {
					return Err(IdentifierError::Blank { kind: $kind });
				}

				Ok(Self(key))
			}

			/// Reads a key from a string or integer JSON value.
			pub fn from_value(value: &Value) -> Result<Self, IdentifierError> {
				Self::new(key_text($kind, value)?)
			}

			/// Key as sent to the CRM.
			pub fn as_str(&self) -> &str {
				&self.0
			}
		}
		impl<'de> Deserialize<'de> for $name {
			fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
			where
				D: Deserializer<'de>,
			{
				Self::from_value(&Value::deserialize(deserializer)?).map_err(de::Error::custom)
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &str {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(key: $name) -> Self {
				key.0
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.debug_tuple(stringify!($name)).field(&self.0).finish()
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
	};
}

record_key! { CompanyId, "Company", "Key of a customer or distributor company record." }
record_key! { ContactId, "Contact", "Key of a contact person at a company." }
record_key! { QuoteId, "Quote", "Key of a quote record." }
record_key! { UserId, "User", "Key of the staff user who issued an action link." }

fn key_text(kind: &'static str, value: &Value) -> Result<String, IdentifierError> {
	match value {
		Value::String(text) => Ok(text.clone()),
		Value::Number(number) if number.is_i64() || number.is_u64() => Ok(number.to_string()),
		other => Err(IdentifierError::Unsupported { kind, found: json_kind(other) }),
	}
}
