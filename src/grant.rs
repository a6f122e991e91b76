//! Typed capability payloads and the policy deciding how long each capability lives.
//!
//! Grants are plain serde structs; the codec signs whatever fields they serialize, so optional
//! fields are skipped when absent to keep tokens short.

pub mod action;
pub mod policy;
pub mod portal;
pub mod quote;

pub use action::*;
pub use policy::*;
pub use portal::*;
pub use quote::*;

// self
use crate::_prelude::*;

/// Payload shape bound to a [`Capability`].
pub trait Grant
where
	Self: Serialize + DeserializeOwned,
{
	/// Capability the grant confers; selects the default TTL and link prefix.
	const CAPABILITY: Capability;
}

pub(crate) fn is_false(value: &bool) -> bool {
	!*value
}
