//! Signed capability tokens: the codec, its signing secrets, and the decoded payload.
//!
//! Wire format (interoperable with links already in circulation):
//!
//! ```text
//! token            := payloadSegment "." signatureSegment
//! payloadSegment   := base64url(utf8(JSON({ ...callerFields, expires_at: <ms-epoch int> })))
//! signatureSegment := base64url(HMAC_SHA256(secret, payloadSegment))
//! ```
//!
//! Both segments use the URL-safe alphabet without padding, so tokens can be embedded directly in
//! URL path segments.

pub mod codec;
pub mod payload;
pub mod secret;

pub use codec::*;
pub use payload::*;
pub use secret::*;
