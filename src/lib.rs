//! Stateless, HMAC-signed capability links for quote, reorder, offer, and one-shot action
//! portals, plus the fixed-window attempt limiter that guards action links.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod action;
pub mod client_ip;
pub mod clock;
pub mod config;
pub mod error;
pub mod grant;
pub mod id;
pub mod link;
pub mod obs;
pub mod rate_limit;
pub mod token;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		clock::ManualClock,
		token::{SecretRing, SigningSecret, TokenCodec},
	};

	/// Primary secret used by test fixtures.
	pub const TEST_SECRET: &str = "test-secret-0123456789abcdefghijklmnop";
	/// Retired secret used by rotation fixtures.
	pub const TEST_PREVIOUS_SECRET: &str = "retired-secret-0123456789abcdefghijkl";

	/// Builds a signing secret from a fixture string.
	pub fn test_secret(value: &str) -> SigningSecret {
		SigningSecret::new(value).expect("Fixture secret should satisfy the minimum length.")
	}

	/// Manual clock pinned to 2025-11-10 12:00 UTC.
	pub fn test_clock() -> Arc<ManualClock> {
		Arc::new(ManualClock::new(time::macros::datetime!(2025-11-10 12:00 UTC)))
	}

	/// Constructs a [`TokenCodec`] signing with [`TEST_SECRET`] and driven by the provided clock.
	pub fn build_test_codec(clock: Arc<ManualClock>) -> TokenCodec {
		TokenCodec::new(SecretRing::new(test_secret(TEST_SECRET))).with_clock(clock)
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		net::IpAddr,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use url;
#[cfg(test)] use color_eyre as _;
