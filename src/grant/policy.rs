//! Capability kinds and their lifetimes.

// self
use crate::_prelude::*;

/// Default lifetime of quote, reorder, and offer links: 30 days.
pub const DEFAULT_LINK_TTL_HOURS: i64 = 720;
/// Default lifetime of one-shot action links.
pub const DEFAULT_ACTION_TTL_HOURS: i64 = 72;

/// What a token lets its bearer reach.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
	/// View (and accept) a single quote.
	Quote,
	/// Open a company's reorder portal.
	Reorder,
	/// Open a marketing offer page.
	Offer,
	/// Perform one logical action, such as adding a note.
	Action,
}
impl Capability {
	/// Every capability, in declaration order.
	pub const ALL: [Capability; 4] =
		[Capability::Quote, Capability::Reorder, Capability::Offer, Capability::Action];

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Capability::Quote => "quote",
			Capability::Reorder => "reorder",
			Capability::Offer => "offer",
			Capability::Action => "action",
		}
	}

	/// URL path segment the token is mounted under.
	pub const fn path_prefix(self) -> &'static str {
		match self {
			Capability::Quote => "q",
			Capability::Reorder => "r",
			Capability::Offer => "m",
			Capability::Action => "a",
		}
	}
}
impl Display for Capability {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Lifetime assigned to each capability at issuance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TtlPolicy {
	/// Lifetime of quote links.
	pub quote: Duration,
	/// Lifetime of reorder portal links.
	pub reorder: Duration,
	/// Lifetime of offer links.
	pub offer: Duration,
	/// Lifetime of one-shot action links.
	pub action: Duration,
}
impl TtlPolicy {
	/// Lifetime for `capability`.
	pub fn ttl_for(&self, capability: Capability) -> Duration {
		match capability {
			Capability::Quote => self.quote,
			Capability::Reorder => self.reorder,
			Capability::Offer => self.offer,
			Capability::Action => self.action,
		}
	}

	/// Overrides the lifetime for `capability`.
	pub fn with_ttl(mut self, capability: Capability, ttl: Duration) -> Self {
		match capability {
			Capability::Quote => self.quote = ttl,
			Capability::Reorder => self.reorder = ttl,
			Capability::Offer => self.offer = ttl,
			Capability::Action => self.action = ttl,
		}

		self
	}
}
impl Default for TtlPolicy {
	fn default() -> Self {
		let link = Duration::hours(DEFAULT_LINK_TTL_HOURS);

		Self {
			quote: link,
			reorder: link,
			offer: link,
			action: Duration::hours(DEFAULT_ACTION_TTL_HOURS),
		}
	}
}
