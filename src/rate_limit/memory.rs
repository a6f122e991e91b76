//! Thread-safe in-memory [`RateLimitStore`] implementation.

// self
use crate::{
	_prelude::*,
	rate_limit::{RateLimitEntry, RateLimitStore},
};

type EntryMap = Arc<Mutex<HashMap<String, RateLimitEntry>>>;

/// Process-local counters; cloning shares the same map.
#[derive(Clone, Debug, Default)]
pub struct MemoryRateLimitStore(EntryMap);
impl RateLimitStore for MemoryRateLimitStore {
	fn hit(&self, identifier: &str, now: OffsetDateTime, window: Duration) -> RateLimitEntry {
		let mut guard = self.0.lock();

		match guard.get_mut(identifier) {
			Some(entry) if !entry.is_elapsed_at(now) => {
				entry.count = entry.count.saturating_add(1);

				*entry
			},
			Some(entry) => {
				*entry = RateLimitEntry::open(now, window);

				*entry
			},
			None => {
				let entry = RateLimitEntry::open(now, window);

				guard.insert(identifier.to_owned(), entry);

				entry
			},
		}
	}

	fn peek(&self, identifier: &str) -> Option<RateLimitEntry> {
		self.0.lock().get(identifier).copied()
	}

	fn sweep(&self, now: OffsetDateTime) -> usize {
		let mut guard = self.0.lock();
		let before = guard.len();

		guard.retain(|_, entry| !entry.is_elapsed_at(now));

		before - guard.len()
	}

	fn len(&self) -> usize {
		self.0.lock().len()
	}
}
