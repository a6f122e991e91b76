//! Fixed-window attempt limiting for action links and public endpoints.
//!
//! Each identifier owns a window that opens on its first request and lasts `window`. Requests
//! inside the window increment a counter; once the counter exceeds `max_requests` the limiter
//! denies until the window closes, after which the next request opens a fresh window.
//!
//! The bundled [`MemoryRateLimitStore`] is process-local: several server instances each keep
//! their own counters, so it suits soft throttling rather than strict quotas. Plug a shared
//! [`RateLimitStore`] in when a fleet-wide budget is required.

pub mod memory;
pub mod sweeper;

pub use memory::MemoryRateLimitStore;
pub use sweeper::Sweeper;

// crates.io
use time::PrimitiveDateTime;
// self
use crate::{
	_prelude::*,
	clock::{self, Clock},
	error::ConfigError,
	obs::{self, OpOutcome, TokenOp},
};

/// Budget applied to one identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
	/// Requests allowed per window.
	pub max_requests: u32,
	/// Window length.
	pub window: Duration,
}
impl RateLimitConfig {
	/// Creates a validated budget.
	pub fn new(max_requests: u32, window: Duration) -> Result<Self, ConfigError> {
		if max_requests == 0 {
			return Err(ConfigError::ZeroAttempts);
		}
		if !window.is_positive() {
			return Err(ConfigError::NonPositiveWindow);
		}

		Ok(Self { max_requests, window })
	}
}

/// Counter state kept per identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimitEntry {
	/// Requests seen in the current window, including the current one.
	pub count: u32,
	/// Instant the current window closes.
	pub reset_at: OffsetDateTime,
}
impl RateLimitEntry {
	/// Opens a window with one request at `now`.
	///
	/// Windows that would run past the last representable instant end at that instant.
	pub fn open(now: OffsetDateTime, window: Duration) -> Self {
		let reset_at =
			now.checked_add(window).unwrap_or_else(|| PrimitiveDateTime::MAX.assume_utc());

		Self { count: 1, reset_at }
	}

	/// Returns `true` once the window has closed at `now`.
	pub fn is_elapsed_at(&self, now: OffsetDateTime) -> bool {
		now >= self.reset_at
	}
}

/// Result of a [`RateLimiter::check`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimitDecision {
	/// Whether the request may proceed.
	pub success: bool,
	/// Requests left in the current window.
	pub remaining: u32,
	/// Instant the current window closes.
	pub reset_at: OffsetDateTime,
}

/// Storage contract for per-identifier counters.
///
/// Implementations must apply [`hit`](Self::hit) atomically per identifier.
pub trait RateLimitStore
where
	Self: Send + Sync,
{
	/// Records one request for `identifier` and returns the updated entry.
	///
	/// Opens a new window of `window` starting at `now` when no entry exists or the existing
	/// window has elapsed.
	fn hit(&self, identifier: &str, now: OffsetDateTime, window: Duration) -> RateLimitEntry;

	/// Returns the entry for `identifier` without recording a request.
	fn peek(&self, identifier: &str) -> Option<RateLimitEntry>;

	/// Deletes every entry whose window elapsed at `now`; returns how many were removed.
	fn sweep(&self, now: OffsetDateTime) -> usize;

	/// Number of tracked identifiers.
	fn len(&self) -> usize;

	/// Returns `true` when no identifiers are tracked.
	fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

/// Fixed-window limiter over an injectable store and clock.
#[derive(Clone)]
pub struct RateLimiter {
	store: Arc<dyn RateLimitStore>,
	clock: Arc<dyn Clock>,
}
impl RateLimiter {
	/// Creates a limiter over `store` driven by the wall clock.
	pub fn new(store: Arc<dyn RateLimitStore>) -> Self {
		Self { store, clock: clock::shared_system_clock() }
	}

	/// Creates a limiter backed by a fresh [`MemoryRateLimitStore`].
	pub fn in_memory() -> Self {
		Self::new(Arc::new(MemoryRateLimitStore::default()))
	}

	/// Replaces the clock.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;

		self
	}

	/// Records a request for `identifier` and decides whether it may proceed.
	pub fn check(&self, identifier: &str, config: &RateLimitConfig) -> RateLimitDecision {
		let entry = self.store.hit(identifier, self.clock.now(), config.window);
		let success = entry.count <= config.max_requests;
		let decision = RateLimitDecision {
			success,
			remaining: config.max_requests.saturating_sub(entry.count),
			reset_at: entry.reset_at,
		};

		if !success {
			obs::trace_rejection(TokenOp::RateLimit, "window_exhausted");
		}

		obs::record_op_outcome(
			TokenOp::RateLimit,
			if success { OpOutcome::Success } else { OpOutcome::Failure },
		);

		decision
	}

	/// Deletes elapsed windows; returns how many were removed.
	pub fn sweep(&self) -> usize {
		let removed = self.store.sweep(self.clock.now());

		obs::record_op_outcome(TokenOp::Sweep, OpOutcome::Success);

		removed
	}

	/// Number of identifiers currently tracked.
	pub fn tracked(&self) -> usize {
		self.store.len()
	}

	/// Store backing the limiter.
	pub fn store(&self) -> &Arc<dyn RateLimitStore> {
		&self.store
	}
}
impl Debug for RateLimiter {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RateLimiter").field("tracked", &self.store.len()).finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;
	use crate::clock::ManualClock;

	fn limiter() -> (RateLimiter, Arc<ManualClock>) {
		let clock = Arc::new(ManualClock::new(macros::datetime!(2025-11-10 12:00 UTC)));

		(RateLimiter::in_memory().with_clock(clock.clone()), clock)
	}

	fn config() -> RateLimitConfig {
		RateLimitConfig::new(3, Duration::milliseconds(1_000))
			.expect("Rate limit fixture should be valid.")
	}

	#[test]
	fn config_rejects_empty_budgets() {
		assert!(matches!(
			RateLimitConfig::new(0, Duration::seconds(1)),
			Err(ConfigError::ZeroAttempts)
		));
		assert!(matches!(
			RateLimitConfig::new(1, Duration::ZERO),
			Err(ConfigError::NonPositiveWindow)
		));
	}

	#[test]
	fn oversized_windows_end_at_the_last_instant() {
		let (limiter, _) = limiter();
		let config = RateLimitConfig::new(1, Duration::seconds(i64::MAX))
			.expect("Any positive window should be accepted.");
		let first = limiter.check("action:1.2.3.4", &config);
		let second = limiter.check("action:1.2.3.4", &config);

		assert!(first.success);
		assert_eq!(first.reset_at, PrimitiveDateTime::MAX.assume_utc());
		assert!(!second.success);
		assert_eq!(second.reset_at, first.reset_at);
	}

	#[test]
	fn fixed_window_denies_after_budget_and_resets() {
		let (limiter, clock) = limiter();
		let config = config();
		let outcomes = (0..4)
			.map(|_| {
				clock.advance(Duration::milliseconds(100));

				limiter.check("10.0.0.1", &config)
			})
			.collect::<Vec<_>>();

		assert_eq!(outcomes.iter().map(|d| d.success).collect::<Vec<_>>(), [
			true, true, true, false
		]);
		assert_eq!(outcomes.iter().map(|d| d.remaining).collect::<Vec<_>>(), [2, 1, 0, 0]);
		assert_eq!(outcomes[3].reset_at, macros::datetime!(2025-11-10 12:00:01.1 UTC));

		clock.advance(Duration::milliseconds(1_000));

		let fresh = limiter.check("10.0.0.1", &config);

		assert!(fresh.success);
		assert_eq!(fresh.remaining, 2);
	}

	#[test]
	fn identifiers_are_independent() {
		let (limiter, _) = limiter();
		let config = RateLimitConfig::new(1, Duration::minutes(1))
			.expect("Rate limit fixture should be valid.");

		assert!(limiter.check("a", &config).success);
		assert!(!limiter.check("a", &config).success);
		assert!(limiter.check("b", &config).success);
		assert_eq!(limiter.tracked(), 2);
	}

	#[test]
	fn sweep_removes_only_elapsed_windows() {
		let (limiter, clock) = limiter();
		let short = RateLimitConfig::new(5, Duration::seconds(1))
			.expect("Rate limit fixture should be valid.");
		let long = RateLimitConfig::new(5, Duration::minutes(5))
			.expect("Rate limit fixture should be valid.");

		limiter.check("short", &short);
		limiter.check("long", &long);
		clock.advance(Duration::seconds(2));

		assert_eq!(limiter.sweep(), 1);
		assert!(limiter.store().peek("short").is_none());
		assert!(limiter.store().peek("long").is_some());
	}
}
