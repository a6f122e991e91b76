//! Background eviction of elapsed rate-limit windows.

// std
use std::time::Duration as StdDuration;
// crates.io
use tokio::{
	runtime::Handle,
	task::JoinHandle,
	time::{self as tokio_time, MissedTickBehavior},
};
// self
use crate::{_prelude::*, error::ConfigError, rate_limit::RateLimiter};

/// Periodically calls [`RateLimiter::sweep`] on a tokio runtime.
///
/// Nothing runs until [`start`](Self::start); [`stop`](Self::stop) aborts the task. Dropping the
/// sweeper stops it as well.
pub struct Sweeper {
	limiter: RateLimiter,
	every: StdDuration,
	task: Mutex<Option<JoinHandle<()>>>,
}
impl Sweeper {
	/// Creates a stopped sweeper that will run every `every` once started.
	pub fn new(limiter: RateLimiter, every: Duration) -> Result<Self, ConfigError> {
		let every = StdDuration::try_from(every)
			.ok()
			.filter(|every| !every.is_zero())
			.ok_or(ConfigError::NonPositiveWindow)?;

		Ok(Self { limiter, every, task: Mutex::new(None) })
	}

	/// Starts sweeping on the ambient tokio runtime.
	///
	/// Returns `Ok(false)` when already running.
	pub fn start(&self) -> Result<bool, ConfigError> {
		let handle = Handle::try_current().map_err(|_| ConfigError::NoAsyncRuntime)?;

		Ok(self.start_on(&handle))
	}

	/// Starts sweeping on `handle`. Returns `false` when already running.
	pub fn start_on(&self, handle: &Handle) -> bool {
		let mut task = self.task.lock();

		if task.as_ref().is_some_and(|running| !running.is_finished()) {
			return false;
		}

		let limiter = self.limiter.clone();
		let every = self.every;

		*task = Some(handle.spawn(async move {
			let mut ticker = tokio_time::interval(every);

			ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

			loop {
				ticker.tick().await;
				limiter.sweep();
			}
		}));

		true
	}

	/// Stops the background task. Returns `false` when it was not running.
	pub fn stop(&self) -> bool {
		match self.task.lock().take() {
			Some(task) => {
				task.abort();

				true
			},
			None => false,
		}
	}

	/// Returns `true` while the background task is alive.
	pub fn is_running(&self) -> bool {
		self.task.lock().as_ref().is_some_and(|task| !task.is_finished())
	}

	/// Sweep interval.
	pub fn interval(&self) -> StdDuration {
		self.every
	}
}
impl Drop for Sweeper {
	fn drop(&mut self) {
		self.stop();
	}
}
impl Debug for Sweeper {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Sweeper")
			.field("every", &self.every)
			.field("running", &self.is_running())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;
	use crate::{clock::ManualClock, rate_limit::RateLimitConfig};

	#[test]
	fn zero_and_negative_intervals_are_rejected() {
		assert!(Sweeper::new(RateLimiter::in_memory(), Duration::ZERO).is_err());
		assert!(Sweeper::new(RateLimiter::in_memory(), Duration::seconds(-1)).is_err());
	}

	#[test]
	fn start_requires_a_runtime() {
		let sweeper = Sweeper::new(RateLimiter::in_memory(), Duration::seconds(1))
			.expect("Sweeper fixture should be valid.");

		assert!(matches!(sweeper.start(), Err(ConfigError::NoAsyncRuntime)));
		assert!(!sweeper.is_running());
	}

	#[tokio::test(start_paused = true)]
	async fn start_sweeps_and_stop_halts() {
		let clock = Arc::new(ManualClock::new(macros::datetime!(2025-11-10 12:00 UTC)));
		let limiter = RateLimiter::in_memory().with_clock(clock.clone());
		let config = RateLimitConfig::new(1, Duration::seconds(1))
			.expect("Rate limit fixture should be valid.");

		limiter.check("203.0.113.9", &config);
		clock.advance(Duration::seconds(5));

		let sweeper = Sweeper::new(limiter.clone(), Duration::minutes(1))
			.expect("Sweeper fixture should be valid.");

		assert!(sweeper.start().expect("Runtime should be available."));
		assert!(
			!sweeper.start().expect("Runtime should be available."),
			"Second start is a no-op."
		);

		tokio_time::sleep(StdDuration::from_secs(61)).await;

		assert_eq!(limiter.tracked(), 0);
		assert!(sweeper.is_running());
		assert!(sweeper.stop());
		assert!(!sweeper.stop());
		assert!(!sweeper.is_running());

		limiter.check("203.0.113.9", &config);
		clock.advance(Duration::seconds(5));
		tokio_time::sleep(StdDuration::from_secs(120)).await;

		assert_eq!(limiter.tracked(), 1, "Stopped sweeper must not evict.");
	}
}
