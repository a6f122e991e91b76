//! Deployment configuration: secrets, lifetimes, action budget, and proxy trust.

// std
use std::{env, fs};
// self
use crate::{
	_prelude::*,
	action::{
		ActionTokenValidator, DEFAULT_ACTION_MAX_ATTEMPTS, DEFAULT_ACTION_WINDOW_SECS,
	},
	client_ip::ClientIpPolicy,
	error::ConfigError,
	grant::{Capability, TtlPolicy},
	obs,
	rate_limit::{RateLimitConfig, RateLimiter, Sweeper},
	token::{SecretRing, SigningSecret, TokenCodec},
};

/// Environment key holding the primary signing secret.
pub const ENV_SECRET: &str = "PORTAL_TOKEN_SECRET";
/// Environment key naming a file that holds the primary signing secret.
pub const ENV_SECRET_FILE: &str = "PORTAL_TOKEN_SECRET_FILE";
/// Environment key holding comma-separated retired secrets still accepted for verification.
pub const ENV_PREVIOUS_SECRETS: &str = "PORTAL_TOKEN_PREVIOUS_SECRETS";
/// Environment key overriding the quote link lifetime, in hours.
pub const ENV_QUOTE_TTL_HOURS: &str = "PORTAL_TOKEN_QUOTE_TTL_HOURS";
/// Environment key overriding the reorder link lifetime, in hours.
pub const ENV_REORDER_TTL_HOURS: &str = "PORTAL_TOKEN_REORDER_TTL_HOURS";
/// Environment key overriding the offer link lifetime, in hours.
pub const ENV_OFFER_TTL_HOURS: &str = "PORTAL_TOKEN_OFFER_TTL_HOURS";
/// Environment key overriding the action link lifetime, in hours.
pub const ENV_ACTION_TTL_HOURS: &str = "PORTAL_TOKEN_ACTION_TTL_HOURS";
/// Environment key overriding the action attempts allowed per window.
pub const ENV_ACTION_MAX_ATTEMPTS: &str = "PORTAL_TOKEN_ACTION_MAX_ATTEMPTS";
/// Environment key overriding the action attempt window, in seconds.
pub const ENV_ACTION_WINDOW_SECS: &str = "PORTAL_TOKEN_ACTION_WINDOW_SECS";
/// Environment key enabling forwarded-header trust.
pub const ENV_TRUST_FORWARDED: &str = "PORTAL_TOKEN_TRUST_FORWARDED";
/// Environment key listing comma-separated trusted proxy addresses.
pub const ENV_TRUSTED_PROXIES: &str = "PORTAL_TOKEN_TRUSTED_PROXIES";
/// Environment key overriding the rate-limit sweep interval, in seconds.
pub const ENV_SWEEP_INTERVAL_SECS: &str = "PORTAL_TOKEN_SWEEP_INTERVAL_SECS";

const SECONDS_PER_HOUR: i64 = 60 * 60;

/// Default interval between rate-limit sweeps.
pub const DEFAULT_SWEEP_INTERVAL_SECS: i64 = 60;

/// Everything needed to assemble the codec, the action validator, and the sweeper.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenConfig {
	/// Signing and verification secrets.
	pub secrets: SecretRing,
	/// Lifetime per capability.
	pub ttl_policy: TtlPolicy,
	/// Attempt budget for action links.
	pub action_budget: RateLimitConfig,
	/// Client address trust boundary.
	pub client_ip: ClientIpPolicy,
	/// Interval between rate-limit sweeps.
	pub sweep_interval: Duration,
}
impl TokenConfig {
	/// Returns a builder seeded with `primary` and defaults for everything else.
	pub fn builder(primary: SigningSecret) -> TokenConfigBuilder {
		TokenConfigBuilder::new(primary)
	}

	/// Loads configuration from the process environment.
	///
	/// Fails fast when the secret is missing or any value is unparsable, so misconfiguration
	/// surfaces at startup instead of per request.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|key| env::var(key).ok())
	}

	/// Loads configuration through `lookup`, which maps environment keys to values.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let mut builder = Self::builder(load_primary_secret(&lookup)?);

		for previous in list(&lookup, ENV_PREVIOUS_SECRETS) {
			builder = builder.previous_secret(SigningSecret::new(previous)?);
		}

		for (key, capability) in [
			(ENV_QUOTE_TTL_HOURS, Capability::Quote),
			(ENV_REORDER_TTL_HOURS, Capability::Reorder),
			(ENV_OFFER_TTL_HOURS, Capability::Offer),
			(ENV_ACTION_TTL_HOURS, Capability::Action),
		] {
			if let Some(hours) = positive::<i64, _>(&lookup, key)? {
				builder = builder.ttl(capability, hours_to_duration(key, hours)?);
			}
		}

		let max_attempts = positive::<u32, _>(&lookup, ENV_ACTION_MAX_ATTEMPTS)?
			.unwrap_or(DEFAULT_ACTION_MAX_ATTEMPTS);
		let window_secs = positive::<i64, _>(&lookup, ENV_ACTION_WINDOW_SECS)?
			.unwrap_or(DEFAULT_ACTION_WINDOW_SECS);

		builder = builder
			.action_budget(RateLimitConfig::new(max_attempts, Duration::seconds(window_secs))?);

		if flag(&lookup, ENV_TRUST_FORWARDED)?.unwrap_or(false) {
			let proxies = list(&lookup, ENV_TRUSTED_PROXIES)
				.into_iter()
				.map(|raw| {
					raw.parse::<IpAddr>().map_err(|e| ConfigError::InvalidValue {
						key: ENV_TRUSTED_PROXIES,
						reason: format!("`{raw}`: {e}"),
					})
				})
				.collect::<Result<Vec<_>, _>>()?;

			builder = builder.client_ip(ClientIpPolicy::behind(proxies));
		}

		if let Some(secs) = positive::<i64, _>(&lookup, ENV_SWEEP_INTERVAL_SECS)? {
			builder = builder.sweep_interval(Duration::seconds(secs));
		}

		Ok(builder.build())
	}

	/// Builds a codec using the wall clock.
	pub fn codec(&self) -> TokenCodec {
		TokenCodec::new(self.secrets.clone()).with_ttl_policy(self.ttl_policy)
	}

	/// Builds an action validator sharing `codec` and counting attempts in `limiter`.
	pub fn action_validator(
		&self,
		codec: Arc<TokenCodec>,
		limiter: RateLimiter,
	) -> ActionTokenValidator {
		ActionTokenValidator::new(codec, limiter, self.action_budget)
	}

	/// Builds a stopped sweeper for `limiter`.
	pub fn sweeper(&self, limiter: RateLimiter) -> Result<Sweeper, ConfigError> {
		Sweeper::new(limiter, self.sweep_interval)
	}
}

/// Builder for [`TokenConfig`].
#[derive(Debug)]
pub struct TokenConfigBuilder {
	secrets: SecretRing,
	ttl_policy: TtlPolicy,
	action_budget: RateLimitConfig,
	client_ip: ClientIpPolicy,
	sweep_interval: Duration,
}
impl TokenConfigBuilder {
	fn new(primary: SigningSecret) -> Self {
		Self {
			secrets: SecretRing::new(primary),
			ttl_policy: TtlPolicy::default(),
			action_budget: RateLimitConfig {
				max_requests: DEFAULT_ACTION_MAX_ATTEMPTS,
				window: Duration::seconds(DEFAULT_ACTION_WINDOW_SECS),
			},
			client_ip: ClientIpPolicy::default(),
			sweep_interval: Duration::seconds(DEFAULT_SWEEP_INTERVAL_SECS),
		}
	}

	/// Accepts a retired secret for verification.
	pub fn previous_secret(mut self, secret: SigningSecret) -> Self {
		self.secrets = self.secrets.with_previous(secret);

		self
	}

	/// Overrides the lifetime of one capability.
	pub fn ttl(mut self, capability: Capability, ttl: Duration) -> Self {
		self.ttl_policy = self.ttl_policy.with_ttl(capability, ttl);

		self
	}

	/// Overrides the action attempt budget.
	pub fn action_budget(mut self, budget: RateLimitConfig) -> Self {
		self.action_budget = budget;

		self
	}

	/// Overrides the client address trust boundary.
	pub fn client_ip(mut self, policy: ClientIpPolicy) -> Self {
		self.client_ip = policy;

		self
	}

	/// Overrides the sweep interval.
	pub fn sweep_interval(mut self, interval: Duration) -> Self {
		self.sweep_interval = interval;

		self
	}

	/// Consumes the builder and produces a [`TokenConfig`].
	pub fn build(self) -> TokenConfig {
		TokenConfig {
			secrets: self.secrets,
			ttl_policy: self.ttl_policy,
			action_budget: self.action_budget,
			client_ip: self.client_ip,
			sweep_interval: self.sweep_interval,
		}
	}
}

fn load_primary_secret<F>(lookup: &F) -> Result<SigningSecret, ConfigError>
where
	F: Fn(&str) -> Option<String>,
{
	if let Some(value) = lookup(ENV_SECRET).filter(|value| !value.trim().is_empty()) {
		return Ok(SigningSecret::new(value.trim())?);
	}

	let Some(path) = lookup(ENV_SECRET_FILE) else {
		return Err(ConfigError::MissingSecret { key: ENV_SECRET });
	};
	let contents = fs::read_to_string(&path)
		.map_err(|source| ConfigError::SecretFile { path: path.clone(), source })?;

	Ok(SigningSecret::new(contents.trim())?)
}

fn hours_to_duration(key: &'static str, hours: i64) -> Result<Duration, ConfigError> {
	hours.checked_mul(SECONDS_PER_HOUR).map(Duration::seconds).ok_or_else(|| {
		ConfigError::InvalidValue { key, reason: format!("{hours} hours is out of range") }
	})
}

fn list<F>(lookup: &F, key: &'static str) -> Vec<String>
where
	F: Fn(&str) -> Option<String>,
{
	lookup(key)
		.map(|raw| {
			raw.split(',')
				.map(str::trim)
				.filter(|item| !item.is_empty())
				.map(String::from)
				.collect()
		})
		.unwrap_or_default()
}

fn parse<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
	F: Fn(&str) -> Option<String>,
	T: FromStr,
	T::Err: Display,
{
	let Some(raw) = lookup(key) else {
		obs::trace_config_default(key);

		return Ok(None);
	};

	raw.trim()
		.parse::<T>()
		.map(Some)
		.map_err(|e| ConfigError::InvalidValue { key, reason: e.to_string() })
}

fn positive<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
	F: Fn(&str) -> Option<String>,
	T: FromStr + PartialOrd + Default,
	T::Err: Display,
{
	match parse::<_, T>(lookup, key)? {
		Some(value) if value <= T::default() =>
			Err(ConfigError::InvalidValue { key, reason: "must be positive".into() }),
		value => Ok(value),
	}
}

fn flag<F>(lookup: &F, key: &'static str) -> Result<Option<bool>, ConfigError>
where
	F: Fn(&str) -> Option<String>,
{
	let Some(raw) = lookup(key) else {
		return Ok(None);
	};

	match raw.trim().to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(Some(true)),
		"0" | "false" | "no" | "off" | "" => Ok(Some(false)),
		other =>
			Err(ConfigError::InvalidValue { key, reason: format!("`{other}` is not a boolean") }),
	}
}
