// crates.io
use color_eyre::Result;
use serde_json::json;
// self
use portal_tokens::{
	_preludet::*,
	action::ActionTokenValidator,
	client_ip::ClientIpPolicy,
	clock::{Clock, ManualClock},
	config::{
		ENV_ACTION_MAX_ATTEMPTS, ENV_SECRET, ENV_TRUST_FORWARDED, ENV_TRUSTED_PROXIES, TokenConfig,
	},
	error::{ActionTokenError, VerifyError},
	grant::{ActionGrant, ActionKind},
	id::{QuoteId, UserId},
	rate_limit::{RateLimitConfig, RateLimiter},
};

fn ip(raw: &str) -> IpAddr {
	raw.parse().expect("IP fixture should parse.")
}

fn build_validator(max_attempts: u32) -> (ActionTokenValidator, Arc<ManualClock>) {
	let clock = test_clock();
	let codec = Arc::new(build_test_codec(clock.clone()));
	let limiter = RateLimiter::in_memory().with_clock(clock.clone());
	let budget = RateLimitConfig::new(max_attempts, Duration::minutes(15))
		.expect("Budget fixture should be valid.");

	(ActionTokenValidator::new(codec, limiter, budget), clock)
}

fn approve_token(clock: Arc<ManualClock>) -> Result<String> {
	let grant = ActionGrant::new(ActionKind::ApproveQuote)
		.for_quote(QuoteId::new("Q1")?)
		.issued_by(UserId::new("U1")?);

	Ok(build_test_codec(clock).issue(&grant)?)
}

#[test]
fn approval_link_is_limited_per_client() -> Result<()> {
	let (validator, clock) = build_validator(5);
	let token = approve_token(clock.clone())?;
	let client = ip("198.51.100.7");

	for _ in 0..5 {
		let grant = validator.validate_action(&token, client, ActionKind::ApproveQuote)?;

		assert_eq!(grant.quote_id, Some(QuoteId::new("Q1")?));
	}

	let err = validator
		.validate_action(&token, client, ActionKind::ApproveQuote)
		.expect_err("Sixth attempt must be rate limited.");
	let ActionTokenError::RateLimited { reset_at } = &err else {
		panic!("Expected a rate-limit failure, got {err:?}.");
	};

	assert_eq!(*reset_at, clock.now() + Duration::minutes(15));

	Ok(())
}

#[test]
fn rate_limit_wins_over_signature_failures() {
	let (validator, _) = build_validator(1);
	let client = ip("203.0.113.9");

	assert!(matches!(
		validator.validate("validbase64.invalidsignature", client),
		Err(ActionTokenError::Rejected(VerifyError::BadSignature))
	));
	assert!(
		validator
			.validate("validbase64.invalidsignature", client)
			.expect_err("Budget is spent.")
			.is_rate_limited()
	);
}

#[test]
fn expired_action_links_are_rejected_but_counted() -> Result<()> {
	let (validator, clock) = build_validator(2);
	let codec = build_test_codec(clock.clone());
	let token = codec.generate(&json!({ "action_type": "add_note" }), Duration::hours(-1))?;
	let client = ip("198.51.100.7");
	let err = validator.validate(&token, client).expect_err("Expired link must fail.");

	assert!(matches!(err, ActionTokenError::Rejected(ref reason) if reason.is_expired()));
	assert_eq!(validator.limiter().tracked(), 1);

	Ok(())
}

#[test]
fn configured_validator_resolves_clients_behind_proxies() -> Result<()> {
	let env = [
		(ENV_SECRET, TEST_SECRET),
		(ENV_ACTION_MAX_ATTEMPTS, "1"),
		(ENV_TRUST_FORWARDED, "yes"),
		(ENV_TRUSTED_PROXIES, "10.0.0.1"),
	];
	let config = TokenConfig::from_lookup(|key| {
		env.iter().find(|(name, _)| *name == key).map(|(_, value)| value.to_string())
	})?;
	let codec = Arc::new(config.codec());
	let validator = config.action_validator(codec.clone(), RateLimiter::in_memory());
	let token = codec.issue(&ActionGrant::new(ActionKind::Unsubscribe))?;
	let proxy = ip("10.0.0.1");
	let first = config.client_ip.resolve(proxy, Some("6.6.6.6, 198.51.100.7"), None);
	let second = config.client_ip.resolve(proxy, Some("198.51.100.8"), None);

	assert_ne!(config.client_ip, ClientIpPolicy::peer_only());
	assert!(validator.validate(&token, first).is_ok());
	assert!(validator.validate(&token, first).expect_err("Budget is spent.").is_rate_limited());
	assert!(
		validator.validate(&token, second).is_ok(),
		"A different client has its own budget."
	);

	Ok(())
}
