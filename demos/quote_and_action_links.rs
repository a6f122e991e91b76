//! Issues a personalized quote link and an approval link, then walks the approval link through
//! the attempt-limited action validator the way a request handler would.

// std
use std::{net::IpAddr, sync::Arc};
// crates.io
use color_eyre::Result;
use serde_json::Number;
// self
use portal_tokens::{
	config::TokenConfig,
	grant::{ActionGrant, ActionKind, Capability, QuoteGrant, QuoteItem},
	id::{CompanyId, ContactId, QuoteId, UserId},
	link::LinkBuilder,
	rate_limit::RateLimiter,
	token::SigningSecret,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let config = TokenConfig::builder(SigningSecret::generate()?).build();
	let codec = Arc::new(config.codec());
	let limiter = RateLimiter::in_memory();
	let sweeper = config.sweeper(limiter.clone())?;
	let validator = config.action_validator(codec.clone(), limiter);
	let links = LinkBuilder::parse("https://portal.example.com/")?;

	sweeper.start()?;

	let quote = QuoteGrant::new(QuoteId::new("Q1")?, CompanyId::new("C1")?)
		.for_contact(ContactId::new("K1")?)
		.with_pricing_mode("standard")
		.with_item(QuoteItem {
			product_code: "TC-01".into(),
			description: "Tri-Creaser".into(),
			quantity: 2,
			unit_price: Number::from(150),
			discount_percent: Number::from(0),
			product_type: "tool".into(),
			category: None,
			image: None,
		});
	let quote_token = codec.issue(&quote)?;

	println!("quote link: {}", links.url(Capability::Quote, &quote_token));

	let approval = ActionGrant::new(ActionKind::ApproveQuote)
		.for_quote(QuoteId::new("Q1")?)
		.issued_by(UserId::new("U7")?);
	let approval_token = codec.issue(&approval)?;

	println!("approval link: {}", links.url(Capability::Action, &approval_token));

	let client = config.client_ip.resolve("198.51.100.7".parse::<IpAddr>()?, None, None);

	for attempt in 1..=config.action_budget.max_requests + 1 {
		match validator.validate_action(&approval_token, client, ActionKind::ApproveQuote) {
			Ok(grant) => println!("attempt {attempt}: approve quote {:?}", grant.quote_id),
			Err(e) if e.is_rate_limited() => println!("attempt {attempt}: 429 ({e})"),
			Err(e) => println!("attempt {attempt}: 401 ({e})"),
		}
	}

	sweeper.stop();

	Ok(())
}
