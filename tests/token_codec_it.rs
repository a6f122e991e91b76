// crates.io
use color_eyre::Result;
use serde_json::{Number, Value, json};
// self
use portal_tokens::{
	_preludet::*,
	clock::{Clock, unix_millis},
	error::VerifyError,
	grant::{Capability, QuoteGrant, QuoteItem},
	id::{CompanyId, ContactId, QuoteId},
	link::LinkBuilder,
	token::{SecretRing, TokenCodec},
};

fn quote_payload() -> Value {
	json!({
		"quote_id": "Q1",
		"company_id": "C1",
		"contact_id": "K1",
		"quote_items": [{
			"product_code": "TC-01",
			"description": "Tri-Creaser",
			"quantity": 2,
			"unit_price": 150,
			"discount_percent": 0,
			"product_type": "tool",
		}],
		"pricing_mode": "standard",
	})
}

#[test]
fn quote_link_lives_for_its_ttl_and_then_expires() -> Result<()> {
	let clock = test_clock();
	let codec = build_test_codec(clock.clone());
	let issued_at = clock.now_millis();
	let token = codec.generate(&quote_payload(), Duration::hours(720))?;
	let payload = codec.verify(&token).expect("Fresh quote token should verify.");
	let mut expected = quote_payload();

	expected["expires_at"] = json!(issued_at + Duration::hours(720).whole_milliseconds() as i64);

	assert_eq!(payload.clone().into_value(), expected);
	assert_eq!(payload.expires_at_utc(), Some(clock.now() + Duration::hours(720)));

	let grant = payload.decode::<QuoteGrant>()?;

	assert_eq!(grant.quote_id, QuoteId::new("Q1")?);
	assert_eq!(grant.contact_id, Some(ContactId::new("K1")?));
	assert_eq!(grant.pricing_mode.as_deref(), Some("standard"));
	assert_eq!(grant.total(), 300.0);

	clock.advance(Duration::hours(721));

	assert!(codec.verify(&token).is_none());
	assert!(codec.verify_detailed(&token).expect_err("Token should be expired.").is_expired());

	Ok(())
}

#[test]
fn every_single_character_flip_is_rejected() -> Result<()> {
	let codec = build_test_codec(test_clock());
	let token =
		codec.generate(&json!({ "company_id": "C1", "contact_id": "K1" }), Duration::hours(1))?;

	for (index, original) in token.char_indices() {
		let replacement = if original == 'A' { 'B' } else { 'A' };
		let mut tampered = token.clone();

		tampered.replace_range(index..index + original.len_utf8(), &replacement.to_string());

		assert!(
			codec.verify(&tampered).is_none(),
			"Flip at {index} should be rejected: {tampered}"
		);
	}

	Ok(())
}

#[test]
fn malformed_inputs_fail_closed() {
	let codec = build_test_codec(test_clock());

	for input in ["", "onlyonesegment", "a.b.c", ".", "payload.", ".signature"] {
		assert_eq!(
			codec.verify_detailed(input).expect_err("Malformed input must fail."),
			VerifyError::Malformed,
			"{input:?}"
		);
	}

	assert_eq!(
		codec.verify_detailed("validbase64.invalidsignature").expect_err("Forgery must fail."),
		VerifyError::BadSignature
	);
}

#[test]
fn tokens_for_different_contacts_are_independent() -> Result<()> {
	let codec = build_test_codec(test_clock());
	let first =
		codec.generate(&json!({ "quote_id": "Q1", "contact_id": "K1" }), Duration::hours(1))?;
	let second =
		codec.generate(&json!({ "quote_id": "Q1", "contact_id": "K2" }), Duration::hours(1))?;

	assert_ne!(first, second);

	let first = codec.verify(&first).expect("First contact token should verify.");
	let second = codec.verify(&second).expect("Second contact token should verify.");

	assert_eq!(first.contact_id(), Some(ContactId::new("K1")?));
	assert_eq!(second.contact_id(), Some(ContactId::new("K2")?));
	assert_eq!(first.quote_id(), second.quote_id());

	Ok(())
}

#[test]
fn negative_ttl_issues_expired_tokens() -> Result<()> {
	let clock = test_clock();
	let codec = build_test_codec(clock.clone());
	let token = codec.generate(&json!({ "company_id": "C1" }), Duration::hours(-1))?;

	assert_eq!(
		codec.verify_detailed(&token),
		Err(VerifyError::Expired {
			expired_at: unix_millis(clock.now()) - Duration::hours(1).whole_milliseconds() as i64,
		})
	);

	Ok(())
}

#[test]
fn rotated_secrets_keep_outstanding_links_alive() -> Result<()> {
	let clock = test_clock();
	let old = TokenCodec::new(SecretRing::new(test_secret(TEST_PREVIOUS_SECRET)))
		.with_clock(clock.clone());
	let token = old.generate(&json!({ "company_id": "C1" }), Duration::hours(1))?;
	let rotated = TokenCodec::new(
		SecretRing::new(test_secret(TEST_SECRET)).with_previous(test_secret(TEST_PREVIOUS_SECRET)),
	)
	.with_clock(clock.clone());
	let fresh = build_test_codec(clock);

	assert!(rotated.verify(&token).is_some());
	assert!(fresh.verify(&token).is_none());
	assert!(old.verify(&rotated.generate(&json!({}), Duration::hours(1))?).is_none());

	Ok(())
}

#[test]
fn issued_links_route_back_to_their_token() -> Result<()> {
	let codec = build_test_codec(test_clock());
	let grant = QuoteGrant::new(QuoteId::new("Q1")?, CompanyId::new("C1")?)
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
	let token = codec.issue(&grant)?;
	let links = LinkBuilder::parse("https://portal.example.com/")?;
	let url = links.url(Capability::Quote, &token);
	let (capability, routed) =
		LinkBuilder::parse_path(url.path()).expect("Issued link path should parse.");

	assert_eq!(capability, Capability::Quote);
	assert_eq!(routed, token);
	assert_eq!(codec.verify_grant::<QuoteGrant>(routed)?, grant);

	Ok(())
}

#[test]
fn typed_quote_grants_match_legacy_json_byte_for_byte() -> Result<()> {
	let codec = build_test_codec(test_clock());
	let legacy = codec.generate(&quote_payload(), Duration::hours(720))?;
	let grant: QuoteGrant = serde_json::from_value(quote_payload())?;

	assert_eq!(codec.issue_with_ttl(&grant, Duration::hours(720))?, legacy);

	Ok(())
}
