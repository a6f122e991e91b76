//! Quote links.

// crates.io
use serde_json::Number;
// self
use crate::{
	_prelude::*,
	grant::{Capability, Grant, is_false},
	id::{CompanyId, ContactId, QuoteId},
};

/// One priced line on a quote, frozen into the link at issuance.
///
/// Prices are kept as JSON numbers so `150` stays `150` when re-issued.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuoteItem {
	/// Catalog product code.
	pub product_code: String,
	/// Line description shown to the customer.
	pub description: String,
	/// Ordered quantity.
	pub quantity: u32,
	/// Unit price before discount.
	pub unit_price: Number,
	/// Discount applied to the line, in percent.
	#[serde(default = "no_discount")]
	pub discount_percent: Number,
	/// Product family (tool, consumable, machine, ...).
	pub product_type: String,
	/// Optional catalog category.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub category: Option<String>,
	/// Optional product image URL.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub image: Option<String>,
}
impl QuoteItem {
	/// Line total after discount.
	pub fn line_total(&self) -> f64 {
		let unit_price = self.unit_price.as_f64().unwrap_or_default();
		let discount = self.discount_percent.as_f64().unwrap_or_default();

		f64::from(self.quantity) * unit_price * (1.0 - discount / 100.0)
	}
}

fn no_discount() -> Number {
	Number::from(0)
}

/// Access to one quote, optionally personalized for a contact.
///
/// Issue one grant per contact to send personalized links for the same quote; each token
/// verifies independently.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuoteGrant {
	/// Quote the link opens.
	pub quote_id: QuoteId,
	/// Company the quote belongs to.
	pub company_id: CompanyId,
	/// Contact the link was sent to.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub contact_id: Option<ContactId>,
	/// Lines included in the quote.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub quote_items: Vec<QuoteItem>,
	/// Pricing table used to price the lines.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub pricing_mode: Option<String>,
	/// Quote flavor (for example a reorder quote versus a new-business quote).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub quote_type: Option<String>,
	/// Marks links produced by test sends.
	#[serde(default, skip_serializing_if = "is_false")]
	pub is_test: bool,
}
impl QuoteGrant {
	/// Creates a grant for `quote_id` at `company_id` with no lines.
	pub fn new(quote_id: QuoteId, company_id: CompanyId) -> Self {
		Self {
			quote_id,
			company_id,
			contact_id: None,
			quote_items: Vec::new(),
			pricing_mode: None,
			quote_type: None,
			is_test: false,
		}
	}

	/// Personalizes the link for `contact_id`.
	pub fn for_contact(mut self, contact_id: ContactId) -> Self {
		self.contact_id = Some(contact_id);

		self
	}

	/// Appends a quote line.
	pub fn with_item(mut self, item: QuoteItem) -> Self {
		self.quote_items.push(item);

		self
	}

	/// Sets the pricing mode.
	pub fn with_pricing_mode(mut self, mode: impl Into<String>) -> Self {
		self.pricing_mode = Some(mode.into());

		self
	}

	/// Sets the quote type.
	pub fn with_quote_type(mut self, quote_type: impl Into<String>) -> Self {
		self.quote_type = Some(quote_type.into());

		self
	}

	/// Marks the link as a test send.
	pub fn as_test(mut self) -> Self {
		self.is_test = true;

		self
	}

	/// Sum of every line total.
	pub fn total(&self) -> f64 {
		self.quote_items.iter().map(QuoteItem::line_total).sum()
	}
}
impl Grant for QuoteGrant {
	const CAPABILITY: Capability = Capability::Quote;
}
