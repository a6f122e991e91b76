//! Reorder portal and marketing offer links.

// self
use crate::{
	_prelude::*,
	grant::{Capability, Grant, is_false},
	id::{CompanyId, ContactId},
};

/// Access to a company's reorder portal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderGrant {
	/// Company whose order history the portal shows.
	pub company_id: CompanyId,
	/// Contact the link was sent to.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub contact_id: Option<ContactId>,
	/// Record type the portal was opened from (company, distributor, ...).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub object_type: Option<String>,
	/// Pricing table applied to reorder lines.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub pricing_mode: Option<String>,
	/// Marks links produced by test sends.
	#[serde(default, skip_serializing_if = "is_false")]
	pub is_test: bool,
}
impl ReorderGrant {
	/// Creates a portal grant for `company_id`.
	pub fn new(company_id: CompanyId) -> Self {
		Self { company_id, contact_id: None, object_type: None, pricing_mode: None, is_test: false }
	}

	/// Personalizes the link for `contact_id`.
	pub fn for_contact(mut self, contact_id: ContactId) -> Self {
		self.contact_id = Some(contact_id);

		self
	}

	/// Records the originating record type.
	pub fn with_object_type(mut self, object_type: impl Into<String>) -> Self {
		self.object_type = Some(object_type.into());

		self
	}

	/// Sets the pricing mode.
	pub fn with_pricing_mode(mut self, mode: impl Into<String>) -> Self {
		self.pricing_mode = Some(mode.into());

		self
	}
}
impl Grant for ReorderGrant {
	const CAPABILITY: Capability = Capability::Reorder;
}

/// Access to a campaign offer page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferGrant {
	/// Company the campaign targets.
	pub company_id: CompanyId,
	/// Contact the campaign email went to.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub contact_id: Option<ContactId>,
	/// Campaign the link belongs to.
	pub campaign_key: String,
	/// Specific offer within the campaign.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub offer_key: Option<String>,
	/// Marks links produced by test sends.
	#[serde(default, skip_serializing_if = "is_false")]
	pub is_test: bool,
}
impl OfferGrant {
	/// Creates an offer grant for `campaign_key` aimed at `company_id`.
	pub fn new(company_id: CompanyId, campaign_key: impl Into<String>) -> Self {
		Self {
			company_id,
			contact_id: None,
			campaign_key: campaign_key.into(),
			offer_key: None,
			is_test: false,
		}
	}

	/// Personalizes the link for `contact_id`.
	pub fn for_contact(mut self, contact_id: ContactId) -> Self {
		self.contact_id = Some(contact_id);

		self
	}

	/// Narrows the link to one offer.
	pub fn with_offer(mut self, offer_key: impl Into<String>) -> Self {
		self.offer_key = Some(offer_key.into());

		self
	}

	/// Marks the link as a test send.
	pub fn as_test(mut self) -> Self {
		self.is_test = true;

		self
	}
}
impl Grant for OfferGrant {
	const CAPABILITY: Capability = Capability::Offer;
}
