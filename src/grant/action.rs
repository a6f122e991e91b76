//! One-shot action links (add a note, unsubscribe, approve a quote).

// self
use crate::{
	_prelude::*,
	grant::{Capability, Grant, is_false},
	id::{CompanyId, ContactId, QuoteId, UserId},
};

/// Single action an action link authorizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
	/// Append one note to a company or contact record.
	AddNote,
	/// Unsubscribe a contact from marketing email.
	Unsubscribe,
	/// Approve one quote.
	ApproveQuote,
}
impl ActionKind {
	/// Returns the wire label.
	pub const fn as_str(self) -> &'static str {
		match self {
			ActionKind::AddNote => "add_note",
			ActionKind::Unsubscribe => "unsubscribe",
			ActionKind::ApproveQuote => "approve_quote",
		}
	}
}
impl Display for ActionKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Authorization for a single action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionGrant {
	/// Action the bearer may perform.
	pub action_type: ActionKind,
	/// Company the action applies to.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub company_id: Option<CompanyId>,
	/// Contact the action applies to.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub contact_id: Option<ContactId>,
	/// Quote the action applies to.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub quote_id: Option<QuoteId>,
	/// Staff user who issued the link; notes are attributed to them.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub user_id: Option<UserId>,
	/// Record type the action targets.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub object_type: Option<String>,
	/// Whether the action must carry a note body.
	#[serde(default, skip_serializing_if = "is_false")]
	pub note_required: bool,
}
impl ActionGrant {
	/// Creates a grant for `action_type` with no targets.
	pub fn new(action_type: ActionKind) -> Self {
		Self {
			action_type,
			company_id: None,
			contact_id: None,
			quote_id: None,
			user_id: None,
			object_type: None,
			note_required: false,
		}
	}

	/// Targets `company_id`.
	pub fn for_company(mut self, company_id: CompanyId) -> Self {
		self.company_id = Some(company_id);

		self
	}

	/// Targets `contact_id`.
	pub fn for_contact(mut self, contact_id: ContactId) -> Self {
		self.contact_id = Some(contact_id);

		self
	}

	/// Targets `quote_id`.
	pub fn for_quote(mut self, quote_id: QuoteId) -> Self {
		self.quote_id = Some(quote_id);

		self
	}

	/// Attributes the action to `user_id`.
	pub fn issued_by(mut self, user_id: UserId) -> Self {
		self.user_id = Some(user_id);

		self
	}

	/// Requires a note body.
	pub fn require_note(mut self) -> Self {
		self.note_required = true;

		self
	}
}
impl Grant for ActionGrant {
	const CAPABILITY: Capability = Capability::Action;
}
