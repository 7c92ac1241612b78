//! GDPR consent data supplied by the host and the gate that decides whether a request may run.

// self
use crate::_prelude::*;

/// Consent state forwarded by the host's consent-management integration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentData {
	/// Whether GDPR applies to the current visitor.
	#[serde(default)]
	pub gdpr_applies: Option<bool>,
	/// TCF consent string.
	#[serde(default)]
	pub consent_string: Option<String>,
}
impl ConsentData {
	/// Consent where GDPR applies and the visitor granted `consent_string`.
	pub fn gdpr(consent_string: impl Into<String>) -> Self {
		Self { gdpr_applies: Some(true), consent_string: Some(consent_string.into()) }
	}

	/// Consent where GDPR explicitly does not apply.
	pub fn not_applicable() -> Self {
		Self { gdpr_applies: Some(false), consent_string: None }
	}

	/// Returns `true` only when the host explicitly flagged GDPR as applicable.
	pub fn gdpr_applies(&self) -> bool {
		self.gdpr_applies == Some(true)
	}
}

/// Outcome of a successful consent check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GdprConsent {
	/// GDPR does not apply; nothing is forwarded.
	NotApplicable,
	/// GDPR applies and the visitor's consent string must be forwarded.
	Granted(String),
}
impl GdprConsent {
	/// Runs the consent gate.
	///
	/// Absent consent data means GDPR does not apply. When it does apply, a non-empty consent
	/// string is required, otherwise [`Error::ConsentBlocked`] is returned and no request may be
	/// issued.
	pub fn evaluate(consent: Option<&ConsentData>) -> Result<Self> {
		let Some(consent) = consent.filter(|c| c.gdpr_applies()) else {
			return Ok(Self::NotApplicable);
		};

		match consent.consent_string.as_deref() {
			Some(value) if !value.is_empty() => Ok(Self::Granted(value.to_owned())),
			_ => Err(Error::ConsentBlocked),
		}
	}

	/// Consent string to forward, if any.
	pub fn consent_string(&self) -> Option<&str> {
		match self {
			Self::NotApplicable => None,
			Self::Granted(value) => Some(value),
		}
	}
}
