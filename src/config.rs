//! Host-supplied submodule configuration and its validated form.
//!
//! Hosts hand the submodule a loosely typed `params` object (whatever the publisher put in
//! their page config). [`IdParams::from_config`] is the single place that turns it into typed
//! values; everything downstream only sees [`IdParams`].

// crates.io
use serde_json::{Map, Value};
// self
use crate::{_prelude::*, error::ConfigError, id::PublisherId};

/// Raw per-submodule configuration as delivered by the host.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmoduleConfig {
	/// Submodule name the host used to route this config.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	/// Free-form submodule parameters.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub params: Option<Map<String, Value>>,
}
impl SubmoduleConfig {
	/// Creates a config carrying only a publisher id.
	pub fn with_publisher_id(publisher_id: impl Into<String>) -> Self {
		Self::default().with_param("publisherId", publisher_id.into())
	}

	/// Sets (or replaces) a raw parameter.
	pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.params.get_or_insert_with(Map::new).insert(key.into(), value.into());

		self
	}
}

/// Validated request parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdParams {
	/// Publisher identifier; always present.
	pub publisher_id: PublisherId,
	/// Hashed email supplied by the publisher.
	pub email_hash: Option<String>,
	/// Phone number (usually hashed) supplied by the publisher.
	pub phone_number: Option<String>,
}
impl IdParams {
	const PUBLISHER_ID: &'static str = "publisherId";
	const EMAIL_HASH: &'static str = "emailHash";
	const PHONE_NUMBER: &'static str = "phoneNumber";
	// Older page configs used the short key.
	const PHONE_NUMBER_LEGACY: &'static str = "p";

	/// Creates parameters for the given publisher.
	pub fn new(publisher_id: PublisherId) -> Self {
		Self { publisher_id, email_hash: None, phone_number: None }
	}

	/// Attaches an email hash.
	pub fn with_email_hash(mut self, email_hash: impl Into<String>) -> Self {
		self.email_hash = non_empty(email_hash.into());

		self
	}

	/// Attaches a phone number.
	pub fn with_phone_number(mut self, phone_number: impl Into<String>) -> Self {
		self.phone_number = non_empty(phone_number.into());

		self
	}

	/// Validates the host config.
	///
	/// A missing config, missing `params`, or missing `publisherId` all yield
	/// [`ConfigError::MissingPublisherId`]; a `publisherId` of the wrong type or an empty string
	/// yields [`ConfigError::InvalidPublisherId`]. Optional values that are empty or not strings
	/// are dropped.
	pub fn from_config(config: Option<&SubmoduleConfig>) -> Result<Self, ConfigError> {
		let params = config.and_then(|c| c.params.as_ref());
		let publisher_id = match params.and_then(|p| p.get(Self::PUBLISHER_ID)) {
			None | Some(Value::Null) => return Err(ConfigError::MissingPublisherId),
			Some(Value::String(raw)) => PublisherId::new(raw)
				.map_err(|_| ConfigError::InvalidPublisherId { found: "empty string" })?,
			Some(other) => return Err(ConfigError::InvalidPublisherId { found: json_type(other) }),
		};
		let email_hash = params.and_then(|p| string_param(p, Self::EMAIL_HASH));
		let phone_number = params.and_then(|p| {
			string_param(p, Self::PHONE_NUMBER).or_else(|| string_param(p, Self::PHONE_NUMBER_LEGACY))
		});

		Ok(Self { publisher_id, email_hash, phone_number })
	}
}

fn string_param(params: &Map<String, Value>, key: &str) -> Option<String> {
	params.get(key).and_then(Value::as_str).and_then(|v| non_empty(v.to_owned()))
}

fn non_empty(value: String) -> Option<String> {
	if value.is_empty() { None } else { Some(value) }
}

fn json_type(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "boolean",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	}
}
