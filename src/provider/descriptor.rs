//! Capability descriptor and decoded identity shapes shared with the host.

// self
use crate::_prelude::*;

/// Extended-id (eid) metadata attached to every id this submodule decodes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EidConfig {
	/// Identity source domain reported downstream.
	pub source: String,
	/// Agent type per the OpenRTB eids extension (3 = person-based id).
	pub atype: u8,
}

/// Static metadata the host consults before calling into a submodule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmoduleDescriptor {
	/// Name that links the submodule with its host config.
	pub name: String,
	/// Global Vendor List id used for TCF consent checks.
	#[serde(rename = "gvlid", default, skip_serializing_if = "Option::is_none")]
	pub vendor_id: Option<u16>,
	/// Eid metadata keyed by decoded id field.
	pub eids: BTreeMap<String, EidConfig>,
}
impl SubmoduleDescriptor {
	/// Submodule name (and decoded id key).
	pub const DIGITAL_AUDIENCE_NAME: &'static str = "digitalAudienceId";
	/// Global Vendor List id of Digital Audience.
	pub const DIGITAL_AUDIENCE_VENDOR_ID: u16 = 133;
	/// Source domain tagged on Digital Audience eids.
	pub const DIGITAL_AUDIENCE_EID_SOURCE: &'static str = "digitalaudience.io";
	/// Agent type tagged on Digital Audience eids.
	pub const DIGITAL_AUDIENCE_EID_TYPE: u8 = 3;

	/// Creates an empty descriptor for `name`.
	pub fn new(name: impl Into<String>) -> Self {
		Self { name: name.into(), vendor_id: None, eids: BTreeMap::new() }
	}

	/// Descriptor of the Digital Audience submodule.
	pub fn digital_audience() -> Self {
		Self::new(Self::DIGITAL_AUDIENCE_NAME)
			.with_vendor_id(Self::DIGITAL_AUDIENCE_VENDOR_ID)
			.with_eid(Self::DIGITAL_AUDIENCE_NAME, EidConfig {
				source: Self::DIGITAL_AUDIENCE_EID_SOURCE.into(),
				atype: Self::DIGITAL_AUDIENCE_EID_TYPE,
			})
	}

	/// Sets the Global Vendor List id.
	pub fn with_vendor_id(mut self, vendor_id: u16) -> Self {
		self.vendor_id = Some(vendor_id);

		self
	}

	/// Registers eid metadata for a decoded id field.
	pub fn with_eid(mut self, key: impl Into<String>, eid: EidConfig) -> Self {
		self.eids.insert(key.into(), eid);

		self
	}

	/// Eid metadata for the submodule's own id field.
	pub fn primary_eid(&self) -> Option<&EidConfig> {
		self.eids.get(&self.name)
	}

	/// Source domain of the primary eid.
	pub fn eid_source(&self) -> Option<&str> {
		self.primary_eid().map(|eid| eid.source.as_str())
	}

	/// Agent type of the primary eid.
	pub fn eid_type(&self) -> Option<u8> {
		self.primary_eid().map(|eid| eid.atype)
	}
}

/// Decoded ids keyed by field name, as merged into bid requests by the host.
pub type DecodedIds = BTreeMap<String, String>;

/// Normalized identity returned to the host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedIdentity {
	/// Raw visitor id as minted by the bakery.
	#[serde(rename = "digitalAudienceId")]
	pub digital_audience_id: String,
}
impl DecodedIdentity {
	/// Wraps a raw value without inspecting it.
	pub fn new(value: impl Into<String>) -> Self {
		Self { digital_audience_id: value.into() }
	}

	/// Flattens the identity into the host's generic id map.
	pub fn into_ids(self) -> DecodedIds {
		let key = SubmoduleDescriptor::DIGITAL_AUDIENCE_NAME.to_owned();

		DecodedIds::from([(key, self.digital_audience_id)])
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn digital_audience_descriptor_matches_registration() {
		let descriptor = SubmoduleDescriptor::digital_audience();

		assert_eq!(descriptor.name, "digitalAudienceId");
		assert_eq!(descriptor.vendor_id, Some(133));
		assert_eq!(descriptor.eid_source(), Some("digitalaudience.io"));
		assert_eq!(descriptor.eid_type(), Some(3));
	}

	#[test]
	fn descriptor_serializes_host_field_names() {
		let payload = serde_json::to_value(SubmoduleDescriptor::digital_audience())
			.expect("Descriptor should serialize to JSON.");

		assert_eq!(
			payload,
			serde_json::json!({
				"name": "digitalAudienceId",
				"gvlid": 133,
				"eids": { "digitalAudienceId": { "source": "digitalaudience.io", "atype": 3 } },
			})
		);
	}

	#[test]
	fn decoded_identity_uses_host_key() {
		let decoded = DecodedIdentity::new("abc123");

		assert_eq!(
			serde_json::to_string(&decoded).expect("Decoded identity should serialize."),
			r#"{"digitalAudienceId":"abc123"}"#
		);
		assert_eq!(decoded.into_ids().get("digitalAudienceId").map(String::as_str), Some("abc123"));
	}
}
