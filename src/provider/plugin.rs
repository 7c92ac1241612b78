//! Plugin contract the host's user-id orchestrator drives.

// self
use crate::{
	config::SubmoduleConfig,
	consent::ConsentData,
	provider::{DecodedIds, SubmoduleDescriptor},
	resolver::IdCallback,
};

/// Identity submodule as seen by a user-id orchestrator.
///
/// Hosts hold submodules as `Arc<dyn IdProviderPlugin>` and wire them up explicitly at
/// startup; nothing registers itself globally. All methods are synchronous: network work is
/// deferred into the returned [`IdCallback`] and only starts once the host drives it.
pub trait IdProviderPlugin
where
	Self: Send + Sync,
{
	/// Static metadata (name, vendor id, eids).
	fn descriptor(&self) -> &SubmoduleDescriptor;

	/// Turns a stored raw value into the ids merged into bid requests.
	fn decode(&self, value: &str) -> DecodedIds;

	/// Validates inputs and returns a deferred request, or `None` when no request may be made.
	fn get_id(
		&self,
		config: Option<&SubmoduleConfig>,
		consent: Option<&ConsentData>,
	) -> Option<IdCallback>;
}
