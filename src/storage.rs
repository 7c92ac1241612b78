//! Scoped storage handles injected by the host.
//!
//! Hosts own persistence and hand each submodule a [`StorageHandle`] at construction time.
//! Every read and write is namespaced by a [`StorageScope`] so submodules sharing a backend
//! never see each other's keys. The visitor id itself is cached by the host orchestrator, so
//! the submodule only carries the handle for hosts that expect one per submodule.

pub mod memory;

pub use memory::MemoryStorage;

// self
use crate::_prelude::*;

/// Boxed future returned by [`StorageHandle`] operations.
pub type StorageFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StorageError>> + 'a + Send>>;

/// Storage backend contract implemented by host storage managers.
pub trait StorageHandle
where
	Self: Send + Sync,
{
	/// Reads the value stored under `key`, if present.
	fn get<'a>(&'a self, scope: &'a StorageScope, key: &'a str) -> StorageFuture<'a, Option<String>>;

	/// Stores or replaces the value under `key`.
	fn set<'a>(
		&'a self,
		scope: &'a StorageScope,
		key: &'a str,
		value: String,
	) -> StorageFuture<'a, ()>;

	/// Removes `key`, returning the previous value.
	fn remove<'a>(
		&'a self,
		scope: &'a StorageScope,
		key: &'a str,
	) -> StorageFuture<'a, Option<String>>;
}

/// Module categories a host storage manager distinguishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModuleType {
	/// User-id submodules.
	Uid,
}
impl ModuleType {
	/// Returns the host's label for the module type.
	pub const fn as_str(self) -> &'static str {
		match self {
			ModuleType::Uid => "userId",
		}
	}
}
impl Display for ModuleType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Namespace a storage handle operates in.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageScope {
	/// Category of the owning module.
	pub module_type: ModuleType,
	/// Name of the owning module.
	pub module_name: String,
}
impl StorageScope {
	/// Scope for a user-id submodule.
	pub fn uid(module_name: impl Into<String>) -> Self {
		Self { module_type: ModuleType::Uid, module_name: module_name.into() }
	}
}
impl Display for StorageScope {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}/{}", self.module_type, self.module_name)
	}
}

/// Error type produced by [`StorageHandle`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StorageError {
	/// The host denied storage access for this scope (e.g. no device-access consent).
	#[error("Storage access denied for {scope}.")]
	AccessDenied {
		/// Scope that was refused.
		scope: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
