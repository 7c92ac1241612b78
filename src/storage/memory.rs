//! Thread-safe in-memory [`StorageHandle`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	storage::{StorageError, StorageFuture, StorageHandle, StorageScope},
};

type StorageMap = Arc<RwLock<HashMap<(StorageScope, String), String>>>;

/// Storage backend that keeps values in-process, optionally refusing access for some scopes.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
	map: StorageMap,
	denied: Arc<RwLock<Vec<StorageScope>>>,
}
impl MemoryStorage {
	/// Refuses every subsequent operation on `scope`.
	pub fn deny(&self, scope: StorageScope) {
		self.denied.write().push(scope);
	}

	/// Number of values stored across all scopes.
	pub fn len(&self) -> usize {
		self.map.read().len()
	}

	/// Returns `true` when nothing has been stored.
	pub fn is_empty(&self) -> bool {
		self.map.read().is_empty()
	}

	fn check(&self, scope: &StorageScope) -> Result<(), StorageError> {
		if self.denied.read().contains(scope) {
			Err(StorageError::AccessDenied { scope: scope.to_string() })
		} else {
			Ok(())
		}
	}
}
impl StorageHandle for MemoryStorage {
	fn get<'a>(&'a self, scope: &'a StorageScope, key: &'a str) -> StorageFuture<'a, Option<String>> {
		Box::pin(async move {
			self.check(scope)?;

			Ok(self.map.read().get(&(scope.to_owned(), key.to_owned())).cloned())
		})
	}

	fn set<'a>(
		&'a self,
		scope: &'a StorageScope,
		key: &'a str,
		value: String,
	) -> StorageFuture<'a, ()> {
		Box::pin(async move {
			self.check(scope)?;
			self.map.write().insert((scope.to_owned(), key.to_owned()), value);

			Ok(())
		})
	}

	fn remove<'a>(
		&'a self,
		scope: &'a StorageScope,
		key: &'a str,
	) -> StorageFuture<'a, Option<String>> {
		Box::pin(async move {
			self.check(scope)?;

			Ok(self.map.write().remove(&(scope.to_owned(), key.to_owned())))
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn scopes_do_not_share_keys() {
		let storage = MemoryStorage::default();
		let ours = StorageScope::uid("digitalAudienceId");
		let theirs = StorageScope::uid("otherId");

		storage.set(&ours, "visitor", "abc123".into()).await.expect("Set should succeed.");

		assert_eq!(
			storage.get(&ours, "visitor").await.expect("Get should succeed."),
			Some("abc123".into())
		);
		assert_eq!(storage.get(&theirs, "visitor").await.expect("Get should succeed."), None);
		assert_eq!(
			storage.remove(&ours, "visitor").await.expect("Remove should succeed."),
			Some("abc123".into())
		);
		assert!(storage.is_empty());
	}

	#[tokio::test]
	async fn denied_scopes_surface_access_errors() {
		let storage = MemoryStorage::default();
		let scope = StorageScope::uid("digitalAudienceId");

		storage.deny(scope.clone());

		let err = storage
			.set(&scope, "visitor", "abc123".into())
			.await
			.expect_err("Denied scope must refuse writes.");

		assert_eq!(err, StorageError::AccessDenied { scope: "userId/digitalAudienceId".into() });
		assert_eq!(storage.len(), 0);
	}
}
