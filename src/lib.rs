//! Digital Audience visitor-id submodule for user-id orchestrators: validate the publisher
//! configuration, gate on GDPR consent, call the bakery endpoint, and hand the visitor id back
//! to the host in its decoded shape.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod config;
pub mod consent;
pub mod error;
pub mod http;
pub mod id;
pub mod obs;
pub mod provider;
pub mod resolver;
pub mod storage;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		http::ReqwestHttpClient,
		resolver::{DigitalAudienceId, DigitalAudienceIdBuilder},
		storage::{MemoryStorage, StorageHandle},
	};

	/// Submodule type alias used by reqwest-backed integration tests.
	pub type ReqwestTestSubmodule = DigitalAudienceId<ReqwestHttpClient>;

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.cookie_store(true)
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Constructs a [`DigitalAudienceId`] that targets `endpoint` with an in-memory storage
	/// handle and the reqwest transport used across integration tests.
	pub fn build_reqwest_test_submodule(
		endpoint: &str,
	) -> (ReqwestTestSubmodule, Arc<MemoryStorage>) {
		let storage_backend = Arc::new(MemoryStorage::default());
		let storage: Arc<dyn StorageHandle> = storage_backend.clone();
		let endpoint = Url::parse(endpoint).expect("Test endpoint should be a valid URL.");
		let submodule: ReqwestTestSubmodule = DigitalAudienceIdBuilder::new()
			.endpoint(endpoint)
			.storage(storage)
			.build_with_http_client(test_reqwest_http_client())
			.expect("Test submodule should build successfully.");

		(submodule, storage_backend)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)]
use {color_eyre as _, httpmock as _, tokio as _, tracing_subscriber as _};
