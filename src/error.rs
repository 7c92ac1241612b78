//! Submodule error taxonomy shared by configuration, consent, transport, and decoding.
//!
//! None of these errors escape the host-facing surface: [`DigitalAudienceId::request_id`]
//! logs and drops them, and [`IdCallback::respond`] resolves with an empty id instead.
//! The fallible variants ([`DigitalAudienceId::try_request_id`], [`IdCallback::fetch`]) expose
//! them for callers that want to branch on the failure.
//!
//! [`DigitalAudienceId::request_id`]: crate::resolver::DigitalAudienceId::request_id
//! [`DigitalAudienceId::try_request_id`]: crate::resolver::DigitalAudienceId::try_request_id
//! [`IdCallback::respond`]: crate::resolver::IdCallback::respond
//! [`IdCallback::fetch`]: crate::resolver::IdCallback::fetch

// self
use crate::_prelude::*;

/// Submodule-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical submodule error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Host configuration is missing or malformed.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// GDPR applies but no consent string was supplied.
	#[error("Consent string is required to call digitalAudience id.")]
	ConsentBlocked,
	/// Network or HTTP failure while calling the bakery endpoint.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// The bakery response did not carry a usable visitor id.
	#[error(transparent)]
	Decode(#[from] DecodeError),
}

/// Configuration and validation failures raised before any I/O happens.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// `params.publisherId` is absent (or the whole config is).
	#[error("digitalAudience id submodule requires publisher id to be defined.")]
	MissingPublisherId,
	/// `params.publisherId` is present but not a non-empty string.
	#[error("digitalAudience id publisher id must be a non-empty string, got {found}.")]
	InvalidPublisherId {
		/// JSON type name of the rejected value.
		found: &'static str,
	},
	/// Bakery endpoint URL cannot be used.
	#[error(transparent)]
	Endpoint(#[from] EndpointError),
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Bakery endpoint validation failures.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum EndpointError {
	/// The endpoint does not parse as a URL.
	#[error("Bakery endpoint is not a valid URL: {url}.")]
	Invalid {
		/// Raw endpoint string that failed to parse.
		url: String,
	},
	/// Only `http` and `https` endpoints can be called.
	#[error("Bakery endpoint must use http or https: {url}.")]
	UnsupportedScheme {
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// The endpoint lacks a host component.
	#[error("Bakery endpoint is missing a host: {url}.")]
	MissingHost {
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// The endpoint already carries a query or fragment; `publisher` must lead the query.
	#[error("Bakery endpoint must not carry a query or fragment: {url}.")]
	UnexpectedQuery {
		/// Endpoint URL that failed validation.
		url: String,
	},
}

impl From<EndpointError> for Error {
	fn from(e: EndpointError) -> Self {
		ConfigError::from(e).into()
	}
}

/// Transport-level failures (network, HTTP status).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the bakery endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Bakery endpoint answered with a non-success status.
	#[error("Bakery endpoint responded with HTTP {status}.")]
	Status {
		/// HTTP status code.
		status: u16,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Response decoding failures; these resolve to an empty id without logging.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// Body is not the JSON shape the bakery promises.
	#[error("Bakery endpoint returned malformed JSON.")]
	Json {
		/// Structured parsing failure, including the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Body parsed but carried no `setData.visitorid`.
	#[error("Bakery response is missing setData.visitorid.")]
	MissingVisitorId,
}
