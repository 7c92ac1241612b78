//! Transport primitives for bakery requests.
//!
//! The submodule only ever issues a credentialed `GET` and needs the status code plus the raw
//! body back. [`IdHttpClient`] captures exactly that so hosts can swap in their own HTTP
//! stack; [`ReqwestHttpClient`] is the default implementation.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// self
use crate::_prelude::*;
#[cfg(feature = "reqwest")] use crate::error::ConfigError;

/// Boxed future returned by [`IdHttpClient::get`].
pub type HttpFuture<'a, E> = Pin<Box<dyn Future<Output = Result<HttpResponse, E>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of calling the bakery endpoint.
///
/// Implementations must be `Send + Sync + 'static` so the submodule can move an `Arc` of the
/// client into the deferred request handed back to the host. Credentials (cookies) must be
/// attached to the request, and any HTTP status, successful or not, must be reported through
/// [`HttpResponse`] rather than as a transport error.
pub trait IdHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Issues a credentialed `GET` for `url`.
	fn get(&self, url: Url) -> HttpFuture<'_, Self::TransportError>;
}

/// Status and body of a completed HTTP exchange.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HttpResponse {
	/// HTTP status code.
	pub status: u16,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl HttpResponse {
	/// Creates a response from a status code and body.
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self { status, body: body.into() }
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Returns `true` when the body holds nothing but whitespace.
	pub fn is_blank(&self) -> bool {
		self.body.iter().all(u8::is_ascii_whitespace)
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// The bakery keys visitors on its own cookie, so any custom [`ReqwestClient`] passed to
/// [`ReqwestHttpClient::with_client`] should enable a cookie store.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Builds a client with a cookie store enabled.
	pub fn new() -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().cookie_store(true).build()?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl IdHttpClient for ReqwestHttpClient {
	type TransportError = ReqwestError;

	fn get(&self, url: Url) -> HttpFuture<'_, Self::TransportError> {
		Box::pin(async move {
			let response = self.0.get(url).send().await?;
			let status = response.status().as_u16();
			let body = response.bytes().await?.to_vec();

			Ok(HttpResponse { status, body })
		})
	}
}
