//! Visitor-id resolution against the Digital Audience bakery.
//!
//! [`DigitalAudienceId::request_id`] runs synchronously: it validates the host config, applies
//! the GDPR consent gate, and builds the bakery URL. When all of that passes it hands back an
//! [`IdCallback`]; the single `GET` only goes out once the host drives that callback, and it
//! always completes with either a [`VisitorId`] or nothing.

// self
use crate::{
	_prelude::*,
	config::{IdParams, SubmoduleConfig},
	consent::{ConsentData, GdprConsent},
	error::{DecodeError, EndpointError, TransportError},
	http::{HttpResponse, IdHttpClient},
	id::VisitorId,
	obs::{self, RequestOutcome, ResolveSpan},
	provider::{DecodedIdentity, DecodedIds, IdProviderPlugin, SubmoduleDescriptor},
	storage::{MemoryStorage, StorageHandle, StorageScope},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// Production bakery endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://target.digialaudience.io/bakery/bake";

/// Boxed future carrying the outcome of one bakery request.
pub type VisitorIdFuture = Pin<Box<dyn Future<Output = Result<VisitorId>> + Send>>;

/// Identity resolver for the Digital Audience bakery.
///
/// The resolver owns the HTTP client, the bakery endpoint, and the storage handle injected by
/// the host. It keeps no per-call state, so one instance can serve every auction on a page.
pub struct DigitalAudienceId<C>
where
	C: IdHttpClient,
{
	/// HTTP client used for every bakery request.
	pub http_client: Arc<C>,
	/// Bakery endpoint; query parameters are appended per request.
	pub endpoint: Url,
	/// Storage handle supplied by the host.
	pub storage: Arc<dyn StorageHandle>,
	/// Metadata reported to the host.
	pub descriptor: SubmoduleDescriptor,
}
impl<C> DigitalAudienceId<C>
where
	C: IdHttpClient,
{
	/// Storage namespace owned by this submodule.
	pub fn storage_scope(&self) -> StorageScope {
		StorageScope::uid(&self.descriptor.name)
	}

	/// Wraps a raw value as the host's decoded identity. No validation is performed.
	pub fn decode(&self, value: impl Into<String>) -> DecodedIdentity {
		DecodedIdentity::new(value)
	}

	/// Host-facing entry point: returns a deferred request, or `None` when the config is invalid
	/// or consent blocks the call.
	///
	/// Configuration problems are logged at error level, consent blocks at info level. Nothing
	/// is returned to the caller besides `None`.
	pub fn request_id(
		&self,
		config: Option<&SubmoduleConfig>,
		consent: Option<&ConsentData>,
	) -> Option<IdCallback> {
		match self.try_request_id(config, consent) {
			Ok(callback) => Some(callback),
			Err(err @ Error::Config(_)) => {
				obs::log_error(&err);
				obs::record_request_outcome(RequestOutcome::ConfigError);

				None
			},
			Err(err) => {
				obs::log_info(&err, None);
				obs::record_request_outcome(RequestOutcome::ConsentBlocked);

				None
			},
		}
	}

	/// Fallible variant of [`request_id`](Self::request_id) that reports why no request was
	/// prepared and logs nothing.
	pub fn try_request_id(
		&self,
		config: Option<&SubmoduleConfig>,
		consent: Option<&ConsentData>,
	) -> Result<IdCallback> {
		let params = IdParams::from_config(config)?;
		let consent = GdprConsent::evaluate(consent)?;
		let url = self.request_url(&params, &consent);

		Ok(IdCallback::new(Arc::clone(&self.http_client), url))
	}

	/// Builds the bakery URL.
	///
	/// Parameters are appended in a fixed order: `publisher`, then `email` and `phone` when
	/// present, then `gdpr=1&gdpr_consent=` when consent was granted. Values are
	/// form-urlencoded.
	pub fn request_url(&self, params: &IdParams, consent: &GdprConsent) -> Url {
		let mut url = self.endpoint.clone();

		{
			let mut query = url.query_pairs_mut();

			query.append_pair("publisher", &params.publisher_id);

			if let Some(email_hash) = params.email_hash.as_deref() {
				query.append_pair("email", email_hash);
			}
			if let Some(phone_number) = params.phone_number.as_deref() {
				query.append_pair("phone", phone_number);
			}
			if let Some(consent_string) = consent.consent_string() {
				query.append_pair("gdpr", "1").append_pair("gdpr_consent", consent_string);
			}
		}

		url
	}
}
impl<C> Clone for DigitalAudienceId<C>
where
	C: IdHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			http_client: Arc::clone(&self.http_client),
			endpoint: self.endpoint.clone(),
			storage: Arc::clone(&self.storage),
			descriptor: self.descriptor.clone(),
		}
	}
}
impl<C> Debug for DigitalAudienceId<C>
where
	C: IdHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("DigitalAudienceId")
			.field("endpoint", &self.endpoint.as_str())
			.field("descriptor", &self.descriptor)
			.finish()
	}
}
impl<C> IdProviderPlugin for DigitalAudienceId<C>
where
	C: IdHttpClient,
{
	fn descriptor(&self) -> &SubmoduleDescriptor {
		&self.descriptor
	}

	fn decode(&self, value: &str) -> DecodedIds {
		DigitalAudienceId::decode(self, value).into_ids()
	}

	fn get_id(
		&self,
		config: Option<&SubmoduleConfig>,
		consent: Option<&ConsentData>,
	) -> Option<IdCallback> {
		self.request_id(config, consent)
	}
}

/// Builder for [`DigitalAudienceId`] values.
#[derive(Default)]
pub struct DigitalAudienceIdBuilder {
	/// Bakery endpoint override.
	pub endpoint: Option<Url>,
	/// Host storage handle; defaults to a private [`MemoryStorage`].
	pub storage: Option<Arc<dyn StorageHandle>>,
}
impl DigitalAudienceIdBuilder {
	/// Creates a builder targeting [`DEFAULT_ENDPOINT`].
	pub fn new() -> Self {
		Self::default()
	}

	/// Overrides the bakery endpoint.
	pub fn endpoint(mut self, url: Url) -> Self {
		self.endpoint = Some(url);

		self
	}

	/// Injects the host's storage handle.
	pub fn storage(mut self, storage: Arc<dyn StorageHandle>) -> Self {
		self.storage = Some(storage);

		self
	}

	/// Consumes the builder with a caller-provided transport.
	pub fn build_with_http_client<C>(
		self,
		http_client: impl Into<Arc<C>>,
	) -> Result<DigitalAudienceId<C>>
	where
		C: IdHttpClient,
	{
		let endpoint = match self.endpoint {
			Some(url) => url,
			None => Url::parse(DEFAULT_ENDPOINT)
				.map_err(|_| EndpointError::Invalid { url: DEFAULT_ENDPOINT.into() })?,
		};

		validate_endpoint(&endpoint)?;

		Ok(DigitalAudienceId {
			http_client: http_client.into(),
			endpoint,
			storage: self.storage.unwrap_or_else(|| Arc::new(MemoryStorage::default())),
			descriptor: SubmoduleDescriptor::digital_audience(),
		})
	}

	/// Consumes the builder with the default reqwest transport (cookie store enabled).
	#[cfg(feature = "reqwest")]
	pub fn build(self) -> Result<DigitalAudienceId<ReqwestHttpClient>> {
		let http_client = ReqwestHttpClient::new()?;

		self.build_with_http_client(http_client)
	}
}
impl Debug for DigitalAudienceIdBuilder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("DigitalAudienceIdBuilder")
			.field("endpoint", &self.endpoint)
			.field("storage_set", &self.storage.is_some())
			.finish()
	}
}

fn validate_endpoint(url: &Url) -> Result<(), EndpointError> {
	if !matches!(url.scheme(), "http" | "https") {
		return Err(EndpointError::UnsupportedScheme { url: url.to_string() });
	}
	if url.host_str().is_none_or(str::is_empty) {
		return Err(EndpointError::MissingHost { url: url.to_string() });
	}
	if url.query().is_some() || url.fragment().is_some() {
		return Err(EndpointError::UnexpectedQuery { url: url.to_string() });
	}

	Ok(())
}

/// Deferred bakery request handed to the host.
///
/// Nothing touches the network until [`respond`](Self::respond), [`resolve`](Self::resolve), or
/// [`fetch`](Self::fetch) is awaited. Each consumes the handle, so a handle issues at most one
/// request.
pub struct IdCallback {
	url: Url,
	request: VisitorIdFuture,
}
impl IdCallback {
	fn new<C>(http_client: Arc<C>, url: Url) -> Self
	where
		C: IdHttpClient,
	{
		let span = ResolveSpan::new("bake");
		let request_url = url.clone();
		let request: VisitorIdFuture = Box::pin(span.instrument(async move {
			let response =
				http_client.get(request_url).await.map_err(TransportError::network)?;

			decode_response(&response)
		}));

		Self { url, request }
	}

	/// URL the request will be sent to.
	pub fn url(&self) -> &Url {
		&self.url
	}

	/// Issues the request and reports exactly why no id came back.
	pub async fn fetch(self) -> Result<VisitorId> {
		self.request.await
	}

	/// Issues the request, collapsing every failure into `None`.
	///
	/// Transport failures are logged at info level; malformed or empty responses are not
	/// logged.
	pub async fn resolve(self) -> Option<VisitorId> {
		obs::record_request_outcome(RequestOutcome::Attempt);

		match self.fetch().await {
			Ok(visitor_id) => {
				obs::record_request_outcome(RequestOutcome::Resolved);

				Some(visitor_id)
			},
			Err(Error::Decode(_)) => {
				obs::record_request_outcome(RequestOutcome::Empty);

				None
			},
			Err(err) => {
				obs::log_info(
					&"digitalAudienceId: fetch encountered an error",
					Some(&err as &dyn StdError),
				);
				obs::record_request_outcome(RequestOutcome::TransportError);

				None
			},
		}
	}

	/// Issues the request and invokes `on_complete` exactly once with the outcome.
	pub async fn respond<F>(self, on_complete: F)
	where
		F: FnOnce(Option<VisitorId>),
	{
		on_complete(self.resolve().await);
	}
}
impl Debug for IdCallback {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("IdCallback").field("url", &self.url.as_str()).finish()
	}
}

#[derive(Debug, Default, Deserialize)]
struct BakeResponse {
	#[serde(rename = "setData", default)]
	set_data: Option<SetData>,
}

#[derive(Debug, Default, Deserialize)]
struct SetData {
	#[serde(default)]
	visitorid: Option<String>,
}

/// Maps a bakery response onto a visitor id.
///
/// Non-2xx statuses are transport errors. Blank bodies (including HTTP 204), malformed JSON, and
/// payloads without a non-empty `setData.visitorid` are decode errors.
pub fn decode_response(response: &HttpResponse) -> Result<VisitorId> {
	if !response.is_success() {
		return Err(TransportError::Status { status: response.status }.into());
	}
	if response.is_blank() {
		return Err(DecodeError::MissingVisitorId.into());
	}

	let de = &mut serde_json::Deserializer::from_slice(&response.body);
	let payload: BakeResponse =
		serde_path_to_error::deserialize(de).map_err(|source| DecodeError::Json { source })?;
	let visitor_id = payload
		.set_data
		.and_then(|data| data.visitorid)
		.and_then(|raw| VisitorId::new(raw).ok())
		.ok_or(DecodeError::MissingVisitorId)?;

	Ok(visitor_id)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{error::ConfigError, id::PublisherId};

	const PUBLISHER: &str = "4D393FAC-B6BB-4E19-8396-0A4813607316";

	#[derive(Debug, ThisError)]
	#[error("Unreachable transport.")]
	struct UnusedTransportError;

	struct UnusedHttpClient;
	impl IdHttpClient for UnusedHttpClient {
		type TransportError = UnusedTransportError;

		fn get(&self, _url: Url) -> crate::http::HttpFuture<'_, Self::TransportError> {
			Box::pin(async { Err(UnusedTransportError) })
		}
	}

	fn submodule() -> DigitalAudienceId<UnusedHttpClient> {
		DigitalAudienceIdBuilder::new()
			.build_with_http_client(UnusedHttpClient)
			.expect("Default endpoint should build.")
	}

	fn params() -> IdParams {
		IdParams::new(PublisherId::new(PUBLISHER).expect("Publisher fixture should be valid."))
	}

	#[test]
	fn url_carries_only_the_publisher_by_default() {
		let url = submodule().request_url(&params(), &GdprConsent::NotApplicable);

		assert_eq!(
			url.as_str(),
			format!("https://target.digialaudience.io/bakery/bake?publisher={PUBLISHER}")
		);
	}

	#[test]
	fn url_appends_optional_segments_in_fixed_order() {
		let params = params().with_phone_number("5551234").with_email_hash("9f86d081");
		let consent = GdprConsent::Granted("BOJ8RZsOJ8RZs".into());
		let url = submodule().request_url(&params, &consent);

		assert_eq!(
			url.query(),
			Some(concat!(
				"publisher=4D393FAC-B6BB-4E19-8396-0A4813607316",
				"&email=9f86d081&phone=5551234",
				"&gdpr=1&gdpr_consent=BOJ8RZsOJ8RZs",
			))
		);
	}

	#[test]
	fn url_encodes_reserved_characters() {
		let consent = GdprConsent::Granted("a+b/c=&d".into());
		let url = submodule().request_url(&params(), &consent);
		let pairs = url.query_pairs().collect::<Vec<_>>();

		let (key, value) = pairs.last().expect("Consent pair should be present.");

		assert_eq!((key.as_ref(), value.as_ref()), ("gdpr_consent", "a+b/c=&d"));
		assert!(url.as_str().ends_with("gdpr_consent=a%2Bb%2Fc%3D%26d"));
	}

	#[test]
	fn builder_rejects_unusable_endpoints() {
		let err = DigitalAudienceIdBuilder::new()
			.endpoint(Url::parse("ftp://target.digialaudience.io/bake").expect("URL should parse."))
			.build_with_http_client::<UnusedHttpClient>(UnusedHttpClient)
			.expect_err("Non-HTTP endpoints must be rejected.");

		assert!(matches!(
			err,
			Error::Config(ConfigError::Endpoint(EndpointError::UnsupportedScheme { .. }))
		));
	}

	#[test]
	fn builder_rejects_endpoints_with_query_or_fragment() {
		for raw in [
			"https://h.example/bakery/bake?x=1",
			"https://h.example/bakery/bake?",
			"https://h.example/bakery/bake#top",
		] {
			let err = DigitalAudienceIdBuilder::new()
				.endpoint(Url::parse(raw).expect("URL should parse."))
				.build_with_http_client::<UnusedHttpClient>(UnusedHttpClient)
				.expect_err("Endpoints carrying a query or fragment must be rejected.");

			assert!(
				matches!(
					err,
					Error::Config(ConfigError::Endpoint(EndpointError::UnexpectedQuery { .. }))
				),
				"{raw} produced {err:?}."
			);
		}
	}

	#[test]
	fn overridden_endpoint_still_starts_with_the_publisher() {
		let submodule = DigitalAudienceIdBuilder::new()
			.endpoint(Url::parse("https://h.example/bakery/bake").expect("URL should parse."))
			.build_with_http_client::<UnusedHttpClient>(UnusedHttpClient)
			.expect("Plain endpoint override should build.");
		let url = submodule.request_url(&params(), &GdprConsent::NotApplicable);

		assert!(url.as_str().starts_with("https://h.example/bakery/bake?publisher="));
	}

	#[test]
	fn try_request_id_reports_why_nothing_was_prepared() {
		let submodule = submodule();
		let err = submodule
			.try_request_id(Some(&SubmoduleConfig::default()), None)
			.expect_err("Missing publisher id should be rejected.");

		assert!(matches!(err, Error::Config(ConfigError::MissingPublisherId)));

		let consent = ConsentData { gdpr_applies: Some(true), consent_string: None };
		let err = submodule
			.try_request_id(Some(&SubmoduleConfig::with_publisher_id(PUBLISHER)), Some(&consent))
			.expect_err("Missing consent string should block the request.");

		assert!(matches!(err, Error::ConsentBlocked));
	}

	#[test]
	fn decode_wraps_raw_values() {
		assert_eq!(
			submodule().decode("abc123"),
			DecodedIdentity { digital_audience_id: "abc123".into() }
		);
	}

	#[test]
	fn response_decoding_covers_bakery_shapes() {
		let ok = decode_response(&HttpResponse::new(
			200,
			r#"{"setData":{"visitorid":"571058d70bce453b80e6d98b4f8a81e3"}}"#,
		))
		.expect("Visitor id should decode.");

		assert_eq!(ok.as_str(), "571058d70bce453b80e6d98b4f8a81e3");
		assert!(matches!(
			decode_response(&HttpResponse::new(200, "{}")),
			Err(Error::Decode(DecodeError::MissingVisitorId))
		));
		assert!(matches!(
			decode_response(&HttpResponse::new(200, r#"{"setData":{"visitorid":""}}"#)),
			Err(Error::Decode(DecodeError::MissingVisitorId))
		));
		assert!(matches!(
			decode_response(&HttpResponse::new(204, "")),
			Err(Error::Decode(DecodeError::MissingVisitorId))
		));
		assert!(matches!(
			decode_response(&HttpResponse::new(200, "<html>")),
			Err(Error::Decode(DecodeError::Json { .. }))
		));
		assert!(matches!(
			decode_response(&HttpResponse::new(503, "")),
			Err(Error::Transport(TransportError::Status { status: 503 }))
		));
	}

	#[test]
	fn malformed_json_reports_the_offending_path() {
		let err = decode_response(&HttpResponse::new(200, r#"{"setData":{"visitorid":42}}"#))
			.expect_err("Numeric visitor ids are malformed.");

		match err {
			Error::Decode(DecodeError::Json { source }) =>
				assert_eq!(source.path().to_string(), "setData.visitorid"),
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}
}
