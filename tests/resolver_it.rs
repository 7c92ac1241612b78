#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use digital_audience_id::{
	_preludet::*,
	config::SubmoduleConfig,
	consent::ConsentData,
	error::{DecodeError, TransportError},
	id::VisitorId,
};

const PUBLISHER: &str = "4D393FAC-B6BB-4E19-8396-0A4813607316";
const VISITOR: &str = "571058d70bce453b80e6d98b4f8a81e3";

fn config() -> SubmoduleConfig {
	SubmoduleConfig::with_publisher_id(PUBLISHER)
}

async fn respond_and_record(
	submodule: &ReqwestTestSubmodule,
	consent: Option<&ConsentData>,
) -> Vec<Option<VisitorId>> {
	let calls = Arc::new(Mutex::new(Vec::new()));
	let callback = submodule
		.request_id(Some(&config()), consent)
		.expect("Valid config should produce a deferred request.");
	let sink = calls.clone();

	callback.respond(move |visitor_id| sink.lock().push(visitor_id)).await;

	calls.lock().clone()
}

#[tokio::test]
async fn callback_receives_visitor_id() {
	let server = MockServer::start_async().await;
	let (submodule, _storage) = build_reqwest_test_submodule(&server.url("/bakery/bake"));
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/bakery/bake").query_param("publisher", PUBLISHER);
			then.status(200)
				.header("content-type", "application/json")
				.body(format!("{{\"setData\":{{\"visitorid\":\"{VISITOR}\"}}}}"));
		})
		.await;
	let calls = respond_and_record(&submodule, None).await;

	assert_eq!(calls.len(), 1, "Callback must fire exactly once.");
	assert_eq!(calls[0].as_ref().map(VisitorId::as_str), Some(VISITOR));

	mock.assert_async().await;
}

#[tokio::test]
async fn empty_json_object_resolves_without_id() {
	let server = MockServer::start_async().await;
	let (submodule, _storage) = build_reqwest_test_submodule(&server.url("/bakery/bake"));
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/bakery/bake");
			then.status(200).header("content-type", "application/json").body("{}");
		})
		.await;
	let calls = respond_and_record(&submodule, None).await;

	assert_eq!(calls, vec![None]);

	mock.assert_async().await;
}

#[tokio::test]
async fn no_content_resolves_without_id() {
	let server = MockServer::start_async().await;
	let (submodule, _storage) = build_reqwest_test_submodule(&server.url("/bakery/bake"));
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/bakery/bake");
			then.status(204);
		})
		.await;
	let calls = respond_and_record(&submodule, None).await;

	assert_eq!(calls, vec![None]);

	mock.assert_async().await;
}

#[tokio::test]
async fn server_errors_resolve_without_id() {
	let server = MockServer::start_async().await;
	let (submodule, _storage) = build_reqwest_test_submodule(&server.url("/bakery/bake"));
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/bakery/bake");
			then.status(500).body("upstream exploded");
		})
		.await;
	let calls = respond_and_record(&submodule, None).await;

	assert_eq!(calls, vec![None]);

	mock.assert_async().await;

	let err = submodule
		.request_id(Some(&config()), None)
		.expect("Valid config should produce a deferred request.")
		.fetch()
		.await
		.expect_err("HTTP 500 should surface as a transport error.");

	assert!(matches!(err, Error::Transport(TransportError::Status { status: 500 })));
}

#[tokio::test]
async fn unparsable_body_surfaces_as_decode_error() {
	let server = MockServer::start_async().await;
	let (submodule, _storage) = build_reqwest_test_submodule(&server.url("/bakery/bake"));
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/bakery/bake");
			then.status(200).body("not json");
		})
		.await;
	let err = submodule
		.request_id(Some(&config()), None)
		.expect("Valid config should produce a deferred request.")
		.fetch()
		.await
		.expect_err("Plain text should not decode.");

	assert!(matches!(err, Error::Decode(DecodeError::Json { .. })));
}

#[tokio::test]
async fn consent_and_hashes_are_forwarded_in_order() {
	let server = MockServer::start_async().await;
	let (submodule, _storage) = build_reqwest_test_submodule(&server.url("/bakery/bake"));
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/bakery/bake")
				.query_param("publisher", PUBLISHER)
				.query_param("email", "9f86d081")
				.query_param("phone", "5551234")
				.query_param("gdpr", "1")
				.query_param("gdpr_consent", "BOJ8RZsOJ8RZs");
			then.status(200).body(format!("{{\"setData\":{{\"visitorid\":\"{VISITOR}\"}}}}"));
		})
		.await;
	let config = config().with_param("emailHash", "9f86d081").with_param("p", "5551234");
	let consent = ConsentData::gdpr("BOJ8RZsOJ8RZs");
	let callback = submodule
		.request_id(Some(&config), Some(&consent))
		.expect("Granted consent should produce a deferred request.");

	assert_eq!(
		callback.url().query(),
		Some(concat!(
			"publisher=4D393FAC-B6BB-4E19-8396-0A4813607316",
			"&email=9f86d081&phone=5551234&gdpr=1&gdpr_consent=BOJ8RZsOJ8RZs",
		))
	);

	let visitor_id = callback.resolve().await;

	assert_eq!(visitor_id.as_ref().map(VisitorId::as_str), Some(VISITOR));

	mock.assert_async().await;
}

#[tokio::test]
async fn no_request_leaves_before_the_callback_runs() {
	let server = MockServer::start_async().await;
	let (submodule, _storage) = build_reqwest_test_submodule(&server.url("/bakery/bake"));
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/bakery/bake");
			then.status(200).body("{}");
		})
		.await;
	let callback = submodule.request_id(Some(&config()), None);

	assert!(callback.is_some());

	drop(callback);

	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn blocked_consent_never_reaches_the_endpoint() {
	let server = MockServer::start_async().await;
	let (submodule, _storage) = build_reqwest_test_submodule(&server.url("/bakery/bake"));
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/bakery/bake");
			then.status(200).body("{}");
		})
		.await;
	let consent = ConsentData { gdpr_applies: Some(true), consent_string: None };

	assert!(submodule.request_id(Some(&config()), Some(&consent)).is_none());
	assert!(submodule.request_id(None, None).is_none());

	mock.assert_calls_async(0).await;
}
