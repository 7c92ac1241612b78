//! Demonstrates resolving a Digital Audience visitor id against a mocked bakery endpoint, with
//! GDPR consent forwarded and the host storage handle injected explicitly.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use digital_audience_id::{
	config::SubmoduleConfig,
	consent::ConsentData,
	http::ReqwestHttpClient,
	provider::IdProviderPlugin,
	reqwest::Client,
	resolver::DigitalAudienceIdBuilder,
	storage::{MemoryStorage, StorageHandle},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let bake_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/bakery/bake").query_param("gdpr", "1");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"setData\":{\"visitorid\":\"571058d70bce453b80e6d98b4f8a81e3\"}}");
		})
		.await;
	let storage: Arc<dyn StorageHandle> = Arc::new(MemoryStorage::default());
	let http_client = ReqwestHttpClient::with_client(
		Client::builder()
			.cookie_store(true)
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()?,
	);
	let submodule = DigitalAudienceIdBuilder::new()
		.endpoint(Url::parse(&server.url("/bakery/bake"))?)
		.storage(storage)
		.build_with_http_client::<ReqwestHttpClient>(http_client)?;
	let config = SubmoduleConfig::with_publisher_id("4D393FAC-B6BB-4E19-8396-0A4813607316")
		.with_param("emailHash", "9f86d081884c7d659a2feaa0c55ad015");
	let consent = ConsentData::gdpr("BOJ8RZsOJ8RZsABAB8AAAAAZ+A==");
	let Some(callback) = submodule.request_id(Some(&config), Some(&consent)) else {
		println!("No request prepared.");

		return Ok(());
	};

	println!("Calling {}.", callback.url());

	callback
		.respond(|visitor_id| match visitor_id {
			Some(visitor_id) =>
				println!("Decoded identity: {:?}.", submodule.decode(visitor_id.as_str())),
			None => println!("Bakery returned no visitor id."),
		})
		.await;

	let descriptor = IdProviderPlugin::descriptor(&submodule);

	println!("Eid source {:?} with atype {:?}.", descriptor.eid_source(), descriptor.eid_type());

	bake_mock.assert_async().await;

	Ok(())
}
