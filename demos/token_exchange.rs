//! Demonstrates the token broker against a mock backend: the first call performs the
//! `/users/sync-token` exchange, the second is served from the credential cache.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use session_bridge::{
	api::BackendApi,
	auth::{Email, Identity},
	broker::TokenBroker,
	store::MemoryStore,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let exchange_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/users/sync-token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"demo-bearer\",\"user_id\":42}");
		})
		.await;
	let api = BackendApi::new(&server.base_url())?;
	let broker = TokenBroker::new(api, Arc::new(MemoryStore::default()));
	let identity = Identity::new(Email::new("jane@example.org")?).with_name("Jane");
	let token = broker.try_obtain_token(&identity).await?;

	println!("Exchanged backend token: {}.", token.expose());

	let cached = broker.try_obtain_token(&identity).await?;

	println!("Cached backend token: {}.", cached.expose());
	println!("Cached backend user id: {:?}.", broker.cached_user_id()?);

	exchange_mock.assert_async().await;

	broker.invalidate()?;

	println!("Cache after invalidation: {:?}.", broker.cached_credentials()?);

	Ok(())
}
