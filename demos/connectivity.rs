//! Probes a backend's reachability with the bounded connectivity check, distinguishing
//! a slow backend from an unreachable one.

// std
use std::time::Duration;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use session_bridge::api::BackendApi;

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"status\":\"ok\"}");
		})
		.await;

	let api = BackendApi::new(&server.base_url())?;
	let payload = api.check_connectivity(BackendApi::DEFAULT_CONNECTIVITY_TIMEOUT).await?;

	println!("Backend reachable: {payload}.");

	let dead = BackendApi::new("http://127.0.0.1:9")?;

	match dead.check_connectivity(Duration::from_secs(1)).await {
		Ok(_) => println!("Unexpectedly reachable."),
		Err(err) => println!("Backend unreachable as expected: {err}"),
	}

	Ok(())
}
