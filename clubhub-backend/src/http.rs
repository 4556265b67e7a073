use once_cell::sync::Lazy;
use reqwest::Client;
use std::time::Duration;

/// Global shared HTTP client for outbound LLM calls.
///
/// `Client::clone()` is an `Arc` increment, so every AI client clones this one
/// and shares its connection pool.
static SHARED_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .pool_max_idle_per_host(5)
        .pool_idle_timeout(Duration::from_secs(90))
        .timeout(Duration::from_secs(120))
        .build()
        .unwrap_or_else(|e| {
            log::error!("Failed to build shared HTTP client, using defaults: {}", e);
            Client::new()
        })
});

/// Returns a reference to the global shared HTTP client.
pub fn shared_client() -> &'static Client {
    &SHARED_CLIENT
}
