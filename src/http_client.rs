use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;

/// Covers both upstream calls; the Gemini round-trip is the slow one.
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

static SHARED: OnceCell<Client> = OnceCell::new();

/// Lazily built blocking client shared by team search and prediction
/// requests, so both reuse one connection pool.
pub fn http_client() -> Result<&'static Client> {
    SHARED.get_or_try_init(|| {
        Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent(concat!("scorecast/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build shared http client")
    })
}
