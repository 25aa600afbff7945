use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const USER_AGENT: &str = concat!("tournament_admin/", env!("CARGO_PKG_VERSION"));

static CLIENT: OnceCell<Client> = OnceCell::new();

/// Builds the shared client with `timeout` unless one already exists.
/// Returns `false` when an earlier client keeps its settings.
pub fn install_http_client(timeout: Duration) -> Result<bool> {
    let mut installed = false;
    CLIENT.get_or_try_init(|| {
        installed = true;
        build_client(timeout)
    })?;
    Ok(installed)
}

/// The shared client, built with the default timeout on first use.
pub fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| build_client(DEFAULT_TIMEOUT))
}

pub fn build_client(timeout: Duration) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    Client::builder()
        .default_headers(headers)
        .user_agent(USER_AGENT)
        .connect_timeout(CONNECT_TIMEOUT.min(timeout))
        .timeout(timeout)
        .build()
        .with_context(|| format!("failed to build http client (timeout {:?})", timeout))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_keeps_first_client() {
        install_http_client(Duration::from_secs(2)).expect("client builds");
        let first = http_client().expect("client available") as *const Client;

        let again = install_http_client(Duration::from_secs(30)).expect("no rebuild needed");
        assert!(!again);
        assert_eq!(http_client().expect("client available") as *const Client, first);
    }

    #[test]
    fn short_timeouts_still_build() {
        assert!(build_client(Duration::from_millis(500)).is_ok());
    }
}
