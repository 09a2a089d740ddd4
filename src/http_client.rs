use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, COOKIE, HeaderMap, HeaderValue};

use crate::config::Config;

pub fn http_client(config: &Config) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    if let Some(cookie) = config.session_cookie.as_deref() {
        let value = HeaderValue::from_str(cookie).context("invalid NPL_SESSION_COOKIE value")?;
        headers.insert(COOKIE, value);
    }

    Client::builder()
        .timeout(config.timeout)
        .default_headers(headers)
        .build()
        .context("failed to build http client")
}
