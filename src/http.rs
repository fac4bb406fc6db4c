use anyhow::{Context, Result};
use reqwest::{Client, Request, Url};
use tracing::debug;

const USER_AGENT: &str = concat!("notion2webflow/", env!("CARGO_PKG_VERSION"));

pub(crate) fn build_client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .no_proxy()
        .build()
        .context("failed to build HTTP client")
}

/// Parse an API base URL, forcing a trailing slash so `join` appends.
pub(crate) fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw).with_context(|| format!("invalid base URL: {}", raw))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Debug-log an outbound request with credentials redacted.
pub(crate) fn log_request(service: &str, request: &Request) {
    debug!(service, method = %request.method(), url = %request.url(), "sending request");
    for (name, value) in request.headers() {
        if name.as_str().eq_ignore_ascii_case("authorization") {
            debug!(service, "  {}: Bearer [REDACTED]", name);
        } else {
            debug!(service, "  {}: {}", name, value.to_str().unwrap_or("[invalid]"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gets_trailing_slash() {
        assert_eq!(parse_base_url("http://127.0.0.1:9000").unwrap().as_str(), "http://127.0.0.1:9000/");
        assert_eq!(parse_base_url("https://proxy/api").unwrap().as_str(), "https://proxy/api/");
        assert_eq!(
            parse_base_url("https://api.notion.com/").unwrap().join("v1/pages").unwrap().as_str(),
            "https://api.notion.com/v1/pages"
        );
    }

    #[test]
    fn base_url_rejects_garbage() {
        assert!(parse_base_url("not a url").is_err());
    }
}
