use crate::config::Config;
use crate::error::FetchError;
use chrono::{DateTime, TimeDelta, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use std::time::Duration;
use url::Url;

pub const RATE_LIMIT_HEADER: &str = "x-rate-limit-limit";
pub const RATE_REMAINING_HEADER: &str = "x-rate-limit-remaining";
pub const RATE_RESET_HEADER: &str = "x-rate-limit-reset";

/// Rate-limit envelope as read from one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateHeaders {
    pub limit: u32,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
}

/// Shared client for all three sources. The per-lookup timeout is applied on
/// each request; this one bounds the client as a whole.
pub fn build_client(cfg: &Config) -> reqwest::Result<Client> {
    let mut default_headers = HeaderMap::new();
    if let Ok(ua) = HeaderValue::from_str(&cfg.user_agent) {
        default_headers.insert(USER_AGENT, ua);
    }
    default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    Client::builder()
        .default_headers(default_headers)
        .timeout(Duration::from_secs(cfg.http_timeout_secs))
        .use_rustls_tls()
        .build()
}

pub fn parse_base_url(raw: &str) -> Result<Url, FetchError> {
    let url = Url::parse(raw).map_err(|e| FetchError::InvalidUrl(format!("{raw:?}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FetchError::InvalidUrl(format!(
            "{raw:?}: unsupported scheme {other:?}"
        ))),
    }
}

/// `{base}?name={name}[&apikey={token}]`
pub fn lookup_url(base: &Url, name: &str, token: Option<&str>) -> Url {
    let mut url = base.clone();
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("name", name);
        if let Some(token) = token {
            query.append_pair("apikey", token);
        }
    }
    url
}

fn parse_header(headers: &HeaderMap, header: &'static str) -> Result<u32, FetchError> {
    let raw = headers.get(header);
    raw.and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u32>().ok())
        .ok_or_else(|| FetchError::InvalidHeader {
            header,
            value: raw
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
                .unwrap_or_default(),
        })
}

/// Reads the three rate-limit headers. The reset header is relative (seconds),
/// so it is anchored at `now`.
pub fn parse_rate_headers(headers: &HeaderMap, now: DateTime<Utc>) -> Result<RateHeaders, FetchError> {
    let limit = parse_header(headers, RATE_LIMIT_HEADER)?;
    let remaining = parse_header(headers, RATE_REMAINING_HEADER)?;
    let reset = parse_header(headers, RATE_RESET_HEADER)?;
    Ok(RateHeaders {
        limit,
        remaining,
        reset_at: now + TimeDelta::seconds(i64::from(reset)),
    })
}
