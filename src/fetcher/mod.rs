//! Rate-limit aware client for a single name lookup source.
//!
//! A [`Fetcher`] performs one `GET {base}?name=..` per call, tracks the
//! source's quota from the `X-Rate-Limit-*` headers and turns the payload into
//! a typed value through a [`Decode`] implementation. It never retries; callers
//! decide when to try again.

mod quota;

pub use quota::{QuotaSnapshot, QuotaState};

use crate::error::FetchError;
use crate::http::{lookup_url, parse_base_url, parse_rate_headers};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::time::Duration;
use url::Url;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(3);

/// Why a decoder could not produce a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The source answered but has no opinion about the name.
    NotFound,
    /// The payload carried a value that fails validation.
    Conversion(String),
}

impl From<DecodeError> for FetchError {
    fn from(e: DecodeError) -> Self {
        match e {
            DecodeError::NotFound => FetchError::NotFound,
            DecodeError::Conversion(msg) => FetchError::Conversion(msg),
        }
    }
}

/// Source-specific payload handling plugged into [`Fetcher`].
pub trait Decode {
    /// JSON shape returned by the source.
    type Payload: DeserializeOwned;
    type Output;

    /// Short label used in logs.
    const SOURCE: &'static str;

    fn decode(payload: Self::Payload) -> Result<Self::Output, DecodeError>;
}

pub struct Fetcher<D: Decode> {
    client: Client,
    base_url: Url,
    token: Option<String>,
    timeout: Duration,
    quota: QuotaState,
    _decoder: PhantomData<fn() -> D>,
}

impl<D: Decode> std::fmt::Debug for Fetcher<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher")
            .field("source", &D::SOURCE)
            .field("base_url", &self.base_url.as_str())
            .field("quota", &self.quota.snapshot())
            .finish_non_exhaustive()
    }
}

impl<D: Decode> Fetcher<D> {
    /// An empty token is treated as no token.
    pub fn new(client: Client, base_url: &str, token: Option<String>) -> Result<Self, FetchError> {
        Ok(Self {
            client,
            base_url: parse_base_url(base_url)?,
            token: token.filter(|t| !t.is_empty()),
            timeout: DEFAULT_REQUEST_TIMEOUT,
            quota: QuotaState::new(),
            _decoder: PhantomData,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn request_limit(&self) -> Result<u32, FetchError> {
        self.quota().map(|q| q.limit)
    }

    pub fn requests_left(&self) -> Result<u32, FetchError> {
        self.quota().map(|q| q.remaining)
    }

    pub fn reset_time(&self) -> Result<DateTime<Utc>, FetchError> {
        self.quota().map(|q| q.reset_at)
    }

    /// All three quota fields read under one lock.
    pub fn quota(&self) -> Result<QuotaSnapshot, FetchError> {
        self.quota.snapshot().ok_or(FetchError::NotReady)
    }

    pub fn is_ready(&self) -> bool {
        self.quota.is_ready()
    }

    /// Looks up `name`. Fails fast with [`FetchError::LimitReached`] when the
    /// tracked quota is spent and the window has not reset yet.
    pub async fn fill(&self, name: &str) -> Result<D::Output, FetchError> {
        if self.quota.is_exhausted(Utc::now()) {
            debug!("{}: quota exhausted, skipping request for {:?}", D::SOURCE, name);
            return Err(FetchError::LimitReached);
        }

        let response = self.perform_request(name).await?;
        let status = response.status();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::PAYMENT_REQUIRED => Err(FetchError::InvalidApiToken),
            StatusCode::UNPROCESSABLE_ENTITY => Err(FetchError::InvalidName),
            StatusCode::TOO_MANY_REQUESTS => {
                warn!("{}: source reported request limit reached", D::SOURCE);
                Err(FetchError::LimitReached)
            }
            StatusCode::OK => {
                let body = response.bytes().await.map_err(transport_error)?;
                let payload: D::Payload =
                    serde_json::from_slice(&body).map_err(FetchError::InvalidResponse)?;
                D::decode(payload).map_err(FetchError::from)
            }
            other => Err(FetchError::InvalidStatus(other.as_u16())),
        }
    }

    /// Sends the request and records the rate-limit envelope, whatever the
    /// status code.
    async fn perform_request(&self, name: &str) -> Result<Response, FetchError> {
        let url = lookup_url(&self.base_url, name, self.token.as_deref());
        debug!("{}: GET {} name={:?}", D::SOURCE, self.base_url, name);
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(transport_error)?;

        let rate = parse_rate_headers(response.headers(), Utc::now())?;
        let (snapshot, first) = self.quota.observe(rate);
        if first {
            info!(
                "{}: quota tracking started (limit={}, remaining={}, reset_at={})",
                D::SOURCE,
                snapshot.limit,
                snapshot.remaining,
                snapshot.reset_at.to_rfc3339()
            );
        }
        Ok(response)
    }
}

fn transport_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Network(e)
    }
}
