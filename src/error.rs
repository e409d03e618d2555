use crate::domain::EnrichmentResult;
use std::fmt;
use thiserror::Error;

/// Failure of a single lookup against one source.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("fetcher is not ready (no request has completed yet)")]
    NotReady,
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("invalid API token")]
    InvalidApiToken,
    #[error("invalid name")]
    InvalidName,
    #[error("request limit reached")]
    LimitReached,
    #[error("timeout")]
    Timeout,
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),
    #[error("invalid response: header {header:?}, value {value:?}")]
    InvalidHeader { header: &'static str, value: String },
    #[error("invalid response: unexpected status code {0}")]
    InvalidStatus(u16),
    #[error("invalid response: {0}")]
    InvalidResponse(#[source] serde_json::Error),
    #[error("conversion error: {0}")]
    Conversion(String),
    #[error("not found")]
    NotFound,
}

/// Broad failure categories used by callers to pick a transport outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Bad base URL or rejected API token.
    Config,
    /// The source refused the input.
    Input,
    /// Quota exhausted, retry later.
    Quota,
    Transport,
    /// The source broke its own response contract.
    Protocol,
    /// The source has no answer for this name.
    Absent,
    /// Accessor called before the first completed request.
    Usage,
}

impl ErrorClass {
    /// Higher is worse. Server-side failures outrank quota, which outranks
    /// answers about the input itself.
    pub fn severity(self) -> u8 {
        match self {
            ErrorClass::Config | ErrorClass::Transport | ErrorClass::Protocol | ErrorClass::Usage => 2,
            ErrorClass::Quota => 1,
            ErrorClass::Input | ErrorClass::Absent => 0,
        }
    }

    pub fn is_server_side(self) -> bool {
        self.severity() == 2
    }
}

impl FetchError {
    pub fn class(&self) -> ErrorClass {
        match self {
            FetchError::InvalidUrl(_) | FetchError::InvalidApiToken => ErrorClass::Config,
            FetchError::InvalidName => ErrorClass::Input,
            FetchError::LimitReached => ErrorClass::Quota,
            FetchError::Timeout | FetchError::Network(_) => ErrorClass::Transport,
            FetchError::InvalidHeader { .. }
            | FetchError::InvalidStatus(_)
            | FetchError::InvalidResponse(_)
            | FetchError::Conversion(_) => ErrorClass::Protocol,
            FetchError::NotFound => ErrorClass::Absent,
            FetchError::NotReady => ErrorClass::Usage,
        }
    }

    pub fn is_limit_reached(&self) -> bool {
        matches!(self, FetchError::LimitReached)
    }
}

/// Which lookup source a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Sex,
    Nationality,
    Age,
}

impl Source {
    pub const ALL: [Source; 3] = [Source::Sex, Source::Nationality, Source::Age];

    pub fn as_str(self) -> &'static str {
        match self {
            Source::Sex => "sex",
            Source::Nationality => "nationality",
            Source::Age => "age",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct SourceFailure {
    pub source: Source,
    pub error: FetchError,
}

/// Combined failure of an enrichment call. Keeps every per-source error and
/// whatever fields did resolve.
#[derive(Debug, Error)]
#[error("enrichment failed ({} of 3 sources failed):{}", .failures.len(), render_failures(.failures))]
pub struct EnrichError {
    failures: Vec<SourceFailure>,
    partial: EnrichmentResult,
}

fn render_failures(failures: &[SourceFailure]) -> String {
    failures
        .iter()
        .map(|f| format!(" {{{}: {}}}", f.source, f.error))
        .collect()
}

impl EnrichError {
    /// Returns `None` when nothing failed.
    pub fn from_failures(failures: Vec<SourceFailure>, partial: EnrichmentResult) -> Option<Self> {
        if failures.is_empty() {
            None
        } else {
            Some(Self { failures, partial })
        }
    }

    /// Worst class among the failed sources.
    pub fn class(&self) -> ErrorClass {
        self.failures
            .iter()
            .map(|f| f.error.class())
            .max_by_key(|c| c.severity())
            .unwrap_or(ErrorClass::Usage)
    }

    pub fn is_limit_reached(&self) -> bool {
        self.failures.iter().any(|f| f.error.is_limit_reached())
    }

    pub fn failures(&self) -> &[SourceFailure] {
        &self.failures
    }

    pub fn failure_for(&self, source: Source) -> Option<&FetchError> {
        self.failures
            .iter()
            .find(|f| f.source == source)
            .map(|f| &f.error)
    }

    pub fn partial(&self) -> &EnrichmentResult {
        &self.partial
    }

    pub fn into_partial(self) -> EnrichmentResult {
        self.partial
    }
}
