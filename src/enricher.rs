//! Three-way lookup combiner.
//!
//! [`Enricher::complete`] queries the sex, nationality and age sources at the
//! same time and always waits for all three, so a field that resolved is kept
//! even when a sibling failed. [`Enricher::unlocking_time`] tells callers when
//! retrying after a quota failure is worthwhile.

use crate::config::Config;
use crate::domain::EnrichmentResult;
use crate::error::{EnrichError, FetchError, Source, SourceFailure};
use crate::fetcher::QuotaSnapshot;
use crate::http::build_client;
use crate::sources::{AgeFetcher, NationalityFetcher, SexFetcher};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use reqwest::Client;
use std::sync::OnceLock;
use std::time::Duration;

pub struct Enricher {
    sex: SexFetcher,
    nationality: NationalityFetcher,
    age: AgeFetcher,
    // Set once, never recomputed.
    unlock_time: OnceLock<DateTime<Utc>>,
}

impl Enricher {
    pub fn new(cfg: &Config) -> Result<Self, FetchError> {
        let client = build_client(cfg).map_err(FetchError::Network)?;
        Self::with_client(cfg, client)
    }

    pub fn with_client(cfg: &Config, client: Client) -> Result<Self, FetchError> {
        let timeout = Duration::from_secs(cfg.request_timeout_secs);
        Ok(Self::from_fetchers(
            SexFetcher::new(client.clone(), &cfg.genderize_url, cfg.token.clone())?.with_timeout(timeout),
            NationalityFetcher::new(client.clone(), &cfg.nationalize_url, cfg.token.clone())?
                .with_timeout(timeout),
            AgeFetcher::new(client, &cfg.agify_url, cfg.token.clone())?.with_timeout(timeout),
        ))
    }

    pub fn from_fetchers(sex: SexFetcher, nationality: NationalityFetcher, age: AgeFetcher) -> Self {
        Self {
            sex,
            nationality,
            age,
            unlock_time: OnceLock::new(),
        }
    }

    pub fn sex_fetcher(&self) -> &SexFetcher {
        &self.sex
    }

    pub fn nationality_fetcher(&self) -> &NationalityFetcher {
        &self.nationality
    }

    pub fn age_fetcher(&self) -> &AgeFetcher {
        &self.age
    }

    /// Looks `name` up in all three sources. On failure the error carries the
    /// fields that did resolve.
    pub async fn complete(&self, name: &str) -> Result<EnrichmentResult, EnrichError> {
        let (sex, nationality, age) = tokio::join!(
            self.sex.fill(name),
            self.nationality.fill(name),
            self.age.fill(name),
        );

        let mut result = EnrichmentResult::default();
        let mut failures = Vec::new();
        match sex {
            Ok(v) => result.sex = Some(v),
            Err(error) => failures.push(SourceFailure { source: Source::Sex, error }),
        }
        match nationality {
            Ok(v) => result.nationality = Some(v),
            Err(error) => failures.push(SourceFailure {
                source: Source::Nationality,
                error,
            }),
        }
        match age {
            Ok(v) => result.age = Some(v),
            Err(error) => failures.push(SourceFailure { source: Source::Age, error }),
        }

        match EnrichError::from_failures(failures, result.clone()) {
            None => {
                debug!("enriched {:?}: {:?}", name, result);
                Ok(result)
            }
            Some(err) => {
                warn!("{}", err);
                Err(err)
            }
        }
    }

    /// Earliest moment at which every source's window has reset. Computed on
    /// the first call that finds all three sources ready, then cached.
    pub fn unlocking_time(&self) -> Result<DateTime<Utc>, FetchError> {
        if let Some(t) = self.unlock_time.get() {
            return Ok(*t);
        }
        let latest = [
            self.sex.reset_time(),
            self.nationality.reset_time(),
            self.age.reset_time(),
        ]
        .into_iter()
        .try_fold(DateTime::<Utc>::MIN_UTC, |acc, t| t.map(|t| acc.max(t)))?;
        Ok(*self.unlock_time.get_or_init(|| latest))
    }

    /// Quota of every source, `None` for sources not used yet.
    pub fn quotas(&self) -> [(Source, Option<QuotaSnapshot>); 3] {
        [
            (Source::Sex, self.sex.quota().ok()),
            (Source::Nationality, self.nationality.quota().ok()),
            (Source::Age, self.age.quota().ok()),
        ]
    }
}
