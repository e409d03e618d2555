use crate::domain::{EnrichmentResult, NewPerson, Person, PersonData, PersonPatch};
use crate::enricher::Enricher;
use crate::error::{EnrichError, ErrorClass, Source, SourceFailure};
use crate::repo::{validate_names, PersonRepo, RepoError};
use crate::types::SourceQuota;
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use std::sync::Arc;
use uuid::Uuid;

/// Used when a quota failure is reported before every source has answered once.
pub const FALLBACK_RETRY_AFTER_SECS: u64 = 60;

/// Transport-level result of a failed operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub status: u16,
    pub message: String,
    pub retry_after_secs: Option<u64>,
}

impl Outcome {
    fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            retry_after_secs: None,
        }
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    pub fn is_server_error(&self) -> bool {
        self.status >= 500
    }
}

impl From<RepoError> for Outcome {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound => Outcome::new(404, e.to_string()),
            RepoError::Argument(_) => Outcome::new(400, e.to_string()),
        }
    }
}

/// Seconds from `now` until `unlock`, rounded up, at least one.
pub fn retry_after_secs(unlock: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let millis = (unlock - now).num_milliseconds().max(0) as u64;
    millis.div_ceil(1000).max(1)
}

pub struct Handler {
    people: Arc<dyn PersonRepo>,
    enricher: Arc<Enricher>,
}

impl Handler {
    pub fn new(people: Arc<dyn PersonRepo>, enricher: Arc<Enricher>) -> Self {
        Self { people, enricher }
    }

    pub fn enricher(&self) -> &Enricher {
        &self.enricher
    }

    /// Stores a new record, looking up whichever of sex/nationality/age the
    /// caller left out. Names are validated before any lookup is spent.
    pub async fn create_person(&self, input: NewPerson) -> Result<Uuid, Outcome> {
        validate_names(&input.name, &input.surname)?;

        let mut input = input;
        if input.needs_enrichment() {
            let found = match self.enricher.complete(&input.name).await {
                Ok(found) => found,
                Err(err) => self.tolerate(&input, err)?,
            };
            input.sex = input.sex.or(found.sex);
            input.nationality = input.nationality.or(found.nationality);
            input.age = input.age.or(found.age);
        }

        let NewPerson {
            name,
            surname,
            patronymic,
            sex: Some(sex),
            nationality: Some(nationality),
            age: Some(age),
        } = input
        else {
            error!("enrichment reported success but left fields empty");
            return Err(Outcome::new(500, "internal error"));
        };

        let id = self.people.create(PersonData {
            name,
            surname,
            patronymic,
            sex,
            nationality,
            age,
        })?;
        info!("created person {}", id);
        Ok(id)
    }

    /// Keeps the partial result when only sources for caller-supplied fields
    /// failed; otherwise maps the relevant failures to an outcome.
    fn tolerate(&self, input: &NewPerson, err: EnrichError) -> Result<EnrichmentResult, Outcome> {
        let relevant: Vec<&SourceFailure> = err
            .failures()
            .iter()
            .filter(|f| match f.source {
                Source::Sex => input.sex.is_none(),
                Source::Nationality => input.nationality.is_none(),
                Source::Age => input.age.is_none(),
            })
            .collect();
        if relevant.is_empty() {
            return Ok(err.into_partial());
        }
        Err(self.outcome_for(&relevant))
    }

    fn outcome_for(&self, failures: &[&SourceFailure]) -> Outcome {
        let Some(worst) = failures
            .iter()
            .map(|f| f.error.class())
            .max_by_key(|c| c.severity())
        else {
            return Outcome::new(500, "internal error");
        };
        let detail = failures
            .iter()
            .map(|f| format!("{}: {}", f.source, f.error))
            .collect::<Vec<_>>()
            .join("; ");

        match worst {
            ErrorClass::Absent => Outcome::new(422, format!("person attributes not found ({detail})")),
            ErrorClass::Input => Outcome::new(422, format!("name rejected by lookup service ({detail})")),
            ErrorClass::Quota => {
                let retry_after = match self.enricher.unlocking_time() {
                    Ok(unlock) => retry_after_secs(unlock, Utc::now()),
                    Err(e) => {
                        warn!("unlocking time unavailable ({}), using fallback", e);
                        FALLBACK_RETRY_AFTER_SECS
                    }
                };
                Outcome {
                    status: 503,
                    message: format!("lookup quota exhausted ({detail})"),
                    retry_after_secs: Some(retry_after),
                }
            }
            ErrorClass::Transport | ErrorClass::Protocol => {
                error!("lookup service failure: {}", detail);
                Outcome::new(502, "lookup service failure")
            }
            ErrorClass::Config | ErrorClass::Usage => {
                error!("enricher misconfigured: {}", detail);
                Outcome::new(500, "internal error")
            }
        }
    }

    pub fn get_person(&self, id: Uuid) -> Result<Person, Outcome> {
        Ok(self.people.get(id)?)
    }

    pub fn replace_person(&self, id: Uuid, data: PersonData) -> Result<(), Outcome> {
        Ok(self.people.replace(id, data)?)
    }

    pub fn patch_person(&self, id: Uuid, patch: PersonPatch) -> Result<(), Outcome> {
        Ok(self.people.patch(id, patch)?)
    }

    pub fn delete_person(&self, id: Uuid) -> Result<(), Outcome> {
        self.people.delete(id)?;
        info!("deleted person {}", id);
        Ok(())
    }

    pub fn quota_report(&self) -> Vec<SourceQuota> {
        self.enricher
            .quotas()
            .into_iter()
            .map(|(source, quota)| SourceQuota {
                source: source.as_str().to_string(),
                ready: quota.is_some(),
                limit: quota.map(|q| q.limit),
                remaining: quota.map(|q| q.remaining),
                reset_at: quota.map(|q| q.reset_at.to_rfc3339()),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn retry_after_rounds_up() {
        let now = Utc::now();
        assert_eq!(retry_after_secs(now + TimeDelta::milliseconds(29_100), now), 30);
        assert_eq!(retry_after_secs(now + TimeDelta::seconds(30), now), 30);
        assert_eq!(retry_after_secs(now - TimeDelta::seconds(5), now), 1);
    }

    #[test]
    fn repo_errors_map_to_client_errors() {
        let o = Outcome::from(RepoError::NotFound);
        assert_eq!(o.status, 404);
        assert!(o.is_client_error());
        let o = Outcome::from(RepoError::Argument("x".into()));
        assert_eq!(o.status, 400);
        assert!(!o.is_server_error());
    }
}
