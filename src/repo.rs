use crate::domain::{Person, PersonData, PersonPatch};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepoError {
    #[error("record not found")]
    NotFound,
    #[error("argument error: {0}")]
    Argument(String),
}

/// Storage contract for person records.
pub trait PersonRepo: Send + Sync {
    fn create(&self, person: PersonData) -> Result<Uuid, RepoError>;
    fn get(&self, id: Uuid) -> Result<Person, RepoError>;
    fn replace(&self, id: Uuid, replacement: PersonData) -> Result<(), RepoError>;
    fn patch(&self, id: Uuid, patch: PersonPatch) -> Result<(), RepoError>;
    fn delete(&self, id: Uuid) -> Result<(), RepoError>;
}

pub(crate) fn validate_names(name: &str, surname: &str) -> Result<(), RepoError> {
    if name.trim().is_empty() {
        return Err(RepoError::Argument("name must not be empty".into()));
    }
    if surname.trim().is_empty() {
        return Err(RepoError::Argument("surname must not be empty".into()));
    }
    Ok(())
}

#[derive(Debug, Default)]
pub struct InMemoryPeople {
    people: RwLock<HashMap<Uuid, Person>>,
}

impl InMemoryPeople {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.people.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PersonRepo for InMemoryPeople {
    fn create(&self, person: PersonData) -> Result<Uuid, RepoError> {
        validate_names(&person.name, &person.surname)?;
        let id = Uuid::new_v4();
        let mut people = self.people.write().unwrap_or_else(PoisonError::into_inner);
        people.insert(id, person.with_id(id));
        Ok(id)
    }

    fn get(&self, id: Uuid) -> Result<Person, RepoError> {
        let people = self.people.read().unwrap_or_else(PoisonError::into_inner);
        people.get(&id).cloned().ok_or(RepoError::NotFound)
    }

    fn replace(&self, id: Uuid, replacement: PersonData) -> Result<(), RepoError> {
        validate_names(&replacement.name, &replacement.surname)?;
        let mut people = self.people.write().unwrap_or_else(PoisonError::into_inner);
        let slot = people.get_mut(&id).ok_or(RepoError::NotFound)?;
        *slot = replacement.with_id(id);
        Ok(())
    }

    fn patch(&self, id: Uuid, patch: PersonPatch) -> Result<(), RepoError> {
        if patch.is_empty() {
            return Err(RepoError::Argument("patch has no fields".into()));
        }
        let mut people = self.people.write().unwrap_or_else(PoisonError::into_inner);
        let person = people.get_mut(&id).ok_or(RepoError::NotFound)?;
        let mut updated = person.clone();
        patch.apply(&mut updated);
        validate_names(&updated.name, &updated.surname)?;
        *person = updated;
        Ok(())
    }

    fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut people = self.people.write().unwrap_or_else(PoisonError::into_inner);
        people.remove(&id).map(|_| ()).ok_or(RepoError::NotFound)
    }
}
