use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn as_str(self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Sex::Male),
            "female" => Ok(Sex::Female),
            other => Err(format!("invalid sex value: {other:?}")),
        }
    }
}

/// ISO 3166-1 alpha-2 country code (two uppercase ASCII letters).
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct CountryCode(String);

impl CountryCode {
    pub fn new(code: impl Into<String>) -> Result<Self, String> {
        let code = code.into();
        if code.len() == 2 && code.bytes().all(|b| b.is_ascii_uppercase()) {
            Ok(Self(code))
        } else {
            Err(format!("invalid country code: {code:?}"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for CountryCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        CountryCode::new(raw).map_err(serde::de::Error::custom)
    }
}

/// Attributes gathered for one name. A field stays `None` when its source failed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnrichmentResult {
    pub sex: Option<Sex>,
    pub nationality: Option<CountryCode>,
    pub age: Option<u32>,
}

impl EnrichmentResult {
    pub fn is_complete(&self) -> bool {
        self.sex.is_some() && self.nationality.is_some() && self.age.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Person {
    pub id: Uuid,
    pub name: String,
    pub surname: String,
    #[serde(default)]
    pub patronymic: String,
    pub sex: Sex,
    pub nationality: CountryCode,
    pub age: u32,
}

/// Input for record creation; missing attributes are looked up by first name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewPerson {
    pub name: String,
    pub surname: String,
    #[serde(default)]
    pub patronymic: String,
    #[serde(default)]
    pub sex: Option<Sex>,
    #[serde(default)]
    pub nationality: Option<CountryCode>,
    #[serde(default)]
    pub age: Option<u32>,
}

impl NewPerson {
    pub fn needs_enrichment(&self) -> bool {
        self.sex.is_none() || self.nationality.is_none() || self.age.is_none()
    }
}

/// Full replacement payload (every attribute supplied by the caller).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersonData {
    pub name: String,
    pub surname: String,
    #[serde(default)]
    pub patronymic: String,
    pub sex: Sex,
    pub nationality: CountryCode,
    pub age: u32,
}

impl PersonData {
    pub fn with_id(self, id: Uuid) -> Person {
        Person {
            id,
            name: self.name,
            surname: self.surname,
            patronymic: self.patronymic,
            sex: self.sex,
            nationality: self.nationality,
            age: self.age,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersonPatch {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub patronymic: Option<String>,
    pub sex: Option<Sex>,
    pub nationality: Option<CountryCode>,
    pub age: Option<u32>,
}

impl PersonPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.surname.is_none()
            && self.patronymic.is_none()
            && self.sex.is_none()
            && self.nationality.is_none()
            && self.age.is_none()
    }

    pub fn apply(self, person: &mut Person) {
        if let Some(name) = self.name {
            person.name = name;
        }
        if let Some(surname) = self.surname {
            person.surname = surname;
        }
        if let Some(patronymic) = self.patronymic {
            person.patronymic = patronymic;
        }
        if let Some(sex) = self.sex {
            person.sex = sex;
        }
        if let Some(nationality) = self.nationality {
            person.nationality = nationality;
        }
        if let Some(age) = self.age {
            person.age = age;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn country_code_validation() {
        assert!(CountryCode::new("RU").is_ok());
        assert!(CountryCode::new("ru").is_err());
        assert!(CountryCode::new("RUS").is_err());
        assert!(CountryCode::new("").is_err());
        let parsed: Result<CountryCode, _> = serde_json::from_str("\"U1\"");
        assert!(parsed.is_err());
    }

    #[test]
    fn sex_parses_known_values_only() {
        assert_eq!("female".parse::<Sex>().unwrap(), Sex::Female);
        assert!("unknown".parse::<Sex>().is_err());
        assert_eq!(serde_json::to_string(&Sex::Male).unwrap(), "\"male\"");
    }

    #[test]
    fn patch_touches_only_supplied_fields() {
        let mut person = Person {
            id: Uuid::new_v4(),
            name: "Ivan".into(),
            surname: "Petrov".into(),
            patronymic: String::new(),
            sex: Sex::Male,
            nationality: CountryCode::new("RU").unwrap(),
            age: 40,
        };
        let patch = PersonPatch {
            age: Some(41),
            ..Default::default()
        };
        assert!(!patch.is_empty());
        patch.apply(&mut person);
        assert_eq!(person.age, 41);
        assert_eq!(person.name, "Ivan");
    }
}
