use crate::domain::CountryCode;
use crate::fetcher::{Decode, DecodeError};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CountryCandidate {
    pub country_id: String,
}

/// `{"country": [{"country_id": "UA", "probability": 0.4}, ...]}`, most likely first.
#[derive(Debug, Deserialize)]
pub struct NationalityPayload {
    pub country: Vec<CountryCandidate>,
}

#[derive(Debug)]
pub struct NationalityDecoder;

impl Decode for NationalityDecoder {
    type Payload = NationalityPayload;
    type Output = CountryCode;

    const SOURCE: &'static str = "nationalize";

    fn decode(payload: NationalityPayload) -> Result<CountryCode, DecodeError> {
        let first = payload.country.into_iter().next().ok_or(DecodeError::NotFound)?;
        CountryCode::new(first.country_id).map_err(DecodeError::Conversion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(body: &str) -> Result<CountryCode, DecodeError> {
        NationalityDecoder::decode(serde_json::from_str(body).unwrap())
    }

    #[test]
    fn first_candidate_wins() {
        let body = r#"{"count":1,"name":"Dmitriy","country":[{"country_id":"UA","probability":0.4},{"country_id":"RU","probability":0.3}]}"#;
        assert_eq!(decode(body).unwrap().as_str(), "UA");
    }

    #[test]
    fn empty_candidates_is_not_found() {
        assert_eq!(decode(r#"{"count":0,"name":"Qwxz","country":[]}"#), Err(DecodeError::NotFound));
    }

    #[test]
    fn malformed_code_is_conversion_error() {
        assert!(matches!(
            decode(r#"{"country":[{"country_id":"ukr"}]}"#),
            Err(DecodeError::Conversion(_))
        ));
    }
}
