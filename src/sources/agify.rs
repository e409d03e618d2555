use crate::fetcher::{Decode, DecodeError};
use serde::Deserialize;

/// `{"age": 42 | null, ...}`
#[derive(Debug, Deserialize)]
pub struct AgePayload {
    #[serde(default)]
    pub age: Option<i64>,
}

#[derive(Debug)]
pub struct AgeDecoder;

impl Decode for AgeDecoder {
    type Payload = AgePayload;
    type Output = u32;

    const SOURCE: &'static str = "agify";

    fn decode(payload: AgePayload) -> Result<u32, DecodeError> {
        let age = payload.age.ok_or(DecodeError::NotFound)?;
        u32::try_from(age).map_err(|_| DecodeError::Conversion(format!("invalid age value: {age}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(body: &str) -> Result<u32, DecodeError> {
        AgeDecoder::decode(serde_json::from_str(body).unwrap())
    }

    #[test]
    fn decodes_age() {
        assert_eq!(decode(r#"{"count":1,"name":"Dmitriy","age":43}"#), Ok(43));
    }

    #[test]
    fn null_age_is_not_found() {
        assert_eq!(decode(r#"{"count":0,"name":"Zzz","age":null}"#), Err(DecodeError::NotFound));
    }

    #[test]
    fn negative_age_is_rejected() {
        assert!(matches!(decode(r#"{"age":-3}"#), Err(DecodeError::Conversion(_))));
    }
}
