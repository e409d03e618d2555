use crate::domain::Sex;
use crate::fetcher::{Decode, DecodeError};
use serde::Deserialize;

/// `{"gender": "female" | "male" | null, ...}`
#[derive(Debug, Deserialize)]
pub struct GenderPayload {
    #[serde(default)]
    pub gender: Option<String>,
}

#[derive(Debug)]
pub struct GenderDecoder;

impl Decode for GenderDecoder {
    type Payload = GenderPayload;
    type Output = Sex;

    const SOURCE: &'static str = "genderize";

    fn decode(payload: GenderPayload) -> Result<Sex, DecodeError> {
        let gender = payload.gender.ok_or(DecodeError::NotFound)?;
        gender.parse().map_err(DecodeError::Conversion)
    }
}
