//! Payload decoders for the three lookup sources.

mod agify;
mod genderize;
mod nationalize;

pub use agify::{AgeDecoder, AgePayload};
pub use genderize::{GenderDecoder, GenderPayload};
pub use nationalize::{CountryCandidate, NationalityDecoder, NationalityPayload};

use crate::fetcher::Fetcher;

pub type SexFetcher = Fetcher<GenderDecoder>;
pub type NationalityFetcher = Fetcher<NationalityDecoder>;
pub type AgeFetcher = Fetcher<AgeDecoder>;
