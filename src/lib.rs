pub mod cli;
pub mod config;
pub mod domain;
pub mod enricher;
pub mod error;
pub mod fetcher;
pub mod handler;
pub mod http;
pub mod repo;
pub mod server;
pub mod sources;
pub mod types;

pub use domain::{CountryCode, EnrichmentResult, Sex};
pub use enricher::Enricher;
pub use error::{EnrichError, ErrorClass, FetchError, Source};
pub use fetcher::{Decode, DecodeError, Fetcher, QuotaSnapshot};
