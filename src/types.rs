use crate::domain::{PersonData, PersonPatch};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Parameter and result shapes of the JSON-RPC methods.

#[derive(Debug, Deserialize)]
pub struct PingInput {
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PingOutput {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct PersonIdInput {
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct CreatedOutput {
    pub id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ReplacePersonInput {
    pub id: Uuid,
    pub person: PersonData,
}

#[derive(Debug, Deserialize)]
pub struct PatchPersonInput {
    pub id: Uuid,
    pub patch: PersonPatch,
}

#[derive(Debug, Serialize)]
pub struct OkOutput {
    pub ok: bool,
}

/// Quota of one lookup source as shown to operators.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceQuota {
    pub source: String,
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QuotaOutput {
    pub sources: Vec<SourceQuota>,
}

/// `data` attached to JSON-RPC errors produced from handler outcomes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorData {
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}
