use crate::domain::NewPerson;
use crate::handler::{Handler, Outcome};
use crate::types::*;
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{self, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

pub const PROTOCOL_VERSION: &str = "2024-11-05";

const PARSE_ERROR: i64 = -32700;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;
const OPERATION_FAILED: i64 = -32000;

// Minimal JSON-RPC 2.0 types
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum Id {
    Str(String),
    Num(i64),
    Null,
}

#[derive(Debug, Serialize, Deserialize)]
struct Request {
    jsonrpc: String,
    method: String,
    #[serde(default)]
    params: Value,
    id: Option<Id>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Response {
    jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<RpcError>,
    id: Option<Id>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

fn rpc_error(id: Option<Id>, code: i64, message: &str, data: Option<Value>) -> Response {
    Response { jsonrpc: "2.0".into(), result: None, error: Some(RpcError { code, message: message.into(), data }), id }
}

fn rpc_ok<T: Serialize>(id: Option<Id>, result: T) -> Response {
    match serde_json::to_value(result) {
        Ok(v) => Response { jsonrpc: "2.0".into(), result: Some(v), error: None, id },
        Err(e) => rpc_error(id, OPERATION_FAILED, &format!("Serialization error: {}", e), None),
    }
}

fn outcome_error(id: Option<Id>, outcome: Outcome) -> Response {
    let data = ErrorData { status: outcome.status, retry_after: outcome.retry_after_secs };
    rpc_error(id, OPERATION_FAILED, &outcome.message, serde_json::to_value(data).ok())
}

/// Serves line-delimited JSON-RPC requests from stdin until EOF.
pub async fn run_stdio_server(handler: Handler) -> anyhow::Result<()> {
    info!("Starting person-enricher stdio server; protocol={}", PROTOCOL_VERSION);
    let mut lines = BufReader::new(io::stdin()).lines();
    let mut out = io::stdout();
    while let Some(line) = lines.next_line().await? {
        if let Some(resp) = handle_line(&handler, &line).await {
            write_response(&mut out, &resp).await?;
        }
    }
    info!("stdin closed, shutting down");
    Ok(())
}

async fn handle_line(handler: &Handler, line: &str) -> Option<Response> {
    if line.trim().is_empty() {
        return None;
    }
    let req: Request = match serde_json::from_str(line) {
        Ok(r) => r,
        Err(e) => return Some(rpc_error(None, PARSE_ERROR, &format!("Parse error: {}", e), None)),
    };
    debug!("Received method={}", req.method);
    Some(dispatch(handler, req).await)
}

async fn write_response<W: AsyncWrite + Unpin>(out: &mut W, resp: &Response) -> anyhow::Result<()> {
    let mut payload = serde_json::to_vec(resp)?;
    payload.push(b'\n');
    out.write_all(&payload).await?;
    out.flush().await?;
    Ok(())
}

fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T, String> {
    serde_json::from_value(params).map_err(|e| format!("Invalid params: {}", e))
}

async fn dispatch(handler: &Handler, req: Request) -> Response {
    let id = req.id;
    match req.method.as_str() {
        "initialize" => rpc_ok(
            id,
            serde_json::json!({
                "protocolVersion": PROTOCOL_VERSION,
                "server": { "name": "person-enricher", "version": env!("CARGO_PKG_VERSION") },
            }),
        ),
        "ping" => {
            let input: PingInput = parse_params(req.params).unwrap_or(PingInput { message: None });
            rpc_ok(id, PingOutput { message: input.message.unwrap_or_else(|| "pong".to_string()) })
        }
        "person/create" => match parse_params::<NewPerson>(req.params) {
            Err(e) => rpc_error(id, INVALID_PARAMS, &e, None),
            Ok(input) => match handler.create_person(input).await {
                Ok(pid) => rpc_ok(id, CreatedOutput { id: pid }),
                Err(outcome) => outcome_error(id, outcome),
            },
        },
        "person/get" => match parse_params::<PersonIdInput>(req.params) {
            Err(e) => rpc_error(id, INVALID_PARAMS, &e, None),
            Ok(input) => match handler.get_person(input.id) {
                Ok(person) => rpc_ok(id, person),
                Err(outcome) => outcome_error(id, outcome),
            },
        },
        "person/replace" => match parse_params::<ReplacePersonInput>(req.params) {
            Err(e) => rpc_error(id, INVALID_PARAMS, &e, None),
            Ok(input) => ok_or_outcome(id, handler.replace_person(input.id, input.person)),
        },
        "person/patch" => match parse_params::<PatchPersonInput>(req.params) {
            Err(e) => rpc_error(id, INVALID_PARAMS, &e, None),
            Ok(input) => ok_or_outcome(id, handler.patch_person(input.id, input.patch)),
        },
        "person/delete" => match parse_params::<PersonIdInput>(req.params) {
            Err(e) => rpc_error(id, INVALID_PARAMS, &e, None),
            Ok(input) => ok_or_outcome(id, handler.delete_person(input.id)),
        },
        "enricher/quota" => rpc_ok(id, QuotaOutput { sources: handler.quota_report() }),
        other => rpc_error(id, METHOD_NOT_FOUND, &format!("Method not found: {}", other), None),
    }
}

fn ok_or_outcome(id: Option<Id>, res: Result<(), Outcome>) -> Response {
    match res {
        Ok(()) => rpc_ok(id, OkOutput { ok: true }),
        Err(outcome) => outcome_error(id, outcome),
    }
}
