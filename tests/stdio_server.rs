mod common;

use assert_cmd::Command;
use common::{age_body, gender_body, nationality_body, rate};
use httpmock::{Method::GET, MockServer};
use predicates::prelude::*;

fn source_env(server: &MockServer) -> Vec<(&'static str, String)> {
    vec![
        ("GENDERIZE_URL", server.url("/genderize")),
        ("NATIONALIZE_URL", server.url("/nationalize")),
        ("AGIFY_URL", server.url("/agify")),
    ]
}

/// Feeds one request per line and returns one parsed response per line.
fn run(requests: &[serde_json::Value], envs: &[(&str, String)]) -> anyhow::Result<Vec<serde_json::Value>> {
    let mut cmd = Command::cargo_bin("person-enricher")?;
    cmd.env_remove("ENRICHER_TOKEN");
    for (k, v) in envs {
        cmd.env(k, v);
    }
    let mut input = String::new();
    for req in requests {
        input.push_str(&serde_json::to_string(req)?);
        input.push('\n');
    }
    let assert = cmd.arg("--log-level").arg("warn").write_stdin(input).assert().success();
    let output = String::from_utf8(assert.get_output().stdout.clone())?;
    output
        .lines()
        .map(|l| serde_json::from_str(l).map_err(Into::into))
        .collect()
}

#[test]
fn version_flag_prints_version() {
    Command::cargo_bin("person-enricher")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("person-enricher "));
}

#[test]
fn missing_config_fails_startup() {
    Command::cargo_bin("person-enricher")
        .unwrap()
        .env_remove("GENDERIZE_URL")
        .env_remove("NATIONALIZE_URL")
        .env_remove("AGIFY_URL")
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("GENDERIZE_URL"));
}

#[test]
fn create_enriches_and_reports_quota() -> anyhow::Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/genderize").query_param("name", "Dmitriy");
        rate(then, 1000, 999, 3600).status(200).json_body(gender_body("Dmitriy", Some("male")));
    });
    server.mock(|when, then| {
        when.method(GET).path("/nationalize").query_param("name", "Dmitriy");
        rate(then, 1000, 999, 3600).status(200).json_body(nationality_body("Dmitriy", &["UA"]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/agify").query_param("name", "Dmitriy");
        rate(then, 1000, 999, 3600).status(200).json_body(age_body("Dmitriy", Some(43)));
    });

    let create = serde_json::json!({
        "jsonrpc": "2.0", "method": "person/create", "id": 1,
        "params": {"name": "Dmitriy", "surname": "Ushakov", "patronymic": "Vasilevich"}
    });
    let delete_missing = serde_json::json!({
        "jsonrpc": "2.0", "method": "person/delete", "id": 2,
        "params": {"id": "6f1c5b0e-8f5a-4d7e-9a43-2d9b2a0c9e11"}
    });
    let quota = serde_json::json!({"jsonrpc": "2.0", "method": "enricher/quota", "id": 3});
    let out = run(&[create, delete_missing, quota], &source_env(&server))?;
    assert_eq!(out.len(), 3);

    assert!(out[0]["result"]["id"].is_string(), "{}", out[0]);
    assert_eq!(out[1]["error"]["data"]["status"], 404);
    let sources = out[2]["result"]["sources"].as_array().unwrap();
    assert_eq!(sources.len(), 3);
    assert!(sources.iter().all(|s| s["ready"] == true && s["remaining"] == 999));
    Ok(())
}

#[test]
fn exhausted_source_yields_retry_after() -> anyhow::Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/genderize");
        rate(then, 1000, 999, 10).status(200).json_body(gender_body("Bill", Some("male")));
    });
    server.mock(|when, then| {
        when.method(GET).path("/nationalize");
        rate(then, 1000, 999, 20).status(200).json_body(nationality_body("Bill", &["US"]));
    });
    let age = server.mock(|when, then| {
        when.method(GET).path("/agify");
        rate(then, 100, 0, 30)
            .status(429)
            .json_body(serde_json::json!({"error": "Request limit reached"}));
    });

    let create = serde_json::json!({
        "jsonrpc": "2.0", "method": "person/create", "id": 1,
        "params": {"name": "Bill", "surname": "Gates"}
    });
    let out = run(&[create.clone(), create], &source_env(&server))?;
    for resp in &out {
        assert_eq!(resp["error"]["data"]["status"], 503, "{resp}");
    }
    // The latest-resetting source (agify, 30s) gates the retry.
    let retry = out[0]["error"]["data"]["retry_after"].as_u64().unwrap();
    assert!((27..=30).contains(&retry), "retry_after={retry}");
    assert!(out[1]["error"]["data"]["retry_after"].as_u64().unwrap() <= retry);
    // Second attempt is answered from local quota state.
    age.assert_hits(1);
    Ok(())
}

#[test]
fn supplied_field_tolerates_its_source_failing() -> anyhow::Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/genderize");
        rate(then, 1000, 999, 3600).status(200).json_body(gender_body("Kim", Some("female")));
    });
    server.mock(|when, then| {
        when.method(GET).path("/nationalize");
        rate(then, 1000, 999, 3600).status(200).json_body(nationality_body("Kim", &["KR"]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/agify");
        rate(then, 1000, 999, 3600).status(200).json_body(age_body("Kim", None));
    });

    let with_age = serde_json::json!({
        "jsonrpc": "2.0", "method": "person/create", "id": 1,
        "params": {"name": "Kim", "surname": "Lee", "age": 35}
    });
    let without_age = serde_json::json!({
        "jsonrpc": "2.0", "method": "person/create", "id": 2,
        "params": {"name": "Kim", "surname": "Lee"}
    });
    let out = run(&[with_age, without_age], &source_env(&server))?;
    assert!(out[0]["result"]["id"].is_string(), "{}", out[0]);
    assert_eq!(out[1]["error"]["data"]["status"], 422);
    Ok(())
}
