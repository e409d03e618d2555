#![allow(dead_code)]

use httpmock::Then;

pub const TIME_TOLERANCE_SECS: i64 = 3;

/// Attaches the rate-limit envelope every source sends.
pub fn rate(then: Then, limit: u32, remaining: u32, reset_secs: u32) -> Then {
    then.header("X-Rate-Limit-Limit", limit.to_string())
        .header("X-Rate-Limit-Remaining", remaining.to_string())
        .header("X-Rate-Limit-Reset", reset_secs.to_string())
}

pub fn gender_body(name: &str, gender: Option<&str>) -> serde_json::Value {
    serde_json::json!({"count": 10, "name": name, "gender": gender, "probability": 0.98})
}

pub fn nationality_body(name: &str, codes: &[&str]) -> serde_json::Value {
    let country: Vec<_> = codes
        .iter()
        .map(|c| serde_json::json!({"country_id": c, "probability": 0.4}))
        .collect();
    serde_json::json!({"count": 10, "name": name, "country": country})
}

pub fn age_body(name: &str, age: Option<i64>) -> serde_json::Value {
    serde_json::json!({"count": 10, "name": name, "age": age})
}
