use chrono::{TimeDelta, Utc};
use person_enricher::error::FetchError;
use person_enricher::http::{lookup_url, parse_base_url, parse_rate_headers};
use reqwest::header::HeaderMap;

#[test]
fn rate_headers_case_insensitive() {
    let mut h = HeaderMap::new();
    h.insert("X-RATE-LIMIT-LIMIT", "1000".parse().unwrap());
    h.insert("x-rate-limit-remaining", "999".parse().unwrap());
    h.insert("X-Rate-Limit-Reset", "0".parse().unwrap());
    let now = Utc::now();
    let rate = parse_rate_headers(&h, now).unwrap();
    assert_eq!(rate.limit, 1000);
    assert_eq!(rate.remaining, 999);
    assert_eq!(rate.reset_at, now);
}

#[test]
fn reset_is_relative_to_now() {
    let mut h = HeaderMap::new();
    h.insert("x-rate-limit-limit", "10".parse().unwrap());
    h.insert("x-rate-limit-remaining", "1".parse().unwrap());
    h.insert("x-rate-limit-reset", "86400".parse().unwrap());
    let now = Utc::now();
    let rate = parse_rate_headers(&h, now).unwrap();
    assert_eq!(rate.reset_at - now, TimeDelta::days(1));
}

#[test]
fn empty_headers_fail_on_limit_first() {
    let err = parse_rate_headers(&HeaderMap::new(), Utc::now()).unwrap_err();
    assert!(matches!(err, FetchError::InvalidHeader { header: "x-rate-limit-limit", .. }));
}

#[test]
fn lookup_url_keeps_base_path() {
    let base = parse_base_url("http://localhost:8080/api/agify").unwrap();
    let url = lookup_url(&base, "Ольга", None);
    assert_eq!(url.path(), "/api/agify");
    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    assert_eq!(pairs, vec![("name".to_string(), "Ольга".to_string())]);
}
