use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use dls::config::EngineConfig;
use dls::data::TableCache;
use dls::server::routes::router;
use serde_json::Value;
use tower::ServiceExt;

fn app() -> Router {
    let config = EngineConfig::load(concat!(env!("CARGO_MANIFEST_DIR"), "/data/formats.yaml"))
        .expect("shipped config loads");
    router(Arc::new(TableCache::new(config)))
}

async fn send(request: Request<Body>) -> (StatusCode, Value) {
    let response = app().oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    let payload = serde_json::from_slice(&bytes).expect("response should be valid json");
    (status, payload)
}

async fn get(uri: &str) -> (StatusCode, Value) {
    send(Request::get(uri).body(Body::empty()).expect("request")).await
}

async fn post(uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request");
    send(request).await
}

#[tokio::test]
async fn health_endpoint_returns_ok_json() {
    let (status, payload) = get("/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["service"], "dls-api");
}

#[tokio::test]
async fn formats_endpoint_lists_registered_formats() {
    let (status, payload) = get("/api/formats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["target_formula"], "standard_edition");
    let formats: Vec<u64> = payload["formats"]
        .as_array()
        .expect("formats array")
        .iter()
        .filter_map(|entry| entry["format_overs"].as_u64())
        .collect();
    assert!(formats.contains(&20));
    assert!(formats.contains(&50));
}

#[tokio::test]
async fn table_endpoint_returns_integral_rows() {
    let (status, payload) = get("/api/tables/20").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["granularity"], "balls");
    let rows = payload["rows"].as_array().expect("rows array");
    assert_eq!(rows.len(), 21);
    assert_eq!(rows[0]["overs_remaining"], 0);
}

#[tokio::test]
async fn unknown_format_is_not_found() {
    let (status, payload) = get("/api/tables/40").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(payload["status"], "error");
    assert!(payload["message"].as_str().unwrap_or_default().contains("40"));

    let body = r#"{"format_overs":40,"team1_score":150,"team1_resources":100,"team2_resources":75}"#;
    let (status, _) = post("/api/target", body).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn target_endpoint_applies_the_formula() {
    let body = r#"{"format_overs":50,"team1_score":150,"team1_resources":100,"team2_resources":75}"#;
    let (status, payload) = post("/api/target", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["target"], 113);
    assert_eq!(payload["g50"], 245.0);

    let body = r#"{"format_overs":50,"team1_score":150,"team1_resources":80,"team2_resources":88,"g50":200}"#;
    let (_, payload) = post("/api/target", body).await;
    assert_eq!(payload["target"], 167);
}

#[tokio::test]
async fn out_of_range_resources_are_clamped() {
    let body = r#"{"format_overs":50,"team1_score":150,"team1_resources":100,"team2_resources":130}"#;
    let (status, payload) = post("/api/target", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["target"], 151);
}

#[tokio::test]
async fn malformed_body_is_a_bad_request() {
    let (status, payload) = post("/api/target", "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(payload["status"], "error");
    assert!(payload["message"]
        .as_str()
        .unwrap_or_default()
        .starts_with("Invalid request body"));

    let body = r#"{"format_overs":50,"team1_score":150,"team1_resources":100,"team2_resources":75,"g50":-1}"#;
    let (status, _) = post("/api/target", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn par_endpoint_reports_resources_and_par() {
    let body = r#"{"format_overs":50,"team1_score":250,"team1_resources":100,"max_overs":50,"balls_bowled":0,"wickets_lost":0}"#;
    let (status, payload) = post("/api/par", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["par_score"], 1);
    assert_eq!(payload["team2_resources_used"], 0.0);

    // Ten down reads the w9 column, the same as nine down.
    let ten = r#"{"format_overs":50,"team1_score":250,"team1_resources":100,"max_overs":50,"balls_bowled":180,"wickets_lost":10}"#;
    let nine = r#"{"format_overs":50,"team1_score":250,"team1_resources":100,"max_overs":50,"balls_bowled":180,"wickets_lost":9}"#;
    let (_, ten) = post("/api/par", ten).await;
    let (_, nine) = post("/api/par", nine).await;
    let remaining = ten["team2_resources_remaining"].as_f64().expect("number");
    assert!(remaining > 0.0 && remaining < 10.0, "{remaining}");
    assert_eq!(ten["team2_resources_remaining"], nine["team2_resources_remaining"]);
    assert_eq!(ten["par_score"], nine["par_score"]);
    assert!(ten["par_score"].as_u64().is_some_and(|par| par < 251));
}

#[tokio::test]
async fn par_sheet_endpoint_defaults_to_the_full_format() {
    let body = r#"{"format_overs":20,"team1_score":180,"team1_resources":100}"#;
    let (status, payload) = post("/api/par-sheet", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["innings_limit"], 20);
    let rows = payload["rows"].as_array().expect("rows array");
    assert_eq!(rows.len(), 21);
    assert_eq!(rows[20]["overs_bowled"], 20);
}

#[tokio::test]
async fn assess_endpoint_combines_both_innings() {
    let body = r#"{
        "format_overs": 20,
        "team1_score": 180,
        "team1": {"max_overs_initial": 20},
        "team2": {
            "max_overs_initial": 20,
            "deliveries": [
                {"is_wicket": false, "runs": 4},
                {"is_wicket": false, "extras_type": "wide", "runs": 1},
                {"is_wicket": true}
            ],
            "interruptions": [{"at_delivery_index": 0, "new_overs_limit": 15}]
        }
    }"#;
    let (status, payload) = post("/api/assess", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["target"], 144);
    assert_eq!(payload["team2_overs_limit"], 15);
    assert_eq!(payload["team2_wickets_lost"], 1);
    assert_eq!(payload["team2_overs_bowled"], "0.2");
    assert_eq!(payload["team2_runs"], 5);
    assert_eq!(payload["runs_needed"], 139);

    let body = r#"{"format_overs":20,"team1_score":180,"team1":{"max_overs_initial":0},"team2":{"max_overs_initial":20}}"#;
    let (status, _) = post("/api/assess", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
