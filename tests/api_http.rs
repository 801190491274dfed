//! HTTP-level tests: the router is driven in-process with `oneshot` against an
//! in-memory SQLite store.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use vcintel::api::{create_router, AppState};
use vcintel::storage::establish_connection;

async fn build_test_app() -> axum::Router {
    let db = establish_connection("sqlite::memory:", 1)
        .await
        .expect("in-memory sqlite");
    create_router(AppState::new(db))
}

async fn send(app: &axum::Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.expect("router call");
    let status = resp.status();
    let bytes = resp.into_body().collect().await.expect("body").to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, body)
}

async fn get(app: &axum::Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, req).await
}

async fn post_raw(app: &axum::Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, req).await
}

async fn post(app: &axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
    post_raw(app, uri, &body.to_string()).await
}

async fn create(app: &axum::Router, body: Value) -> Value {
    let (status, resp) = post(app, "/investors", body).await;
    assert_eq!(status, StatusCode::CREATED, "{resp}");
    resp["investor"].clone()
}

fn names(page: &Value) -> Vec<String> {
    page["investors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn health_is_ok() {
    let app = build_test_app().await;
    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn listing_is_sorted_and_paged() {
    let app = build_test_app().await;
    for name in ["Echo Fund", "Alpha Partners", "Delta Capital", "Bravo Ventures", "Charlie LP"] {
        create(&app, json!({ "name": name })).await;
    }

    let (status, page) = get(&app, "/investors?limit=2&offset=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&page), vec!["Bravo Ventures", "Charlie LP"]);
    assert_eq!(page["total"], 5);
    assert_eq!(page["limit"], 2);
    assert_eq!(page["offset"], 1);

    // 非法分页参数回落到默认值
    let (_, page) = get(&app, "/investors?limit=abc&offset=-4").await;
    assert_eq!(page["limit"], 100);
    assert_eq!(page["offset"], 0);
    assert_eq!(names(&page).len(), 5);
}

#[tokio::test]
async fn pagination_has_no_upper_bound() {
    let app = build_test_app().await;
    create(&app, json!({ "name": "Only Fund" })).await;

    let (status, page) = get(&app, "/investors?limit=0").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["investors"], json!([]));
    assert_eq!(page["total"], 1);

    for uri in [
        "/investors?limit=9223372036854775808",
        "/investors?limit=18446744073709551615",
        "/investors?limit=99999999999999999999999",
    ] {
        let (status, page) = get(&app, uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(names(&page), vec!["Only Fund"]);
        assert_eq!(page["limit"], i64::MAX);
    }

    let (status, page) = get(&app, "/investors?offset=18446744073709551615").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["investors"], json!([]));
    assert_eq!(page["total"], 1);
    assert_eq!(page["offset"], i64::MAX);
}

#[tokio::test]
async fn bad_query_and_path_values_get_json_errors() {
    let app = build_test_app().await;

    let (status, body) = get(&app, "/investors?type=a&type=b").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "{body}");

    let (status, body) = get(&app, "/scrape/jobs/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "{body}");

    let (status, body) = post(&app, "/scrape/jobs/abc/complete", json!({ "status": "done" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "{body}");
}

#[tokio::test]
async fn ai_filter_ignores_sector_text() {
    let app = build_test_app().await;
    create(
        &app,
        json!({ "name": "Flagged", "sectors": "Real Estate", "has_ai_focus": true }),
    )
    .await;
    create(
        &app,
        json!({ "name": "Mentions AI", "sectors": "AI, ML", "has_ai_focus": false }),
    )
    .await;

    let (_, page) = get(&app, "/investors?has_ai_focus=true").await;
    assert_eq!(names(&page), vec!["Flagged"]);
    assert_eq!(page["total"], 1);

    // 只有字面量 "true" 生效
    let (_, page) = get(&app, "/investors?has_ai_focus=1").await;
    assert_eq!(page["total"], 2);
}

#[tokio::test]
async fn search_is_case_insensitive() {
    let app = build_test_app().await;
    create(&app, json!({ "name": "Acme Ventures" })).await;
    create(&app, json!({ "name": "Other Capital" })).await;

    for term in ["acme", "ACME"] {
        let (_, page) = get(&app, &format!("/investors?search={term}")).await;
        assert_eq!(names(&page), vec!["Acme Ventures"]);
    }

    // 非 ASCII 大写字母的名字能按原文搜回
    let created = create(&app, json!({ "name": "ÆRØ Kapital" })).await;
    let (_, page) = get(&app, "/investors?search=%C3%86R%C3%98%20Kapital").await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["investors"][0]["id"], created["id"]);

    let (status, page) = get(&app, "/investors?search=nomatch999").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["investors"], json!([]));
    assert_eq!(page["total"], 0);
}

#[tokio::test]
async fn stats_group_by_type() {
    let app = build_test_app().await;
    for (name, t, state) in [
        ("A", "Venture Capital", "CA"),
        ("B", "Family Office", "NY"),
        ("C", "Venture Capital", "CA"),
    ] {
        create(&app, json!({ "name": name, "type": t, "state": state })).await;
    }

    let (status, stats) = get(&app, "/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_investors"], 3);
    assert_eq!(
        stats["by_type"],
        json!({ "Venture Capital": 2, "Family Office": 1 })
    );
    assert_eq!(stats["top_states"], json!({ "CA": 2, "NY": 1 }));
    assert_eq!(stats["ai_investors"], 0);
}

#[tokio::test]
async fn created_records_round_trip_unchanged() {
    let app = build_test_app().await;
    let first = create(&app, json!({ "name": "First" })).await;

    let submitted = json!({
        "name": "Bessemer Trust Company",
        "type": "Family Office",
        "cik": "0000912937",
        "city": "New York",
        "state": "NY",
        "country": "USA",
        "aum_estimate": "$150B+",
        "aum_min": 150000000000.0,
        "sectors": "Fintech, AI/ML",
        "investment_focus": "Growth equity",
        "check_size_min": 1000000.0,
        "check_size_max": 25000000.0,
        "website": "https://www.bessemertrust.com",
        "data_sources": ["sec_adv"],
        "data_quality_score": 80.0,
        "has_ai_focus": false,
        "has_fintech_focus": true,
        "has_music_focus": false,
        "last_updated": "2024-06-01T00:00:00Z"
    });
    let created = create(&app, submitted.clone()).await;
    assert_ne!(created["id"], first["id"]);

    let (_, page) = get(&app, "/investors?search=bessemer").await;
    let fetched = &page["investors"][0];
    for (key, value) in submitted.as_object().unwrap() {
        assert_eq!(&fetched[key], value, "field {key}");
    }
}

#[tokio::test]
async fn invalid_records_are_rejected_with_400() {
    let app = build_test_app().await;

    let (status, body) = post(&app, "/investors", json!({ "type": "Venture Capital" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("name"));

    let (status, _) = post(&app, "/investors", json!({ "name": "X", "state": "California" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(&app, "/investors", json!({ "name": "X", "type": "  " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, page) = get(&app, "/investors").await;
    assert_eq!(page["total"], 0);
}

#[tokio::test]
async fn malformed_body_is_a_500() {
    let app = build_test_app().await;
    let (status, body) = post_raw(&app, "/investors", "{ not json").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to create investor");
}

#[tokio::test]
async fn bulk_upsert_keys_on_cik() {
    let app = build_test_app().await;
    let (status, body) = post(
        &app,
        "/investors/bulk",
        json!({ "investors": [
            { "name": "Vanguard Group Inc", "cik": "0000102909", "state": "PA" },
            { "name": "No Cik Fund" }
        ]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["upserted"], 2);

    // 裸数组也接受
    let (status, body) = post(
        &app,
        "/investors/bulk",
        json!([{ "name": "Vanguard Group", "cik": "0000102909", "state": "PA" }]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["upserted"], 1);

    let (_, page) = get(&app, "/investors?state=PA").await;
    assert_eq!(names(&page), vec!["Vanguard Group"]);

    let (status, body) = post(
        &app,
        "/investors/bulk",
        json!([{ "name": "Fine" }, { "name": "" }]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("record 1"));
}

#[tokio::test]
async fn scrape_job_lifecycle() {
    let app = build_test_app().await;

    let (status, overview) = get(&app, "/scrape").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(overview["available_sources"].as_array().unwrap().len(), 3);
    assert_eq!(overview["last_scrape"], Value::Null);
    assert_eq!(overview["next_scheduled"], Value::Null);

    let (status, accepted) = post(&app, "/scrape", json!({ "type": "sec", "limit": 50 })).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(accepted["success"], true);
    assert_eq!(accepted["status"], "queued");
    let job_id = accepted["job_id"].as_i64().unwrap();

    let (status, job) = get(&app, &format!("/scrape/jobs/{job_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(job["source"], "sec_adv");
    assert_eq!(job["requested_limit"], 50);

    let uri = format!("/scrape/jobs/{job_id}/complete");
    let (status, job) = post(&app, &uri, json!({ "status": "done", "records_ingested": 48 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(job["status"], "done");
    assert_eq!(job["records_ingested"], 48);

    let (status, _) = post(&app, &uri, json!({ "status": "running" })).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, overview) = get(&app, "/scrape").await;
    assert_eq!(overview["last_scrape"]["id"], job_id);

    let (status, _) = get(&app, "/scrape/jobs/9999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = post(&app, "/scrape", json!({ "type": "myspace" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
