//! Router tests against in-memory and failing stores

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use rectrack_server::db::{DbError, MemoryStore, SectionRow, TrackerStore};
use rectrack_server::models::{Dataset, Recommendation, StatusCounts};
use rectrack_server::{build_router, CorsPolicy};

fn router_for(json: &str) -> Router {
    let dataset = Dataset::from_json(json).expect("fixture should be valid");
    build_router(Arc::new(MemoryStore::new(dataset)), &CorsPolicy::Permissive)
}

fn housing_router() -> Router {
    router_for(
        r#"{
            "sections": [{"id": 1, "name": "Housing"}],
            "recommendations": [
                {"id": 1, "section_id": 1, "number": 2, "status": "done", "text": "A"},
                {"id": 2, "section_id": 1, "number": 1, "status": "ongoing", "text": "B"}
            ]
        }"#,
    )
}

fn mixed_router() -> Router {
    router_for(
        r#"{
            "sections": [
                {"id": 3, "name": "Santé"},
                {"id": 1, "name": "Logement"},
                {"id": 2, "name": "Sans recommandations"}
            ],
            "recommendations": [
                {"id": 10, "section_id": 3, "number": 4, "status": "unsure", "text": "x"},
                {"id": 11, "section_id": 1, "number": 9, "status": "notStarted", "text": "y"},
                {"id": 12, "section_id": 3, "number": 1, "status": "done", "text": "z"},
                {"id": 13, "section_id": 1, "number": 9, "status": "done", "text": "w", "link": "https://example.org/w"},
                {"id": 14, "section_id": 3, "number": 4, "ongoing": true, "text": "v"}
            ]
        }"#,
    )
}

async fn get(router: Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

async fn get_raw(router: Router, uri: &str) -> Vec<u8> {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

#[tokio::test]
async fn sections_example() {
    let (status, body) = get(housing_router(), "/sections").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "success": true,
            "sections": [{
                "name": "Housing",
                "recommendations": [
                    {"number": 1, "text": "B", "status": "ongoing"},
                    {"number": 2, "text": "A", "status": "done"}
                ]
            }]
        })
    );
}

#[tokio::test]
async fn recommendations_done_example() {
    let (status, body) = get(housing_router(), "/recommendations/done").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "success": true,
            "recommendations": [{
                "id": 1,
                "section_id": 1,
                "text": "A",
                "number": 2,
                "status": "done",
                "link": null
            }]
        })
    );
}

#[tokio::test]
async fn stats_example() {
    let (status, body) = get(housing_router(), "/stats").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "success": true,
            "stats": {"done": 1, "ongoing": 1, "unsure": 0, "notStarted": 0}
        })
    );
}

#[tokio::test]
async fn sections_without_recommendations_are_omitted() {
    let (_, body) = get(mixed_router(), "/sections").await;

    let names: Vec<_> = body["sections"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(names, vec!["Logement", "Santé"]);
}

#[tokio::test]
async fn section_recommendations_sorted_by_number() {
    let (_, body) = get(mixed_router(), "/sections").await;

    for section in body["sections"].as_array().unwrap() {
        let numbers: Vec<i64> = section["recommendations"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["number"].as_i64().unwrap())
            .collect();
        assert!(numbers.windows(2).all(|w| w[0] <= w[1]), "{:?}", numbers);
    }

    // equal numbers keep id order
    let sante = &body["sections"][1]["recommendations"];
    assert_eq!(sante[1]["text"], "x");
    assert_eq!(sante[2]["text"], "v");
}

#[tokio::test]
async fn each_status_filter_returns_exactly_its_rows() {
    let expected: [(&str, Vec<i64>); 4] = [
        ("done", vec![12, 13]),
        ("ongoing", vec![14]),
        ("unsure", vec![10]),
        ("notStarted", vec![11]),
    ];

    for (status, ids) in expected {
        let (code, body) = get(mixed_router(), &format!("/recommendations/{}", status)).await;
        assert_eq!(code, StatusCode::OK);

        let recs = body["recommendations"].as_array().unwrap();
        let got: Vec<i64> = recs.iter().map(|r| r["id"].as_i64().unwrap()).collect();
        assert_eq!(got, ids, "status {}", status);
        assert!(recs.iter().all(|r| r["status"] == status));
    }
}

#[tokio::test]
async fn unknown_status_is_empty_success() {
    for token in ["finished", "Done", "not_started", "%20"] {
        let (code, body) = get(mixed_router(), &format!("/recommendations/{}", token)).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(body, json!({"success": true, "recommendations": []}));
    }
}

#[tokio::test]
async fn undecodable_status_segment_is_400_envelope() {
    let (code, body) = get(mixed_router(), "/recommendations/%FF").await;
    assert_eq!(code, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"success": false, "error": "invalid path parameter"})
    );
}

#[tokio::test]
async fn link_is_included_when_present() {
    let (_, body) = get(mixed_router(), "/recommendations/done").await;
    assert_eq!(body["recommendations"][1]["link"], "https://example.org/w");
}

#[tokio::test]
async fn stats_partition_the_rows() {
    let (_, body) = get(mixed_router(), "/stats").await;
    let stats = &body["stats"];
    let sum: i64 = ["done", "ongoing", "unsure", "notStarted"]
        .iter()
        .map(|k| stats[*k].as_i64().unwrap())
        .sum();
    assert_eq!(sum, 5);
}

#[tokio::test]
async fn empty_store_gives_zero_stats_and_no_sections() {
    let router = router_for("{}");

    let (_, stats) = get(router.clone(), "/stats").await;
    assert_eq!(
        stats["stats"],
        json!({"done": 0, "ongoing": 0, "unsure": 0, "notStarted": 0})
    );

    let (_, sections) = get(router, "/sections").await;
    assert_eq!(sections, json!({"success": true, "sections": []}));
}

#[tokio::test]
async fn repeated_calls_are_identical() {
    let router = mixed_router();
    for uri in ["/sections", "/recommendations/done", "/stats"] {
        let first = get_raw(router.clone(), uri).await;
        let second = get_raw(router.clone(), uri).await;
        assert_eq!(first, second, "{}", uri);
    }
}

#[tokio::test]
async fn non_ascii_text_is_not_escaped() {
    let body = get_raw(mixed_router(), "/sections").await;
    let text = String::from_utf8(body).unwrap();
    assert!(text.contains("Santé"));
}

#[tokio::test]
async fn unknown_route_is_404_envelope() {
    let (status, body) = get(mixed_router(), "/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"success": false, "error": "not found"}));
}

#[tokio::test]
async fn health_reports_ok() {
    let (status, body) = get(mixed_router(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
}

#[tokio::test]
async fn cors_header_on_permissive_policy() {
    let response = mixed_router()
        .oneshot(
            Request::builder()
                .uri("/stats")
                .header("origin", "http://somewhere.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
}

#[tokio::test]
async fn wildcard_cors_origin_allows_any_origin() {
    let dataset = Dataset::from_json("{}").unwrap();
    let policy = CorsPolicy::from_origins(&["*"]).unwrap();
    let router = build_router(Arc::new(MemoryStore::new(dataset)), &policy);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/stats")
                .header("origin", "http://elsewhere.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
}

/// Store whose every query fails, as if the database were down
struct FailingStore;

#[async_trait]
impl TrackerStore for FailingStore {
    async fn section_rows(&self) -> Result<Vec<SectionRow>, DbError> {
        Err(DbError::Sqlx(sqlx::Error::PoolTimedOut))
    }

    async fn recommendations_with_status(&self, _: &str) -> Result<Vec<Recommendation>, DbError> {
        Err(DbError::Sqlx(sqlx::Error::PoolTimedOut))
    }

    async fn status_counts(&self) -> Result<StatusCounts, DbError> {
        Err(DbError::Sqlx(sqlx::Error::PoolTimedOut))
    }

    async fn recommendation_count(&self) -> Result<i64, DbError> {
        Err(DbError::Sqlx(sqlx::Error::PoolTimedOut))
    }

    async fn ping(&self) -> Result<(), DbError> {
        Err(DbError::Sqlx(sqlx::Error::PoolTimedOut))
    }
}

#[tokio::test]
async fn storage_failure_is_500_envelope() {
    let router = build_router(Arc::new(FailingStore), &CorsPolicy::Permissive);

    for uri in ["/sections", "/recommendations/done", "/stats"] {
        let (status, body) = get(router.clone(), uri).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{}", uri);
        assert_eq!(
            body,
            json!({"success": false, "error": "an internal error occurred"})
        );
    }
}

#[tokio::test]
async fn health_degraded_when_store_down() {
    let router = build_router(Arc::new(FailingStore), &CorsPolicy::Permissive);
    let (status, body) = get(router, "/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["database"], "unavailable");
}
