//! Report API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! CORS is permissive and request bodies are capped at `max_body_bytes`.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;

/// Build the report API router.
///
/// `/upload-report` serves the same JSON handler under its original route name.
/// Multipart file uploads are not accepted there.
pub fn api_router(ctx: ApiContext, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/api/health", get(endpoints::health::check))
        .route("/api/reports/parse", post(endpoints::reports::parse))
        .route("/upload-report", post(endpoints::reports::parse))
        .with_state(ctx)
        // Axum's own 2 MB default is replaced by the configured limit.
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::pipeline::rules::SectionMarkers;
    use crate::pipeline::strategy::{ReportParsers, StrategyKind};
    use crate::pipeline::structuring::{MockLlmClient, ServiceStructurer};

    const LIMIT: usize = 64 * 1024;

    const LAB_REPORT: &str = "City Diagnostics\n\
        Name: Jane Doe\n\
        Age / Gender : 34 Y / Female\n\
        Referred by: Dr. Anil Mehta\n\
        Test Name\n\
        HAEMATOLOGY\n\
        Hemoglobin 13.5 12.0-15.5\n\
        Platelet Count 250 150-400\n\
        Powered by TCPDF";

    const SERVICE_REPLY: &str = r#"{"patientDetails":{"name":"Jane Doe","age":"34","gender":"Female"},"clinicianInfo":{"name":"Anil Mehta"},"measurements":[{"category":"HAEMATOLOGY","test":"Hemoglobin","value":"13.5","referenceRange":"12.0-15.5","status":"Healthy"}]}"#;

    fn ctx_with(mock: Option<Arc<MockLlmClient>>, default_strategy: StrategyKind) -> ApiContext {
        let structurer = mock.map(|m| ServiceStructurer::new(Box::new(m), "gpt-4"));
        let parsers = ReportParsers::new(SectionMarkers::default(), structurer);
        ApiContext::new(Arc::new(parsers), default_strategy)
    }

    fn app_with(mock: Option<Arc<MockLlmClient>>) -> Router {
        api_router(ctx_with(mock, StrategyKind::Chained), LIMIT)
    }

    fn parse_request(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn response_json(response: axum::http::Response<Body>) -> serde_json::Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn health_reports_setup() {
        let app = app_with(Some(Arc::new(MockLlmClient::new(SERVICE_REPLY))));
        let req = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["strategy"], "chained");
        assert_eq!(json["service"], "mock");
        assert!(!json["version"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn health_without_service_reports_null() {
        let response = app_with(None)
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let json = response_json(response).await;
        assert!(json["service"].is_null());
    }

    #[tokio::test]
    async fn parse_rule_based_report() {
        let mock = Arc::new(MockLlmClient::new(SERVICE_REPLY));
        let app = app_with(Some(Arc::clone(&mock)));

        let req = parse_request("/api/reports/parse", serde_json::json!({ "text": LAB_REPORT }));
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["strategy"], "chained");
        let data = &json["data"];
        assert_eq!(data["patientDetails"]["name"], "Jane Doe");
        assert_eq!(data["patientDetails"]["age"], "34");
        assert_eq!(data["patientDetails"]["gender"], "Female");
        assert_eq!(data["clinicianInfo"]["name"], "Anil Mehta");
        assert_eq!(data["measurements"].as_array().unwrap().len(), 2);
        assert_eq!(data["measurements"][1]["test"], "Platelet Count");
        assert_eq!(data["measurements"][1]["referenceRange"], "150-400");
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn legacy_route_shares_handler() {
        let req = parse_request(
            "/upload-report",
            serde_json::json!({ "text": LAB_REPORT, "strategy": "rules" }),
        );
        let response = app_with(None).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["strategy"], "rule_based");
        assert_eq!(json["data"]["measurements"][0]["category"], "HAEMATOLOGY");
    }

    #[tokio::test]
    async fn service_strategy_override_uses_service() {
        let mock = Arc::new(MockLlmClient::new(SERVICE_REPLY));
        let app = app_with(Some(Arc::clone(&mock)));

        let req = parse_request(
            "/api/reports/parse",
            serde_json::json!({ "text": LAB_REPORT, "strategy": "service" }),
        );
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["data"]["measurements"][0]["status"], "Healthy");
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn freeform_reply_returns_raw_text() {
        let reply = "Hemoglobin: 13.5 (normal)";
        let app = app_with(Some(Arc::new(MockLlmClient::new(reply))));

        let req = parse_request(
            "/api/reports/parse",
            serde_json::json!({ "text": "Hemoglobin was 13.5", "strategy": "service" }),
        );
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["data"], serde_json::json!({ "rawText": reply }));
    }

    #[tokio::test]
    async fn empty_text_returns_400() {
        let req = parse_request("/api/reports/parse", serde_json::json!({ "text": "  \n " }));
        let response = app_with(None).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn malformed_json_returns_400_with_error_body() {
        let req = Request::builder()
            .method("POST")
            .uri("/api/reports/parse")
            .header("Content-Type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app_with(None).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn unknown_strategy_is_rejected() {
        let req = parse_request(
            "/api/reports/parse",
            serde_json::json!({ "text": LAB_REPORT, "strategy": "guess" }),
        );
        let response = app_with(None).oneshot(req).await.unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn service_failure_returns_502() {
        let app = app_with(Some(Arc::new(MockLlmClient::failing(503))));
        let req = parse_request(
            "/api/reports/parse",
            serde_json::json!({ "text": "no table here", "strategy": "chained" }),
        );
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(response.headers().contains_key("Retry-After"));

        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "SERVICE_UNAVAILABLE");
    }

    #[tokio::test]
    async fn service_strategy_without_service_returns_503() {
        let req = parse_request(
            "/api/reports/parse",
            serde_json::json!({ "text": LAB_REPORT, "strategy": "service" }),
        );
        let response = app_with(None).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let app = api_router(ctx_with(None, StrategyKind::RuleBased), 128);
        let text = "Hemoglobin 13.5 12.0-15.5\n".repeat(20);
        let req = parse_request("/api/reports/parse", serde_json::json!({ "text": text }));
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn cors_preflight_is_allowed() {
        let req = Request::builder()
            .method("OPTIONS")
            .uri("/api/reports/parse")
            .header("Origin", "http://localhost:3000")
            .header("Access-Control-Request-Method", "POST")
            .body(Body::empty())
            .unwrap();
        let response = app_with(None).oneshot(req).await.unwrap();
        assert!(response
            .headers()
            .contains_key("access-control-allow-origin"));
    }

    #[tokio::test]
    async fn not_found_for_unknown_route() {
        let req = Request::builder()
            .uri("/api/nonexistent")
            .body(Body::empty())
            .unwrap();
        let response = app_with(None).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
