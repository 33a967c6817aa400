//! HTTP API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.
//!
//! NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;

/// Build the API router.
pub fn api_router(ctx: ApiContext) -> Router {
    let routes = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/auth/login", post(endpoints::auth::login))
        .route("/auth/verify", post(endpoints::auth::verify))
        .route("/patients", post(endpoints::patients::create))
        .route(
            "/patients/:id",
            get(endpoints::patients::detail).put(endpoints::patients::update),
        )
        .route("/medications/search", get(endpoints::medications::search))
        .route("/medications/:id", get(endpoints::medications::detail))
        .route("/prescriptions", post(endpoints::prescriptions::create))
        .route(
            "/prescriptions/patient/:patient_id",
            get(endpoints::prescriptions::list_for_patient),
        )
        .route(
            "/prescriptions/:id",
            get(endpoints::prescriptions::detail).delete(endpoints::prescriptions::delete),
        )
        .route(
            "/prescriptions/:id/stock",
            put(endpoints::prescriptions::update_stock),
        )
        .route("/reminders/log", post(endpoints::reminders::log))
        .route(
            "/reminders/logs/patient/:patient_id",
            get(endpoints::reminders::list),
        )
        .route(
            "/reminders/adherence/:patient_id",
            get(endpoints::reminders::stats),
        )
        .route("/ocr/recognize", post(endpoints::ocr::recognize))
        .route("/ai/explain", post(endpoints::ai::explain))
        .with_state(ctx);

    Router::new()
        .nest("/api", routes)
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use std::path::PathBuf;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::db::Database;
    use crate::llm::explain::DISCLAIMER;
    use crate::llm::MockLlmClient;
    use crate::medications::seed_catalog;

    fn test_config() -> Config {
        Config {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            db_path: PathBuf::from(":memory:"),
            ollama_url: "http://localhost:11434".into(),
            ocr_model: "medgemma:4b".into(),
            explain_model: "medgemma:4b".into(),
        }
    }

    fn test_context(llm: MockLlmClient) -> ApiContext {
        let db = Database::open_in_memory().unwrap();
        seed_catalog(&db.conn().unwrap()).unwrap();
        ApiContext::new(Arc::new(db), Arc::new(llm), Arc::new(test_config()))
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn response_json(response: axum::http::Response<Body>) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 65536).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    async fn send(ctx: &ApiContext, req: Request<Body>) -> axum::http::Response<Body> {
        api_router(ctx.clone()).oneshot(req).await.unwrap()
    }

    #[tokio::test]
    async fn health_response_shape() {
        let ctx = test_context(MockLlmClient::new(""));
        let response = send(&ctx, get_request("/api/health")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["service"], "MediMinder API");
        assert!(!json["version"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn login_then_verify_issues_token() {
        let ctx = test_context(MockLlmClient::new(""));

        let response = send(
            &ctx,
            json_request(
                "POST",
                "/api/auth/login",
                serde_json::json!({"phone": "+15550001234"}),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let login = response_json(response).await;
        assert_eq!(login["success"], true);
        let otp = login["otp"].as_str().unwrap().to_string();
        assert_eq!(otp.len(), 6);

        let response = send(
            &ctx,
            json_request(
                "POST",
                "/api/auth/verify",
                serde_json::json!({"phone": "+15550001234", "otp": otp}),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let verify = response_json(response).await;
        assert_eq!(verify["success"], true);
        assert_eq!(verify["token"], verify["user"]["id"]);
        assert_eq!(verify["user"]["role"], "patient");
    }

    #[tokio::test]
    async fn wrong_otp_returns_400_with_detail() {
        let ctx = test_context(MockLlmClient::new(""));

        send(
            &ctx,
            json_request(
                "POST",
                "/api/auth/login",
                serde_json::json!({"phone": "+15550001234"}),
            ),
        )
        .await;

        let response = send(
            &ctx,
            json_request(
                "POST",
                "/api/auth/verify",
                serde_json::json!({"phone": "+15550001234", "otp": "000000x"}),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = response_json(response).await;
        assert_eq!(json["detail"], "Invalid OTP");
    }

    #[tokio::test]
    async fn patient_create_fetch_update() {
        let ctx = test_context(MockLlmClient::new(""));

        let response = send(
            &ctx,
            json_request(
                "POST",
                "/api/patients",
                serde_json::json!({
                    "user_id": uuid::Uuid::new_v4(),
                    "name": "Margaret Okafor",
                    "allergies": ["penicillin"]
                }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let created = response_json(response).await;
        assert_eq!(created["success"], true);
        let id = created["patient"]["id"].as_str().unwrap().to_string();

        let response = send(&ctx, get_request(&format!("/api/patients/{id}"))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let fetched = response_json(response).await;
        assert_eq!(fetched["patient"]["name"], "Margaret Okafor");

        let response = send(
            &ctx,
            json_request(
                "PUT",
                &format!("/api/patients/{id}"),
                serde_json::json!({"preferred_language": "fr"}),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let updated = response_json(response).await;
        assert_eq!(updated["message"], "Patient updated");
    }

    #[tokio::test]
    async fn unknown_patient_returns_404_envelope() {
        let ctx = test_context(MockLlmClient::new(""));

        let response = send(
            &ctx,
            get_request(&format!("/api/patients/{}", uuid::Uuid::new_v4())),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = response_json(response).await;
        assert!(json["detail"].as_str().unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn malformed_id_returns_400() {
        let ctx = test_context(MockLlmClient::new(""));
        let response = send(&ctx, get_request("/api/patients/not-a-uuid")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn medication_search_hits_seeded_catalog() {
        let ctx = test_context(MockLlmClient::new(""));

        let response = send(&ctx, get_request("/api/medications/search?q=paracetamol")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        let meds = json["medications"].as_array().unwrap();
        assert_eq!(meds.len(), 1);
        assert_eq!(meds[0]["name"], "Paracetamol 500mg");

        // No query returns the first page of the catalog.
        let response = send(&ctx, get_request("/api/medications/search")).await;
        let json = response_json(response).await;
        assert_eq!(json["medications"].as_array().unwrap().len(), 10);
    }

    async fn create_prescription(ctx: &ApiContext, patient_id: uuid::Uuid, stock: u32) -> String {
        let response = send(
            ctx,
            json_request(
                "POST",
                "/api/prescriptions",
                serde_json::json!({
                    "patient_id": patient_id,
                    "medication_name": "Metformin 500mg",
                    "dosage": "1 tablet",
                    "frequency": "twice",
                    "schedule": {"times": ["08:00", "20:00"], "days": []},
                    "start_date": "2025-06-01",
                    "current_stock": stock,
                    "total_per_refill": 60,
                    "with_food": true
                }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        json["prescription"]["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn prescription_lifecycle() {
        let ctx = test_context(MockLlmClient::new(""));
        let patient = uuid::Uuid::new_v4();
        let id = create_prescription(&ctx, patient, 30).await;

        let response = send(
            &ctx,
            get_request(&format!("/api/prescriptions/patient/{patient}")),
        )
        .await;
        let json = response_json(response).await;
        assert_eq!(json["prescriptions"].as_array().unwrap().len(), 1);

        let response = send(
            &ctx,
            json_request(
                "PUT",
                &format!("/api/prescriptions/{id}/stock"),
                serde_json::json!({"new_stock": 90}),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&ctx, get_request(&format!("/api/prescriptions/{id}"))).await;
        let json = response_json(response).await;
        assert_eq!(json["prescription"]["current_stock"], 90);

        let response = send(
            &ctx,
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/prescriptions/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&ctx, get_request(&format!("/api/prescriptions/{id}"))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn took_report_depletes_stock() {
        let ctx = test_context(MockLlmClient::new(""));
        let patient = uuid::Uuid::new_v4();
        let id = create_prescription(&ctx, patient, 2).await;

        let response = send(
            &ctx,
            json_request(
                "POST",
                "/api/reminders/log",
                serde_json::json!({
                    "prescription_id": id,
                    "patient_id": patient,
                    "action": "took"
                }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["log"]["action"], "took");

        let response = send(&ctx, get_request(&format!("/api/prescriptions/{id}"))).await;
        let json = response_json(response).await;
        assert_eq!(json["prescription"]["current_stock"], 1);
    }

    #[tokio::test]
    async fn invalid_action_is_rejected() {
        let ctx = test_context(MockLlmClient::new(""));
        let patient = uuid::Uuid::new_v4();
        let id = create_prescription(&ctx, patient, 2).await;

        for action in ["taken", "pending", ""] {
            let response = send(
                &ctx,
                json_request(
                    "POST",
                    "/api/reminders/log",
                    serde_json::json!({
                        "prescription_id": id,
                        "patient_id": patient,
                        "action": action
                    }),
                ),
            )
            .await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "action {action:?}");
            let json = response_json(response).await;
            assert!(json["detail"]
                .as_str()
                .unwrap()
                .contains("Invalid reminder action"));
        }

        // Nothing was appended, stock untouched.
        let response = send(
            &ctx,
            get_request(&format!("/api/reminders/logs/patient/{patient}")),
        )
        .await;
        let json = response_json(response).await;
        assert!(json["logs"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn adherence_stats_over_the_api() {
        let ctx = test_context(MockLlmClient::new(""));
        let patient = uuid::Uuid::new_v4();
        let id = create_prescription(&ctx, patient, 30).await;

        for action in ["took", "took", "took", "missed"] {
            let response = send(
                &ctx,
                json_request(
                    "POST",
                    "/api/reminders/log",
                    serde_json::json!({
                        "prescription_id": id,
                        "patient_id": patient,
                        "action": action
                    }),
                ),
            )
            .await;
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = send(
            &ctx,
            get_request(&format!("/api/reminders/adherence/{patient}")),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["stats"]["total"], 4);
        assert_eq!(json["stats"]["took"], 3);
        assert_eq!(json["stats"]["missed"], 1);
        assert_eq!(json["stats"]["adherence_rate"], 75.0);
    }

    #[tokio::test]
    async fn ocr_recognize_matches_catalog() {
        let ctx = test_context(MockLlmClient::new(
            r#"{"medicine_name": "Paracetamol", "strength": "500mg", "form": "tablet", "confidence": 0.9}"#,
        ));

        let response = send(
            &ctx,
            json_request(
                "POST",
                "/api/ocr/recognize",
                serde_json::json!({"image_base64": "aGVsbG8="}),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["extracted"]["medicine_name"], "Paracetamol");
        let candidates = json["candidates"].as_array().unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0]["name"], "Paracetamol 500mg");
        assert_eq!(candidates[0]["confidence"], 0.8);
    }

    #[tokio::test]
    async fn ocr_unreadable_label_falls_back() {
        let ctx = test_context(MockLlmClient::new("sorry, the photo is too blurry"));

        let response = send(
            &ctx,
            json_request(
                "POST",
                "/api/ocr/recognize",
                serde_json::json!({"image_base64": "aGVsbG8="}),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["extracted"]["medicine_name"], "Unknown");
        assert_eq!(json["extracted"]["confidence"], 0.0);
        assert!(json["candidates"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn explain_appends_disclaimer() {
        let ctx = test_context(MockLlmClient::new("Metformin helps control blood sugar."));

        let response = send(
            &ctx,
            json_request(
                "POST",
                "/api/ai/explain",
                serde_json::json!({
                    "medication_name": "Metformin 500mg",
                    "query_type": "summary"
                }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        let explanation = json["explanation"].as_str().unwrap();
        assert!(explanation.ends_with(DISCLAIMER));
        assert_eq!(json["medication"]["name"], "Metformin 500mg");
        assert_eq!(json["medication"]["generic_name"], "Metformin");
    }

    #[tokio::test]
    async fn explain_unknown_medicine_returns_404() {
        let ctx = test_context(MockLlmClient::new("irrelevant"));

        let response = send(
            &ctx,
            json_request(
                "POST",
                "/api/ai/explain",
                serde_json::json!({"medication_name": "Unobtainium"}),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn llm_outage_returns_502() {
        let ctx = test_context(MockLlmClient::failing());

        let response = send(
            &ctx,
            json_request(
                "POST",
                "/api/ai/explain",
                serde_json::json!({"medication_name": "Metformin 500mg"}),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let response = send(
            &ctx,
            json_request(
                "POST",
                "/api/ocr/recognize",
                serde_json::json!({"image_base64": "aGVsbG8="}),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let ctx = test_context(MockLlmClient::new(""));
        let response = send(&ctx, get_request("/api/nonexistent")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
