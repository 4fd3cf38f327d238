pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::accounts::handlers as accounts;
use crate::cv::handlers as cv;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/accounts", post(accounts::handle_register))
        .route("/api/v1/templates", get(cv::handle_list_templates))
        // CV API
        .route(
            "/api/v1/resumes",
            get(cv::handle_list_resumes).post(cv::handle_create_resume),
        )
        .route(
            "/api/v1/resumes/:id",
            get(cv::handle_get_resume)
                .put(cv::handle_edit_resume)
                .delete(cv::handle_delete_resume),
        )
        .route(
            "/api/v1/resumes/:id/duplicate",
            post(cv::handle_duplicate_resume),
        )
        .route("/api/v1/resumes/:id/export", get(cv::handle_export_resume))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, HeaderMap, Method, Request, StatusCode},
    };
    use bytes::Bytes;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::config::{Config, StoreBackend};
    use crate::cv::templates::seed_default_templates;
    use crate::export::PdfExporter;
    use crate::store::MemoryStore;

    async fn test_app() -> Router {
        let store = MemoryStore::new();
        seed_default_templates(&store).await.unwrap();
        build_router(AppState {
            store: Arc::new(store),
            exporter: Arc::new(PdfExporter),
            config: Config {
                store_backend: StoreBackend::Memory,
                database_url: None,
                database_max_connections: 1,
                port: 0,
                rust_log: "info".to_string(),
            },
        })
    }

    struct TestResponse {
        status: StatusCode,
        headers: HeaderMap,
        body: Bytes,
    }

    impl TestResponse {
        fn json(&self) -> Value {
            serde_json::from_slice(&self.body).unwrap()
        }
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        owner: Option<Uuid>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(owner) = owner {
            builder = builder.header("X-User-Id", owner.to_string());
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    async fn register(app: &Router, username: &str) -> Uuid {
        let response = send(
            app,
            Method::POST,
            "/api/v1/accounts",
            None,
            Some(json!({
                "username": username,
                "email": format!("{username}@example.com"),
                "display_name": "Ada Lovelace"
            })),
        )
        .await;
        assert_eq!(response.status, StatusCode::CREATED);
        response.json()["id"].as_str().unwrap().parse().unwrap()
    }

    async fn create_cv(app: &Router, owner: Uuid) -> Uuid {
        let response = send(app, Method::POST, "/api/v1/resumes", Some(owner), None).await;
        assert_eq!(response.status, StatusCode::CREATED);
        response.json()["id"].as_str().unwrap().parse().unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app().await;
        let response = send(&app, Method::GET, "/health", None, None).await;
        assert_eq!(response.status, StatusCode::OK);
        let body = response.json();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["store"], "memory");
    }

    #[tokio::test]
    async fn test_templates_listed() {
        let app = test_app().await;
        let response = send(&app, Method::GET, "/api/v1/templates", None, None).await;
        assert_eq!(response.status, StatusCode::OK);
        let templates = response.json();
        assert_eq!(templates.as_array().unwrap().len(), 4);
        assert_eq!(templates[0]["name"], "Modern Professional");
    }

    #[tokio::test]
    async fn test_duplicate_username_is_409() {
        let app = test_app().await;
        register(&app, "ada").await;
        let response = send(
            &app,
            Method::POST,
            "/api/v1/accounts",
            None,
            Some(json!({"username": "ada", "email": "other@example.com"})),
        )
        .await;
        assert_eq!(response.status, StatusCode::CONFLICT);
        assert_eq!(response.json()["error"]["message"], "Username already exists");
    }

    #[tokio::test]
    async fn test_missing_owner_is_401() {
        let app = test_app().await;
        let response = send(&app, Method::GET, "/api/v1/resumes", None, None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_edit_preview_export_delete() {
        let app = test_app().await;
        let owner = register(&app, "ada").await;

        let created = send(&app, Method::POST, "/api/v1/resumes", Some(owner), None).await;
        assert_eq!(created.status, StatusCode::CREATED);
        let created = created.json();
        assert_eq!(created["title"], "My CV 1");
        let id = created["id"].as_str().unwrap().to_string();
        assert_eq!(created["redirect_to"], format!("/api/v1/resumes/{id}"));
        let cv_uri = format!("/api/v1/resumes/{id}");

        let edit = send(
            &app,
            Method::PUT,
            &cv_uri,
            Some(owner),
            Some(json!({
                "title": "Senior Engineer",
                "email": "ada@example.com",
                "professional_summary": "Programs analytical engines.",
                "template_id": "2",
                "experience_job_title": ["Engineer", "Intern"],
                "experience_company": ["Acme", "Initech"],
                "experience_start_date": ["2020", "2018"],
                "skill_name": "Rust",
                "skill_category": "technical"
            })),
        )
        .await;
        assert_eq!(edit.status, StatusCode::OK);
        let edit = edit.json();
        assert_eq!(edit["sections"]["experience"]["created"], 2);
        assert_eq!(edit["sections"]["skill"]["created"], 1);

        let preview = send(&app, Method::GET, &cv_uri, Some(owner), None).await;
        assert_eq!(preview.status, StatusCode::OK);
        let preview = preview.json();
        assert_eq!(preview["resume"]["title"], "Senior Engineer");
        assert_eq!(preview["template"]["name"], "Classic Executive");
        let experience = preview["sections"]["experience"].as_array().unwrap();
        assert_eq!(experience.len(), 2);
        assert_eq!(experience[0]["fields"]["company"], "Acme");

        let export = send(
            &app,
            Method::GET,
            &format!("{cv_uri}/export"),
            Some(owner),
            None,
        )
        .await;
        assert_eq!(export.status, StatusCode::OK);
        assert_eq!(export.headers[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            export.headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Senior_Engineer.pdf\""
        );
        assert!(export.body.starts_with(b"%PDF"));

        let deleted = send(&app, Method::DELETE, &cv_uri, Some(owner), None).await;
        assert_eq!(deleted.status, StatusCode::NO_CONTENT);

        let gone = send(&app, Method::GET, &cv_uri, Some(owner), None).await;
        assert_eq!(gone.status, StatusCode::NOT_FOUND);
        assert_eq!(gone.json()["redirect_to"], "/api/v1/resumes");
    }

    #[tokio::test]
    async fn test_duplicate_and_list() {
        let app = test_app().await;
        let owner = register(&app, "ada").await;
        let id = create_cv(&app, owner).await;

        let copy = send(
            &app,
            Method::POST,
            &format!("/api/v1/resumes/{id}/duplicate"),
            Some(owner),
            None,
        )
        .await;
        assert_eq!(copy.status, StatusCode::CREATED);
        assert_eq!(copy.json()["title"], "My CV 1 (Copy 1)");

        let list = send(&app, Method::GET, "/api/v1/resumes", Some(owner), None).await;
        assert_eq!(list.status, StatusCode::OK);
        let titles: Vec<String> = list
            .json()
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["title"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(titles, vec!["My CV 1 (Copy 1)", "My CV 1"]);
    }

    #[tokio::test]
    async fn test_other_owners_cv_is_not_found() {
        let app = test_app().await;
        let ada = register(&app, "ada").await;
        let eve = register(&app, "eve").await;
        let id = create_cv(&app, ada).await;
        let cv_uri = format!("/api/v1/resumes/{id}");

        for method in [Method::GET, Method::DELETE] {
            let response = send(&app, method, &cv_uri, Some(eve), None).await;
            assert_eq!(response.status, StatusCode::NOT_FOUND);
        }
        let edit = send(
            &app,
            Method::PUT,
            &cv_uri,
            Some(eve),
            Some(json!({"title": "Hijacked"})),
        )
        .await;
        assert_eq!(edit.status, StatusCode::NOT_FOUND);

        let still_there = send(&app, Method::GET, &cv_uri, Some(ada), None).await;
        assert_eq!(still_there.json()["resume"]["title"], "My CV 1");
    }

    #[tokio::test]
    async fn test_ragged_submission_is_400() {
        let app = test_app().await;
        let owner = register(&app, "ada").await;
        let id = create_cv(&app, owner).await;

        let response = send(
            &app,
            Method::PUT,
            &format!("/api/v1/resumes/{id}"),
            Some(owner),
            Some(json!({
                "experience_job_title": ["Engineer", "Intern"],
                "experience_company": ["Acme"]
            })),
        )
        .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.json()["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_numeric_template_id_is_accepted() {
        let app = test_app().await;
        let owner = register(&app, "ada").await;
        let id = create_cv(&app, owner).await;
        let cv_uri = format!("/api/v1/resumes/{id}");

        let edit = send(
            &app,
            Method::PUT,
            &cv_uri,
            Some(owner),
            Some(json!({"title": "x", "template_id": 2, "phone": null})),
        )
        .await;
        assert_eq!(edit.status, StatusCode::OK);
        assert_eq!(edit.json()["resume"]["template_id"], 2);

        let preview = send(&app, Method::GET, &cv_uri, Some(owner), None).await;
        assert_eq!(preview.json()["template"]["name"], "Classic Executive");
    }

    #[tokio::test]
    async fn test_malformed_body_uses_error_envelope() {
        let app = test_app().await;
        let owner = register(&app, "ada").await;
        let id = create_cv(&app, owner).await;

        let response = send(
            &app,
            Method::PUT,
            &format!("/api/v1/resumes/{id}"),
            Some(owner),
            Some(json!({"title": {"text": "nested"}})),
        )
        .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.json()["error"]["code"], "VALIDATION_ERROR");
    }
}
