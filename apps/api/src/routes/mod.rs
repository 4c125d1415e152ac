pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::applications::handlers as applications;
use crate::jobs::handlers as jobs;
use crate::session::handlers as session;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Session
        .route(
            "/api/v1/session",
            get(session::handle_current_session).delete(session::handle_logout),
        )
        .route("/api/v1/session/login", post(session::handle_login))
        .route("/api/v1/session/register", post(session::handle_register))
        .route("/api/v1/session/access", get(session::handle_access))
        .route("/api/v1/profile", patch(session::handle_update_profile))
        .route("/api/v1/profile/:id", patch(session::handle_update_profile_of))
        .route("/api/v1/dashboard", get(session::handle_dashboard))
        // Jobs
        .route(
            "/api/v1/jobs",
            get(jobs::handle_search_jobs).post(jobs::handle_post_job),
        )
        .route("/api/v1/jobs/:id", get(jobs::handle_get_job))
        // Applications
        .route(
            "/api/v1/jobs/:id/applications",
            get(applications::handle_job_applications).post(applications::handle_apply),
        )
        .route(
            "/api/v1/applications/mine",
            get(applications::handle_my_applications),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::applications::DuplicatePolicy;
    use crate::config::{Config, SessionBackend};
    use crate::ids::{IdGenerator, SequentialGenerator};
    use crate::jobs::seed::demo_jobs;
    use crate::marketplace::Marketplace;
    use crate::session::{LocalAuthenticator, MemoryStorage};

    async fn app() -> Router {
        let ids: Arc<dyn IdGenerator> = Arc::new(SequentialGenerator::new());
        let marketplace = Marketplace::open(
            Arc::new(MemoryStorage::new()),
            Arc::new(LocalAuthenticator::new(ids.clone())),
            ids,
            demo_jobs(),
            DuplicatePolicy::Allow,
        )
        .await;
        let config = Config {
            port: 0,
            rust_log: "info".to_string(),
            session_backend: SessionBackend::Memory,
            seed_demo_jobs: true,
            duplicate_policy: DuplicatePolicy::Allow,
            marketplace_api_url: None,
        };
        build_router(AppState::new(marketplace, config))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(b) => Body::from(b.to_string()),
                None => Body::empty(),
            })
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&app().await, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_search_with_empty_filters_lists_catalog() {
        let app = app().await;
        let (status, body) = send(&app, "GET", "/api/v1/jobs?query=&location=&type=", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 3);

        let (_, body) = send(&app, "GET", "/api/v1/jobs?type=remote", None).await;
        assert_eq!(body[0]["title"], "UX Designer");

        let (status, body) = send(&app, "GET", "/api/v1/jobs?type=internship", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_anonymous_access_redirects_to_login() {
        let app = app().await;
        let (_, body) = send(&app, "GET", "/api/v1/session/access?role=employer", None).await;
        assert_eq!(body["decision"], "redirect_login");
        assert_eq!(body["redirect_to"], "/auth/login");

        let (status, body) = send(&app, "GET", "/api/v1/dashboard", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_post_and_apply_flow() {
        let app = app().await;
        let (status, employer) = send(
            &app,
            "POST",
            "/api/v1/session/register",
            Some(json!({ "name": "Acme", "email": "hr@acme.io", "role": "employer", "company": "Acme" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(employer["role"], "employer");

        let (status, job) = send(
            &app,
            "POST",
            "/api/v1/jobs",
            Some(json!({
                "title": "Backend Engineer",
                "company": "Acme",
                "location": "Berlin",
                "type": "full-time",
                "description": "Build APIs",
                "requirements": "Rust, SQL",
                "salary": "€90,000"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(job["employerId"], employer["id"]);
        let job_id = job["id"].as_str().unwrap().to_string();

        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/session/login",
            Some(json!({ "email": "sam@person.co", "password": "pw" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, application) = send(
            &app,
            "POST",
            &format!("/api/v1/jobs/{job_id}/applications"),
            Some(json!({ "coverLetter": "Hire me" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(application["status"], "pending");

        let (status, _) = send(
            &app,
            "GET",
            &format!("/api/v1/jobs/{job_id}/applications"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(&app, "DELETE", "/api/v1/session", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, session) = send(&app, "GET", "/api/v1/session", None).await;
        assert!(session["user"].is_null());
    }

    #[tokio::test]
    async fn test_unknown_job_is_not_found() {
        let (status, body) = send(
            &app().await,
            "GET",
            "/api/v1/jobs/00000000-0000-0000-0000-00000000abcd",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "JOB_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_profile_update_without_session() {
        let (status, body) = send(
            &app().await,
            "PATCH",
            "/api/v1/profile",
            Some(json!({ "bio": "x" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "NO_ACTIVE_SESSION");
    }
}
