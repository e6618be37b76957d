//! Router assembly

use assistant::{Assistant, LlmClient, assistant_router};
use auth::domain::{AuthStore, ResetMailer};
use auth::{AuthAppState, auth_router, require_auth_session};
use axum::http::{self, Method, header};
use axum::{Router, middleware};
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;

/// `/api/auth` is public; `/api/ai` requires a session.
pub fn build_router<R, M, C>(
    auth_state: AuthAppState<R, M>,
    assistant: Assistant<C>,
    frontend_origins: &[String],
) -> Router
where
    R: AuthStore,
    M: ResetMailer + Send + Sync + 'static,
    C: LlmClient + Send + Sync + 'static,
{
    let guard = middleware::from_fn_with_state(
        auth_state.middleware_state(),
        require_auth_session::<R>,
    );

    Router::new()
        .nest("/api/auth", auth_router(auth_state))
        .nest("/api/ai", assistant_router(assistant).layer(guard))
        .layer(TraceLayer::new_for_http())
        .layer(cors(frontend_origins))
}

fn cors(frontend_origins: &[String]) -> CorsLayer {
    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::ACCEPT_LANGUAGE,
        ]))
        .allow_credentials(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assistant::{AssistantConfig, AssistantResult, ChatMessage};
    use auth::{AuthConfig, InMemoryAuthRepository, Mailer};
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    const UA: &str = "Mozilla/5.0 (test)";

    struct EchoClient;

    impl LlmClient for EchoClient {
        async fn complete(&self, messages: &[ChatMessage]) -> AssistantResult<String> {
            Ok(format!("{} messages", messages.len()))
        }
    }

    fn app() -> Router {
        let state = AuthAppState::new(
            InMemoryAuthRepository::new(),
            Mailer::from_config(None).unwrap(),
            AuthConfig::development(),
        );
        let assistant = Assistant::new(EchoClient, AssistantConfig::default());
        build_router(state, assistant, &["http://localhost:5173".to_string()])
    }

    fn post(uri: &str, body: Value, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::USER_AGENT, UA);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn sign_in(app: &Router) -> String {
        let res = app
            .clone()
            .oneshot(post(
                "/api/auth/register",
                json!({
                    "username": "organizer1",
                    "email": "organizer1@example.com",
                    "password": "Eventful2024",
                    "confirmPassword": "Eventful2024",
                    "role": "organizer"
                }),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);

        let res = app
            .clone()
            .oneshot(post(
                "/api/auth/login",
                json!({"username": "organizer1", "password": "Eventful2024"}),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let set_cookie = res.headers()[header::SET_COOKIE].to_str().unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_assistant_requires_session() {
        let res = app()
            .oneshot(post("/api/ai/chat", json!({"message": "hello"}), None))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(res.headers()["x-auth-required"], "true");
    }

    #[tokio::test]
    async fn test_assistant_with_session() {
        let app = app();
        let cookie = sign_in(&app).await;

        let res = app
            .oneshot(post("/api/ai/chat", json!({"message": "hello"}), Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["reply"], "2 messages");
    }

    #[tokio::test]
    async fn test_cors_preflight_for_frontend() {
        let res = app()
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/auth/login")
                    .header(header::ORIGIN, "http://localhost:5173")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            res.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:5173"
        );
        assert_eq!(res.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    }
}
