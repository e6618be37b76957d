//! HTTP access to the auth API
//!
//! [`ApiClient`] is the single request primitive: it keeps the session
//! cookie in a cookie store and turns every non-2xx response into
//! [`ClientError::Http`]. [`AuthApi`] is the seam the flows depend on;
//! [`HttpAuthApi`] implements it over `ApiClient`.

use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde_json::Value;

use crate::config::PortalConfig;
use crate::error::ClientError;
use crate::models::{
    DirectResetRequest, ForgotPasswordRequest, LoginRequest, RegisterRequest, TokenResetRequest,
    User,
};

pub const USER_PATH: &str = "/api/auth/user";
pub const LOGIN_PATH: &str = "/api/auth/login";
pub const REGISTER_PATH: &str = "/api/auth/register";
pub const LOGOUT_PATH: &str = "/api/auth/logout";
pub const FORGOT_PASSWORD_PATH: &str = "/api/auth/forgot-password";
pub const RESET_PASSWORD_PATH: &str = "/api/auth/reset-password";
pub const RESET_PASSWORD_DIRECT_PATH: &str = "/api/auth/reset-password-direct";

/// What a query does with a 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnauthorizedBehavior {
    /// Treat as "no data" (`Value::Null`)
    ReturnNull,
    #[default]
    Error,
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    config: PortalConfig,
}

impl ApiClient {
    pub fn new(config: PortalConfig) -> Result<Self, ClientError> {
        let http = Client::builder()
            .cookie_store(true)
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    /// Send a request; non-2xx becomes `ClientError::Http`.
    pub async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<reqwest::Response, ClientError> {
        let mut builder = self.http.request(method.clone(), self.config.url(path));
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::debug!(error = %e, %method, path, "Request failed");
            ClientError::from(e)
        })?;

        ensure_success(response).await
    }

    /// GET a JSON resource for the query cache.
    pub async fn get_query(
        &self,
        path: &str,
        on_unauthorized: UnauthorizedBehavior,
    ) -> Result<Value, ClientError> {
        let response = self
            .http
            .get(self.config.url(path))
            .send()
            .await
            .map_err(ClientError::from)?;

        if response.status() == StatusCode::UNAUTHORIZED
            && on_unauthorized == UnauthorizedBehavior::ReturnNull
        {
            return Ok(Value::Null);
        }

        let response = ensure_success(response).await?;
        response
            .json::<Value>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let body = if text.is_empty() {
        status.canonical_reason().unwrap_or_default().to_string()
    } else {
        text
    };

    Err(ClientError::Http {
        status: status.as_u16(),
        body,
    })
}

#[trait_variant::make(AuthApi: Send)]
pub trait LocalAuthApi {
    /// `Ok(None)` when the server answers 401.
    async fn current_user(&self) -> Result<Option<User>, ClientError>;

    async fn login(&self, req: &LoginRequest) -> Result<(), ClientError>;

    async fn register(&self, req: &RegisterRequest) -> Result<(), ClientError>;

    async fn logout(&self) -> Result<(), ClientError>;

    async fn forgot_password(&self, req: &ForgotPasswordRequest) -> Result<(), ClientError>;

    async fn reset_password(&self, req: &TokenResetRequest) -> Result<(), ClientError>;

    async fn reset_password_direct(&self, req: &DirectResetRequest) -> Result<(), ClientError>;
}

#[derive(Clone)]
pub struct HttpAuthApi {
    client: ApiClient,
}

impl HttpAuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    async fn post<B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<(), ClientError> {
        self.client.request(Method::POST, path, body).await?;
        Ok(())
    }
}

impl AuthApi for HttpAuthApi {
    async fn current_user(&self) -> Result<Option<User>, ClientError> {
        let value = self
            .client
            .get_query(USER_PATH, UnauthorizedBehavior::ReturnNull)
            .await?;

        if value.is_null() {
            return Ok(None);
        }

        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn login(&self, req: &LoginRequest) -> Result<(), ClientError> {
        self.post(LOGIN_PATH, Some(req)).await
    }

    async fn register(&self, req: &RegisterRequest) -> Result<(), ClientError> {
        self.post(REGISTER_PATH, Some(req)).await
    }

    async fn logout(&self) -> Result<(), ClientError> {
        self.post::<Value>(LOGOUT_PATH, None).await
    }

    async fn forgot_password(&self, req: &ForgotPasswordRequest) -> Result<(), ClientError> {
        self.post(FORGOT_PASSWORD_PATH, Some(req)).await
    }

    async fn reset_password(&self, req: &TokenResetRequest) -> Result<(), ClientError> {
        self.post(RESET_PASSWORD_PATH, Some(req)).await
    }

    async fn reset_password_direct(&self, req: &DirectResetRequest) -> Result<(), ClientError> {
        self.post(RESET_PASSWORD_DIRECT_PATH, Some(req)).await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use parking_lot::Mutex;
    use tokio::sync::Notify;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        CurrentUser,
        Login { username: String, password: String },
        Register { username: String, email: String },
        Logout,
        ForgotPassword { email: String },
        ResetPassword {
            token: String,
            password: String,
            confirm_password: String,
        },
        ResetPasswordDirect {
            email: String,
            password: String,
            confirm_password: String,
        },
    }

    /// Scripted [`AuthApi`] that records every call.
    #[derive(Default)]
    pub struct FakeAuthApi {
        calls: Mutex<Vec<Call>>,
        /// What `current_user` returns
        user: Mutex<Option<User>>,
        /// Becomes the current user after a successful login
        login_user: Mutex<Option<User>>,
        /// Error returned by the next mutating call
        fail_next: Mutex<Option<ClientError>>,
        /// When set, mutating calls wait for a notification before answering
        gate: Option<Arc<Notify>>,
    }

    impl FakeAuthApi {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn gated(gate: Arc<Notify>) -> Self {
            Self {
                gate: Some(gate),
                ..Self::default()
            }
        }

        pub fn with_user(self, user: Option<User>) -> Self {
            *self.user.lock() = user;
            self
        }

        pub fn with_login_user(self, user: User) -> Self {
            *self.login_user.lock() = Some(user);
            self
        }

        pub fn fail_next(&self, err: ClientError) {
            *self.fail_next.lock() = Some(err);
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().clone()
        }

        pub fn mutating_calls(&self) -> usize {
            self.calls
                .lock()
                .iter()
                .filter(|c| **c != Call::CurrentUser)
                .count()
        }

        async fn respond(&self, call: Call) -> Result<(), ClientError> {
            self.calls.lock().push(call);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            match self.fail_next.lock().take() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }
    }

    impl AuthApi for FakeAuthApi {
        async fn current_user(&self) -> Result<Option<User>, ClientError> {
            self.calls.lock().push(Call::CurrentUser);
            Ok(self.user.lock().clone())
        }

        async fn login(&self, req: &LoginRequest) -> Result<(), ClientError> {
            self.respond(Call::Login {
                username: req.username.clone(),
                password: req.password.clone(),
            })
            .await?;
            let next = self.login_user.lock().clone();
            *self.user.lock() = next;
            Ok(())
        }

        async fn register(&self, req: &RegisterRequest) -> Result<(), ClientError> {
            self.respond(Call::Register {
                username: req.username.clone(),
                email: req.email.clone(),
            })
            .await
        }

        async fn logout(&self) -> Result<(), ClientError> {
            self.respond(Call::Logout).await?;
            *self.user.lock() = None;
            Ok(())
        }

        async fn forgot_password(&self, req: &ForgotPasswordRequest) -> Result<(), ClientError> {
            self.respond(Call::ForgotPassword {
                email: req.email.clone(),
            })
            .await
        }

        async fn reset_password(&self, req: &TokenResetRequest) -> Result<(), ClientError> {
            self.respond(Call::ResetPassword {
                token: req.token.clone(),
                password: req.password.clone(),
                confirm_password: req.confirm_password.clone(),
            })
            .await
        }

        async fn reset_password_direct(&self, req: &DirectResetRequest) -> Result<(), ClientError> {
            self.respond(Call::ResetPasswordDirect {
                email: req.email.clone(),
                password: req.password.clone(),
                confirm_password: req.confirm_password.clone(),
            })
            .await
        }
    }

    pub fn user(role: crate::models::Role) -> User {
        User {
            id: "2f6e".into(),
            username: "nour".into(),
            email: "nour@example.com".into(),
            role,
            first_name: None,
            last_name: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::{
        ApiClient, AuthApi, FORGOT_PASSWORD_PATH, HttpAuthApi, LOGIN_PATH, LOGOUT_PATH, USER_PATH,
    };
    use crate::config::PortalConfig;
    use crate::error::ClientError;
    use crate::models::{ForgotPasswordRequest, LoginRequest, Role};

    async fn api(server: &MockServer) -> HttpAuthApi {
        HttpAuthApi::new(ApiClient::new(PortalConfig::new(server.uri())).unwrap())
    }

    #[tokio::test]
    async fn test_current_user_401_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(USER_PATH))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
            .expect(1)
            .mount(&server)
            .await;

        assert_eq!(api(&server).await.current_user().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_current_user_decodes_user() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(USER_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "a1",
                "username": "admin",
                "email": "admin@example.com",
                "role": "admin",
                "firstName": null,
                "lastName": null
            })))
            .mount(&server)
            .await;

        let user = api(&server).await.current_user().await.unwrap().unwrap();
        assert_eq!(user.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_current_user_server_error_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(USER_PATH))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = api(&server).await.current_user().await.unwrap_err();
        assert_eq!(
            err,
            ClientError::Http {
                status: 500,
                body: "Internal Server Error".into()
            }
        );
    }

    #[tokio::test]
    async fn test_non_2xx_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(FORGOT_PASSWORD_PATH))
            .and(body_json(json!({"email": "ghost@example.com"})))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
            .mount(&server)
            .await;

        let err = api(&server)
            .await
            .forgot_password(&ForgotPasswordRequest {
                email: "ghost@example.com".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "400: bad request");
    }

    #[tokio::test]
    async fn test_session_cookie_is_replayed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(LOGIN_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", "session=abc.def; Path=/; HttpOnly")
                    .set_body_json(json!({"id": "a1", "role": "organizer"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(LOGOUT_PATH))
            .and(header("cookie", "session=abc.def"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let api = api(&server).await;
        api.login(&LoginRequest {
            username: "org".into(),
            password: "Eventful2024".into(),
            remember_me: false,
        })
        .await
        .unwrap();
        api.logout().await.unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        let api =
            HttpAuthApi::new(ApiClient::new(PortalConfig::new("http://127.0.0.1:1")).unwrap());
        let err = api.logout().await.unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
    }
}
