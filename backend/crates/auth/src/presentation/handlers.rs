//! HTTP Handlers

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use platform::rate_limit::InMemoryRateLimiter;

use crate::application::config::AuthConfig;
use crate::application::{
    CurrentUserUseCase, ForgotPasswordInput, ForgotPasswordUseCase, ResetPasswordUseCase,
    SignInInput, SignInUseCase, SignOutUseCase, SignUpInput, SignUpUseCase,
};
use crate::domain::mailer::ResetMailer;
use crate::domain::repository::AuthStore;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    DirectResetRequest, FORGOT_PASSWORD_ACCEPTED, ForgotPasswordRequest, LoginRequest,
    LoginResponse, MessageResponse, PASSWORD_RESET_DONE, RegisterRequest, RegisterResponse,
    ResetPasswordRequest, UserResponse,
};
use crate::presentation::extract::Client;
use crate::presentation::middleware::AuthMiddlewareState;

/// Shared state for auth handlers
pub struct AuthAppState<R, M> {
    pub repo: Arc<R>,
    pub mailer: Arc<M>,
    pub limiter: Arc<InMemoryRateLimiter>,
    pub config: Arc<AuthConfig>,
}

impl<R, M> Clone for AuthAppState<R, M> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            mailer: self.mailer.clone(),
            limiter: self.limiter.clone(),
            config: self.config.clone(),
        }
    }
}

impl<R, M> AuthAppState<R, M>
where
    R: AuthStore,
    M: ResetMailer + Send + Sync + 'static,
{
    pub fn new(repo: R, mailer: M, config: AuthConfig) -> Self {
        Self {
            repo: Arc::new(repo),
            mailer: Arc::new(mailer),
            limiter: Arc::new(InMemoryRateLimiter::new()),
            config: Arc::new(config),
        }
    }

    /// State for guarding other routers with the same sessions.
    pub fn middleware_state(&self) -> AuthMiddlewareState<R> {
        AuthMiddlewareState {
            repo: self.repo.clone(),
            config: self.config.clone(),
        }
    }
}

fn session_token(config: &AuthConfig, headers: &HeaderMap) -> Option<String> {
    platform::cookie::extract_cookie(headers, &config.session_cookie_name)
}

// ============================================================================
// Session
// ============================================================================

/// GET /api/auth/user
pub async fn current_user<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Client(client): Client,
    headers: HeaderMap,
) -> AuthResult<Json<UserResponse>>
where
    R: AuthStore,
    M: ResetMailer + Send + Sync + 'static,
{
    let token = session_token(&state.config, &headers).ok_or(AuthError::SessionInvalid)?;

    let use_case =
        CurrentUserUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());
    let user = use_case.execute(&token, &client.ua_hash).await?;

    Ok(Json(user.into()))
}

/// POST /api/auth/login
pub async fn login<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Client(client): Client,
    Json(req): Json<LoginRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
    M: ResetMailer + Send + Sync + 'static,
{
    let use_case = SignInUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(
            SignInInput {
                identifier: req.username,
                password: req.password,
                remember_me: req.remember_me,
            },
            client,
        )
        .await?;

    // Max-Age must match the server-side TTL
    let max_age = state.config.session_ttl(output.remember_me).as_secs() as i64;
    let cookie = state
        .config
        .cookie()
        .build_set_cookie(&output.session_token, Some(max_age));

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            id: output.user_id,
            role: output.user_role,
        }),
    ))
}

/// POST /api/auth/register
pub async fn register<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
    M: ResetMailer + Send + Sync + 'static,
{
    let use_case = SignUpUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());

    let output = use_case
        .execute(SignUpInput {
            username: req.username,
            email: req.email,
            password: req.password,
            confirm_password: req.confirm_password,
            role: req.role,
            first_name: req.first_name,
            last_name: req.last_name,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse { id: output.user_id }),
    ))
}

/// POST /api/auth/logout
pub async fn logout<R, M>(
    State(state): State<AuthAppState<R, M>>,
    headers: HeaderMap,
) -> impl IntoResponse
where
    R: AuthStore,
    M: ResetMailer + Send + Sync + 'static,
{
    if let Some(token) = session_token(&state.config, &headers) {
        let use_case = SignOutUseCase::new(state.repo.clone(), state.config.clone());
        // The cookie is cleared either way
        if let Err(e) = use_case.execute(&token).await {
            tracing::debug!(error = %e, "Logout with unusable session token");
        }
    }

    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, state.config.cookie().build_delete_cookie())],
    )
}

// ============================================================================
// Password Reset
// ============================================================================

/// POST /api/auth/forgot-password
pub async fn forgot_password<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Client(client): Client,
    Json(req): Json<ForgotPasswordRequest>,
) -> AuthResult<Json<MessageResponse>>
where
    R: AuthStore,
    M: ResetMailer + Send + Sync + 'static,
{
    let use_case = ForgotPasswordUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.mailer.clone(),
        state.limiter.clone(),
        state.config.clone(),
    );

    use_case
        .execute(ForgotPasswordInput { email: req.email }, &client.ip_key())
        .await?;

    Ok(Json(MessageResponse {
        message: FORGOT_PASSWORD_ACCEPTED,
    }))
}

/// POST /api/auth/reset-password
pub async fn reset_password<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Json(req): Json<ResetPasswordRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
    M: ResetMailer + Send + Sync + 'static,
{
    reset_use_case(&state)
        .with_token(&req.token, req.password, &req.confirm_password)
        .await?;

    Ok(reset_done(&state.config))
}

/// POST /api/auth/reset-password-direct
pub async fn reset_password_direct<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Json(req): Json<DirectResetRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
    M: ResetMailer + Send + Sync + 'static,
{
    reset_use_case(&state)
        .direct(&req.email, req.password, &req.confirm_password)
        .await?;

    Ok(reset_done(&state.config))
}

fn reset_use_case<R, M>(state: &AuthAppState<R, M>) -> ResetPasswordUseCase<R, R, R>
where
    R: AuthStore,
{
    ResetPasswordUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.config.clone(),
    )
}

/// Every session was revoked, so the caller's cookie goes too.
fn reset_done(config: &AuthConfig) -> impl IntoResponse + use<> {
    (
        StatusCode::OK,
        [(header::SET_COOKIE, config.cookie().build_delete_cookie())],
        Json(MessageResponse {
            message: PASSWORD_RESET_DONE,
        }),
    )
}
