//! Sign Up Use Case
//!
//! Creates a new user account.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::entity::{auth::Auth, user::User};
use crate::domain::repository::{AuthRepository, UserRepository};
use crate::domain::value_object::{Email, RawPassword, UserPassword, UserRole, Username};
use crate::error::{AuthError, AuthResult};

pub struct SignUpInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    /// Role code; `attendee` when absent
    pub role: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

pub struct SignUpOutput {
    pub user_id: String,
}

pub struct SignUpUseCase<U, A>
where
    U: UserRepository,
    A: AuthRepository,
{
    user_repo: Arc<U>,
    auth_repo: Arc<A>,
    config: Arc<AuthConfig>,
}

impl<U, A> SignUpUseCase<U, A>
where
    U: UserRepository,
    A: AuthRepository,
{
    pub fn new(user_repo: Arc<U>, auth_repo: Arc<A>, config: Arc<AuthConfig>) -> Self {
        Self {
            user_repo,
            auth_repo,
            config,
        }
    }

    pub async fn execute(&self, input: SignUpInput) -> AuthResult<SignUpOutput> {
        let username =
            Username::new(&input.username).map_err(|e| AuthError::Validation(e.to_string()))?;
        let email = Email::new(input.email)?;

        let user_role = match input.role.as_deref().map(str::trim) {
            None | Some("") => UserRole::default(),
            Some(code) => UserRole::from_code(code)
                .ok_or_else(|| AuthError::Validation(format!("Unknown role '{code}'")))?,
        };
        if !user_role.is_self_assignable() {
            return Err(AuthError::RoleNotAllowed);
        }

        let raw_password = RawPassword::confirmed(input.password, &input.confirm_password)?;

        if self.user_repo.exists_by_username(&username).await? {
            return Err(AuthError::UsernameTaken);
        }
        if self.user_repo.exists_by_email(&email).await? {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = UserPassword::from_raw(&raw_password, self.config.pepper())?;

        let user =
            User::new(username, email, user_role).with_names(input.first_name, input.last_name);
        let auth = Auth::new(user.user_id, password_hash);

        self.user_repo.create(&user).await?;
        self.auth_repo.create(&auth).await?;

        tracing::info!(
            user_id = %user.user_id,
            username = %user.username,
            role = %user.user_role,
            "User signed up"
        );

        Ok(SignUpOutput {
            user_id: user.user_id.to_string(),
        })
    }
}
