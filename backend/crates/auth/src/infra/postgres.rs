//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::id::{PasswordResetId, SessionId, UserId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{
    auth::Auth, auth_session::AuthSession, password_reset::PasswordReset, user::User,
};
use crate::domain::repository::{
    AuthRepository, AuthSessionRepository, PasswordResetRepository, UserRepository,
};
use crate::domain::value_object::{Email, UserPassword, UserRole, UserStatus, Username};
use crate::error::{AuthError, AuthResult};

const USER_COLUMNS: &str = r#"
    user_id,
    username,
    email,
    user_role,
    user_status,
    first_name,
    last_name,
    last_login_at,
    created_at,
    updated_at
"#;

const SESSION_COLUMNS: &str = r#"
    session_id,
    user_id,
    user_role,
    expires_at_ms,
    remember_me,
    client_fingerprint_hash,
    client_ip,
    user_agent,
    created_at,
    last_activity_at
"#;

const RESET_COLUMNS: &str = r#"
    reset_id,
    user_id,
    email,
    token_hash,
    expires_at_ms,
    consumed_at_ms,
    created_at
"#;

#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_user_where(&self, clause: &str, value: &str) -> AuthResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {clause} = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        row.map(UserRow::into_user).transpose()
    }
}

/// Translate unique violations on `users` into domain conflicts.
fn map_user_conflict(err: sqlx::Error) -> AuthError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            match db_err.constraint() {
                Some("users_username_canonical_key") => return AuthError::UsernameTaken,
                Some("users_email_key") => return AuthError::EmailTaken,
                _ => {}
            }
        }
    }
    AuthError::Database(err)
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAuthRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                user_id,
                username,
                username_canonical,
                email,
                user_role,
                user_status,
                first_name,
                last_name,
                last_login_at,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.username.original())
        .bind(user.username.canonical())
        .bind(user.email.as_str())
        .bind(user.user_role.id())
        .bind(user.user_status.id())
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.last_login_at)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_user_conflict)?;

        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_by_username(&self, username: &Username) -> AuthResult<Option<User>> {
        self.find_user_where("username_canonical", username.canonical())
            .await
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        self.find_user_where("email", email.as_str()).await
    }

    async fn exists_by_username(&self, username: &Username) -> AuthResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username_canonical = $1)",
        )
        .bind(username.canonical())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE users SET
                username = $2,
                username_canonical = $3,
                email = $4,
                user_role = $5,
                user_status = $6,
                first_name = $7,
                last_name = $8,
                last_login_at = $9,
                updated_at = $10
            WHERE user_id = $1
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.username.original())
        .bind(user.username.canonical())
        .bind(user.email.as_str())
        .bind(user.user_role.id())
        .bind(user.user_status.id())
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.last_login_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_user_conflict)?;

        Ok(())
    }
}

// ============================================================================
// Auth Repository Implementation
// ============================================================================

impl AuthRepository for PgAuthRepository {
    async fn create(&self, auth: &Auth) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO auth_credentials (
                user_id,
                password_hash,
                login_failed_count,
                last_failed_at,
                locked_until,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(auth.user_id.as_uuid())
        .bind(auth.password_hash.as_str())
        .bind(auth.login_failed_count as i16)
        .bind(auth.last_failed_at)
        .bind(auth.locked_until)
        .bind(auth.created_at)
        .bind(auth.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_user_id(&self, user_id: &UserId) -> AuthResult<Option<Auth>> {
        let row = sqlx::query_as::<_, AuthRow>(
            r#"
            SELECT
                user_id,
                password_hash,
                login_failed_count,
                last_failed_at,
                locked_until,
                created_at,
                updated_at
            FROM auth_credentials
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(AuthRow::into_auth).transpose()
    }

    async fn update(&self, auth: &Auth) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE auth_credentials SET
                password_hash = $2,
                login_failed_count = $3,
                last_failed_at = $4,
                locked_until = $5,
                updated_at = $6
            WHERE user_id = $1
            "#,
        )
        .bind(auth.user_id.as_uuid())
        .bind(auth.password_hash.as_str())
        .bind(auth.login_failed_count as i16)
        .bind(auth.last_failed_at)
        .bind(auth.locked_until)
        .bind(auth.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// Auth Session Repository Implementation
// ============================================================================

impl AuthSessionRepository for PgAuthRepository {
    async fn create(&self, session: &AuthSession) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO auth_sessions (
                session_id,
                user_id,
                user_role,
                expires_at_ms,
                remember_me,
                client_fingerprint_hash,
                client_ip,
                user_agent,
                created_at,
                last_activity_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(session.session_id.as_uuid())
        .bind(session.user_id.as_uuid())
        .bind(session.user_role.id())
        .bind(session.expires_at_ms)
        .bind(session.remember_me)
        .bind(&session.client_fingerprint_hash)
        .bind(&session.client_ip)
        .bind(&session.user_agent)
        .bind(session.created_at)
        .bind(session.last_activity_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(
        &self,
        session_id: SessionId,
        fingerprint_hash: &[u8],
    ) -> AuthResult<Option<AuthSession>> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM auth_sessions WHERE session_id = $1 AND expires_at_ms > $2"
        );
        let row = sqlx::query_as::<_, AuthSessionRow>(&sql)
            .bind(session_id.as_uuid())
            .bind(Utc::now().timestamp_millis())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(r) if r.client_fingerprint_hash != fingerprint_hash => {
                tracing::warn!(session_id = %session_id, "Auth session fingerprint mismatch");
                Err(AuthError::SessionFingerprintMismatch)
            }
            Some(r) => Ok(Some(r.into_session()?)),
            None => Ok(None),
        }
    }

    async fn update(&self, session: &AuthSession) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE auth_sessions SET
                expires_at_ms = $2,
                last_activity_at = $3
            WHERE session_id = $1
            "#,
        )
        .bind(session.session_id.as_uuid())
        .bind(session.expires_at_ms)
        .bind(session.last_activity_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, session_id: SessionId) -> AuthResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE session_id = $1")
            .bind(session_id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_all_for_user(
        &self,
        user_id: &UserId,
        except: Option<SessionId>,
    ) -> AuthResult<u64> {
        let deleted = sqlx::query(
            "DELETE FROM auth_sessions WHERE user_id = $1 AND ($2::uuid IS NULL OR session_id <> $2)",
        )
        .bind(user_id.as_uuid())
        .bind(except.map(SessionId::into_uuid))
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(deleted)
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM auth_sessions WHERE expires_at_ms < $1")
            .bind(Utc::now().timestamp_millis())
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(sessions_deleted = deleted, "Cleaned up expired auth sessions");

        Ok(deleted)
    }
}

// ============================================================================
// Password Reset Repository Implementation
// ============================================================================

impl PasswordResetRepository for PgAuthRepository {
    async fn create_superseding(&self, reset: &PasswordReset) -> AuthResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE password_resets SET consumed_at_ms = $2 WHERE user_id = $1 AND consumed_at_ms IS NULL",
        )
        .bind(reset.user_id.as_uuid())
        .bind(Utc::now().timestamp_millis())
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO password_resets (
                reset_id,
                user_id,
                email,
                token_hash,
                expires_at_ms,
                consumed_at_ms,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(reset.reset_id.as_uuid())
        .bind(reset.user_id.as_uuid())
        .bind(reset.email.as_str())
        .bind(&reset.token_hash)
        .bind(reset.expires_at_ms)
        .bind(reset.consumed_at_ms)
        .bind(reset.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn consume_by_token_hash(
        &self,
        token_hash: &str,
        now_ms: i64,
    ) -> AuthResult<Option<PasswordReset>> {
        // Single statement: the row lock makes concurrent redemption lose.
        let sql = format!(
            r#"
            UPDATE password_resets SET consumed_at_ms = $2
            WHERE token_hash = $1 AND consumed_at_ms IS NULL AND expires_at_ms > $2
            RETURNING {RESET_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, PasswordResetRow>(&sql)
            .bind(token_hash)
            .bind(now_ms)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(PasswordResetRow::into_reset))
    }

    async fn consume_latest_for_email(
        &self,
        email: &Email,
        now_ms: i64,
    ) -> AuthResult<Option<PasswordReset>> {
        let sql = format!(
            r#"
            UPDATE password_resets SET consumed_at_ms = $2
            WHERE reset_id = (
                SELECT reset_id FROM password_resets
                WHERE email = $1 AND consumed_at_ms IS NULL AND expires_at_ms > $2
                ORDER BY created_at DESC
                LIMIT 1
                FOR UPDATE
            )
            AND consumed_at_ms IS NULL
            RETURNING {RESET_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, PasswordResetRow>(&sql)
            .bind(email.as_str())
            .bind(now_ms)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(PasswordResetRow::into_reset))
    }

    async fn purge_stale(&self, now_ms: i64) -> AuthResult<u64> {
        let deleted = sqlx::query(
            "DELETE FROM password_resets WHERE consumed_at_ms IS NOT NULL OR expires_at_ms <= $1",
        )
        .bind(now_ms)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    username: String,
    email: String,
    user_role: i16,
    user_status: i16,
    first_name: Option<String>,
    last_name: Option<String>,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        let user_role = UserRole::from_id(self.user_role)
            .ok_or_else(|| AuthError::Internal(format!("Invalid user_role: {}", self.user_role)))?;

        Ok(User {
            user_id: UserId::from_uuid(self.user_id),
            username: Username::from_db(self.username),
            email: Email::from_db(self.email),
            user_role,
            user_status: UserStatus::from_id(self.user_status).unwrap_or(UserStatus::Disabled),
            first_name: self.first_name,
            last_name: self.last_name,
            last_login_at: self.last_login_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AuthRow {
    user_id: Uuid,
    password_hash: String,
    login_failed_count: i16,
    last_failed_at: Option<DateTime<Utc>>,
    locked_until: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AuthRow {
    fn into_auth(self) -> AuthResult<Auth> {
        Ok(Auth {
            user_id: UserId::from_uuid(self.user_id),
            password_hash: UserPassword::from_db(self.password_hash)?,
            login_failed_count: self.login_failed_count.max(0) as u16,
            last_failed_at: self.last_failed_at,
            locked_until: self.locked_until,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AuthSessionRow {
    session_id: Uuid,
    user_id: Uuid,
    user_role: i16,
    expires_at_ms: i64,
    remember_me: bool,
    client_fingerprint_hash: Vec<u8>,
    client_ip: Option<String>,
    user_agent: Option<String>,
    created_at: DateTime<Utc>,
    last_activity_at: DateTime<Utc>,
}

impl AuthSessionRow {
    fn into_session(self) -> AuthResult<AuthSession> {
        let user_role = UserRole::from_id(self.user_role)
            .ok_or_else(|| AuthError::Internal(format!("Invalid user_role: {}", self.user_role)))?;

        Ok(AuthSession {
            session_id: SessionId::from_uuid(self.session_id),
            user_id: UserId::from_uuid(self.user_id),
            user_role,
            expires_at_ms: self.expires_at_ms,
            remember_me: self.remember_me,
            client_fingerprint_hash: self.client_fingerprint_hash,
            client_ip: self.client_ip,
            user_agent: self.user_agent,
            created_at: self.created_at,
            last_activity_at: self.last_activity_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PasswordResetRow {
    reset_id: Uuid,
    user_id: Uuid,
    email: String,
    token_hash: String,
    expires_at_ms: i64,
    consumed_at_ms: Option<i64>,
    created_at: DateTime<Utc>,
}

impl PasswordResetRow {
    fn into_reset(self) -> PasswordReset {
        PasswordReset {
            reset_id: PasswordResetId::from_uuid(self.reset_id),
            user_id: UserId::from_uuid(self.user_id),
            email: Email::from_db(self.email),
            token_hash: self.token_hash,
            expires_at_ms: self.expires_at_ms,
            consumed_at_ms: self.consumed_at_ms,
            created_at: self.created_at,
        }
    }
}
