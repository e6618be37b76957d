//! Reset mail delivery
//!
//! `Log` writes the reset link to the tracing output (development);
//! `Smtp` relays through a real server via lettre.

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::domain::mailer::{ResetMail, ResetMailer};
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// `From` header, e.g. `Events <no-reply@events.example>`
    pub from: String,
}

#[derive(Debug, Clone, Default)]
pub struct LogMailer;

impl ResetMailer for LogMailer {
    async fn send_reset(&self, mail: &ResetMail) -> AuthResult<()> {
        tracing::info!(
            to = %mail.to.masked(),
            link = %mail.link,
            "Password reset mail (log transport)"
        );
        Ok(())
    }
}

#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> AuthResult<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .map_err(|e| AuthError::Mail(format!("SMTP relay error: {e}")))?
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .port(config.port)
            .build();

        Ok(Self {
            transport,
            from: config.from.clone(),
        })
    }

    fn build_message(&self, mail: &ResetMail) -> AuthResult<Message> {
        Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| AuthError::Mail(format!("Invalid from address: {e}")))?,
            )
            .to(mail
                .to
                .as_str()
                .parse()
                .map_err(|e| AuthError::Mail(format!("Invalid to address: {e}")))?)
            .subject(mail.subject())
            .header(ContentType::TEXT_PLAIN)
            .body(mail.body())
            .map_err(|e| AuthError::Mail(format!("Failed to build email: {e}")))
    }
}

impl ResetMailer for SmtpMailer {
    async fn send_reset(&self, mail: &ResetMail) -> AuthResult<()> {
        let message = self.build_message(mail)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| AuthError::Mail(format!("Failed to send email: {e}")))?;

        tracing::info!(to = %mail.to.masked(), "Password reset mail sent");
        Ok(())
    }
}

/// Transport chosen at startup.
#[derive(Clone)]
pub enum Mailer {
    Log(LogMailer),
    Smtp(SmtpMailer),
}

impl Mailer {
    /// SMTP when configured, log transport otherwise.
    pub fn from_config(smtp: Option<&SmtpConfig>) -> AuthResult<Self> {
        match smtp {
            Some(config) => Ok(Mailer::Smtp(SmtpMailer::new(config)?)),
            None => Ok(Mailer::Log(LogMailer)),
        }
    }
}

impl ResetMailer for Mailer {
    async fn send_reset(&self, mail: &ResetMail) -> AuthResult<()> {
        match self {
            Mailer::Log(m) => m.send_reset(mail).await,
            Mailer::Smtp(m) => m.send_reset(mail).await,
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;

    /// Captures mails instead of sending them; can be told to fail.
    #[derive(Clone, Default)]
    pub struct RecordingMailer {
        sent: Arc<Mutex<Vec<ResetMail>>>,
        fail: bool,
    }

    impl RecordingMailer {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        pub fn sent(&self) -> Vec<ResetMail> {
            self.sent.lock().clone()
        }
    }

    impl ResetMailer for RecordingMailer {
        async fn send_reset(&self, mail: &ResetMail) -> AuthResult<()> {
            if self.fail {
                return Err(AuthError::Mail("connection refused".into()));
            }
            self.sent.lock().push(mail.clone());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::Email;

    fn sample_mail() -> ResetMail {
        ResetMail {
            to: Email::new("jane@example.com").unwrap(),
            username: "jane".into(),
            link: "http://localhost:5173/reset-password?token=abc".into(),
            expires_in_minutes: 30,
        }
    }

    #[tokio::test]
    async fn test_log_mailer_always_succeeds() {
        let mailer = Mailer::from_config(None).unwrap();
        assert!(matches!(mailer, Mailer::Log(_)));
        mailer.send_reset(&sample_mail()).await.unwrap();
    }

    #[tokio::test]
    async fn test_smtp_message_headers() {
        let mailer = SmtpMailer::new(&SmtpConfig {
            host: "smtp.example.com".into(),
            port: 587,
            username: "user".into(),
            password: "pass".into(),
            from: "Events <no-reply@events.example>".into(),
        })
        .unwrap();

        let message = mailer.build_message(&sample_mail()).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("To: jane@example.com"));
        assert!(raw.contains("Subject: Reset your password"));
    }

    #[tokio::test]
    async fn test_smtp_rejects_bad_from_address() {
        let mailer = SmtpMailer::new(&SmtpConfig {
            host: "smtp.example.com".into(),
            port: 587,
            username: "user".into(),
            password: "pass".into(),
            from: "not an address".into(),
        })
        .unwrap();

        assert!(matches!(
            mailer.build_message(&sample_mail()),
            Err(AuthError::Mail(_))
        ));
    }
}
