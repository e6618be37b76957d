//! Outbound mail port used by the forgot-password flow.

use crate::domain::value_object::Email;
use crate::error::AuthResult;

/// Content of a password reset mail.
#[derive(Debug, Clone)]
pub struct ResetMail {
    pub to: Email,
    pub username: String,
    /// Link to the token reset page
    pub link: String,
    pub expires_in_minutes: u64,
}

impl ResetMail {
    pub fn subject(&self) -> &'static str {
        "Reset your password"
    }

    pub fn body(&self) -> String {
        format!(
            "Hello {},\n\n\
             We received a request to reset your password. Open the link below to choose a new one:\n\n\
             {}\n\n\
             The link expires in {} minutes and can be used once. \
             If you did not ask for this, you can ignore this message.\n",
            self.username, self.link, self.expires_in_minutes
        )
    }
}

#[trait_variant::make(ResetMailer: Send)]
pub trait LocalResetMailer {
    async fn send_reset(&self, mail: &ResetMail) -> AuthResult<()>;
}
