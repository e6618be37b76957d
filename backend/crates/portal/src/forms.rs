//! Client-side form schemas
//!
//! Validation runs before any request; a form that fails validation never
//! reaches the network. Field names match the JSON bodies (`camelCase`).

use std::collections::BTreeMap;
use std::fmt;

use crate::i18n::Message;
use crate::models::Role;

pub const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_EMAIL_LENGTH: usize = 254;

/// Field name to the first error found for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, Message>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps the first error per field.
    pub fn add(&mut self, field: &'static str, message: Message) {
        self.0.entry(field).or_insert(message);
    }

    pub fn get(&self, field: &str) -> Option<Message> {
        self.0.get(field).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Message)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

/// Syntactically valid, trimmed email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    pub fn parse(input: &str) -> Result<Self, Message> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(Message::FieldRequired);
        }
        if trimmed.len() > MAX_EMAIL_LENGTH || trimmed.chars().any(char::is_whitespace) {
            return Err(Message::InvalidEmail);
        }

        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(Message::InvalidEmail);
        };
        let domain_ok = !domain.contains('@')
            && domain.contains('.')
            && domain.split('.').all(|label| !label.is_empty());
        if local.is_empty() || !domain_ok {
            return Err(Message::InvalidEmail);
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// At least 8 characters with one letter and one digit.
pub fn check_password(password: &str) -> Result<(), Message> {
    if password.is_empty() {
        return Err(Message::FieldRequired);
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(Message::PasswordTooShort);
    }
    let has_letter = password.chars().any(char::is_alphabetic);
    let has_digit = password.chars().any(|c| c.is_numeric());
    if !has_letter || !has_digit {
        return Err(Message::PasswordNeedsLetterAndDigit);
    }
    Ok(())
}

fn check_new_password(errors: &mut FieldErrors, password: &str, confirm_password: &str) {
    if let Err(message) = check_password(password) {
        errors.add("password", message);
    }
    if confirm_password.is_empty() {
        errors.add("confirmPassword", Message::FieldRequired);
    } else if password != confirm_password {
        errors.add("confirmPassword", Message::PasswordsDoNotMatch);
    }
}

fn require(errors: &mut FieldErrors, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, Message::FieldRequired);
    }
}

#[derive(Debug, Clone, Default)]
pub struct EmailForm {
    pub email: String,
}

impl EmailForm {
    pub fn validate(&self) -> Result<Email, FieldErrors> {
        Email::parse(&self.email).map_err(|message| {
            let mut errors = FieldErrors::new();
            errors.add("email", message);
            errors
        })
    }
}

/// Second step of the forgot-password flow. `email` is the verified
/// address carried by the state machine, not user input.
#[derive(Debug, Clone)]
pub struct PasswordForm {
    pub email: Email,
    pub password: String,
    pub confirm_password: String,
}

impl PasswordForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_new_password(&mut errors, &self.password, &self.confirm_password);
        errors.into_result()
    }
}

#[derive(Debug, Clone)]
pub struct TokenResetForm {
    pub token: String,
    pub password: String,
    pub confirm_password: String,
}

impl TokenResetForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        require(&mut errors, "token", &self.token);
        check_new_password(&mut errors, &self.password, &self.confirm_password);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub remember_me: bool,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        require(&mut errors, "username", &self.username);
        if self.password.is_empty() {
            errors.add("password", Message::FieldRequired);
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub role: Option<Role>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<Email, FieldErrors> {
        let mut errors = FieldErrors::new();
        require(&mut errors, "username", &self.username);
        let email = Email::parse(&self.email)
            .map_err(|message| errors.add("email", message))
            .ok();
        check_new_password(&mut errors, &self.password, &self.confirm_password);

        match email {
            Some(email) if errors.is_empty() => Ok(email),
            _ => Err(errors),
        }
    }
}
