//! Bilingual message catalog (English / Arabic)
//!
//! Every user-visible error or notice produced by the client flows is a
//! [`Message`]; pages render it with [`t`] in the active [`Language`].

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ar,
}

impl Language {
    pub const fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ar => "ar",
        }
    }

    /// Text direction for the document root.
    pub const fn dir(&self) -> &'static str {
        match self {
            Language::En => "ltr",
            Language::Ar => "rtl",
        }
    }

    /// Accepts `"ar"`, `"ar-EG"`, `"EN"`... Anything else is `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        let primary = code.split(['-', '_']).next()?.to_ascii_lowercase();
        match primary.as_str() {
            "en" => Some(Language::En),
            "ar" => Some(Language::Ar),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Message {
    // validation
    FieldRequired,
    InvalidEmail,
    PasswordTooShort,
    PasswordNeedsLetterAndDigit,
    PasswordsDoNotMatch,

    // forgot / reset password
    ForgotPasswordFailed,
    EmailVerified,
    ResetPasswordFailed,
    PasswordResetSuccess,
    ResetTokenMissing,

    // login / register / logout
    LoginFailed,
    InvalidCredentials,
    AccountLocked,
    AccountDisabled,
    RegisterFailed,
    RegisterSuccess,
    AccountExists,
    LogoutSuccess,

    // generic
    RequestPending,
    NetworkError,
    PageNotFound,
}

impl Message {
    pub const ALL: [Message; 21] = [
        Message::FieldRequired,
        Message::InvalidEmail,
        Message::PasswordTooShort,
        Message::PasswordNeedsLetterAndDigit,
        Message::PasswordsDoNotMatch,
        Message::ForgotPasswordFailed,
        Message::EmailVerified,
        Message::ResetPasswordFailed,
        Message::PasswordResetSuccess,
        Message::ResetTokenMissing,
        Message::LoginFailed,
        Message::InvalidCredentials,
        Message::AccountLocked,
        Message::AccountDisabled,
        Message::RegisterFailed,
        Message::RegisterSuccess,
        Message::AccountExists,
        Message::LogoutSuccess,
        Message::RequestPending,
        Message::NetworkError,
        Message::PageNotFound,
    ];

    /// Catalog key, as used by templates.
    pub const fn key(&self) -> &'static str {
        use Message::*;
        match self {
            FieldRequired => "field_required",
            InvalidEmail => "invalid_email",
            PasswordTooShort => "password_too_short",
            PasswordNeedsLetterAndDigit => "password_letter_digit",
            PasswordsDoNotMatch => "passwords_do_not_match",
            ForgotPasswordFailed => "forgot_password_failed",
            EmailVerified => "email_verified",
            ResetPasswordFailed => "reset_password_failed",
            PasswordResetSuccess => "password_reset_success",
            ResetTokenMissing => "reset_token_missing",
            LoginFailed => "login_failed",
            InvalidCredentials => "invalid_credentials",
            AccountLocked => "account_locked",
            AccountDisabled => "account_disabled",
            RegisterFailed => "register_failed",
            RegisterSuccess => "register_success",
            AccountExists => "account_exists",
            LogoutSuccess => "logout_success",
            RequestPending => "request_pending",
            NetworkError => "network_error",
            PageNotFound => "page_not_found",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Message::ALL.into_iter().find(|m| m.key() == key)
    }
}

/// Translate a message.
pub const fn t(lang: Language, message: Message) -> &'static str {
    match lang {
        Language::En => en(message),
        Language::Ar => ar(message),
    }
}

/// Translate by string key; unknown keys yield `None`.
pub fn lookup(lang: Language, key: &str) -> Option<&'static str> {
    Message::from_key(key).map(|m| t(lang, m))
}

const fn en(message: Message) -> &'static str {
    use Message::*;
    match message {
        FieldRequired => "This field is required",
        InvalidEmail => "Please enter a valid email address",
        PasswordTooShort => "Password must be at least 8 characters",
        PasswordNeedsLetterAndDigit => "Password must contain at least one letter and one number",
        PasswordsDoNotMatch => "Passwords do not match",
        ForgotPasswordFailed => "We could not verify this email. Please check it and try again",
        EmailVerified => "Email verified. Choose a new password",
        ResetPasswordFailed => "Could not reset your password. Please try again",
        PasswordResetSuccess => "Your password has been reset. Please sign in",
        ResetTokenMissing => "The reset link is invalid or incomplete",
        LoginFailed => "Sign in failed. Please try again",
        InvalidCredentials => "Invalid username or password",
        AccountLocked => "Too many failed attempts. Try again later",
        AccountDisabled => "This account is disabled",
        RegisterFailed => "Registration failed. Please try again",
        RegisterSuccess => "Account created. Please sign in",
        AccountExists => "This username or email is already registered",
        LogoutSuccess => "You have been signed out",
        RequestPending => "Please wait...",
        NetworkError => "Network error. Check your connection and try again",
        PageNotFound => "Page not found",
    }
}

const fn ar(message: Message) -> &'static str {
    use Message::*;
    match message {
        FieldRequired => "هذا الحقل مطلوب",
        InvalidEmail => "يرجى إدخال بريد إلكتروني صالح",
        PasswordTooShort => "يجب أن تتكون كلمة المرور من 8 أحرف على الأقل",
        PasswordNeedsLetterAndDigit => "يجب أن تحتوي كلمة المرور على حرف ورقم على الأقل",
        PasswordsDoNotMatch => "كلمتا المرور غير متطابقتين",
        ForgotPasswordFailed => "تعذر التحقق من هذا البريد الإلكتروني. يرجى التحقق منه والمحاولة مرة أخرى",
        EmailVerified => "تم التحقق من البريد الإلكتروني. اختر كلمة مرور جديدة",
        ResetPasswordFailed => "تعذرت إعادة تعيين كلمة المرور. يرجى المحاولة مرة أخرى",
        PasswordResetSuccess => "تمت إعادة تعيين كلمة المرور. يرجى تسجيل الدخول",
        ResetTokenMissing => "رابط إعادة التعيين غير صالح أو غير مكتمل",
        LoginFailed => "فشل تسجيل الدخول. يرجى المحاولة مرة أخرى",
        InvalidCredentials => "اسم المستخدم أو كلمة المرور غير صحيحة",
        AccountLocked => "محاولات فاشلة كثيرة. حاول لاحقاً",
        AccountDisabled => "هذا الحساب معطل",
        RegisterFailed => "فشل إنشاء الحساب. يرجى المحاولة مرة أخرى",
        RegisterSuccess => "تم إنشاء الحساب. يرجى تسجيل الدخول",
        AccountExists => "اسم المستخدم أو البريد الإلكتروني مسجل بالفعل",
        LogoutSuccess => "تم تسجيل خروجك",
        RequestPending => "يرجى الانتظار...",
        NetworkError => "خطأ في الشبكة. تحقق من اتصالك وحاول مرة أخرى",
        PageNotFound => "الصفحة غير موجودة",
    }
}
