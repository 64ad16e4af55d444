use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

/// Registration form fields, exactly as submitted (email/username trimmed).
#[derive(Clone, Default)]
pub struct RegistrationData {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegistrationData {
    /// Absent fields become empty strings; the validator reports them.
    pub fn from_form(params: &HashMap<String, String>) -> Self {
        let field = |name: &str| params.get(name).cloned().unwrap_or_default();

        Self {
            username: field("username").trim().to_string(),
            email: field("email").trim().to_string(),
            password: field("password"),
            confirm_password: field("confirm_password"),
        }
    }
}

impl fmt::Debug for RegistrationData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationData")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// One broken registration / account rule. Validators collect every
/// violation rather than stopping at the first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", content = "field", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationError {
    MissingField(String),
    PasswordTooShort,
    PasswordMissingUppercase,
    PasswordMissingLowercase,
    PasswordMissingDigit,
    PasswordMismatch,
    EmailTaken,
    UsernameTaken,
    UsernameUnchanged,
}

impl RegistrationError {
    pub fn to_code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "MISSING_FIELD",
            Self::PasswordTooShort => "PASSWORD_TOO_SHORT",
            Self::PasswordMissingUppercase => "PASSWORD_MISSING_UPPERCASE",
            Self::PasswordMissingLowercase => "PASSWORD_MISSING_LOWERCASE",
            Self::PasswordMissingDigit => "PASSWORD_MISSING_DIGIT",
            Self::PasswordMismatch => "PASSWORD_MISMATCH",
            Self::EmailTaken => "EMAIL_TAKEN",
            Self::UsernameTaken => "USERNAME_TAKEN",
            Self::UsernameUnchanged => "USERNAME_UNCHANGED",
        }
    }

    pub fn to_message(&self) -> String {
        match self {
            Self::MissingField(field) => format!("Missing required field: {}", field),
            Self::PasswordTooShort => "Password must be at least 8 characters.".to_string(),
            Self::PasswordMissingUppercase => {
                "Include at least one uppercase letter.".to_string()
            }
            Self::PasswordMissingLowercase => {
                "Include at least one lowercase letter.".to_string()
            }
            Self::PasswordMissingDigit => "Include at least one number.".to_string(),
            Self::PasswordMismatch => "Passwords must match.".to_string(),
            Self::EmailTaken => "Email exists".to_string(),
            Self::UsernameTaken => "Username exists".to_string(),
            Self::UsernameUnchanged => {
                "Username cannot be the same as current username.".to_string()
            }
        }
    }
}

/// Result of running a validator: `valid` is true exactly when `errors` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub errors: Vec<RegistrationError>,
}

impl ValidationOutcome {
    pub fn from_errors(errors: Vec<RegistrationError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.to_message()).collect()
    }
}
