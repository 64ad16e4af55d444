use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;

// ---------------------------------------------------------------------------
// Login form
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct LoginData {
    pub email: String,
    pub password: String,
}

impl LoginData {
    /// Build from decoded `application/x-www-form-urlencoded` pairs.
    pub fn from_form(params: &HashMap<String, String>) -> Result<Self, LoginError> {
        let email = params
            .get("email")
            .ok_or_else(|| LoginError::MissingField("email".to_string()))?
            .trim()
            .to_string();

        let password = params
            .get("password")
            .ok_or_else(|| LoginError::MissingField("password".to_string()))?
            .to_string();

        Ok(Self { email, password })
    }
}

// Keeps the password out of logs.
impl fmt::Debug for LoginData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginData")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Login errors
// ---------------------------------------------------------------------------

/// Why a login attempt was refused.
///
/// Only [`LoginError::to_code`] distinguishes the variants (for logs). Every
/// variant shows the visitor the same message, so the login form never
/// reveals whether an email is registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginError {
    InvalidCredentials,
    MissingField(String),
}

impl LoginError {
    pub fn to_code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::MissingField(_) => "MISSING_FIELD",
        }
    }

    pub fn to_message(&self) -> String {
        "Invalid username/password".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_form_trims_email_but_not_password() {
        let mut params = HashMap::new();
        params.insert("email".to_string(), "  a@x.com ".to_string());
        params.insert("password".to_string(), " Passw0rd ".to_string());

        let data = LoginData::from_form(&params).unwrap();
        assert_eq!(data.email, "a@x.com");
        assert_eq!(data.password, " Passw0rd ");
    }

    #[test]
    fn from_form_reports_missing_password() {
        let mut params = HashMap::new();
        params.insert("email".to_string(), "a@x.com".to_string());

        let err = LoginData::from_form(&params).unwrap_err();
        assert_eq!(err, LoginError::MissingField("password".to_string()));
    }

    #[test]
    fn debug_output_redacts_password() {
        let data = LoginData {
            email: "a@x.com".into(),
            password: "hunter2".into(),
        };
        let out = format!("{:?}", data);
        assert!(out.contains("a@x.com"));
        assert!(!out.contains("hunter2"));
    }

    #[test]
    fn all_variants_share_one_message() {
        assert_eq!(
            LoginError::InvalidCredentials.to_message(),
            LoginError::MissingField("email".into()).to_message()
        );
    }
}
