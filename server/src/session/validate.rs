use anyhow::{Result, anyhow};
use sqlx::SqlitePool;

use shared::types::{RegistrationData, RegistrationError, ValidationOutcome};

use crate::database::users;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Complexity and confirmation rules. Every broken rule is reported.
/// Complexity is only judged on a non-empty password; an empty one is the
/// caller's `MissingField`.
pub fn check_password_rules(password: &str, confirm: &str) -> Vec<RegistrationError> {
    let mut errors = Vec::new();

    if !password.is_empty() {
        if password.chars().count() < MIN_PASSWORD_LEN {
            errors.push(RegistrationError::PasswordTooShort);
        }
        if !password.chars().any(|c| c.is_ascii_uppercase()) {
            errors.push(RegistrationError::PasswordMissingUppercase);
        }
        if !password.chars().any(|c| c.is_ascii_lowercase()) {
            errors.push(RegistrationError::PasswordMissingLowercase);
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            errors.push(RegistrationError::PasswordMissingDigit);
        }
    }

    if password != confirm {
        errors.push(RegistrationError::PasswordMismatch);
    }

    errors
}

fn missing_fields(fields: &[(&str, &str)]) -> Vec<RegistrationError> {
    fields
        .iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| RegistrationError::MissingField((*name).to_string()))
        .collect()
}

/// Full registration check, including read-only uniqueness lookups.
/// Email and username are checked independently so both can be reported.
pub async fn validate_registration(
    pool: &SqlitePool,
    data: &RegistrationData,
) -> Result<ValidationOutcome> {
    let mut errors = missing_fields(&[
        ("username", &data.username),
        ("email", &data.email),
        ("password", &data.password),
        ("confirm_password", &data.confirm_password),
    ]);

    errors.extend(check_password_rules(&data.password, &data.confirm_password));

    if !data.email.is_empty() && users::email_exists(pool, &data.email).await? {
        errors.push(RegistrationError::EmailTaken);
    }
    if !data.username.is_empty() && users::username_exists(pool, &data.username).await? {
        errors.push(RegistrationError::UsernameTaken);
    }

    Ok(ValidationOutcome::from_errors(errors))
}

pub fn validate_password_change(password: &str, confirm: &str) -> ValidationOutcome {
    let mut errors = missing_fields(&[("password", password), ("confirm_password", confirm)]);
    errors.extend(check_password_rules(password, confirm));
    ValidationOutcome::from_errors(errors)
}

/// Non-empty, different from the user's current name, and not taken.
/// Names compare ignoring case.
pub async fn validate_username_change(
    pool: &SqlitePool,
    user_id: i64,
    new_username: &str,
) -> Result<ValidationOutcome> {
    let new_username = new_username.trim();
    if new_username.is_empty() {
        return Ok(ValidationOutcome::from_errors(vec![
            RegistrationError::MissingField("username".to_string()),
        ]));
    }

    let current = users::find_user_by_id(pool, user_id)
        .await?
        .ok_or_else(|| anyhow!("User {} not found", user_id))?;

    let error = if current.username.eq_ignore_ascii_case(new_username) {
        Some(RegistrationError::UsernameUnchanged)
    } else if users::username_exists(pool, new_username).await? {
        Some(RegistrationError::UsernameTaken)
    } else {
        None
    };

    Ok(ValidationOutcome::from_errors(error.into_iter().collect()))
}
