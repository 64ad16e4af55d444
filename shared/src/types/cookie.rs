use serde::{Deserialize, Serialize};

/// Contents of the signed session cookie.
///
/// `user_id` and `token` are set together at login. `error` is a flash
/// message: written on one response and removed by the next read, see the
/// server's `SessionEnvelope::take_error`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookiePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CookiePayload {
    pub fn signed_in(user_id: i64, token: String) -> Self {
        Self {
            user_id: Some(user_id),
            token: Some(token),
            error: None,
        }
    }

    /// Nothing left worth sending back; the cookie can be cleared.
    pub fn is_empty(&self) -> bool {
        self.user_id.is_none() && self.token.is_none() && self.error.is_none()
    }
}
