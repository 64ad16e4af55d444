use anyhow::Result;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::database::sessions;

use super::envelope::SessionEnvelope;

/// Outcome of checking a request's session cookie against the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Authenticated { user_id: i64 },
    /// No identity at all: no cookie, a forged cookie, or no user id in it.
    Unauthenticated,
    /// The cookie names a user but its token is missing or no longer matches
    /// a live, valid record.
    Revoked { user_id: i64 },
}

impl AuthState {
    pub fn user_id(&self) -> Option<i64> {
        match self {
            Self::Authenticated { user_id } => Some(*user_id),
            _ => None,
        }
    }
}

/// Classify the envelope. May write to the store through
/// [`sessions::is_valid`]'s self-healing revocation.
pub async fn authenticate(pool: &SqlitePool, envelope: &SessionEnvelope) -> Result<AuthState> {
    let Some(user_id) = envelope.user_id() else {
        return Ok(AuthState::Unauthenticated);
    };

    let Some(token) = envelope.token() else {
        return Ok(AuthState::Revoked { user_id });
    };

    if sessions::is_valid(pool, user_id, token).await? {
        Ok(AuthState::Authenticated { user_id })
    } else {
        Ok(AuthState::Revoked { user_id })
    }
}

/// [`authenticate`] plus the gate's follow-up: a revoked identity also
/// loses its stored session, whatever token that record currently holds.
pub async fn gate(pool: &SqlitePool, envelope: &SessionEnvelope) -> Result<AuthState> {
    let state = authenticate(pool, envelope).await?;

    match state {
        AuthState::Revoked { user_id } => {
            let hit = sessions::invalidate_by_user(pool, user_id).await?;
            warn!(
                "Revoked session presented for user {}; stored record invalidated: {}",
                user_id, hit
            );
        }
        AuthState::Unauthenticated => debug!("Gate: no session identity"),
        AuthState::Authenticated { user_id } => debug!("Gate: user {} authenticated", user_id),
    }

    Ok(state)
}
