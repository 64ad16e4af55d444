//! Cookie-backed sessions checked against the server-side session record.
//!
//! A request's cookie is decoded into a [`SessionEnvelope`]; the
//! [`authenticator`] cross-checks it with `database::sessions` on every
//! gated request. Login mints a token, upserts the record, and rewrites the
//! envelope. Logout invalidates the record and clears the cookie.

pub mod authenticator;
pub mod cookie;
pub mod credentials;
pub mod envelope;
pub mod token;
pub mod validate;

pub use authenticator::{AuthState, authenticate, gate};
pub use cookie::CookieCodec;
pub use credentials::{MIN_LOGIN_PASSWORD_LEN, validate_credentials};
pub use envelope::SessionEnvelope;
pub use token::generate_session_token;
