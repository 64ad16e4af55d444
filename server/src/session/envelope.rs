use anyhow::Result;
use chrono::{DateTime, Utc};
use hyper::header::{HeaderMap, HeaderValue};

use shared::types::CookiePayload;

use super::cookie::CookieCodec;

/// The per-request view of the session cookie.
///
/// Missing, forged, or unreadable cookies all become an empty envelope. Any
/// change made through this type marks it dirty; the handler then sends
/// [`SessionEnvelope::commit`] so the browser sees the change.
#[derive(Debug, Clone, Default)]
pub struct SessionEnvelope {
    payload: CookiePayload,
    dirty: bool,
}

impl SessionEnvelope {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_payload(payload: CookiePayload) -> Self {
        Self {
            payload,
            dirty: false,
        }
    }

    pub fn from_headers(headers: &HeaderMap, codec: &CookieCodec) -> Self {
        codec
            .read(headers)
            .map(Self::from_payload)
            .unwrap_or_default()
    }

    pub fn user_id(&self) -> Option<i64> {
        self.payload.user_id
    }

    /// The token, treating an empty string as absent.
    pub fn token(&self) -> Option<&str> {
        self.payload.token.as_deref().filter(|t| !t.is_empty())
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Attach a one-shot message for the next page that reads it.
    pub fn flash_error(&mut self, message: impl Into<String>) {
        self.payload.error = Some(message.into());
        self.dirty = true;
    }

    /// Read and remove the flash message. A second call returns `None`.
    pub fn take_error(&mut self) -> Option<String> {
        let taken = self.payload.error.take();
        if taken.is_some() {
            self.dirty = true;
        }
        taken
    }

    /// `Set-Cookie` for the envelope's current state; clears the cookie
    /// outright once nothing is left in it.
    pub fn commit(
        &self,
        codec: &CookieCodec,
        expires: Option<DateTime<Utc>>,
    ) -> Result<HeaderValue> {
        if self.payload.is_empty() {
            codec.clear_header()
        } else {
            codec.set_header(&self.payload, expires)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn codec() -> CookieCodec {
        CookieCodec::new("gameReviews", SECRET, false)
    }

    /// Simulates the browser: take a `Set-Cookie`, send back `Cookie`.
    fn echo(set_cookie: &HeaderValue) -> HeaderMap {
        let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
        let mut h = HeaderMap::new();
        h.insert("cookie", HeaderValue::from_str(pair).unwrap());
        h
    }

    #[test]
    fn missing_cookie_is_empty() {
        let env = SessionEnvelope::from_headers(&HeaderMap::new(), &codec());
        assert_eq!(env.user_id(), None);
        assert_eq!(env.token(), None);
        assert!(!env.is_dirty());
    }

    #[test]
    fn empty_token_reads_as_absent() {
        let env = SessionEnvelope::from_payload(CookiePayload {
            user_id: Some(3),
            token: Some(String::new()),
            error: None,
        });
        assert_eq!(env.user_id(), Some(3));
        assert_eq!(env.token(), None);
    }

    #[test]
    fn flash_is_readable_exactly_once_across_requests() {
        let c = codec();

        let mut first = SessionEnvelope::empty();
        first.flash_error("Invalid username/password");
        let set = first.commit(&c, None).unwrap();

        let mut second = SessionEnvelope::from_headers(&echo(&set), &c);
        assert_eq!(
            second.take_error().as_deref(),
            Some("Invalid username/password")
        );
        assert_eq!(second.take_error(), None);
        assert!(second.is_dirty());

        let set = second.commit(&c, None).unwrap();
        let mut third = SessionEnvelope::from_headers(&echo(&set), &c);
        assert_eq!(third.take_error(), None);
    }

    #[test]
    fn take_error_without_flash_stays_clean() {
        let mut env = SessionEnvelope::from_payload(CookiePayload::signed_in(1, "t".into()));
        assert_eq!(env.take_error(), None);
        assert!(!env.is_dirty());
    }

    #[test]
    fn empty_envelope_commits_as_clear() {
        let set = SessionEnvelope::empty().commit(&codec(), None).unwrap();
        assert!(set.to_str().unwrap().contains("Max-Age=0"));
    }
}
