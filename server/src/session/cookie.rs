use anyhow::{Context, Result, anyhow};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use hyper::header::{HeaderMap, HeaderValue};
use sha2::Sha256;
use tracing::debug;

use shared::types::CookiePayload;
use shared::types::server_config::AuthConfig;

use crate::handlers::http::utils::headers;

type HmacSha256 = Hmac<Sha256>;

/// Signs and verifies the session cookie.
///
/// Wire format: `base64url(json(payload)) "." hex(hmac_sha256(secret, base64-part))`.
/// Only a holder of the secret can produce a value that decodes.
pub struct CookieCodec {
    name: String,
    secret: Vec<u8>,
    secure: bool,
}

impl std::fmt::Debug for CookieCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieCodec")
            .field("name", &self.name)
            .field("secure", &self.secure)
            .finish_non_exhaustive()
    }
}

impl CookieCodec {
    pub fn new(name: impl Into<String>, secret: &str, secure: bool) -> Self {
        Self {
            name: name.into(),
            secret: secret.as_bytes().to_vec(),
            secure,
        }
    }

    pub fn from_config(auth: &AuthConfig) -> Result<Self> {
        let secret = auth
            .resolved_cookie_secret()
            .ok_or_else(|| anyhow!("No cookie secret configured (set COOKIE_SECRET)"))?;
        Ok(Self::new(auth.cookie_name.clone(), &secret, auth.secure_cookies))
    }

    fn mac(&self) -> Result<HmacSha256> {
        HmacSha256::new_from_slice(&self.secret).map_err(|e| anyhow!("Invalid HMAC key: {}", e))
    }

    pub fn encode(&self, payload: &CookiePayload) -> Result<String> {
        let json = serde_json::to_vec(payload).context("Failed to serialize cookie payload")?;
        let body = URL_SAFE_NO_PAD.encode(json);

        let mut mac = self.mac()?;
        mac.update(body.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());

        Ok(format!("{}.{}", body, signature))
    }

    /// `None` for anything malformed or not signed with this codec's secret.
    pub fn decode(&self, value: &str) -> Option<CookiePayload> {
        let (body, signature) = value.rsplit_once('.')?;
        let signature = hex::decode(signature).ok()?;

        let mut mac = self.mac().ok()?;
        mac.update(body.as_bytes());
        if mac.verify_slice(&signature).is_err() {
            debug!("Cookie signature mismatch");
            return None;
        }

        let json = URL_SAFE_NO_PAD.decode(body).ok()?;
        serde_json::from_slice(&json)
            .map_err(|e| debug!("Signed cookie with unreadable payload: {}", e))
            .ok()
    }

    /// Decode this codec's cookie from request headers, if present and genuine.
    pub fn read(&self, headers: &HeaderMap) -> Option<CookiePayload> {
        headers::get_cookie(headers, &self.name).and_then(|v| self.decode(&v))
    }

    /// `Set-Cookie` carrying `payload`. `expires` makes it persistent.
    pub fn set_header(
        &self,
        payload: &CookiePayload,
        expires: Option<DateTime<Utc>>,
    ) -> Result<HeaderValue> {
        let value = self.encode(payload)?;
        headers::set_cookie(&self.name, &value, expires, self.secure)
    }

    /// `Set-Cookie` that removes the session cookie.
    pub fn clear_header(&self) -> Result<HeaderValue> {
        headers::delete_cookie(&self.name, self.secure)
    }
}
