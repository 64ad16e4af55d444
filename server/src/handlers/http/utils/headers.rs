use std::time::SystemTime;

use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use hyper::header::{HeaderMap, HeaderValue};
use tracing::{debug, warn};

/// Extract cookie value by name. Every `Cookie` header is searched.
pub fn get_cookie(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all("cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .find_map(|cookie| {
            let (name, value) = cookie.trim().split_once('=')?;
            if name.trim() == cookie_name {
                debug!("Cookie found: {}", cookie_name);
                Some(value.trim().to_string())
            } else {
                None
            }
        })
}

/// Build a site-wide `Set-Cookie` value: `Path=/; HttpOnly; SameSite=Lax`.
///
/// With `expires`, the cookie persists until then (`Expires` and a matching
/// `Max-Age`); without it the browser drops it at the end of the session.
pub fn set_cookie(
    name: &str,
    value: &str,
    expires: Option<DateTime<Utc>>,
    secure: bool,
) -> Result<HeaderValue> {
    let mut cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", name, value);

    if let Some(at) = expires {
        let max_age = (at - Utc::now()).num_seconds().max(0);
        cookie.push_str(&format!(
            "; Expires={}; Max-Age={}",
            httpdate::fmt_http_date(SystemTime::from(at)),
            max_age
        ));
    }

    if secure {
        cookie.push_str("; Secure");
    }

    debug!("Setting cookie: {}", name);

    HeaderValue::from_str(&cookie).map_err(|e| {
        warn!("Failed to create cookie header for {}: {}", name, e);
        anyhow!("Invalid cookie value: {}", e)
    })
}

/// Delete a cookie by setting it to expire
pub fn delete_cookie(name: &str, secure: bool) -> Result<HeaderValue> {
    debug!("Deleting cookie: {}", name);
    let mut cookie = format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Expires=Thu, 01 Jan 1970 00:00:00 GMT; Max-Age=0",
        name
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).map_err(|e| anyhow!("Invalid cookie name {}: {}", name, e))
}

/// Add no-cache headers for pages that depend on the visitor
pub fn add_no_cache_headers<T>(mut res: hyper::Response<T>) -> hyper::Response<T> {
    let headers = res.headers_mut();

    headers.insert(
        "cache-control",
        HeaderValue::from_static("no-cache, no-store, must-revalidate"),
    );
    headers.insert("pragma", HeaderValue::from_static("no-cache"));
    headers.insert("expires", HeaderValue::from_static("0"));
    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );

    res
}

/// Public caching for `max_age_seconds`
pub fn add_cache_headers<T>(mut res: hyper::Response<T>, max_age_seconds: u64) -> hyper::Response<T> {
    let headers = res.headers_mut();
    let time = max_age_seconds;

    let cache_control = format!("public, max-age={}", time);
    headers.insert(
        "cache-control",
        HeaderValue::from_str(&cache_control)
            .unwrap_or_else(|_| HeaderValue::from_static("public, max-age=3600")),
    );
    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );

    debug!("Added cache headers with max-age: {} seconds", time);
    res
}
