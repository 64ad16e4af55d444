use std::path::{Component, Path, PathBuf};

use anyhow::{Result, anyhow};
use bytes::Bytes;
use http::HeaderValue;
use http_body_util::{BodyExt, Empty, Full};
use hyper::{Response, StatusCode, header};
use tracing::{debug, error, info, warn};

use crate::handlers::http::utils::headers;
use crate::handlers::http::{HttpBody, HttpResponse};

/// Static assets are not fingerprinted, so browsers recheck them hourly.
pub const STATIC_MAX_AGE_SECS: u64 = 3600;

/// Map a `/static/...` request path onto `web_dir`.
///
/// `None` for anything that could leave `web_dir`: parent segments, absolute
/// components, backslashes, or an empty relative path.
pub fn resolve_static_path(web_dir: &Path, request_path: &str) -> Option<PathBuf> {
    let relative = request_path.trim_start_matches('/');
    if relative.is_empty() || relative.contains('\\') || relative.contains('\0') {
        return None;
    }
    if relative
        .split('/')
        .any(|seg| seg.is_empty() || seg == "." || seg == "..")
    {
        return None;
    }

    let relative = Path::new(relative);
    if !relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
    {
        return None;
    }

    Some(web_dir.join(relative))
}

/// Serve a file below `web_dir`. Missing files and rejected paths are `404`.
pub async fn deliver_static_file(web_dir: &Path, request_path: &str) -> Result<HttpResponse> {
    let Some(file_path) = resolve_static_path(web_dir, request_path) else {
        warn!("Rejected static path: {}", request_path);
        return deliver_not_found();
    };

    debug!("Reading static file from: {}", file_path.display());

    let content = match tokio::fs::read(&file_path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return deliver_not_found(),
        Err(e) => {
            return Err(anyhow!(
                "Failed to read static file {}: {}",
                file_path.display(),
                e
            ));
        }
    };

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, get_mime_type(&file_path))
        .body(full(content))
        .map_err(|e| anyhow!("Failed to build response: {}", e))?;

    Ok(headers::add_cache_headers(response, STATIC_MAX_AGE_SECS))
}

/// Helper function to determine MIME type from file extension
fn get_mime_type(path: &Path) -> &'static str {
    match path.extension().and_then(|s| s.to_str()) {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") | Some("mjs") => "application/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("webp") => "image/webp",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

/// Server-rendered page. Never cached: pages reflect who is signed in.
pub fn deliver_html(
    status: StatusCode,
    html: String,
    cookie: Option<HeaderValue>,
) -> Result<HttpResponse> {
    let mut builder = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "text/html; charset=utf-8");

    if let Some(c) = cookie {
        builder = builder.header(header::SET_COOKIE, c);
    }

    let response = builder
        .body(full(html))
        .map_err(|e| anyhow!("Failed to build HTML response: {}", e))?;

    Ok(headers::add_no_cache_headers(response))
}

pub fn deliver_page(html: String) -> Result<HttpResponse> {
    deliver_html(StatusCode::OK, html, None)
}

pub fn deliver_not_found() -> Result<HttpResponse> {
    deliver_html(
        StatusCode::NOT_FOUND,
        crate::handlers::http::views::message_page("Not found", "That page does not exist.", false),
        None,
    )
}

/// A short user-facing error page, e.g. a rejected form.
pub fn deliver_error_page(status: StatusCode, message: &str) -> Result<HttpResponse> {
    deliver_html(
        status,
        crate::handlers::http::views::message_page("Something went wrong", message, false),
        None,
    )
}

/// Last-resort 500 page. Built without any fallible step.
pub fn internal_error() -> HttpResponse {
    let html = crate::handlers::http::views::message_page(
        "Server error",
        "Something went wrong on our side. Please try again.",
        false,
    );
    let mut response = Response::new(full(html));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    headers::add_no_cache_headers(response)
}

/// Delivers a redirect response
pub fn deliver_redirect(location: &str) -> Result<HttpResponse> {
    deliver_redirect_with_cookie(location, None)
}

/// Delivers a redirect response, optionally rewriting the session cookie
pub fn deliver_redirect_with_cookie(
    location: &str,
    cookie: Option<HeaderValue>,
) -> Result<HttpResponse> {
    info!("Delivering redirect to: {}", location);

    let mut builder = Response::builder()
        .status(StatusCode::FOUND)
        .header(header::LOCATION, location);

    if let Some(c) = cookie {
        builder = builder.header(header::SET_COOKIE, c);
    }
    let response = builder.body(empty()).map_err(|e: http::Error| {
        error!("Failed to build redirect response to {}: {}", location, e);
        anyhow!("Failed to build redirect response: {}", e)
    })?;

    Ok(response)
}

/// Serialize a value and deliver it as JSON.
pub fn deliver_json<T: serde::Serialize>(data: &T, status: StatusCode) -> Result<HttpResponse> {
    let json = serde_json::to_string(data).map_err(|e| anyhow!("Failed to serialize: {}", e))?;
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(full(json))
        .map_err(|e| anyhow!("Failed to build JSON response: {}", e))
}

/// Helper function to create an empty body
pub fn empty() -> HttpBody {
    Empty::<Bytes>::new().boxed()
}

/// Helper function to create a full body from various types
pub fn full<T: Into<Bytes>>(chunk: T) -> HttpBody {
    Full::new(chunk.into()).boxed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_paths_stay_inside_web_dir() {
        let root = Path::new("/srv/web");
        assert_eq!(
            resolve_static_path(root, "/static/app.css"),
            Some(PathBuf::from("/srv/web/static/app.css"))
        );
        assert_eq!(resolve_static_path(root, "/static/../secret.toml"), None);
        assert_eq!(resolve_static_path(root, "/static/./app.css"), None);
        assert_eq!(resolve_static_path(root, "/static\\..\\x"), None);
        assert_eq!(resolve_static_path(root, "/"), None);
    }

    #[tokio::test]
    async fn serves_existing_file_with_mime_and_cache() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("static")).unwrap();
        std::fs::write(dir.path().join("static/site.css"), "body{}").unwrap();

        let res = deliver_static_file(dir.path(), "/static/site.css")
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[header::CONTENT_TYPE], "text/css; charset=utf-8");
        assert!(
            res.headers()["cache-control"]
                .to_str()
                .unwrap()
                .contains("max-age=3600")
        );
    }

    #[tokio::test]
    async fn missing_file_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let res = deliver_static_file(dir.path(), "/static/nope.js")
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn redirect_carries_location_and_cookie() {
        let res = deliver_redirect_with_cookie(
            "/login",
            Some(HeaderValue::from_static("gameReviews=; Max-Age=0")),
        )
        .unwrap();
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(res.headers()[header::LOCATION], "/login");
        assert!(res.headers().contains_key(header::SET_COOKIE));
    }

    #[test]
    fn internal_error_is_500_html() {
        let res = internal_error();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(res.headers()[header::CONTENT_TYPE], "text/html; charset=utf-8");
    }
}
