use std::collections::HashMap;

use bytes::Bytes;
use hyper::Uri;

/// Decode an `application/x-www-form-urlencoded` body. Later duplicates win.
pub fn parse_form(body: &Bytes) -> HashMap<String, String> {
    form_urlencoded::parse(body.as_ref())
        .into_owned()
        .collect::<HashMap<String, String>>()
}

pub fn query_params(uri: &Uri) -> HashMap<String, String> {
    uri.query()
        .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

/// Value of `:name`-style segment `index` in the request path.
pub fn path_segment(uri: &Uri, index: usize) -> Option<&str> {
    uri.path().split('/').filter(|s| !s.is_empty()).nth(index)
}
