use std::convert::Infallible;

use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use hyper::{Request, Response};

pub mod account;
pub mod auth;
pub mod games;
pub mod routes;
pub mod utils;
pub mod views;

pub type HttpBody = BoxBody<Bytes, Infallible>;
pub type HttpResponse = Response<HttpBody>;
/// A request whose body the router has already read (bounded) into memory.
pub type HttpRequest = Request<Bytes>;
