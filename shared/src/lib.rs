//! Configuration and domain types for the GameReviews server.
//!
//! Nothing in here performs I/O beyond reading the config file; the server
//! crate owns persistence, HTTP and the session core.

pub mod config;
pub mod types;
