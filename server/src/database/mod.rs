pub mod comments;
pub mod create;
pub mod ratings;
pub mod sessions;
pub mod users;
pub mod utils;

pub use create::{create_tables, open_pool};
