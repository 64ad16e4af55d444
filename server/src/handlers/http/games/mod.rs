use anyhow::{Result, anyhow};

use crate::handlers::http::HttpRequest;
use crate::handlers::http::utils::path_segment;

pub mod browse;
pub mod comments;
pub mod detail;

pub use browse::{handle_index, handle_search};
pub use comments::{handle_comments, handle_post_comment};
pub use detail::{handle_game, handle_rate};

/// The `:id` of `/game/:id...` routes.
fn game_id(req: &HttpRequest) -> Result<String> {
    path_segment(req.uri(), 1)
        .map(str::to_string)
        .ok_or_else(|| anyhow!("Route matched without a game id"))
}
