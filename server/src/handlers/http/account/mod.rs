pub mod overview;
pub mod password;
pub mod username;

pub use overview::{handle_account, handle_reviewed};
pub use password::{handle_change_password, handle_password_page};
pub use username::{handle_change_username, handle_username_page};
