pub mod cookie;
pub mod game;
pub mod login;
pub mod rating;
pub mod register;
pub mod server_config;

pub use self::cookie::CookiePayload;
pub use self::game::{GameDetail, GameList, GameSummary};
pub use self::login::{LoginData, LoginError};
pub use self::rating::{RatingScore, RatingTally, ReviewedGame};
pub use self::register::{RegistrationData, RegistrationError, ValidationOutcome};
pub use self::server_config::{AppConfig, ConfigError};
