/// Tower middleware wrapped around the router service.
pub mod timeout;

pub use timeout::{TimeoutLayer, TimeoutService};
