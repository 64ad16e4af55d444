pub mod deliver_page;
pub mod forms;
pub mod headers;

// Re-export commonly used utilities
pub use deliver_page::*;
pub use forms::*;
