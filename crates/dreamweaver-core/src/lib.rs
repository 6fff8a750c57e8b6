pub mod config;
pub mod error;
pub mod types;

pub use config::DreamweaverConfig;
pub use error::{DreamweaverError, Result};
pub use types::*;
