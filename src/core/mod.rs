pub mod config;
pub mod error;
pub mod integration;
pub mod logging;

pub use self::config::{Config, OutputFormat};
pub use self::error::{ConsensusError, Result};
