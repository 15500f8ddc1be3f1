// Core modules
pub mod error;
pub mod indicators;
pub mod instrument;
pub mod models;
pub mod settings;
pub mod strategy;
pub mod synthetic;

// Re-export commonly used types
pub use error::TraderError;
pub use instrument::{DayStep, Instrument};
pub use models::*;
pub use strategy::{Trader, TraderConfig};

// Error handling
pub type Result<T> = std::result::Result<T, TraderError>;
