pub mod client;
pub mod config;
pub mod dashboard;
pub mod dates;
pub mod error;
pub mod export;
pub mod geocode;
pub mod models;
pub mod report;
pub mod theme;

pub use error::{AppError, Result};
