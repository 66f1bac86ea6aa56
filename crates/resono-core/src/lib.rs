//! Core domain types for the resono audio service.
//!
//! Shared by the storage, database, processing and service crates: domain
//! models (tracks, feature vectors, listen telemetry, analytics payloads),
//! the unified [`AppError`] type, env-driven configuration, and input
//! validation for the read surface (periods, day windows).

pub mod config;
pub mod error;
pub mod models;
pub mod telemetry;
pub mod validation;

pub use config::ServiceConfig;
pub use error::AppError;
pub use validation::Period;
