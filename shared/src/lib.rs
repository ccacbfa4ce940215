//! Shared types for the floor workspace
//!
//! Plain data exchanged between the floor engine and the surfaces that call
//! it: tables, reservations, live orders, placements, per-table state and
//! the unified error type.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
pub use serde::{Deserialize, Serialize};
