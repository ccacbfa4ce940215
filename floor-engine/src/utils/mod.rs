//! 工具模块 - 错误类型与日志
//!
//! - [`FloorError`] - 引擎错误 (转换为 shared::error::AppError)
//! - [`logger`] - tracing 日志初始化

pub mod error;
pub mod logger;

pub use error::{FloorError, FloorResult};
pub use shared::error::{AppError, AppResult, ErrorCategory, ErrorCode};
