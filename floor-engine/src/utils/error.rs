//! 引擎错误
//!
//! Business outcomes (capacity exceeded, reassignment conflicts, capacity
//! recommendations) are return values, not errors. What lands here are
//! malformed requests and collaborator failures.

use shared::error::{AppError, ErrorCode};
use shared::models::{PlacementParseError, TableId};
use thiserror::Error;

use crate::catalog::LayoutError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum FloorError {
    #[error("Table not found: {0}")]
    TableNotFound(TableId),

    #[error("Invalid placement: {0}")]
    InvalidPlacement(String),

    #[error("Combination not declared: {0}")]
    CombinationNotDeclared(String),

    #[error("Reservation not found: {0}")]
    ReservationNotFound(String),

    #[error("Table is occupied: {0}")]
    TableOccupied(TableId),

    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl From<FloorError> for AppError {
    fn from(err: FloorError) -> Self {
        match err {
            FloorError::TableNotFound(id) => AppError::table_not_found(id),
            FloorError::InvalidPlacement(key) => AppError::with_message(
                ErrorCode::InvalidPlacement,
                format!("Invalid table or combination key: {}", key),
            )
            .with_detail("key", key),
            FloorError::CombinationNotDeclared(key) => AppError::with_message(
                ErrorCode::CombinationNotDeclared,
                format!("Combination {} is not declared", key),
            )
            .with_detail("key", key),
            FloorError::ReservationNotFound(id) => AppError::reservation_not_found(id),
            FloorError::TableOccupied(id) => AppError::table_occupied(id),
            FloorError::Layout(e) => AppError::with_message(ErrorCode::LayoutInvalid, e.to_string()),
            FloorError::Store(e) => {
                tracing::error!(error = %e, "Floor store error occurred");
                AppError::storage(e.to_string())
            }
        }
    }
}

impl From<PlacementParseError> for FloorError {
    fn from(err: PlacementParseError) -> Self {
        FloorError::InvalidPlacement(err.to_string())
    }
}

pub type FloorResult<T> = Result<T, FloorError>;

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::Placement;

    #[test]
    fn test_into_app_error_codes() {
        let err: AppError = FloorError::TableNotFound(99).into();
        assert_eq!(err.code, ErrorCode::TableNotFound);

        let err: AppError = FloorError::CombinationNotDeclared("5+6".into()).into();
        assert_eq!(err.code, ErrorCode::CombinationNotDeclared);
        assert_eq!(err.details.unwrap().get("key").unwrap(), "5+6");

        let err: AppError = FloorError::from("2+x".parse::<Placement>().unwrap_err()).into();
        assert_eq!(err.code, ErrorCode::InvalidPlacement);

        let err: AppError = FloorError::Layout(LayoutError::DuplicateTable(3)).into();
        assert_eq!(err.code, ErrorCode::LayoutInvalid);

        let err: AppError = FloorError::Store(StoreError::Unavailable("down".into())).into();
        assert_eq!(err.code, ErrorCode::StorageError);
    }
}
