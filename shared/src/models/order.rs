//! Floor Order Model
//!
//! Subset of a live order the table view needs.

use serde::{Deserialize, Serialize};

use super::dining_table::TableId;

/// Order status as seen from the floor
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FloorOrderStatus {
    #[default]
    Active,
    Completed,
    Void,
    Moved,
    Merged,
}

/// Live order sitting at a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorOrder {
    pub id: String,
    #[serde(alias = "tableNumber")]
    pub table_number: TableId,
    #[serde(default)]
    pub status: FloorOrderStatus,
}

impl FloorOrder {
    pub fn active(id: impl Into<String>, table_number: TableId) -> Self {
        Self {
            id: id.into(),
            table_number,
            status: FloorOrderStatus::Active,
        }
    }

    /// Only active orders hold a table
    pub fn holds_table(&self) -> bool {
        self.status == FloorOrderStatus::Active
    }
}
