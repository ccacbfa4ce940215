//! Table State Model
//!
//! Derived per-table view. Recomputed on every input change, never persisted.

use serde::{Deserialize, Serialize};

use super::dining_table::TableId;
use super::reservation::ReservationId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TableStatus {
    Available,
    /// Blocked for walk-ins and free (walk-in view only)
    AvailableForWalkin,
    Occupied,
    Reserved,
    Blocked,
}

/// Who holds a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Occupant {
    Reservation {
        reservation_id: ReservationId,
    },
    Order {
        order_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        reservation_id: Option<ReservationId>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableState {
    pub table_id: TableId,
    pub status: TableStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupant: Option<Occupant>,
}

impl TableState {
    pub fn available(table_id: TableId) -> Self {
        Self {
            table_id,
            status: TableStatus::Available,
            occupant: None,
        }
    }

    /// Reserved or occupied
    pub fn is_taken(&self) -> bool {
        matches!(self.status, TableStatus::Reserved | TableStatus::Occupied)
    }
}
