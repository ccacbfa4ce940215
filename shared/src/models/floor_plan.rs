//! Floor Plan Model
//!
//! Output of one (date, shift) computation: who sits where, and which free
//! tables are held back for walk-ins. Ordered collections keep iteration
//! deterministic.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::dining_table::TableId;
use super::placement::Placement;
use super::reservation::ReservationId;

pub type Assignments = BTreeMap<ReservationId, Placement>;
pub type BlockedTables = BTreeSet<TableId>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorPlan {
    pub assignments: Assignments,
    pub blocked_tables: BlockedTables,
}

impl FloorPlan {
    pub fn new(assignments: Assignments, blocked_tables: BlockedTables) -> Self {
        Self {
            assignments,
            blocked_tables,
        }
    }

    /// Every table held by an assignment, combination members included
    pub fn occupied_tables(&self) -> BTreeSet<TableId> {
        occupied_tables(&self.assignments)
    }

    /// Reservation holding `table_id`, if any
    pub fn owner_of(&self, table_id: TableId) -> Option<&ReservationId> {
        self.assignments
            .iter()
            .find(|(_, placement)| placement.contains(table_id))
            .map(|(id, _)| id)
    }
}

pub fn occupied_tables(assignments: &Assignments) -> BTreeSet<TableId> {
    assignments
        .values()
        .flat_map(|p| p.tables().iter().copied())
        .collect()
}
