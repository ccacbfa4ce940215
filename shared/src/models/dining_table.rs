//! Dining Table Model

use serde::{Deserialize, Serialize};

/// Table identity as used throughout the floor (mesa number)
pub type TableId = i64;

/// Physical dining table (桌台)
///
/// Immutable once the floor layout is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub id: TableId,
    /// Seats at the bare table (2, 4 or 6 in the house layout)
    pub capacity: u32,
    /// Tables this one may be pushed together with
    #[serde(default)]
    pub partners: Vec<TableId>,
}

impl Table {
    pub fn new(id: TableId, capacity: u32) -> Self {
        Self {
            id,
            capacity,
            partners: Vec::new(),
        }
    }

    pub fn with_partners(mut self, partners: impl IntoIterator<Item = TableId>) -> Self {
        self.partners = partners.into_iter().collect();
        self
    }
}
