//! Floor Store (持久化接口)
//!
//! The engine itself never persists anything. [`FloorService`](crate::service::FloorService)
//! talks to whatever implements [`FloorStore`]: blocked-table snapshots per
//! (date, shift) and the accepted placement of each reservation.

use chrono::NaiveDate;
use dashmap::DashMap;
use shared::models::{BlockedTables, Placement, ReservationId, ServiceShift};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence seam owned by the caller
pub trait FloorStore: Send + Sync {
    /// Operator/engine blocks for a shift; empty when nothing was saved yet
    fn load_blocked_tables(&self, date: NaiveDate, shift: ServiceShift) -> StoreResult<BlockedTables>;

    fn save_blocked_tables(
        &self,
        date: NaiveDate,
        shift: ServiceShift,
        tables: &BlockedTables,
    ) -> StoreResult<()>;

    /// Stored table of a reservation, if any
    fn load_assignment(&self, reservation_id: &str) -> StoreResult<Option<Placement>>;

    /// `None` clears the reservation's table (evicted or unassigned)
    fn save_assignment(&self, reservation_id: &str, placement: Option<&Placement>) -> StoreResult<()>;

    /// 换桌写入: 先清被挤走的预订，再写目标桌，最后写保留桌
    ///
    /// No table is ever stored for two reservations in between. If a write
    /// fails, reservations already written get their earlier value back and
    /// the failing error is returned.
    fn save_reassignment(
        &self,
        date: NaiveDate,
        shift: ServiceShift,
        reservation_id: &str,
        target: &Placement,
        evicted: &[ReservationId],
        blocked: &BlockedTables,
    ) -> StoreResult<()> {
        let writes = evicted
            .iter()
            .map(|id| (id.as_str(), None))
            .chain(std::iter::once((reservation_id, Some(target))));

        let mut written: Vec<(&str, Option<Placement>)> = Vec::new();
        for (id, placement) in writes {
            let step = self.load_assignment(id).and_then(|previous| {
                self.save_assignment(id, placement)?;
                Ok(previous)
            });
            match step {
                Ok(previous) => written.push((id, previous)),
                Err(e) => {
                    restore_assignments(self, &written);
                    return Err(e);
                }
            }
        }

        if let Err(e) = self.save_blocked_tables(date, shift, blocked) {
            restore_assignments(self, &written);
            return Err(e);
        }
        Ok(())
    }
}

/// Undo in reverse write order. Failures are logged; the caller already has an error.
fn restore_assignments<S: FloorStore + ?Sized>(store: &S, written: &[(&str, Option<Placement>)]) {
    for (reservation_id, previous) in written.iter().rev() {
        if let Err(e) = store.save_assignment(reservation_id, previous.as_ref()) {
            error!(
                reservation_id = %reservation_id,
                error = %e,
                "Failed to restore assignment after aborted reassignment"
            );
        }
    }
}

/// In-process store, used by the binary and tests
#[derive(Debug, Default)]
pub struct MemoryFloorStore {
    blocked: DashMap<(NaiveDate, ServiceShift), BlockedTables>,
    assignments: DashMap<ReservationId, Placement>,
}

impl MemoryFloorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assignment(&self, reservation_id: &str) -> Option<Placement> {
        self.assignments.get(reservation_id).map(|p| p.value().clone())
    }

    /// Snapshot of every saved assignment, ordered by reservation id
    pub fn assignments(&self) -> BTreeMap<ReservationId, Placement> {
        self.assignments
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Saved assignments as JSON (`{"A": 8, "B": "2+3"}`)
    pub fn export_json(&self) -> StoreResult<String> {
        Ok(serde_json::to_string_pretty(&self.assignments())?)
    }
}

impl FloorStore for MemoryFloorStore {
    fn load_blocked_tables(&self, date: NaiveDate, shift: ServiceShift) -> StoreResult<BlockedTables> {
        Ok(self
            .blocked
            .get(&(date, shift))
            .map(|b| b.value().clone())
            .unwrap_or_default())
    }

    fn save_blocked_tables(
        &self,
        date: NaiveDate,
        shift: ServiceShift,
        tables: &BlockedTables,
    ) -> StoreResult<()> {
        self.blocked.insert((date, shift), tables.clone());
        Ok(())
    }

    fn load_assignment(&self, reservation_id: &str) -> StoreResult<Option<Placement>> {
        Ok(self.assignment(reservation_id))
    }

    fn save_assignment(&self, reservation_id: &str, placement: Option<&Placement>) -> StoreResult<()> {
        match placement {
            Some(p) => {
                self.assignments.insert(reservation_id.to_string(), p.clone());
            }
            None => {
                self.assignments.remove(reservation_id);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn test_blocked_tables_scoped_per_shift() {
        let store = MemoryFloorStore::new();
        let blocked: BlockedTables = [3, 12, 13].into_iter().collect();
        store
            .save_blocked_tables(date(), ServiceShift::Midday, &blocked)
            .unwrap();

        assert_eq!(
            store.load_blocked_tables(date(), ServiceShift::Midday).unwrap(),
            blocked
        );
        assert!(store
            .load_blocked_tables(date(), ServiceShift::Night)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_save_and_clear_assignment() {
        let store = MemoryFloorStore::new();
        store
            .save_assignment("A", Some(&Placement::combination([3, 2])))
            .unwrap();
        store.save_assignment("B", Some(&Placement::Single(8))).unwrap();
        assert_eq!(store.assignment("A"), Some(Placement::combination([2, 3])));

        store.save_assignment("B", None).unwrap();
        assert_eq!(store.assignment("B"), None);

        let json: serde_json::Value = serde_json::from_str(&store.export_json().unwrap()).unwrap();
        assert_eq!(json, serde_json::json!({"A": "2+3"}));
    }

    #[test]
    fn test_save_reassignment_moves_and_evicts() {
        let store = MemoryFloorStore::new();
        store.save_assignment("A", Some(&Placement::Single(8))).unwrap();
        store.save_assignment("B", Some(&Placement::Single(11))).unwrap();
        let blocked: BlockedTables = [8].into_iter().collect();

        store
            .save_reassignment(
                date(),
                ServiceShift::Night,
                "A",
                &Placement::Single(11),
                &["B".to_string()],
                &blocked,
            )
            .unwrap();

        assert_eq!(store.assignment("A"), Some(Placement::Single(11)));
        assert_eq!(store.assignment("B"), None);
        assert_eq!(
            store.load_blocked_tables(date(), ServiceShift::Night).unwrap(),
            blocked
        );
    }
}
