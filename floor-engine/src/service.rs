//! Floor Service
//!
//! Glue between the pure engine and a [`FloorStore`]. Loads the stored
//! blocks for a shift, runs the engine, and persists what the operator
//! accepts. Every call recomputes from the inputs it is given.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use shared::models::{FloorOrder, Placement, Reservation, ServiceShift, TableId, TableState};
use tracing::{debug, info};

use crate::aggregate::{StateView, TableStateAggregator};
use crate::assignment::{AssignmentEngine, AssignmentOutcome};
use crate::audit_log;
use crate::catalog::TableCatalog;
use crate::core::AllocationPolicy;
use crate::reassign::{CapacityCheck, ManualReassignmentValidator, ReassignOutcome};
use crate::store::FloorStore;
use crate::utils::{AppError, AppResult, ErrorCode, FloorError};

/// Allocation for one (date, shift)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShiftPlan {
    pub date: NaiveDate,
    pub shift: ServiceShift,
    #[serde(flatten)]
    pub outcome: AssignmentOutcome,
}

pub struct FloorService<S: FloorStore> {
    catalog: Arc<TableCatalog>,
    policy: AllocationPolicy,
    store: Arc<S>,
}

impl<S: FloorStore> FloorService<S> {
    pub fn new(catalog: Arc<TableCatalog>, policy: AllocationPolicy, store: Arc<S>) -> Self {
        Self {
            catalog,
            policy,
            store,
        }
    }

    pub fn catalog(&self) -> &TableCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run the engine for a shift without persisting anything
    fn compute(
        &self,
        date: NaiveDate,
        shift: ServiceShift,
        reservations: &[Reservation],
    ) -> AppResult<(Vec<Reservation>, AssignmentOutcome)> {
        let scoped = for_shift(reservations, date, shift);
        let blocked = self
            .store
            .load_blocked_tables(date, shift)
            .map_err(FloorError::from)?;
        let outcome = AssignmentEngine::new(&self.catalog, self.policy).assign(&scoped, &blocked);
        Ok((scoped, outcome))
    }

    /// Assign the shift and save the re-derived walk-in blocks
    pub fn plan_shift(
        &self,
        date: NaiveDate,
        shift: ServiceShift,
        reservations: &[Reservation],
    ) -> AppResult<ShiftPlan> {
        let (_, outcome) = self.compute(date, shift, reservations)?;
        self.store
            .save_blocked_tables(date, shift, &outcome.plan.blocked_tables)
            .map_err(FloorError::from)?;

        info!(
            %date,
            %shift,
            assigned = outcome.plan.assignments.len(),
            unassigned = outcome.unassigned.len(),
            "Shift planned"
        );
        Ok(ShiftPlan {
            date,
            shift,
            outcome,
        })
    }

    /// Persist every placement of an accepted plan.
    ///
    /// Unassigned reservations get their stored table cleared, unless the
    /// same id was placed (duplicate entries).
    pub fn commit(&self, plan: &ShiftPlan) -> AppResult<usize> {
        let assignments = &plan.outcome.plan.assignments;
        for (reservation_id, placement) in assignments {
            self.store
                .save_assignment(reservation_id, Some(placement))
                .map_err(FloorError::from)?;
        }
        for unassigned in &plan.outcome.unassigned {
            if assignments.contains_key(&unassigned.reservation_id) {
                continue;
            }
            self.store
                .save_assignment(&unassigned.reservation_id, None)
                .map_err(FloorError::from)?;
        }
        debug!(date = %plan.date, shift = %plan.shift, "Shift plan committed");
        Ok(plan.outcome.plan.assignments.len())
    }

    /// Operator move. Persists only when the move is applied.
    #[allow(clippy::too_many_arguments)]
    pub fn reassign(
        &self,
        date: NaiveDate,
        shift: ServiceShift,
        reservations: &[Reservation],
        reservation_id: &str,
        target: &Placement,
        force: bool,
        operator: &str,
    ) -> AppResult<ReassignOutcome> {
        let (scoped, outcome) = self.compute(date, shift, reservations)?;
        let result = ManualReassignmentValidator::new(&self.catalog, self.policy).reassign(
            reservation_id,
            target,
            &scoped,
            &outcome.plan,
            force,
        )?;

        if let ReassignOutcome::Applied(applied) = &result {
            self.store
                .save_reassignment(
                    date,
                    shift,
                    reservation_id,
                    target,
                    &applied.evicted,
                    &applied.plan.blocked_tables,
                )
                .map_err(FloorError::from)?;

            let details = if applied.evicted.is_empty() {
                target.to_string()
            } else {
                format!("{} (forced, evicted {})", target, applied.evicted.join(", "))
            };
            audit_log!(
                operator,
                "reassign",
                format!("reservation:{}", reservation_id),
                details
            );
        }
        Ok(result)
    }

    /// Recommendation after a party size change on a placed reservation
    pub fn capacity_check(
        &self,
        date: NaiveDate,
        shift: ServiceShift,
        reservations: &[Reservation],
        reservation_id: &str,
        new_party_size: u32,
    ) -> AppResult<CapacityCheck> {
        if new_party_size == 0 {
            return Err(AppError::new(ErrorCode::InvalidPartySize)
                .with_detail("reservation_id", reservation_id));
        }
        let (scoped, outcome) = self.compute(date, shift, reservations)?;
        let reservation = scoped
            .iter()
            .find(|r| r.id == reservation_id)
            .ok_or_else(|| FloorError::ReservationNotFound(reservation_id.to_string()))?;

        Ok(ManualReassignmentValidator::new(&self.catalog, self.policy)
            .capacity_reassignment_needed(reservation, new_party_size, &outcome.plan))
    }

    /// Operator block toggle. Returns whether the table is now blocked.
    ///
    /// Tables holding a reservation cannot be blocked.
    pub fn toggle_block(
        &self,
        date: NaiveDate,
        shift: ServiceShift,
        reservations: &[Reservation],
        table_id: TableId,
        operator: &str,
    ) -> AppResult<bool> {
        if !self.catalog.contains(table_id) {
            return Err(FloorError::TableNotFound(table_id).into());
        }
        let mut blocked = self
            .store
            .load_blocked_tables(date, shift)
            .map_err(FloorError::from)?;

        let now_blocked = if blocked.remove(&table_id) {
            false
        } else {
            let (_, outcome) = self.compute(date, shift, reservations)?;
            if outcome.plan.occupied_tables().contains(&table_id) {
                return Err(FloorError::TableOccupied(table_id).into());
            }
            blocked.insert(table_id);
            true
        };

        self.store
            .save_blocked_tables(date, shift, &blocked)
            .map_err(FloorError::from)?;
        audit_log!(
            operator,
            if now_blocked { "block_table" } else { "unblock_table" },
            format!("table:{}", table_id)
        );
        Ok(now_blocked)
    }

    /// Per-table view using the stored blocks
    pub fn table_states(
        &self,
        date: NaiveDate,
        shift: ServiceShift,
        reservations: &[Reservation],
        orders: &[FloorOrder],
        view: StateView,
    ) -> AppResult<BTreeMap<TableId, TableState>> {
        let blocked = self
            .store
            .load_blocked_tables(date, shift)
            .map_err(FloorError::from)?;
        Ok(TableStateAggregator::new(&self.catalog).aggregate(
            reservations,
            orders,
            &blocked,
            date,
            shift,
            view,
        ))
    }
}

fn for_shift(reservations: &[Reservation], date: NaiveDate, shift: ServiceShift) -> Vec<Reservation> {
    reservations
        .iter()
        .filter(|r| r.is_in(date, shift))
        .cloned()
        .collect()
}
