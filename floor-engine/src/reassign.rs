//! Manual Reassignment (手动换桌)
//!
//! Operator moves one reservation to an explicit table or combination. A
//! target held by someone else is reported as a conflict unless the operator
//! confirms with `force`, in which case the holders become unassigned.
//!
//! Every call returns either the untouched plan (conflict) or a complete new
//! plan. There is no partially applied state.

use std::collections::BTreeSet;

use serde::Serialize;
use shared::models::{FloorPlan, Placement, Reservation, ReservationId, TableId};
use tracing::{debug, info};

use crate::assignment::{AssignmentEngine, UnassignedReason};
use crate::catalog::TableCatalog;
use crate::core::AllocationPolicy;
use crate::utils::{FloorError, FloorResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReassignConflict {
    pub occupying_reservation_id: ReservationId,
    pub table_id: TableId,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReassignApplied {
    pub plan: FloorPlan,
    /// Reservations that lost their table to a forced move
    pub evicted: Vec<ReservationId>,
    /// Target tables that were held for walk-ins
    pub released_blocks: Vec<TableId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ReassignOutcome {
    Applied(ReassignApplied),
    Conflict(ReassignConflict),
}

impl ReassignOutcome {
    pub fn is_conflict(&self) -> bool {
        matches!(self, ReassignOutcome::Conflict(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityStatus {
    NoTableAssigned,
    CurrentTableSufficient,
    InsufficientCapacity,
}

/// Recommendation after a party size change. Never applied automatically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapacityCheck {
    pub status: CapacityStatus,
    pub current: Option<Placement>,
    pub current_capacity: Option<u32>,
    pub suggestion: Option<Placement>,
    /// Walk-in tables the suggestion would consume
    pub suggestion_releases_blocks: Vec<TableId>,
    /// Why no suggestion could be made
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unavailable_reason: Option<UnassignedReason>,
}

pub struct ManualReassignmentValidator<'a> {
    catalog: &'a TableCatalog,
    policy: AllocationPolicy,
}

impl<'a> ManualReassignmentValidator<'a> {
    pub fn new(catalog: &'a TableCatalog, policy: AllocationPolicy) -> Self {
        Self { catalog, policy }
    }

    /// Parse an operator-supplied key (`"11"`, `"2+3"`) into a valid target
    pub fn parse_target(&self, key: &str) -> FloorResult<Placement> {
        let target: Placement = key.parse()?;
        self.validate_target(&target)?;
        Ok(target)
    }

    /// Unknown tables and undeclared combinations are request errors
    pub fn validate_target(&self, target: &Placement) -> FloorResult<()> {
        if let Placement::Combination(members) = target
            && (members.len() < 2 || !members.windows(2).all(|w| w[0] < w[1]))
        {
            return Err(FloorError::InvalidPlacement(target.to_string()));
        }
        if let Some(id) = target.tables().iter().find(|id| !self.catalog.contains(**id)) {
            return Err(FloorError::TableNotFound(*id));
        }
        if target.is_combination() && self.catalog.combination_for(target).is_none() {
            return Err(FloorError::CombinationNotDeclared(target.to_string()));
        }
        Ok(())
    }

    /// Move `reservation_id` onto `target` within `plan`.
    ///
    /// `reservations` is the shift's reservation list; the id must be in it.
    pub fn reassign(
        &self,
        reservation_id: &str,
        target: &Placement,
        reservations: &[Reservation],
        plan: &FloorPlan,
        force: bool,
    ) -> FloorResult<ReassignOutcome> {
        self.validate_target(target)?;
        if !reservations.iter().any(|r| r.id == reservation_id) {
            return Err(FloorError::ReservationNotFound(reservation_id.to_string()));
        }

        // target members are sorted, so the first hit is the lowest table id
        let conflict = target.tables().iter().find_map(|id| {
            plan.owner_of(*id)
                .filter(|owner| owner.as_str() != reservation_id)
                .map(|owner| (*id, owner.clone()))
        });

        if let Some((table_id, owner)) = &conflict
            && !force
        {
            debug!(reservation_id, target = %target, occupied_by = %owner, "Reassignment conflict");
            return Ok(ReassignOutcome::Conflict(ReassignConflict {
                occupying_reservation_id: owner.clone(),
                table_id: *table_id,
                message: format!(
                    "Table {} is already assigned to reservation {}",
                    table_id, owner
                ),
            }));
        }

        let evicted: Vec<ReservationId> = plan
            .assignments
            .iter()
            .filter(|(id, placement)| id.as_str() != reservation_id && placement.overlaps(target))
            .map(|(id, _)| id.clone())
            .collect();

        let mut assignments = plan.assignments.clone();
        for id in &evicted {
            assignments.remove(id);
        }
        assignments.insert(reservation_id.to_string(), target.clone());

        let released_blocks: Vec<TableId> = target
            .tables()
            .iter()
            .copied()
            .filter(|id| plan.blocked_tables.contains(id))
            .collect();
        let mut blocked_tables = plan.blocked_tables.clone();
        for id in &released_blocks {
            blocked_tables.remove(id);
        }

        info!(
            reservation_id,
            target = %target,
            evicted = ?evicted,
            released_blocks = ?released_blocks,
            "Reservation reassigned"
        );

        Ok(ReassignOutcome::Applied(ReassignApplied {
            plan: FloorPlan::new(assignments, blocked_tables),
            evicted,
            released_blocks,
        }))
    }

    /// Whether a party size change outgrows the current table.
    ///
    /// The suggestion is computed against `plan` with the reservation's own
    /// tables freed, using the same steps as the automatic pass.
    pub fn capacity_reassignment_needed(
        &self,
        reservation: &Reservation,
        new_party_size: u32,
        plan: &FloorPlan,
    ) -> CapacityCheck {
        let current = plan
            .assignments
            .get(&reservation.id)
            .or(reservation.assigned_table.as_ref())
            .cloned();
        let current_capacity = current
            .as_ref()
            .and_then(|p| self.catalog.placement_capacity(p));

        let status = match (&current, current_capacity) {
            (None, _) => CapacityStatus::NoTableAssigned,
            (Some(_), Some(capacity)) if capacity >= new_party_size => {
                CapacityStatus::CurrentTableSufficient
            }
            (Some(_), _) => CapacityStatus::InsufficientCapacity,
        };

        let mut check = CapacityCheck {
            status,
            current: current.clone(),
            current_capacity,
            suggestion: None,
            suggestion_releases_blocks: Vec::new(),
            unavailable_reason: None,
        };
        if status == CapacityStatus::CurrentTableSufficient {
            return check;
        }

        let own: BTreeSet<TableId> = current
            .iter()
            .flat_map(|p| p.tables().iter().copied())
            .collect();
        let occupied: BTreeSet<TableId> = plan.occupied_tables().difference(&own).copied().collect();

        match AssignmentEngine::new(self.catalog, self.policy).best_placement(
            new_party_size,
            &occupied,
            &plan.blocked_tables,
        ) {
            Ok(decision) => {
                check.suggestion = Some(decision.placement);
                check.suggestion_releases_blocks = decision.released_blocks;
            }
            Err(reason) => check.unavailable_reason = Some(reason),
        }
        check
    }
}
