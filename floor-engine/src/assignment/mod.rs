//! Assignment Engine (自动排桌)
//!
//! Chronological greedy allocator for one (date, shift). Earlier parties get
//! first claim on preferred tables. Pure: inputs are never mutated and every
//! call recomputes the whole shift from scratch.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use shared::models::{
    Assignments, BlockedTables, FloorPlan, Placement, Reservation, ReservationId, TableId,
    occupied_tables,
};
use tracing::{debug, error, info, warn};

use crate::catalog::TableCatalog;
use crate::combination::{BlockPolicy, suggest_combination};
use crate::core::{AllocationPolicy, InvariantPolicy};
use crate::quota::QuotaRedistributor;
use crate::tier;


/// Why a reservation was left without a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnassignedReason {
    /// Every candidate and combination is taken
    CapacityExceeded,
    /// No declared tier seats the party
    UnknownTier,
    InvalidPartySize,
    /// Same id seen earlier in the shift; only the first one is placed
    DuplicateReservationId,
    /// Dropped because its tables were already claimed
    DoubleBooked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unassigned {
    pub reservation_id: ReservationId,
    pub party_size: u32,
    pub reason: UnassignedReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentOutcome {
    pub plan: FloorPlan,
    /// Chronological order
    pub unassigned: Vec<Unassigned>,
}

/// Which step produced a placement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementSource {
    /// Free, unblocked tier candidate
    Candidate,
    /// Free, unblocked combination
    Combination,
    /// Candidate taken from the walk-in reserve
    BlockedCandidate,
    /// Combination with members taken from the walk-in reserve
    BlockedCombination,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementDecision {
    pub placement: Placement,
    /// Tables that must leave the blocked set
    pub released_blocks: Vec<TableId>,
    pub source: PlacementSource,
}

/// Working state of one allocation pass
#[derive(Default)]
struct Allocation {
    claims: Vec<(ReservationId, Placement)>,
    occupied: BTreeSet<TableId>,
    blocked: BlockedTables,
}

impl Allocation {
    fn is_free(&self, placement: &Placement) -> bool {
        placement.tables().iter().all(|id| !self.occupied.contains(id))
    }

    fn place(&mut self, reservation_id: &str, placement: Placement) {
        for id in placement.tables() {
            self.occupied.insert(*id);
            self.blocked.remove(id);
        }
        self.claims.push((reservation_id.to_string(), placement));
    }
}

pub struct AssignmentEngine<'a> {
    catalog: &'a TableCatalog,
    policy: AllocationPolicy,
}

impl<'a> AssignmentEngine<'a> {
    pub fn new(catalog: &'a TableCatalog, policy: AllocationPolicy) -> Self {
        Self { catalog, policy }
    }

    pub fn catalog(&self) -> &'a TableCatalog {
        self.catalog
    }

    pub fn policy(&self) -> AllocationPolicy {
        self.policy
    }

    /// Assign every reservation of a shift, then re-derive the walk-in set.
    ///
    /// Reservations with a persisted placement that is still valid and free
    /// keep it; everyone else goes through the greedy pass.
    pub fn assign(&self, reservations: &[Reservation], blocked: &BlockedTables) -> AssignmentOutcome {
        let ordered = chronological(reservations);
        let mut state = Allocation {
            blocked: blocked.clone(),
            ..Default::default()
        };
        let mut unassigned = Vec::new();
        let mut pending = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();

        for reservation in ordered {
            if !seen.insert(reservation.id.as_str()) {
                warn!(reservation_id = %reservation.id, "Duplicate reservation id ignored");
                unassigned.push(Unassigned {
                    reservation_id: reservation.id.clone(),
                    party_size: reservation.party_size,
                    reason: UnassignedReason::DuplicateReservationId,
                });
                continue;
            }
            match &reservation.assigned_table {
                Some(placement)
                    if self.catalog.is_valid_placement(placement) && state.is_free(placement) =>
                {
                    debug!(reservation_id = %reservation.id, placement = %placement, "Keeping persisted placement");
                    state.place(&reservation.id, placement.clone());
                }
                Some(placement) => {
                    warn!(
                        reservation_id = %reservation.id,
                        placement = %placement,
                        "Persisted placement unusable, reassigning"
                    );
                    pending.push(reservation);
                }
                None => pending.push(reservation),
            }
        }

        for reservation in pending {
            match self.best_placement(reservation.party_size, &state.occupied, &state.blocked) {
                Ok(decision) => {
                    debug!(
                        reservation_id = %reservation.id,
                        party_size = reservation.party_size,
                        placement = %decision.placement,
                        source = ?decision.source,
                        "Reservation placed"
                    );
                    state.place(&reservation.id, decision.placement);
                }
                Err(reason) => {
                    warn!(
                        reservation_id = %reservation.id,
                        party_size = reservation.party_size,
                        reason = ?reason,
                        "Reservation left unassigned"
                    );
                    unassigned.push(Unassigned {
                        reservation_id: reservation.id.clone(),
                        party_size: reservation.party_size,
                        reason,
                    });
                }
            }
        }

        let (assignments, dropped) = enforce_exclusive(state.claims, self.policy.invariant_policy);
        for reservation_id in dropped {
            let party_size = reservations
                .iter()
                .find(|r| r.id == reservation_id)
                .map(|r| r.party_size)
                .unwrap_or(0);
            unassigned.push(Unassigned {
                reservation_id,
                party_size,
                reason: UnassignedReason::DoubleBooked,
            });
        }
        let occupied = occupied_tables(&assignments);
        let blocked_tables = QuotaRedistributor::new(self.catalog, self.policy.walkin_min_seats)
            .redistribute(&occupied, &state.blocked);

        info!(
            reservations = reservations.len(),
            assigned = assignments.len(),
            unassigned = unassigned.len(),
            blocked = ?blocked_tables,
            "Shift allocation computed"
        );

        AssignmentOutcome {
            plan: FloorPlan::new(assignments, blocked_tables),
            unassigned,
        }
    }

    /// Best placement for one party given current occupancy and blocks.
    ///
    /// Order: free candidate, free combination (large parties), blocked
    /// candidate, combination using blocked members (large parties).
    pub fn best_placement(
        &self,
        party_size: u32,
        occupied: &BTreeSet<TableId>,
        blocked: &BlockedTables,
    ) -> Result<PlacementDecision, UnassignedReason> {
        if party_size == 0 {
            return Err(UnassignedReason::InvalidPartySize);
        }
        let resolution =
            tier::resolve(self.catalog, party_size).ok_or(UnassignedReason::UnknownTier)?;
        let wants_combination = party_size >= self.policy.combination_min_party;

        let free = |id: &&TableId| !occupied.contains(*id);

        if let Some(&id) = resolution
            .candidates
            .iter()
            .filter(free)
            .find(|id| !blocked.contains(*id))
        {
            return Ok(PlacementDecision {
                placement: Placement::Single(id),
                released_blocks: Vec::new(),
                source: PlacementSource::Candidate,
            });
        }

        if wants_combination
            && let Some(s) =
                suggest_combination(self.catalog, party_size, occupied, blocked, BlockPolicy::Respect)
        {
            return Ok(PlacementDecision {
                placement: s.placement,
                released_blocks: Vec::new(),
                source: PlacementSource::Combination,
            });
        }

        // A reservation outranks the walk-in reserve
        if let Some(&id) = resolution.candidates.iter().find(free) {
            return Ok(PlacementDecision {
                placement: Placement::Single(id),
                released_blocks: vec![id],
                source: PlacementSource::BlockedCandidate,
            });
        }

        if wants_combination
            && let Some(s) =
                suggest_combination(self.catalog, party_size, occupied, blocked, BlockPolicy::Override)
        {
            return Ok(PlacementDecision {
                placement: s.placement,
                released_blocks: s.blocked_members,
                source: PlacementSource::BlockedCombination,
            });
        }

        Err(UnassignedReason::CapacityExceeded)
    }
}

/// Reservations sorted by time slot; ties keep input order
pub fn chronological(reservations: &[Reservation]) -> Vec<&Reservation> {
    let mut ordered: Vec<&Reservation> = reservations.iter().collect();
    ordered.sort_by_key(|r| r.time_slot);
    ordered
}

/// Build the assignment map, refusing any table claimed twice.
///
/// Claims are in processing order; on a clash the later claim loses and its
/// id is returned alongside the map.
pub fn enforce_exclusive(
    claims: Vec<(ReservationId, Placement)>,
    policy: InvariantPolicy,
) -> (Assignments, Vec<ReservationId>) {
    let mut owners: BTreeMap<TableId, ReservationId> = BTreeMap::new();
    let mut assignments = Assignments::new();
    let mut dropped = Vec::new();

    for (reservation_id, placement) in claims {
        let clash = placement
            .tables()
            .iter()
            .find_map(|id| owners.get(id).map(|owner| (*id, owner.clone())));

        if let Some((table_id, owner)) = clash {
            match policy {
                InvariantPolicy::Panic => panic!(
                    "table {} double-booked by reservations {} and {}",
                    table_id, owner, reservation_id
                ),
                InvariantPolicy::LogAndDrop => {
                    error!(
                        table_id,
                        kept = %owner,
                        dropped = %reservation_id,
                        "Double booking detected, dropping later assignment"
                    );
                    dropped.push(reservation_id);
                    continue;
                }
            }
        }

        for id in placement.tables() {
            owners.insert(*id, reservation_id.clone());
        }
        assignments.insert(reservation_id, placement);
    }

    (assignments, dropped)
}
