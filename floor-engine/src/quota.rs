//! Walk-in Quota Redistribution (散客名额)
//!
//! Keeps a minimum number of seats blocked for guests without a reservation.
//! Runs after every allocation:
//!
//! 1. Blocked tables that became occupied are dropped.
//! 2. Declared rules fire in order. Conditions only look at occupancy, so a
//!    rule fires the same way no matter which tables are currently blocked.
//! 3. Free tables are blocked along the fallback order until the seat target
//!    is met or no free table is left. Tables released by a fired rule come
//!    last, so they stay free to be pushed together unless nothing else can
//!    reach the target.
//!
//! Heuristic, not optimal. Deterministic and idempotent.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use shared::models::{BlockedTables, TableId};
use tracing::{debug, warn};

use crate::catalog::TableCatalog;

/// Occupancy pattern a rule reacts to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuotaCondition {
    Occupied {
        table_id: TableId,
    },
    /// Every table of `capacity` is occupied, ignoring `except`
    AllOccupied {
        capacity: u32,
        #[serde(default)]
        except: Vec<TableId>,
    },
    All {
        conditions: Vec<QuotaCondition>,
    },
}

impl QuotaCondition {
    pub fn holds(&self, catalog: &TableCatalog, occupied: &BTreeSet<TableId>) -> bool {
        match self {
            QuotaCondition::Occupied { table_id } => occupied.contains(table_id),
            QuotaCondition::AllOccupied { capacity, except } => catalog
                .tables()
                .filter(|t| t.capacity == *capacity && !except.contains(&t.id))
                .all(|t| occupied.contains(&t.id)),
            QuotaCondition::All { conditions } => {
                conditions.iter().all(|c| c.holds(catalog, occupied))
            }
        }
    }

    fn collect_tables(&self, out: &mut Vec<TableId>) {
        match self {
            QuotaCondition::Occupied { table_id } => out.push(*table_id),
            QuotaCondition::AllOccupied { except, .. } => out.extend(except.iter().copied()),
            QuotaCondition::All { conditions } => {
                for c in conditions {
                    c.collect_tables(out);
                }
            }
        }
    }
}

/// Tables to block (when free) and tables to hand back
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaAction {
    #[serde(default)]
    pub block: Vec<TableId>,
    #[serde(default)]
    pub release: Vec<TableId>,
}

/// `when` → `then`, evaluated in declaration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaRule {
    pub name: String,
    pub when: QuotaCondition,
    pub then: QuotaAction,
}

impl QuotaRule {
    /// Every table id the rule mentions
    pub fn referenced_tables(&self) -> Vec<TableId> {
        let mut ids = Vec::new();
        self.when.collect_tables(&mut ids);
        ids.extend(self.then.block.iter().copied());
        ids.extend(self.then.release.iter().copied());
        ids
    }
}

pub struct QuotaRedistributor<'a> {
    catalog: &'a TableCatalog,
    min_seats: u32,
}

impl<'a> QuotaRedistributor<'a> {
    pub fn new(catalog: &'a TableCatalog, min_seats: u32) -> Self {
        Self { catalog, min_seats }
    }

    /// Seats held by blocked tables that are not occupied
    pub fn walkin_capacity(&self, occupied: &BTreeSet<TableId>, blocked: &BlockedTables) -> u32 {
        self.catalog
            .seats_of(blocked.iter().filter(|id| !occupied.contains(id)))
    }

    pub fn redistribute(
        &self,
        occupied: &BTreeSet<TableId>,
        blocked: &BlockedTables,
    ) -> BlockedTables {
        let mut result: BlockedTables = blocked
            .iter()
            .copied()
            .filter(|id| !occupied.contains(id) && self.catalog.contains(*id))
            .collect();
        let mut held_back: BTreeSet<TableId> = BTreeSet::new();

        for rule in self.catalog.quota_rules() {
            if !rule.when.holds(self.catalog, occupied) {
                continue;
            }
            debug!(rule = %rule.name, block = ?rule.then.block, release = ?rule.then.release, "Quota rule fired");
            for id in &rule.then.release {
                result.remove(id);
                held_back.insert(*id);
            }
            for id in &rule.then.block {
                if !occupied.contains(id) {
                    result.insert(*id);
                    held_back.remove(id);
                }
            }
        }

        let mut seats = self.catalog.seats_of(result.iter());
        if seats < self.min_seats {
            let listed: BTreeSet<TableId> =
                self.catalog.fallback_block_order().iter().copied().collect();
            let order: Vec<TableId> = self
                .catalog
                .fallback_block_order()
                .iter()
                .copied()
                .chain(self.catalog.table_ids().filter(|id| !listed.contains(id)))
                .collect();
            let (released, regular): (Vec<TableId>, Vec<TableId>) =
                order.into_iter().partition(|id| held_back.contains(id));

            for id in regular.into_iter().chain(released) {
                if seats >= self.min_seats {
                    break;
                }
                if occupied.contains(&id) || result.contains(&id) {
                    continue;
                }
                if held_back.contains(&id) {
                    debug!(table_id = id, "Re-blocking released table to reach walk-in quota");
                }
                result.insert(id);
                seats += self.catalog.capacity_of(id).unwrap_or(0);
            }
        }

        if seats < self.min_seats {
            warn!(
                seats,
                target = self.min_seats,
                "Walk-in quota not reachable, no free tables left to block"
            );
        }

        result
    }
}
