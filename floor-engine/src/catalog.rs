//! Table Catalog
//!
//! Static description of the floor: tables, capacity tiers with their
//! priority lists, declared combinations and walk-in quota rules. Loaded
//! once and never mutated while the engine runs.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use shared::models::{Placement, Table, TableId};
use thiserror::Error;

use crate::quota::{QuotaAction, QuotaCondition, QuotaRule};

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("Duplicate table id: {0}")]
    DuplicateTable(TableId),

    #[error("Table {0} has zero capacity")]
    ZeroCapacity(TableId),

    #[error("Unknown table {table_id} referenced by {context}")]
    UnknownTable { table_id: TableId, context: String },

    #[error("Combination {0} needs at least two distinct tables")]
    CombinationTooSmall(String),

    #[error("Duplicate tier capacity: {0}")]
    DuplicateTier(u32),

    #[error("Failed to read layout: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse layout: {0}")]
    Json(#[from] serde_json::Error),
}

/// Capacity tier with its priority-ordered candidate list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierRule {
    pub capacity: u32,
    /// Tried first to last
    #[serde(default)]
    pub priority: Vec<TableId>,
}

/// Declared merge of tables into one larger unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinationRule {
    pub members: Vec<TableId>,
    pub combined_capacity: u32,
}

impl CombinationRule {
    pub fn new(members: impl IntoIterator<Item = TableId>, combined_capacity: u32) -> Self {
        Self {
            members: members.into_iter().collect(),
            combined_capacity,
        }
    }

    pub fn placement(&self) -> Placement {
        Placement::combination(self.members.iter().copied())
    }
}

/// Deployment-specific floor description (serde document)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorLayout {
    pub tables: Vec<Table>,
    #[serde(default)]
    pub tiers: Vec<TierRule>,
    /// Declaration order is suggestion order
    #[serde(default)]
    pub combinations: Vec<CombinationRule>,
    #[serde(default)]
    pub quota_rules: Vec<QuotaRule>,
    /// Order in which free tables are blocked to reach the walk-in target
    #[serde(default)]
    pub fallback_block_order: Vec<TableId>,
}

impl FloorLayout {
    pub fn from_json_str(json: &str) -> Result<Self, LayoutError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, LayoutError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}

impl Default for FloorLayout {
    /// House layout: 17 tables on one floor
    fn default() -> Self {
        let mut tables: Vec<Table> = Vec::new();
        for id in [1, 8, 11, 21, 31] {
            tables.push(Table::new(id, 2));
        }
        tables.push(Table::new(2, 2).with_partners([3]));
        tables.push(Table::new(14, 2).with_partners([24]));
        tables.push(Table::new(24, 2).with_partners([14]));
        tables.push(Table::new(3, 4).with_partners([2]));
        for id in [4, 5, 6, 9, 10] {
            tables.push(Table::new(id, 4));
        }
        tables.push(Table::new(12, 4).with_partners([13]));
        tables.push(Table::new(13, 4).with_partners([12]));
        tables.push(Table::new(7, 6));

        Self {
            tables,
            tiers: vec![
                TierRule {
                    capacity: 2,
                    priority: vec![8, 11, 21, 1, 31, 2, 14, 24],
                },
                TierRule {
                    capacity: 4,
                    priority: vec![9, 10, 4, 5, 6, 12, 13, 3],
                },
                TierRule {
                    capacity: 6,
                    priority: vec![7],
                },
            ],
            combinations: vec![
                CombinationRule::new([2, 3], 6),
                CombinationRule::new([12, 13], 8),
                CombinationRule::new([14, 24], 4),
            ],
            quota_rules: vec![QuotaRule {
                name: "last-two-top-taken".to_string(),
                when: QuotaCondition::All {
                    conditions: vec![
                        QuotaCondition::Occupied { table_id: 21 },
                        QuotaCondition::AllOccupied {
                            capacity: 2,
                            except: vec![14, 24],
                        },
                    ],
                },
                then: QuotaAction {
                    block: vec![3],
                    release: vec![14, 24],
                },
            }],
            fallback_block_order: vec![3, 13, 12, 6, 5, 4, 10, 9, 24, 14, 31, 1, 21, 11, 8, 2, 7],
        }
    }
}

/// Read-only lookup over a validated [`FloorLayout`]
#[derive(Debug, Clone)]
pub struct TableCatalog {
    tables: BTreeMap<TableId, Table>,
    /// Ascending by capacity
    tiers: Vec<TierRule>,
    combinations: Vec<CombinationRule>,
    quota_rules: Vec<QuotaRule>,
    fallback_block_order: Vec<TableId>,
}

impl TableCatalog {
    pub fn new(layout: FloorLayout) -> Result<Self, LayoutError> {
        let mut tables = BTreeMap::new();
        for table in layout.tables {
            if table.capacity == 0 {
                return Err(LayoutError::ZeroCapacity(table.id));
            }
            let id = table.id;
            if tables.insert(id, table).is_some() {
                return Err(LayoutError::DuplicateTable(id));
            }
        }

        let known = |table_id: TableId, context: &str| -> Result<(), LayoutError> {
            if tables.contains_key(&table_id) {
                Ok(())
            } else {
                Err(LayoutError::UnknownTable {
                    table_id,
                    context: context.to_string(),
                })
            }
        };

        let mut links: BTreeSet<(TableId, TableId)> = BTreeSet::new();
        for table in tables.values() {
            for &partner in &table.partners {
                known(partner, &format!("partners of table {}", table.id))?;
                links.insert((table.id, partner));
            }
        }

        for combo in &layout.combinations {
            let placement = combo.placement();
            if !placement.is_combination() {
                return Err(LayoutError::CombinationTooSmall(placement.to_string()));
            }
            for &member in placement.tables() {
                known(member, &format!("combination {}", placement))?;
            }
            for &a in placement.tables() {
                for &b in placement.tables() {
                    if a != b {
                        links.insert((a, b));
                    }
                }
            }
        }

        let mut seen_tiers = BTreeSet::new();
        for tier in &layout.tiers {
            if !seen_tiers.insert(tier.capacity) {
                return Err(LayoutError::DuplicateTier(tier.capacity));
            }
            for &id in &tier.priority {
                known(id, &format!("tier {}", tier.capacity))?;
            }
        }

        for rule in &layout.quota_rules {
            let context = format!("quota rule {}", rule.name);
            for id in rule.referenced_tables() {
                known(id, &context)?;
            }
        }

        for &id in &layout.fallback_block_order {
            known(id, "fallback block order")?;
        }

        // Partners are symmetric
        for table in tables.values_mut() {
            table.partners.clear();
        }
        for (a, b) in links {
            for (from, to) in [(a, b), (b, a)] {
                if let Some(table) = tables.get_mut(&from)
                    && !table.partners.contains(&to)
                {
                    table.partners.push(to);
                }
            }
        }
        for table in tables.values_mut() {
            table.partners.sort_unstable();
        }

        let mut tiers = layout.tiers;
        tiers.sort_by_key(|t| t.capacity);

        Ok(Self {
            tables,
            tiers,
            combinations: layout.combinations,
            quota_rules: layout.quota_rules,
            fallback_block_order: layout.fallback_block_order,
        })
    }

    pub fn by_id(&self, id: TableId) -> Option<&Table> {
        self.tables.get(&id)
    }

    pub fn contains(&self, id: TableId) -> bool {
        self.tables.contains_key(&id)
    }

    pub fn capacity_of(&self, id: TableId) -> Option<u32> {
        self.tables.get(&id).map(|t| t.capacity)
    }

    pub fn partners_of(&self, id: TableId) -> &[TableId] {
        self.tables
            .get(&id)
            .map(|t| t.partners.as_slice())
            .unwrap_or(&[])
    }

    /// Tables in id order
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    pub fn table_ids(&self) -> impl Iterator<Item = TableId> + '_ {
        self.tables.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn tiers(&self) -> &[TierRule] {
        &self.tiers
    }

    pub fn combinations(&self) -> &[CombinationRule] {
        &self.combinations
    }

    pub fn quota_rules(&self) -> &[QuotaRule] {
        &self.quota_rules
    }

    pub fn fallback_block_order(&self) -> &[TableId] {
        &self.fallback_block_order
    }

    /// Declared combination matching `placement`, if it is one
    pub fn combination_for(&self, placement: &Placement) -> Option<&CombinationRule> {
        if !placement.is_combination() {
            return None;
        }
        self.combinations
            .iter()
            .find(|c| c.placement() == *placement)
    }

    /// Seats offered by a single table or a declared combination
    pub fn placement_capacity(&self, placement: &Placement) -> Option<u32> {
        match placement {
            Placement::Single(id) => self.capacity_of(*id),
            Placement::Combination(_) => self
                .combination_for(placement)
                .map(|c| c.combined_capacity),
        }
    }

    /// Whether every table of `placement` exists and combinations are declared
    pub fn is_valid_placement(&self, placement: &Placement) -> bool {
        placement.tables().iter().all(|id| self.contains(*id))
            && (!placement.is_combination() || self.combination_for(placement).is_some())
    }

    /// Sum of capacities of the given tables (unknown ids count zero)
    pub fn seats_of<'a>(&self, ids: impl IntoIterator<Item = &'a TableId>) -> u32 {
        ids.into_iter().filter_map(|id| self.capacity_of(*id)).sum()
    }
}
