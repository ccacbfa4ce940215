//! Combination Resolution (拼桌)
//!
//! Decides whether a declared combination can seat a party that no single
//! candidate table serves.

use std::collections::BTreeSet;

use shared::models::{BlockedTables, Placement, TableId};

use crate::catalog::{CombinationRule, TableCatalog};

/// How blocked walk-in tables are treated when looking for a combination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockPolicy {
    /// Blocked members disqualify the combination
    Respect,
    /// Blocked members may be used; they are reported back for release
    Override,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinationSuggestion<'a> {
    pub rule: &'a CombinationRule,
    pub placement: Placement,
    /// Members currently held for walk-ins. Non-empty means taking this
    /// combination costs walk-in capacity and the operator should be asked
    /// (un-block vs. keep for walk-ins).
    pub blocked_members: Vec<TableId>,
}

impl CombinationSuggestion<'_> {
    pub fn needs_unblock(&self) -> bool {
        !self.blocked_members.is_empty()
    }
}

/// First declared combination with room for `party_size` whose members are
/// all free. Over-provisioning is fine: a party of 5 gets a 6-seat pair.
pub fn suggest_combination<'a>(
    catalog: &'a TableCatalog,
    party_size: u32,
    occupied: &BTreeSet<TableId>,
    blocked: &BlockedTables,
    policy: BlockPolicy,
) -> Option<CombinationSuggestion<'a>> {
    catalog
        .combinations()
        .iter()
        .filter(|rule| rule.combined_capacity >= party_size)
        .find_map(|rule| {
            let placement = rule.placement();
            if placement.tables().iter().any(|id| occupied.contains(id)) {
                return None;
            }
            let blocked_members: Vec<TableId> = placement
                .tables()
                .iter()
                .copied()
                .filter(|id| blocked.contains(id))
                .collect();
            if policy == BlockPolicy::Respect && !blocked_members.is_empty() {
                return None;
            }
            Some(CombinationSuggestion {
                rule,
                placement,
                blocked_members,
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FloorLayout;

    fn house() -> TableCatalog {
        TableCatalog::new(FloorLayout::default()).unwrap()
    }

    fn set(ids: &[TableId]) -> BTreeSet<TableId> {
        ids.iter().copied().collect()
    }

    #[test]
    fn test_first_declared_free_combination_wins() {
        let catalog = house();
        let s = suggest_combination(&catalog, 6, &set(&[7]), &set(&[]), BlockPolicy::Respect)
            .unwrap();
        assert_eq!(s.placement, Placement::combination([2, 3]));
        assert!(!s.needs_unblock());
    }

    #[test]
    fn test_party_of_five_gets_six_seat_combination() {
        let catalog = house();
        let s = suggest_combination(&catalog, 5, &set(&[]), &set(&[]), BlockPolicy::Respect)
            .unwrap();
        assert_eq!(s.rule.combined_capacity, 6);
    }

    #[test]
    fn test_occupied_member_skips_to_next() {
        let catalog = house();
        let s = suggest_combination(&catalog, 6, &set(&[3]), &set(&[]), BlockPolicy::Respect)
            .unwrap();
        assert_eq!(s.placement, Placement::combination([12, 13]));

        assert!(
            suggest_combination(&catalog, 6, &set(&[2, 12]), &set(&[]), BlockPolicy::Respect)
                .is_none()
        );
    }

    #[test]
    fn test_blocked_members_respected_or_reported() {
        let catalog = house();
        let blocked = set(&[3, 13]);
        assert!(
            suggest_combination(&catalog, 6, &set(&[]), &blocked, BlockPolicy::Respect).is_none()
        );

        let s = suggest_combination(&catalog, 6, &set(&[]), &blocked, BlockPolicy::Override)
            .unwrap();
        assert_eq!(s.placement, Placement::combination([2, 3]));
        assert_eq!(s.blocked_members, vec![3]);
        assert!(s.needs_unblock());
    }

    #[test]
    fn test_capacity_filter() {
        let catalog = house();
        let s = suggest_combination(&catalog, 7, &set(&[]), &set(&[]), BlockPolicy::Respect)
            .unwrap();
        assert_eq!(s.placement, Placement::combination([12, 13]));
        assert!(
            suggest_combination(&catalog, 9, &set(&[]), &set(&[]), BlockPolicy::Override)
                .is_none()
        );
    }
}
