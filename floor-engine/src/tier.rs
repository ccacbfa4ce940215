//! Capacity Tier Resolution
//!
//! Maps a party size to the smallest declared tier that seats it, and to that
//! tier's priority-ordered candidate tables.

use shared::models::TableId;

use crate::catalog::TableCatalog;

/// Seating bracket a party is mapped to (2, 4 or 6 in the house layout)
pub type CapacityTier = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierResolution<'a> {
    /// Tier the party belongs to
    pub tier: CapacityTier,
    /// Tier whose list is actually used (differs when `tier` has no tables)
    pub resolved_tier: CapacityTier,
    pub candidates: &'a [TableId],
}

/// Smallest declared tier capacity that seats `party_size`
pub fn tier_for(catalog: &TableCatalog, party_size: u32) -> Option<CapacityTier> {
    catalog
        .tiers()
        .iter()
        .map(|t| t.capacity)
        .find(|capacity| *capacity >= party_size)
}

/// Tier and candidate list for a party.
///
/// A tier without tables falls back to the next larger declared tier. `None`
/// means no tier can seat the party at all.
pub fn resolve(catalog: &TableCatalog, party_size: u32) -> Option<TierResolution<'_>> {
    let tier = tier_for(catalog, party_size)?;
    catalog
        .tiers()
        .iter()
        .filter(|t| t.capacity >= tier)
        .find(|t| !t.priority.is_empty())
        .map(|t| TierResolution {
            tier,
            resolved_tier: t.capacity,
            candidates: &t.priority,
        })
}
