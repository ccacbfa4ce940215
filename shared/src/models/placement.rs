//! Placement Model
//!
//! Where a reservation sits: one table, or a declared combination of tables.
//! The `"2+3"` join string only exists at the persistence boundary; inside
//! the engine a placement is always this enum.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use super::dining_table::TableId;

/// Table or combination occupied by one reservation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Placement {
    Single(TableId),
    /// Members sorted ascending, no duplicates
    Combination(Vec<TableId>),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementParseError {
    #[error("empty table key")]
    Empty,
    #[error("invalid table id in key: {0}")]
    InvalidTableId(String),
}

impl Placement {
    /// Build a combination in canonical member order.
    ///
    /// A single distinct member collapses to [`Placement::Single`].
    pub fn combination(members: impl IntoIterator<Item = TableId>) -> Self {
        let mut members: Vec<TableId> = members.into_iter().collect();
        members.sort_unstable();
        members.dedup();
        if members.len() == 1 {
            Placement::Single(members[0])
        } else {
            Placement::Combination(members)
        }
    }

    /// Every table this placement occupies
    pub fn tables(&self) -> &[TableId] {
        match self {
            Placement::Single(id) => std::slice::from_ref(id),
            Placement::Combination(members) => members,
        }
    }

    pub fn contains(&self, table_id: TableId) -> bool {
        self.tables().contains(&table_id)
    }

    pub fn is_combination(&self) -> bool {
        matches!(self, Placement::Combination(_))
    }

    /// Whether any table is shared with `other`
    pub fn overlaps(&self, other: &Placement) -> bool {
        self.tables().iter().any(|id| other.contains(*id))
    }
}

impl From<TableId> for Placement {
    fn from(id: TableId) -> Self {
        Placement::Single(id)
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Placement::Single(id) => write!(f, "{}", id),
            Placement::Combination(members) => {
                let key = members
                    .iter()
                    .map(|id| id.to_string())
                    .collect::<Vec<_>>()
                    .join("+");
                f.write_str(&key)
            }
        }
    }
}

impl FromStr for Placement {
    type Err = PlacementParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PlacementParseError::Empty);
        }
        let members = s
            .split('+')
            .map(|part| {
                let part = part.trim();
                part.parse::<TableId>()
                    .map_err(|_| PlacementParseError::InvalidTableId(part.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Placement::combination(members))
    }
}

// Single tables travel as plain numbers, combinations as their join key.
impl Serialize for Placement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Placement::Single(id) => serializer.serialize_i64(*id),
            Placement::Combination(_) => serializer.serialize_str(&self.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for Placement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Id(TableId),
            Key(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Id(id) => Ok(Placement::Single(id)),
            Raw::Key(key) => key.parse().map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combination_key_is_canonical() {
        let p = Placement::combination([3, 2]);
        assert_eq!(p, Placement::Combination(vec![2, 3]));
        assert_eq!(p.to_string(), "2+3");
        assert_eq!(Placement::combination([7, 7]), Placement::Single(7));
    }

    #[test]
    fn test_parse_keys() {
        assert_eq!("8".parse::<Placement>(), Ok(Placement::Single(8)));
        assert_eq!(
            " 3 + 2 ".parse::<Placement>(),
            Ok(Placement::Combination(vec![2, 3]))
        );
        assert_eq!("".parse::<Placement>(), Err(PlacementParseError::Empty));
        assert_eq!(
            "2+x".parse::<Placement>(),
            Err(PlacementParseError::InvalidTableId("x".to_string()))
        );
    }

    #[test]
    fn test_serde_boundary_encoding() {
        assert_eq!(serde_json::to_string(&Placement::Single(8)).unwrap(), "8");
        assert_eq!(
            serde_json::to_string(&Placement::combination([2, 3])).unwrap(),
            "\"2+3\""
        );

        let p: Placement = serde_json::from_str("11").unwrap();
        assert_eq!(p, Placement::Single(11));
        let p: Placement = serde_json::from_str("\"11\"").unwrap();
        assert_eq!(p, Placement::Single(11));
        let p: Placement = serde_json::from_str("\"13+12\"").unwrap();
        assert_eq!(p, Placement::Combination(vec![12, 13]));
        assert!(serde_json::from_str::<Placement>("\"mesa\"").is_err());
    }

    #[test]
    fn test_overlaps() {
        let combo = Placement::combination([2, 3]);
        assert!(combo.overlaps(&Placement::Single(3)));
        assert!(!combo.overlaps(&Placement::Single(7)));
        assert!(combo.contains(2));
        assert!(combo.is_combination());
    }
}
