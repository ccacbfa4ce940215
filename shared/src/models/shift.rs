//! Service Shift Model (营业时段)

use std::fmt;

use serde::{Deserialize, Serialize};

/// Named service period within a date.
///
/// Reservations, assignments and blocked tables are scoped per (date, shift).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceShift {
    #[serde(alias = "mediodia")]
    Midday,
    #[serde(alias = "noche")]
    Night,
}

impl ServiceShift {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Midday => "midday",
            Self::Night => "night",
        }
    }
}

impl fmt::Display for ServiceShift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_serde_accepts_aliases() {
        let s: ServiceShift = serde_json::from_str("\"noche\"").unwrap();
        assert_eq!(s, ServiceShift::Night);
        let s: ServiceShift = serde_json::from_str("\"midday\"").unwrap();
        assert_eq!(s, ServiceShift::Midday);
        assert_eq!(serde_json::to_string(&ServiceShift::Night).unwrap(), "\"night\"");
    }
}
