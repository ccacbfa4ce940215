/// Serde helpers for shift-local `HH:MM` time slots.
///
/// Accepts `HH:MM` and `HH:MM:SS`. Writes `HH:MM`, or `HH:MM:SS` when the
/// seconds are not zero.
pub mod hhmm {
    use chrono::{NaiveTime, Timelike};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(s: &str) -> Option<NaiveTime> {
        let s = s.trim();
        NaiveTime::parse_from_str(s, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
            .ok()
    }

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        let format = if time.second() == 0 { "%H:%M" } else { "%H:%M:%S" };
        serializer.serialize_str(&time.format(format).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid time slot: {}", raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::hhmm;
    use chrono::NaiveTime;

    #[test]
    fn test_parse_time_slots() {
        assert_eq!(hhmm::parse("12:15"), NaiveTime::from_hms_opt(12, 15, 0));
        assert_eq!(hhmm::parse("21:30:00"), NaiveTime::from_hms_opt(21, 30, 0));
        assert_eq!(hhmm::parse("noon"), None);
    }

    #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Slot(#[serde(with = "hhmm")] NaiveTime);

    #[test]
    fn test_seconds_survive_serialization() {
        let json = serde_json::to_string(&Slot(NaiveTime::from_hms_opt(20, 45, 30).unwrap())).unwrap();
        assert_eq!(json, r#""20:45:30""#);
        let back: Slot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.0, NaiveTime::from_hms_opt(20, 45, 30).unwrap());

        let json = serde_json::to_string(&Slot(NaiveTime::from_hms_opt(21, 30, 0).unwrap())).unwrap();
        assert_eq!(json, r#""21:30""#);
    }
}
