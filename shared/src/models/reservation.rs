//! Reservation Model
//!
//! Only the fields the floor engine consumes. Extra fields coming from the
//! reservation store (contact data, notes, ...) are ignored on deserialize.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::placement::Placement;
use super::shift::ServiceShift;
use crate::error::{AppError, AppResult, ErrorCode};

pub type ReservationId = String;

/// Reservation for one (date, shift)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    #[serde(alias = "partySize")]
    pub party_size: u32,
    pub date: NaiveDate,
    #[serde(alias = "turno")]
    pub shift: ServiceShift,
    /// Shift-local arrival time, used only for ordering
    #[serde(alias = "timeSlot", with = "crate::util::hhmm")]
    pub time_slot: NaiveTime,
    /// Previously persisted table or combination
    #[serde(
        default,
        alias = "assignedTable",
        skip_serializing_if = "Option::is_none"
    )]
    pub assigned_table: Option<Placement>,
}

impl Reservation {
    pub fn new(
        id: impl Into<ReservationId>,
        party_size: u32,
        date: NaiveDate,
        shift: ServiceShift,
        time_slot: NaiveTime,
    ) -> Self {
        Self {
            id: id.into(),
            party_size,
            date,
            shift,
            time_slot,
            assigned_table: None,
        }
    }

    pub fn with_assigned_table(mut self, placement: impl Into<Placement>) -> Self {
        self.assigned_table = Some(placement.into());
        self
    }

    pub fn is_in(&self, date: NaiveDate, shift: ServiceShift) -> bool {
        self.date == date && self.shift == shift
    }

    /// Reject records the engine cannot reason about
    pub fn validate(&self) -> AppResult<()> {
        if self.id.trim().is_empty() {
            return Err(AppError::validation("Reservation id is empty"));
        }
        if self.party_size == 0 {
            return Err(AppError::new(ErrorCode::InvalidPartySize)
                .with_detail("reservation_id", self.id.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_store_record() {
        let json = r#"{
            "id": "A",
            "partySize": 2,
            "date": "2026-10-16",
            "turno": "noche",
            "timeSlot": "21:15",
            "assignedTable": "2+3",
            "phone": "600000000",
            "notes": "window"
        }"#;
        let r: Reservation = serde_json::from_str(json).unwrap();
        assert_eq!(r.party_size, 2);
        assert_eq!(r.shift, ServiceShift::Night);
        assert_eq!(r.time_slot, NaiveTime::from_hms_opt(21, 15, 0).unwrap());
        assert_eq!(r.assigned_table, Some(Placement::combination([2, 3])));
    }

    #[test]
    fn test_validate_rejects_empty_party() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let time = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
        let r = Reservation::new("A", 0, date, ServiceShift::Midday, time);
        let err = r.validate().unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidPartySize);

        let r = Reservation::new("A", 4, date, ServiceShift::Midday, time);
        assert!(r.validate().is_ok());
    }
}
