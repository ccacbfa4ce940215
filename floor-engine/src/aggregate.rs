//! Table State Aggregation (桌台状态)
//!
//! Folds reservations, live orders and manual blocks into one state per
//! catalogued table. Every consumer (floor map, order flow, preview) reads
//! this view so they cannot disagree about whether a table is free.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use shared::models::{
    BlockedTables, FloorOrder, FloorPlan, Occupant, Reservation, ServiceShift, TableId,
    TableState, TableStatus,
};
use tracing::warn;

use crate::catalog::TableCatalog;

/// How blocked, free tables are reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateView {
    /// `Blocked`
    #[default]
    Floor,
    /// `AvailableForWalkin`
    WalkIn,
}

pub struct TableStateAggregator<'a> {
    catalog: &'a TableCatalog,
}

impl<'a> TableStateAggregator<'a> {
    pub fn new(catalog: &'a TableCatalog) -> Self {
        Self { catalog }
    }

    pub fn aggregate(
        &self,
        reservations: &[Reservation],
        orders: &[FloorOrder],
        manual_blocks: &BlockedTables,
        date: NaiveDate,
        shift: ServiceShift,
        view: StateView,
    ) -> BTreeMap<TableId, TableState> {
        let mut states: BTreeMap<TableId, TableState> = self
            .catalog
            .table_ids()
            .map(|id| (id, TableState::available(id)))
            .collect();

        // first active order per table wins
        let mut live: BTreeMap<TableId, &FloorOrder> = BTreeMap::new();
        for order in orders.iter().filter(|o| o.holds_table()) {
            live.entry(order.table_number).or_insert(order);
        }

        for reservation in reservations.iter().filter(|r| r.is_in(date, shift)) {
            let Some(placement) = &reservation.assigned_table else {
                continue;
            };
            if let Some(id) = placement.tables().iter().find(|id| !self.catalog.contains(**id)) {
                warn!(reservation_id = %reservation.id, table_id = *id, "Reservation points at unknown table");
                continue;
            }
            if placement
                .tables()
                .iter()
                .any(|id| states.get(id).is_some_and(TableState::is_taken))
            {
                warn!(
                    reservation_id = %reservation.id,
                    placement = %placement,
                    "Table already taken by another reservation, skipping"
                );
                continue;
            }

            let order = placement.tables().iter().find_map(|id| live.get(id).copied());
            let (status, occupant) = match order {
                Some(order) => (
                    TableStatus::Occupied,
                    Occupant::Order {
                        order_id: order.id.clone(),
                        reservation_id: Some(reservation.id.clone()),
                    },
                ),
                None => (
                    TableStatus::Reserved,
                    Occupant::Reservation {
                        reservation_id: reservation.id.clone(),
                    },
                ),
            };
            for id in placement.tables() {
                if let Some(state) = states.get_mut(id) {
                    state.status = status;
                    state.occupant = Some(occupant.clone());
                }
            }
        }

        for (table_id, order) in live {
            match states.get_mut(&table_id) {
                Some(state) if !state.is_taken() => {
                    state.status = TableStatus::Occupied;
                    state.occupant = Some(Occupant::Order {
                        order_id: order.id.clone(),
                        reservation_id: None,
                    });
                }
                Some(_) => {}
                None => warn!(order_id = %order.id, table_id, "Order on unknown table"),
            }
        }

        let blocked_status = match view {
            StateView::Floor => TableStatus::Blocked,
            StateView::WalkIn => TableStatus::AvailableForWalkin,
        };
        for id in manual_blocks {
            if let Some(state) = states.get_mut(id)
                && state.status == TableStatus::Available
            {
                state.status = blocked_status;
            }
        }

        states
    }
}

/// Reservations with `assigned_table` taken from `plan`.
///
/// A reservation the plan left out ends up with no table.
pub fn apply_plan(reservations: &[Reservation], plan: &FloorPlan) -> Vec<Reservation> {
    reservations
        .iter()
        .map(|r| Reservation {
            assigned_table: plan.assignments.get(&r.id).cloned(),
            ..r.clone()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FloorLayout;
    use chrono::NaiveTime;
    use shared::models::{FloorOrderStatus, Placement};

    fn house() -> TableCatalog {
        TableCatalog::new(FloorLayout::default()).unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn res(id: &str, placement: Option<Placement>) -> Reservation {
        let mut r = Reservation::new(
            id,
            2,
            date(),
            ServiceShift::Midday,
            NaiveTime::from_hms_opt(13, 0, 0).unwrap(),
        );
        r.assigned_table = placement;
        r
    }

    fn blocks(ids: &[TableId]) -> BlockedTables {
        ids.iter().copied().collect()
    }

    #[test]
    fn test_every_table_starts_available() {
        let catalog = house();
        let states = TableStateAggregator::new(&catalog).aggregate(
            &[],
            &[],
            &blocks(&[]),
            date(),
            ServiceShift::Midday,
            StateView::Floor,
        );
        assert_eq!(states.len(), catalog.len());
        assert!(states.values().all(|s| s.status == TableStatus::Available));
    }

    #[test]
    fn test_combination_reserves_every_member() {
        let catalog = house();
        let reservations = vec![res("A", Some(Placement::combination([2, 3]))), res("B", None)];
        let states = TableStateAggregator::new(&catalog).aggregate(
            &reservations,
            &[],
            &blocks(&[]),
            date(),
            ServiceShift::Midday,
            StateView::Floor,
        );

        for id in [2, 3] {
            assert_eq!(states[&id].status, TableStatus::Reserved);
            assert_eq!(
                states[&id].occupant,
                Some(Occupant::Reservation {
                    reservation_id: "A".into()
                })
            );
        }
    }

    #[test]
    fn test_active_order_turns_reservation_occupied() {
        let catalog = house();
        let reservations = vec![res("A", Some(Placement::combination([2, 3])))];
        let orders = vec![
            FloorOrder::active("o-1", 3),
            FloorOrder::active("o-2", 9),
            FloorOrder {
                status: FloorOrderStatus::Completed,
                ..FloorOrder::active("o-3", 10)
            },
        ];
        let states = TableStateAggregator::new(&catalog).aggregate(
            &reservations,
            &orders,
            &blocks(&[]),
            date(),
            ServiceShift::Midday,
            StateView::Floor,
        );

        assert_eq!(states[&2].status, TableStatus::Occupied);
        assert_eq!(
            states[&2].occupant,
            Some(Occupant::Order {
                order_id: "o-1".into(),
                reservation_id: Some("A".into())
            })
        );
        assert_eq!(states[&9].status, TableStatus::Occupied);
        assert_eq!(states[&10].status, TableStatus::Available);
    }

    #[test]
    fn test_blocks_only_apply_to_free_tables() {
        let catalog = house();
        let reservations = vec![res("A", Some(Placement::Single(13)))];
        let manual = blocks(&[3, 12, 13]);

        let aggregator = TableStateAggregator::new(&catalog);
        let floor = aggregator.aggregate(
            &reservations,
            &[],
            &manual,
            date(),
            ServiceShift::Midday,
            StateView::Floor,
        );
        assert_eq!(floor[&3].status, TableStatus::Blocked);
        assert_eq!(floor[&13].status, TableStatus::Reserved);

        let walkin = aggregator.aggregate(
            &reservations,
            &[],
            &manual,
            date(),
            ServiceShift::Midday,
            StateView::WalkIn,
        );
        assert_eq!(walkin[&12].status, TableStatus::AvailableForWalkin);
    }

    #[test]
    fn test_other_shift_and_unknown_tables_ignored() {
        let catalog = house();
        let mut night = res("N", Some(Placement::Single(8)));
        night.shift = ServiceShift::Night;
        let reservations = vec![night, res("X", Some(Placement::Single(99)))];

        let states = TableStateAggregator::new(&catalog).aggregate(
            &reservations,
            &[],
            &blocks(&[99]),
            date(),
            ServiceShift::Midday,
            StateView::Floor,
        );
        assert_eq!(states[&8].status, TableStatus::Available);
        assert!(!states.contains_key(&99));
    }

    #[test]
    fn test_double_claim_keeps_first_reservation() {
        let catalog = house();
        let reservations = vec![
            res("A", Some(Placement::Single(8))),
            res("B", Some(Placement::Single(8))),
        ];
        let states = TableStateAggregator::new(&catalog).aggregate(
            &reservations,
            &[],
            &blocks(&[]),
            date(),
            ServiceShift::Midday,
            StateView::Floor,
        );
        assert_eq!(
            states[&8].occupant,
            Some(Occupant::Reservation {
                reservation_id: "A".into()
            })
        );
    }

    #[test]
    fn test_apply_plan_overwrites_and_clears() {
        let reservations = vec![res("A", Some(Placement::Single(8))), res("B", Some(Placement::Single(11)))];
        let mut plan = FloorPlan::default();
        plan.assignments.insert("A".into(), Placement::Single(11));

        let updated = apply_plan(&reservations, &plan);
        assert_eq!(updated[0].assigned_table, Some(Placement::Single(11)));
        assert_eq!(updated[1].assigned_table, None);
        // input untouched
        assert_eq!(reservations[1].assigned_table, Some(Placement::Single(11)));
    }
}
