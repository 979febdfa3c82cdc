use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::inventories;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = inventories)]
pub struct InventoryEntity {
    pub id: Uuid,
    pub schedule_id: Uuid,
    pub inventory_date: NaiveDate,
    pub total_capacity: i32,
    pub booked_units: i32,
    pub available_units: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = inventories)]
pub struct InsertInventoryEntity {
    pub schedule_id: Uuid,
    pub inventory_date: NaiveDate,
    pub total_capacity: i32,
    pub booked_units: i32,
    pub available_units: i32,
}

/// Counter arithmetic for applying a sale to an existing ledger row.
/// `available_units` is clamped at zero instead of erroring; the write is
/// favored over exactness when demand outruns the remaining capacity.
pub fn absorb_sale(booked_units: i32, available_units: i32, quantity: i32) -> (i32, i32) {
    let new_booked = booked_units + quantity;
    let new_available = (available_units - quantity).max(0);
    (new_booked, new_available)
}

/// Builds a fresh ledger row for a (schedule, date) pair that has never been
/// written. A schedule without a known capacity gets one backfilled from the
/// quantity being booked, so the row always reflects at least what was sold.
pub fn open_ledger(
    schedule_id: Uuid,
    inventory_date: NaiveDate,
    capacity: Option<i32>,
    quantity: i32,
) -> InsertInventoryEntity {
    let total_capacity = capacity.unwrap_or(quantity);
    InsertInventoryEntity {
        schedule_id,
        inventory_date,
        total_capacity,
        booked_units: quantity,
        available_units: (total_capacity - quantity).max(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absorb_sale_decrements_available_and_increments_booked() {
        assert_eq!(absorb_sale(3, 7, 2), (5, 5));
    }

    #[test]
    fn absorb_sale_clamps_available_at_zero() {
        assert_eq!(absorb_sale(9, 1, 4), (13, 0));
        assert_eq!(absorb_sale(10, 0, 1), (11, 0));
    }

    #[test]
    fn open_ledger_uses_schedule_capacity_when_known() {
        let row = open_ledger(Uuid::new_v4(), NaiveDate::from_ymd_opt(2026, 8, 24).unwrap(), Some(30), 4);
        assert_eq!(row.total_capacity, 30);
        assert_eq!(row.booked_units, 4);
        assert_eq!(row.available_units, 26);
    }

    #[test]
    fn open_ledger_backfills_capacity_from_quantity() {
        let row = open_ledger(Uuid::new_v4(), NaiveDate::from_ymd_opt(2026, 8, 24).unwrap(), None, 4);
        assert_eq!(row.total_capacity, 4);
        assert_eq!(row.booked_units, 4);
        assert_eq!(row.available_units, 0);
    }

    #[test]
    fn open_ledger_clamps_oversold_first_write() {
        let row = open_ledger(Uuid::new_v4(), NaiveDate::from_ymd_opt(2026, 8, 24).unwrap(), Some(2), 5);
        assert_eq!(row.total_capacity, 2);
        assert_eq!(row.booked_units, 5);
        assert_eq!(row.available_units, 0);
    }
}
