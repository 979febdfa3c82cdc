use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    entities::{
        bookings::{BookingEntity, BookingItemEntity},
        inventories::{InventoryEntity, absorb_sale, open_ledger},
    },
    repositories::settlement::SettlementRepository,
    value_objects::{
        enums::booking_statuses::BookingStatus,
        settlement::{LedgerGroupMirror, SettlementMirror, SettlementOutcome},
    },
};
use crate::infrastructure::postgres::{
    postgres_connection::PgPoolSquad,
    schema::{booking_items, bookings, inventories, schedules},
};

pub struct SettlementPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl SettlementPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

struct LedgerDemand {
    capacity: Option<i32>,
    quantity: i32,
    item_ids: Vec<Uuid>,
}

#[async_trait]
impl SettlementRepository for SettlementPostgres {
    async fn find_booking_by_gateway_reference(
        &self,
        reference: &str,
    ) -> Result<Option<BookingEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let booking = bookings::table
            .filter(bookings::gateway_reference_id.eq(reference))
            .select(BookingEntity::as_select())
            .first::<BookingEntity>(&mut conn)
            .optional()?;

        Ok(booking)
    }

    async fn find_booking_by_id(&self, booking_id: Uuid) -> Result<Option<BookingEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let booking = bookings::table
            .find(booking_id)
            .select(BookingEntity::as_select())
            .first::<BookingEntity>(&mut conn)
            .optional()?;

        Ok(booking)
    }

    async fn settle_paid(
        &self,
        booking_id: Uuid,
        paid_amount: Option<i64>,
        raw_payload: serde_json::Value,
    ) -> Result<SettlementOutcome> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let outcome = conn.transaction::<SettlementOutcome, diesel::result::Error, _>(|conn| {
            let booking = bookings::table
                .find(booking_id)
                .select(BookingEntity::as_select())
                .first::<BookingEntity>(conn)?;

            // The status re-check inside the transaction is the idempotency
            // gate: only a booking still PENDING may settle. A delivery that
            // lost the race, or a late retry arriving after the sweep moved
            // the booking on to COMPLETED, backs out without touching the
            // ledger.
            if booking.status != BookingStatus::Pending.as_str() {
                return Ok(SettlementOutcome::AlreadySettled);
            }

            let now = Utc::now();
            diesel::update(bookings::table.find(booking_id))
                .set((
                    bookings::status.eq(BookingStatus::Paid.as_str()),
                    bookings::paid_amount.eq(paid_amount.or(Some(booking.total_amount))),
                    bookings::paid_at.eq(now),
                    bookings::gateway_callback.eq(&raw_payload),
                    bookings::updated_at.eq(now),
                ))
                .execute(conn)?;

            let items = booking_items::table
                .inner_join(schedules::table)
                .filter(booking_items::booking_id.eq(booking_id))
                .select((BookingItemEntity::as_select(), schedules::capacity))
                .load::<(BookingItemEntity, Option<i32>)>(conn)?;

            // One ledger row per (schedule, sailing date), however many
            // booking items share it.
            let mut demands: BTreeMap<(Uuid, NaiveDate), LedgerDemand> = BTreeMap::new();
            for (item, capacity) in items {
                let demand = demands
                    .entry((item.schedule_id, item.travel_date))
                    .or_insert(LedgerDemand {
                        capacity,
                        quantity: 0,
                        item_ids: Vec::new(),
                    });
                demand.quantity += item.quantity;
                demand.item_ids.push(item.id);
            }

            let mut groups = Vec::with_capacity(demands.len());
            for ((schedule_id, travel_date), demand) in demands {
                let existing = inventories::table
                    .filter(inventories::schedule_id.eq(schedule_id))
                    .filter(inventories::inventory_date.eq(travel_date))
                    .select(InventoryEntity::as_select())
                    .first::<InventoryEntity>(conn)
                    .optional()?;

                let (inventory_id, total_capacity, booked, available) = match existing {
                    Some(row) => {
                        let (booked, available) =
                            absorb_sale(row.booked_units, row.available_units, demand.quantity);
                        diesel::update(inventories::table.find(row.id))
                            .set((
                                inventories::booked_units.eq(booked),
                                inventories::available_units.eq(available),
                                inventories::updated_at.eq(now),
                            ))
                            .execute(conn)?;
                        (row.id, row.total_capacity, booked, available)
                    }
                    None => {
                        let row = open_ledger(
                            schedule_id,
                            travel_date,
                            demand.capacity,
                            demand.quantity,
                        );
                        let created = diesel::insert_into(inventories::table)
                            .values(&row)
                            .returning(InventoryEntity::as_returning())
                            .get_result::<InventoryEntity>(conn)?;
                        (
                            created.id,
                            created.total_capacity,
                            created.booked_units,
                            created.available_units,
                        )
                    }
                };

                diesel::update(
                    booking_items::table.filter(booking_items::id.eq_any(&demand.item_ids)),
                )
                .set(booking_items::inventory_id.eq(inventory_id))
                .execute(conn)?;

                // The schedule's aggregate seat counter shadows the ledger so
                // listings stay consistent with the per-date rows.
                diesel::update(schedules::table.find(schedule_id))
                    .set((
                        schedules::booked_seats.eq(booked),
                        schedules::updated_at.eq(now),
                    ))
                    .execute(conn)?;

                groups.push(LedgerGroupMirror {
                    inventory_id,
                    schedule_id,
                    inventory_date: travel_date,
                    total_capacity,
                    booked_units: booked,
                    available_units: available,
                    item_ids: demand.item_ids,
                });
            }

            Ok(SettlementOutcome::Settled(SettlementMirror {
                booking_id,
                groups,
            }))
        })?;

        Ok(outcome)
    }

    async fn record_status(
        &self,
        booking_id: Uuid,
        status: BookingStatus,
        raw_payload: serde_json::Value,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        diesel::update(bookings::table.find(booking_id))
            .set((
                bookings::status.eq(status.as_str()),
                bookings::gateway_callback.eq(&raw_payload),
                bookings::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }
}
