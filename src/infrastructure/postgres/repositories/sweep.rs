use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, Utc};
use diesel::dsl::exists;
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
    entities::schedules::ScheduleEntity,
    repositories::sweep::SweepRepository,
    value_objects::{enums::booking_statuses::BookingStatus, sweep::PaidDeparture},
};
use crate::infrastructure::postgres::{
    postgres_connection::PgPoolSquad,
    schema::{booking_items, bookings, inventories, schedules},
};

pub struct SweepPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl SweepPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl SweepRepository for SweepPostgres {
    async fn list_active_schedules(&self) -> Result<Vec<ScheduleEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = schedules::table
            .filter(schedules::is_active.eq(true))
            .select(ScheduleEntity::as_select())
            .load::<ScheduleEntity>(&mut conn)?;

        Ok(rows)
    }

    async fn inventory_exists(&self, schedule_id: Uuid, date: NaiveDate) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let found = diesel::select(exists(
            inventories::table
                .filter(inventories::schedule_id.eq(schedule_id))
                .filter(inventories::inventory_date.eq(date)),
        ))
        .get_result::<bool>(&mut conn)?;

        Ok(found)
    }

    async fn deactivate_schedule(&self, schedule_id: Uuid) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        diesel::update(schedules::table.find(schedule_id))
            .set((
                schedules::is_active.eq(false),
                schedules::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn list_paid_departures(&self, date: NaiveDate) -> Result<Vec<PaidDeparture>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = booking_items::table
            .inner_join(bookings::table)
            .inner_join(schedules::table)
            .filter(bookings::status.eq(BookingStatus::Paid.as_str()))
            .filter(booking_items::travel_date.eq(date))
            .select((
                bookings::id,
                booking_items::travel_date,
                schedules::arrival_time,
            ))
            .distinct()
            .load::<(Uuid, NaiveDate, NaiveTime)>(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(|(booking_id, travel_date, arrival_time)| PaidDeparture {
                booking_id,
                travel_date,
                arrival_time,
            })
            .collect())
    }

    async fn complete_booking(&self, booking_id: Uuid) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        diesel::update(
            bookings::table
                .find(booking_id)
                .filter(bookings::status.eq(BookingStatus::Paid.as_str())),
        )
        .set((
            bookings::status.eq(BookingStatus::Completed.as_str()),
            bookings::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;

        Ok(())
    }
}
