use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
    entities::schedules::ScheduleEntity, repositories::schedules::ScheduleRepository,
};
use crate::infrastructure::postgres::{
    postgres_connection::PgPoolSquad,
    schema::{inventories, schedules},
};

pub struct SchedulePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl SchedulePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ScheduleRepository for SchedulePostgres {
    async fn find_by_id(&self, schedule_id: Uuid) -> Result<Option<ScheduleEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let schedule = schedules::table
            .find(schedule_id)
            .select(ScheduleEntity::as_select())
            .first::<ScheduleEntity>(&mut conn)
            .optional()?;

        Ok(schedule)
    }

    async fn seats_remaining(&self, schedule_id: Uuid, date: NaiveDate) -> Result<Option<i32>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let ledger_available = inventories::table
            .filter(inventories::schedule_id.eq(schedule_id))
            .filter(inventories::inventory_date.eq(date))
            .select(inventories::available_units)
            .first::<i32>(&mut conn)
            .optional()?;

        if let Some(available) = ledger_available {
            return Ok(Some(available));
        }

        // No ledger row yet for the date; fall back to the configured hull
        // capacity, which may itself be unknown.
        let capacity = schedules::table
            .find(schedule_id)
            .select(schedules::capacity)
            .first::<Option<i32>>(&mut conn)
            .optional()?;

        Ok(capacity.flatten())
    }
}
