use chrono::{DateTime, NaiveTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::schedules;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = schedules)]
pub struct ScheduleEntity {
    pub id: Uuid,
    pub name: String,
    pub origin: String,
    pub destination: String,
    pub departure_time: NaiveTime,
    pub arrival_time: NaiveTime,
    pub capacity: Option<i32>,
    pub booked_seats: i32,
    pub price: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
