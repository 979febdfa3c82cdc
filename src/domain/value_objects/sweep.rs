use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepSummary {
    pub schedules_deactivated: u32,
    pub bookings_completed: u32,
}

/// A PAID booking's sailing for a given day, as scanned by the sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct PaidDeparture {
    pub booking_id: Uuid,
    pub travel_date: NaiveDate,
    pub arrival_time: NaiveTime,
}
