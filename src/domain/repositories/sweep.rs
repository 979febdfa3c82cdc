use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::schedules::ScheduleEntity, value_objects::sweep::PaidDeparture,
};

#[async_trait]
#[automock]
pub trait SweepRepository {
    async fn list_active_schedules(&self) -> Result<Vec<ScheduleEntity>>;
    async fn inventory_exists(&self, schedule_id: Uuid, date: NaiveDate) -> Result<bool>;
    async fn deactivate_schedule(&self, schedule_id: Uuid) -> Result<()>;
    async fn list_paid_departures(&self, date: NaiveDate) -> Result<Vec<PaidDeparture>>;
    async fn complete_booking(&self, booking_id: Uuid) -> Result<()>;
}
