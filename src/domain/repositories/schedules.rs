use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::schedules::ScheduleEntity;

#[async_trait]
#[automock]
pub trait ScheduleRepository {
    async fn find_by_id(&self, schedule_id: Uuid) -> Result<Option<ScheduleEntity>>;
    /// Remaining seats for display: the ledger's available units when a row
    /// exists for the date, otherwise the schedule's configured capacity.
    async fn seats_remaining(&self, schedule_id: Uuid, date: NaiveDate) -> Result<Option<i32>>;
}
