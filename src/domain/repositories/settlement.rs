use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::bookings::BookingEntity,
    value_objects::{enums::booking_statuses::BookingStatus, settlement::SettlementOutcome},
};

#[async_trait]
#[automock]
pub trait SettlementRepository {
    async fn find_booking_by_gateway_reference(
        &self,
        reference: &str,
    ) -> Result<Option<BookingEntity>>;
    async fn find_booking_by_id(&self, booking_id: Uuid) -> Result<Option<BookingEntity>>;
    /// The one multi-row atomic operation in the core: flips the booking to
    /// PAID and adjusts the inventory ledger in a single transaction, or does
    /// neither. Returns `AlreadySettled` without touching anything when the
    /// booking had already left PENDING.
    async fn settle_paid(
        &self,
        booking_id: Uuid,
        paid_amount: Option<i64>,
        raw_payload: serde_json::Value,
    ) -> Result<SettlementOutcome>;
    /// Plain field update for non-PAID classifications and duplicate
    /// deliveries; never touches inventory.
    async fn record_status(
        &self,
        booking_id: Uuid,
        status: BookingStatus,
        raw_payload: serde_json::Value,
    ) -> Result<()>;
}
