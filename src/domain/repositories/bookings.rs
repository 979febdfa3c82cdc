use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::bookings::{
        BookingEntity, BookingItemEntity, InsertBookingEntity, InsertBookingItemEntity,
        InsertPassengerEntity, PassengerEntity,
    },
    value_objects::payment_intents::PaymentIntentUpdate,
};

#[async_trait]
#[automock]
pub trait BookingRepository {
    /// Persists the booking with its items and passengers as one unit.
    async fn create_booking(
        &self,
        booking: InsertBookingEntity,
        items: Vec<InsertBookingItemEntity>,
        passengers: Vec<InsertPassengerEntity>,
    ) -> Result<BookingEntity>;
    async fn find_by_id(&self, booking_id: Uuid) -> Result<Option<BookingEntity>>;
    async fn list_items(&self, booking_id: Uuid) -> Result<Vec<BookingItemEntity>>;
    async fn list_passengers(&self, booking_id: Uuid) -> Result<Vec<PassengerEntity>>;
    /// Secondary identity lookup for accounts provisioned through a different
    /// sign-up flow than the one the booking was created under.
    async fn find_user_id_by_email(&self, email: &str) -> Result<Option<Uuid>>;
    async fn store_payment_intent(
        &self,
        booking_id: Uuid,
        update: PaymentIntentUpdate,
    ) -> Result<()>;
}
