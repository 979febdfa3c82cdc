use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
    entities::bookings::{
        BookingEntity, BookingItemEntity, InsertBookingEntity, InsertBookingItemEntity,
        InsertPassengerEntity, PassengerEntity,
    },
    repositories::bookings::BookingRepository,
    value_objects::payment_intents::PaymentIntentUpdate,
};
use crate::infrastructure::postgres::{
    postgres_connection::PgPoolSquad,
    schema::{booking_items, bookings, passengers, users},
};

pub struct BookingPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl BookingPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl BookingRepository for BookingPostgres {
    async fn create_booking(
        &self,
        booking: InsertBookingEntity,
        items: Vec<InsertBookingItemEntity>,
        passengers_rows: Vec<InsertPassengerEntity>,
    ) -> Result<BookingEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let created = conn.transaction::<BookingEntity, diesel::result::Error, _>(|conn| {
            let created = diesel::insert_into(bookings::table)
                .values(&booking)
                .returning(BookingEntity::as_returning())
                .get_result::<BookingEntity>(conn)?;

            diesel::insert_into(booking_items::table)
                .values(&items)
                .execute(conn)?;

            diesel::insert_into(passengers::table)
                .values(&passengers_rows)
                .execute(conn)?;

            Ok(created)
        })?;

        Ok(created)
    }

    async fn find_by_id(&self, booking_id: Uuid) -> Result<Option<BookingEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let booking = bookings::table
            .find(booking_id)
            .select(BookingEntity::as_select())
            .first::<BookingEntity>(&mut conn)
            .optional()?;

        Ok(booking)
    }

    async fn list_items(&self, booking_id: Uuid) -> Result<Vec<BookingItemEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let items = booking_items::table
            .filter(booking_items::booking_id.eq(booking_id))
            .order(booking_items::created_at.asc())
            .select(BookingItemEntity::as_select())
            .load::<BookingItemEntity>(&mut conn)?;

        Ok(items)
    }

    async fn list_passengers(&self, booking_id: Uuid) -> Result<Vec<PassengerEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = passengers::table
            .filter(passengers::booking_id.eq(booking_id))
            .order(passengers::created_at.asc())
            .select(PassengerEntity::as_select())
            .load::<PassengerEntity>(&mut conn)?;

        Ok(rows)
    }

    async fn find_user_id_by_email(&self, email: &str) -> Result<Option<Uuid>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let user_id = users::table
            .filter(users::email.eq(email))
            .select(users::id)
            .first::<Uuid>(&mut conn)
            .optional()?;

        Ok(user_id)
    }

    async fn store_payment_intent(
        &self,
        booking_id: Uuid,
        update: PaymentIntentUpdate,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        diesel::update(bookings::table.find(booking_id))
            .set((
                bookings::payment_method.eq(update.payment_method.as_str()),
                bookings::gateway_channel.eq(update.gateway_channel),
                bookings::gateway_reference_id.eq(update.gateway_reference_id),
                bookings::invoice_expiry_at.eq(update.invoice_expiry_at),
                bookings::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }
}
