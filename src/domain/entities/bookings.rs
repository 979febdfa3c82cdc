use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::{booking_items, bookings, passengers};

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = bookings)]
pub struct BookingEntity {
    pub id: Uuid,
    pub booking_code: String,
    pub user_id: Option<Uuid>,
    pub contact_name: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub subtotal: i64,
    pub port_fee: i64,
    pub addons_total: i64,
    pub total_amount: i64,
    pub currency: String,
    pub payment_method: Option<String>,
    pub gateway_channel: Option<String>,
    pub gateway_reference_id: Option<String>,
    pub invoice_expiry_at: Option<DateTime<Utc>>,
    pub paid_amount: Option<i64>,
    pub paid_at: Option<DateTime<Utc>>,
    pub gateway_callback: Option<serde_json::Value>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = bookings)]
pub struct InsertBookingEntity {
    pub id: Uuid,
    pub booking_code: String,
    pub user_id: Option<Uuid>,
    pub contact_name: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub subtotal: i64,
    pub port_fee: i64,
    pub addons_total: i64,
    pub total_amount: i64,
    pub currency: String,
    pub status: String,
}

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = booking_items)]
pub struct BookingItemEntity {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub schedule_id: Uuid,
    pub travel_date: NaiveDate,
    pub quantity: i32,
    pub unit_price: i64,
    pub subtotal: i64,
    pub inventory_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = booking_items)]
pub struct InsertBookingItemEntity {
    pub booking_id: Uuid,
    pub schedule_id: Uuid,
    pub travel_date: NaiveDate,
    pub quantity: i32,
    pub unit_price: i64,
    pub subtotal: i64,
}

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = passengers)]
pub struct PassengerEntity {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub full_name: String,
    pub nationality: String,
    pub id_document_type: Option<String>,
    pub id_document_number: Option<String>,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = passengers)]
pub struct InsertPassengerEntity {
    pub booking_id: Uuid,
    pub full_name: String,
    pub nationality: String,
    pub id_document_type: Option<String>,
    pub id_document_number: Option<String>,
    pub category: String,
}
