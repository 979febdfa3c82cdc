use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct NewBookingRequest {
    pub contact_name: String,
    pub contact_email: String,
    pub contact_phone: String,
    #[serde(default)]
    pub currency: Option<String>,
    pub subtotal: i64,
    pub port_fee: i64,
    pub addons_total: i64,
    pub total_amount: i64,
    pub items: Vec<NewBookingItem>,
    pub passengers: Vec<NewPassenger>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBookingItem {
    pub schedule_id: Uuid,
    pub travel_date: NaiveDate,
    pub quantity: i32,
    pub unit_price: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPassenger {
    pub full_name: String,
    pub nationality: String,
    #[serde(default)]
    pub id_document_type: Option<String>,
    #[serde(default)]
    pub id_document_number: Option<String>,
    pub category: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingCreatedDto {
    pub id: Uuid,
    pub booking_code: String,
    pub status: String,
    pub total_amount: i64,
    pub currency: String,
    pub items: Vec<BookingItemDto>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingItemDto {
    pub schedule_id: Uuid,
    pub travel_date: NaiveDate,
    pub quantity: i32,
    /// Remaining seats at read time; display-only, never authoritative.
    pub seats_remaining: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingDetailDto {
    pub id: Uuid,
    pub booking_code: String,
    pub status: String,
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
    pub invoice_expiry_at: Option<DateTime<Utc>>,
    pub paid_amount: Option<i64>,
    pub paid_at: Option<DateTime<Utc>>,
    pub items: Vec<BookingDetailItemDto>,
    pub passengers: Vec<PassengerDto>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingDetailItemDto {
    pub schedule_id: Uuid,
    pub travel_date: NaiveDate,
    pub quantity: i32,
    pub unit_price: i64,
    pub subtotal: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PassengerDto {
    pub full_name: String,
    pub nationality: String,
    pub category: String,
}
