use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::payment_methods::PaymentMethod;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateQrIntentRequest {
    pub booking_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateVaIntentRequest {
    pub booking_id: Uuid,
    pub bank_code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCardIntentRequest {
    pub booking_id: Uuid,
    pub card_number: String,
    pub exp_month: String,
    pub exp_year: String,
    pub cvn: String,
    pub cardholder_name: String,
    #[serde(default)]
    pub cardholder_email: Option<String>,
    #[serde(default)]
    pub cardholder_phone: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QrIntentDto {
    pub booking_id: Uuid,
    pub qr_id: String,
    pub qr_string: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VaIntentDto {
    pub booking_id: Uuid,
    pub bank_code: String,
    pub account_number: String,
    pub expected_amount: i64,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardIntentDto {
    pub booking_id: Uuid,
    pub charge_id: String,
    pub status: String,
    /// Present when the gateway requires further customer action (3DS).
    pub redirect_url: Option<String>,
    pub expires_at: DateTime<Utc>,
}

/// Gateway correlation fields written onto a booking once an artifact exists.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentIntentUpdate {
    pub payment_method: PaymentMethod,
    pub gateway_channel: String,
    pub gateway_reference_id: String,
    pub invoice_expiry_at: DateTime<Utc>,
}
