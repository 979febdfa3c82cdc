pub mod bookings;
pub mod gateway_webhook;
pub mod payment_intents;
pub mod sweep;
