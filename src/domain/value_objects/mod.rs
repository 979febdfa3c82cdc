pub mod booking_intake;
pub mod enums;
pub mod gateway_callback;
pub mod payment_intents;
pub mod settlement;
pub mod sweep;
