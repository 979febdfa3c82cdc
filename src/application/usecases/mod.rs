pub mod booking_intake;
pub mod payment_intents;
pub mod settlement;
pub mod sweep;
