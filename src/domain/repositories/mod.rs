pub mod bookings;
pub mod replica;
pub mod schedules;
pub mod settlement;
pub mod sweep;
