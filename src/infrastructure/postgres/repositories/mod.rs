pub mod bookings;
pub mod schedules;
pub mod settlement;
pub mod sweep;
