pub mod bookings;
pub mod inventories;
pub mod schedules;
