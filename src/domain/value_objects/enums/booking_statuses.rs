use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BookingStatus {
    Pending,
    Paid,
    Completed,
    Cancelled,
    Expired,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Paid => "paid",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Expired => "expired",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(BookingStatus::Pending),
            "paid" => Some(BookingStatus::Paid),
            "completed" => Some(BookingStatus::Completed),
            "cancelled" => Some(BookingStatus::Cancelled),
            "expired" => Some(BookingStatus::Expired),
            _ => None,
        }
    }

    /// Maps the payment gateway's status vocabulary onto booking statuses.
    /// Anything unrecognized leaves the booking untouched.
    pub fn from_gateway_status(value: &str) -> Option<Self> {
        match value.to_uppercase().as_str() {
            "SUCCEEDED" | "COMPLETED" | "PAID" => Some(BookingStatus::Paid),
            "EXPIRED" => Some(BookingStatus::Expired),
            _ => None,
        }
    }
}

impl Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_success_variants_map_to_paid() {
        assert_eq!(
            BookingStatus::from_gateway_status("SUCCEEDED"),
            Some(BookingStatus::Paid)
        );
        assert_eq!(
            BookingStatus::from_gateway_status("COMPLETED"),
            Some(BookingStatus::Paid)
        );
        assert_eq!(
            BookingStatus::from_gateway_status("paid"),
            Some(BookingStatus::Paid)
        );
    }

    #[test]
    fn gateway_expired_maps_to_expired() {
        assert_eq!(
            BookingStatus::from_gateway_status("EXPIRED"),
            Some(BookingStatus::Expired)
        );
    }

    #[test]
    fn unknown_gateway_status_is_ignored() {
        assert_eq!(BookingStatus::from_gateway_status("PENDING"), None);
        assert_eq!(BookingStatus::from_gateway_status("FAILED"), None);
    }
}
