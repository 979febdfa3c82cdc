use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentMethod {
    Qris,
    VirtualAccount,
    Card,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Qris => "QRIS",
            PaymentMethod::VirtualAccount => "VIRTUAL_ACCOUNT",
            PaymentMethod::Card => "CARD",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "QRIS" => Some(PaymentMethod::Qris),
            "VIRTUAL_ACCOUNT" => Some(PaymentMethod::VirtualAccount),
            "CARD" => Some(PaymentMethod::Card),
            _ => None,
        }
    }
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
