use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

/// What the atomic settlement transaction changed, in the shape the replica
/// store needs to mirror it.
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementMirror {
    pub booking_id: Uuid,
    pub groups: Vec<LedgerGroupMirror>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerGroupMirror {
    pub inventory_id: Uuid,
    pub schedule_id: Uuid,
    pub inventory_date: NaiveDate,
    pub total_capacity: i32,
    pub booked_units: i32,
    pub available_units: i32,
    pub item_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SettlementOutcome {
    /// The booking had already left PENDING (paid, completed, cancelled or
    /// expired); nothing was touched.
    AlreadySettled,
    Settled(SettlementMirror),
}

#[derive(Debug, Clone, Serialize)]
pub struct CallbackAck {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl CallbackAck {
    pub fn ignored() -> Self {
        Self {
            ok: true,
            booking_id: None,
            status: None,
        }
    }

    pub fn applied(booking_id: Uuid, status: impl Into<String>) -> Self {
        Self {
            ok: true,
            booking_id: Some(booking_id),
            status: Some(status.into()),
        }
    }
}
