use serde::Deserialize;
use uuid::Uuid;

/// The interesting subset of a gateway callback envelope. Everything is
/// optional because the three channels deliver differently shaped payloads;
/// the raw JSON is stored on the booking for audit either way.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GatewayCallback {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub amount: Option<serde_json::Value>,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub qr_id: Option<String>,
    #[serde(default)]
    pub qr_code: Option<QrCodeRef>,
    #[serde(default)]
    pub callback_virtual_account_id: Option<String>,
    #[serde(default)]
    pub payment_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QrCodeRef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub external_id: Option<String>,
}

impl GatewayCallback {
    pub fn from_value(raw: &serde_json::Value) -> Self {
        serde_json::from_value(raw.clone()).unwrap_or_default()
    }

    pub fn qr_artifact_id(&self) -> Option<&str> {
        self.qr_id
            .as_deref()
            .or_else(|| self.qr_code.as_ref().and_then(|qr| qr.id.as_deref()))
    }

    pub fn external_reference(&self) -> Option<&str> {
        self.external_id.as_deref().or_else(|| {
            self.qr_code
                .as_ref()
                .and_then(|qr| qr.external_id.as_deref())
        })
    }

    /// The paid amount may arrive as a JSON number or a numeric string.
    pub fn amount_minor(&self) -> Option<i64> {
        match self.amount.as_ref()? {
            serde_json::Value::Number(number) => number
                .as_i64()
                .or_else(|| number.as_f64().map(|value| value.round() as i64)),
            serde_json::Value::String(text) => text.parse::<i64>().ok(),
            _ => None,
        }
    }
}

/// Recovers a booking id from the gateway's external-reference string.
/// References are created as `<booking uuid>` or `<booking uuid>-<suffix>`,
/// so the first five hyphen-delimited segments are tried as a UUID before
/// falling back to parsing the whole string.
pub fn booking_id_from_external_ref(raw: &str) -> Option<Uuid> {
    let prefix = raw.split('-').take(5).collect::<Vec<_>>().join("-");
    Uuid::parse_str(&prefix)
        .ok()
        .or_else(|| Uuid::parse_str(raw).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_uuid_reference() {
        let id = Uuid::new_v4();
        assert_eq!(booking_id_from_external_ref(&id.to_string()), Some(id));
    }

    #[test]
    fn strips_appended_suffix_from_reference() {
        let id = Uuid::new_v4();
        let reference = format!("{}-x7k2f9", id);
        assert_eq!(booking_id_from_external_ref(&reference), Some(id));
    }

    #[test]
    fn rejects_garbage_reference() {
        assert_eq!(booking_id_from_external_ref("order-1234"), None);
        assert_eq!(booking_id_from_external_ref(""), None);
    }

    #[test]
    fn amount_accepts_number_or_string() {
        let callback = GatewayCallback::from_value(&serde_json::json!({ "amount": 510000 }));
        assert_eq!(callback.amount_minor(), Some(510000));

        let callback = GatewayCallback::from_value(&serde_json::json!({ "amount": "510000" }));
        assert_eq!(callback.amount_minor(), Some(510000));

        let callback = GatewayCallback::from_value(&serde_json::json!({}));
        assert_eq!(callback.amount_minor(), None);
    }

    #[test]
    fn qr_artifact_id_reads_nested_envelope() {
        let callback = GatewayCallback::from_value(
            &serde_json::json!({ "qr_code": { "id": "qr_123", "external_id": "ref" } }),
        );
        assert_eq!(callback.qr_artifact_id(), Some("qr_123"));
        assert_eq!(callback.external_reference(), Some("ref"));
    }

    #[test]
    fn malformed_payload_degrades_to_empty_callback() {
        let callback = GatewayCallback::from_value(&serde_json::json!({ "status": 42 }));
        assert!(callback.status.is_none());
    }
}
