use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{
    entities::bookings::BookingEntity,
    repositories::{replica::ReplicaStore, settlement::SettlementRepository},
    value_objects::{
        enums::booking_statuses::BookingStatus,
        gateway_callback::{GatewayCallback, booking_id_from_external_ref},
        settlement::{CallbackAck, SettlementOutcome},
    },
};

#[derive(Debug, Error)]
pub enum SettlementError {
    #[error("callback token mismatch")]
    Forbidden,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl SettlementError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            SettlementError::Forbidden => StatusCode::FORBIDDEN,
            SettlementError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Handles of the notification that can be matched against stored gateway
/// state, tried in order until one resolves a booking.
enum CorrelationKey {
    QrArtifact(String),
    VaArtifact(String),
    ExternalReference(Uuid),
    PaymentId(String),
}

pub struct SettlementUseCase<S, R>
where
    S: SettlementRepository + Send + Sync + 'static,
    R: ReplicaStore + Send + Sync + 'static,
{
    repo: Arc<S>,
    replica: Option<Arc<R>>,
    callback_token: String,
}

impl<S, R> SettlementUseCase<S, R>
where
    S: SettlementRepository + Send + Sync + 'static,
    R: ReplicaStore + Send + Sync + 'static,
{
    pub fn new(repo: Arc<S>, replica: Option<Arc<R>>, callback_token: String) -> Self {
        Self {
            repo,
            replica,
            callback_token,
        }
    }

    /// Processes one gateway notification. Returns an ack for every payload
    /// that was understood, whether or not it changed anything; only an
    /// invalid callback token or a storage failure is surfaced as an error.
    pub async fn handle_callback(
        &self,
        token: Option<&str>,
        raw: serde_json::Value,
    ) -> Result<CallbackAck, SettlementError> {
        if token != Some(self.callback_token.as_str()) {
            warn!("settlement: callback rejected, token mismatch");
            return Err(SettlementError::Forbidden);
        }

        let callback = GatewayCallback::from_value(&raw);

        let Some(booking) = self.resolve_booking(&callback).await? else {
            info!(
                event = ?callback.event,
                external_id = ?callback.external_id,
                "settlement: notification does not match any booking, acknowledged"
            );
            return Ok(CallbackAck::ignored());
        };

        let classified = callback
            .status
            .as_deref()
            .and_then(BookingStatus::from_gateway_status);

        match classified {
            Some(BookingStatus::Paid) if booking.status == BookingStatus::Pending.as_str() => {
                self.settle(&booking, &callback, raw).await
            }
            Some(status) => {
                // Booking status only moves forward while PENDING. A replay
                // against a paid booking, or a late retry after the sweep
                // completed it, keeps the raw payload for audit but leaves
                // the status where it is.
                let recorded = if booking.status == BookingStatus::Pending.as_str() {
                    status
                } else {
                    BookingStatus::from_str(&booking.status).unwrap_or(BookingStatus::Pending)
                };
                self.repo
                    .record_status(booking.id, recorded, raw)
                    .await
                    .map_err(SettlementError::Internal)?;
                info!(
                    booking_id = %booking.id,
                    status = recorded.as_str(),
                    "settlement: notification recorded without settlement"
                );
                Ok(CallbackAck::applied(booking.id, recorded.as_str()))
            }
            None => {
                // Unknown gateway status. Keep the payload, leave the booking
                // status alone.
                let current = BookingStatus::from_str(&booking.status)
                    .unwrap_or(BookingStatus::Pending);
                self.repo
                    .record_status(booking.id, current, raw)
                    .await
                    .map_err(SettlementError::Internal)?;
                info!(
                    booking_id = %booking.id,
                    gateway_status = ?callback.status,
                    "settlement: unclassified gateway status recorded"
                );
                Ok(CallbackAck::applied(booking.id, current.as_str()))
            }
        }
    }

    async fn settle(
        &self,
        booking: &BookingEntity,
        callback: &GatewayCallback,
        raw: serde_json::Value,
    ) -> Result<CallbackAck, SettlementError> {
        let outcome = self
            .repo
            .settle_paid(booking.id, callback.amount_minor(), raw)
            .await
            .map_err(SettlementError::Internal)?;

        match outcome {
            SettlementOutcome::AlreadySettled => {
                // Lost the race with a concurrent delivery; the winner already
                // decremented inventory.
                info!(
                    booking_id = %booking.id,
                    "settlement: duplicate delivery, booking already settled"
                );
            }
            SettlementOutcome::Settled(mirror) => {
                info!(
                    booking_id = %booking.id,
                    ledger_groups = mirror.groups.len(),
                    "settlement: booking paid, inventory decremented"
                );
                if let Some(replica) = &self.replica {
                    if let Err(err) = replica.mirror_settlement(&mirror).await {
                        warn!(
                            booking_id = %booking.id,
                            error = %err,
                            "settlement: replica mirror failed, continuing"
                        );
                    }
                }
            }
        }

        Ok(CallbackAck::applied(booking.id, BookingStatus::Paid.as_str()))
    }

    async fn resolve_booking(
        &self,
        callback: &GatewayCallback,
    ) -> Result<Option<BookingEntity>, SettlementError> {
        for key in correlation_keys(callback) {
            let found = match key {
                CorrelationKey::QrArtifact(id) | CorrelationKey::VaArtifact(id) => self
                    .repo
                    .find_booking_by_gateway_reference(&id)
                    .await
                    .map_err(SettlementError::Internal)?,
                CorrelationKey::ExternalReference(booking_id) => self
                    .repo
                    .find_booking_by_id(booking_id)
                    .await
                    .map_err(SettlementError::Internal)?,
                CorrelationKey::PaymentId(id) => self
                    .repo
                    .find_booking_by_gateway_reference(&id)
                    .await
                    .map_err(SettlementError::Internal)?,
            };
            if found.is_some() {
                return Ok(found);
            }
        }
        Ok(None)
    }
}

fn correlation_keys(callback: &GatewayCallback) -> Vec<CorrelationKey> {
    let mut keys = Vec::new();
    if let Some(qr_id) = callback.qr_artifact_id() {
        keys.push(CorrelationKey::QrArtifact(qr_id.to_string()));
    }
    if let Some(va_id) = callback.callback_virtual_account_id.clone() {
        keys.push(CorrelationKey::VaArtifact(va_id));
    }
    if let Some(external_ref) = callback.external_reference() {
        if let Some(booking_id) = booking_id_from_external_ref(external_ref) {
            keys.push(CorrelationKey::ExternalReference(booking_id));
        }
    }
    if let Some(payment_id) = callback.payment_id.clone() {
        keys.push(CorrelationKey::PaymentId(payment_id));
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mockall::predicate::eq;
    use serde_json::json;

    use crate::domain::repositories::{
        replica::MockReplicaStore, settlement::MockSettlementRepository,
    };
    use crate::domain::value_objects::settlement::SettlementMirror;

    const TOKEN: &str = "cb-secret";

    fn booking_with_status(status: &str) -> BookingEntity {
        let now = Utc::now();
        BookingEntity {
            id: Uuid::new_v4(),
            booking_code: "FB-9Q4WZT1M".to_string(),
            user_id: Some(Uuid::new_v4()),
            contact_name: "Kadek Ayu".to_string(),
            contact_email: "kadek@example.com".to_string(),
            contact_phone: "+6287712345678".to_string(),
            subtotal: 300_000,
            port_fee: 10_000,
            addons_total: 0,
            total_amount: 310_000,
            currency: "IDR".to_string(),
            payment_method: Some("QRIS".to_string()),
            gateway_channel: Some("QRIS".to_string()),
            gateway_reference_id: Some("qr_1".to_string()),
            invoice_expiry_at: Some(now),
            paid_amount: None,
            paid_at: None,
            gateway_callback: None,
            status: status.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn empty_mirror(booking_id: Uuid) -> SettlementMirror {
        SettlementMirror {
            booking_id,
            groups: Vec::new(),
        }
    }

    fn usecase(
        repo: MockSettlementRepository,
        replica: Option<MockReplicaStore>,
    ) -> SettlementUseCase<MockSettlementRepository, MockReplicaStore> {
        SettlementUseCase::new(Arc::new(repo), replica.map(Arc::new), TOKEN.to_string())
    }

    #[tokio::test]
    async fn rejects_wrong_callback_token() {
        let usecase = usecase(MockSettlementRepository::new(), None);
        let err = usecase
            .handle_callback(Some("not-the-token"), json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, SettlementError::Forbidden));
    }

    #[tokio::test]
    async fn acknowledges_notification_for_unknown_booking() {
        let mut repo = MockSettlementRepository::new();
        repo.expect_find_booking_by_gateway_reference()
            .returning(|_| Box::pin(async { Ok(None) }));

        let usecase = usecase(repo, None);
        let ack = usecase
            .handle_callback(
                Some(TOKEN),
                json!({"qr_id": "qr_unknown", "status": "COMPLETED"}),
            )
            .await
            .unwrap();
        assert!(ack.ok);
        assert!(ack.booking_id.is_none());
    }

    #[tokio::test]
    async fn settles_pending_booking_and_mirrors() {
        let booking = booking_with_status("pending");
        let booking_id = booking.id;

        let mut repo = MockSettlementRepository::new();
        repo.expect_find_booking_by_gateway_reference()
            .with(eq("qr_1"))
            .returning(move |_| {
                let booking = booking.clone();
                Box::pin(async move { Ok(Some(booking)) })
            });
        repo.expect_settle_paid()
            .withf(move |id, amount, _| *id == booking_id && *amount == Some(310_000))
            .times(1)
            .returning(move |id, _, _| {
                Box::pin(async move { Ok(SettlementOutcome::Settled(empty_mirror(id))) })
            });

        let mut replica = MockReplicaStore::new();
        replica
            .expect_mirror_settlement()
            .times(1)
            .returning(|_| Box::pin(async { Ok(()) }));

        let usecase = usecase(repo, Some(replica));
        let ack = usecase
            .handle_callback(
                Some(TOKEN),
                json!({"qr_id": "qr_1", "status": "COMPLETED", "amount": 310000}),
            )
            .await
            .unwrap();
        assert_eq!(ack.booking_id, Some(booking_id));
        assert_eq!(ack.status.as_deref(), Some("paid"));
    }

    #[tokio::test]
    async fn duplicate_delivery_does_not_settle_twice() {
        let booking = booking_with_status("paid");
        let booking_id = booking.id;

        let mut repo = MockSettlementRepository::new();
        repo.expect_find_booking_by_gateway_reference()
            .returning(move |_| {
                let booking = booking.clone();
                Box::pin(async move { Ok(Some(booking)) })
            });
        // Replay against a paid booking records the payload only.
        repo.expect_settle_paid().times(0);
        repo.expect_record_status()
            .withf(move |id, status, _| *id == booking_id && *status == BookingStatus::Paid)
            .times(1)
            .returning(|_, _, _| Box::pin(async { Ok(()) }));

        let usecase = usecase(repo, None);
        let ack = usecase
            .handle_callback(
                Some(TOKEN),
                json!({"qr_id": "qr_1", "status": "COMPLETED", "amount": 310000}),
            )
            .await
            .unwrap();
        assert_eq!(ack.status.as_deref(), Some("paid"));
    }

    #[tokio::test]
    async fn late_paid_retry_leaves_completed_booking_untouched() {
        let booking = booking_with_status("completed");
        let booking_id = booking.id;

        let mut repo = MockSettlementRepository::new();
        repo.expect_find_booking_by_gateway_reference()
            .returning(move |_| {
                let booking = booking.clone();
                Box::pin(async move { Ok(Some(booking)) })
            });
        // The sweep already moved the booking past PAID; a retried success
        // notification must not re-enter settlement or regress the status.
        repo.expect_settle_paid().times(0);
        repo.expect_record_status()
            .withf(move |id, status, _| *id == booking_id && *status == BookingStatus::Completed)
            .times(1)
            .returning(|_, _, _| Box::pin(async { Ok(()) }));

        let usecase = usecase(repo, None);
        let ack = usecase
            .handle_callback(
                Some(TOKEN),
                json!({"qr_id": "qr_1", "status": "SUCCEEDED", "amount": 310000}),
            )
            .await
            .unwrap();
        assert!(ack.ok);
        assert_eq!(ack.status.as_deref(), Some("completed"));
    }

    #[tokio::test]
    async fn expired_notification_does_not_overwrite_cancelled_booking() {
        let booking = booking_with_status("cancelled");
        let booking_id = booking.id;

        let mut repo = MockSettlementRepository::new();
        repo.expect_find_booking_by_gateway_reference()
            .returning(move |_| {
                let booking = booking.clone();
                Box::pin(async move { Ok(Some(booking)) })
            });
        repo.expect_settle_paid().times(0);
        repo.expect_record_status()
            .withf(move |id, status, _| *id == booking_id && *status == BookingStatus::Cancelled)
            .times(1)
            .returning(|_, _, _| Box::pin(async { Ok(()) }));

        let usecase = usecase(repo, None);
        let ack = usecase
            .handle_callback(Some(TOKEN), json!({"qr_id": "qr_1", "status": "EXPIRED"}))
            .await
            .unwrap();
        assert_eq!(ack.status.as_deref(), Some("cancelled"));
    }

    #[tokio::test]
    async fn expired_notification_records_without_settling() {
        let booking = booking_with_status("pending");
        let booking_id = booking.id;

        let mut repo = MockSettlementRepository::new();
        repo.expect_find_booking_by_gateway_reference()
            .returning(move |_| {
                let booking = booking.clone();
                Box::pin(async move { Ok(Some(booking)) })
            });
        repo.expect_settle_paid().times(0);
        repo.expect_record_status()
            .withf(move |id, status, _| *id == booking_id && *status == BookingStatus::Expired)
            .times(1)
            .returning(|_, _, _| Box::pin(async { Ok(()) }));

        let usecase = usecase(repo, None);
        let ack = usecase
            .handle_callback(Some(TOKEN), json!({"qr_id": "qr_1", "status": "EXPIRED"}))
            .await
            .unwrap();
        assert_eq!(ack.status.as_deref(), Some("expired"));
    }

    #[tokio::test]
    async fn qr_artifact_id_wins_over_external_reference() {
        let booking = booking_with_status("pending");
        let booking_id = booking.id;

        let mut repo = MockSettlementRepository::new();
        repo.expect_find_booking_by_gateway_reference()
            .with(eq("qr_1"))
            .times(1)
            .returning(move |_| {
                let booking = booking.clone();
                Box::pin(async move { Ok(Some(booking)) })
            });
        // external_id carries a different uuid; it must not be consulted once
        // the qr handle resolves.
        repo.expect_find_booking_by_id().times(0);
        repo.expect_settle_paid().returning(move |id, _, _| {
            Box::pin(async move { Ok(SettlementOutcome::Settled(empty_mirror(id))) })
        });

        let usecase = usecase(repo, None);
        let ack = usecase
            .handle_callback(
                Some(TOKEN),
                json!({
                    "qr_id": "qr_1",
                    "external_id": Uuid::new_v4().to_string(),
                    "status": "SUCCEEDED",
                }),
            )
            .await
            .unwrap();
        assert_eq!(ack.booking_id, Some(booking_id));
    }

    #[tokio::test]
    async fn replica_failure_is_swallowed() {
        let booking = booking_with_status("pending");
        let booking_id = booking.id;

        let mut repo = MockSettlementRepository::new();
        repo.expect_find_booking_by_gateway_reference()
            .returning(move |_| {
                let booking = booking.clone();
                Box::pin(async move { Ok(Some(booking)) })
            });
        repo.expect_settle_paid().returning(move |id, _, _| {
            Box::pin(async move { Ok(SettlementOutcome::Settled(empty_mirror(id))) })
        });

        let mut replica = MockReplicaStore::new();
        replica
            .expect_mirror_settlement()
            .returning(|_| Box::pin(async { Err(anyhow::anyhow!("replica unreachable")) }));

        let usecase = usecase(repo, Some(replica));
        let ack = usecase
            .handle_callback(
                Some(TOKEN),
                json!({"qr_id": "qr_1", "status": "COMPLETED"}),
            )
            .await
            .unwrap();
        assert_eq!(ack.booking_id, Some(booking_id));
        assert_eq!(ack.status.as_deref(), Some("paid"));
    }

    #[tokio::test]
    async fn unclassified_status_keeps_current_booking_status() {
        let booking = booking_with_status("pending");
        let booking_id = booking.id;

        let mut repo = MockSettlementRepository::new();
        repo.expect_find_booking_by_gateway_reference()
            .returning(move |_| {
                let booking = booking.clone();
                Box::pin(async move { Ok(Some(booking)) })
            });
        repo.expect_settle_paid().times(0);
        repo.expect_record_status()
            .withf(move |id, status, _| *id == booking_id && *status == BookingStatus::Pending)
            .times(1)
            .returning(|_, _, _| Box::pin(async { Ok(()) }));

        let usecase = usecase(repo, None);
        let ack = usecase
            .handle_callback(Some(TOKEN), json!({"qr_id": "qr_1", "status": "INACTIVE"}))
            .await
            .unwrap();
        assert_eq!(ack.status.as_deref(), Some("pending"));
    }
}
