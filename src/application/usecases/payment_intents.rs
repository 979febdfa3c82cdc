use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{
    entities::bookings::BookingEntity,
    repositories::bookings::BookingRepository,
    value_objects::{
        enums::{booking_statuses::BookingStatus, payment_methods::PaymentMethod},
        payment_intents::{
            CardIntentDto, CreateCardIntentRequest, PaymentIntentUpdate, QrIntentDto, VaIntentDto,
        },
    },
};
use crate::payments::xendit_client::{
    CardDetails, ChargeArtifact, GatewayCallError, QrArtifact, VaArtifact, XenditClient,
};

/// Every created artifact is payable for this long; after that a fresh one is
/// requested instead of reusing the stale handle.
pub const INVOICE_TTL_MINUTES: i64 = 15;

const QRIS_CHANNEL: &str = "QRIS";
const CARD_CHANNEL: &str = "CARDS";
const SETTLEMENT_CURRENCY: &str = "IDR";

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait PaymentGateway: Send + Sync {
    async fn create_qr_code(
        &self,
        external_ref: &str,
        amount: i64,
    ) -> Result<QrArtifact, GatewayCallError>;
    async fn get_qr_code(&self, qr_id: &str) -> Result<QrArtifact, GatewayCallError>;
    async fn create_virtual_account(
        &self,
        external_ref: &str,
        bank_code: &str,
        display_name: &str,
        expected_amount: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<VaArtifact, GatewayCallError>;
    async fn get_virtual_account(&self, va_id: &str) -> Result<VaArtifact, GatewayCallError>;
    async fn register_payment_method(
        &self,
        card: &CardDetails,
    ) -> Result<String, GatewayCallError>;
    async fn create_charge(
        &self,
        external_ref: &str,
        payment_method_id: &str,
        amount: i64,
    ) -> Result<ChargeArtifact, GatewayCallError>;
    async fn get_charge(&self, charge_id: &str) -> Result<ChargeArtifact, GatewayCallError>;
}

#[async_trait]
impl PaymentGateway for XenditClient {
    async fn create_qr_code(
        &self,
        external_ref: &str,
        amount: i64,
    ) -> Result<QrArtifact, GatewayCallError> {
        self.create_qr_code(external_ref, amount).await
    }

    async fn get_qr_code(&self, qr_id: &str) -> Result<QrArtifact, GatewayCallError> {
        self.get_qr_code(qr_id).await
    }

    async fn create_virtual_account(
        &self,
        external_ref: &str,
        bank_code: &str,
        display_name: &str,
        expected_amount: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<VaArtifact, GatewayCallError> {
        self.create_virtual_account(external_ref, bank_code, display_name, expected_amount, expires_at)
            .await
    }

    async fn get_virtual_account(&self, va_id: &str) -> Result<VaArtifact, GatewayCallError> {
        self.get_virtual_account(va_id).await
    }

    async fn register_payment_method(
        &self,
        card: &CardDetails,
    ) -> Result<String, GatewayCallError> {
        self.register_payment_method(card).await
    }

    async fn create_charge(
        &self,
        external_ref: &str,
        payment_method_id: &str,
        amount: i64,
    ) -> Result<ChargeArtifact, GatewayCallError> {
        self.create_charge(external_ref, payment_method_id, amount)
            .await
    }

    async fn get_charge(&self, charge_id: &str) -> Result<ChargeArtifact, GatewayCallError> {
        self.get_charge(charge_id).await
    }
}

#[derive(Debug, Error)]
pub enum PaymentIntentError {
    #[error("booking not found")]
    BookingNotFound,
    #[error("caller does not own this booking")]
    Forbidden,
    #[error("booking is not payable in status {0}")]
    InvalidState(String),
    #[error("payment gateway rejected the request: {detail}")]
    Gateway { detail: String },
    #[error("payment gateway credentials are not configured")]
    MissingConfig,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl PaymentIntentError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            PaymentIntentError::BookingNotFound => StatusCode::NOT_FOUND,
            PaymentIntentError::Forbidden => StatusCode::FORBIDDEN,
            PaymentIntentError::InvalidState(_) => StatusCode::BAD_REQUEST,
            PaymentIntentError::Gateway { .. } => StatusCode::BAD_GATEWAY,
            PaymentIntentError::MissingConfig => StatusCode::INTERNAL_SERVER_ERROR,
            PaymentIntentError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn map_gateway_error(err: GatewayCallError) -> PaymentIntentError {
    match err {
        GatewayCallError::Unconfigured => PaymentIntentError::MissingConfig,
        GatewayCallError::Rejected { detail, .. } => PaymentIntentError::Gateway { detail },
        GatewayCallError::Duplicate { existing_id } => PaymentIntentError::Gateway {
            detail: format!("unresolved duplicate artifact {existing_id}"),
        },
        GatewayCallError::Transport(err) => PaymentIntentError::Gateway {
            detail: err.to_string(),
        },
    }
}

pub struct PaymentIntentUseCase<B, G>
where
    B: BookingRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    booking_repo: Arc<B>,
    gateway: Arc<G>,
    exchange_rate_idr: f64,
}

impl<B, G> PaymentIntentUseCase<B, G>
where
    B: BookingRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    pub fn new(booking_repo: Arc<B>, gateway: Arc<G>, exchange_rate_idr: f64) -> Self {
        Self {
            booking_repo,
            gateway,
            exchange_rate_idr,
        }
    }

    pub async fn create_qr_intent(
        &self,
        caller_id: Uuid,
        caller_email: Option<String>,
        booking_id: Uuid,
    ) -> Result<QrIntentDto, PaymentIntentError> {
        let booking = self
            .load_payable_booking(booking_id, caller_id, caller_email.as_deref())
            .await?;
        let now = Utc::now();

        if let Some(reference) =
            reusable_reference(&booking, PaymentMethod::Qris, QRIS_CHANNEL, now)
        {
            let artifact = self
                .gateway
                .get_qr_code(&reference)
                .await
                .map_err(map_gateway_error)?;
            info!(
                %booking_id,
                qr_id = %artifact.id,
                "payment_intents: reusing unexpired qr artifact"
            );
            return Ok(QrIntentDto {
                booking_id,
                qr_id: artifact.id,
                qr_string: artifact.qr_string,
                expires_at: booking.invoice_expiry_at.unwrap_or(now),
            });
        }

        let expires_at = now + Duration::minutes(INVOICE_TTL_MINUTES);
        let artifact = match self
            .gateway
            .create_qr_code(&booking.id.to_string(), booking.total_amount)
            .await
        {
            Ok(artifact) => artifact,
            Err(GatewayCallError::Duplicate { existing_id }) => {
                info!(
                    %booking_id,
                    existing_id = %existing_id,
                    "payment_intents: gateway reported duplicate qr, fetching existing artifact"
                );
                self.gateway
                    .get_qr_code(&existing_id)
                    .await
                    .map_err(map_gateway_error)?
            }
            Err(err) => return Err(map_gateway_error(err)),
        };

        self.booking_repo
            .store_payment_intent(
                booking.id,
                PaymentIntentUpdate {
                    payment_method: PaymentMethod::Qris,
                    gateway_channel: QRIS_CHANNEL.to_string(),
                    gateway_reference_id: artifact.id.clone(),
                    invoice_expiry_at: expires_at,
                },
            )
            .await?;

        info!(
            %booking_id,
            qr_id = %artifact.id,
            %expires_at,
            "payment_intents: qr intent created"
        );

        Ok(QrIntentDto {
            booking_id,
            qr_id: artifact.id,
            qr_string: artifact.qr_string,
            expires_at,
        })
    }

    pub async fn create_va_intent(
        &self,
        caller_id: Uuid,
        caller_email: Option<String>,
        booking_id: Uuid,
        bank_code: String,
    ) -> Result<VaIntentDto, PaymentIntentError> {
        let booking = self
            .load_payable_booking(booking_id, caller_id, caller_email.as_deref())
            .await?;
        let now = Utc::now();
        let bank_code = bank_code.to_uppercase();
        let expected_amount = self.settlement_amount(&booking);

        if let Some(reference) =
            reusable_reference(&booking, PaymentMethod::VirtualAccount, &bank_code, now)
        {
            let artifact = self
                .gateway
                .get_virtual_account(&reference)
                .await
                .map_err(map_gateway_error)?;
            info!(
                %booking_id,
                va_id = %artifact.id,
                "payment_intents: reusing unexpired virtual account"
            );
            return Ok(VaIntentDto {
                booking_id,
                bank_code: artifact.bank_code,
                account_number: artifact.account_number,
                expected_amount: artifact.expected_amount.unwrap_or(expected_amount),
                expires_at: booking.invoice_expiry_at.unwrap_or(now),
            });
        }

        let expires_at = now + Duration::minutes(INVOICE_TTL_MINUTES);
        let artifact = match self
            .gateway
            .create_virtual_account(
                &booking.id.to_string(),
                &bank_code,
                &booking.contact_name,
                expected_amount,
                expires_at,
            )
            .await
        {
            Ok(artifact) => artifact,
            Err(GatewayCallError::Duplicate { existing_id }) => {
                info!(
                    %booking_id,
                    existing_id = %existing_id,
                    "payment_intents: gateway reported duplicate va, fetching existing artifact"
                );
                self.gateway
                    .get_virtual_account(&existing_id)
                    .await
                    .map_err(map_gateway_error)?
            }
            Err(err) => return Err(map_gateway_error(err)),
        };

        self.booking_repo
            .store_payment_intent(
                booking.id,
                PaymentIntentUpdate {
                    payment_method: PaymentMethod::VirtualAccount,
                    gateway_channel: bank_code.clone(),
                    gateway_reference_id: artifact.id.clone(),
                    invoice_expiry_at: expires_at,
                },
            )
            .await?;

        info!(
            %booking_id,
            va_id = %artifact.id,
            bank_code = %bank_code,
            expected_amount,
            %expires_at,
            "payment_intents: virtual account intent created"
        );

        Ok(VaIntentDto {
            booking_id,
            bank_code: artifact.bank_code,
            account_number: artifact.account_number,
            expected_amount: artifact.expected_amount.unwrap_or(expected_amount),
            expires_at,
        })
    }

    pub async fn create_card_intent(
        &self,
        caller_id: Uuid,
        caller_email: Option<String>,
        request: CreateCardIntentRequest,
    ) -> Result<CardIntentDto, PaymentIntentError> {
        let booking = self
            .load_payable_booking(request.booking_id, caller_id, caller_email.as_deref())
            .await?;
        let now = Utc::now();

        if let Some(reference) = reusable_reference(&booking, PaymentMethod::Card, CARD_CHANNEL, now)
        {
            let charge = self
                .gateway
                .get_charge(&reference)
                .await
                .map_err(map_gateway_error)?;
            info!(
                booking_id = %booking.id,
                charge_id = %charge.id,
                "payment_intents: reusing unexpired charge"
            );
            return Ok(CardIntentDto {
                booking_id: booking.id,
                charge_id: charge.id,
                status: charge.status,
                redirect_url: charge.redirect_url,
                expires_at: booking.invoice_expiry_at.unwrap_or(now),
            });
        }

        let card = CardDetails {
            card_number: request.card_number,
            exp_month: request.exp_month,
            exp_year: request.exp_year,
            cvn: request.cvn,
            cardholder_name: request.cardholder_name,
            cardholder_email: request.cardholder_email,
            cardholder_phone: request.cardholder_phone,
        };

        let payment_method_id = self
            .gateway
            .register_payment_method(&card)
            .await
            .map_err(map_gateway_error)?;

        let expires_at = now + Duration::minutes(INVOICE_TTL_MINUTES);
        let charge = self
            .gateway
            .create_charge(
                &charge_reference(booking.id),
                &payment_method_id,
                booking.total_amount,
            )
            .await
            .map_err(map_gateway_error)?;

        self.booking_repo
            .store_payment_intent(
                booking.id,
                PaymentIntentUpdate {
                    payment_method: PaymentMethod::Card,
                    gateway_channel: CARD_CHANNEL.to_string(),
                    gateway_reference_id: charge.id.clone(),
                    invoice_expiry_at: expires_at,
                },
            )
            .await?;

        if charge.redirect_url.is_some() {
            info!(
                booking_id = %booking.id,
                charge_id = %charge.id,
                "payment_intents: charge requires further customer action"
            );
        } else {
            info!(
                booking_id = %booking.id,
                charge_id = %charge.id,
                charge_status = %charge.status,
                "payment_intents: card charge created"
            );
        }

        Ok(CardIntentDto {
            booking_id: booking.id,
            charge_id: charge.id,
            status: charge.status,
            redirect_url: charge.redirect_url,
            expires_at,
        })
    }

    /// The VA rail settles in IDR only; foreign-currency totals are converted
    /// with the configured rate before being sent to the gateway.
    fn settlement_amount(&self, booking: &BookingEntity) -> i64 {
        if booking.currency == SETTLEMENT_CURRENCY {
            booking.total_amount
        } else {
            (booking.total_amount as f64 * self.exchange_rate_idr).round() as i64
        }
    }

    async fn load_payable_booking(
        &self,
        booking_id: Uuid,
        caller_id: Uuid,
        caller_email: Option<&str>,
    ) -> Result<BookingEntity, PaymentIntentError> {
        let booking = self
            .booking_repo
            .find_by_id(booking_id)
            .await?
            .ok_or(PaymentIntentError::BookingNotFound)?;

        self.ensure_owner(&booking, caller_id, caller_email).await?;

        match BookingStatus::from_str(&booking.status) {
            Some(BookingStatus::Pending) => Ok(booking),
            _ => {
                warn!(
                    %booking_id,
                    status = %booking.status,
                    "payment_intents: intent requested for non-pending booking"
                );
                Err(PaymentIntentError::InvalidState(booking.status.clone()))
            }
        }
    }

    async fn ensure_owner(
        &self,
        booking: &BookingEntity,
        caller_id: Uuid,
        caller_email: Option<&str>,
    ) -> Result<(), PaymentIntentError> {
        let Some(owner_id) = booking.user_id else {
            return Err(PaymentIntentError::Forbidden);
        };
        if owner_id == caller_id {
            return Ok(());
        }
        if let Some(email) = caller_email {
            if self.booking_repo.find_user_id_by_email(email).await? == Some(owner_id) {
                return Ok(());
            }
        }
        warn!(
            booking_id = %booking.id,
            %caller_id,
            "payment_intents: caller is not the booking owner"
        );
        Err(PaymentIntentError::Forbidden)
    }
}

/// An unexpired artifact for the same channel is reused instead of asking the
/// gateway for a new one.
fn reusable_reference(
    booking: &BookingEntity,
    method: PaymentMethod,
    channel: &str,
    now: DateTime<Utc>,
) -> Option<String> {
    if booking.payment_method.as_deref() != Some(method.as_str()) {
        return None;
    }
    if booking.gateway_channel.as_deref() != Some(channel) {
        return None;
    }
    if booking.invoice_expiry_at? <= now {
        return None;
    }
    booking.gateway_reference_id.clone()
}

/// Charge references get a random suffix so a retried card attempt never
/// collides with an earlier external reference; settlement strips the suffix
/// when resolving the booking.
fn charge_reference(booking_id: Uuid) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect::<String>()
        .to_lowercase();
    format!("{}-{}", booking_id, suffix)
}
