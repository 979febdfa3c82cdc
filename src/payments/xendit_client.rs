use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::error;

const DEFAULT_BASE_URL: &str = "https://api.xendit.co";

/// Minimal Xendit client built on reqwest. Credentials use Basic auth with
/// the secret key as username and an empty password.
pub struct XenditClient {
    http: reqwest::Client,
    secret_key: String,
    base_url: String,
}

#[derive(Debug, Error)]
pub enum GatewayCallError {
    #[error("payment gateway credentials are not configured")]
    Unconfigured,
    /// The gateway refused to create a second artifact for the same external
    /// reference and handed back the existing one instead.
    #[error("artifact already exists at the gateway: {existing_id}")]
    Duplicate { existing_id: String },
    #[error("gateway rejected the request: {detail}")]
    Rejected {
        error_code: Option<String>,
        detail: String,
    },
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct QrArtifact {
    pub id: String,
    #[serde(default)]
    pub external_id: Option<String>,
    pub qr_string: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VaArtifact {
    pub id: String,
    pub bank_code: String,
    pub account_number: String,
    #[serde(default)]
    pub expected_amount: Option<i64>,
    #[serde(default)]
    pub expiration_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChargeArtifact {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub redirect_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CardDetails {
    pub card_number: String,
    pub exp_month: String,
    pub exp_year: String,
    pub cvn: String,
    pub cardholder_name: String,
    pub cardholder_email: Option<String>,
    pub cardholder_phone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GatewayErrorEnvelope {
    error_code: Option<String>,
    message: Option<String>,
    /// Some duplicate-creation rejections carry a handle to the artifact that
    /// already exists for the offending external reference.
    existing: Option<ExistingArtifactRef>,
}

#[derive(Debug, Deserialize)]
struct ExistingArtifactRef {
    id: Option<String>,
}

impl XenditClient {
    pub fn new(secret_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(secret_key: String, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key,
            base_url,
        }
    }

    fn basic_credentials(&self) -> Result<String, GatewayCallError> {
        if self.secret_key.is_empty() {
            return Err(GatewayCallError::Unconfigured);
        }
        Ok(format!(
            "Basic {}",
            BASE64.encode(format!("{}:", self.secret_key))
        ))
    }

    async fn ensure_success(
        resp: reqwest::Response,
        context: &str,
        fallback_existing_id: Option<&str>,
    ) -> Result<reqwest::Response, GatewayCallError> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        let envelope = serde_json::from_str::<GatewayErrorEnvelope>(&body).ok();
        let error_code = envelope.as_ref().and_then(|e| e.error_code.clone());
        let message = envelope.as_ref().and_then(|e| e.message.clone());

        error!(
            status = %status,
            gateway_error_code = ?error_code,
            gateway_error_message = ?message,
            response_body = %body,
            context = %context,
            "xendit api request failed"
        );

        if let Some(code) = error_code.as_deref() {
            if code.contains("DUPLICATE") {
                let existing_id = envelope
                    .as_ref()
                    .and_then(|e| e.existing.as_ref())
                    .and_then(|existing| existing.id.clone())
                    .or_else(|| fallback_existing_id.map(|id| id.to_string()));
                if let Some(existing_id) = existing_id {
                    return Err(GatewayCallError::Duplicate { existing_id });
                }
            }
        }

        Err(GatewayCallError::Rejected {
            error_code,
            detail: format!("{} (status {}): {}", context, status, body),
        })
    }

    /// Creates a dynamic QR code payable once for the given amount.
    /// https://developers.xendit.co/api-reference/#create-qr-code
    pub async fn create_qr_code(
        &self,
        external_ref: &str,
        amount: i64,
    ) -> Result<QrArtifact, GatewayCallError> {
        let credentials = self.basic_credentials()?;
        let body = json!({
            "external_id": external_ref,
            "type": "DYNAMIC",
            "amount": amount,
        });

        let resp = self
            .http
            .post(format!("{}/qr_codes", self.base_url))
            .header(AUTHORIZATION, credentials)
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "create qr code", Some(external_ref)).await?;

        Ok(resp.json().await?)
    }

    pub async fn get_qr_code(&self, qr_id: &str) -> Result<QrArtifact, GatewayCallError> {
        let credentials = self.basic_credentials()?;
        let resp = self
            .http
            .get(format!("{}/qr_codes/{}", self.base_url, qr_id))
            .header(AUTHORIZATION, credentials)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "get qr code", None).await?;

        Ok(resp.json().await?)
    }

    /// Creates a single-use, closed-amount virtual account.
    /// https://developers.xendit.co/api-reference/#create-fixed-virtual-accounts
    pub async fn create_virtual_account(
        &self,
        external_ref: &str,
        bank_code: &str,
        display_name: &str,
        expected_amount: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<VaArtifact, GatewayCallError> {
        let credentials = self.basic_credentials()?;
        let body = json!({
            "external_id": external_ref,
            "bank_code": bank_code,
            "name": display_name,
            "expected_amount": expected_amount,
            "is_single_use": true,
            "is_closed": true,
            "expiration_date": expires_at.to_rfc3339(),
        });

        let resp = self
            .http
            .post(format!("{}/callback_virtual_accounts", self.base_url))
            .header(AUTHORIZATION, credentials)
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;
        let resp =
            Self::ensure_success(resp, "create virtual account", Some(external_ref)).await?;

        Ok(resp.json().await?)
    }

    pub async fn get_virtual_account(&self, va_id: &str) -> Result<VaArtifact, GatewayCallError> {
        let credentials = self.basic_credentials()?;
        let resp = self
            .http
            .get(format!(
                "{}/callback_virtual_accounts/{}",
                self.base_url, va_id
            ))
            .header(AUTHORIZATION, credentials)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "get virtual account", None).await?;

        Ok(resp.json().await?)
    }

    /// Registers a reusable tokenised payment method for the card.
    pub async fn register_payment_method(
        &self,
        card: &CardDetails,
    ) -> Result<String, GatewayCallError> {
        let credentials = self.basic_credentials()?;
        let body = json!({
            "type": "CARD",
            "card": {
                "card_number": card.card_number,
                "exp_month": card.exp_month,
                "exp_year": card.exp_year,
                "cvn": card.cvn,
                "cardholder_name": card.cardholder_name,
                "cardholder_email": card.cardholder_email,
                "cardholder_phone": card.cardholder_phone,
            },
        });

        let resp = self
            .http
            .post(format!("{}/payment_methods", self.base_url))
            .header(AUTHORIZATION, credentials)
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "register payment method", None).await?;

        #[derive(Deserialize)]
        struct PaymentMethodResp {
            id: String,
        }

        let parsed: PaymentMethodResp = resp.json().await?;
        Ok(parsed.id)
    }

    pub async fn create_charge(
        &self,
        external_ref: &str,
        payment_method_id: &str,
        amount: i64,
    ) -> Result<ChargeArtifact, GatewayCallError> {
        let credentials = self.basic_credentials()?;
        let body = json!({
            "external_id": external_ref,
            "payment_method_id": payment_method_id,
            "amount": amount,
            "capture": true,
        });

        let resp = self
            .http
            .post(format!("{}/charges", self.base_url))
            .header(AUTHORIZATION, credentials)
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "create charge", Some(external_ref)).await?;

        Ok(resp.json().await?)
    }

    pub async fn get_charge(&self, charge_id: &str) -> Result<ChargeArtifact, GatewayCallError> {
        let credentials = self.basic_credentials()?;
        let resp = self
            .http
            .get(format!("{}/charges/{}", self.base_url, charge_id))
            .header(AUTHORIZATION, credentials)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "get charge", None).await?;

        Ok(resp.json().await?)
    }
}
