use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use std::sync::Arc;

use crate::application::usecases::payment_intents::{PaymentGateway, PaymentIntentUseCase};
use crate::auth::AuthUser;
use crate::config::config_model::DotEnvyConfig;
use crate::domain::{
    repositories::bookings::BookingRepository,
    value_objects::payment_intents::{
        CreateCardIntentRequest, CreateQrIntentRequest, CreateVaIntentRequest,
    },
};
use crate::infrastructure::axum_http::error_responses::into_error_response;
use crate::infrastructure::postgres::{
    postgres_connection::PgPoolSquad, repositories::bookings::BookingPostgres,
};
use crate::payments::xendit_client::XenditClient;

pub fn routes(db_pool: Arc<PgPoolSquad>, config: &DotEnvyConfig) -> Router {
    let booking_repository = BookingPostgres::new(Arc::clone(&db_pool));
    let gateway = XenditClient::new(config.gateway.secret_key.clone());
    let payment_intent_usecase = PaymentIntentUseCase::new(
        Arc::new(booking_repository),
        Arc::new(gateway),
        config.gateway.exchange_rate_idr,
    );

    Router::new()
        .route("/qr", post(create_qr_intent))
        .route("/virtual-account", post(create_va_intent))
        .route("/card", post(create_card_intent))
        .with_state(Arc::new(payment_intent_usecase))
}

pub async fn create_qr_intent<B, G>(
    State(payment_intent_usecase): State<Arc<PaymentIntentUseCase<B, G>>>,
    auth: AuthUser,
    Json(request): Json<CreateQrIntentRequest>,
) -> impl IntoResponse
where
    B: BookingRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    match payment_intent_usecase
        .create_qr_intent(auth.user_id, auth.email, request.booking_id)
        .await
    {
        Ok(dto) => (StatusCode::CREATED, Json(dto)).into_response(),
        Err(err) => into_error_response(err.status_code(), err.to_string()),
    }
}

pub async fn create_va_intent<B, G>(
    State(payment_intent_usecase): State<Arc<PaymentIntentUseCase<B, G>>>,
    auth: AuthUser,
    Json(request): Json<CreateVaIntentRequest>,
) -> impl IntoResponse
where
    B: BookingRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    match payment_intent_usecase
        .create_va_intent(auth.user_id, auth.email, request.booking_id, request.bank_code)
        .await
    {
        Ok(dto) => (StatusCode::CREATED, Json(dto)).into_response(),
        Err(err) => into_error_response(err.status_code(), err.to_string()),
    }
}

pub async fn create_card_intent<B, G>(
    State(payment_intent_usecase): State<Arc<PaymentIntentUseCase<B, G>>>,
    auth: AuthUser,
    Json(request): Json<CreateCardIntentRequest>,
) -> impl IntoResponse
where
    B: BookingRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    match payment_intent_usecase
        .create_card_intent(auth.user_id, auth.email, request)
        .await
    {
        Ok(dto) => (StatusCode::CREATED, Json(dto)).into_response(),
        Err(err) => into_error_response(err.status_code(), err.to_string()),
    }
}
