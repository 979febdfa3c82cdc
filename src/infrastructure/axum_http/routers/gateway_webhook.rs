use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
};
use std::sync::Arc;

use crate::application::usecases::settlement::SettlementUseCase;
use crate::config::config_model::DotEnvyConfig;
use crate::domain::repositories::{replica::ReplicaStore, settlement::SettlementRepository};
use crate::infrastructure::axum_http::error_responses::into_error_response;
use crate::infrastructure::postgres::{
    postgres_connection::PgPoolSquad, repositories::settlement::SettlementPostgres,
};
use crate::infrastructure::replica::supabase_rest::SupabaseRestReplica;

const CALLBACK_TOKEN_HEADER: &str = "x-callback-token";

pub fn routes(db_pool: Arc<PgPoolSquad>, config: &DotEnvyConfig) -> Router {
    let settlement_repository = SettlementPostgres::new(Arc::clone(&db_pool));
    let replica = config
        .replica
        .as_ref()
        .map(|replica| Arc::new(SupabaseRestReplica::new(replica)));
    let settlement_usecase = SettlementUseCase::new(
        Arc::new(settlement_repository),
        replica,
        config.gateway.callback_token.clone(),
    );

    Router::new()
        .route("/payment", post(receive_payment_callback))
        .with_state(Arc::new(settlement_usecase))
}

/// The gateway retries until it sees 200, so every understood notification is
/// acked even when it changes nothing.
pub async fn receive_payment_callback<S, R>(
    State(settlement_usecase): State<Arc<SettlementUseCase<S, R>>>,
    headers: HeaderMap,
    Json(payload): Json<serde_json::Value>,
) -> impl IntoResponse
where
    S: SettlementRepository + Send + Sync + 'static,
    R: ReplicaStore + Send + Sync + 'static,
{
    let token = headers
        .get(CALLBACK_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok());

    match settlement_usecase.handle_callback(token, payload).await {
        Ok(ack) => (StatusCode::OK, Json(ack)).into_response(),
        Err(err) => into_error_response(err.status_code(), err.to_string()),
    }
}
