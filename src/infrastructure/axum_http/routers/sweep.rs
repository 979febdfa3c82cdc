use axum::{
    Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post,
};
use std::sync::Arc;

use crate::application::usecases::sweep::SweepUseCase;
use crate::domain::repositories::sweep::SweepRepository;
use crate::infrastructure::axum_http::error_responses::into_error_response;
use crate::infrastructure::postgres::{
    postgres_connection::PgPoolSquad, repositories::sweep::SweepPostgres,
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let sweep_repository = SweepPostgres::new(Arc::clone(&db_pool));
    let sweep_usecase = SweepUseCase::new(Arc::new(sweep_repository));

    Router::new()
        .route("/run", post(run_sweep))
        .with_state(Arc::new(sweep_usecase))
}

/// Manual trigger for the same pass the background loop runs on its interval.
pub async fn run_sweep<R>(
    State(sweep_usecase): State<Arc<SweepUseCase<R>>>,
) -> impl IntoResponse
where
    R: SweepRepository + Send + Sync + 'static,
{
    match sweep_usecase.run().await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(err) => into_error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}
