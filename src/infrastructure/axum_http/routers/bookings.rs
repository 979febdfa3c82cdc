use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::usecases::booking_intake::BookingIntakeUseCase;
use crate::auth::AuthUser;
use crate::domain::{
    repositories::{bookings::BookingRepository, schedules::ScheduleRepository},
    value_objects::booking_intake::NewBookingRequest,
};
use crate::infrastructure::axum_http::error_responses::into_error_response;
use crate::infrastructure::postgres::{
    postgres_connection::PgPoolSquad,
    repositories::{bookings::BookingPostgres, schedules::SchedulePostgres},
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let booking_repository = BookingPostgres::new(Arc::clone(&db_pool));
    let schedule_repository = SchedulePostgres::new(Arc::clone(&db_pool));
    let booking_intake_usecase = BookingIntakeUseCase::new(
        Arc::new(booking_repository),
        Arc::new(schedule_repository),
    );

    Router::new()
        .route("/", post(create_booking))
        .route("/:booking_id", get(get_booking))
        .with_state(Arc::new(booking_intake_usecase))
}

/// Guests may create bookings; a bearer token just attaches ownership.
pub async fn create_booking<B, S>(
    State(booking_intake_usecase): State<Arc<BookingIntakeUseCase<B, S>>>,
    auth: Option<AuthUser>,
    Json(request): Json<NewBookingRequest>,
) -> impl IntoResponse
where
    B: BookingRepository + Send + Sync + 'static,
    S: ScheduleRepository + Send + Sync + 'static,
{
    let owner_id = auth.map(|user| user.user_id);
    match booking_intake_usecase.create_booking(owner_id, request).await {
        Ok(dto) => (StatusCode::CREATED, Json(dto)).into_response(),
        Err(err) => into_error_response(err.status_code(), err.to_string()),
    }
}

pub async fn get_booking<B, S>(
    State(booking_intake_usecase): State<Arc<BookingIntakeUseCase<B, S>>>,
    auth: AuthUser,
    Path(booking_id): Path<Uuid>,
) -> impl IntoResponse
where
    B: BookingRepository + Send + Sync + 'static,
    S: ScheduleRepository + Send + Sync + 'static,
{
    match booking_intake_usecase
        .get_booking(booking_id, auth.user_id, auth.email)
        .await
    {
        Ok(dto) => (StatusCode::OK, Json(dto)).into_response(),
        Err(err) => into_error_response(err.status_code(), err.to_string()),
    }
}
