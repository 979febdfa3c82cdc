use std::sync::Arc;

use rand::Rng;
use rand::distributions::Alphanumeric;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{
    entities::bookings::{InsertBookingEntity, InsertBookingItemEntity, InsertPassengerEntity},
    repositories::{bookings::BookingRepository, schedules::ScheduleRepository},
    value_objects::{
        booking_intake::{
            BookingCreatedDto, BookingDetailDto, BookingDetailItemDto, BookingItemDto,
            NewBookingRequest, PassengerDto,
        },
        enums::booking_statuses::BookingStatus,
    },
};

const DEFAULT_CURRENCY: &str = "IDR";

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("invalid booking request: {0}")]
    Validation(String),
    #[error("schedule {0} not found")]
    ScheduleNotFound(Uuid),
    #[error("booking not found")]
    BookingNotFound,
    #[error("caller does not own this booking")]
    Forbidden,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntakeError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            IntakeError::Validation(_) => StatusCode::BAD_REQUEST,
            IntakeError::ScheduleNotFound(_) => StatusCode::NOT_FOUND,
            IntakeError::BookingNotFound => StatusCode::NOT_FOUND,
            IntakeError::Forbidden => StatusCode::FORBIDDEN,
            IntakeError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub struct BookingIntakeUseCase<B, S>
where
    B: BookingRepository + Send + Sync + 'static,
    S: ScheduleRepository + Send + Sync + 'static,
{
    booking_repo: Arc<B>,
    schedule_repo: Arc<S>,
}

impl<B, S> BookingIntakeUseCase<B, S>
where
    B: BookingRepository + Send + Sync + 'static,
    S: ScheduleRepository + Send + Sync + 'static,
{
    pub fn new(booking_repo: Arc<B>, schedule_repo: Arc<S>) -> Self {
        Self {
            booking_repo,
            schedule_repo,
        }
    }

    /// Persists a PENDING booking with its items and passengers. Capacity is
    /// read for display only; the authoritative decrement happens at
    /// settlement so abandoned carts never hold seats hostage.
    pub async fn create_booking(
        &self,
        owner_id: Option<Uuid>,
        request: NewBookingRequest,
    ) -> Result<BookingCreatedDto, IntakeError> {
        validate(&request).map_err(IntakeError::Validation)?;

        for item in &request.items {
            if self
                .schedule_repo
                .find_by_id(item.schedule_id)
                .await?
                .is_none()
            {
                return Err(IntakeError::ScheduleNotFound(item.schedule_id));
            }
        }

        let booking_id = Uuid::new_v4();
        let booking_code = generate_booking_code();
        let currency = request
            .currency
            .clone()
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

        let booking = InsertBookingEntity {
            id: booking_id,
            booking_code,
            user_id: owner_id,
            contact_name: request.contact_name.clone(),
            contact_email: request.contact_email.clone(),
            contact_phone: request.contact_phone.clone(),
            subtotal: request.subtotal,
            port_fee: request.port_fee,
            addons_total: request.addons_total,
            total_amount: request.total_amount,
            currency,
            status: BookingStatus::Pending.to_string(),
        };

        let items = request
            .items
            .iter()
            .map(|item| InsertBookingItemEntity {
                booking_id,
                schedule_id: item.schedule_id,
                travel_date: item.travel_date,
                quantity: item.quantity,
                unit_price: item.unit_price,
                subtotal: item.unit_price * i64::from(item.quantity),
            })
            .collect::<Vec<_>>();

        let passengers = request
            .passengers
            .iter()
            .map(|passenger| InsertPassengerEntity {
                booking_id,
                full_name: passenger.full_name.clone(),
                nationality: passenger.nationality.clone(),
                id_document_type: passenger.id_document_type.clone(),
                id_document_number: passenger.id_document_number.clone(),
                category: passenger.category.clone(),
            })
            .collect::<Vec<_>>();

        let created = self
            .booking_repo
            .create_booking(booking, items, passengers)
            .await?;

        let mut item_dtos = Vec::with_capacity(request.items.len());
        for item in &request.items {
            let seats_remaining = match self
                .schedule_repo
                .seats_remaining(item.schedule_id, item.travel_date)
                .await
            {
                Ok(seats) => seats,
                Err(err) => {
                    warn!(
                        schedule_id = %item.schedule_id,
                        error = ?err,
                        "booking_intake: failed to read remaining seats"
                    );
                    None
                }
            };
            if let Some(seats) = seats_remaining {
                if seats < item.quantity {
                    warn!(
                        booking_id = %created.id,
                        schedule_id = %item.schedule_id,
                        seats,
                        requested = item.quantity,
                        "booking_intake: demand exceeds displayed availability"
                    );
                }
            }
            item_dtos.push(BookingItemDto {
                schedule_id: item.schedule_id,
                travel_date: item.travel_date,
                quantity: item.quantity,
                seats_remaining,
            });
        }

        info!(
            booking_id = %created.id,
            booking_code = %created.booking_code,
            total_amount = created.total_amount,
            "booking_intake: booking created"
        );

        Ok(BookingCreatedDto {
            id: created.id,
            booking_code: created.booking_code,
            status: created.status,
            total_amount: created.total_amount,
            currency: created.currency,
            items: item_dtos,
        })
    }

    pub async fn get_booking(
        &self,
        booking_id: Uuid,
        caller_id: Uuid,
        caller_email: Option<String>,
    ) -> Result<BookingDetailDto, IntakeError> {
        let booking = self
            .booking_repo
            .find_by_id(booking_id)
            .await?
            .ok_or(IntakeError::BookingNotFound)?;

        let owner_id = booking.user_id.ok_or(IntakeError::Forbidden)?;
        if owner_id != caller_id {
            let secondary = match caller_email.as_deref() {
                Some(email) => self.booking_repo.find_user_id_by_email(email).await?,
                None => None,
            };
            if secondary != Some(owner_id) {
                return Err(IntakeError::Forbidden);
            }
        }

        let items = self.booking_repo.list_items(booking_id).await?;
        let passengers = self.booking_repo.list_passengers(booking_id).await?;

        Ok(BookingDetailDto {
            id: booking.id,
            booking_code: booking.booking_code,
            status: booking.status,
            contact_name: booking.contact_name,
            contact_email: booking.contact_email,
            contact_phone: booking.contact_phone,
            subtotal: booking.subtotal,
            port_fee: booking.port_fee,
            addons_total: booking.addons_total,
            total_amount: booking.total_amount,
            currency: booking.currency,
            payment_method: booking.payment_method,
            gateway_channel: booking.gateway_channel,
            invoice_expiry_at: booking.invoice_expiry_at,
            paid_amount: booking.paid_amount,
            paid_at: booking.paid_at,
            items: items
                .into_iter()
                .map(|item| BookingDetailItemDto {
                    schedule_id: item.schedule_id,
                    travel_date: item.travel_date,
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    subtotal: item.subtotal,
                })
                .collect(),
            passengers: passengers
                .into_iter()
                .map(|passenger| PassengerDto {
                    full_name: passenger.full_name,
                    nationality: passenger.nationality,
                    category: passenger.category,
                })
                .collect(),
        })
    }
}

fn validate(request: &NewBookingRequest) -> Result<(), String> {
    if request.contact_name.trim().is_empty() {
        return Err("contact name is required".to_string());
    }
    if !request.contact_email.contains('@') {
        return Err("contact email is invalid".to_string());
    }
    if request.contact_phone.trim().is_empty() {
        return Err("contact phone is required".to_string());
    }
    if request.items.is_empty() {
        return Err("at least one segment is required".to_string());
    }
    if request.items.iter().any(|item| item.quantity <= 0) {
        return Err("item quantity must be positive".to_string());
    }
    if request.items.iter().any(|item| item.unit_price < 0) {
        return Err("item unit price must not be negative".to_string());
    }
    if request.passengers.is_empty() {
        return Err("at least one passenger is required".to_string());
    }
    if request
        .passengers
        .iter()
        .any(|passenger| passenger.full_name.trim().is_empty())
    {
        return Err("passenger name is required".to_string());
    }
    if request.total_amount != request.subtotal + request.port_fee + request.addons_total {
        return Err("total amount does not match price breakdown".to_string());
    }
    Ok(())
}

fn generate_booking_code() -> String {
    let code: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect::<String>()
        .to_uppercase();
    format!("FB-{}", code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, Utc};
    use mockall::predicate::eq;

    use crate::domain::{
        entities::{bookings::BookingEntity, schedules::ScheduleEntity},
        repositories::{bookings::MockBookingRepository, schedules::MockScheduleRepository},
        value_objects::booking_intake::{NewBookingItem, NewPassenger},
    };

    fn sample_request(schedule_id: Uuid) -> NewBookingRequest {
        NewBookingRequest {
            contact_name: "Made Wirawan".to_string(),
            contact_email: "made@example.com".to_string(),
            contact_phone: "+6281234567890".to_string(),
            currency: None,
            subtotal: 500_000,
            port_fee: 10_000,
            addons_total: 0,
            total_amount: 510_000,
            items: vec![NewBookingItem {
                schedule_id,
                travel_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
                quantity: 2,
                unit_price: 250_000,
            }],
            passengers: vec![
                NewPassenger {
                    full_name: "Made Wirawan".to_string(),
                    nationality: "ID".to_string(),
                    id_document_type: None,
                    id_document_number: None,
                    category: "adult".to_string(),
                },
                NewPassenger {
                    full_name: "Kadek Ayu".to_string(),
                    nationality: "ID".to_string(),
                    id_document_type: None,
                    id_document_number: None,
                    category: "adult".to_string(),
                },
            ],
        }
    }

    fn sample_schedule(id: Uuid) -> ScheduleEntity {
        let now = Utc::now();
        ScheduleEntity {
            id,
            name: "Sanur - Nusa Penida 09:00".to_string(),
            origin: "Sanur".to_string(),
            destination: "Nusa Penida".to_string(),
            departure_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            arrival_time: NaiveTime::from_hms_opt(9, 45, 0).unwrap(),
            capacity: Some(30),
            booked_seats: 0,
            price: 250_000,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn created_booking(insert: &InsertBookingEntity) -> BookingEntity {
        let now = Utc::now();
        BookingEntity {
            id: insert.id,
            booking_code: insert.booking_code.clone(),
            user_id: insert.user_id,
            contact_name: insert.contact_name.clone(),
            contact_email: insert.contact_email.clone(),
            contact_phone: insert.contact_phone.clone(),
            subtotal: insert.subtotal,
            port_fee: insert.port_fee,
            addons_total: insert.addons_total,
            total_amount: insert.total_amount,
            currency: insert.currency.clone(),
            payment_method: None,
            gateway_channel: None,
            gateway_reference_id: None,
            invoice_expiry_at: None,
            paid_amount: None,
            paid_at: None,
            gateway_callback: None,
            status: insert.status.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn creates_pending_booking_with_display_availability() {
        let schedule_id = Uuid::new_v4();
        let request = sample_request(schedule_id);

        let mut booking_repo = MockBookingRepository::new();
        let mut schedule_repo = MockScheduleRepository::new();

        schedule_repo
            .expect_find_by_id()
            .with(eq(schedule_id))
            .returning(move |id| {
                let schedule = sample_schedule(id);
                Box::pin(async move { Ok(Some(schedule)) })
            });
        schedule_repo
            .expect_seats_remaining()
            .returning(|_, _| Box::pin(async { Ok(Some(28)) }));

        booking_repo
            .expect_create_booking()
            .withf(|booking, items, passengers| {
                booking.status == "pending" && items.len() == 1 && passengers.len() == 2
            })
            .returning(|booking, _, _| {
                let created = created_booking(&booking);
                Box::pin(async move { Ok(created) })
            });

        let usecase = BookingIntakeUseCase::new(Arc::new(booking_repo), Arc::new(schedule_repo));
        let dto = usecase
            .create_booking(Some(Uuid::new_v4()), request)
            .await
            .unwrap();

        assert!(dto.booking_code.starts_with("FB-"));
        assert_eq!(dto.status, "pending");
        assert_eq!(dto.items[0].seats_remaining, Some(28));
    }

    #[tokio::test]
    async fn rejects_mismatched_price_breakdown() {
        let schedule_id = Uuid::new_v4();
        let mut request = sample_request(schedule_id);
        request.total_amount = 999_999;

        let usecase = BookingIntakeUseCase::new(
            Arc::new(MockBookingRepository::new()),
            Arc::new(MockScheduleRepository::new()),
        );

        let err = usecase.create_booking(None, request).await.unwrap_err();
        assert!(matches!(err, IntakeError::Validation(_)));
    }

    #[tokio::test]
    async fn rejects_empty_passenger_list() {
        let schedule_id = Uuid::new_v4();
        let mut request = sample_request(schedule_id);
        request.passengers.clear();

        let usecase = BookingIntakeUseCase::new(
            Arc::new(MockBookingRepository::new()),
            Arc::new(MockScheduleRepository::new()),
        );

        let err = usecase.create_booking(None, request).await.unwrap_err();
        assert!(matches!(err, IntakeError::Validation(_)));
    }

    #[tokio::test]
    async fn rejects_unknown_schedule() {
        let schedule_id = Uuid::new_v4();
        let request = sample_request(schedule_id);

        let mut schedule_repo = MockScheduleRepository::new();
        schedule_repo
            .expect_find_by_id()
            .with(eq(schedule_id))
            .returning(|_| Box::pin(async { Ok(None) }));

        let usecase =
            BookingIntakeUseCase::new(Arc::new(MockBookingRepository::new()), Arc::new(schedule_repo));

        let err = usecase.create_booking(None, request).await.unwrap_err();
        assert!(matches!(err, IntakeError::ScheduleNotFound(id) if id == schedule_id));
    }
}
