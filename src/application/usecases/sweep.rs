use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{
    repositories::sweep::SweepRepository, value_objects::sweep::SweepSummary,
};

/// A schedule with a sailing today is pulled from sale this long before its
/// departure time.
pub const DEPARTURE_LEAD_MINUTES: i64 = 20;

pub struct SweepUseCase<R>
where
    R: SweepRepository + Send + Sync + 'static,
{
    repo: Arc<R>,
}

impl<R> SweepUseCase<R>
where
    R: SweepRepository + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn run(&self) -> anyhow::Result<SweepSummary> {
        self.run_at(Utc::now()).await
    }

    /// One sweep pass. Each candidate is handled independently; a failure on
    /// one schedule or booking is logged and the pass keeps going.
    pub async fn run_at(&self, now: DateTime<Utc>) -> anyhow::Result<SweepSummary> {
        let today = now.date_naive();
        let cutoff = now + Duration::minutes(DEPARTURE_LEAD_MINUTES);
        let mut summary = SweepSummary::default();

        for schedule in self.repo.list_active_schedules().await? {
            let has_sailing = match self.repo.inventory_exists(schedule.id, today).await {
                Ok(exists) => exists,
                Err(err) => {
                    warn!(
                        schedule_id = %schedule.id,
                        error = %err,
                        "sweep: inventory lookup failed, skipping schedule"
                    );
                    continue;
                }
            };
            if !has_sailing {
                continue;
            }

            let depart_at = today.and_time(schedule.departure_time).and_utc();
            if depart_at > cutoff {
                continue;
            }

            match self.repo.deactivate_schedule(schedule.id).await {
                Ok(()) => {
                    info!(
                        schedule_id = %schedule.id,
                        %depart_at,
                        "sweep: schedule pulled from sale ahead of departure"
                    );
                    summary.schedules_deactivated += 1;
                }
                Err(err) => {
                    warn!(
                        schedule_id = %schedule.id,
                        error = %err,
                        "sweep: failed to deactivate schedule"
                    );
                }
            }
        }

        // A multi-segment booking yields one departure per segment; collapse
        // to the latest arrival so the booking completes exactly once, and
        // only after its last segment has landed.
        let mut last_arrivals: BTreeMap<Uuid, DateTime<Utc>> = BTreeMap::new();
        for departure in self.repo.list_paid_departures(today).await? {
            let arrive_at = departure
                .travel_date
                .and_time(departure.arrival_time)
                .and_utc();
            let entry = last_arrivals.entry(departure.booking_id).or_insert(arrive_at);
            if arrive_at > *entry {
                *entry = arrive_at;
            }
        }

        for (booking_id, arrive_at) in last_arrivals {
            if arrive_at > now {
                continue;
            }

            match self.repo.complete_booking(booking_id).await {
                Ok(()) => {
                    info!(
                        %booking_id,
                        %arrive_at,
                        "sweep: booking marked completed after arrival"
                    );
                    summary.bookings_completed += 1;
                }
                Err(err) => {
                    warn!(
                        %booking_id,
                        error = %err,
                        "sweep: failed to complete booking"
                    );
                }
            }
        }

        info!(
            schedules_deactivated = summary.schedules_deactivated,
            bookings_completed = summary.bookings_completed,
            "sweep: pass finished"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, TimeZone};
    use mockall::predicate::eq;
    use uuid::Uuid;

    use crate::domain::entities::schedules::ScheduleEntity;
    use crate::domain::repositories::sweep::MockSweepRepository;
    use crate::domain::value_objects::sweep::PaidDeparture;

    fn schedule_departing_at(departure_time: NaiveTime) -> ScheduleEntity {
        let now = Utc::now();
        ScheduleEntity {
            id: Uuid::new_v4(),
            name: "Sanur - Nusa Penida 09:00".to_string(),
            origin: "Sanur".to_string(),
            destination: "Nusa Penida".to_string(),
            departure_time,
            arrival_time: departure_time + Duration::minutes(45),
            capacity: Some(120),
            booked_seats: 40,
            price: 150_000,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.from_utc_datetime(
            &NaiveDate::from_ymd_opt(2026, 8, 24)
                .unwrap()
                .and_hms_opt(hour, minute, 0)
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn deactivates_schedule_inside_departure_lead() {
        // Departure at 09:00, sweep at 08:45: inside the 20 minute lead.
        let schedule = schedule_departing_at(NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        let schedule_id = schedule.id;

        let mut repo = MockSweepRepository::new();
        repo.expect_list_active_schedules()
            .returning(move || {
                let schedules = vec![schedule.clone()];
                Box::pin(async move { Ok(schedules) })
            });
        repo.expect_inventory_exists()
            .returning(|_, _| Box::pin(async { Ok(true) }));
        repo.expect_deactivate_schedule()
            .with(eq(schedule_id))
            .times(1)
            .returning(|_| Box::pin(async { Ok(()) }));
        repo.expect_list_paid_departures()
            .returning(|_| Box::pin(async { Ok(Vec::new()) }));

        let summary = SweepUseCase::new(Arc::new(repo))
            .run_at(at(8, 45))
            .await
            .unwrap();
        assert_eq!(summary.schedules_deactivated, 1);
    }

    #[tokio::test]
    async fn leaves_schedule_active_outside_departure_lead() {
        // Departure at 09:00, sweep at 08:30: still 30 minutes out.
        let schedule = schedule_departing_at(NaiveTime::from_hms_opt(9, 0, 0).unwrap());

        let mut repo = MockSweepRepository::new();
        repo.expect_list_active_schedules()
            .returning(move || {
                let schedules = vec![schedule.clone()];
                Box::pin(async move { Ok(schedules) })
            });
        repo.expect_inventory_exists()
            .returning(|_, _| Box::pin(async { Ok(true) }));
        repo.expect_deactivate_schedule().times(0);
        repo.expect_list_paid_departures()
            .returning(|_| Box::pin(async { Ok(Vec::new()) }));

        let summary = SweepUseCase::new(Arc::new(repo))
            .run_at(at(8, 30))
            .await
            .unwrap();
        assert_eq!(summary.schedules_deactivated, 0);
    }

    #[tokio::test]
    async fn skips_schedule_without_a_sailing_today() {
        let schedule = schedule_departing_at(NaiveTime::from_hms_opt(9, 0, 0).unwrap());

        let mut repo = MockSweepRepository::new();
        repo.expect_list_active_schedules()
            .returning(move || {
                let schedules = vec![schedule.clone()];
                Box::pin(async move { Ok(schedules) })
            });
        repo.expect_inventory_exists()
            .returning(|_, _| Box::pin(async { Ok(false) }));
        repo.expect_deactivate_schedule().times(0);
        repo.expect_list_paid_departures()
            .returning(|_| Box::pin(async { Ok(Vec::new()) }));

        let summary = SweepUseCase::new(Arc::new(repo))
            .run_at(at(8, 45))
            .await
            .unwrap();
        assert_eq!(summary.schedules_deactivated, 0);
    }

    #[tokio::test]
    async fn completes_booking_after_arrival() {
        let booking_id = Uuid::new_v4();
        let departure = PaidDeparture {
            booking_id,
            travel_date: NaiveDate::from_ymd_opt(2026, 8, 24).unwrap(),
            arrival_time: NaiveTime::from_hms_opt(9, 45, 0).unwrap(),
        };

        let mut repo = MockSweepRepository::new();
        repo.expect_list_active_schedules()
            .returning(|| Box::pin(async { Ok(Vec::new()) }));
        repo.expect_list_paid_departures()
            .returning(move |_| {
                let departures = vec![departure.clone()];
                Box::pin(async move { Ok(departures) })
            });
        repo.expect_complete_booking()
            .with(eq(booking_id))
            .times(1)
            .returning(|_| Box::pin(async { Ok(()) }));

        let summary = SweepUseCase::new(Arc::new(repo))
            .run_at(at(10, 0))
            .await
            .unwrap();
        assert_eq!(summary.bookings_completed, 1);
    }

    #[tokio::test]
    async fn leaves_booking_paid_before_arrival() {
        let departure = PaidDeparture {
            booking_id: Uuid::new_v4(),
            travel_date: NaiveDate::from_ymd_opt(2026, 8, 24).unwrap(),
            arrival_time: NaiveTime::from_hms_opt(9, 45, 0).unwrap(),
        };

        let mut repo = MockSweepRepository::new();
        repo.expect_list_active_schedules()
            .returning(|| Box::pin(async { Ok(Vec::new()) }));
        repo.expect_list_paid_departures()
            .returning(move |_| {
                let departures = vec![departure.clone()];
                Box::pin(async move { Ok(departures) })
            });
        repo.expect_complete_booking().times(0);

        let summary = SweepUseCase::new(Arc::new(repo))
            .run_at(at(9, 30))
            .await
            .unwrap();
        assert_eq!(summary.bookings_completed, 0);
    }

    #[tokio::test]
    async fn multi_segment_booking_completes_once() {
        let booking_id = Uuid::new_v4();
        let travel_date = NaiveDate::from_ymd_opt(2026, 8, 24).unwrap();
        let outbound = PaidDeparture {
            booking_id,
            travel_date,
            arrival_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        };
        let return_leg = PaidDeparture {
            booking_id,
            travel_date,
            arrival_time: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
        };

        let mut repo = MockSweepRepository::new();
        repo.expect_list_active_schedules()
            .returning(|| Box::pin(async { Ok(Vec::new()) }));
        repo.expect_list_paid_departures()
            .returning(move |_| {
                let departures = vec![outbound.clone(), return_leg.clone()];
                Box::pin(async move { Ok(departures) })
            });
        repo.expect_complete_booking()
            .with(eq(booking_id))
            .times(1)
            .returning(|_| Box::pin(async { Ok(()) }));

        let summary = SweepUseCase::new(Arc::new(repo))
            .run_at(at(10, 0))
            .await
            .unwrap();
        assert_eq!(summary.bookings_completed, 1);
    }

    #[tokio::test]
    async fn multi_segment_booking_waits_for_last_arrival() {
        let booking_id = Uuid::new_v4();
        let travel_date = NaiveDate::from_ymd_opt(2026, 8, 24).unwrap();
        let outbound = PaidDeparture {
            booking_id,
            travel_date,
            arrival_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        };
        let return_leg = PaidDeparture {
            booking_id,
            travel_date,
            arrival_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
        };

        let mut repo = MockSweepRepository::new();
        repo.expect_list_active_schedules()
            .returning(|| Box::pin(async { Ok(Vec::new()) }));
        repo.expect_list_paid_departures()
            .returning(move |_| {
                let departures = vec![outbound.clone(), return_leg.clone()];
                Box::pin(async move { Ok(departures) })
            });
        // The return leg is still at sea at 10:00.
        repo.expect_complete_booking().times(0);

        let summary = SweepUseCase::new(Arc::new(repo))
            .run_at(at(10, 0))
            .await
            .unwrap();
        assert_eq!(summary.bookings_completed, 0);
    }

    #[tokio::test]
    async fn one_failed_item_does_not_abort_the_pass() {
        let first = PaidDeparture {
            booking_id: Uuid::new_v4(),
            travel_date: NaiveDate::from_ymd_opt(2026, 8, 24).unwrap(),
            arrival_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        };
        let second = PaidDeparture {
            booking_id: Uuid::new_v4(),
            travel_date: NaiveDate::from_ymd_opt(2026, 8, 24).unwrap(),
            arrival_time: NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
        };
        let failing_id = first.booking_id;

        let mut repo = MockSweepRepository::new();
        repo.expect_list_active_schedules()
            .returning(|| Box::pin(async { Ok(Vec::new()) }));
        repo.expect_list_paid_departures()
            .returning(move |_| {
                let departures = vec![first.clone(), second.clone()];
                Box::pin(async move { Ok(departures) })
            });
        repo.expect_complete_booking()
            .times(2)
            .returning(move |id| {
                Box::pin(async move {
                    if id == failing_id {
                        Err(anyhow::anyhow!("connection reset"))
                    } else {
                        Ok(())
                    }
                })
            });

        let summary = SweepUseCase::new(Arc::new(repo))
            .run_at(at(10, 0))
            .await
            .unwrap();
        assert_eq!(summary.bookings_completed, 1);
    }
}
