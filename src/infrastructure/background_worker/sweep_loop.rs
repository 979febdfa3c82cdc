use std::{sync::Arc, time::Duration};

use tracing::{error, info};

use crate::application::usecases::sweep::SweepUseCase;
use crate::domain::repositories::sweep::SweepRepository;

pub async fn run_sweep_loop<R>(usecase: Arc<SweepUseCase<R>>, interval_seconds: u64)
where
    R: SweepRepository + Send + Sync + 'static,
{
    info!("Sweep loop started, interval {}s", interval_seconds);
    loop {
        match usecase.run().await {
            Ok(summary) => {
                if summary.schedules_deactivated > 0 || summary.bookings_completed > 0 {
                    info!(
                        "Sweep pass: {} schedules deactivated, {} bookings completed",
                        summary.schedules_deactivated, summary.bookings_completed
                    );
                }
            }
            Err(e) => error!("Error while running sweep pass: {}", e),
        }

        tokio::time::sleep(Duration::from_secs(interval_seconds)).await;
    }
}
