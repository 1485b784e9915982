//! Background task that completes overdue reservations.
//!
//! Runs in a tokio::spawn loop, checking every `interval_secs` for Active
//! reservations whose end time has passed, completing them and releasing
//! their slots.

use std::sync::Arc;

use chrono::Utc;
use tokio::time::Duration;
use tracing::{info, warn};

use super::ReservationManager;
use crate::shared::shutdown::ShutdownSignal;

/// Start the sweeper. An interval of 0 disables it.
pub fn start_reservation_sweeper(
    reservations: Arc<ReservationManager>,
    shutdown: ShutdownSignal,
    interval_secs: u64,
) {
    if interval_secs == 0 {
        info!("Reservation sweeper disabled");
        return;
    }

    tokio::spawn(async move {
        info!(interval_secs, "Reservation sweeper started");
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = reservations.sweep_overdue(Utc::now()).await {
                        warn!(error = %e, "Reservation sweep failed");
                    }
                }
                _ = shutdown.wait() => {
                    info!("Reservation sweeper shutting down");
                    break;
                }
            }
        }
    });
}
