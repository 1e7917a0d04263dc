//! Tick driver background task

use std::sync::Arc;

use tokio::time::{interval_at, Instant};
use tracing::{debug, error, info};

use crate::runtime::{controller::Shared, countdown::TickOutcome};

/// Advances the active countdown once per tick period until it completes, pauses or
/// stops. The runtime aborts and re-spawns this task on every state change.
pub(crate) async fn tick_driver_task(shared: Arc<Shared>) {
    let period = shared.tick_period;
    let step_ms = period.as_millis() as u64;
    debug!("Tick driver armed ({}ms period)", step_ms);

    // first tick one full period after arming
    let mut interval = interval_at(Instant::now() + period, period);

    loop {
        interval.tick().await;

        let (outcome, snapshot, view) = {
            let mut guard = shared.countdown.lock().await;
            let Some(countdown) = guard.as_mut() else {
                debug!("No active timer, tick driver exiting");
                break;
            };
            match countdown.tick(step_ms) {
                Ok(outcome) => (outcome, countdown.snapshot().clone(), countdown.view()),
                Err(e) => {
                    error!("Countdown failed, stopping tick driver: {}", e);
                    break;
                }
            }
        };

        match outcome {
            TickOutcome::Idle => {
                debug!("Timer not ticking, tick driver exiting");
                break;
            }
            TickOutcome::Running { alerts } => {
                shared.dispatch_alerts(&snapshot.config, alerts);
                shared.persist(&snapshot);
                shared.publish(Some(view));
            }
            TickOutcome::Completed { alerts, completion } => {
                shared.dispatch_alerts(&snapshot.config, alerts);
                shared.publish(Some(view));
                shared.complete(&snapshot.config, completion);
                info!("Tick driver finished");
                break;
            }
        }
    }
}
