//! Startup recovery of an interrupted run

use tracing::{info, warn};

use crate::{
    runtime::{TimerRuntime, TimerView},
    store::ConfigStore,
};

/// Re-activate the timer whose snapshot survived the last shutdown.
///
/// The saved configuration of that timer is used, not the copy inside the snapshot;
/// a snapshot whose timer has since been deleted is discarded.
pub async fn resume_persisted_timer(
    runtime: &TimerRuntime,
    store: &ConfigStore,
) -> Option<TimerView> {
    let snapshot = store.active_timer()?;
    let timer_id = snapshot.config.id.clone();

    let Some(config) = store.find_timer(&timer_id) else {
        info!("Persisted run belongs to deleted timer {}, discarding", timer_id);
        if let Err(e) = store.clear_active_timer() {
            warn!("Failed to discard stale snapshot: {}", e);
        }
        return None;
    };

    match runtime.activate(config).await {
        Ok(view) => {
            info!(
                "Recovered timer '{}' ({}, running={}, paused={})",
                view.name, view.clock, view.is_running, view.is_paused
            );
            Some(view)
        }
        Err(e) => {
            warn!("Failed to recover timer {}: {}", timer_id, e);
            None
        }
    }
}
