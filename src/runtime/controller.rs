//! Async timer runtime
//!
//! Owns the single active [`Countdown`], the tick driver task that advances it, and
//! the side effects of every state change: alert dispatch, snapshot persistence and
//! view publication. State changes happen under one lock; side effects run after it
//! is released and never fail the command that caused them.

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use tokio::{
    sync::{broadcast, watch, Mutex},
    task::JoinHandle,
};
use tracing::{debug, error, info, warn};

use super::{
    countdown::{Completion, Countdown, IntervalAlert},
    view::{PresentationSignal, TimerView},
};
use crate::{
    error::{RestoreError, RuntimeError},
    notify::{AlertRequest, Alerts},
    state::{ActiveTimer, TimerConfig},
    store::ConfigStore,
    tasks::tick_driver_task,
};

pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);
pub const FULLSCREEN_DELAY: Duration = Duration::from_secs(1);

/// State shared between the runtime handle and its tick driver
pub(crate) struct Shared {
    pub(crate) countdown: Mutex<Option<Countdown>>,
    pub(crate) tick_period: Duration,
    store: ConfigStore,
    alerts: Arc<dyn Alerts>,
    view_tx: watch::Sender<Option<TimerView>>,
    signal_tx: broadcast::Sender<PresentationSignal>,
    fullscreen_delay: Duration,
}

impl Shared {
    pub(crate) fn persist(&self, snapshot: &ActiveTimer) {
        if let Err(e) = self.store.save_active_timer(snapshot) {
            warn!("Failed to persist active timer snapshot: {}", e);
        }
    }

    fn clear_snapshot(&self) {
        if let Err(e) = self.store.clear_active_timer() {
            warn!("Failed to clear active timer snapshot: {}", e);
        }
    }

    pub(crate) fn publish(&self, view: Option<TimerView>) {
        self.view_tx.send_replace(view);
    }

    /// Fire-and-forget dispatch of interval alerts
    pub(crate) fn dispatch_alerts(&self, config: &TimerConfig, alerts: Vec<IntervalAlert>) {
        if alerts.is_empty() {
            return;
        }
        let notifications = &config.notifications;
        if !notifications.enabled {
            debug!(
                "Notifications disabled for '{}', {} interval alert(s) skipped",
                config.name,
                alerts.len()
            );
            return;
        }
        for alert in alerts {
            info!("Interval alert: {}", alert.message);
            self.spawn_notify(AlertRequest {
                message: alert.message,
                sound: notifications.alert_sound(),
                play_sound: notifications.sound,
                show_visual: notifications.visual,
            });
        }
    }

    fn spawn_notify(&self, request: AlertRequest) {
        let alerts = Arc::clone(&self.alerts);
        tokio::spawn(async move {
            alerts.notify(request).await;
        });
    }

    /// Completion side effects; each step runs regardless of the others.
    /// The completion alert is only gated by the global settings.
    pub(crate) fn complete(&self, config: &TimerConfig, completion: Completion) {
        info!("Timer '{}' completed", config.name);

        self.spawn_notify(AlertRequest {
            message: completion.message,
            sound: completion.sound,
            play_sound: true,
            show_visual: true,
        });

        if let Some(video) = completion.video {
            if self
                .signal_tx
                .send(PresentationSignal::ShowVideo(video))
                .is_err()
            {
                debug!("No presentation listener for the completion video");
            }
            // give the player a moment to buffer before going fullscreen
            let signal_tx = self.signal_tx.clone();
            let delay = self.fullscreen_delay;
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                if signal_tx.send(PresentationSignal::RequestFullscreen).is_err() {
                    debug!("Fullscreen request had no listener");
                }
            });
        }

        self.clear_snapshot();
    }
}

/// Handle to the timer runtime; cheap to clone
#[derive(Clone)]
pub struct TimerRuntime {
    shared: Arc<Shared>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl TimerRuntime {
    pub fn new(store: ConfigStore, alerts: Arc<dyn Alerts>) -> Self {
        Self::with_timing(store, alerts, DEFAULT_TICK_PERIOD, FULLSCREEN_DELAY)
    }

    pub fn with_timing(
        store: ConfigStore,
        alerts: Arc<dyn Alerts>,
        tick_period: Duration,
        fullscreen_delay: Duration,
    ) -> Self {
        let (view_tx, _) = watch::channel(None);
        let (signal_tx, _) = broadcast::channel(16);
        Self {
            shared: Arc::new(Shared {
                countdown: Mutex::new(None),
                tick_period,
                store,
                alerts,
                view_tx,
                signal_tx,
                fullscreen_delay,
            }),
            ticker: Arc::new(Mutex::new(None)),
        }
    }

    /// Per-tick views of the active timer (`None` when nothing is active)
    pub fn subscribe(&self) -> watch::Receiver<Option<TimerView>> {
        self.shared.view_tx.subscribe()
    }

    pub fn signals(&self) -> broadcast::Receiver<PresentationSignal> {
        self.shared.signal_tx.subscribe()
    }

    pub async fn view(&self) -> Option<TimerView> {
        self.shared.countdown.lock().await.as_ref().map(Countdown::view)
    }

    /// Config id of the active timer and whether it is running (paused counts)
    pub async fn active_timer(&self) -> Option<(String, bool)> {
        self.shared
            .countdown
            .lock()
            .await
            .as_ref()
            .map(|c| (c.config().id.clone(), c.is_running()))
    }

    /// Make `config` the active timer, resuming its persisted snapshot if there is one
    pub async fn activate(&self, config: TimerConfig) -> Result<TimerView, RuntimeError> {
        self.cancel_ticker().await;

        let countdown = match self.shared.store.load_active_timer() {
            Ok(Some(snapshot)) => match Countdown::restore(config.clone(), snapshot) {
                Ok(countdown) => {
                    info!(
                        "Resumed timer '{}' with {}ms remaining",
                        config.name,
                        countdown.remaining_ms()
                    );
                    countdown
                }
                Err(RestoreError::OtherTimer { found, .. }) => {
                    debug!("Ignoring snapshot of timer {}", found);
                    Countdown::fresh(config, Utc::now())?
                }
                Err(e) => {
                    warn!("Discarding unusable snapshot, starting fresh: {}", e);
                    Countdown::fresh(config, Utc::now())?
                }
            },
            Ok(None) => Countdown::fresh(config, Utc::now())?,
            Err(e) => {
                warn!("Failed to read active timer snapshot, starting fresh: {}", e);
                Countdown::fresh(config, Utc::now())?
            }
        };

        let snapshot = countdown.snapshot().clone();
        let view = countdown.view();
        let ticking = countdown.is_ticking();
        *self.shared.countdown.lock().await = Some(countdown);

        info!("Activated timer '{}' ({})", view.name, view.timer_id);
        self.shared.persist(&snapshot);
        self.shared.publish(Some(view.clone()));
        if ticking {
            self.arm_ticker().await;
        }
        Ok(view)
    }

    pub async fn start(&self) -> Result<TimerView, RuntimeError> {
        let (was_ticking, alerts, snapshot, view) = {
            let mut guard = self.shared.countdown.lock().await;
            let countdown = guard.as_mut().ok_or(RuntimeError::NoActiveTimer)?;
            let was_ticking = countdown.is_ticking();
            let alerts = countdown.start();
            (was_ticking, alerts, countdown.snapshot().clone(), countdown.view())
        };
        let config = &snapshot.config;
        if was_ticking && self.is_ticking().await {
            debug!("Timer '{}' is already running", config.name);
            self.shared.dispatch_alerts(config, alerts);
            return Ok(view);
        }
        info!("Timer '{}' started", config.name);

        if config.notifications.sound {
            let alerts = Arc::clone(&self.shared.alerts);
            let sound = config.notifications.start_sound();
            tokio::spawn(async move {
                alerts.play_start_sound(sound).await;
            });
        }
        self.shared.dispatch_alerts(config, alerts);
        self.shared.persist(&snapshot);
        self.shared.publish(Some(view.clone()));
        self.arm_ticker().await;
        Ok(view)
    }

    pub async fn toggle_pause(&self) -> Result<TimerView, RuntimeError> {
        let (alerts, snapshot, view, ticking) = {
            let mut guard = self.shared.countdown.lock().await;
            let countdown = guard.as_mut().ok_or(RuntimeError::NoActiveTimer)?;
            let alerts = countdown.toggle_pause();
            (
                alerts,
                countdown.snapshot().clone(),
                countdown.view(),
                countdown.is_ticking(),
            )
        };

        if ticking {
            info!("Timer '{}' resumed", view.name);
            self.arm_ticker().await;
        } else {
            info!("Timer '{}' paused", view.name);
            self.cancel_ticker().await;
        }
        self.shared.dispatch_alerts(&snapshot.config, alerts);
        self.shared.persist(&snapshot);
        self.shared.publish(Some(view.clone()));
        Ok(view)
    }

    /// Reset to the full duration and forget the persisted snapshot
    pub async fn stop(&self) -> Result<TimerView, RuntimeError> {
        self.cancel_ticker().await;
        let view = {
            let mut guard = self.shared.countdown.lock().await;
            let countdown = guard.as_mut().ok_or(RuntimeError::NoActiveTimer)?;
            countdown.stop();
            countdown.view()
        };
        info!("Timer '{}' stopped", view.name);
        self.shared.clear_snapshot();
        self.shared.publish(Some(view.clone()));
        Ok(view)
    }

    /// Leave the active timer without touching its snapshot
    pub async fn deactivate(&self) {
        self.cancel_ticker().await;
        if let Some(countdown) = self.shared.countdown.lock().await.take() {
            info!("Timer '{}' deactivated", countdown.config().name);
        }
        self.shared.publish(None);
    }

    /// Stop ticking and write a final snapshot so the next launch can resume
    pub async fn shutdown(&self) {
        self.cancel_ticker().await;
        let snapshot = self
            .shared
            .countdown
            .lock()
            .await
            .as_ref()
            .filter(|c| c.is_running())
            .map(|c| c.snapshot().clone());
        if let Some(snapshot) = snapshot {
            self.shared.persist(&snapshot);
        }
    }

    pub async fn is_ticking(&self) -> bool {
        self.ticker
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    async fn arm_ticker(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(handle) = ticker_guard.take() {
            Self::join_aborted(handle).await;
        }
        let shared = Arc::clone(&self.shared);
        *ticker_guard = Some(tokio::spawn(tick_driver_task(shared)));
    }

    /// Returns once the tick driver is gone, including a tick already in flight
    async fn cancel_ticker(&self) {
        let handle = self.ticker.lock().await.take();
        if let Some(handle) = handle {
            Self::join_aborted(handle).await;
        }
    }

    async fn join_aborted(handle: JoinHandle<()>) {
        handle.abort();
        if let Err(e) = handle.await {
            if e.is_panic() {
                error!("Tick driver panicked: {}", e);
            }
        }
    }
}
