//! Countdown state machine
//!
//! Pure and synchronous: no clocks, no I/O. The controller feeds it ticks and commands
//! and carries out the alerts and completion it reports.

use chrono::{DateTime, Utc};

use super::{
    progress::{color_for, font_scale_for, format_clock, next_alert_in_ms, progress},
    view::{CompletionVideo, TimerView},
};
use crate::{
    error::{RestoreError, TimerError},
    state::{ActiveTimer, SoundRequest, TimerConfig},
};

/// An interval threshold crossed during the current run
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalAlert {
    pub interval: f64,
    pub message: String,
}

/// Everything the controller needs to finish a run
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub message: String,
    pub sound: SoundRequest,
    pub video: Option<CompletionVideo>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Not running, or paused: nothing changed
    Idle,
    Running { alerts: Vec<IntervalAlert> },
    Completed {
        alerts: Vec<IntervalAlert>,
        completion: Completion,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Countdown {
    timer: ActiveTimer,
    total_ms: u64,
}

impl Countdown {
    pub fn fresh(config: TimerConfig, now: DateTime<Utc>) -> Result<Self, TimerError> {
        let total_ms = config.total_ms()?;
        Ok(Self {
            timer: ActiveTimer::fresh(config, now)?,
            total_ms,
        })
    }

    /// Resume a persisted snapshot of the same timer. `config` wins over the copy
    /// stored in the snapshot, so edits made since are picked up.
    pub fn restore(config: TimerConfig, snapshot: ActiveTimer) -> Result<Self, RestoreError> {
        if snapshot.config.id != config.id {
            return Err(RestoreError::OtherTimer {
                expected: config.id,
                found: snapshot.config.id,
            });
        }
        let total_ms = config.total_ms()?;
        let mut timer = snapshot;
        timer.config = config;
        timer.remaining_time = timer.remaining_time.min(total_ms);
        if !timer.is_running {
            timer.is_paused = false;
        }
        Ok(Self { timer, total_ms })
    }

    pub fn config(&self) -> &TimerConfig {
        &self.timer.config
    }

    pub fn snapshot(&self) -> &ActiveTimer {
        &self.timer
    }

    pub fn total_ms(&self) -> u64 {
        self.total_ms
    }

    pub fn remaining_ms(&self) -> u64 {
        self.timer.remaining_time
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.total_ms.saturating_sub(self.timer.remaining_time)
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_running
    }

    pub fn is_paused(&self) -> bool {
        self.timer.is_paused
    }

    /// Whether the tick driver should be armed
    pub fn is_ticking(&self) -> bool {
        self.timer.is_running && !self.timer.is_paused
    }

    pub fn progress(&self) -> f64 {
        progress(self.timer.remaining_time, self.total_ms)
    }

    /// Start or resume the countdown. A finished run starts over from the full duration.
    pub fn start(&mut self) -> Vec<IntervalAlert> {
        if self.timer.remaining_time == 0 {
            self.timer.remaining_time = self.total_ms;
            self.timer.notifications_sent.clear();
        }
        self.timer.is_running = true;
        self.timer.is_paused = false;
        self.check_intervals()
    }

    /// Flip pause while running; resuming re-checks intervals
    pub fn toggle_pause(&mut self) -> Vec<IntervalAlert> {
        if !self.timer.is_running {
            return Vec::new();
        }
        self.timer.is_paused = !self.timer.is_paused;
        self.check_intervals()
    }

    /// Hard reset: full duration, no alerts sent, not running
    pub fn stop(&mut self) {
        self.timer.is_running = false;
        self.timer.is_paused = false;
        self.timer.remaining_time = self.total_ms;
        self.timer.notifications_sent.clear();
    }

    pub fn tick(&mut self, step_ms: u64) -> Result<TickOutcome, TimerError> {
        if !self.is_ticking() {
            return Ok(TickOutcome::Idle);
        }
        if self.timer.remaining_time > self.total_ms {
            return Err(TimerError::RemainingExceedsTotal {
                remaining_ms: self.timer.remaining_time,
                total_ms: self.total_ms,
            });
        }

        self.timer.remaining_time = self.timer.remaining_time.saturating_sub(step_ms);
        // intervals are checked before completion so short ones are never skipped
        let alerts = self.check_intervals();

        if self.timer.remaining_time == 0 {
            self.timer.is_running = false;
            self.timer.is_paused = false;
            return Ok(TickOutcome::Completed {
                alerts,
                completion: self.completion(),
            });
        }
        Ok(TickOutcome::Running { alerts })
    }

    /// Alerts for every interval whose threshold has been reached and not yet fired
    fn check_intervals(&mut self) -> Vec<IntervalAlert> {
        if !self.is_ticking() {
            return Vec::new();
        }
        let elapsed = self.elapsed_ms();
        let total = self.total_ms;
        let name = self.timer.config.name.clone();

        let mut alerts = Vec::new();
        for &interval in &self.timer.config.notifications.intervals {
            let threshold = total.saturating_sub((interval * 60_000.0).round() as u64);
            if elapsed >= threshold && self.timer.notifications_sent.insert(interval) {
                alerts.push(IntervalAlert {
                    interval,
                    message: format!("{}: {} minutos restantes!", name, interval),
                });
            }
        }
        alerts
    }

    fn completion(&self) -> Completion {
        let config = &self.timer.config;
        Completion {
            message: format!("{} concluído!", config.name),
            sound: config.notifications.alert_sound(),
            video: config.video_file.clone().map(|payload| CompletionVideo {
                payload,
                file_name: config.video_file_name.clone(),
            }),
        }
    }

    pub fn view(&self) -> TimerView {
        let progress = self.progress();
        let color = color_for(progress);
        TimerView {
            timer_id: self.timer.config.id.clone(),
            session_id: self.timer.id.clone(),
            name: self.timer.config.name.clone(),
            remaining_time: self.timer.remaining_time,
            elapsed: self.elapsed_ms(),
            total_duration: self.total_ms,
            is_running: self.timer.is_running,
            is_paused: self.timer.is_paused,
            progress,
            color,
            css_color: color.to_string(),
            font_scale: font_scale_for(progress),
            clock: format_clock(self.timer.remaining_time),
            next_alert_in: next_alert_in_ms(
                &self.timer.config.notifications.intervals,
                self.timer.remaining_time,
                self.total_ms,
            ),
            start_time: self.timer.start_time,
            end_time: self.timer.end_time,
            has_video: self.timer.config.has_video(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{timer_config::sample_config, EncodedPayload, SoundType};

    const TICK: u64 = 1_000;

    fn started(duration: f64, intervals: &[f64]) -> Countdown {
        let mut countdown = Countdown::fresh(sample_config("t", duration, intervals), Utc::now())
            .unwrap();
        assert!(countdown.start().is_empty() || intervals.contains(&duration));
        countdown
    }

    fn alerts_of(outcome: &TickOutcome) -> Vec<f64> {
        match outcome {
            TickOutcome::Idle => Vec::new(),
            TickOutcome::Running { alerts } | TickOutcome::Completed { alerts, .. } => {
                alerts.iter().map(|a| a.interval).collect()
            }
        }
    }

    /// Tick until completion, returning (tick number, interval) for every alert
    fn run_to_completion(countdown: &mut Countdown) -> (Vec<(u64, f64)>, u64) {
        let mut fired = Vec::new();
        for n in 1.. {
            let outcome = countdown.tick(TICK).unwrap();
            for interval in alerts_of(&outcome) {
                fired.push((n, interval));
            }
            if let TickOutcome::Completed { .. } = outcome {
                return (fired, n);
            }
        }
        unreachable!()
    }

    #[test]
    fn half_minute_alert_fires_on_the_thirtieth_tick() {
        let mut countdown = started(1.0, &[0.5]);
        assert_eq!(countdown.remaining_ms(), 60_000);

        for n in 1..30 {
            let outcome = countdown.tick(TICK).unwrap();
            assert!(alerts_of(&outcome).is_empty(), "fired early at tick {}", n);
        }
        let outcome = countdown.tick(TICK).unwrap();
        assert_eq!(countdown.elapsed_ms(), 30_000);
        match outcome {
            TickOutcome::Running { alerts } => {
                assert_eq!(alerts.len(), 1);
                assert_eq!(alerts[0].message, "Timer t: 0.5 minutos restantes!");
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn every_interval_fires_exactly_once_per_run() {
        let mut countdown = started(2.0, &[1.0, 0.25]);
        let (fired, ticks) = run_to_completion(&mut countdown);
        assert_eq!(fired, vec![(60, 1.0), (105, 0.25)]);
        assert_eq!(ticks, 120);
        assert_eq!(countdown.remaining_ms(), 0);
        assert!(!countdown.is_running() && !countdown.is_paused());
    }

    #[test]
    fn completion_reports_message_sound_and_video() {
        let mut config = sample_config("t", 0.05, &[]);
        config.name = "Chá".into();
        config.notifications.sound_type = SoundType::Alarm;
        config.video_file = Some(EncodedPayload::encode(b"video"));
        config.video_file_name = Some("done.mp4".into());

        let mut countdown = Countdown::fresh(config, Utc::now()).unwrap();
        countdown.start();
        let mut completion = None;
        for _ in 0..3 {
            if let TickOutcome::Completed { completion: c, .. } = countdown.tick(TICK).unwrap() {
                completion = Some(c);
            }
        }
        let completion = completion.expect("completed");
        assert_eq!(completion.message, "Chá concluído!");
        assert_eq!(completion.sound.sound_type, SoundType::Alarm);
        let video = completion.video.expect("video");
        assert_eq!(video.file_name.as_deref(), Some("done.mp4"));

        // completion happens once; later ticks are idle
        assert_eq!(countdown.tick(TICK).unwrap(), TickOutcome::Idle);
    }

    #[test]
    fn pause_freezes_remaining_time() {
        let mut countdown = started(1.0, &[]);
        countdown.tick(TICK).unwrap();
        countdown.toggle_pause();
        assert!(countdown.is_paused());

        for _ in 0..10 {
            assert_eq!(countdown.tick(TICK).unwrap(), TickOutcome::Idle);
        }
        assert_eq!(countdown.remaining_ms(), 59_000);

        countdown.toggle_pause();
        countdown.tick(TICK).unwrap();
        assert_eq!(countdown.remaining_ms(), 58_000);
    }

    #[test]
    fn stop_resets_and_next_run_refires_intervals() {
        let mut countdown = started(1.0, &[0.5]);
        for _ in 0..40 {
            countdown.tick(TICK).unwrap();
        }
        assert_eq!(countdown.snapshot().notifications_sent.len(), 1);

        countdown.stop();
        assert_eq!(countdown.remaining_ms(), 60_000);
        assert!(countdown.snapshot().notifications_sent.is_empty());
        assert!(!countdown.is_running());

        countdown.start();
        let (fired, _) = run_to_completion(&mut countdown);
        assert_eq!(fired, vec![(30, 0.5)]);
    }

    #[test]
    fn start_does_not_reset_progress() {
        let mut countdown = started(1.0, &[]);
        for _ in 0..5 {
            countdown.tick(TICK).unwrap();
        }
        countdown.toggle_pause();
        countdown.start();
        assert!(countdown.is_ticking());
        assert_eq!(countdown.remaining_ms(), 55_000);
    }

    #[test]
    fn starting_a_finished_run_begins_again() {
        let mut countdown = started(0.05, &[0.05]);
        run_to_completion(&mut countdown);
        assert_eq!(countdown.remaining_ms(), 0);

        let alerts = countdown.start();
        assert_eq!(countdown.remaining_ms(), 3_000);
        assert_eq!(alerts.len(), 1);
    }

    #[test]
    fn interval_equal_to_duration_fires_at_start() {
        let mut countdown =
            Countdown::fresh(sample_config("t", 5.0, &[5.0, 1.0]), Utc::now()).unwrap();
        let alerts = countdown.start();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].message, "Timer t: 5 minutos restantes!");
    }

    #[test]
    fn interval_shorter_than_a_tick_fires_before_completion() {
        let mut countdown = started(0.05, &[0.005]);
        let (fired, ticks) = run_to_completion(&mut countdown);
        assert_eq!(ticks, 3);
        assert_eq!(fired, vec![(3, 0.005)]);
    }

    #[test]
    fn simultaneous_intervals_fire_in_configured_order() {
        let mut countdown = started(1.0, &[0.5, 0.75]);
        // one big step crosses both thresholds
        let outcome = countdown.tick(40_000).unwrap();
        assert_eq!(alerts_of(&outcome), vec![0.5, 0.75]);
    }

    #[test]
    fn restore_rejects_other_timers_snapshot() {
        let other = ActiveTimer::fresh(sample_config("other", 1.0, &[]), Utc::now()).unwrap();
        let err = Countdown::restore(sample_config("mine", 1.0, &[]), other).unwrap_err();
        assert!(matches!(err, RestoreError::OtherTimer { .. }));
    }

    #[test]
    fn restore_keeps_progress_and_sent_alerts() {
        let mut countdown = started(1.0, &[0.5, 0.25]);
        for _ in 0..35 {
            countdown.tick(TICK).unwrap();
        }
        let snapshot = countdown.snapshot().clone();

        let mut restored = Countdown::restore(sample_config("t", 1.0, &[0.5, 0.25]), snapshot)
            .unwrap();
        assert_eq!(restored.remaining_ms(), 25_000);
        assert!(restored.is_ticking());

        let (fired, _) = run_to_completion(&mut restored);
        assert_eq!(fired, vec![(10, 0.25)]);
    }

    #[test]
    fn restore_clamps_to_a_shortened_duration() {
        let snapshot = ActiveTimer::fresh(sample_config("t", 10.0, &[]), Utc::now()).unwrap();
        let restored = Countdown::restore(sample_config("t", 1.0, &[]), snapshot).unwrap();
        assert_eq!(restored.remaining_ms(), 60_000);
        assert_eq!(restored.progress(), 0.0);
    }

    #[test]
    fn corrupt_remaining_time_stops_ticking() {
        let mut snapshot = ActiveTimer::fresh(sample_config("t", 1.0, &[]), Utc::now()).unwrap();
        snapshot.is_running = true;
        let mut countdown = Countdown::restore(sample_config("t", 1.0, &[]), snapshot).unwrap();
        countdown.timer.remaining_time = 61_000;
        assert_eq!(
            countdown.tick(TICK),
            Err(TimerError::RemainingExceedsTotal {
                remaining_ms: 61_000,
                total_ms: 60_000
            })
        );
    }

    #[test]
    fn view_reflects_urgency() {
        let mut countdown = started(1.0, &[]);
        for _ in 0..48 {
            countdown.tick(TICK).unwrap();
        }
        let view = countdown.view();
        assert_eq!(view.progress, 80.0);
        assert_eq!(view.css_color, "rgb(255, 255, 0)");
        assert_eq!(view.font_scale, 10.0);
        assert_eq!(view.clock, "00:12");
        assert_eq!(view.next_alert_in, None);
        assert!(view.is_running && !view.is_paused);
    }
}
