//! Pure derivations from the countdown: progress, theme color, font scale, labels

use std::fmt;

use serde::Serialize;

/// Progress at which the display switches to its urgent look
pub const URGENT_THRESHOLD: f64 = 80.0;

pub const BASE_FONT_REM: f64 = 8.0;
pub const URGENT_FONT_MIN_REM: f64 = 10.0;
pub const URGENT_FONT_MAX_REM: f64 = 16.0;

/// Percentage of the total duration that has elapsed, within 0..=100
pub fn progress(remaining_ms: u64, total_ms: u64) -> f64 {
    if total_ms == 0 {
        return 100.0;
    }
    let remaining = remaining_ms.min(total_ms) as f64;
    let total = total_ms as f64;
    ((total - remaining) / total * 100.0).clamp(0.0, 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

fn channel(value: f64) -> u8 {
    (255.0 * value.clamp(0.0, 1.0)).floor() as u8
}

/// Green-blue to yellow below the urgent threshold, yellow to red from it onward
pub fn color_for(progress: f64) -> Rgb {
    if progress >= URGENT_THRESHOLD {
        let intensity = (progress - URGENT_THRESHOLD) / (100.0 - URGENT_THRESHOLD);
        Rgb {
            r: 255,
            g: channel(1.0 - intensity),
            b: 0,
        }
    } else {
        let intensity = progress / URGENT_THRESHOLD;
        Rgb {
            r: channel(intensity),
            g: 255,
            b: channel(1.0 - intensity),
        }
    }
}

/// Countdown font size in rem
pub fn font_scale_for(progress: f64) -> f64 {
    if progress >= URGENT_THRESHOLD {
        let intensity =
            ((progress - URGENT_THRESHOLD) / (100.0 - URGENT_THRESHOLD)).clamp(0.0, 1.0);
        URGENT_FONT_MIN_REM + (URGENT_FONT_MAX_REM - URGENT_FONT_MIN_REM) * intensity
    } else {
        BASE_FONT_REM
    }
}

/// `HH:MM:SS` from one hour up, `MM:SS` below; partial seconds round up
pub fn format_clock(ms: u64) -> String {
    let total_seconds = ms.div_ceil(1000);
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// Human label for a duration in minutes: `1h 30m`, `45m`, `2.5m`, `1h 0.5m`
pub fn format_minutes(minutes: f64) -> String {
    let hours = (minutes / 60.0).floor();
    let mins = minutes - hours * 60.0;

    if minutes.fract() != 0.0 {
        if hours > 0.0 {
            return format!("{}h {:.1}m", hours, mins);
        }
        return format!("{:.1}m", minutes);
    }
    if hours > 0.0 {
        format!("{}h {}m", hours, mins.floor())
    } else {
        format!("{}m", minutes)
    }
}

/// Milliseconds until the nearest interval threshold not reached yet
pub fn next_alert_in_ms(intervals: &[f64], remaining_ms: u64, total_ms: u64) -> Option<u64> {
    let elapsed = total_ms.saturating_sub(remaining_ms);
    intervals
        .iter()
        .map(|&interval| total_ms.saturating_sub((interval * 60_000.0).round() as u64))
        .filter(|&threshold| elapsed < threshold)
        .map(|threshold| threshold - elapsed)
        .min()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_bounded_and_monotonic() {
        let total = 90_000;
        let mut last = -1.0;
        for remaining in (0..=total).rev().step_by(1_000) {
            let p = progress(remaining, total);
            assert!((0.0..=100.0).contains(&p));
            assert!(p >= last);
            last = p;
        }
        assert_eq!(progress(total, total), 0.0);
        assert_eq!(progress(0, total), 100.0);
        assert_eq!(progress(45_000, total), 50.0);
    }

    #[test]
    fn color_branches_meet_at_the_urgent_boundary() {
        assert_eq!(color_for(0.0), Rgb { r: 0, g: 255, b: 255 });
        assert_eq!(color_for(40.0), Rgb { r: 127, g: 255, b: 127 });

        // 79.9 still interpolates towards yellow, keeping some blue
        let almost = color_for(79.9);
        assert_eq!(almost.g, 255);
        assert_eq!(almost.r, 254);
        assert_eq!(almost.b, 0);
        assert!(almost.r < 255);

        // 80.0 is on the urgent side
        assert_eq!(color_for(80.0), Rgb { r: 255, g: 255, b: 0 });
        assert_eq!(color_for(90.0), Rgb { r: 255, g: 127, b: 0 });
        assert_eq!(color_for(100.0), Rgb { r: 255, g: 0, b: 0 });
        assert_eq!(color_for(100.0).to_string(), "rgb(255, 0, 0)");
    }

    #[test]
    fn font_grows_only_when_urgent() {
        assert_eq!(font_scale_for(0.0), BASE_FONT_REM);
        assert_eq!(font_scale_for(79.9), BASE_FONT_REM);
        assert_eq!(font_scale_for(80.0), 10.0);
        assert_eq!(font_scale_for(90.0), 13.0);
        assert_eq!(font_scale_for(100.0), 16.0);
    }

    #[test]
    fn clock_labels() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(59_001), "01:00");
        assert_eq!(format_clock(61_000), "01:01");
        assert_eq!(format_clock(3_600_000), "01:00:00");
        assert_eq!(format_clock(5_025_000), "01:23:45");
    }

    #[test]
    fn minute_labels() {
        assert_eq!(format_minutes(45.0), "45m");
        assert_eq!(format_minutes(90.0), "1h 30m");
        assert_eq!(format_minutes(2.5), "2.5m");
        assert_eq!(format_minutes(60.5), "1h 0.5m");
    }

    #[test]
    fn next_alert_picks_nearest_upcoming_threshold() {
        let total = 120_000;
        let intervals = [0.25, 1.0];
        assert_eq!(next_alert_in_ms(&intervals, total, total), Some(60_000));
        assert_eq!(next_alert_in_ms(&intervals, 60_000, total), Some(45_000));
        assert_eq!(next_alert_in_ms(&intervals, 15_000, total), None);
    }
}
