//! Synthesized alert tones
//!
//! Each [`Tone`] is a short recipe of oscillator voices with stepped frequencies and a
//! shared envelope: 10 ms linear attack, then exponential decay to near silence.

use std::f32::consts::PI;
#[cfg(feature = "audio")]
use std::time::Duration;

use crate::state::SoundType;

pub const SAMPLE_RATE: u32 = 44_100;

const ATTACK_MS: f32 = 10.0;
const DECAY_FLOOR: f32 = 0.001;

/// Frequency change scheduled `at_ms` after the tone starts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyStep {
    pub at_ms: u32,
    pub hz: f32,
}

const fn step(at_ms: u32, hz: f32) -> FrequencyStep {
    FrequencyStep { at_ms, hz }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneRecipe {
    pub voices: &'static [&'static [FrequencyStep]],
    pub duration_ms: u32,
    pub peak_gain: f32,
}

const DEFAULT_SWEEP: &[FrequencyStep] = &[step(0, 800.0), step(100, 600.0), step(200, 800.0)];
const BEEP: &[FrequencyStep] = &[step(0, 1000.0)];
const CHIME_LOW: &[FrequencyStep] = &[step(0, 523.0)];
const CHIME_HIGH: &[FrequencyStep] = &[step(0, 659.0)];
const ALARM: &[FrequencyStep] = &[
    step(0, 800.0),
    step(100, 1200.0),
    step(200, 800.0),
    step(300, 1200.0),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
    Default,
    Beep,
    Chime,
    Alarm,
}

impl Tone {
    pub const ALL: [Tone; 4] = [Tone::Default, Tone::Beep, Tone::Chime, Tone::Alarm];

    /// `Custom` has no synthesized form and maps to the default tone
    pub fn for_sound_type(sound_type: SoundType) -> Self {
        match sound_type {
            SoundType::Beep => Tone::Beep,
            SoundType::Chime => Tone::Chime,
            SoundType::Alarm => Tone::Alarm,
            SoundType::Default | SoundType::Custom => Tone::Default,
        }
    }

    pub fn recipe(self) -> ToneRecipe {
        match self {
            Tone::Default => ToneRecipe {
                voices: &[DEFAULT_SWEEP],
                duration_ms: 300,
                peak_gain: 0.3,
            },
            Tone::Beep => ToneRecipe {
                voices: &[BEEP],
                duration_ms: 200,
                peak_gain: 0.2,
            },
            Tone::Chime => ToneRecipe {
                voices: &[CHIME_LOW, CHIME_HIGH],
                duration_ms: 500,
                peak_gain: 0.2,
            },
            Tone::Alarm => ToneRecipe {
                voices: &[ALARM],
                duration_ms: 400,
                peak_gain: 0.4,
            },
        }
    }

    pub fn samples(self, volume: f32) -> ToneSamples {
        ToneSamples::new(self.recipe(), volume)
    }
}

impl ToneRecipe {
    fn envelope(&self, t_ms: f32) -> f32 {
        if t_ms < ATTACK_MS {
            return self.peak_gain * (t_ms / ATTACK_MS);
        }
        let span = (self.duration_ms as f32 - ATTACK_MS).max(1.0);
        let progress = ((t_ms - ATTACK_MS) / span).min(1.0);
        self.peak_gain * (DECAY_FLOOR / self.peak_gain).powf(progress)
    }
}

fn frequency_at(steps: &[FrequencyStep], t_ms: f32) -> f32 {
    steps
        .iter()
        .take_while(|s| s.at_ms as f32 <= t_ms)
        .last()
        .or(steps.first())
        .map(|s| s.hz)
        .unwrap_or(0.0)
}

/// Mono f32 sample stream for one tone
#[derive(Debug, Clone)]
pub struct ToneSamples {
    recipe: ToneRecipe,
    volume: f32,
    index: u32,
    total: u32,
    phases: Vec<f32>,
}

impl ToneSamples {
    pub fn new(recipe: ToneRecipe, volume: f32) -> Self {
        Self {
            total: SAMPLE_RATE * recipe.duration_ms / 1000,
            phases: vec![0.0; recipe.voices.len()],
            recipe,
            volume: volume.clamp(0.0, 1.0),
            index: 0,
        }
    }

    pub fn len_samples(&self) -> u32 {
        self.total
    }
}

impl Iterator for ToneSamples {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.total {
            return None;
        }
        let t_ms = self.index as f32 * 1000.0 / SAMPLE_RATE as f32;
        self.index += 1;

        let voices = self.recipe.voices;
        let mut mixed = 0.0;
        for (voice, phase) in voices.iter().zip(self.phases.iter_mut()) {
            // phase accumulates so frequency steps stay continuous
            *phase = (*phase + 2.0 * PI * frequency_at(voice, t_ms) / SAMPLE_RATE as f32)
                % (2.0 * PI);
            mixed += phase.sin();
        }
        mixed /= voices.len().max(1) as f32;

        Some(mixed * self.recipe.envelope(t_ms) * self.volume)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.total - self.index) as usize;
        (left, Some(left))
    }
}

#[cfg(feature = "audio")]
impl rodio::Source for ToneSamples {
    fn current_frame_len(&self) -> Option<usize> {
        Some((self.total - self.index) as usize)
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(Duration::from_millis(self.recipe.duration_ms as u64))
    }
}
