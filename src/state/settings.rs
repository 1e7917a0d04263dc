//! Global notification settings

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    pub sound_enabled: bool,
    pub visual_enabled: bool,
    /// 0.0 ..= 1.0
    pub volume: f32,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            visual_enabled: true,
            volume: 0.7,
        }
    }
}

impl NotificationSettings {
    /// Merge a partial update, keeping the volume within range
    pub fn apply(&mut self, patch: &SettingsPatch) {
        if let Some(sound_enabled) = patch.sound_enabled {
            self.sound_enabled = sound_enabled;
        }
        if let Some(visual_enabled) = patch.visual_enabled {
            self.visual_enabled = visual_enabled;
        }
        if let Some(volume) = patch.volume {
            self.volume = clamp_volume(volume);
        }
    }

    pub(crate) fn normalized(mut self) -> Self {
        self.volume = clamp_volume(self.volume);
        self
    }
}

fn clamp_volume(volume: f32) -> f32 {
    if volume.is_finite() {
        volume.clamp(0.0, 1.0)
    } else {
        NotificationSettings::default().volume
    }
}

/// Typed partial update of [`NotificationSettings`]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub sound_enabled: Option<bool>,
    pub visual_enabled: Option<bool>,
    pub volume: Option<f32>,
}
