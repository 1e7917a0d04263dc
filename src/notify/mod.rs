//! Notification dispatcher
//!
//! Plays alert sounds and shows visual alerts (desktop notification plus a title
//! flash). Sound and visual run concurrently and fail independently; nothing here
//! ever returns an error to the timer runtime.

pub mod audio;
pub mod desktop;
pub mod title;
pub mod tones;

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    error::{AudioError, DesktopError},
    state::{NotificationSettings, SettingsPatch, SoundRequest, SoundType},
    store::ConfigStore,
};
use audio::SoundOutput;
use desktop::{DesktopBackend, Permission, APP_NAME};
use title::{TitleFlasher, TitleSink};
use tones::Tone;

/// A single alert: message plus the sound to play with it
#[derive(Debug, Clone, PartialEq)]
pub struct AlertRequest {
    pub message: String,
    pub sound: SoundRequest,
    pub play_sound: bool,
    pub show_visual: bool,
}

/// The runtime's view of the dispatcher
#[async_trait]
pub trait Alerts: Send + Sync {
    /// Sound and visual alert; resolves when both are done
    async fn notify(&self, alert: AlertRequest);
    async fn play_start_sound(&self, sound: SoundRequest);
}

struct DesktopState {
    backend: Box<dyn DesktopBackend>,
    permission: Permission,
}

pub struct NotificationDispatcher {
    settings: RwLock<NotificationSettings>,
    store: Option<ConfigStore>,
    sound: Arc<dyn SoundOutput>,
    desktop: Mutex<DesktopState>,
    title: TitleFlasher,
}

impl NotificationDispatcher {
    pub fn new(
        settings: NotificationSettings,
        sound: Arc<dyn SoundOutput>,
        desktop: Box<dyn DesktopBackend>,
        title: Arc<dyn TitleSink>,
    ) -> Self {
        Self {
            settings: RwLock::new(settings),
            store: None,
            sound,
            desktop: Mutex::new(DesktopState {
                backend: desktop,
                permission: Permission::Default,
            }),
            title: TitleFlasher::new(title),
        }
    }

    /// Settings are read from and written back to `store`
    pub fn with_store(mut self, store: ConfigStore) -> Self {
        if let Ok(mut guard) = self.settings.write() {
            *guard = store.settings();
        }
        self.store = Some(store);
        self
    }

    pub fn settings(&self) -> NotificationSettings {
        self.settings
            .read()
            .map(|guard| *guard)
            .unwrap_or_default()
    }

    /// Merge, cache and persist a settings update
    pub fn update_settings(&self, patch: &SettingsPatch) -> NotificationSettings {
        let updated = match self.settings.write() {
            Ok(mut guard) => {
                guard.apply(patch);
                *guard
            }
            Err(_) => {
                warn!("Settings lock poisoned, update ignored");
                return NotificationSettings::default();
            }
        };

        if let Some(store) = &self.store {
            if let Err(e) = store.save_settings(&updated) {
                warn!("Failed to persist notification settings: {}", e);
            }
        }
        info!(
            "Notification settings updated: sound={}, visual={}, volume={}",
            updated.sound_enabled, updated.visual_enabled, updated.volume
        );
        updated
    }

    pub async fn play_sound(&self, request: &SoundRequest) -> Result<(), AudioError> {
        let settings = self.settings();
        if !settings.sound_enabled {
            return Ok(());
        }

        let output = Arc::clone(&self.sound);
        let request = request.clone();
        // opening the device and decoding clips both block
        tokio::task::spawn_blocking(move || play_request(output.as_ref(), &request, settings.volume))
            .await
            .map_err(|e| AudioError::EngineUnavailable(e.to_string()))?
    }

    pub async fn show_visual(&self, message: &str) -> Result<(), DesktopError> {
        if !self.settings().visual_enabled {
            return Ok(());
        }
        let (desktop, _) = tokio::join!(self.show_desktop(message), self.title.flash());
        desktop
    }

    async fn show_desktop(&self, message: &str) -> Result<(), DesktopError> {
        let mut desktop = self.desktop.lock().await;
        if desktop.permission == Permission::Default {
            desktop.permission = desktop.backend.request_permission().await;
            info!("Desktop notification permission: {:?}", desktop.permission);
        }
        match desktop.permission {
            Permission::Granted => desktop.backend.show(APP_NAME, message).await,
            Permission::Default | Permission::Denied => Err(DesktopError::PermissionDenied),
        }
    }

    /// Sound and visual alert with failures logged, never returned
    pub async fn dispatch(&self, alert: &AlertRequest) {
        debug!("Dispatching alert: {}", alert.message);
        let sound = async {
            if alert.play_sound {
                self.play_sound(&alert.sound).await
            } else {
                Ok(())
            }
        };
        let visual = async {
            if alert.show_visual {
                self.show_visual(&alert.message).await
            } else {
                Ok(())
            }
        };

        let (sound, visual) = tokio::join!(sound, visual);
        if let Err(e) = sound {
            log_audio_failure(&e);
        }
        if let Err(e) = visual {
            warn!("Visual alert failed: {}", e);
        }
    }
}

#[async_trait]
impl Alerts for NotificationDispatcher {
    async fn notify(&self, alert: AlertRequest) {
        self.dispatch(&alert).await;
    }

    async fn play_start_sound(&self, sound: SoundRequest) {
        if let Err(e) = self.play_sound(&sound).await {
            log_audio_failure(&e);
        }
    }
}

fn log_audio_failure(error: &AudioError) {
    match error {
        AudioError::Disabled => debug!("Sound skipped: {}", error),
        _ => warn!("Sound playback failed: {}", error),
    }
}

/// Custom clips fall back to the default tone when missing or undecodable
fn play_request(
    output: &dyn SoundOutput,
    request: &SoundRequest,
    volume: f32,
) -> Result<(), AudioError> {
    if request.sound_type == SoundType::Custom {
        if let Some(payload) = &request.custom_audio {
            let played = payload
                .decode()
                .map_err(AudioError::from)
                .and_then(|bytes| output.play_clip(bytes, volume));
            match played {
                Ok(()) => return Ok(()),
                Err(e) => warn!("Custom audio failed, playing default tone: {}", e),
            }
        }
        return output.play_tone(Tone::Default, volume);
    }
    output.play_tone(Tone::for_sound_type(request.sound_type), volume)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex as StdMutex;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Played {
        Tone(Tone, f32),
        Clip(usize, f32),
    }

    #[derive(Default)]
    pub struct RecordingSound {
        pub played: StdMutex<Vec<Played>>,
        pub fail_clips: bool,
    }

    impl RecordingSound {
        pub fn played(&self) -> Vec<Played> {
            self.played.lock().unwrap().clone()
        }
    }

    impl SoundOutput for RecordingSound {
        fn play_tone(&self, tone: Tone, volume: f32) -> Result<(), AudioError> {
            self.played.lock().unwrap().push(Played::Tone(tone, volume));
            Ok(())
        }

        fn play_clip(&self, bytes: Vec<u8>, volume: f32) -> Result<(), AudioError> {
            if self.fail_clips {
                return Err(AudioError::Decode("unsupported format".into()));
            }
            self.played
                .lock()
                .unwrap()
                .push(Played::Clip(bytes.len(), volume));
            Ok(())
        }
    }

    pub struct RecordingDesktop {
        pub answer: Permission,
        pub requests: Arc<StdMutex<u32>>,
        pub shown: Arc<StdMutex<Vec<String>>>,
    }

    impl RecordingDesktop {
        pub fn new(answer: Permission) -> Self {
            Self {
                answer,
                requests: Arc::default(),
                shown: Arc::default(),
            }
        }
    }

    #[async_trait]
    impl DesktopBackend for RecordingDesktop {
        async fn request_permission(&mut self) -> Permission {
            *self.requests.lock().unwrap() += 1;
            self.answer
        }

        async fn show(&mut self, _title: &str, body: &str) -> Result<(), DesktopError> {
            self.shown.lock().unwrap().push(body.to_string());
            Ok(())
        }
    }
}
