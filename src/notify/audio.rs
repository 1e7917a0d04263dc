//! Sound output
//!
//! The real engine owns a rodio output stream on a dedicated thread (the stream is not
//! `Send`) and is fed through a channel. It is started lazily on first use and rebuilt
//! when the thread has gone away or the output device stops accepting sinks. Built
//! without the `audio` feature, every call reports [`AudioError::Disabled`].

use crate::{error::AudioError, notify::tones::Tone};

/// Something that can play alert sounds. Calls return once playback is queued.
pub trait SoundOutput: Send + Sync {
    fn play_tone(&self, tone: Tone, volume: f32) -> Result<(), AudioError>;
    /// Play an encoded clip (wav, mp3, ogg, flac) once
    fn play_clip(&self, bytes: Vec<u8>, volume: f32) -> Result<(), AudioError>;
}

#[derive(Default)]
pub struct AudioEngine {
    #[cfg(feature = "audio")]
    tx: std::sync::Mutex<Option<std::sync::mpsc::Sender<engine::AudioCommand>>>,
}

impl AudioEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(not(feature = "audio"))]
impl SoundOutput for AudioEngine {
    fn play_tone(&self, _tone: Tone, _volume: f32) -> Result<(), AudioError> {
        Err(AudioError::Disabled)
    }

    fn play_clip(&self, _bytes: Vec<u8>, _volume: f32) -> Result<(), AudioError> {
        Err(AudioError::Disabled)
    }
}

#[cfg(feature = "audio")]
impl SoundOutput for AudioEngine {
    fn play_tone(&self, tone: Tone, volume: f32) -> Result<(), AudioError> {
        // volume is already applied to the synthesized samples
        self.submit(engine::AudioCommand::Play {
            source: Box::new(tone.samples(volume)),
            volume: 1.0,
        })
    }

    fn play_clip(&self, bytes: Vec<u8>, volume: f32) -> Result<(), AudioError> {
        use rodio::Source;

        let decoder = rodio::Decoder::new(std::io::Cursor::new(bytes))
            .map_err(|e| AudioError::Decode(e.to_string()))?;
        self.submit(engine::AudioCommand::Play {
            source: Box::new(decoder.convert_samples::<f32>()),
            volume: volume.clamp(0.0, 1.0),
        })
    }
}

#[cfg(feature = "audio")]
impl AudioEngine {
    fn ensure_thread(&self) -> Result<std::sync::mpsc::Sender<engine::AudioCommand>, AudioError> {
        let mut guard = self
            .tx
            .lock()
            .map_err(|e| AudioError::EngineUnavailable(e.to_string()))?;
        if let Some(tx) = guard.as_ref() {
            return Ok(tx.clone());
        }
        let tx = engine::spawn()?;
        *guard = Some(tx.clone());
        Ok(tx)
    }

    fn reset(&self) {
        if let Ok(mut guard) = self.tx.lock() {
            guard.take();
        }
    }

    fn submit(&self, command: engine::AudioCommand) -> Result<(), AudioError> {
        let tx = self.ensure_thread()?;
        match tx.send(command) {
            Ok(()) => Ok(()),
            Err(std::sync::mpsc::SendError(command)) => {
                tracing::warn!("Audio engine thread is gone, recreating it");
                self.reset();
                self.ensure_thread()?
                    .send(command)
                    .map_err(|e| AudioError::EngineUnavailable(e.to_string()))
            }
        }
    }
}

#[cfg(feature = "audio")]
mod engine {
    use std::{
        sync::mpsc::{self, Sender},
        thread,
    };

    use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
    use tracing::{debug, warn};

    use crate::error::AudioError;

    pub(super) type BoxedSource = Box<dyn Source<Item = f32> + Send>;

    pub(super) enum AudioCommand {
        Play { source: BoxedSource, volume: f32 },
    }

    type Output = Option<(OutputStream, OutputStreamHandle)>;

    /// Start the engine thread and wait until it has opened the output device
    pub(super) fn spawn() -> Result<Sender<AudioCommand>, AudioError> {
        let (tx, rx) = mpsc::channel::<AudioCommand>();
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<(), String>>(1);

        thread::Builder::new()
            .name("audio-engine".to_string())
            .spawn(move || {
                let mut output: Output = match OutputStream::try_default() {
                    Ok(pair) => {
                        let _ = ready_tx.send(Ok(()));
                        Some(pair)
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e.to_string()));
                        return;
                    }
                };

                while let Ok(command) = rx.recv() {
                    match command {
                        AudioCommand::Play { source, volume } => {
                            if let Err(e) = play(&mut output, source, volume) {
                                warn!("Audio playback failed: {}", e);
                            }
                        }
                    }
                }
                debug!("Audio engine thread exiting");
            })
            .map_err(|e| AudioError::EngineUnavailable(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(tx),
            Ok(Err(e)) => Err(AudioError::NoDevice(e)),
            Err(e) => Err(AudioError::EngineUnavailable(e.to_string())),
        }
    }

    fn open_sink(output: &mut Output) -> Result<Sink, String> {
        if let Some((_, handle)) = output.as_ref() {
            if let Ok(sink) = Sink::try_new(handle) {
                return Ok(sink);
            }
            // the stream stopped working; drop it and open a new one
            *output = None;
        }
        let (stream, handle) = OutputStream::try_default()
            .map_err(|e| format!("Failed to create audio output stream: {}", e))?;
        let sink =
            Sink::try_new(&handle).map_err(|e| format!("Failed to create audio sink: {}", e))?;
        *output = Some((stream, handle));
        Ok(sink)
    }

    fn play(output: &mut Output, source: BoxedSource, volume: f32) -> Result<(), String> {
        let sink = open_sink(output)?;
        sink.set_volume(volume);
        sink.append(source);
        // sounds may overlap; each sink plays out on its own
        sink.detach();
        Ok(())
    }
}
