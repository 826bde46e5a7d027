use std::io::Write;
use std::sync::mpsc::{self, SyncSender, TrySendError};

use super::Tone;
use crate::error::AudioError;

/// Bells waiting for the writer thread. Extra bells are dropped.
const BELL_QUEUE: usize = 4;

/// Destination for rendered tones.
///
/// `play` must hand the tone off and return; it must not wait for the tone
/// to finish.
pub trait ToneSink: Send {
    fn play(&mut self, tone: &Tone) -> Result<(), AudioError>;

    /// Silence whatever is queued or still sounding.
    fn cancel(&mut self) {}
}

/// Rings the terminal bell. Pitch and envelope are lost; used when no sound
/// device can be opened.
///
/// Writes happen on a detached thread so a slow or blocked terminal never
/// holds up the caller.
pub struct TerminalBellSink {
    bells: SyncSender<()>,
}

impl TerminalBellSink {
    /// Bell on stderr.
    ///
    /// # Errors
    ///
    /// Returns `AudioError::Unavailable` if the writer thread cannot be spawned.
    pub fn new() -> Result<Self, AudioError> {
        Self::with_writer(std::io::stderr())
    }

    /// Bell on an arbitrary writer.
    ///
    /// # Errors
    ///
    /// Returns `AudioError::Unavailable` if the writer thread cannot be spawned.
    pub fn with_writer<W: Write + Send + 'static>(mut out: W) -> Result<Self, AudioError> {
        let (bells, rx) = mpsc::sync_channel::<()>(BELL_QUEUE);
        std::thread::Builder::new()
            .name("circuitroom-bell".into())
            .spawn(move || {
                while rx.recv().is_ok() {
                    if let Err(e) = out.write_all(b"\x07").and_then(|()| out.flush()) {
                        tracing::warn!(error = %e, "terminal bell failed");
                        break;
                    }
                }
            })
            .map_err(|e| AudioError::Unavailable(e.to_string()))?;
        Ok(Self { bells })
    }
}

impl ToneSink for TerminalBellSink {
    fn play(&mut self, _tone: &Tone) -> Result<(), AudioError> {
        match self.bells.try_send(()) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(())) => {
                tracing::trace!("bell queue full, dropping bell");
                Ok(())
            }
            Err(TrySendError::Disconnected(())) => Err(AudioError::Disconnected),
        }
    }
}

/// Opens the best sink available: the sound device when the `audio` feature
/// is built in and a device opens, the terminal bell otherwise.
///
/// # Errors
///
/// Returns `AudioError::Unavailable` only if neither sink can be opened.
pub fn default_sink() -> Result<Box<dyn ToneSink>, AudioError> {
    #[cfg(feature = "audio")]
    {
        first_available(
            super::CpalToneSink::open().map(|sink| Box::new(sink) as Box<dyn ToneSink>),
            bell,
        )
    }
    #[cfg(not(feature = "audio"))]
    {
        bell()
    }
}

fn bell() -> Result<Box<dyn ToneSink>, AudioError> {
    Ok(Box::new(TerminalBellSink::new()?))
}

#[cfg_attr(not(any(feature = "audio", test)), allow(dead_code))]
fn first_available(
    primary: Result<Box<dyn ToneSink>, AudioError>,
    fallback: impl FnOnce() -> Result<Box<dyn ToneSink>, AudioError>,
) -> Result<Box<dyn ToneSink>, AudioError> {
    match primary {
        Ok(sink) => Ok(sink),
        Err(e) => {
            tracing::warn!(error = %e, "sound device unavailable, using the terminal bell");
            fallback()
        }
    }
}
