use super::sink::{default_sink, ToneSink};
use super::{Cue, CuePlayer, Tone};
use crate::error::AudioError;

/// Opens a sink on first use.
pub type SinkFactory = Box<dyn FnMut() -> Result<Box<dyn ToneSink>, AudioError> + Send>;

enum SinkSlot {
    Unopened,
    Open(Box<dyn ToneSink>),
    /// Opening or playing failed; cues are skipped until re-enabled.
    Unavailable,
}

/// Fire-and-forget cue playback.
///
/// Owns at most one output resource, opened on the first audible cue and
/// released on [`release`](Self::release) or drop. Every failure is logged
/// and swallowed.
pub struct AudioCueScheduler {
    enabled: bool,
    volume: f32,
    slot: SinkSlot,
    factory: SinkFactory,
}

impl std::fmt::Debug for AudioCueScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slot = match self.slot {
            SinkSlot::Unopened => "unopened",
            SinkSlot::Open(_) => "open",
            SinkSlot::Unavailable => "unavailable",
        };
        f.debug_struct("AudioCueScheduler")
            .field("enabled", &self.enabled)
            .field("volume", &self.volume)
            .field("sink", &slot)
            .finish()
    }
}

impl AudioCueScheduler {
    pub fn new(factory: SinkFactory) -> Self {
        Self {
            enabled: true,
            volume: 1.0,
            slot: SinkSlot::Unopened,
            factory,
        }
    }

    /// Scheduler backed by [`default_sink`].
    pub fn system() -> Self {
        Self::new(Box::new(default_sink))
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling skips future cues but leaves a sounding tone alone.
    /// Re-enabling retries an output that previously failed.
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled && !self.enabled && matches!(self.slot, SinkSlot::Unavailable) {
            self.slot = SinkSlot::Unopened;
        }
        self.enabled = enabled;
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    pub fn is_open(&self) -> bool {
        matches!(self.slot, SinkSlot::Open(_))
    }

    pub fn play_step_start(&mut self) {
        self.play(Cue::StepStart);
    }

    pub fn play_countdown(&mut self) {
        self.play(Cue::Countdown);
    }

    pub fn cancel_pending(&mut self) {
        if let SinkSlot::Open(sink) = &mut self.slot {
            sink.cancel();
        }
    }

    /// Close the output. The next audible cue opens it again.
    pub fn release(&mut self) {
        if matches!(self.slot, SinkSlot::Open(_)) {
            tracing::debug!("releasing audio output");
        }
        self.slot = SinkSlot::Unopened;
    }

    fn play(&mut self, cue: Cue) {
        if !self.enabled {
            return;
        }
        let tone = Tone::for_cue(cue).with_volume(self.volume);
        let Some(sink) = self.sink() else {
            return;
        };
        if let Err(e) = sink.play(&tone) {
            tracing::warn!(error = %e, ?cue, "cue playback failed, continuing without sound");
            self.slot = SinkSlot::Unavailable;
        }
    }

    fn sink(&mut self) -> Option<&mut Box<dyn ToneSink>> {
        if matches!(self.slot, SinkSlot::Unopened) {
            self.slot = match (self.factory)() {
                Ok(sink) => {
                    tracing::debug!("audio output opened");
                    SinkSlot::Open(sink)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "audio output unavailable, cues disabled");
                    SinkSlot::Unavailable
                }
            };
        }
        match &mut self.slot {
            SinkSlot::Open(sink) => Some(sink),
            _ => None,
        }
    }
}

impl CuePlayer for AudioCueScheduler {
    fn play_step_start(&mut self) {
        AudioCueScheduler::play_step_start(self);
    }

    fn play_countdown(&mut self) {
        AudioCueScheduler::play_countdown(self);
    }

    fn cancel_pending(&mut self) {
        AudioCueScheduler::cancel_pending(self);
    }

    fn set_enabled(&mut self, enabled: bool) {
        AudioCueScheduler::set_enabled(self, enabled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Default)]
    struct Log {
        opened: u32,
        played: Vec<f32>,
        cancelled: u32,
    }

    struct FakeSink {
        log: Arc<Mutex<Log>>,
        fail: bool,
    }

    impl ToneSink for FakeSink {
        fn play(&mut self, tone: &Tone) -> Result<(), AudioError> {
            if self.fail {
                return Err(AudioError::Disconnected);
            }
            self.log.lock().played.push(tone.frequency_hz);
            Ok(())
        }

        fn cancel(&mut self) {
            self.log.lock().cancelled += 1;
        }
    }

    fn scheduler(fail_play: bool) -> (AudioCueScheduler, Arc<Mutex<Log>>) {
        let log = Arc::new(Mutex::new(Log::default()));
        let factory_log = log.clone();
        let factory: SinkFactory = Box::new(move || {
            factory_log.lock().opened += 1;
            Ok(Box::new(FakeSink {
                log: factory_log.clone(),
                fail: fail_play,
            }) as Box<dyn ToneSink>)
        });
        (AudioCueScheduler::new(factory), log)
    }

    #[test]
    fn opens_lazily_once() {
        let (mut cues, log) = scheduler(false);
        assert!(!cues.is_open());
        assert_eq!(log.lock().opened, 0);

        cues.play_step_start();
        cues.play_countdown();
        cues.play_countdown();
        assert!(cues.is_open());
        let log = log.lock();
        assert_eq!(log.opened, 1);
        assert_eq!(log.played, vec![1000.0, 800.0, 800.0]);
    }

    #[test]
    fn disabled_plays_nothing() {
        let (mut cues, log) = scheduler(false);
        cues.set_enabled(false);
        cues.play_step_start();
        cues.play_countdown();
        assert_eq!(log.lock().opened, 0);
        assert!(log.lock().played.is_empty());
    }

    #[test]
    fn disabling_does_not_cancel_in_flight_tone() {
        let (mut cues, log) = scheduler(false);
        cues.play_step_start();
        cues.set_enabled(false);
        assert_eq!(log.lock().cancelled, 0);
    }

    #[test]
    fn open_failure_is_swallowed() {
        let factory: SinkFactory =
            Box::new(|| Err(AudioError::Unavailable("no device".into())));
        let mut cues = AudioCueScheduler::new(factory);
        cues.play_step_start();
        cues.play_countdown();
        assert!(!cues.is_open());
    }

    #[test]
    fn play_failure_marks_unavailable_until_reenabled() {
        let (mut cues, log) = scheduler(true);
        cues.play_step_start();
        cues.play_countdown();
        assert_eq!(log.lock().opened, 1);
        assert!(!cues.is_open());

        cues.set_enabled(false);
        cues.set_enabled(true);
        cues.play_countdown();
        assert_eq!(log.lock().opened, 2);
    }

    #[test]
    fn cancel_reaches_open_sink_and_release_reopens() {
        let (mut cues, log) = scheduler(false);
        cues.cancel_pending();
        assert_eq!(log.lock().cancelled, 0);

        cues.play_countdown();
        cues.cancel_pending();
        assert_eq!(log.lock().cancelled, 1);

        cues.release();
        assert!(!cues.is_open());
        cues.play_countdown();
        assert_eq!(log.lock().opened, 2);
    }

    #[test]
    fn volume_is_clamped() {
        let (mut cues, _) = scheduler(false);
        cues.set_volume(2.0);
        assert_eq!(cues.volume(), 1.0);
        cues.set_volume(-1.0);
        assert_eq!(cues.volume(), 0.0);
    }
}
