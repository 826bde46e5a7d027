//! Drives a [`SessionEngine`] from a one-second tick source.
//!
//! Ticks and commands go through the same mutex, so a command is never
//! observed half-applied by a tick. Each tick source is bound to the session
//! id it was spawned for and stops touching the engine as soon as that
//! session ends, which is what makes `stop()` final.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};

use super::engine::SessionEngine;
use super::sequence::StepSequence;
use super::state::{Phase, SessionState, SessionView};
use super::ticker::{TickSource, TICK_PERIOD};
use crate::error::EngineError;
use crate::events::Event;

const EVENT_CAPACITY: usize = 256;

struct Inner {
    engine: SessionEngine,
    ticker: Option<TickSource>,
}

struct Shared {
    inner: Mutex<Inner>,
    views: watch::Sender<SessionView>,
    events: broadcast::Sender<Event>,
}

impl Shared {
    fn publish(&self, engine: &SessionEngine, produced: impl IntoIterator<Item = Event>) {
        self.views.send_replace(engine.view());
        for event in produced {
            // No subscribers is fine.
            let _ = self.events.send(event);
        }
    }
}

/// Async shell around the engine. Must be used inside a tokio runtime.
pub struct SessionRunner {
    shared: Arc<Shared>,
}

impl SessionRunner {
    pub fn new(engine: SessionEngine) -> Self {
        let (views, _) = watch::channel(engine.view());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    engine,
                    ticker: None,
                }),
                views,
                events,
            }),
        }
    }

    pub fn subscribe_views(&self) -> watch::Receiver<SessionView> {
        self.shared.views.subscribe()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<Event> {
        self.shared.events.subscribe()
    }

    pub fn snapshot(&self) -> SessionState {
        self.shared.inner.lock().engine.snapshot()
    }

    pub fn view(&self) -> SessionView {
        self.shared.inner.lock().engine.view()
    }

    /// Start a session and its tick source.
    ///
    /// # Errors
    ///
    /// Propagates the engine's `start` errors; nothing is spawned then.
    pub fn start(&self, sequence: StepSequence) -> Result<(), EngineError> {
        let mut inner = self.shared.inner.lock();
        let events = inner.engine.start(sequence)?;
        let session_id = inner.engine.session_id();
        inner.ticker = Some(spawn_ticker(
            Arc::downgrade(&self.shared),
            session_id,
            TICK_PERIOD,
        ));
        self.shared.publish(&inner.engine, events);
        Ok(())
    }

    pub fn pause(&self) {
        let mut inner = self.shared.inner.lock();
        let event = inner.engine.pause();
        self.shared.publish(&inner.engine, event);
    }

    pub fn resume(&self) {
        let mut inner = self.shared.inner.lock();
        let event = inner.engine.resume();
        self.shared.publish(&inner.engine, event);
    }

    /// Toggle between paused and running. Returns the resulting phase.
    pub fn toggle_pause(&self) -> Phase {
        let mut inner = self.shared.inner.lock();
        let event = match inner.engine.phase() {
            Phase::Running => inner.engine.pause(),
            Phase::Paused => inner.engine.resume(),
            _ => None,
        };
        self.shared.publish(&inner.engine, event);
        inner.engine.phase()
    }

    /// End the session. When this returns no further tick or cue will occur
    /// for it.
    pub fn stop(&self) {
        let mut inner = self.shared.inner.lock();
        if let Some(ticker) = inner.ticker.take() {
            ticker.cancel();
        }
        let event = inner.engine.stop();
        self.shared.publish(&inner.engine, event);
    }

    pub fn set_sound_enabled(&self, enabled: bool) {
        self.shared.inner.lock().engine.set_cues_enabled(enabled);
    }

    /// Resolves once the engine is idle (completed or stopped).
    pub async fn finished(&self) {
        let mut views = self.subscribe_views();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = views
            .wait_for(|view| view.state.phase == Phase::Idle)
            .await;
    }
}

impl Drop for SessionRunner {
    fn drop(&mut self) {
        if let Some(ticker) = self.shared.inner.lock().ticker.take() {
            ticker.cancel();
        }
    }
}

fn spawn_ticker(shared: Weak<Shared>, session_id: u64, period: Duration) -> TickSource {
    TickSource::spawn(period, move || {
        let Some(shared) = shared.upgrade() else {
            return false;
        };
        let mut inner = shared.inner.lock();
        if inner.engine.session_id() != session_id || !inner.engine.phase().is_active() {
            return false;
        }
        let events = inner.engine.tick();
        shared.publish(&inner.engine, events);
        if inner.engine.phase().is_active() {
            return true;
        }
        // Completed: drop our own handle; the loop exits on `false`.
        inner.ticker = None;
        false
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{Cue, CuePlayer};
    use crate::session::sequence::Step;

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<Cue>>>);

    impl CuePlayer for Recorder {
        fn play_step_start(&mut self) {
            self.0.lock().push(Cue::StepStart);
        }

        fn play_countdown(&mut self) {
            self.0.lock().push(Cue::Countdown);
        }
    }

    fn runner() -> (SessionRunner, Recorder) {
        let recorder = Recorder::default();
        let engine = SessionEngine::new(Box::new(recorder.clone()));
        (SessionRunner::new(engine), recorder)
    }

    fn seq(durations: &[u32], rounds: u32) -> StepSequence {
        StepSequence::new(
            durations
                .iter()
                .map(|d| Step::exercise(format!("{d}s"), *d))
                .collect(),
            rounds,
        )
    }

    async fn sleep_ms(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_second() {
        let (runner, _) = runner();
        runner.start(seq(&[10], 1)).unwrap();
        assert_eq!(runner.snapshot().phase, Phase::PreRoll);

        sleep_ms(3_500).await;
        let state = runner.snapshot();
        assert_eq!(state.phase, Phase::Running);
        assert_eq!(state.seconds_remaining, 10);

        sleep_ms(2_000).await;
        assert_eq!(runner.snapshot().seconds_remaining, 8);
    }

    #[tokio::test(start_paused = true)]
    async fn runs_to_completion_and_publishes() {
        let (runner, _) = runner();
        let mut events = runner.subscribe_events();
        let views = runner.subscribe_views();
        runner.start(seq(&[2], 2)).unwrap();

        tokio::time::timeout(Duration::from_secs(60), runner.finished())
            .await
            .unwrap();
        assert_eq!(views.borrow().state, SessionState::idle());

        let mut completed = false;
        while let Ok(event) = events.try_recv() {
            if matches!(event, Event::SessionCompleted { rounds_completed: 2, .. }) {
                completed = true;
            }
        }
        assert!(completed);
        assert!(runner.shared.inner.lock().ticker.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_silences_everything() {
        let (runner, cues) = runner();
        runner.start(seq(&[5, 5], 3)).unwrap();
        sleep_ms(6_500).await;
        runner.stop();
        assert_eq!(runner.snapshot(), SessionState::idle());

        let heard = cues.0.lock().len();
        assert!(heard > 0);
        sleep_ms(30_000).await;
        assert_eq!(cues.0.lock().len(), heard);
        assert_eq!(runner.snapshot(), SessionState::idle());
    }

    #[tokio::test(start_paused = true)]
    async fn pause_holds_over_time() {
        let (runner, _) = runner();
        runner.start(seq(&[30], 1)).unwrap();
        sleep_ms(5_500).await;
        assert_eq!(runner.snapshot().seconds_remaining, 28);

        assert_eq!(runner.toggle_pause(), Phase::Paused);
        sleep_ms(10_000).await;
        assert_eq!(runner.snapshot().seconds_remaining, 28);

        runner.resume();
        sleep_ms(1_000).await;
        assert_eq!(runner.snapshot().seconds_remaining, 27);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_does_not_double_tick() {
        let (runner, _) = runner();
        runner.start(seq(&[30], 1)).unwrap();
        assert_eq!(
            runner.start(seq(&[30], 1)).unwrap_err(),
            EngineError::AlreadyRunning
        );
        sleep_ms(1_500).await;
        runner.stop();
        runner.start(seq(&[30], 1)).unwrap();

        // Only the new source ticks (at 2.5s); the old one would have hit 2.0s.
        sleep_ms(1_500).await;
        let state = runner.snapshot();
        assert_eq!(state.phase, Phase::PreRoll);
        assert_eq!(state.seconds_remaining, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_sequence_spawns_nothing() {
        let (runner, _) = runner();
        assert_eq!(
            runner.start(StepSequence::default()).unwrap_err(),
            EngineError::EmptySequence
        );
        assert!(runner.shared.inner.lock().ticker.is_none());
    }
}
