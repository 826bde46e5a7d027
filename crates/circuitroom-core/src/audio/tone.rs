use std::f64::consts::TAU;
use std::time::Duration;

use super::Cue;

const PEAK_GAIN: f32 = 0.1;

/// A sine tone shaped by a linear attack / hold / release envelope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub frequency_hz: f32,
    pub duration: Duration,
    pub attack: Duration,
    pub release: Duration,
    pub peak_gain: f32,
}

impl Tone {
    pub fn step_start() -> Self {
        Self {
            frequency_hz: 1000.0,
            duration: Duration::from_millis(400),
            attack: Duration::from_millis(10),
            release: Duration::from_millis(10),
            peak_gain: PEAK_GAIN,
        }
    }

    pub fn countdown() -> Self {
        Self {
            frequency_hz: 800.0,
            duration: Duration::from_millis(100),
            attack: Duration::from_millis(5),
            release: Duration::from_millis(5),
            peak_gain: PEAK_GAIN,
        }
    }

    pub fn for_cue(cue: Cue) -> Self {
        match cue {
            Cue::StepStart => Self::step_start(),
            Cue::Countdown => Self::countdown(),
        }
    }

    /// Scale the peak gain by `volume` (clamped to `0.0..=1.0`).
    pub fn with_volume(mut self, volume: f32) -> Self {
        self.peak_gain *= volume.clamp(0.0, 1.0);
        self
    }

    /// Envelope gain `t` seconds after the tone starts.
    pub fn gain_at(&self, t: f64) -> f32 {
        let total = self.duration.as_secs_f64();
        let attack = self.attack.as_secs_f64();
        let release = self.release.as_secs_f64();
        let peak = f64::from(self.peak_gain);

        let gain = if !(0.0..total).contains(&t) {
            0.0
        } else if t < attack {
            peak * t / attack
        } else if t > total - release {
            peak * (total - t) / release
        } else {
            peak
        };
        gain as f32
    }

    /// Interleaved samples for an output with `channels` channels.
    pub fn render(&self, sample_rate: u32, channels: u16) -> Vec<f32> {
        let rate = f64::from(sample_rate);
        let frames = (self.duration.as_secs_f64() * rate).round() as usize;
        let channels = usize::from(channels.max(1));
        let freq = f64::from(self.frequency_hz);

        let mut samples = Vec::with_capacity(frames * channels);
        for n in 0..frames {
            let t = n as f64 / rate;
            let value = ((TAU * freq * t).sin() as f32) * self.gain_at(t);
            samples.extend(std::iter::repeat(value).take(channels));
        }
        samples
    }
}
