// Tone output through cpal.
// The stream lives on its own thread because cpal streams are not Send;
// tones reach the device callback through a ring buffer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Stream, StreamConfig};
use parking_lot::Mutex;
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::HeapRb;

use super::{Tone, ToneSink};
use crate::error::AudioError;

const RING_BUFFER_SECS: usize = 2;

type RingProducer = ringbuf::HeapProd<f32>;
type RingConsumer = ringbuf::HeapCons<f32>;

enum Command {
    Play(Tone),
    Cancel,
    Shutdown,
}

/// Sink that plays tones on the default output device.
pub struct CpalToneSink {
    commands: mpsc::Sender<Command>,
    thread: Option<JoinHandle<()>>,
}

impl CpalToneSink {
    /// Spawn the audio thread and wait until it has opened the device.
    ///
    /// # Errors
    ///
    /// Returns `AudioError::Unavailable` if the thread cannot be spawned or
    /// there is no usable output device.
    pub fn open() -> Result<Self, AudioError> {
        let (commands, rx) = mpsc::channel();
        let (ready_tx, ready) = mpsc::sync_channel(1);
        let thread = std::thread::Builder::new()
            .name("circuitroom-audio".into())
            .spawn(move || run(rx, ready_tx))
            .map_err(|e| AudioError::Unavailable(e.to_string()))?;
        match ready.recv() {
            Ok(Ok(())) => Ok(Self {
                commands,
                thread: Some(thread),
            }),
            Ok(Err(e)) => {
                let _ = thread.join();
                Err(e)
            }
            Err(_) => Err(AudioError::Disconnected),
        }
    }
}

impl ToneSink for CpalToneSink {
    fn play(&mut self, tone: &Tone) -> Result<(), AudioError> {
        self.commands
            .send(Command::Play(*tone))
            .map_err(|_| AudioError::Disconnected)
    }

    fn cancel(&mut self) {
        let _ = self.commands.send(Command::Cancel);
    }
}

impl Drop for CpalToneSink {
    fn drop(&mut self) {
        let _ = self.commands.send(Command::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn run(rx: mpsc::Receiver<Command>, ready: mpsc::SyncSender<Result<(), AudioError>>) {
    let output = match Output::open() {
        Ok(output) => output,
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };
    let _ = ready.send(Ok(()));
    tracing::debug!(
        sample_rate = output.sample_rate,
        channels = output.channels,
        "audio output opened"
    );
    while let Ok(command) = rx.recv() {
        match command {
            Command::Play(tone) => {
                let samples = tone.render(output.sample_rate, output.channels);
                let written = output.producer.lock().push_slice(&samples);
                if written < samples.len() {
                    tracing::debug!(dropped = samples.len() - written, "tone truncated, buffer full");
                }
            }
            Command::Cancel => output.clear_flag.store(true, Ordering::SeqCst),
            Command::Shutdown => break,
        }
    }
}

struct Output {
    _stream: Stream,
    producer: Arc<Mutex<RingProducer>>,
    clear_flag: Arc<AtomicBool>,
    sample_rate: u32,
    channels: u16,
}

impl Output {
    fn open() -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| AudioError::Unavailable("no output device".into()))?;
        let config = device
            .default_output_config()
            .map_err(|e| AudioError::Unavailable(e.to_string()))?;

        let sample_rate = config.sample_rate().0;
        let channels = config.channels();

        let capacity = sample_rate as usize * usize::from(channels) * RING_BUFFER_SECS;
        let (producer, consumer) = HeapRb::<f32>::new(capacity).split();
        let producer = Arc::new(Mutex::new(producer));
        let consumer = Arc::new(Mutex::new(consumer));
        let clear_flag = Arc::new(AtomicBool::new(false));

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => {
                build_stream::<f32>(&device, &config.into(), consumer, clear_flag.clone())?
            }
            cpal::SampleFormat::I16 => {
                build_stream::<i16>(&device, &config.into(), consumer, clear_flag.clone())?
            }
            cpal::SampleFormat::U16 => {
                build_stream::<u16>(&device, &config.into(), consumer, clear_flag.clone())?
            }
            format => {
                return Err(AudioError::Unavailable(format!(
                    "unsupported sample format: {format:?}"
                )))
            }
        };
        stream
            .play()
            .map_err(|e| AudioError::Unavailable(e.to_string()))?;

        Ok(Self {
            _stream: stream,
            producer,
            clear_flag,
            sample_rate,
            channels,
        })
    }
}

fn build_stream<T: cpal::SizedSample + cpal::FromSample<f32>>(
    device: &cpal::Device,
    config: &StreamConfig,
    consumer: Arc<Mutex<RingConsumer>>,
    clear_flag: Arc<AtomicBool>,
) -> Result<Stream, AudioError> {
    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                let mut consumer = consumer.lock();
                if clear_flag.swap(false, Ordering::SeqCst) {
                    while consumer.try_pop().is_some() {}
                }
                for sample in data.iter_mut() {
                    *sample = T::from_sample(consumer.try_pop().unwrap_or(0.0));
                }
            },
            |err| tracing::warn!(error = %err, "audio stream error"),
            None,
        )
        .map_err(|e| AudioError::Unavailable(e.to_string()))
}
