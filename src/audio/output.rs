//! Audio output using the `cpal` crate.
//!
//! A [`DeviceClip`] owns one decoded song and a cpal output stream that
//! plays it. The stream lives on its own thread for the whole lifetime of
//! the clip; the device callback reads the clip's cursor, running flag and
//! gain through atomics, so control calls never block on the device.

use std::{
    path::Path,
    sync::{
        Arc,
        atomic::{
            AtomicBool, AtomicU32, AtomicU64,
            Ordering::{AcqRel, Acquire, Relaxed, Release},
        },
    },
    thread::{JoinHandle, spawn},
    time::Duration,
};

use {
    async_channel::{Sender, bounded},
    cpal::{
        BuildStreamError, DefaultStreamConfigError, Device, FromSample, Host, OutputCallbackInfo,
        PlayStreamError, Sample,
        SampleFormat::{self, F32, F64, I16, I32, U16},
        SizedSample, Stream, StreamConfig, default_host,
        traits::{DeviceTrait, HostTrait, StreamTrait},
    },
    num_traits::ToPrimitive,
    thiserror::Error,
    tracing::{debug, error, warn},
};

use crate::{
    audio::{
        clip::{AudioClip, ClipOpener, GainRange, db_to_linear},
        decoder::{DecodedClip, decode_file},
    },
    error::domain::PlaybackError,
};

/// Error type for audio output operations.
#[derive(Error, Debug)]
pub enum OutputError {
    /// Failed to build the output stream.
    #[error("Audio output error: {0}")]
    BuildStreamError(#[from] BuildStreamError),
    /// Failed to start the output stream.
    #[error("Failed to start audio stream: {0}")]
    StreamStartError(#[from] PlayStreamError),
    /// The device did not report a default configuration.
    #[error("Failed to query device configuration: {0}")]
    DefaultConfigError(#[from] DefaultStreamConfigError),
    /// No suitable audio device found.
    #[error("No suitable audio device found")]
    NoDeviceFound,
    /// Unsupported sample format.
    #[error("Unsupported sample format: {format:?}")]
    UnsupportedSampleFormat { format: SampleFormat },
    /// The stream thread ended before reporting its status.
    #[error("Audio stream thread exited unexpectedly")]
    StreamThreadExited,
}

/// Audio output configuration.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Preferred output device name; the host default when `None`.
    pub device_name: Option<String>,
    /// Callback timeout in milliseconds.
    pub buffer_duration_ms: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            device_name: None,
            buffer_duration_ms: 50,
        }
    }
}

/// Clip state shared with the device callback.
pub(crate) struct ClipShared {
    samples: Vec<i16>,
    channels: usize,
    sample_rate: u32,
    frame_length: u64,
    position: AtomicU64,
    running: AtomicBool,
    /// Linear gain factor as `f32` bits.
    gain: AtomicU32,
}

impl ClipShared {
    pub(crate) fn new(clip: DecodedClip) -> Self {
        let frame_length = clip.frame_length();
        Self {
            channels: usize::from(clip.format.channels.max(1)),
            sample_rate: clip.format.sample_rate,
            frame_length,
            samples: clip.samples,
            position: AtomicU64::new(0),
            running: AtomicBool::new(false),
            gain: AtomicU32::new(1.0_f32.to_bits()),
        }
    }

    /// Fills one device buffer.
    ///
    /// `step` is the number of source frames per output frame and `carry`
    /// the fractional source frame left over from the previous call.
    pub(crate) fn fill<T>(&self, data: &mut [T], out_channels: usize, step: f64, carry: &mut f64)
    where
        T: Sample + FromSample<f32>,
    {
        if !self.running.load(Acquire) || out_channels == 0 {
            data.fill(T::EQUILIBRIUM);
            return;
        }

        let start = self.position.load(Acquire);
        let gain = f32::from_bits(self.gain.load(Relaxed));
        let mut offset = *carry;

        for frame in data.chunks_mut(out_channels) {
            let source_frame = start + offset.to_u64().unwrap_or(0);
            if source_frame >= self.frame_length {
                frame.fill(T::EQUILIBRIUM);
                continue;
            }

            let base = usize::try_from(source_frame).unwrap_or(usize::MAX) * self.channels;
            for (channel, sample) in frame.iter_mut().enumerate() {
                let source = self.samples[base + channel.min(self.channels - 1)];
                let value: f32 = source.to_sample();
                *sample = T::from_sample((value * gain).clamp(-1.0, 1.0));
            }
            offset += step;
        }

        let advanced = offset.trunc();
        *carry = offset - advanced;
        let end = start
            .saturating_add(advanced.to_u64().unwrap_or(0))
            .min(self.frame_length);

        // A reposition from the control side wins over this advance.
        if self
            .position
            .compare_exchange(start, end, AcqRel, Acquire)
            .is_err()
        {
            *carry = 0.0;
            return;
        }

        if end >= self.frame_length {
            self.running.store(false, Release);
        }
    }
}

/// Opens the configured output device.
struct AudioOutput {
    device: Device,
    config: OutputConfig,
}

impl AudioOutput {
    fn new(config: &OutputConfig) -> Result<Self, OutputError> {
        let host = default_host();
        let device = match &config.device_name {
            Some(name) => Self::find_device(&host, name).or_else(|| {
                warn!("Output device {name:?} not found, using the default device");
                host.default_output_device()
            }),
            None => host.default_output_device(),
        }
        .ok_or(OutputError::NoDeviceFound)?;

        Ok(Self {
            device,
            config: config.clone(),
        })
    }

    fn find_device(host: &Host, name: &str) -> Option<Device> {
        host.output_devices().ok()?.find(|device| {
            device
                .description()
                .is_ok_and(|description| description.to_string() == name)
        })
    }

    /// Prefers a device configuration matching the clip's rate and channel
    /// count, falling back to the device default.
    fn stream_config(
        &self,
        shared: &ClipShared,
        sample_format: SampleFormat,
        default: StreamConfig,
    ) -> StreamConfig {
        let Ok(ranges) = self.device.supported_output_configs() else {
            return default;
        };

        for range in ranges {
            if range.sample_format() == sample_format
                && usize::from(range.channels()) == shared.channels
                && range.min_sample_rate() <= shared.sample_rate
                && shared.sample_rate <= range.max_sample_rate()
            {
                return range.with_sample_rate(shared.sample_rate).config();
            }
        }

        debug!(
            "No exact device match for {} Hz / {} ch, converting on the fly",
            shared.sample_rate, shared.channels
        );
        default
    }

    fn build_clip_stream(&self, shared: Arc<ClipShared>) -> Result<Stream, OutputError> {
        let supported = self.device.default_output_config()?;
        let sample_format = supported.sample_format();
        let config = self.stream_config(&shared, sample_format, supported.config());

        match sample_format {
            F32 => self.build_stream::<f32>(&config, shared),
            F64 => self.build_stream::<f64>(&config, shared),
            I16 => self.build_stream::<i16>(&config, shared),
            I32 => self.build_stream::<i32>(&config, shared),
            U16 => self.build_stream::<u16>(&config, shared),
            format => Err(OutputError::UnsupportedSampleFormat { format }),
        }
    }

    fn build_stream<T>(
        &self,
        config: &StreamConfig,
        shared: Arc<ClipShared>,
    ) -> Result<Stream, OutputError>
    where
        T: SizedSample + FromSample<f32>,
    {
        let out_channels = usize::from(config.channels);
        let step = f64::from(shared.sample_rate) / f64::from(config.sample_rate);
        let mut carry = 0.0_f64;
        let timeout = Duration::from_millis(u64::from(self.config.buffer_duration_ms));

        let stream = self.device.build_output_stream(
            config,
            move |data: &mut [T], _: &OutputCallbackInfo| {
                shared.fill(data, out_channels, step, &mut carry);
            },
            |err| error!("Audio stream error: {err}"),
            Some(timeout),
        )?;

        Ok(stream)
    }
}

/// A decoded song attached to an output device.
pub struct DeviceClip {
    shared: Arc<ClipShared>,
    /// Dropping this sender releases the stream thread.
    shutdown_tx: Option<Sender<()>>,
    stream_thread: Option<JoinHandle<()>>,
}

impl DeviceClip {
    /// Attaches a decoded clip to the configured output device.
    ///
    /// # Errors
    ///
    /// Returns `OutputError` if no device is available or the stream cannot
    /// be built or started.
    pub fn new(clip: DecodedClip, config: &OutputConfig) -> Result<Self, OutputError> {
        let shared = Arc::new(ClipShared::new(clip));
        let (ready_tx, ready_rx) = bounded::<Result<(), OutputError>>(1);
        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);

        let stream_shared = Arc::clone(&shared);
        let config = config.clone();
        let stream_thread = spawn(move || {
            let stream = match AudioOutput::new(&config)
                .and_then(|output| output.build_clip_stream(stream_shared))
            {
                Ok(stream) => stream,
                Err(e) => {
                    let _ = ready_tx.send_blocking(Err(e));
                    return;
                }
            };
            if let Err(e) = stream.play() {
                let _ = ready_tx.send_blocking(Err(e.into()));
                return;
            }
            let _ = ready_tx.send_blocking(Ok(()));

            // Parked until the clip is closed.
            let _ = shutdown_rx.recv_blocking();
            drop(stream);
            debug!("Audio stream closed");
        });

        match ready_rx.recv_blocking() {
            Ok(Ok(())) => Ok(Self {
                shared,
                shutdown_tx: Some(shutdown_tx),
                stream_thread: Some(stream_thread),
            }),
            Ok(Err(e)) => {
                let _ = stream_thread.join();
                Err(e)
            }
            Err(_) => {
                let _ = stream_thread.join();
                Err(OutputError::StreamThreadExited)
            }
        }
    }
}

impl AudioClip for DeviceClip {
    fn start(&mut self) {
        self.shared.running.store(true, Release);
    }

    fn stop(&mut self) {
        self.shared.running.store(false, Release);
    }

    fn is_running(&self) -> bool {
        self.shared.running.load(Acquire)
    }

    fn frame_length(&self) -> u64 {
        self.shared.frame_length
    }

    fn frame_position(&self) -> u64 {
        self.shared.position.load(Acquire)
    }

    fn set_frame_position(&mut self, frame: u64) {
        self.shared
            .position
            .store(frame.min(self.shared.frame_length), Release);
    }

    fn sample_rate(&self) -> u32 {
        self.shared.sample_rate
    }

    fn gain_range(&self) -> GainRange {
        GainRange::MASTER
    }

    fn set_gain(&mut self, decibels: f32) {
        let linear = db_to_linear(GainRange::MASTER.clamp(decibels));
        self.shared.gain.store(linear.to_bits(), Relaxed);
    }
}

impl Drop for DeviceClip {
    fn drop(&mut self) {
        self.shared.running.store(false, Release);
        drop(self.shutdown_tx.take());
        if let Some(handle) = self.stream_thread.take()
            && handle.join().is_err()
        {
            error!("Audio stream thread panicked");
        }
    }
}

/// Opens songs by decoding them with symphonia and playing them through cpal.
#[derive(Debug, Clone, Default)]
pub struct DeviceClipOpener {
    config: OutputConfig,
}

impl DeviceClipOpener {
    /// Creates an opener using the given output configuration.
    #[must_use]
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }
}

impl ClipOpener for DeviceClipOpener {
    type Clip = DeviceClip;

    fn open(&self, path: &Path) -> Result<DeviceClip, PlaybackError> {
        let decoded = decode_file(path)?;
        debug!(
            "Decoded {:?}: {} frames at {} Hz, {} ch",
            path,
            decoded.frame_length(),
            decoded.format.sample_rate,
            decoded.format.channels
        );
        Ok(DeviceClip::new(decoded, &self.config)?)
    }
}
