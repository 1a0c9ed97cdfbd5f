//! Audio file decoding using the `symphonia` crate.
//!
//! Songs are decoded up front into interleaved 16-bit signed PCM in native
//! byte order, keeping the source's sample rate and channel count. The
//! decoded clip is then handed to the output side as a whole.

use std::{
    fs::File,
    io::{Error as StdError, ErrorKind::UnexpectedEof},
    path::Path,
};

use {
    serde::{Deserialize, Serialize},
    symphonia::{
        core::{
            audio::{AudioBufferRef, SampleBuffer, SignalSpec},
            codecs::{CODEC_TYPE_NULL, Decoder, DecoderOptions},
            errors::Error as SymphoniaError,
            formats::{FormatOptions, FormatReader},
            io::{MediaSourceStream, MediaSourceStreamOptions},
            meta::MetadataOptions,
            probe::Hint,
        },
        default::{get_codecs, get_probe},
    },
    thiserror::Error,
    tracing::{debug, warn},
};

/// Bit depth of every decoded clip.
pub const CLIP_BITS_PER_SAMPLE: u32 = 16;

/// Error type for audio decoding operations.
#[derive(Error, Debug)]
pub enum DecoderError {
    /// Failed to open or read the audio file.
    #[error("IO error: {0}")]
    IoError(#[from] StdError),
    /// Symphonia decoding error.
    #[error("Decoding error: {0}")]
    SymphoniaError(#[from] SymphoniaError),
    /// No audio track found in file.
    #[error("No audio track found")]
    NoAudioTrack,
    /// The audio track decoded to zero frames.
    #[error("Audio stream contains no frames")]
    EmptyStream,
}

/// PCM layout of a decoded clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipFormat {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Number of interleaved channels.
    pub channels: u16,
    /// Bits per sample, always [`CLIP_BITS_PER_SAMPLE`].
    pub bits_per_sample: u32,
}

impl ClipFormat {
    fn from_spec(spec: &SignalSpec) -> Self {
        Self {
            sample_rate: spec.rate,
            channels: u16::try_from(spec.channels.count()).unwrap_or(u16::MAX),
            bits_per_sample: CLIP_BITS_PER_SAMPLE,
        }
    }
}

/// A fully decoded song.
#[derive(Debug, Clone)]
pub struct DecodedClip {
    /// Layout of `samples`.
    pub format: ClipFormat,
    /// Interleaved signed 16-bit samples.
    pub samples: Vec<i16>,
}

impl DecodedClip {
    /// Number of frames (one sample per channel) in the clip.
    #[must_use]
    pub fn frame_length(&self) -> u64 {
        let channels = usize::from(self.format.channels.max(1));
        (self.samples.len() / channels) as u64
    }
}

/// Decoder for a single audio file.
pub struct ClipDecoder {
    /// The underlying format reader.
    format_reader: Box<dyn FormatReader>,
    /// The codec decoder for the selected track.
    decoder: Box<dyn Decoder>,
    /// Id of the selected audio track.
    track_id: u32,
}

impl ClipDecoder {
    /// Opens and probes an audio file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the audio file to decode.
    ///
    /// # Errors
    ///
    /// Returns `DecoderError` if:
    /// - The file cannot be opened or read
    /// - The container or codec is not recognised
    /// - No audio track is found in the file
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, DecoderError> {
        let path = path.as_ref();

        let file = File::open(path)?;
        let mss = MediaSourceStream::new(Box::new(file), MediaSourceStreamOptions::default());

        let mut hint = Hint::new();
        if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
            hint.with_extension(extension);
        }

        let probed = get_probe().format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )?;
        let format_reader = probed.format;

        let track = format_reader
            .tracks()
            .iter()
            .find(|track| track.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or(DecoderError::NoAudioTrack)?;
        let track_id = track.id;

        let decoder = get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

        debug!("Opened {:?} (track {track_id})", path);

        Ok(Self {
            format_reader,
            decoder,
            track_id,
        })
    }

    /// Decodes the next packet of the selected track.
    ///
    /// Corrupt packets are skipped. Returns `None` at the end of the stream.
    ///
    /// # Errors
    ///
    /// Returns `DecoderError` if reading or decoding fails unrecoverably.
    pub fn decode_next_packet(&mut self) -> Result<Option<AudioBufferRef<'_>>, DecoderError> {
        loop {
            let packet = match self.format_reader.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == UnexpectedEof => return Ok(None),
                Err(SymphoniaError::ResetRequired) => return Ok(None),
                Err(e) => return Err(e.into()),
            };

            if packet.track_id() != self.track_id {
                continue;
            }

            match self.decoder.decode(&packet) {
                Ok(_) => break,
                Err(SymphoniaError::DecodeError(reason)) => {
                    debug!("Skipping corrupt packet: {reason}");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(Some(self.decoder.last_decoded()))
    }

    /// Decodes the whole stream into 16-bit PCM.
    ///
    /// The format is taken from the first decoded packet; packets whose
    /// layout differs from it are dropped.
    ///
    /// # Errors
    ///
    /// Returns `DecoderError::EmptyStream` when no frames could be decoded,
    /// or any error from [`Self::decode_next_packet`].
    pub fn decode_all(mut self) -> Result<DecodedClip, DecoderError> {
        let mut samples: Vec<i16> = Vec::new();
        let mut spec: Option<SignalSpec> = None;
        let mut sample_buffer: Option<SampleBuffer<i16>> = None;

        while let Some(decoded) = self.decode_next_packet()? {
            if decoded.frames() == 0 {
                continue;
            }

            let packet_spec = *decoded.spec();
            match spec {
                None => spec = Some(packet_spec),
                Some(expected) if expected != packet_spec => {
                    warn!("Dropping packet with changed signal layout: {packet_spec:?}");
                    continue;
                }
                Some(_) => {}
            }

            let needed = decoded.capacity() * packet_spec.channels.count();
            if sample_buffer
                .as_ref()
                .is_none_or(|buffer| buffer.capacity() < needed)
            {
                sample_buffer = Some(SampleBuffer::new(decoded.capacity() as u64, packet_spec));
            }

            if let Some(buffer) = sample_buffer.as_mut() {
                buffer.copy_interleaved_ref(decoded);
                samples.extend_from_slice(buffer.samples());
            }
        }

        let spec = spec.ok_or(DecoderError::EmptyStream)?;
        if samples.is_empty() {
            return Err(DecoderError::EmptyStream);
        }

        Ok(DecodedClip {
            format: ClipFormat::from_spec(&spec),
            samples,
        })
    }
}

/// Opens and fully decodes the file at `path`.
///
/// # Errors
///
/// Returns `DecoderError` if the file cannot be opened or decoded.
pub fn decode_file<P: AsRef<Path>>(path: P) -> Result<DecodedClip, DecoderError> {
    ClipDecoder::new(path)?.decode_all()
}
