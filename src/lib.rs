//! Decoder for multiplexed bioelectric acquisition frames
//!
//! The acquisition controller emits one fixed-width frame of 16-bit words per
//! sample time. Each frame interleaves amplifier results from every enabled
//! data stream with auxiliary command results, board I/O and, on the
//! stimulation controller, stimulation state. This crate turns a buffer of
//! such frames into per-channel waveforms.
//!
//! # Architecture
//!
//! - **FrameLayout**: word offsets and frame stride for a hardware variant and
//!   stream count
//! - **FrameDecoder**: borrows a frame buffer and extracts one channel per call,
//!   tracking the phase of the quarter-rate auxiliary inputs
//! - **ChannelRequest / Waveform**: named-channel entry point returning owned data
//! - **FrameWriter**: builds synthetic buffers at the same offsets
//!
//! # Example
//!
//! ```
//! use ephys_frames::{FrameDecoder, HardwareVariant};
//!
//! let data = vec![0u16; 52 * 128];
//! let decoder = FrameDecoder::new(&data, HardwareVariant::RecordUsb3, 1, 128)?;
//! let mut uv = vec![0f32; 128];
//! decoder.read_amplifier(&mut uv, 0, 7)?;
//! # Ok::<(), ephys_frames::FrameError>(())
//! ```

use thiserror::Error;

pub mod config;
pub mod decoder;
pub mod layout;
pub mod synth;
pub mod waveform;

pub use config::DecoderConfig;
pub use decoder::{FrameDecoder, PhaseEstimate, PhaseOutcome, PhaseSearch};
pub use layout::{FrameLayout, HardwareVariant, StimFlag};
pub use waveform::{ChannelRequest, Waveform};

#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Invalid stream count {requested} (expected 1-{max})")]
    InvalidStreamCount { requested: usize, max: usize },

    #[error("Stream {stream} out of range ({num_streams} enabled)")]
    StreamOutOfRange { stream: usize, num_streams: usize },

    #[error("{kind} channel {channel} out of range (limit {limit})")]
    ChannelOutOfRange {
        kind: &'static str,
        channel: usize,
        limit: usize,
    },

    #[error("Buffer holds {actual} words, need {needed}")]
    BufferTooShort { needed: usize, actual: usize },

    #[error("{num_samples} frames of {words_per_frame} words overflow the address space")]
    BufferSizeOverflow {
        words_per_frame: usize,
        num_samples: usize,
    },

    #[error("Frame {frame} out of range ({num_samples} frames)")]
    FrameOutOfRange { frame: usize, num_samples: usize },

    #[error("Output holds {actual} samples, expected {expected}")]
    OutputLength { expected: usize, actual: usize },

    #[error("Sample count {num_samples} is not a multiple of {multiple}")]
    SampleAlignment { num_samples: usize, multiple: usize },

    #[error("{kind} data not available on {variant}")]
    Unsupported {
        kind: &'static str,
        variant: HardwareVariant,
    },

    #[error("Unknown hardware variant: {0}")]
    UnknownVariant(String),
}

pub type Result<T> = std::result::Result<T, FrameError>;
