//! Word offsets of every channel block within one frame
//!
//! A frame is the block of 16-bit words the controller emits per sample time:
//!
//! ```text
//! | magic (4) | timestamp (2) | aux slots | amplifiers | [aux 4] [stim flags] | [DAC (8)] | ADC (8) | TTL in | TTL out |
//! ```
//!
//! Multiplexed results are interleaved by stream: word `k * N + s` of a block
//! belongs to stream `s`. On the stimulation controller every multiplexed
//! result is a 32-bit MISO word, so those blocks are twice as wide.

use super::variant::HardwareVariant;
use super::view::SlotView;
use crate::{FrameError, Result};
use tracing::debug;

/// Words holding the 64-bit magic number
pub const HEADER_WORDS: usize = 4;
/// Words holding the 32-bit timestamp
pub const TIMESTAMP_WORDS: usize = 2;
/// Board analog input channels
pub const BOARD_ADC_CHANNELS: usize = 8;
/// Board analog output channels (stimulation controller only)
pub const BOARD_DAC_CHANNELS: usize = 8;
/// Digital input and output lines
pub const DIGITAL_LINES: usize = 16;
/// Stimulation flag words per stream
pub const STIM_FLAG_KINDS: usize = 4;

/// Per-stream stimulation flag word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StimFlag {
    /// Stimulation active
    On,
    /// Current polarity as reported by the chip (1 = positive)
    Polarity,
    /// Amplifier settle active
    AmpSettle,
    /// Charge recovery active
    ChargeRecovery,
}

impl StimFlag {
    pub const ALL: [StimFlag; STIM_FLAG_KINDS] = [
        StimFlag::On,
        StimFlag::Polarity,
        StimFlag::AmpSettle,
        StimFlag::ChargeRecovery,
    ];

    const fn block_index(self) -> usize {
        match self {
            StimFlag::On => 0,
            StimFlag::Polarity => 1,
            StimFlag::AmpSettle => 2,
            StimFlag::ChargeRecovery => 3,
        }
    }
}

/// Resolved frame geometry for one `(variant, stream count)` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    variant: HardwareVariant,
    num_data_streams: usize,
    words_per_frame: usize,

    timestamp: usize,
    aux: usize,
    amplifier: usize,
    stim_flags: Option<usize>,
    board_dac: Option<usize>,
    board_adc: usize,
    digital_in: usize,
    digital_out: usize,
}

impl FrameLayout {
    /// Compute the layout for `num_data_streams` enabled streams
    pub fn resolve(variant: HardwareVariant, num_data_streams: usize) -> Result<Self> {
        let max = variant.max_data_streams();
        if num_data_streams == 0 || num_data_streams > max {
            return Err(FrameError::InvalidStreamCount {
                requested: num_data_streams,
                max,
            });
        }

        let n = num_data_streams;
        let miso = variant.miso_word_size();
        let words_per_frame = Self::frame_words(variant, n);

        let timestamp = HEADER_WORDS;
        let aux = timestamp + TIMESTAMP_WORDS;
        // The first three aux results precede the amplifiers on every variant
        let amplifier = aux + miso * 3 * n;
        // Trailing board block: [DAC] ADC TTL-in TTL-out
        let trailer = if variant.is_stim() {
            BOARD_DAC_CHANNELS + BOARD_ADC_CHANNELS + 2
        } else {
            BOARD_ADC_CHANNELS + 2
        };
        let board_dac = variant.is_stim().then(|| words_per_frame - trailer);
        let stim_flags = variant
            .is_stim()
            .then(|| words_per_frame - trailer - STIM_FLAG_KINDS * n);

        let layout = Self {
            variant,
            num_data_streams: n,
            words_per_frame,
            timestamp,
            aux,
            amplifier,
            stim_flags,
            board_dac,
            board_adc: words_per_frame - BOARD_ADC_CHANNELS - 2,
            digital_in: words_per_frame - 2,
            digital_out: words_per_frame - 1,
        };

        debug!(
            "Resolved {} layout: {} streams, {} words/frame",
            variant, n, words_per_frame
        );
        Ok(layout)
    }

    fn frame_words(variant: HardwareVariant, n: usize) -> usize {
        let ch = variant.channels_per_stream();
        let aux = variant.aux_command_slots();
        match variant {
            // One filler word per stream
            HardwareVariant::RecordUsb2 => {
                HEADER_WORDS + TIMESTAMP_WORDS + n * (ch + aux + 1) + BOARD_ADC_CHANNELS + 2
            }
            // 0-3 filler words keep the frame a multiple of four words
            HardwareVariant::RecordUsb3 => {
                HEADER_WORDS + TIMESTAMP_WORDS + n * (ch + aux) + n % 4 + BOARD_ADC_CHANNELS + 2
            }
            HardwareVariant::StimRecordUsb2 => {
                HEADER_WORDS
                    + TIMESTAMP_WORDS
                    + n * (2 * (ch + aux) + STIM_FLAG_KINDS)
                    + BOARD_DAC_CHANNELS
                    + BOARD_ADC_CHANNELS
                    + 2
            }
        }
    }

    pub fn variant(&self) -> HardwareVariant {
        self.variant
    }

    pub fn num_data_streams(&self) -> usize {
        self.num_data_streams
    }

    /// Frame size in 16-bit words; also the stride between samples
    pub fn words_per_frame(&self) -> usize {
        self.words_per_frame
    }

    /// Words needed to hold `num_samples` frames
    pub fn buffer_words(&self, num_samples: usize) -> Result<usize> {
        self.words_per_frame
            .checked_mul(num_samples)
            .ok_or(FrameError::BufferSizeOverflow {
                words_per_frame: self.words_per_frame,
                num_samples,
            })
    }

    fn slot(&self, offset: usize) -> SlotView {
        SlotView::new(offset, self.words_per_frame)
    }

    /// Magic number words
    pub fn header(&self) -> SlotView {
        self.slot(0)
    }

    /// Low timestamp word; the high word follows it
    pub fn timestamp(&self) -> SlotView {
        self.slot(self.timestamp)
    }

    /// Result of aux command slot `slot` for `stream`
    ///
    /// On the stimulation controller this is the first word of the 32-bit pair.
    pub fn aux_slot(&self, stream: usize, slot: usize) -> SlotView {
        let miso = self.variant.miso_word_size();
        self.slot(self.aux + miso * (self.num_data_streams * slot + stream))
    }

    /// Amplifier result word carrying the sampled value
    pub fn amplifier(&self, stream: usize, channel: usize) -> SlotView {
        let miso = self.variant.miso_word_size();
        let base = self.amplifier + miso * (self.num_data_streams * channel + stream);
        // Skip the top 16 bits of the 32-bit MISO word
        self.slot(base + miso - 1)
    }

    /// DC amplifier word: the other half of the 32-bit amplifier result
    pub fn dc_amplifier(&self, stream: usize, channel: usize) -> SlotView {
        let miso = self.variant.miso_word_size();
        self.slot(self.amplifier + miso * (self.num_data_streams * channel + stream))
    }

    /// Compliance limit word pair: register value, then the all-0/all-1 word
    pub fn compliance(&self, stream: usize) -> SlotView {
        self.aux_slot(stream, 1)
    }

    /// Stimulation flag word, or `None` on record-only variants
    pub fn stim_flag(&self, flag: StimFlag, stream: usize) -> Option<SlotView> {
        self.stim_flags
            .map(|base| self.slot(base + flag.block_index() * self.num_data_streams + stream))
    }

    /// Board DAC word, or `None` on record-only variants
    pub fn board_dac(&self, channel: usize) -> Option<SlotView> {
        self.board_dac.map(|base| self.slot(base + channel))
    }

    pub fn board_adc(&self, channel: usize) -> SlotView {
        self.slot(self.board_adc + channel)
    }

    pub fn digital_in(&self) -> SlotView {
        self.slot(self.digital_in)
    }

    pub fn digital_out(&self) -> SlotView {
        self.slot(self.digital_out)
    }
}
