//! Frame decoder
//!
//! [`FrameDecoder`] borrows a buffer of concatenated frames and extracts one
//! channel waveform per call. Offsets come from the resolved [`FrameLayout`],
//! which is replaced only through [`FrameDecoder::set_num_data_streams`].
//!
//! Every operation checks its selectors and output length up front and
//! returns [`FrameError`] instead of reading outside the buffer.

mod aux_phase;
mod fixed;
mod stim_params;
pub mod types;

pub use aux_phase::AUX_INPUT_CHANNELS;
pub use types::{
    AUX_PERIOD, AUX_SENTINEL, PhaseEstimate, PhaseOutcome, PhaseSearch, SUPPLY_VOLTAGE_FRAME,
    stim_bits,
};

use crate::config::DecoderConfig;
use crate::layout::{FrameLayout, HEADER_WORDS, HardwareVariant, ScaleTable};
use crate::{FrameError, Result};
use tracing::debug;

/// Decoder over a borrowed frame buffer
pub struct FrameDecoder<'a> {
    data: &'a [u16],
    num_samples: usize,
    layout: FrameLayout,
    scale: ScaleTable,
    aux_phase: PhaseEstimate,
}

impl<'a> FrameDecoder<'a> {
    /// Bind a decoder to `num_samples` frames at the start of `data`
    pub fn new(
        data: &'a [u16],
        variant: HardwareVariant,
        num_data_streams: usize,
        num_samples: usize,
    ) -> Result<Self> {
        let layout = FrameLayout::resolve(variant, num_data_streams)?;
        check_buffer(data, &layout, num_samples)?;

        Ok(Self {
            data,
            num_samples,
            layout,
            scale: variant.scale(),
            aux_phase: PhaseEstimate::INITIAL,
        })
    }

    /// Bind a decoder using a validated configuration
    pub fn from_config(data: &'a [u16], config: &DecoderConfig) -> Result<Self> {
        config.validate()?;
        Self::new(
            data,
            config.variant,
            config.num_data_streams,
            config.num_samples,
        )
    }

    /// Change the number of enabled streams
    ///
    /// Resolves a new layout and rechecks the buffer against it. On error the
    /// decoder keeps its previous layout. The phase estimate is left alone.
    pub fn set_num_data_streams(&mut self, num_data_streams: usize) -> Result<()> {
        let layout = FrameLayout::resolve(self.layout.variant(), num_data_streams)?;
        check_buffer(self.data, &layout, self.num_samples)?;
        debug!(
            "Stream count {} -> {}",
            self.layout.num_data_streams(),
            num_data_streams
        );
        self.layout = layout;
        Ok(())
    }

    /// Point the decoder at the next buffer, keeping layout and phase
    pub fn rebind(&mut self, data: &'a [u16], num_samples: usize) -> Result<()> {
        check_buffer(data, &self.layout, num_samples)?;
        self.data = data;
        self.num_samples = num_samples;
        Ok(())
    }

    pub fn variant(&self) -> HardwareVariant {
        self.layout.variant()
    }

    pub fn layout(&self) -> &FrameLayout {
        &self.layout
    }

    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    pub fn num_data_streams(&self) -> usize {
        self.layout.num_data_streams()
    }

    /// Current aux phase estimate
    pub fn aux_phase(&self) -> PhaseEstimate {
        self.aux_phase
    }

    /// Override the aux phase estimate, e.g. to carry it over from a decoder
    /// that read the previous buffer
    pub fn set_aux_phase(&mut self, phase: PhaseEstimate) {
        self.aux_phase = phase;
    }

    /// Number of frames whose first four words hold the variant's magic number
    pub fn count_valid_headers(&self) -> usize {
        let magic = self.variant().header_magic();
        let header = self.layout.header();
        (0..self.num_samples)
            .filter(|&frame| {
                let start = header.index(frame);
                let words = &self.data[start..start + HEADER_WORDS];
                let value = words
                    .iter()
                    .rev()
                    .fold(0u64, |acc, &w| (acc << 16) | u64::from(w));
                value == magic
            })
            .count()
    }

    // Precondition checks

    fn check_output(&self, len: usize) -> Result<()> {
        if len != self.num_samples {
            return Err(FrameError::OutputLength {
                expected: self.num_samples,
                actual: len,
            });
        }
        Ok(())
    }

    fn check_stream(&self, stream: usize) -> Result<()> {
        let num_streams = self.layout.num_data_streams();
        if stream >= num_streams {
            return Err(FrameError::StreamOutOfRange {
                stream,
                num_streams,
            });
        }
        Ok(())
    }

    fn check_channel(&self, kind: &'static str, channel: usize, limit: usize) -> Result<()> {
        if channel >= limit {
            return Err(FrameError::ChannelOutOfRange {
                kind,
                channel,
                limit,
            });
        }
        Ok(())
    }

    fn check_alignment(&self, multiple: usize) -> Result<()> {
        if self.num_samples % multiple != 0 {
            return Err(FrameError::SampleAlignment {
                num_samples: self.num_samples,
                multiple,
            });
        }
        Ok(())
    }

    fn unsupported(&self, kind: &'static str) -> FrameError {
        FrameError::Unsupported {
            kind,
            variant: self.variant(),
        }
    }
}

fn check_buffer(data: &[u16], layout: &FrameLayout, num_samples: usize) -> Result<()> {
    let needed = layout.buffer_words(num_samples)?;
    if data.len() < needed {
        return Err(FrameError::BufferTooShort {
            needed,
            actual: data.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::FrameWriter;

    #[test]
    fn test_decoder_creation() {
        let writer = FrameWriter::new(HardwareVariant::RecordUsb3, 2, 8).unwrap();
        let decoder = FrameDecoder::new(writer.words(), HardwareVariant::RecordUsb3, 2, 8).unwrap();
        assert_eq!(decoder.num_samples(), 8);
        assert_eq!(decoder.num_data_streams(), 2);
        assert_eq!(decoder.aux_phase(), PhaseEstimate::INITIAL);
        assert_eq!(decoder.layout().words_per_frame(), 88);
    }

    #[test]
    fn test_buffer_too_short() {
        let data = vec![0u16; 52 * 8 - 1];
        let result = FrameDecoder::new(&data, HardwareVariant::RecordUsb3, 1, 8);
        assert!(matches!(
            result,
            Err(FrameError::BufferTooShort { needed: 416, actual: 415 })
        ));
    }

    #[test]
    fn test_sample_count_overflow_is_an_error() {
        let data = [0u16; 16];
        let result = FrameDecoder::new(&data, HardwareVariant::RecordUsb3, 1, usize::MAX / 4);
        assert!(matches!(
            result,
            Err(FrameError::BufferSizeOverflow { words_per_frame: 52, .. })
        ));

        let mut decoder = FrameDecoder::new(&data, HardwareVariant::RecordUsb3, 1, 0).unwrap();
        assert!(decoder.rebind(&data, usize::MAX).is_err());
    }

    #[test]
    fn test_set_num_data_streams_recomputes_layout() {
        let data = vec![0u16; 200 * 4];
        let mut decoder =
            FrameDecoder::new(&data, HardwareVariant::StimRecordUsb2, 1, 4).unwrap();
        assert_eq!(decoder.layout().words_per_frame(), 68);
        decoder.set_aux_phase(PhaseEstimate::new(3));

        decoder.set_num_data_streams(4).unwrap();
        assert_eq!(decoder.layout().words_per_frame(), 200);
        assert_eq!(decoder.aux_phase(), PhaseEstimate::new(3));

        // Same count again yields the identical layout
        let before = *decoder.layout();
        decoder.set_num_data_streams(4).unwrap();
        assert_eq!(*decoder.layout(), before);
    }

    #[test]
    fn test_set_num_data_streams_rejects_short_buffer() {
        let data = vec![0u16; 68 * 4];
        let mut decoder =
            FrameDecoder::new(&data, HardwareVariant::StimRecordUsb2, 1, 4).unwrap();
        assert!(matches!(
            decoder.set_num_data_streams(2),
            Err(FrameError::BufferTooShort { .. })
        ));
        // Previous layout is kept
        assert_eq!(decoder.num_data_streams(), 1);
        assert!(decoder.set_num_data_streams(0).is_err());
    }

    #[test]
    fn test_rebind() {
        let first = vec![0u16; 52 * 4];
        let second = vec![0u16; 52 * 8];
        let mut decoder = FrameDecoder::new(&first, HardwareVariant::RecordUsb2, 1, 4).unwrap();
        decoder.set_aux_phase(PhaseEstimate::new(2));
        decoder.rebind(&second, 8).unwrap();
        assert_eq!(decoder.num_samples(), 8);
        assert_eq!(decoder.aux_phase(), PhaseEstimate::new(2));
        assert!(decoder.rebind(&first, 8).is_err());
    }

    #[test]
    fn test_count_valid_headers() {
        let mut writer = FrameWriter::new(HardwareVariant::StimRecordUsb2, 1, 8).unwrap();
        writer.write_headers();
        writer.set_word(3, 0, 0xFFFF).unwrap();
        let decoder =
            FrameDecoder::new(writer.words(), HardwareVariant::StimRecordUsb2, 1, 8).unwrap();
        assert_eq!(decoder.count_valid_headers(), 7);
    }

    #[test]
    fn test_from_config() {
        let data = vec![0u16; 52 * 128];
        let config = DecoderConfig::new(HardwareVariant::RecordUsb3)
            .with_num_data_streams(1)
            .with_num_samples(128);
        let decoder = FrameDecoder::from_config(&data, &config).unwrap();
        assert_eq!(decoder.num_samples(), 128);
    }
}
