//! Synthetic frame buffers
//!
//! [`FrameWriter`] places raw codes at the same layout positions the decoder
//! reads, which makes it possible to build protocol-accurate buffers for
//! tests and demos without hardware.
//!
//! Setters check their selectors the way the decoder's readers do and return
//! [`FrameError`] instead of writing outside the layout.

use crate::layout::{
    BOARD_ADC_CHANNELS, BOARD_DAC_CHANNELS, FrameLayout, HEADER_WORDS, HardwareVariant, SlotView,
    StimFlag,
};
use crate::{FrameError, Result};

/// Aux command slots ahead of the amplifier block on every variant
const LEADING_AUX_SLOTS: usize = 3;

/// Owned, zero-initialised frame buffer with per-channel setters
#[derive(Debug, Clone)]
pub struct FrameWriter {
    layout: FrameLayout,
    num_samples: usize,
    data: Vec<u16>,
}

impl FrameWriter {
    pub fn new(variant: HardwareVariant, num_data_streams: usize, num_samples: usize) -> Result<Self> {
        let layout = FrameLayout::resolve(variant, num_data_streams)?;
        let words = layout.buffer_words(num_samples)?;
        Ok(Self {
            layout,
            num_samples,
            data: vec![0; words],
        })
    }

    pub fn layout(&self) -> &FrameLayout {
        &self.layout
    }

    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    pub fn words(&self) -> &[u16] {
        &self.data
    }

    pub fn into_words(self) -> Vec<u16> {
        self.data
    }

    fn check_frame(&self, frame: usize) -> Result<()> {
        if frame >= self.num_samples {
            return Err(FrameError::FrameOutOfRange {
                frame,
                num_samples: self.num_samples,
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

    fn unsupported(&self, kind: &'static str) -> FrameError {
        FrameError::Unsupported {
            kind,
            variant: self.layout.variant(),
        }
    }

    // Callers check `frame`; slots from the layout always fall inside a frame
    fn put(&mut self, slot: SlotView, frame: usize, value: u16) {
        let index = slot.index(frame);
        self.data[index] = value;
    }

    /// Raw word `word` of frame `frame`
    pub fn set_word(&mut self, frame: usize, word: usize, value: u16) -> Result<()> {
        self.check_frame(frame)?;
        let wpf = self.layout.words_per_frame();
        self.check_channel("frame word", word, wpf)?;
        self.put(SlotView::new(word, wpf), frame, value);
        Ok(())
    }

    /// Write the variant's magic number into every frame
    pub fn write_headers(&mut self) {
        let magic = self.layout.variant().header_magic();
        let header = self.layout.header();
        for frame in 0..self.num_samples {
            for i in 0..HEADER_WORDS {
                self.put(header.shifted(i), frame, (magic >> (16 * i)) as u16);
            }
        }
    }

    fn put_timestamp(&mut self, frame: usize, timestamp: u32) {
        let slot = self.layout.timestamp();
        self.put(slot, frame, timestamp as u16);
        self.put(slot.shifted(1), frame, (timestamp >> 16) as u16);
    }

    pub fn set_timestamp(&mut self, frame: usize, timestamp: u32) -> Result<()> {
        self.check_frame(frame)?;
        self.put_timestamp(frame, timestamp);
        Ok(())
    }

    /// Timestamps `first, first + 1, ...` across all frames
    pub fn write_timestamps(&mut self, first: u32) {
        for frame in 0..self.num_samples {
            self.put_timestamp(frame, first.wrapping_add(frame as u32));
        }
    }

    pub fn set_amplifier(
        &mut self,
        frame: usize,
        stream: usize,
        channel: usize,
        code: u16,
    ) -> Result<()> {
        self.check_frame(frame)?;
        self.check_stream(stream)?;
        let limit = self.layout.variant().channels_per_stream();
        self.check_channel("amplifier", channel, limit)?;
        let slot = self.layout.amplifier(stream, channel);
        self.put(slot, frame, code);
        Ok(())
    }

    pub fn set_dc_amplifier(
        &mut self,
        frame: usize,
        stream: usize,
        channel: usize,
        code: u16,
    ) -> Result<()> {
        if !self.layout.variant().is_stim() {
            return Err(self.unsupported("DC amplifier"));
        }
        self.check_frame(frame)?;
        self.check_stream(stream)?;
        let limit = self.layout.variant().channels_per_stream();
        self.check_channel("DC amplifier", channel, limit)?;
        let slot = self.layout.dc_amplifier(stream, channel);
        self.put(slot, frame, code);
        Ok(())
    }

    /// First word of aux command slot `slot` (0-2)
    pub fn set_aux_slot(
        &mut self,
        frame: usize,
        stream: usize,
        slot: usize,
        code: u16,
    ) -> Result<()> {
        self.check_frame(frame)?;
        self.check_stream(stream)?;
        self.check_channel("aux slot", slot, LEADING_AUX_SLOTS)?;
        let view = self.layout.aux_slot(stream, slot);
        self.put(view, frame, code);
        Ok(())
    }

    /// Compliance register pair: `low` register value, `high` command marker
    pub fn set_compliance(
        &mut self,
        frame: usize,
        stream: usize,
        low: u16,
        high: u16,
    ) -> Result<()> {
        if !self.layout.variant().is_stim() {
            return Err(self.unsupported("compliance limit"));
        }
        self.check_frame(frame)?;
        self.check_stream(stream)?;
        let slot = self.layout.compliance(stream);
        self.put(slot, frame, low);
        self.put(slot.shifted(1), frame, high);
        Ok(())
    }

    pub fn set_stim_flag(
        &mut self,
        frame: usize,
        flag: StimFlag,
        stream: usize,
        word: u16,
    ) -> Result<()> {
        let slot = self
            .layout
            .stim_flag(flag, stream)
            .ok_or_else(|| self.unsupported("stimulation flag"))?;
        self.check_frame(frame)?;
        self.check_stream(stream)?;
        self.put(slot, frame, word);
        Ok(())
    }

    pub fn set_board_adc(&mut self, frame: usize, channel: usize, code: u16) -> Result<()> {
        self.check_frame(frame)?;
        self.check_channel("board ADC", channel, BOARD_ADC_CHANNELS)?;
        let slot = self.layout.board_adc(channel);
        self.put(slot, frame, code);
        Ok(())
    }

    pub fn set_board_dac(&mut self, frame: usize, channel: usize, code: u16) -> Result<()> {
        let slot = self
            .layout
            .board_dac(channel)
            .ok_or_else(|| self.unsupported("board DAC"))?;
        self.check_frame(frame)?;
        self.check_channel("board DAC", channel, BOARD_DAC_CHANNELS)?;
        self.put(slot, frame, code);
        Ok(())
    }

    pub fn set_digital_in(&mut self, frame: usize, word: u16) -> Result<()> {
        self.check_frame(frame)?;
        let slot = self.layout.digital_in();
        self.put(slot, frame, word);
        Ok(())
    }

    pub fn set_digital_out(&mut self, frame: usize, word: u16) -> Result<()> {
        self.check_frame(frame)?;
        let slot = self.layout.digital_out();
        self.put(slot, frame, word);
        Ok(())
    }

    /// Remove frame `frame` and append an empty frame at the end
    ///
    /// Mimics a corrupted frame being discarded upstream: every later frame
    /// moves one position earlier.
    pub fn drop_frame(&mut self, frame: usize) -> Result<()> {
        self.check_frame(frame)?;
        let wpf = self.layout.words_per_frame();
        let len = self.data.len();
        self.data.drain(frame * wpf..(frame + 1) * wpf);
        self.data.resize(len, 0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_size() {
        let writer = FrameWriter::new(HardwareVariant::RecordUsb3, 4, 16).unwrap();
        assert_eq!(writer.words().len(), 156 * 16);
        assert!(writer.words().iter().all(|&w| w == 0));
    }

    #[test]
    fn test_headers_little_endian() {
        let mut writer = FrameWriter::new(HardwareVariant::RecordUsb3, 1, 2).unwrap();
        writer.write_headers();
        let w = writer.words();
        assert_eq!(&w[..4], &[0x2A53, 0x3813, 0x2AAA, 0xD7A2]);
        assert_eq!(&w[52..56], &[0x2A53, 0x3813, 0x2AAA, 0xD7A2]);
    }

    #[test]
    fn test_timestamp_words() {
        let mut writer = FrameWriter::new(HardwareVariant::RecordUsb2, 1, 2).unwrap();
        writer.write_timestamps(0xFFFF);
        let w = writer.words();
        assert_eq!(&w[4..6], &[0xFFFF, 0x0000]);
        assert_eq!(&w[52 + 4..52 + 6], &[0x0000, 0x0001]);
    }

    #[test]
    fn test_drop_frame_shifts_later_frames() {
        let mut writer = FrameWriter::new(HardwareVariant::RecordUsb3, 1, 4).unwrap();
        writer.write_timestamps(10);
        writer.drop_frame(1).unwrap();
        let wpf = writer.layout().words_per_frame();
        let w = writer.words();
        assert_eq!(w.len(), wpf * 4);
        assert_eq!(w[wpf + 4], 12);
        assert_eq!(w[3 * wpf + 4], 0);
    }

    #[test]
    fn test_dac_on_record_variant_is_unsupported() {
        let mut writer = FrameWriter::new(HardwareVariant::RecordUsb3, 1, 1).unwrap();
        assert!(matches!(
            writer.set_board_dac(0, 0, 1),
            Err(FrameError::Unsupported { kind: "board DAC", .. })
        ));
        assert!(writer.set_compliance(0, 0, 1, 0).is_err());
        assert!(writer.set_dc_amplifier(0, 0, 0, 1).is_err());
        assert!(writer.words().iter().all(|&w| w == 0));
    }

    #[test]
    fn test_setters_reject_out_of_range_selectors() {
        let mut writer = FrameWriter::new(HardwareVariant::StimRecordUsb2, 2, 4).unwrap();
        assert!(matches!(
            writer.set_amplifier(4, 0, 0, 1),
            Err(FrameError::FrameOutOfRange { frame: 4, num_samples: 4 })
        ));
        assert!(matches!(
            writer.set_amplifier(0, 2, 0, 1),
            Err(FrameError::StreamOutOfRange { stream: 2, num_streams: 2 })
        ));
        assert!(matches!(
            writer.set_amplifier(0, 0, 16, 1),
            Err(FrameError::ChannelOutOfRange { channel: 16, limit: 16, .. })
        ));
        assert!(writer.set_aux_slot(0, 0, 3, 1).is_err());
        assert!(writer.set_stim_flag(0, StimFlag::On, 2, 1).is_err());
        assert!(writer.set_board_dac(0, 8, 1).is_err());
        assert!(writer.set_board_adc(0, 8, 1).is_err());
        assert!(writer.set_word(0, 200, 1).is_err());
        assert!(writer.drop_frame(4).is_err());
        assert!(writer.words().iter().all(|&w| w == 0));
    }

    #[test]
    fn test_sample_count_overflow_is_an_error() {
        let result = FrameWriter::new(HardwareVariant::RecordUsb3, 1, usize::MAX / 4);
        assert!(matches!(result, Err(FrameError::BufferSizeOverflow { .. })));
    }
}
