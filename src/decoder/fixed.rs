//! Fixed-offset channel extraction
//!
//! Each reader walks one slot of every frame with a stride of
//! `words_per_frame` and writes one value per sample.

use super::FrameDecoder;
use crate::Result;
use crate::layout::{
    BOARD_ADC_CHANNELS, BOARD_DAC_CHANNELS, DIGITAL_LINES, Linear, SlotView, StimFlag,
};

/// Bit `channel` of `word` as 0/1
#[inline]
pub(super) fn bit(word: u16, channel: usize) -> u16 {
    (word >> channel) & 1
}

/// Register value from a compliance slot pair
///
/// The high word is all 0s after a READ command and all 1s after a WRITE.
/// Only a READ carries the compliance register; anything else counts as no
/// violation.
#[inline]
pub(super) fn compliance_word(low: u16, high: u16) -> u16 {
    if high == 0 { low } else { 0 }
}

impl FrameDecoder<'_> {
    fn fill<T>(&self, out: &mut [T], slot: SlotView, f: impl Fn(u16) -> T) {
        for (dst, word) in out.iter_mut().zip(slot.words(self.data, self.num_samples)) {
            *dst = f(word);
        }
    }

    fn fill_scaled(&self, out: &mut [f32], slot: SlotView, scale: Linear) {
        self.fill(out, slot, |code| scale.apply(code));
    }

    /// 32-bit sample counter of every frame
    pub fn read_timestamps(&self, out: &mut [u32]) -> Result<()> {
        self.check_output(out.len())?;
        let slot = self.layout.timestamp();
        for (dst, (lo, hi)) in out.iter_mut().zip(slot.pairs(self.data, self.num_samples)) {
            *dst = (u32::from(hi) << 16) | u32::from(lo);
        }
        Ok(())
    }

    /// Amplifier waveform in microvolts
    pub fn read_amplifier(&self, out: &mut [f32], stream: usize, channel: usize) -> Result<()> {
        self.check_output(out.len())?;
        self.check_stream(stream)?;
        self.check_channel("amplifier", channel, self.variant().channels_per_stream())?;
        self.fill_scaled(out, self.layout.amplifier(stream, channel), self.scale.amplifier);
        Ok(())
    }

    /// DC amplifier waveform in volts (stimulation controller only)
    pub fn read_dc_amplifier(&self, out: &mut [f32], stream: usize, channel: usize) -> Result<()> {
        let scale = self
            .scale
            .dc_amplifier
            .ok_or_else(|| self.unsupported("DC amplifier"))?;
        self.check_output(out.len())?;
        self.check_stream(stream)?;
        self.check_channel("DC amplifier", channel, self.variant().channels_per_stream())?;
        self.fill_scaled(out, self.layout.dc_amplifier(stream, channel), scale);
        Ok(())
    }

    /// Board analog input in volts
    pub fn read_board_adc(&self, out: &mut [f32], channel: usize) -> Result<()> {
        self.check_output(out.len())?;
        self.check_channel("board ADC", channel, BOARD_ADC_CHANNELS)?;
        self.fill_scaled(out, self.layout.board_adc(channel), self.scale.board_adc);
        Ok(())
    }

    /// Board analog output in volts (stimulation controller only)
    pub fn read_board_dac(&self, out: &mut [f32], channel: usize) -> Result<()> {
        let (scale, slot) = match (self.scale.board_dac, self.layout.board_dac(channel)) {
            (Some(scale), Some(slot)) => (scale, slot),
            _ => return Err(self.unsupported("board DAC")),
        };
        self.check_output(out.len())?;
        self.check_channel("board DAC", channel, BOARD_DAC_CHANNELS)?;
        self.fill_scaled(out, slot, scale);
        Ok(())
    }

    /// All 16 digital input lines as one word per sample
    pub fn read_digital_in_words(&self, out: &mut [u16]) -> Result<()> {
        self.check_output(out.len())?;
        self.fill(out, self.layout.digital_in(), |w| w);
        Ok(())
    }

    /// One digital input line as 0.0 / 1.0
    pub fn read_digital_in_line(&self, out: &mut [f32], line: usize) -> Result<()> {
        self.check_output(out.len())?;
        self.check_channel("digital input", line, DIGITAL_LINES)?;
        self.fill(out, self.layout.digital_in(), |w| f32::from(bit(w, line)));
        Ok(())
    }

    /// All 16 digital output lines as one word per sample
    pub fn read_digital_out_words(&self, out: &mut [u16]) -> Result<()> {
        self.check_output(out.len())?;
        self.fill(out, self.layout.digital_out(), |w| w);
        Ok(())
    }

    /// One digital output line as 0.0 / 1.0
    pub fn read_digital_out_line(&self, out: &mut [f32], line: usize) -> Result<()> {
        self.check_output(out.len())?;
        self.check_channel("digital output", line, DIGITAL_LINES)?;
        self.fill(out, self.layout.digital_out(), |w| f32::from(bit(w, line)));
        Ok(())
    }

    fn compliance_slot(&self, stream: usize, out_len: usize) -> Result<SlotView> {
        if !self.variant().is_stim() {
            return Err(self.unsupported("compliance limit"));
        }
        self.check_output(out_len)?;
        self.check_stream(stream)?;
        Ok(self.layout.compliance(stream))
    }

    /// Compliance limit register for all channels of `stream`
    ///
    /// Samples whose slot held a WRITE result read as 0.
    pub fn read_compliance_words(&self, out: &mut [u16], stream: usize) -> Result<()> {
        let slot = self.compliance_slot(stream, out.len())?;
        for (dst, (lo, hi)) in out.iter_mut().zip(slot.pairs(self.data, self.num_samples)) {
            *dst = compliance_word(lo, hi);
        }
        Ok(())
    }

    /// Compliance limit flag (0/1) for one channel
    pub fn read_compliance(&self, out: &mut [u16], stream: usize, channel: usize) -> Result<()> {
        let slot = self.compliance_slot(stream, out.len())?;
        self.check_channel("compliance", channel, self.variant().channels_per_stream())?;
        for (dst, (lo, hi)) in out.iter_mut().zip(slot.pairs(self.data, self.num_samples)) {
            *dst = bit(compliance_word(lo, hi), channel);
        }
        Ok(())
    }

    pub(super) fn stim_flag_slot(
        &self,
        flag: StimFlag,
        stream: usize,
        out_len: usize,
    ) -> Result<SlotView> {
        let slot = self
            .layout
            .stim_flag(flag, stream)
            .ok_or_else(|| self.unsupported("stimulation flags"))?;
        self.check_output(out_len)?;
        self.check_stream(stream)?;
        Ok(slot)
    }

    /// Raw stimulation flag word for all channels of `stream`
    pub fn read_stim_flag_words(
        &self,
        out: &mut [u16],
        flag: StimFlag,
        stream: usize,
    ) -> Result<()> {
        let slot = self.stim_flag_slot(flag, stream, out.len())?;
        self.fill(out, slot, |w| w);
        Ok(())
    }

    /// Stimulation flag (0/1) for one channel, as reported by the chip
    pub fn read_stim_flag(
        &self,
        out: &mut [u16],
        flag: StimFlag,
        stream: usize,
        channel: usize,
    ) -> Result<()> {
        let slot = self.stim_flag_slot(flag, stream, out.len())?;
        self.check_channel("stimulation", channel, self.variant().channels_per_stream())?;
        self.fill(out, slot, |w| bit(w, channel));
        Ok(())
    }
}
