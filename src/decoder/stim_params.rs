//! Combined stimulation parameter word

use super::FrameDecoder;
use super::fixed::{bit, compliance_word};
use super::types::stim_bits;
use crate::Result;
use crate::layout::StimFlag;

/// Assemble one parameter word from the per-stream source words
///
/// The chip reports polarity as 1 for positive current; the parameter word
/// sets [`stim_bits::NEGATIVE_POLARITY`] for negative current, so that bit is
/// inverted.
fn stim_param_word(
    compliance: u16,
    [on, polarity, settle, recovery]: [u16; 4],
    channel: usize,
) -> u16 {
    let flag = |word: u16, mask: u16| if bit(word, channel) == 1 { mask } else { 0 };
    flag(compliance, stim_bits::COMPLIANCE)
        | flag(on, stim_bits::STIM_ON)
        | (stim_bits::NEGATIVE_POLARITY & !flag(polarity, stim_bits::NEGATIVE_POLARITY))
        | flag(settle, stim_bits::AMP_SETTLE)
        | flag(recovery, stim_bits::CHARGE_RECOVERY)
}

impl FrameDecoder<'_> {
    /// Compliance, stimulation and recovery state of one channel per sample
    ///
    /// Bit 15 compliance limit, bit 14 charge recovery, bit 13 amplifier
    /// settle, bit 8 negative polarity, bit 0 stimulation on. See
    /// [`stim_bits`].
    pub fn read_stim_params(&self, out: &mut [u16], stream: usize, channel: usize) -> Result<()> {
        let [on, pol, settle, recov] =
            StimFlag::ALL.map(|flag| self.stim_flag_slot(flag, stream, out.len()));
        let slots = [on?, pol?, settle?, recov?];
        self.check_channel("stimulation", channel, self.variant().channels_per_stream())?;
        let compliance = self.layout.compliance(stream);

        for (frame, dst) in out.iter_mut().enumerate() {
            let (lo, hi) = (
                compliance.at(self.data, frame),
                compliance.shifted(1).at(self.data, frame),
            );
            let words = slots.map(|slot| slot.at(self.data, frame));
            *dst = stim_param_word(compliance_word(lo, hi), words, channel);
        }
        Ok(())
    }
}
