//! Auxiliary input phase tracking
//!
//! Aux command slot 1 of every stream cycles through four commands: sample
//! AuxIn1, AuxIn2, AuxIn3, then read ROM register 40, which always returns
//! [`AUX_SENTINEL`]. Frames dropped upstream shift the cycle relative to the
//! frame index, so each read first locates the sentinel to re-derive the
//! phase, then samples every fourth frame.

use super::FrameDecoder;
use super::types::{
    AUX_PERIOD, AUX_SENTINEL, PhaseEstimate, PhaseOutcome, PhaseSearch, SUPPLY_VOLTAGE_FRAME,
};
use crate::Result;
use tracing::{debug, trace, warn};

/// Aux command slot that carries the AuxIn round-robin and the supply read
const AUX_INPUT_SLOT: usize = 1;

/// Auxiliary input channels per stream
pub const AUX_INPUT_CHANNELS: usize = 3;

/// Judge one group of four aux reads against `estimate`
///
/// Returns the confirmed or corrected estimate, or `None` when the group does
/// not settle the phase (no sentinel, or more than one).
fn judge_tuple(
    values: [u16; AUX_PERIOD],
    estimate: PhaseEstimate,
) -> Option<PhaseEstimate> {
    if values[estimate.sentinel_position()] == AUX_SENTINEL {
        return Some(estimate);
    }
    let mut hits = values
        .iter()
        .enumerate()
        .filter(|&(_, &v)| v == AUX_SENTINEL)
        .map(|(i, _)| i);
    match (hits.next(), hits.next()) {
        (Some(position), None) => Some(PhaseEstimate::from_sentinel_position(position)),
        _ => None,
    }
}

impl FrameDecoder<'_> {
    /// Locate the sentinel in the aux slot of `stream`, starting from `estimate`
    ///
    /// Scans groups of four frames from the start of the buffer until one group
    /// confirms or corrects the estimate. Gives up after `num_samples` frames
    /// and returns the input estimate unchanged.
    pub fn search_aux_phase(&self, stream: usize, estimate: PhaseEstimate) -> Result<PhaseSearch> {
        if self.scale.aux_input.is_none() {
            return Err(self.unsupported("aux input"));
        }
        self.check_stream(stream)?;

        let slot = self.layout.aux_slot(stream, AUX_INPUT_SLOT);
        let groups = self.num_samples / AUX_PERIOD;
        for group in 0..groups {
            let first = group * AUX_PERIOD;
            let values: [u16; AUX_PERIOD] = std::array::from_fn(|i| slot.at(self.data, first + i));
            trace!("Aux group at frame {}: {:04X?}", first, values);

            if let Some(found) = judge_tuple(values, estimate) {
                let outcome = if found == estimate {
                    PhaseOutcome::Confirmed
                } else {
                    debug!("Aux {} -> {} at frame {}", estimate, found, first);
                    PhaseOutcome::Relocked { from: estimate }
                };
                return Ok(PhaseSearch {
                    estimate: found,
                    outcome,
                    frames_scanned: first + AUX_PERIOD,
                });
            }
        }

        warn!(
            "ROM sentinel 0x{:04X} not found in {} frames of stream {}; keeping {}",
            AUX_SENTINEL, self.num_samples, stream, estimate
        );
        Ok(PhaseSearch {
            estimate,
            outcome: PhaseOutcome::NotFound,
            frames_scanned: groups * AUX_PERIOD,
        })
    }

    /// AuxIn waveform in volts (record-only controllers)
    ///
    /// The aux inputs are sampled at a quarter of the frame rate; each decoded
    /// value is held for four output samples. Requires `num_samples` to be a
    /// multiple of four. Updates the decoder's phase estimate.
    pub fn read_aux_input(
        &mut self,
        out: &mut [f32],
        stream: usize,
        aux_channel: usize,
    ) -> Result<PhaseSearch> {
        let scale = self.scale.aux_input.ok_or_else(|| self.unsupported("aux input"))?;
        self.check_output(out.len())?;
        self.check_stream(stream)?;
        self.check_channel("aux input", aux_channel, AUX_INPUT_CHANNELS)?;
        self.check_alignment(AUX_PERIOD)?;

        let search = self.search_aux_phase(stream, self.aux_phase)?;
        self.aux_phase = search.estimate;

        let slot = self.layout.aux_slot(stream, AUX_INPUT_SLOT);
        let offset = search.estimate.frame_offset(aux_channel);
        for (group, chunk) in out.chunks_exact_mut(AUX_PERIOD).enumerate() {
            let frame = offset + group * AUX_PERIOD;
            chunk.fill(scale.apply(slot.at(self.data, frame)));
        }
        Ok(search)
    }

    /// Chip supply voltage in volts (record-only controllers)
    ///
    /// Read once per data block at a fixed frame and held for the whole block.
    /// Requires `num_samples` to be a whole number of data blocks.
    pub fn read_supply_voltage(&self, out: &mut [f32], stream: usize) -> Result<()> {
        let scale = self
            .scale
            .supply_voltage
            .ok_or_else(|| self.unsupported("supply voltage"))?;
        self.check_output(out.len())?;
        self.check_stream(stream)?;
        let block = self.variant().samples_per_block();
        self.check_alignment(block)?;

        let slot = self.layout.aux_slot(stream, AUX_INPUT_SLOT);
        for (i, chunk) in out.chunks_exact_mut(block).enumerate() {
            let frame = i * block + SUPPLY_VOLTAGE_FRAME;
            chunk.fill(scale.apply(slot.at(self.data, frame)));
        }
        Ok(())
    }
}
