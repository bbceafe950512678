//! Decoder value types

use std::fmt;

/// Round-robin period of the auxiliary command slot
pub const AUX_PERIOD: usize = 4;

/// Read-back of ROM register 40, issued once per aux round-robin cycle
pub const AUX_SENTINEL: u16 = 0x0049;

/// Frame within each data block that carries the supply-voltage read
pub const SUPPLY_VOLTAGE_FRAME: usize = 124;

/// Bits of the combined stimulation parameter word
pub mod stim_bits {
    pub const COMPLIANCE: u16 = 1 << 15;
    pub const CHARGE_RECOVERY: u16 = 1 << 14;
    pub const AMP_SETTLE: u16 = 1 << 13;
    /// Set for negative current
    pub const NEGATIVE_POLARITY: u16 = 1 << 8;
    pub const STIM_ON: u16 = 1 << 0;
}

/// Believed position of the aux round-robin relative to frame index mod 4
///
/// Phase `p` means the sentinel read-back is expected at position
/// `(p + 3) % 4` of every aligned group of four frames, and aux channel `c`
/// at position `(c + p) % 4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhaseEstimate(u8);

impl PhaseEstimate {
    /// Phase assumed before any search
    pub const INITIAL: PhaseEstimate = PhaseEstimate(1);

    /// Phase `value mod 4`
    pub const fn new(value: usize) -> Self {
        PhaseEstimate((value % AUX_PERIOD) as u8)
    }

    pub const fn value(self) -> usize {
        self.0 as usize
    }

    /// Tuple position where this estimate expects the sentinel
    pub const fn sentinel_position(self) -> usize {
        (self.value() + AUX_PERIOD - 1) % AUX_PERIOD
    }

    /// Estimate implied by finding the sentinel at tuple position `position`
    pub const fn from_sentinel_position(position: usize) -> Self {
        PhaseEstimate::new(position + 1)
    }

    /// First frame holding aux channel `aux_channel`
    pub const fn frame_offset(self, aux_channel: usize) -> usize {
        (aux_channel + self.value()) % AUX_PERIOD
    }
}

impl Default for PhaseEstimate {
    fn default() -> Self {
        PhaseEstimate::INITIAL
    }
}

impl fmt::Display for PhaseEstimate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "phase {}", self.0)
    }
}

/// How a phase search ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseOutcome {
    /// The sentinel sat where the input estimate predicted
    Confirmed,
    /// The sentinel was found at exactly one other position
    Relocked { from: PhaseEstimate },
    /// No unambiguous sentinel within the scan limit; input estimate kept
    NotFound,
}

/// Result of one phase search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseSearch {
    /// Estimate to use for extraction
    pub estimate: PhaseEstimate,
    pub outcome: PhaseOutcome,
    /// Frames examined before the search ended
    pub frames_scanned: usize,
}
