//! Controller hardware variants and their per-variant constant tables

use crate::FrameError;
use std::fmt;
use std::str::FromStr;

/// Controller generation and channel composition
///
/// The variant fixes how many channels each stream carries, how wide one
/// multiplexed transfer is, which optional channel blocks exist in a frame and
/// how raw codes convert to physical units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HardwareVariant {
    /// Record-only controller, protocol v2
    RecordUsb2,
    /// Record-only controller, protocol v3
    RecordUsb3,
    /// Stimulation/record controller, protocol v2 (32-bit MISO words)
    StimRecordUsb2,
}

impl HardwareVariant {
    /// All variants, in protocol order
    pub const ALL: [HardwareVariant; 3] = [
        HardwareVariant::RecordUsb2,
        HardwareVariant::RecordUsb3,
        HardwareVariant::StimRecordUsb2,
    ];

    /// Amplifier channels carried by one data stream
    pub const fn channels_per_stream(self) -> usize {
        match self {
            HardwareVariant::StimRecordUsb2 => 16,
            _ => 32,
        }
    }

    /// Auxiliary command slots per stream in each frame
    pub const fn aux_command_slots(self) -> usize {
        match self {
            HardwareVariant::StimRecordUsb2 => 4,
            _ => 3,
        }
    }

    /// Number of 16-bit words one multiplexed transfer occupies
    pub const fn miso_word_size(self) -> usize {
        match self {
            HardwareVariant::StimRecordUsb2 => 2,
            _ => 1,
        }
    }

    /// Samples per USB data block
    pub const fn samples_per_block(self) -> usize {
        128
    }

    /// Largest number of simultaneously enabled data streams
    pub const fn max_data_streams(self) -> usize {
        match self {
            HardwareVariant::RecordUsb3 => 32,
            _ => 8,
        }
    }

    /// True for the stimulation-capable controller
    ///
    /// Only this variant carries DC amplifier, DAC, compliance and stimulation
    /// flag data.
    pub const fn is_stim(self) -> bool {
        matches!(self, HardwareVariant::StimRecordUsb2)
    }

    /// 64-bit magic number leading every frame
    pub const fn header_magic(self) -> u64 {
        match self {
            HardwareVariant::StimRecordUsb2 => 0x8D54_2C8A_4971_2F0B,
            _ => 0xD7A2_2AAA_3813_2A53,
        }
    }

    /// Constant table used to scale raw codes for this variant
    pub const fn scale(self) -> ScaleTable {
        match self {
            HardwareVariant::RecordUsb2 => ScaleTable {
                board_adc: Linear::unipolar(50.354e-6),
                ..ScaleTable::RECORD
            },
            HardwareVariant::RecordUsb3 => ScaleTable::RECORD,
            HardwareVariant::StimRecordUsb2 => ScaleTable::STIM,
        }
    }

    fn slug(self) -> &'static str {
        match self {
            HardwareVariant::RecordUsb2 => "record-usb2",
            HardwareVariant::RecordUsb3 => "record-usb3",
            HardwareVariant::StimRecordUsb2 => "stim-record-usb2",
        }
    }
}

impl fmt::Display for HardwareVariant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for HardwareVariant {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        HardwareVariant::ALL
            .into_iter()
            .find(|v| v.slug() == wanted)
            .ok_or_else(|| FrameError::UnknownVariant(s.to_string()))
    }
}

/// Linear conversion `scale * (code - zero)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Linear {
    /// Physical units per code
    pub scale: f32,
    /// Code that maps to zero
    pub zero: i32,
}

impl Linear {
    /// Conversion centred on `zero`
    pub const fn offset(scale: f32, zero: i32) -> Self {
        Self { scale, zero }
    }

    /// Conversion for codes that start at 0
    pub const fn unipolar(scale: f32) -> Self {
        Self { scale, zero: 0 }
    }

    /// Convert one raw code
    #[inline]
    pub fn apply(&self, code: u16) -> f32 {
        self.scale * (i32::from(code) - self.zero) as f32
    }
}

/// Scaling constants for one hardware variant
///
/// Channel types the variant does not carry are `None`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleTable {
    /// Amplifier, microvolts
    pub amplifier: Linear,
    /// DC amplifier, volts
    pub dc_amplifier: Option<Linear>,
    /// Auxiliary inputs, volts
    pub aux_input: Option<Linear>,
    /// Chip supply voltage, volts
    pub supply_voltage: Option<Linear>,
    /// Board analog inputs, volts
    pub board_adc: Linear,
    /// Board analog outputs, volts
    pub board_dac: Option<Linear>,
}

impl ScaleTable {
    const RECORD: ScaleTable = ScaleTable {
        amplifier: Linear::offset(0.195, 32768),
        dc_amplifier: None,
        aux_input: Some(Linear::unipolar(37.4e-6)),
        supply_voltage: Some(Linear::unipolar(74.8e-6)),
        board_adc: Linear::offset(312.5e-6, 32768),
        board_dac: None,
    };

    const STIM: ScaleTable = ScaleTable {
        amplifier: Linear::offset(0.195, 32768),
        dc_amplifier: Some(Linear::offset(-0.01923, 512)),
        aux_input: None,
        supply_voltage: None,
        board_adc: Linear::offset(312.5e-6, 32768),
        board_dac: Some(Linear::offset(312.5e-6, 32768)),
    };
}
