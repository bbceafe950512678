//! Named channel requests and owned waveforms
//!
//! Display and storage code asks for channels by name and gets back a typed
//! waveform of `num_samples` values, without touching the per-type readers.

use crate::Result;
use crate::decoder::FrameDecoder;
use crate::layout::StimFlag;
use std::fmt;

/// One channel to extract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelRequest {
    Timestamp,
    Amplifier { stream: usize, channel: usize },
    DcAmplifier { stream: usize, channel: usize },
    AuxInput { stream: usize, aux_channel: usize },
    SupplyVoltage { stream: usize },
    BoardAdc { channel: usize },
    BoardDac { channel: usize },
    DigitalIn,
    DigitalInLine { line: usize },
    DigitalOut,
    DigitalOutLine { line: usize },
    Compliance { stream: usize, channel: usize },
    StimFlag { flag: StimFlag, stream: usize, channel: usize },
    StimParams { stream: usize, channel: usize },
}

/// Stream letter: A..Z, then AA, AB, ...
fn stream_label(stream: usize) -> String {
    let letter = |i: usize| char::from(b'A' + (i % 26) as u8);
    if stream < 26 {
        letter(stream).to_string()
    } else {
        format!("{}{}", letter(stream / 26 - 1), letter(stream))
    }
}

impl fmt::Display for ChannelRequest {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ChannelRequest::Timestamp => write!(f, "TIMESTAMP"),
            ChannelRequest::Amplifier { stream, channel } => {
                write!(f, "{}-{:03}", stream_label(stream), channel)
            }
            ChannelRequest::DcAmplifier { stream, channel } => {
                write!(f, "{}-{:03}-DC", stream_label(stream), channel)
            }
            ChannelRequest::AuxInput { stream, aux_channel } => {
                write!(f, "{}-AUX{}", stream_label(stream), aux_channel + 1)
            }
            ChannelRequest::SupplyVoltage { stream } => write!(f, "{}-VDD", stream_label(stream)),
            ChannelRequest::BoardAdc { channel } => write!(f, "ANALOG-IN-{}", channel + 1),
            ChannelRequest::BoardDac { channel } => write!(f, "ANALOG-OUT-{}", channel + 1),
            ChannelRequest::DigitalIn => write!(f, "DIGITAL-IN-WORD"),
            ChannelRequest::DigitalInLine { line } => write!(f, "DIGITAL-IN-{:02}", line + 1),
            ChannelRequest::DigitalOut => write!(f, "DIGITAL-OUT-WORD"),
            ChannelRequest::DigitalOutLine { line } => write!(f, "DIGITAL-OUT-{:02}", line + 1),
            ChannelRequest::Compliance { stream, channel } => {
                write!(f, "{}-{:03}-COMPLIANCE", stream_label(stream), channel)
            }
            ChannelRequest::StimFlag {
                flag,
                stream,
                channel,
            } => {
                let suffix = match flag {
                    StimFlag::On => "STIM-ON",
                    StimFlag::Polarity => "STIM-POL",
                    StimFlag::AmpSettle => "AMP-SETTLE",
                    StimFlag::ChargeRecovery => "CHARGE-RECOV",
                };
                write!(f, "{}-{:03}-{}", stream_label(stream), channel, suffix)
            }
            ChannelRequest::StimParams { stream, channel } => {
                write!(f, "{}-{:03}-STIM", stream_label(stream), channel)
            }
        }
    }
}

/// Decoded channel data
#[derive(Debug, Clone, PartialEq)]
pub enum Waveform {
    Microvolts(Vec<f32>),
    Volts(Vec<f32>),
    /// Logic level, 0.0 or 1.0
    Logic(Vec<f32>),
    Words(Vec<u16>),
    Timestamps(Vec<u32>),
}

impl Waveform {
    pub fn len(&self) -> usize {
        match self {
            Waveform::Microvolts(v) | Waveform::Volts(v) | Waveform::Logic(v) => v.len(),
            Waveform::Words(v) => v.len(),
            Waveform::Timestamps(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Floating-point samples, if this is an analog or logic waveform
    pub fn as_f32(&self) -> Option<&[f32]> {
        match self {
            Waveform::Microvolts(v) | Waveform::Volts(v) | Waveform::Logic(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_words(&self) -> Option<&[u16]> {
        match self {
            Waveform::Words(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_timestamps(&self) -> Option<&[u32]> {
        match self {
            Waveform::Timestamps(v) => Some(v),
            _ => None,
        }
    }
}

impl FrameDecoder<'_> {
    /// Extract one named channel into a new waveform
    pub fn decode(&mut self, request: ChannelRequest) -> Result<Waveform> {
        let n = self.num_samples();
        let floats = || vec![0f32; n];
        let words = || vec![0u16; n];

        let waveform = match request {
            ChannelRequest::Timestamp => {
                let mut out = vec![0u32; n];
                self.read_timestamps(&mut out)?;
                Waveform::Timestamps(out)
            }
            ChannelRequest::Amplifier { stream, channel } => {
                let mut out = floats();
                self.read_amplifier(&mut out, stream, channel)?;
                Waveform::Microvolts(out)
            }
            ChannelRequest::DcAmplifier { stream, channel } => {
                let mut out = floats();
                self.read_dc_amplifier(&mut out, stream, channel)?;
                Waveform::Volts(out)
            }
            ChannelRequest::AuxInput {
                stream,
                aux_channel,
            } => {
                let mut out = floats();
                self.read_aux_input(&mut out, stream, aux_channel)?;
                Waveform::Volts(out)
            }
            ChannelRequest::SupplyVoltage { stream } => {
                let mut out = floats();
                self.read_supply_voltage(&mut out, stream)?;
                Waveform::Volts(out)
            }
            ChannelRequest::BoardAdc { channel } => {
                let mut out = floats();
                self.read_board_adc(&mut out, channel)?;
                Waveform::Volts(out)
            }
            ChannelRequest::BoardDac { channel } => {
                let mut out = floats();
                self.read_board_dac(&mut out, channel)?;
                Waveform::Volts(out)
            }
            ChannelRequest::DigitalIn => {
                let mut out = words();
                self.read_digital_in_words(&mut out)?;
                Waveform::Words(out)
            }
            ChannelRequest::DigitalInLine { line } => {
                let mut out = floats();
                self.read_digital_in_line(&mut out, line)?;
                Waveform::Logic(out)
            }
            ChannelRequest::DigitalOut => {
                let mut out = words();
                self.read_digital_out_words(&mut out)?;
                Waveform::Words(out)
            }
            ChannelRequest::DigitalOutLine { line } => {
                let mut out = floats();
                self.read_digital_out_line(&mut out, line)?;
                Waveform::Logic(out)
            }
            ChannelRequest::Compliance { stream, channel } => {
                let mut out = words();
                self.read_compliance(&mut out, stream, channel)?;
                Waveform::Words(out)
            }
            ChannelRequest::StimFlag {
                flag,
                stream,
                channel,
            } => {
                let mut out = words();
                self.read_stim_flag(&mut out, flag, stream, channel)?;
                Waveform::Words(out)
            }
            ChannelRequest::StimParams { stream, channel } => {
                let mut out = words();
                self.read_stim_params(&mut out, stream, channel)?;
                Waveform::Words(out)
            }
        };
        Ok(waveform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::HardwareVariant;
    use crate::synth::FrameWriter;

    #[test]
    fn test_channel_names() {
        assert_eq!(
            ChannelRequest::Amplifier { stream: 0, channel: 5 }.to_string(),
            "A-005"
        );
        assert_eq!(
            ChannelRequest::AuxInput { stream: 2, aux_channel: 1 }.to_string(),
            "C-AUX2"
        );
        assert_eq!(ChannelRequest::SupplyVoltage { stream: 27 }.to_string(), "AB-VDD");
        assert_eq!(ChannelRequest::BoardAdc { channel: 2 }.to_string(), "ANALOG-IN-3");
        assert_eq!(
            ChannelRequest::DigitalInLine { line: 6 }.to_string(),
            "DIGITAL-IN-07"
        );
        assert_eq!(
            ChannelRequest::StimFlag {
                flag: StimFlag::ChargeRecovery,
                stream: 1,
                channel: 15
            }
            .to_string(),
            "B-015-CHARGE-RECOV"
        );
    }

    #[test]
    fn test_decode_routes_by_request() {
        let variant = HardwareVariant::StimRecordUsb2;
        let mut writer = FrameWriter::new(variant, 1, 4).unwrap();
        writer.write_timestamps(100);
        writer.set_amplifier(2, 0, 3, 32768 + 100).unwrap();
        writer.set_digital_out(1, 0x0002).unwrap();
        let words = writer.into_words();

        let mut decoder = FrameDecoder::new(&words, variant, 1, 4).unwrap();
        let ts = decoder.decode(ChannelRequest::Timestamp).unwrap();
        assert_eq!(ts.as_timestamps(), Some(&[100u32, 101, 102, 103][..]));

        let amp = decoder
            .decode(ChannelRequest::Amplifier { stream: 0, channel: 3 })
            .unwrap();
        assert!(matches!(amp, Waveform::Microvolts(_)));
        assert!((amp.as_f32().unwrap()[2] - 19.5).abs() < 1e-4);

        let line = decoder
            .decode(ChannelRequest::DigitalOutLine { line: 1 })
            .unwrap();
        assert_eq!(line, Waveform::Logic(vec![0.0, 1.0, 0.0, 0.0]));
        assert_eq!(line.len(), 4);

        assert!(
            decoder
                .decode(ChannelRequest::AuxInput { stream: 0, aux_channel: 0 })
                .is_err()
        );
    }
}
