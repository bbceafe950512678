//! End-to-end decoding through the public API

use ephys_frames::decoder::{AUX_SENTINEL, stim_bits};
use ephys_frames::synth::FrameWriter;
use ephys_frames::{
    ChannelRequest, DecoderConfig, FrameDecoder, HardwareVariant, PhaseEstimate, PhaseOutcome,
    StimFlag, Waveform,
};

const AUX_SLOT: usize = 1;

fn write_aux_cycle(writer: &mut FrameWriter, stream: usize, codes: [u16; 3]) {
    // AuxIn1 at frame 1: the power-on phase
    for frame in 0..writer.num_samples() {
        let value = match frame % 4 {
            0 => AUX_SENTINEL,
            pos => codes[pos - 1],
        };
        writer.set_aux_slot(frame, stream, AUX_SLOT, value).unwrap();
    }
}

#[test]
fn test_timestamps_single_stream_record_v3() {
    let mut writer = FrameWriter::new(HardwareVariant::RecordUsb3, 1, 8).unwrap();
    writer.write_timestamps(1);
    let words = writer.into_words();

    let decoder = FrameDecoder::new(&words, HardwareVariant::RecordUsb3, 1, 8).unwrap();
    let mut out = [0u32; 8];
    decoder.read_timestamps(&mut out).unwrap();
    assert_eq!(out, [1, 2, 3, 4, 5, 6, 7, 8]);
}

#[test]
fn test_phase_follows_dropped_frame_across_buffers() {
    let variant = HardwareVariant::RecordUsb2;
    let mut first = FrameWriter::new(variant, 2, 32).unwrap();
    write_aux_cycle(&mut first, 1, [100, 200, 300]);
    let mut second = first.clone();
    second.drop_frame(0).unwrap();

    let mut decoder = FrameDecoder::new(first.words(), variant, 2, 32).unwrap();
    let mut out = vec![0f32; 32];
    let search = decoder.read_aux_input(&mut out, 1, 0).unwrap();
    assert_eq!(search.outcome, PhaseOutcome::Confirmed);
    let aux1 = out[0];

    decoder.rebind(second.words(), 32).unwrap();
    let search = decoder.read_aux_input(&mut out, 1, 0).unwrap();
    assert_eq!(
        search.outcome,
        PhaseOutcome::Relocked { from: PhaseEstimate::new(1) }
    );
    assert_eq!(decoder.aux_phase(), PhaseEstimate::new(0));
    assert!(out.iter().all(|&v| v == aux1));
}

#[test]
fn test_stream_count_change_between_acquisitions() {
    let variant = HardwareVariant::RecordUsb3;
    let mut two = FrameWriter::new(variant, 2, 4).unwrap();
    two.set_amplifier(0, 1, 31, 32768 + 10).unwrap();
    let mut five = FrameWriter::new(variant, 5, 4).unwrap();
    five.set_amplifier(0, 4, 31, 32768 + 20).unwrap();

    let config = DecoderConfig::new(variant)
        .with_num_data_streams(2)
        .with_num_samples(4);
    let mut decoder = FrameDecoder::from_config(two.words(), &config).unwrap();
    let mut out = [0f32; 4];
    decoder.read_amplifier(&mut out, 1, 31).unwrap();
    assert!((out[0] - 1.95).abs() < 1e-4);

    // A larger buffer must be bound before the wider layout fits
    assert!(decoder.set_num_data_streams(5).is_err());
    decoder.rebind(five.words(), 4).unwrap();
    decoder.set_num_data_streams(5).unwrap();
    decoder.read_amplifier(&mut out, 4, 31).unwrap();
    assert!((out[0] - 3.9).abs() < 1e-4);
}

#[test]
fn test_stim_controller_named_channels() {
    let variant = HardwareVariant::StimRecordUsb2;
    let mut writer = FrameWriter::new(variant, 2, 4).unwrap();
    writer.write_headers();
    for frame in 0..4 {
        writer.set_stim_flag(frame, StimFlag::On, 1, 1 << 2).unwrap();
        let polarity = if frame < 2 { 1 << 2 } else { 0 };
        writer.set_stim_flag(frame, StimFlag::Polarity, 1, polarity).unwrap();
        let high = if frame == 3 { 0xFFFF } else { 0 };
        writer.set_compliance(frame, 1, 1 << 2, high).unwrap();
        writer.set_board_dac(frame, 0, 32768 + 3200 * frame as u16).unwrap();
    }
    let words = writer.into_words();

    let mut decoder = FrameDecoder::new(&words, variant, 2, 4).unwrap();
    assert_eq!(decoder.count_valid_headers(), 4);

    let params = decoder
        .decode(ChannelRequest::StimParams { stream: 1, channel: 2 })
        .unwrap();
    let on = stim_bits::STIM_ON;
    let c = stim_bits::COMPLIANCE;
    let neg = stim_bits::NEGATIVE_POLARITY;
    assert_eq!(
        params,
        Waveform::Words(vec![on | c, on | c, on | c | neg, on | neg])
    );

    let dac = decoder.decode(ChannelRequest::BoardDac { channel: 0 }).unwrap();
    let volts = dac.as_f32().unwrap();
    for (i, v) in volts.iter().enumerate() {
        assert!((v - i as f32).abs() < 1e-5);
    }

    assert!(
        decoder
            .decode(ChannelRequest::SupplyVoltage { stream: 0 })
            .is_err()
    );
}
