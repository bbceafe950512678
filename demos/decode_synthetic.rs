//! Example: decode a synthetic acquisition buffer
//!
//! Builds a buffer of frames with a sine on one amplifier channel and the aux
//! round-robin on its stream, optionally discards frames to shift the aux
//! phase, then decodes a few named channels.
//!
//! Usage:
//!   cargo run --example decode_synthetic -- \
//!       --variant record-usb3 --streams 4 --blocks 2 \
//!       --stream 2 --channel 7 --drop 1
//!
//! Set RUST_LOG=debug to see layout resolution and phase relocks.

use clap::Parser;
use ephys_frames::decoder::AUX_SENTINEL;
use ephys_frames::synth::FrameWriter;
use ephys_frames::{ChannelRequest, DecoderConfig, FrameDecoder, HardwareVariant, Waveform};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Controller variant (record-usb2, record-usb3, stim-record-usb2)
    #[arg(long, default_value = "record-usb3")]
    variant: HardwareVariant,

    /// Number of enabled data streams
    #[arg(long, default_value = "1")]
    streams: usize,

    /// Number of 128-sample data blocks to synthesise
    #[arg(long, default_value = "1")]
    blocks: usize,

    /// Stream carrying the test signal
    #[arg(long, default_value = "0")]
    stream: usize,

    /// Amplifier channel carrying the test signal
    #[arg(long, default_value = "0")]
    channel: usize,

    /// Frames to discard from the start of the buffer (shifts the aux phase)
    #[arg(long, default_value = "0")]
    drop: usize,
}

fn synthesise(config: &DecoderConfig, args: &Args) -> Result<FrameWriter, Box<dyn std::error::Error>> {
    let mut writer = FrameWriter::new(config.variant, config.num_data_streams, config.num_samples)?;
    writer.write_headers();
    writer.write_timestamps(0);

    for frame in 0..config.num_samples {
        // 100 uV, 32-sample period
        let phase = frame as f32 / 32.0 * std::f32::consts::TAU;
        let code = (32768.0 + 100.0 / 0.195 * phase.sin()).round() as u16;
        writer.set_amplifier(frame, args.stream, args.channel, code)?;
        writer.set_digital_in(frame, (frame / 16) as u16)?;

        if !config.variant.is_stim() {
            let aux = match frame % 4 {
                0 => AUX_SENTINEL,
                k => 10_000 * k as u16,
            };
            writer.set_aux_slot(frame, args.stream, 1, aux)?;
        }
    }
    for _ in 0..args.drop {
        writer.drop_frame(0)?;
    }
    Ok(writer)
}

fn summarise(name: &str, waveform: &Waveform) {
    match waveform {
        Waveform::Timestamps(v) => {
            info!("{:>18}: first={:?} last={:?}", name, v.first(), v.last())
        }
        Waveform::Words(v) => info!("{:>18}: {:04X?}", name, &v[..v.len().min(8)]),
        _ => {
            let v = waveform.as_f32().unwrap_or(&[]);
            let min = v.iter().copied().fold(f32::INFINITY, f32::min);
            let max = v.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            info!("{:>18}: min={:.4} max={:.4}", name, min, max);
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = DecoderConfig::new(args.variant)
        .with_num_data_streams(args.streams)
        .with_num_blocks(args.blocks);
    config.validate()?;

    info!("=== Synthetic Decode Example ===");
    info!(
        "Variant: {}, streams: {}, samples: {}",
        config.variant, config.num_data_streams, config.num_samples
    );

    let writer = synthesise(&config, &args)?;
    let mut decoder = FrameDecoder::from_config(writer.words(), &config)?;
    info!(
        "{} words/frame, {} of {} headers valid",
        decoder.layout().words_per_frame(),
        decoder.count_valid_headers(),
        config.num_samples
    );

    let mut requests = vec![
        ChannelRequest::Timestamp,
        ChannelRequest::Amplifier {
            stream: args.stream,
            channel: args.channel,
        },
        ChannelRequest::DigitalIn,
    ];
    if !config.variant.is_stim() {
        requests.extend((0..3).map(|aux_channel| ChannelRequest::AuxInput {
            stream: args.stream,
            aux_channel,
        }));
    }

    for request in requests {
        let waveform = decoder.decode(request)?;
        summarise(&request.to_string(), &waveform);
    }
    info!("Aux {}", decoder.aux_phase());

    info!("Done!");
    Ok(())
}
