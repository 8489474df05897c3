use std::f32::consts::TAU;
use std::sync::Arc;
use std::thread;

use opustrack::audio::{EncoderOutput, OpusCodecFactory, TrackInput, track_encoder};
use opustrack::common::{AnyResult, logger};
use opustrack::configs::{Config, InputConfig};
use tracing::{error, info, warn};

fn main() -> AnyResult<()> {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Using built-in defaults: {}", e);
            Config::default()
        }
    };
    logger::init(&config);

    info!(
        "opustrack {} ({}@{})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_BRANCH"),
        env!("GIT_COMMIT")
    );

    let factory = Arc::new(OpusCodecFactory::from_settings(&config.encoder));
    let (input, encoder) = track_encoder(factory, config.encoder.clone());

    let (tx, rx) = flume::unbounded();
    let worker = encoder.spawn(tx)?;

    let tone = config.input.clone();
    let producer = thread::Builder::new()
        .name("tone-source".into())
        .spawn(move || produce_tone(&input, &tone))?;

    let mut packets = 0usize;
    for output in rx.iter() {
        match output {
            EncoderOutput::Metadata(metadata) => info!(
                "Headers: OpusHead {} bytes (pre-skip {}), OpusTags {} bytes",
                metadata.id_header.len(),
                metadata.pre_skip,
                metadata.comment_header.len()
            ),
            EncoderOutput::Packet(packet) => {
                packets += 1;
                if let Some(e) = &packet.error {
                    warn!("Packet {} failed: {}", packets, e);
                }
            }
        }
    }

    if producer.join().is_err() {
        error!("Tone source panicked");
    }

    match worker.join() {
        Ok(Ok(stats)) => info!(
            "Encoded {} packets ({} failed), {} bytes, {:.3}s",
            stats.packets,
            stats.failed_packets,
            stats.encoded_bytes,
            stats.duration as f64 / 48_000.0
        ),
        Ok(Err(e)) => error!("Encoder stopped: {}", e),
        Err(_) => error!("Encoder thread panicked"),
    }

    Ok(())
}

/// Feed a sine tone in `chunk_ms` blocks, with a short gap halfway through.
fn produce_tone(input: &TrackInput, tone: &InputConfig) {
    if let Err(e) = input.init(tone.channels, tone.sample_rate) {
        error!("Failed to initialize encoder: {}", e);
        input.cancel();
        return;
    }

    let rate = tone.sample_rate as u64;
    let chunk_frames = (rate * tone.chunk_ms.max(1) / 1000).max(1) as usize;
    let total_frames = (rate * tone.duration_ms / 1000) as usize;
    let gap_at = total_frames / 2;
    let step = TAU * tone.tone_hz / tone.sample_rate as f32;

    let mut written = 0usize;
    let mut gap_done = false;
    while written < total_frames {
        if !gap_done && written >= gap_at {
            input.append_silence(chunk_frames * 10);
            gap_done = true;
        }

        let frames = chunk_frames.min(total_frames - written);
        let mut pcm = Vec::with_capacity(frames * tone.channels);
        for i in 0..frames {
            let sample = ((written + i) as f32 * step).sin() * 0.25 * i16::MAX as f32;
            pcm.extend(std::iter::repeat_n(sample as i16, tone.channels));
        }
        if let Err(e) = input.append_samples(pcm, tone.channels) {
            error!("Failed to append samples: {}", e);
            input.cancel();
            return;
        }
        written += frames;
    }

    input.end_of_stream();
}
