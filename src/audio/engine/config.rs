use crate::audio::constants::{MAX_CHANNELS, MIN_DIRECT_SAMPLE_RATE, OPUS_SAMPLE_RATE};
use crate::common::EncoderError;

/// Stream format fixed by `init`; never changes afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Channel count announced by the source.
    pub input_channels: usize,
    /// Channel count the codec runs with (at most two).
    pub channels: usize,
    pub source_rate: u32,
    pub output_rate: u32,
    pub resampling: bool,
    /// Frames per packet at the output rate.
    pub packet_frames: usize,
    /// Source-rate frames that cover one packet.
    pub source_packet_frames: usize,
}

impl EncoderConfig {
    pub fn new(
        channels: usize,
        source_rate: u32,
        frame_duration_ms: u32,
    ) -> Result<Self, EncoderError> {
        if channels == 0 {
            return Err(EncoderError::InvalidChannelConfig(channels));
        }
        if source_rate == 0 {
            return Err(EncoderError::InvalidSampleRate(source_rate));
        }

        let resampling = needs_resampling(source_rate);
        let output_rate = if resampling {
            OPUS_SAMPLE_RATE
        } else {
            source_rate
        };
        let packet_frames = (output_rate as u64 * frame_duration_ms as u64 / 1000) as usize;
        let source_packet_frames = (packet_frames as u64 * source_rate as u64)
            .div_ceil(output_rate as u64) as usize;

        Ok(Self {
            input_channels: channels,
            channels: channels.min(MAX_CHANNELS),
            source_rate,
            output_rate,
            resampling,
            packet_frames,
            source_packet_frames,
        })
    }

    /// Multiplier from output-rate frames to 48 kHz granule units.
    pub fn granule_scale(&self) -> u64 {
        (OPUS_SAMPLE_RATE / self.output_rate) as u64
    }

    /// Interleaved length of one packet at the output rate.
    pub fn frame_len(&self) -> usize {
        self.packet_frames * self.channels
    }
}

/// Granule positions are `samples * (48000 / rate)`, so the codec can only be
/// fed directly at rates that divide 48 kHz evenly.
pub fn needs_resampling(source_rate: u32) -> bool {
    !(source_rate >= MIN_DIRECT_SAMPLE_RATE && OPUS_SAMPLE_RATE % source_rate == 0)
}
