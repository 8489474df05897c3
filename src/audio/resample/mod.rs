//! PCM resampling — three kernels behind one adapter:
//!
//! | Quality | Kernel | CPU Cost |
//! |---|---|---|
//! | 0–3 | [`LinearResampler`] | Very low |
//! | 4–7 | [`HermiteResampler`] (Catmull-Rom) | Low-medium |
//! | 8–10 | [`SincResampler`] (Blackman-windowed) | High |
//!
//! [`PcmResampler`] is what the encoder talks to: it validates the
//! configuration, consumes every input frame it is given, and writes into a
//! caller-sized buffer, carrying anything that does not fit to the next call.

pub mod hermite;
pub mod linear;
pub mod sinc;

pub use hermite::HermiteResampler;
pub use linear::LinearResampler;
pub use sinc::SincResampler;

use thiserror::Error;
use tracing::debug;

use crate::audio::constants::{MAX_CHANNELS, MAX_RESAMPLER_QUALITY};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResamplerError {
    #[error("unsupported channel count for resampling: {0}")]
    UnsupportedChannels(usize),
    #[error("resampler quality {0} is out of range (0..=10)")]
    InvalidQuality(u8),
    #[error("invalid resampling rates: {source_rate} Hz -> {target_rate} Hz")]
    InvalidRate { source_rate: u32, target_rate: u32 },
}

/// Kernel selected at construction time.
pub enum Kernel {
    Linear(LinearResampler),
    Hermite(HermiteResampler),
    Sinc(SincResampler),
}

impl Kernel {
    pub fn for_quality(quality: u8, source_rate: u32, target_rate: u32, channels: usize) -> Self {
        match quality {
            0..=3 => Self::Linear(LinearResampler::new(source_rate, target_rate, channels)),
            4..=7 => Self::Hermite(HermiteResampler::new(source_rate, target_rate, channels)),
            _ => Self::Sinc(SincResampler::new(source_rate, target_rate, channels)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Linear(_) => "linear",
            Self::Hermite(_) => "hermite",
            Self::Sinc(_) => "sinc",
        }
    }

    /// Resample `input` and append the result to `output`.
    pub fn process(&mut self, input: &[i16], output: &mut Vec<i16>) {
        match self {
            Self::Linear(r) => r.process(input, output),
            Self::Hermite(r) => r.process(input, output),
            Self::Sinc(r) => r.process(input, output),
        }
    }
}

/// Frame counts reported by one [`PcmResampler::process`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResampleCounts {
    pub input_frames: usize,
    pub output_frames: usize,
}

/// Interleaved i16 sample-rate converter with a fixed configuration.
pub struct PcmResampler {
    kernel: Kernel,
    channels: usize,
    source_rate: u32,
    target_rate: u32,
    /// Converted samples that did not fit the caller's buffer last time.
    spill: Vec<i16>,
    scratch: Vec<i16>,
}

impl PcmResampler {
    pub fn new(
        channels: usize,
        source_rate: u32,
        target_rate: u32,
        quality: u8,
    ) -> Result<Self, ResamplerError> {
        if channels == 0 || channels > MAX_CHANNELS {
            return Err(ResamplerError::UnsupportedChannels(channels));
        }
        if quality > MAX_RESAMPLER_QUALITY {
            return Err(ResamplerError::InvalidQuality(quality));
        }
        if source_rate == 0 || target_rate == 0 {
            return Err(ResamplerError::InvalidRate {
                source_rate,
                target_rate,
            });
        }

        let kernel = Kernel::for_quality(quality, source_rate, target_rate, channels);
        debug!(
            "Resampler ready: {} Hz -> {} Hz, {} ch, quality {} ({})",
            source_rate,
            target_rate,
            channels,
            quality,
            kernel.name()
        );

        Ok(Self {
            kernel,
            channels,
            source_rate,
            target_rate,
            spill: Vec::new(),
            scratch: Vec::new(),
        })
    }

    pub fn source_rate(&self) -> u32 {
        self.source_rate
    }

    pub fn target_rate(&self) -> u32 {
        self.target_rate
    }

    pub fn kernel_name(&self) -> &'static str {
        self.kernel.name()
    }

    /// Output capacity, in frames, a caller should provide for
    /// `input_frames` of input. The exact count cannot be predicted per call.
    pub fn max_output_frames(&self, input_frames: usize) -> usize {
        (input_frames as u64 * self.target_rate as u64 / self.source_rate as u64) as usize + 1
    }

    /// Convert every frame of `input` and write as many frames as fit into
    /// `output`. Frames that do not fit are emitted first on the next call.
    pub fn process(&mut self, input: &[i16], output: &mut [i16]) -> ResampleCounts {
        let ch = self.channels;
        self.scratch.clear();
        self.scratch.append(&mut self.spill);
        self.kernel.process(input, &mut self.scratch);

        let fits = self.scratch.len().min(output.len() / ch * ch);
        output[..fits].copy_from_slice(&self.scratch[..fits]);
        self.spill.extend_from_slice(&self.scratch[fits..]);

        ResampleCounts {
            input_frames: input.len() / ch,
            output_frames: fits / ch,
        }
    }

    /// Frames converted but not yet handed out.
    pub fn pending_frames(&self) -> usize {
        self.spill.len() / self.channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_configuration() {
        assert_eq!(
            PcmResampler::new(0, 44_100, 48_000, 4).err(),
            Some(ResamplerError::UnsupportedChannels(0))
        );
        assert_eq!(
            PcmResampler::new(3, 44_100, 48_000, 4).err(),
            Some(ResamplerError::UnsupportedChannels(3))
        );
        assert_eq!(
            PcmResampler::new(2, 44_100, 48_000, 11).err(),
            Some(ResamplerError::InvalidQuality(11))
        );
        assert!(matches!(
            PcmResampler::new(2, 0, 48_000, 4),
            Err(ResamplerError::InvalidRate { .. })
        ));
    }

    #[test]
    fn quality_selects_kernel() {
        let name = |q| PcmResampler::new(1, 22_050, 48_000, q).unwrap().kernel_name();
        assert_eq!(name(0), "linear");
        assert_eq!(name(3), "linear");
        assert_eq!(name(4), "hermite");
        assert_eq!(name(7), "hermite");
        assert_eq!(name(8), "sinc");
        assert_eq!(name(10), "sinc");
    }

    #[test]
    fn consumes_all_input_within_allocated_output() {
        for quality in [0u8, 4, 10] {
            let mut r = PcmResampler::new(2, 44_100, 48_000, quality).unwrap();
            let input = vec![100i16; 882 * 2];
            let mut total = 0;
            for _ in 0..100 {
                let cap = r.max_output_frames(882);
                let mut out = vec![0i16; cap * 2];
                let counts = r.process(&input, &mut out);
                assert_eq!(counts.input_frames, 882);
                assert!(counts.output_frames <= cap);
                total += counts.output_frames;
            }
            total += r.pending_frames();
            // 100 x 20 ms of input is 96 000 frames at 48 kHz.
            assert!((total as i64 - 96_000).abs() <= 1, "quality {quality}: {total}");
        }
    }

    #[test]
    fn undersized_output_spills_into_next_call() {
        let mut r = PcmResampler::new(1, 24_000, 48_000, 0).unwrap();
        let mut out = vec![0i16; 5];
        let counts = r.process(&[1, 2, 3, 4], &mut out);
        assert_eq!(counts.output_frames, 5);
        assert_eq!(r.pending_frames(), 3);

        let mut out = vec![0i16; 16];
        let counts = r.process(&[], &mut out);
        assert_eq!(counts.input_frames, 0);
        assert_eq!(counts.output_frames, 3);
        assert_eq!(r.pending_frames(), 0);
    }

    #[test]
    fn max_output_frames_covers_ratio() {
        let r = PcmResampler::new(2, 44_100, 48_000, 4).unwrap();
        assert_eq!(r.max_output_frames(882), 961);
        assert_eq!(r.max_output_frames(0), 1);
    }
}
