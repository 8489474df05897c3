//! Codec seam — the encoder only sees [`Codec`] and [`CodecFactory`].
//!
//! | Implementation | Description |
//! |---|---|
//! | [`OpusCodec`] | libopus via `audiopus` |
//! | `MockCodec` (tests) | Records frames, scripted lookahead and failures |

pub mod opus_encoder;

#[cfg(test)]
pub(crate) mod mock;

pub use opus_encoder::{OpusCodec, OpusCodecFactory};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("sample rate {0} Hz is not supported by the codec")]
    UnsupportedSampleRate(u32),
    #[error("channel count {0} is not supported by the codec")]
    UnsupportedChannels(usize),
    #[error("opus: {0}")]
    Opus(String),
}

impl From<audiopus::Error> for CodecError {
    fn from(e: audiopus::Error) -> Self {
        Self::Opus(e.to_string())
    }
}

/// One live encoder instance. Dropping it releases the underlying handle.
pub trait Codec: Send {
    /// Encode one full interleaved frame into `out`, returning the number of
    /// bytes written.
    fn encode(&mut self, pcm: &[i16], out: &mut [u8]) -> Result<usize, CodecError>;

    /// Algorithmic delay in samples at the codec's own rate.
    fn lookahead(&self) -> Result<u32, CodecError>;
}

/// Type-erased codec owned by the encoder.
pub type BoxedCodec = Box<dyn Codec>;

/// Builds codecs once the stream format is known.
pub trait CodecFactory: Send + Sync {
    fn create(&self, sample_rate: u32, channels: usize) -> Result<BoxedCodec, CodecError>;
}
