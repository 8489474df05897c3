use thiserror::Error;

use crate::audio::codec::CodecError;
use crate::audio::resample::ResamplerError;

/// Failures surfaced by the track encoder.
///
/// Construction errors are fatal to `init` and leave no partial state behind.
/// Per-packet codec failures never show up here: they travel on the packet
/// itself so the stream keeps flowing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncoderError {
    #[error("invalid channel configuration: {0} channels")]
    InvalidChannelConfig(usize),
    #[error("invalid source sample rate: {0} Hz")]
    InvalidSampleRate(u32),
    #[error("failed to initialize resampler: {0}")]
    ResamplerInitFailed(#[from] ResamplerError),
    #[error("failed to initialize codec: {0}")]
    CodecInitFailed(#[source] CodecError),
    #[error("encoder is already initialized")]
    AlreadyInitialized,
    #[error("encoding was canceled")]
    Canceled,
}
