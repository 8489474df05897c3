//! Central constants for the encoding pipeline.
//!
//! All magic numbers in `src/audio/**` and `src/protocol/**` live here so they
//! stay consistent across modules.

// ── Sample / PCM ─────────────────────────────────────────────────────────────

/// Granule positions and pre-skip are always expressed at 48 kHz.
pub const OPUS_SAMPLE_RATE: u32 = 48_000;

/// The encoder accepts mono or stereo input only; wider layouts are clamped.
pub const MAX_CHANNELS: usize = 2;

/// Lowest source rate that may be fed to the codec without resampling.
pub const MIN_DIRECT_SAMPLE_RATE: u32 = 8_000;

/// Default duration of one Opus packet (ms).
pub const DEFAULT_FRAME_DURATION_MS: u32 = 20;

/// Packet durations accepted by the codec that are whole milliseconds.
pub const SUPPORTED_FRAME_DURATIONS_MS: [u32; 5] = [5, 10, 20, 40, 60];

// ── Codec ─────────────────────────────────────────────────────────────────────

/// Upper bound on the size of a single encoded packet (bytes).
pub const MAX_DATA_BYTES: usize = 4_096;

// ── Resampler ────────────────────────────────────────────────────────────────

/// Highest accepted resampler quality level.
pub const MAX_RESAMPLER_QUALITY: u8 = 10;

/// Quality used when the configuration does not name one.
pub const DEFAULT_RESAMPLER_QUALITY: u8 = 4;

/// Taps of the windowed-sinc kernel.
pub const SINC_TAPS: usize = 32;

// ── Headers ──────────────────────────────────────────────────────────────────

pub const ID_HEADER_MAGIC: &[u8; 8] = b"OpusHead";
pub const COMMENT_HEADER_MAGIC: &[u8; 8] = b"OpusTags";

/// Identification header version; must always be 1.
pub const ID_HEADER_VERSION: u8 = 1;

/// Total length of the identification header for mapping family 0.
pub const ID_HEADER_LEN: usize = 19;

/// Default vendor string written to the comment header.
pub const DEFAULT_VENDOR: &str = "libopus";
