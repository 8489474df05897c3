//! `engine/mod.rs` — the track encoder state machine.
//!
//! A track encoder is split into two handles sharing one monitor:
//!
//! | Handle | Side | Operations |
//! |---|---|---|
//! | [`TrackInput`] | Producer (clonable) | `init`, `append_*`, `end_of_stream`, `cancel` |
//! | [`TrackEncoder`] | Consumer | `get_metadata`, `get_encoded_track`, `run`, `cancel` |
//!
//! Lifecycle: `Uninitialized → Ready → Encoding → Draining → Done`, with
//! `Canceled` reachable from every non-terminal state.

pub mod config;
pub mod input;
pub(crate) mod monitor;
pub mod packet;
pub mod track;


pub use config::{EncoderConfig, needs_resampling};
pub use input::TrackInput;
pub use packet::{CodecMetadata, EncodedPacket, EncoderOutput, EncoderStats, FrameType};
pub use track::TrackEncoder;

use std::sync::Arc;

use crate::audio::codec::CodecFactory;
use crate::configs::EncoderSettings;
use monitor::Monitor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderState {
    Uninitialized,
    Ready,
    Encoding,
    Draining,
    Done,
    Canceled,
}

impl EncoderState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Canceled)
    }
}

/// Create the producer and consumer handles of a new track encoder.
pub fn track_encoder(
    factory: Arc<dyn CodecFactory>,
    settings: EncoderSettings,
) -> (TrackInput, TrackEncoder) {
    let shared = Arc::new(Monitor::new());
    let settings = Arc::new(settings);

    let input = TrackInput {
        shared: shared.clone(),
        factory,
        settings: settings.clone(),
    };
    (input, TrackEncoder::new(shared, settings))
}
