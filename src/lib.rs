pub mod audio;
pub mod common;
pub mod configs;
pub mod protocol;

pub use audio::{EncoderOutput, TrackEncoder, TrackInput, track_encoder};
