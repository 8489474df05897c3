//! `TrackInput` — the producer side of a track encoder.

use std::sync::Arc;

use tracing::{debug, info};

use super::monitor::{CodecHandles, Monitor};
use super::{EncoderConfig, EncoderState};
use crate::audio::codec::CodecFactory;
use crate::audio::constants::OPUS_SAMPLE_RATE;
use crate::audio::resample::PcmResampler;
use crate::common::EncoderError;
use crate::configs::EncoderSettings;

/// Clonable handle used by audio sources to configure and feed the encoder.
#[derive(Clone)]
pub struct TrackInput {
    pub(super) shared: Arc<Monitor>,
    pub(super) factory: Arc<dyn CodecFactory>,
    pub(super) settings: Arc<EncoderSettings>,
}

impl TrackInput {
    /// Fix the stream format and build the codec (and resampler if needed).
    ///
    /// Handles are built outside the lock; on success the encoder becomes
    /// `Ready` and every waiter is woken.
    pub fn init(&self, channels: usize, sample_rate: u32) -> Result<EncoderConfig, EncoderError> {
        self.check_uninitialized()?;

        let config = EncoderConfig::new(channels, sample_rate, self.settings.frame_duration_ms)?;

        let resampler = if config.resampling {
            Some(PcmResampler::new(
                config.channels,
                sample_rate,
                OPUS_SAMPLE_RATE,
                self.settings.resampler_quality,
            )?)
        } else {
            None
        };

        let codec = self
            .factory
            .create(config.output_rate, config.channels)
            .map_err(EncoderError::CodecInitFailed)?;

        {
            let mut state = self.shared.state.lock();
            match state.phase {
                EncoderState::Uninitialized => {}
                EncoderState::Canceled => return Err(EncoderError::Canceled),
                _ => return Err(EncoderError::AlreadyInitialized),
            }
            state.config = Some(config);
            state.handles = Some(CodecHandles { codec, resampler });
            state.phase = EncoderState::Ready;
            self.shared.cond.notify_all();
        }

        info!(
            "Track encoder ready: {} ch ({} in) at {} Hz -> {} Hz, {} frames/packet{}",
            config.channels,
            config.input_channels,
            config.source_rate,
            config.output_rate,
            config.packet_frames,
            if config.resampling { ", resampling" } else { "" }
        );
        Ok(config)
    }

    fn check_uninitialized(&self) -> Result<(), EncoderError> {
        match self.shared.state.lock().phase {
            EncoderState::Uninitialized => Ok(()),
            EncoderState::Canceled => Err(EncoderError::Canceled),
            _ => Err(EncoderError::AlreadyInitialized),
        }
    }

    /// Append an interleaved block with `channels` samples per frame.
    ///
    /// Blocks arriving after end-of-stream or cancellation are dropped.
    pub fn append_samples(&self, pcm: Vec<i16>, channels: usize) -> Result<(), EncoderError> {
        if channels == 0 {
            return Err(EncoderError::InvalidChannelConfig(channels));
        }
        let mut state = self.shared.state.lock();
        if state.end_of_stream || state.phase.is_terminal() {
            debug!("Dropping {} samples appended after end of stream", pcm.len());
            return Ok(());
        }
        state.raw.append_samples(pcm, channels);
        self.shared.cond.notify_all();
        Ok(())
    }

    /// Append a gap of `frames` frames with no backing data.
    pub fn append_silence(&self, frames: usize) {
        let mut state = self.shared.state.lock();
        if state.end_of_stream || state.phase.is_terminal() {
            return;
        }
        state.raw.append_silence(frames);
        self.shared.cond.notify_all();
    }

    /// Signal that no more samples will arrive. Later calls are no-ops.
    pub fn end_of_stream(&self) {
        let mut state = self.shared.state.lock();
        if !state.end_of_stream {
            debug!("End of stream with {} frames pending", state.raw.duration());
            state.end_of_stream = true;
        }
        self.shared.cond.notify_all();
    }

    pub fn cancel(&self) {
        self.shared.cancel();
    }

    pub fn state(&self) -> EncoderState {
        self.shared.phase()
    }

    /// Frames appended but not yet claimed by the encoder.
    pub fn pending_frames(&self) -> usize {
        self.shared.state.lock().raw.duration()
    }
}
