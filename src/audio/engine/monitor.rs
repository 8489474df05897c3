//! Lock + condition shared by the producer handles and the encoder.
//!
//! Everything in [`SharedState`] is only touched with the lock held. The
//! condition is signaled on init, append, end-of-stream, cancel and done.

use parking_lot::{Condvar, Mutex};
use tracing::debug;

use super::{EncoderConfig, EncoderState};
use crate::audio::codec::BoxedCodec;
use crate::audio::resample::PcmResampler;
use crate::audio::segment::AudioSegment;

/// Handles built by `init`, parked here until the encoder claims them.
pub(crate) struct CodecHandles {
    pub codec: BoxedCodec,
    pub resampler: Option<PcmResampler>,
}

pub(crate) struct SharedState {
    pub phase: EncoderState,
    pub end_of_stream: bool,
    /// Samples appended by the producer and not yet claimed by the encoder.
    pub raw: AudioSegment,
    pub config: Option<EncoderConfig>,
    pub handles: Option<CodecHandles>,
}

impl SharedState {
    /// Hand the codec handles over to the encoder, exactly once.
    pub fn take_handles(&mut self) -> Option<(EncoderConfig, CodecHandles)> {
        let config = self.config?;
        self.handles.take().map(|h| (config, h))
    }
}

pub(crate) struct Monitor {
    pub state: Mutex<SharedState>,
    pub cond: Condvar,
}

impl Monitor {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SharedState {
                phase: EncoderState::Uninitialized,
                end_of_stream: false,
                raw: AudioSegment::new(),
                config: None,
                handles: None,
            }),
            cond: Condvar::new(),
        }
    }

    pub fn phase(&self) -> EncoderState {
        self.state.lock().phase
    }

    /// Move to `Canceled` unless already finished, and release every waiter.
    pub fn cancel(&self) {
        let mut state = self.state.lock();
        if !state.phase.is_terminal() {
            debug!("Encoder canceled in state {:?}", state.phase);
            state.phase = EncoderState::Canceled;
            state.raw.clear();
        }
        self.cond.notify_all();
    }
}
