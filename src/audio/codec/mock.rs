//! Scriptable codec for pipeline tests.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

use super::{BoxedCodec, Codec, CodecError, CodecFactory};

/// Everything the mock observed, shared with the test body.
#[derive(Default)]
pub(crate) struct MockLog {
    /// `(sample_rate, channels)` of every created codec.
    pub created: Vec<(u32, usize)>,
    /// Every frame handed to `encode`, in order.
    pub frames: Vec<Vec<i16>>,
    pub lookahead_queries: usize,
}

#[derive(Clone, Default)]
pub(crate) struct MockCodecFactory {
    pub lookahead: Option<u32>,
    pub fail_create: bool,
    /// Zero-based packet indices whose `encode` call fails.
    pub fail_packets: HashSet<usize>,
    pub log: Arc<Mutex<MockLog>>,
}

impl MockCodecFactory {
    pub fn with_lookahead(lookahead: u32) -> Self {
        Self {
            lookahead: Some(lookahead),
            ..Self::default()
        }
    }

    pub fn failing_packets(mut self, packets: impl IntoIterator<Item = usize>) -> Self {
        self.fail_packets = packets.into_iter().collect();
        self
    }
}

impl CodecFactory for MockCodecFactory {
    fn create(&self, sample_rate: u32, channels: usize) -> Result<BoxedCodec, CodecError> {
        if self.fail_create {
            return Err(CodecError::UnsupportedSampleRate(sample_rate));
        }
        self.log.lock().created.push((sample_rate, channels));
        Ok(Box::new(MockCodec {
            lookahead: self.lookahead,
            fail_packets: self.fail_packets.clone(),
            log: self.log.clone(),
            encoded: 0,
        }))
    }
}

pub(crate) struct MockCodec {
    lookahead: Option<u32>,
    fail_packets: HashSet<usize>,
    log: Arc<Mutex<MockLog>>,
    encoded: usize,
}

impl Codec for MockCodec {
    fn encode(&mut self, pcm: &[i16], out: &mut [u8]) -> Result<usize, CodecError> {
        let index = self.encoded;
        self.encoded += 1;
        self.log.lock().frames.push(pcm.to_vec());

        if self.fail_packets.contains(&index) {
            return Err(CodecError::Opus("scripted failure".into()));
        }
        // Packet body: index, then the first sample's low byte.
        out[0] = index as u8;
        out[1] = pcm.first().copied().unwrap_or(0) as u8;
        Ok(2)
    }

    fn lookahead(&self) -> Result<u32, CodecError> {
        self.log.lock().lookahead_queries += 1;
        self.lookahead
            .ok_or_else(|| CodecError::Opus("request not implemented".into()))
    }
}
