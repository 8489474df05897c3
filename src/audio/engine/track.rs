//! `TrackEncoder` — the consumer side: metadata and the packet pump.
//!
//! The lock only guards buffer hand-off. Assembling, resampling and codec
//! calls all run on the encoder's private state after the lock is released,
//! so producers are never blocked behind CPU-bound work.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use flume::Sender;
use tracing::{debug, info, trace, warn};

use super::monitor::{CodecHandles, Monitor};
use super::{
    CodecMetadata, EncodedPacket, EncoderConfig, EncoderOutput, EncoderState, EncoderStats,
    FrameType,
};
use crate::audio::codec::BoxedCodec;
use crate::audio::flow::FrameAssembler;
use crate::audio::resample::PcmResampler;
use crate::audio::segment::AudioSegment;
use crate::common::EncoderError;
use crate::configs::EncoderSettings;

/// Result of one pass over the private buffers.
enum Step {
    Packet { packet: EncodedPacket, last: bool },
    /// Resampled output fell short of a packet; wait for more input.
    NeedMore,
    /// End of stream with nothing left to encode.
    Finished,
}

/// Encoder-owned state, claimed from the monitor once the codec exists.
struct EncodeContext {
    config: EncoderConfig,
    codec: BoxedCodec,
    resampler: Option<PcmResampler>,
    lookahead: Option<u32>,
    /// Source-rate samples claimed from the producer.
    source: AudioSegment,
    /// Slices source-rate frames of one packet's duration.
    assembler: FrameAssembler,
    /// Output-rate samples produced by the resampler but not yet encoded.
    carry: Vec<i16>,
    slice: Vec<i16>,
    resampled: Vec<i16>,
    pcm: Vec<i16>,
    packet_buf: Vec<u8>,
}

impl EncodeContext {
    fn new(config: EncoderConfig, handles: CodecHandles, max_packet_bytes: usize) -> Self {
        Self {
            config,
            codec: handles.codec,
            resampler: handles.resampler,
            lookahead: None,
            source: AudioSegment::new(),
            assembler: FrameAssembler::new(config.channels, config.source_packet_frames),
            carry: Vec::with_capacity(config.frame_len() * 2),
            slice: Vec::with_capacity(config.source_packet_frames * config.channels),
            resampled: Vec::new(),
            pcm: Vec::with_capacity(config.frame_len()),
            packet_buf: vec![0; max_packet_bytes],
        }
    }

    /// Codec delay at the output rate. Queried once; failures count as 0.
    fn lookahead(&mut self) -> u32 {
        if let Some(lookahead) = self.lookahead {
            return lookahead;
        }
        let lookahead = self.codec.lookahead().unwrap_or_else(|e| {
            warn!("Failed to query codec lookahead, assuming 0: {}", e);
            0
        });
        self.lookahead = Some(lookahead);
        lookahead
    }

    /// Pre-skip at 48 kHz.
    fn pre_skip(&mut self) -> u16 {
        let samples = self.lookahead() as u64 * self.config.granule_scale();
        u16::try_from(samples).unwrap_or(u16::MAX)
    }

    fn carry_frames(&self) -> usize {
        self.carry.len() / self.config.channels
    }

    /// Source frames that must be buffered before a full packet can be built.
    fn frames_needed(&self) -> usize {
        let Some(resampler) = &self.resampler else {
            return self.config.packet_frames;
        };
        let missing = self.config.packet_frames.saturating_sub(self.carry_frames());
        if missing == 0 {
            return 0;
        }
        let source = missing as u64 * resampler.source_rate() as u64;
        // One spare frame absorbs the kernel's fractional phase.
        source.div_ceil(resampler.target_rate() as u64) as usize + 1
    }

    fn is_drained(&self) -> bool {
        self.source.is_empty() && self.carry.is_empty()
    }

    /// Build and encode one packet from the private buffers.
    fn step(&mut self, end_of_stream: bool) -> Step {
        let ch = self.config.channels;
        let packet_frames = self.config.packet_frames;

        let frames = if self.resampler.is_some() {
            self.fill_carry();
            let available = self.carry_frames();
            if available < packet_frames && !end_of_stream {
                return Step::NeedMore;
            }
            let take = available.min(packet_frames);
            self.pcm.clear();
            self.pcm.extend(self.carry.drain(..take * ch));
            self.pcm.resize(self.config.frame_len(), 0);
            take
        } else {
            let copied = self.assembler.assemble(&self.source, &mut self.pcm);
            self.source.remove_leading(copied);
            copied
        };

        if frames == 0 && end_of_stream {
            return Step::Finished;
        }

        let duration = if self.resampler.is_some() {
            frames as u64
        } else {
            frames as u64 * self.config.granule_scale()
        };
        let last = end_of_stream && self.is_drained();

        let (data, error) = match self.codec.encode(&self.pcm, &mut self.packet_buf) {
            Ok(len) => (self.packet_buf[..len].to_vec(), None),
            Err(e) => {
                warn!("Failed to encode {} frames: {}", frames, e);
                (Vec::new(), Some(e))
            }
        };

        trace!(
            "Encoded packet: {} bytes, {} frames ({} padded)",
            data.len(),
            frames,
            packet_frames - frames
        );

        Step::Packet {
            packet: EncodedPacket {
                data,
                duration,
                encoded_frames: packet_frames,
                frame_type: FrameType::Audio,
                error,
            },
            last,
        }
    }

    /// Resample source slices into the carry buffer until it holds a full
    /// packet or the source runs dry.
    fn fill_carry(&mut self) {
        let Some(resampler) = self.resampler.as_mut() else {
            return;
        };
        let ch = self.config.channels;

        while self.carry.len() < self.config.frame_len() && !self.source.is_empty() {
            let copied = self.assembler.assemble(&self.source, &mut self.slice);
            self.source.remove_leading(copied);

            let capacity = resampler.max_output_frames(copied) + resampler.pending_frames();
            self.resampled.clear();
            self.resampled.resize(capacity * ch, 0);
            let counts = resampler.process(&self.slice[..copied * ch], &mut self.resampled);
            self.carry
                .extend_from_slice(&self.resampled[..counts.output_frames * ch]);
        }
    }

    /// Drop the resampler as soon as no more input can arrive.
    fn release_resampler(&mut self) {
        if self.resampler.take().is_some() {
            debug!("Resampler released");
        }
    }
}

/// Consumer handle: owns the codec once it is ready and emits packets.
pub struct TrackEncoder {
    shared: Arc<Monitor>,
    settings: Arc<EncoderSettings>,
    context: Option<EncodeContext>,
    metadata: Option<Arc<CodecMetadata>>,
    lookahead_padded: bool,
    stats: EncoderStats,
}

impl TrackEncoder {
    pub(super) fn new(shared: Arc<Monitor>, settings: Arc<EncoderSettings>) -> Self {
        Self {
            shared,
            settings,
            context: None,
            metadata: None,
            lookahead_padded: false,
            stats: EncoderStats::default(),
        }
    }

    pub fn state(&self) -> EncoderState {
        self.shared.phase()
    }

    /// Stream format, once `init` has succeeded and the codec was claimed.
    pub fn config(&self) -> Option<EncoderConfig> {
        self.context.as_ref().map(|ctx| ctx.config)
    }

    pub fn stats(&self) -> EncoderStats {
        self.stats
    }

    pub fn cancel(&self) {
        self.shared.cancel();
    }

    #[cfg(test)]
    pub(crate) fn has_resampler(&self) -> bool {
        self.context.as_ref().is_some_and(|ctx| ctx.resampler.is_some())
    }

    fn claim(&mut self, claimed: Option<(EncoderConfig, CodecHandles)>) {
        if let Some((config, handles)) = claimed {
            self.context = Some(EncodeContext::new(
                config,
                handles,
                self.settings.max_packet_bytes,
            ));
        }
    }

    /// Block until the codec is ready, then return both header blobs.
    ///
    /// Returns `None` if the encoder was canceled or already finished. The
    /// blobs are built once and shared by every later call.
    pub fn get_metadata(&mut self) -> Option<Arc<CodecMetadata>> {
        let claimed = {
            let mut state = self.shared.state.lock();
            while state.phase == EncoderState::Uninitialized {
                self.shared.cond.wait(&mut state);
            }
            if matches!(state.phase, EncoderState::Canceled | EncoderState::Done) {
                return None;
            }
            state.take_handles()
        };
        self.claim(claimed);

        if let Some(metadata) = &self.metadata {
            return Some(metadata.clone());
        }

        let ctx = self.context.as_mut()?;
        let pre_skip = ctx.pre_skip();
        let metadata = CodecMetadata::new(
            ctx.config.channels as u8,
            pre_skip,
            ctx.config.source_rate,
            &self.settings.vendor,
            &self.settings.header_comments(),
        );

        match metadata {
            Ok(metadata) => {
                debug!(
                    "Headers ready: pre-skip {}, id {} bytes, comments {} bytes",
                    pre_skip,
                    metadata.id_header.len(),
                    metadata.comment_header.len()
                );
                let metadata = Arc::new(metadata);
                self.metadata = Some(metadata.clone());
                Some(metadata)
            }
            Err(e) => {
                warn!("Failed to serialize codec headers: {}", e);
                None
            }
        }
    }

    /// Produce the next packet.
    ///
    /// Blocks until a full packet is buffered, end-of-stream is signaled or
    /// the encoder is canceled. Returns `Ok(None)` once every sample has been
    /// encoded and `Err(EncoderError::Canceled)` after cancellation.
    pub fn get_encoded_track(&mut self) -> Result<Option<EncodedPacket>, EncoderError> {
        let shared = Arc::clone(&self.shared);

        loop {
            // Query the codec before taking the lock; the value is cached.
            if let Some(ctx) = self.context.as_mut() {
                ctx.lookahead();
            }

            let (claimed, end_of_stream) = {
                let mut state = shared.state.lock();
                loop {
                    match state.phase {
                        EncoderState::Canceled => return Err(EncoderError::Canceled),
                        EncoderState::Done => return Ok(None),
                        EncoderState::Uninitialized => {
                            shared.cond.wait(&mut state);
                            continue;
                        }
                        _ => {}
                    }
                    let Some(ctx) = self.context.as_ref() else {
                        break;
                    };
                    if state.end_of_stream
                        || state.raw.duration() + ctx.source.duration() >= ctx.frames_needed()
                    {
                        break;
                    }
                    shared.cond.wait(&mut state);
                }

                let claimed = state.take_handles();
                let end_of_stream = state.end_of_stream;
                if let Some(ctx) = self.context.as_mut() {
                    ctx.source.append_from(&mut state.raw);
                    // Codec delay would otherwise swallow the tail of the stream.
                    if end_of_stream && !self.lookahead_padded {
                        let lookahead = ctx.lookahead() as usize;
                        ctx.source.append_silence(lookahead);
                        self.lookahead_padded = true;
                    }
                    state.phase = if end_of_stream {
                        EncoderState::Draining
                    } else {
                        EncoderState::Encoding
                    };
                }
                (claimed, end_of_stream)
            };

            if claimed.is_some() {
                self.claim(claimed);
                continue;
            }
            let Some(ctx) = self.context.as_mut() else {
                continue;
            };

            match ctx.step(end_of_stream) {
                Step::NeedMore => continue,
                Step::Finished => {
                    self.finish();
                    return Ok(None);
                }
                Step::Packet { packet, last } => {
                    self.stats.record(&packet);
                    if last {
                        self.finish();
                    }
                    return Ok(Some(packet));
                }
            }
        }
    }

    fn finish(&mut self) {
        if let Some(ctx) = self.context.as_mut() {
            ctx.release_resampler();
        }
        let mut state = self.shared.state.lock();
        if state.phase != EncoderState::Canceled {
            state.phase = EncoderState::Done;
        }
        self.shared.cond.notify_all();
        info!(
            "Done encoding: {} packets, {} bytes, {} samples at 48 kHz",
            self.stats.packets, self.stats.encoded_bytes, self.stats.duration
        );
    }

    /// Send the headers, then every packet in order, until the stream ends.
    ///
    /// A disconnected receiver cancels the encoder.
    pub fn run(mut self, tx: Sender<EncoderOutput>) -> Result<EncoderStats, EncoderError> {
        if let Some(metadata) = self.get_metadata() {
            if tx.send(EncoderOutput::Metadata(metadata)).is_err() {
                self.cancel();
                return Err(EncoderError::Canceled);
            }
        }

        while let Some(packet) = self.get_encoded_track()? {
            if tx.send(EncoderOutput::Packet(packet)).is_err() {
                debug!("Packet receiver dropped, canceling encoder");
                self.cancel();
                return Err(EncoderError::Canceled);
            }
        }
        Ok(self.stats)
    }

    /// [`run`](Self::run) on a dedicated thread.
    pub fn spawn(
        self,
        tx: Sender<EncoderOutput>,
    ) -> std::io::Result<JoinHandle<Result<EncoderStats, EncoderError>>> {
        thread::Builder::new()
            .name("track-encoder".into())
            .spawn(move || self.run(tx))
    }
}
