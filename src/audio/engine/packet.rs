use std::io;

use crate::audio::codec::CodecError;
use crate::protocol::opus_header::{comment_header, id_header};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameType {
    Audio,
}

/// Output of one codec invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedPacket {
    /// Compressed bytes; empty when the codec failed on this frame.
    pub data: Vec<u8>,
    /// Real (non-padding) content in 48 kHz samples.
    pub duration: u64,
    /// Frames handed to the codec at the output rate, padding included.
    pub encoded_frames: usize,
    pub frame_type: FrameType,
    /// Codec failure for this packet, if any.
    pub error: Option<CodecError>,
}

impl EncodedPacket {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// The two Ogg Opus header blobs plus the values they carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecMetadata {
    pub id_header: Vec<u8>,
    pub comment_header: Vec<u8>,
    pub channels: u8,
    pub pre_skip: u16,
    pub input_sample_rate: u32,
}

impl CodecMetadata {
    pub fn new(
        channels: u8,
        pre_skip: u16,
        input_sample_rate: u32,
        vendor: &str,
        comments: &[String],
    ) -> io::Result<Self> {
        Ok(Self {
            id_header: id_header(channels, pre_skip, input_sample_rate)?,
            comment_header: comment_header(vendor, comments)?,
            channels,
            pre_skip,
            input_sample_rate,
        })
    }
}

/// What [`TrackEncoder::run`](super::TrackEncoder::run) sends downstream.
#[derive(Debug, Clone)]
pub enum EncoderOutput {
    Metadata(std::sync::Arc<CodecMetadata>),
    Packet(EncodedPacket),
}

/// Running totals kept by the encoder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncoderStats {
    pub packets: u64,
    pub failed_packets: u64,
    pub encoded_bytes: u64,
    /// Total real content in 48 kHz samples.
    pub duration: u64,
}

impl EncoderStats {
    pub(crate) fn record(&mut self, packet: &EncodedPacket) {
        self.packets += 1;
        self.encoded_bytes += packet.data.len() as u64;
        self.duration += packet.duration;
        if packet.is_failed() {
            self.failed_packets += 1;
        }
    }
}
