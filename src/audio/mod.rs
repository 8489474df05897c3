pub mod codec;
pub mod constants;
pub mod engine;
pub mod flow;
pub mod resample;
pub mod segment;

pub use codec::{BoxedCodec, Codec, CodecError, CodecFactory, OpusCodec, OpusCodecFactory};
pub use engine::{
    CodecMetadata, EncodedPacket, EncoderConfig, EncoderOutput, EncoderState, EncoderStats,
    TrackEncoder, TrackInput, track_encoder,
};
pub use flow::FrameAssembler;
pub use resample::PcmResampler;
pub use segment::{AudioChunk, AudioSegment};
