use audiopus::{Application, Bitrate, Channels, SampleRate, coder::Encoder as OpusEncoder};
use tracing::debug;

use super::{BoxedCodec, Codec, CodecError, CodecFactory};
use crate::configs::{BitrateMode, BitrateSetting, EncoderSettings, OpusApplication};

/// Interleaved i16 PCM → Opus packets.
pub struct OpusCodec {
    encoder: OpusEncoder,
}

impl OpusCodec {
    pub fn new(
        sample_rate: u32,
        channels: usize,
        application: Application,
        bitrate: Bitrate,
    ) -> Result<Self, CodecError> {
        let rate = match sample_rate {
            8000 => SampleRate::Hz8000,
            12000 => SampleRate::Hz12000,
            16000 => SampleRate::Hz16000,
            24000 => SampleRate::Hz24000,
            48000 => SampleRate::Hz48000,
            other => return Err(CodecError::UnsupportedSampleRate(other)),
        };
        let layout = match channels {
            1 => Channels::Mono,
            2 => Channels::Stereo,
            other => return Err(CodecError::UnsupportedChannels(other)),
        };

        let mut encoder = OpusEncoder::new(rate, layout, application)?;
        encoder.set_bitrate(bitrate)?;
        Ok(Self { encoder })
    }
}

impl Codec for OpusCodec {
    fn encode(&mut self, pcm: &[i16], out: &mut [u8]) -> Result<usize, CodecError> {
        Ok(self.encoder.encode(pcm, out)?)
    }

    fn lookahead(&self) -> Result<u32, CodecError> {
        Ok(self.encoder.lookahead()?)
    }
}

/// Builds [`OpusCodec`]s with the configured application profile and bitrate.
#[derive(Debug, Clone, Copy)]
pub struct OpusCodecFactory {
    application: Application,
    bitrate: Bitrate,
}

impl OpusCodecFactory {
    pub fn new(application: Application, bitrate: Bitrate) -> Self {
        Self {
            application,
            bitrate,
        }
    }

    pub fn from_settings(settings: &EncoderSettings) -> Self {
        let application = match settings.application {
            OpusApplication::Audio => Application::Audio,
            OpusApplication::Voip => Application::Voip,
            OpusApplication::LowDelay => Application::LowDelay,
        };
        let bitrate = match settings.bitrate {
            BitrateSetting::Mode(BitrateMode::Auto) => Bitrate::Auto,
            BitrateSetting::Mode(BitrateMode::Max) => Bitrate::Max,
            BitrateSetting::BitsPerSecond(bps) => Bitrate::BitsPerSecond(bps),
        };
        Self::new(application, bitrate)
    }
}

impl Default for OpusCodecFactory {
    fn default() -> Self {
        Self::new(Application::Audio, Bitrate::Auto)
    }
}

impl CodecFactory for OpusCodecFactory {
    fn create(&self, sample_rate: u32, channels: usize) -> Result<BoxedCodec, CodecError> {
        debug!(
            "Creating opus encoder: {} Hz, {} ch, {:?}",
            sample_rate, channels, self.application
        );
        Ok(Box::new(OpusCodec::new(
            sample_rate,
            channels,
            self.application,
            self.bitrate,
        )?))
    }
}
