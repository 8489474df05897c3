use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audio::constants::{
    DEFAULT_FRAME_DURATION_MS, DEFAULT_RESAMPLER_QUALITY, DEFAULT_VENDOR, MAX_DATA_BYTES,
    MAX_RESAMPLER_QUALITY, SUPPORTED_FRAME_DURATIONS_MS,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("frame_duration_ms must be 5, 10, 20, 40 or 60, got {0}")]
    FrameDuration(u32),
    #[error("resampler_quality must be within 0..=10, got {0}")]
    ResamplerQuality(u8),
    #[error("max_packet_bytes must be greater than zero")]
    PacketSize,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OpusApplication {
    #[default]
    Audio,
    Voip,
    LowDelay,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BitrateMode {
    Auto,
    Max,
}

/// `"auto"`, `"max"`, or an explicit bit rate.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(untagged)]
pub enum BitrateSetting {
    Mode(BitrateMode),
    BitsPerSecond(i32),
}

impl Default for BitrateSetting {
    fn default() -> Self {
        Self::Mode(BitrateMode::Auto)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct EncoderSettings {
    #[serde(default = "default_frame_duration_ms")]
    pub frame_duration_ms: u32,
    #[serde(default = "default_resampler_quality")]
    pub resampler_quality: u8,
    #[serde(default = "default_max_packet_bytes")]
    pub max_packet_bytes: usize,
    #[serde(default)]
    pub application: OpusApplication,
    #[serde(default)]
    pub bitrate: BitrateSetting,
    #[serde(default = "default_vendor")]
    pub vendor: String,
    /// Extra `KEY=value` comments written after the `ENCODER=` tag.
    #[serde(default)]
    pub comments: Vec<String>,
}

impl EncoderSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !SUPPORTED_FRAME_DURATIONS_MS.contains(&self.frame_duration_ms) {
            return Err(ConfigError::FrameDuration(self.frame_duration_ms));
        }
        if self.resampler_quality > MAX_RESAMPLER_QUALITY {
            return Err(ConfigError::ResamplerQuality(self.resampler_quality));
        }
        if self.max_packet_bytes == 0 {
            return Err(ConfigError::PacketSize);
        }
        Ok(())
    }

    /// Comments for the comment header, encoder tag first.
    pub fn header_comments(&self) -> Vec<String> {
        let mut comments = Vec::with_capacity(self.comments.len() + 1);
        comments.push(format!(
            "ENCODER={} {}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        ));
        comments.extend(self.comments.iter().cloned());
        comments
    }
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            frame_duration_ms: default_frame_duration_ms(),
            resampler_quality: default_resampler_quality(),
            max_packet_bytes: default_max_packet_bytes(),
            application: OpusApplication::default(),
            bitrate: BitrateSetting::default(),
            vendor: default_vendor(),
            comments: Vec::new(),
        }
    }
}

fn default_frame_duration_ms() -> u32 {
    DEFAULT_FRAME_DURATION_MS
}

fn default_resampler_quality() -> u8 {
    DEFAULT_RESAMPLER_QUALITY
}

fn default_max_packet_bytes() -> usize {
    MAX_DATA_BYTES
}

fn default_vendor() -> String {
    DEFAULT_VENDOR.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = EncoderSettings::default();
        assert_eq!(settings.frame_duration_ms, 20);
        assert_eq!(settings.resampler_quality, 4);
        assert_eq!(settings.max_packet_bytes, 4_096);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let mut settings = EncoderSettings {
            frame_duration_ms: 25,
            ..EncoderSettings::default()
        };
        assert_eq!(settings.validate(), Err(ConfigError::FrameDuration(25)));

        settings.frame_duration_ms = 60;
        settings.resampler_quality = 11;
        assert_eq!(settings.validate(), Err(ConfigError::ResamplerQuality(11)));

        settings.resampler_quality = 10;
        settings.max_packet_bytes = 0;
        assert_eq!(settings.validate(), Err(ConfigError::PacketSize));
    }

    #[test]
    fn parses_bitrate_variants() {
        let auto: EncoderSettings = toml::from_str("bitrate = \"auto\"").unwrap();
        assert_eq!(auto.bitrate, BitrateSetting::Mode(BitrateMode::Auto));

        let fixed: EncoderSettings =
            toml::from_str("bitrate = 96000\napplication = \"voip\"").unwrap();
        assert_eq!(fixed.bitrate, BitrateSetting::BitsPerSecond(96_000));
        assert_eq!(fixed.application, OpusApplication::Voip);
        assert_eq!(fixed.frame_duration_ms, 20);
    }

    #[test]
    fn encoder_comment_comes_first() {
        let settings = EncoderSettings {
            comments: vec!["TITLE=test".into()],
            ..EncoderSettings::default()
        };
        let comments = settings.header_comments();
        assert_eq!(comments.len(), 2);
        assert!(comments[0].starts_with("ENCODER=opustrack "));
        assert_eq!(comments[1], "TITLE=test");
    }
}
