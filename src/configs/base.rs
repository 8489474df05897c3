use serde::{Deserialize, Serialize};

use crate::common::types::AnyResult;
use crate::configs::*;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub encoder: EncoderSettings,
    #[serde(default)]
    pub input: InputConfig,
    pub logging: Option<LoggingConfig>,
}

impl Config {
    /// Load `config.toml`, falling back to `config.default.toml`.
    pub fn load() -> AnyResult<Self> {
        let config_path = if std::path::Path::new("config.toml").exists() {
            "config.toml"
        } else if std::path::Path::new("config.default.toml").exists() {
            "config.default.toml"
        } else {
            return Err("config.toml or config.default.toml not found".into());
        };

        let config_str = std::fs::read_to_string(config_path)?;
        if config_str.is_empty() {
            return Err(format!("{} is empty", config_path).into());
        }

        Self::from_toml(&config_str)
    }

    pub fn from_toml(source: &str) -> AnyResult<Self> {
        let config: Config = toml::from_str(source)?;
        config.encoder.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sections_fall_back_to_defaults() {
        let config = Config::from_toml("[encoder]\n[input]\n").unwrap();
        assert_eq!(config.encoder, EncoderSettings::default());
        assert_eq!(config.input, InputConfig::default());
        assert!(config.logging.is_none());
    }

    #[test]
    fn reads_every_section() {
        let config = Config::from_toml(
            r#"
            [encoder]
            frame_duration_ms = 40
            resampler_quality = 9
            vendor = "libopus 1.4"
            comments = ["ARTIST=someone"]

            [input]
            sample_rate = 16000
            channels = 1

            [logging]
            level = "debug"
            filters = "opustrack=trace"
            "#,
        )
        .unwrap();

        assert_eq!(config.encoder.frame_duration_ms, 40);
        assert_eq!(config.encoder.resampler_quality, 9);
        assert_eq!(config.encoder.vendor, "libopus 1.4");
        assert_eq!(config.input.sample_rate, 16_000);
        assert_eq!(config.input.channels, 1);
        let logging = config.logging.unwrap();
        assert_eq!(logging.level.as_deref(), Some("debug"));
        assert_eq!(logging.filters.as_deref(), Some("opustrack=trace"));
    }

    #[test]
    fn invalid_encoder_section_is_rejected() {
        assert!(Config::from_toml("[encoder]\nframe_duration_ms = 7\n").is_err());
    }
}
