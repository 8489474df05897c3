use serde::{Deserialize, Serialize};

/// Test-tone source used by the bundled binary.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct InputConfig {
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    #[serde(default = "default_channels")]
    pub channels: usize,
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u64,
    #[serde(default = "default_tone_hz")]
    pub tone_hz: f32,
    /// Size of each appended block (ms).
    #[serde(default = "default_chunk_ms")]
    pub chunk_ms: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            channels: default_channels(),
            duration_ms: default_duration_ms(),
            tone_hz: default_tone_hz(),
            chunk_ms: default_chunk_ms(),
        }
    }
}

fn default_sample_rate() -> u32 {
    44_100
}

fn default_channels() -> usize {
    2
}

fn default_duration_ms() -> u64 {
    2_000
}

fn default_tone_hz() -> f32 {
    440.0
}

fn default_chunk_ms() -> u64 {
    10
}
