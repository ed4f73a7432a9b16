use std::path::Path;

use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::audio_config::AudioConfig;

pub const MIN_LANES: usize = 1;
pub const MAX_LANES: usize = 8;
const MAX_CALIBRATION_OFFSET_MS: f64 = 500.0;

/// Default key names, lane by lane. Lanes beyond these get no binding.
const DEFAULT_KEYS: [&str; MAX_LANES] = ["d", "f", "j", "k", "s", "l", "a", ";"];

/// Top-level game configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct GameConfig {
    pub audio: AudioConfig,
    /// Audio/visual latency correction. Positive makes song time smaller.
    pub calibration_offset_ms: f64,
    pub lane_count: usize,
    /// `key_bindings[lane]` lists every key name bound to that lane.
    pub key_bindings: Vec<Vec<String>>,
    /// How long judgment text stays on screen.
    pub feedback_duration_ms: u32,
    /// Screen shake applied on a miss.
    pub miss_shake_intensity: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        let lane_count = 4;
        Self {
            audio: AudioConfig::default(),
            calibration_offset_ms: 0.0,
            lane_count,
            key_bindings: default_bindings(lane_count),
            feedback_duration_ms: 500,
            miss_shake_intensity: 5.0,
        }
    }
}

fn default_bindings(lane_count: usize) -> Vec<Vec<String>> {
    (0..lane_count)
        .map(|lane| {
            DEFAULT_KEYS
                .get(lane)
                .map(|k| vec![k.to_string()])
                .unwrap_or_default()
        })
        .collect()
}

impl GameConfig {
    /// Read config from a JSON file and validate it.
    pub fn read(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let mut config: GameConfig = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config.validate();
        Ok(config)
    }

    /// Write config to a JSON file.
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&mut self) {
        self.audio.validate();

        if !self.calibration_offset_ms.is_finite() {
            warn!("Ignoring non-finite calibration offset");
            self.calibration_offset_ms = 0.0;
        }
        self.calibration_offset_ms = self
            .calibration_offset_ms
            .clamp(-MAX_CALIBRATION_OFFSET_MS, MAX_CALIBRATION_OFFSET_MS);

        let lanes = self.lane_count.clamp(MIN_LANES, MAX_LANES);
        if lanes != self.lane_count {
            warn!("Lane count {} out of range, using {lanes}", self.lane_count);
            self.lane_count = lanes;
        }

        if self.key_bindings.is_empty() {
            self.key_bindings = default_bindings(self.lane_count);
        } else if self.key_bindings.len() != self.lane_count {
            warn!(
                "{} key binding lanes for {} lanes; extra lanes dropped, missing lanes unbound",
                self.key_bindings.len(),
                self.lane_count
            );
            self.key_bindings.resize_with(self.lane_count, Vec::new);
        }

        self.feedback_duration_ms = self.feedback_duration_ms.clamp(50, 5_000);
        if !self.miss_shake_intensity.is_finite() {
            self.miss_shake_intensity = 0.0;
        }
        self.miss_shake_intensity = self.miss_shake_intensity.clamp(0.0, 50.0);
    }

    /// Calibration offset in microseconds.
    pub fn calibration_offset_us(&self) -> i64 {
        (self.calibration_offset_ms * 1_000.0).round() as i64
    }

    pub fn feedback_duration_us(&self) -> i64 {
        i64::from(self.feedback_duration_ms) * 1_000
    }
}
