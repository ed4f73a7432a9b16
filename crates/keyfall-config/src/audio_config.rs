use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Audio assets and volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct AudioConfig {
    /// Song played by the session. `None` runs on the synthetic clock.
    pub song_path: Option<PathBuf>,
    pub hit_sound: Option<PathBuf>,
    pub miss_sound: Option<PathBuf>,
    /// Played when a combo milestone is reached.
    pub chime_sound: Option<PathBuf>,
    pub volume: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            song_path: None,
            hit_sound: None,
            miss_sound: None,
            chime_sound: None,
            volume: 0.8,
        }
    }
}

impl AudioConfig {
    pub fn validate(&mut self) {
        if !self.volume.is_finite() {
            self.volume = Self::default().volume;
        }
        self.volume = self.volume.clamp(0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let ac = AudioConfig::default();
        assert!(ac.song_path.is_none());
        assert!(ac.hit_sound.is_none());
        assert!((ac.volume - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn test_validate_clamps() {
        let mut ac = AudioConfig {
            volume: 3.0,
            ..Default::default()
        };
        ac.validate();
        assert!((ac.volume - 1.0).abs() < f32::EPSILON);

        ac.volume = f32::NAN;
        ac.validate();
        assert!((ac.volume - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn test_deserialize_camel_case() {
        let json = r#"{ "songPath": "song.ogg", "hitSound": "hit.wav" }"#;
        let ac: AudioConfig = serde_json::from_str(json).unwrap();
        assert_eq!(ac.song_path, Some(PathBuf::from("song.ogg")));
        assert_eq!(ac.hit_sound, Some(PathBuf::from("hit.wav")));
        assert!(ac.miss_sound.is_none());
    }
}
