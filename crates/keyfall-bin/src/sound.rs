use keyfall_play::SoundEffects;
use keyfall_rule::Rating;
use log::debug;

/// Sound effects that only log their cues.
#[derive(Debug, Default)]
pub struct SilentSounds;

impl SoundEffects for SilentSounds {
    fn play_hit(&mut self, rating: Rating) {
        debug!("sound: hit ({})", rating.as_str());
    }

    fn play_miss(&mut self) {
        debug!("sound: miss");
    }

    fn play_combo_chime(&mut self, combo: u32) {
        debug!("sound: combo chime at {combo}");
    }
}

#[cfg(feature = "kira")]
pub use kira_sounds::KiraSounds;

#[cfg(feature = "kira")]
mod kira_sounds {
    use std::path::Path;

    use anyhow::{Result, anyhow};
    use keyfall_config::AudioConfig;
    use keyfall_play::SoundEffects;
    use keyfall_rule::Rating;
    use kira::sound::static_sound::StaticSoundData;
    use kira::{AudioManager, AudioManagerSettings, Decibels, DefaultBackend};
    use log::{info, warn};

    /// Sound effects played through their own kira manager.
    pub struct KiraSounds {
        manager: AudioManager<DefaultBackend>,
        hit: Option<StaticSoundData>,
        miss: Option<StaticSoundData>,
        chime: Option<StaticSoundData>,
        volume: Decibels,
    }

    impl KiraSounds {
        pub fn load(config: &AudioConfig) -> Result<Self> {
            let manager = AudioManager::<DefaultBackend>::new(AudioManagerSettings::default())
                .map_err(|e| anyhow!("Failed to create audio manager: {e}"))?;
            let sounds = Self {
                manager,
                hit: load_optional(config.hit_sound.as_deref()),
                miss: load_optional(config.miss_sound.as_deref()),
                chime: load_optional(config.chime_sound.as_deref()),
                volume: amplitude_to_decibels(config.volume),
            };
            info!(
                "KiraSounds: loaded (hit: {}, miss: {}, chime: {})",
                sounds.hit.is_some(),
                sounds.miss.is_some(),
                sounds.chime.is_some()
            );
            Ok(sounds)
        }
    }

    fn load_optional(path: Option<&Path>) -> Option<StaticSoundData> {
        let path = path?;
        match StaticSoundData::from_file(path) {
            Ok(data) => Some(data),
            Err(e) => {
                warn!("Failed to load sound {}: {e}", path.display());
                None
            }
        }
    }

    fn amplitude_to_decibels(volume: f32) -> Decibels {
        if volume <= 0.0 {
            return Decibels::SILENCE;
        }
        Decibels((20.0 * volume.log10()).max(Decibels::SILENCE.0))
    }

    fn fire(
        manager: &mut AudioManager<DefaultBackend>,
        data: Option<&StaticSoundData>,
        volume: Decibels,
    ) {
        let Some(data) = data else {
            return;
        };
        if let Err(e) = manager.play(data.clone().volume(volume)) {
            warn!("Failed to play sound effect: {e}");
        }
    }

    impl SoundEffects for KiraSounds {
        fn play_hit(&mut self, _rating: Rating) {
            fire(&mut self.manager, self.hit.as_ref(), self.volume);
        }

        fn play_miss(&mut self) {
            fire(&mut self.manager, self.miss.as_ref(), self.volume);
        }

        fn play_combo_chime(&mut self, _combo: u32) {
            fire(&mut self.manager, self.chime.as_ref(), self.volume);
        }
    }
}
