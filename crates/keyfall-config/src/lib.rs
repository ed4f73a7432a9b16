// Player-facing configuration: audio assets, calibration, lanes and key bindings

mod audio_config;
mod game_config;

pub use audio_config::AudioConfig;
pub use game_config::GameConfig;
