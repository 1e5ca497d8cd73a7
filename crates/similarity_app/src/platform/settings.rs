use std::fs;
use std::path::Path;

use engine_logging::{engine_info, engine_warn};
use similarity_engine::EngineSettings;

const SETTINGS_FILENAME: &str = "similarity.ron";

/// Loads engine settings from `{dir}/similarity.ron`. Missing fields take
/// their defaults; a missing or unreadable file yields the defaults.
pub(crate) fn load_settings(dir: &Path) -> EngineSettings {
    let path = dir.join(SETTINGS_FILENAME);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return EngineSettings::default();
        }
        Err(err) => {
            engine_warn!("Failed to read settings from {:?}: {}", path, err);
            return EngineSettings::default();
        }
    };

    match ron::from_str::<EngineSettings>(&content) {
        Ok(settings) => {
            engine_info!("Loaded settings from {:?}", path);
            settings
        }
        Err(err) => {
            engine_warn!("Failed to parse settings from {:?}: {}", path, err);
            EngineSettings::default()
        }
    }
}
