use crate::config::{GestureConfig, SceneConfig};
use crate::error::SettingsError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Contents of `config.toml`; every key is optional
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub scene: SceneSettings,
    #[serde(default)]
    pub audio: AudioSettings,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct SceneSettings {
    pub fps: Option<u32>,
    pub seed: Option<u64>,
    pub swipe_distance: Option<f32>,
    pub tap_tolerance: Option<f32>,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct AudioSettings {
    pub enabled: Option<bool>,
    pub music: Option<bool>,
}

impl Settings {
    /// Load from the default location. A missing file is silently the
    /// default; a broken one is logged and ignored.
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(settings) => {
                debug!(path = %path.display(), "loaded settings");
                settings
            }
            Err(err) => {
                warn!(error = %err, "ignoring settings file");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("goldenrain")
            .join("config.toml")
    }

    /// Fold file values over the defaults
    pub fn scene_config(&self) -> SceneConfig {
        let defaults = SceneConfig::default();
        let gestures = GestureConfig {
            swipe_distance: self
                .scene
                .swipe_distance
                .unwrap_or(defaults.gestures.swipe_distance),
            tap_tolerance: self
                .scene
                .tap_tolerance
                .unwrap_or(defaults.gestures.tap_tolerance),
            ..defaults.gestures
        };
        SceneConfig {
            fps: self.scene.fps.unwrap_or(defaults.fps),
            seed: self.scene.seed,
            audio: self.audio.enabled.unwrap_or(defaults.audio),
            music: self.audio.music.unwrap_or(defaults.music),
            gestures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Settings;
    use crate::config::SceneConfig;
    use crate::error::SettingsError;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    #[test]
    fn empty_file_means_defaults() {
        let settings = Settings::parse("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.scene_config(), SceneConfig::default());
    }

    #[test]
    fn partial_tables_override_only_named_keys() {
        let settings = Settings::parse(
            "[scene]\nfps = 30\nswipe_distance = 14.0\n\n[audio]\nmusic = false\n",
        )
        .unwrap();
        let cfg = settings.scene_config();
        assert_eq!(cfg.fps, 30);
        assert!(!cfg.music);
        assert!(cfg.audio);
        assert_eq!(cfg.gestures.swipe_distance, 14.0);
        assert_eq!(cfg.gestures.tap_window_ms, 500);
    }

    #[test]
    fn wrong_types_are_parse_errors() {
        assert!(Settings::parse("[scene]\nfps = \"fast\"\n").is_err());
    }

    #[test]
    fn missing_path_reports_io_error() {
        let err = Settings::load_from(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, SettingsError::Io { .. }));
    }
}
