use std::path::PathBuf;
use thiserror::Error;

/// Failure reading the optional settings file
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Failure opening the sound output. Never fatal; the scene falls back to
/// silence.
#[derive(Debug, Error)]
pub enum AudioError {
    #[cfg(feature = "sound")]
    #[error("no audio output device available")]
    NoDevice,
    #[cfg(not(feature = "sound"))]
    #[error("audio support not compiled in (enable the `sound` feature)")]
    Unsupported,
    #[cfg(feature = "sound")]
    #[error("cannot query output config: {0}")]
    Config(#[from] cpal::DefaultStreamConfigError),
    #[cfg(feature = "sound")]
    #[error("cannot build output stream: {0}")]
    Build(#[from] cpal::BuildStreamError),
    #[cfg(feature = "sound")]
    #[error("cannot start output stream: {0}")]
    Play(#[from] cpal::PlayStreamError),
}
