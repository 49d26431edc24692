use thiserror::Error;

/// Crate-level errors using thiserror for structured error handling.
///
/// These errors represent domain-specific failures that can occur while the
/// sound engine and its collaborators run. They provide context and can be
/// chained with anyhow.

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Failed to load sound asset: {path}")]
    LoadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to decode sound asset")]
    DecodeFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Failed to initialize audio output stream")]
    StreamInitFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Audio playback failed")]
    PlaybackFailed(#[source] Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from {path}")]
    LoadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to save configuration to {path}")]
    SaveFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to create config directory: {path}")]
    DirectoryCreationFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Active-order poll failed")]
    PollFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Live update feed disconnected")]
    FeedDisconnected,
}

/// Type alias for application Results using anyhow for context chaining
pub type AppResult<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_error_display() {
        let err = ConfigError::Invalid("volume out of range".to_string());
        assert_eq!(err.to_string(), "Invalid configuration: volume out of range");

        let err = SyncError::FeedDisconnected;
        assert_eq!(err.to_string(), "Live update feed disconnected");
    }

    #[test]
    fn test_error_source_chain() {
        use std::io;

        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let audio_err = AudioError::LoadFailed {
            path: "sounds/new-order.mp3".to_string(),
            source: Box::new(io_err),
        };

        assert!(audio_err.source().is_some());
        assert_eq!(
            audio_err.to_string(),
            "Failed to load sound asset: sounds/new-order.mp3"
        );
    }
}
