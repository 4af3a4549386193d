/// Convenience result type used across roundnote.
pub type BotResult<T> = Result<T, BotError>;

/// Error taxonomy shared by the media pipeline, the dialogue handlers and the transport.
///
/// Every variant except [`BotError::ConfigurationMissing`] is recoverable: handlers turn it into a
/// user-visible message plus a state transition.
#[derive(thiserror::Error, Debug)]
pub enum BotError {
    /// The user sent the wrong kind or format of input for the current state.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Fetching an attachment from the transport failed.
    #[error("download failed: {0}")]
    DownloadFailed(String),

    /// Corrupt or unsupported container, codec or image.
    #[error("unreadable media: {0}")]
    UnreadableMedia(String),

    /// Media decoded but has zero duration or zero dimensions.
    #[error("empty media: {0}")]
    EmptyMedia(String),

    /// Encoding or muxing the output artifact failed.
    #[error("encode failed: {0}")]
    EncodeFailed(String),

    /// The URL-shortening collaborator failed.
    #[error("shorten failed: {0}")]
    ShortenFailed(String),

    /// The UTM URL could not be assembled.
    #[error("url build failed: {0}")]
    UrlBuildFailed(String),

    /// A required configuration value is absent. Fatal at startup only.
    #[error("configuration missing: {0}")]
    ConfigurationMissing(String),

    /// Invalid internal arguments (dimensions, frame rates, sizes).
    #[error("validation error: {0}")]
    Validation(String),

    /// Outbound delivery through the chat transport failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BotError {
    /// Build a [`BotError::InvalidInput`] value.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Build a [`BotError::DownloadFailed`] value.
    pub fn download_failed(msg: impl Into<String>) -> Self {
        Self::DownloadFailed(msg.into())
    }

    /// Build a [`BotError::UnreadableMedia`] value.
    pub fn unreadable_media(msg: impl Into<String>) -> Self {
        Self::UnreadableMedia(msg.into())
    }

    /// Build a [`BotError::EmptyMedia`] value.
    pub fn empty_media(msg: impl Into<String>) -> Self {
        Self::EmptyMedia(msg.into())
    }

    /// Build a [`BotError::EncodeFailed`] value.
    pub fn encode_failed(msg: impl Into<String>) -> Self {
        Self::EncodeFailed(msg.into())
    }

    /// Build a [`BotError::ShortenFailed`] value.
    pub fn shorten_failed(msg: impl Into<String>) -> Self {
        Self::ShortenFailed(msg.into())
    }

    /// Build a [`BotError::UrlBuildFailed`] value.
    pub fn url_build_failed(msg: impl Into<String>) -> Self {
        Self::UrlBuildFailed(msg.into())
    }

    /// Build a [`BotError::ConfigurationMissing`] value.
    pub fn configuration_missing(msg: impl Into<String>) -> Self {
        Self::ConfigurationMissing(msg.into())
    }

    /// Build a [`BotError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`BotError::Transport`] value.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// `false` only for errors that must stop the process.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::ConfigurationMissing(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
