use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while talking to the music catalog.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("YouTube Music rejected the session (HTTP {0}). The credential is invalid or expired.")]
    Unauthorized(u16),

    #[error("YouTube Music reports the session as signed out. The credential is invalid or expired.")]
    SignedOut,

    #[error("Conflicting playlist edit (HTTP 409)")]
    Conflict,

    #[error("YouTube Music returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Invalid credential: {0}")]
    InvalidCredential(String),
}

impl ApiError {
    /// True when the service refused the credential itself.
    ///
    /// These errors end the run; everything else is treated as a transient
    /// failure of a single request.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            ApiError::Unauthorized(_) | ApiError::SignedOut | ApiError::InvalidCredential(_)
        )
    }
}

/// Errors raised while resolving the run configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot resolve {field}: {reason}")]
    Unresolved { field: &'static str, reason: String },

    #[error("Invalid privacy setting '{0}'. Use public, private or unlisted.")]
    InvalidPrivacy(String),

    #[error("Cannot read prompt answer: {0}")]
    Prompt(#[from] std::io::Error),
}

/// Errors raised by the credential store and the capture flow.
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("No usable authentication file at '{}': {reason}", path.display())]
    Missing { path: PathBuf, reason: String },

    #[error("Authentication file '{}' is invalid: {reason}", path.display())]
    Invalid { path: PathBuf, reason: String },

    #[error("Authentication setup aborted: {0}")]
    CaptureAborted(String),

    #[error("Cannot write authentication file '{}': {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while loading the query file.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("Input file '{}' not found", .0.display())]
    NotFound(PathBuf),

    #[error("No song queries found in file: {}", .0.display())]
    Empty(PathBuf),

    #[error("Cannot read input file '{}': {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while creating and filling the playlist.
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Failed to create playlist: {0}")]
    CreateFailed(#[source] ApiError),

    #[error(
        "Playlist {playlist_id} was created but only {added} track(s) could be added: {source}"
    )]
    TracksAddFailed {
        playlist_id: String,
        added: usize,
        #[source]
        source: ApiError,
    },
}

/// Every fatal error of a run.
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error("Authentication expired while searching: {0}")]
    AuthExpired(#[source] ApiError),

    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error("Operation cancelled by user.")]
    Cancelled,
}
