/*!
    Error taxonomy shared by every stage of the decode pipeline.
*/

use thiserror::Error;

/**
    Convenience alias used throughout the media crates.
*/
pub type Result<T, E = Error> = std::result::Result<T, E>;

/**
    Errors raised while setting up or running a decode pipeline.

    Every variant records the `stage` that failed (usually the FFmpeg call or
    pipeline step) and a short human-readable `reason`. None of them are
    retried: the pipeline fails fast and releases its resources.
*/
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    // ── Setup ──────────────────────────────────────────────────────────
    #[error("{stage}: allocation failed: {reason}")]
    Allocation { stage: &'static str, reason: String },
    #[error("{stage}: could not open: {reason}")]
    Open { stage: &'static str, reason: String },
    #[error("{stage}: no usable video stream: {reason}")]
    UnsupportedStream { stage: &'static str, reason: String },

    // ── Streaming ──────────────────────────────────────────────────────
    #[error("{stage}: i/o error: {reason}")]
    Io { stage: &'static str, reason: String },
    #[error("{stage}: decode failed: {reason}")]
    Decode { stage: &'static str, reason: String },

    // ── API misuse ─────────────────────────────────────────────────────
    #[error("{operation} is not allowed while the pipeline is {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },
}

/**
    Coarse classification of an [`Error`], without its payload.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Allocation,
    Open,
    UnsupportedStream,
    Io,
    Decode,
    InvalidState,
}

impl Error {
    pub fn allocation(stage: &'static str, reason: impl Into<String>) -> Self {
        Self::Allocation {
            stage,
            reason: reason.into(),
        }
    }

    pub fn open(stage: &'static str, reason: impl Into<String>) -> Self {
        Self::Open {
            stage,
            reason: reason.into(),
        }
    }

    pub fn unsupported_stream(stage: &'static str, reason: impl Into<String>) -> Self {
        Self::UnsupportedStream {
            stage,
            reason: reason.into(),
        }
    }

    pub fn io(stage: &'static str, reason: impl Into<String>) -> Self {
        Self::Io {
            stage,
            reason: reason.into(),
        }
    }

    pub fn decode(stage: &'static str, reason: impl Into<String>) -> Self {
        Self::Decode {
            stage,
            reason: reason.into(),
        }
    }

    pub fn invalid_state(operation: &'static str, state: &'static str) -> Self {
        Self::InvalidState { operation, state }
    }

    /**
        Returns the kind of this error.
    */
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Allocation { .. } => ErrorKind::Allocation,
            Self::Open { .. } => ErrorKind::Open,
            Self::UnsupportedStream { .. } => ErrorKind::UnsupportedStream,
            Self::Io { .. } => ErrorKind::Io,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::InvalidState { .. } => ErrorKind::InvalidState,
        }
    }

    /**
        Returns the stage (or operation) that produced this error.
    */
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Allocation { stage, .. }
            | Self::Open { stage, .. }
            | Self::UnsupportedStream { stage, .. }
            | Self::Io { stage, .. }
            | Self::Decode { stage, .. } => stage,
            Self::InvalidState { operation, .. } => operation,
        }
    }
}
