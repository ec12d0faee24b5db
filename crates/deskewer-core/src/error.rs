// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Deskewer.

use thiserror::Error;

/// The primitive failure behind a [`DeskewError::Processing`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProcessingCause {
    #[error("image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("Gaussian kernel size must be odd, got {0}")]
    EvenKernel(u32),

    #[error("target rectangle is degenerate ({width}x{height})")]
    DegenerateTarget { width: u32, height: u32 },

    #[error("point correspondences do not determine a projective transform")]
    SingularTransform,
}

/// Coarse classification callers can branch on.
///
/// "Not found" is deliberately absent: a missing outline is a value
/// (`Outline::NotFound`), not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A primitive image-processing step failed. Deterministic; do not retry.
    ProcessingFailure,
    /// An operation was called without the state it needs.
    PreconditionViolation,
    /// The configuration was rejected at construction time.
    Configuration,
    /// File, codec, or serialization failure in a driver.
    Io,
}

/// Top-level error type for all Deskewer operations.
#[derive(Debug, Error)]
pub enum DeskewError {
    // -- Pipeline errors --
    #[error("image processing failed during {stage}: {source}")]
    Processing {
        stage: &'static str,
        #[source]
        source: ProcessingCause,
    },

    #[error("no document boundary available")]
    NoBoundary,

    #[error("no image has been set")]
    NoImage,

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // -- Driver I/O --
    #[error("image codec error: {0}")]
    Codec(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DeskewError {
    /// Wrap a primitive failure raised inside a named pipeline stage.
    pub fn processing(stage: &'static str, source: ProcessingCause) -> Self {
        Self::Processing { stage, source }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Processing { .. } => ErrorKind::ProcessingFailure,
            Self::NoBoundary | Self::NoImage => ErrorKind::PreconditionViolation,
            Self::InvalidConfig(_) => ErrorKind::Configuration,
            Self::Codec(_) | Self::Io(_) | Self::Serialization(_) => ErrorKind::Io,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DeskewError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn processing_error_keeps_its_cause() {
        let err = DeskewError::processing("rectify", ProcessingCause::SingularTransform);
        assert_eq!(err.kind(), ErrorKind::ProcessingFailure);

        let cause = err.source().expect("cause attached");
        assert_eq!(
            cause.to_string(),
            "point correspondences do not determine a projective transform"
        );
        assert!(err.to_string().contains("rectify"));
    }

    #[test]
    fn precondition_errors_are_classified() {
        assert_eq!(DeskewError::NoBoundary.kind(), ErrorKind::PreconditionViolation);
        assert_eq!(DeskewError::NoImage.kind(), ErrorKind::PreconditionViolation);
        assert_eq!(
            DeskewError::InvalidConfig("x".into()).kind(),
            ErrorKind::Configuration
        );
    }
}
