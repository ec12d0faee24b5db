// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for people running the deskewer on their own
// photos.
//
// Every technical error is mapped to plain English with a clear suggestion.

use crate::error::{DeskewError, ProcessingCause};

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The user must change something (retake the photo, fix a setting).
    ActionRequired,
    /// Retrying with the same input and settings gives the same result.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary.
    pub message: String,
    /// What the user should try.
    pub suggestion: String,
    /// Severity level.
    pub severity: Severity,
}

/// Convert a `DeskewError` into a `HumanError`.
pub fn humanize_error(err: &DeskewError) -> HumanError {
    match err {
        DeskewError::Processing { source, .. } => humanize_processing(source),

        DeskewError::NoBoundary => HumanError {
            message: "We couldn't find the edges of the page.".into(),
            suggestion: "Photograph the page on a plain, contrasting surface with all four corners in view.".into(),
            severity: Severity::ActionRequired,
        },

        DeskewError::NoImage => HumanError {
            message: "There is no photo to work on yet.".into(),
            suggestion: "Load a photo first, then try again.".into(),
            severity: Severity::ActionRequired,
        },

        DeskewError::InvalidConfig(detail) => HumanError {
            message: "One of the settings isn't allowed.".into(),
            suggestion: format!("Fix the setting and run again. ({detail})"),
            severity: Severity::ActionRequired,
        },

        DeskewError::Codec(detail) => HumanError {
            message: "This file couldn't be read or written as an image.".into(),
            suggestion: format!("Make sure the file is a JPEG or PNG photo. ({detail})"),
            severity: Severity::Permanent,
        },

        DeskewError::Io(io) => HumanError {
            message: "A file couldn't be opened or saved.".into(),
            suggestion: format!("Check that the file exists and the folder is writable. ({io})"),
            severity: Severity::ActionRequired,
        },

        DeskewError::Serialization(detail) => HumanError {
            message: "The settings file couldn't be understood.".into(),
            suggestion: format!("Check the settings file is valid JSON. ({detail})"),
            severity: Severity::ActionRequired,
        },
    }
}

fn humanize_processing(cause: &ProcessingCause) -> HumanError {
    match cause {
        ProcessingCause::EmptyImage { .. } => HumanError {
            message: "The photo is empty.".into(),
            suggestion: "Use a photo that actually contains a picture.".into(),
            severity: Severity::Permanent,
        },
        ProcessingCause::DegenerateTarget { .. } | ProcessingCause::SingularTransform => {
            HumanError {
                message: "The page outline we found is too thin to straighten.".into(),
                suggestion: "Take the photo from more directly above the page.".into(),
                severity: Severity::ActionRequired,
            }
        }
        ProcessingCause::EvenKernel(size) => HumanError {
            message: "The blur setting isn't allowed.".into(),
            suggestion: format!("Use 0 or an odd blur size instead of {size}."),
            severity: Severity::ActionRequired,
        },
    }
}
