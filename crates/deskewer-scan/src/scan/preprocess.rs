// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Preprocessing — grayscale conversion, optional Gaussian smoothing and Canny
// edge detection, producing the binary edge map the outline search runs on.

use deskewer_core::DeskewConfig;
use deskewer_core::error::{DeskewError, ProcessingCause, Result};
use image::{GrayImage, RgbImage};
use imageproc::edges::canny;
use imageproc::filter::separable_filter_equal;
use tracing::{debug, info, instrument};

const STAGE: &str = "preprocess";

/// Intermediate images produced while building an edge map.
#[derive(Debug, Clone)]
pub struct PreprocessStages {
    /// Single-channel luma of the source.
    pub gray: GrayImage,
    /// Smoothed luma, present only when blurring is enabled.
    pub blurred: Option<GrayImage>,
    /// Binary edge map: 255 on edges, 0 elsewhere.
    pub edges: GrayImage,
}

/// Turns a colour photo into a binary edge map.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    blur_kernel: u32,
    low_threshold: f32,
    high_threshold: f32,
}

impl Preprocessor {
    pub fn new(config: &DeskewConfig) -> Self {
        let (low_threshold, high_threshold) = config.edge_thresholds();
        Self {
            blur_kernel: config.gaussian_blur_kernel_size,
            low_threshold,
            high_threshold,
        }
    }

    /// Canny `(low, high)` thresholds in use.
    pub fn thresholds(&self) -> (f32, f32) {
        (self.low_threshold, self.high_threshold)
    }

    /// Build the edge map for `image`, discarding the intermediate stages.
    pub fn process(&self, image: &RgbImage) -> Result<GrayImage> {
        Ok(self.process_with_stages(image)?.edges)
    }

    /// Build the edge map and keep every intermediate image.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn process_with_stages(&self, image: &RgbImage) -> Result<PreprocessStages> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(DeskewError::processing(
                STAGE,
                ProcessingCause::EmptyImage { width, height },
            ));
        }

        let gray = image::imageops::grayscale(image);
        debug!("Converted to grayscale");

        let blurred = if self.blur_kernel > 0 {
            let kernel = gaussian_kernel(self.blur_kernel)?;
            debug!(kernel_size = self.blur_kernel, "Applying Gaussian blur");
            Some(separable_filter_equal(&gray, kernel.as_slice()))
        } else {
            None
        };

        let edges = canny(
            blurred.as_ref().unwrap_or(&gray),
            self.low_threshold,
            self.high_threshold,
        );
        info!(
            low = self.low_threshold,
            high = self.high_threshold,
            blurred = blurred.is_some(),
            "Edge map computed"
        );

        Ok(PreprocessStages {
            gray,
            blurred,
            edges,
        })
    }
}

/// Normalised 1-D Gaussian weights for an odd kernel of `size` taps.
///
/// Sizes up to 7 use the fixed binomial tables; larger sizes derive sigma from
/// the size as `0.3 * ((size - 1) * 0.5 - 1) + 0.8`.
pub fn gaussian_kernel(size: u32) -> Result<Vec<f32>> {
    if size % 2 == 0 {
        return Err(DeskewError::processing(
            STAGE,
            ProcessingCause::EvenKernel(size),
        ));
    }

    let fixed: &[f32] = match size {
        1 => &[1.0],
        3 => &[0.25, 0.5, 0.25],
        5 => &[0.0625, 0.25, 0.375, 0.25, 0.0625],
        7 => &[
            0.03125, 0.109375, 0.21875, 0.28125, 0.21875, 0.109375, 0.03125,
        ],
        _ => &[],
    };
    if !fixed.is_empty() {
        return Ok(fixed.to_vec());
    }

    let sigma = 0.3 * ((size as f64 - 1.0) * 0.5 - 1.0) + 0.8;
    let half = (size / 2) as i64;
    let weights: Vec<f64> = (-half..=half)
        .map(|i| (-((i * i) as f64) / (2.0 * sigma * sigma)).exp())
        .collect();
    let total: f64 = weights.iter().sum();
    Ok(weights.iter().map(|w| (w / total) as f32).collect())
}
