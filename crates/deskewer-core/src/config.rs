// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline and driver configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DeskewError, Result};

/// Detection settings. Fixed for the lifetime of a pipeline instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeskewConfig {
    /// Retain intermediate stage images for inspection.
    pub debug: bool,
    /// Gaussian kernel edge length in pixels. 0 disables smoothing; otherwise odd.
    pub gaussian_blur_kernel_size: u32,
    /// Canny low threshold. The high threshold is derived, see [`Self::edge_thresholds`].
    pub edge_low_threshold: u32,
    /// Polygon simplification tolerance as a fraction of contour perimeter.
    pub approx_epsilon_pct: f64,
}

impl Default for DeskewConfig {
    fn default() -> Self {
        Self {
            debug: false,
            gaussian_blur_kernel_size: 3,
            edge_low_threshold: 75,
            approx_epsilon_pct: 0.02,
        }
    }
}

impl DeskewConfig {
    pub fn blur_enabled(&self) -> bool {
        self.gaussian_blur_kernel_size > 0
    }

    /// Canny `(low, high)` thresholds.
    ///
    /// High is 3x low after smoothing and 2x low without it.
    pub fn edge_thresholds(&self) -> (f32, f32) {
        let low = self.edge_low_threshold as f32;
        let factor = if self.blur_enabled() { 3.0 } else { 2.0 };
        (low, low * factor)
    }

    /// Reject settings the pipeline cannot honour.
    pub fn validate(&self) -> Result<()> {
        let kernel = self.gaussian_blur_kernel_size;
        if kernel > 0 && kernel % 2 == 0 {
            return Err(DeskewError::InvalidConfig(format!(
                "gaussian_blur_kernel_size must be 0 or odd, got {kernel}"
            )));
        }
        if self.edge_low_threshold == 0 {
            return Err(DeskewError::InvalidConfig(
                "edge_low_threshold must be greater than 0".into(),
            ));
        }
        let eps = self.approx_epsilon_pct;
        if !(eps > 0.0 && eps < 1.0) {
            return Err(DeskewError::InvalidConfig(format!(
                "approx_epsilon_pct must lie in (0, 1), got {eps}"
            )));
        }
        Ok(())
    }
}

/// Stroke used when drawing the outline overlays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderStyle {
    /// RGB stroke colour.
    pub color: [u8; 3],
    /// Stroke width in pixels.
    pub thickness: u32,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            color: [0, 0, 255],
            thickness: 3,
        }
    }
}

/// Everything a batch driver needs: detection settings plus overlay style.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    pub deskew: DeskewConfig,
    pub render: RenderStyle,
    /// Also emit a binarized copy of the rectified page.
    pub black_and_white: bool,
}

impl DriverConfig {
    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.deskew.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }
}
