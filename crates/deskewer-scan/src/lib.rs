// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// deskewer-scan — Document detection and rectification for Deskewer.
//
// Turns a photo into a binary edge map, finds the page outline among the
// edge contours, orders its corners, and warps the page onto an upright
// rectangle. Overlay rendering and Otsu binarization round out the outputs.

mod deskewer;
pub mod scan;

#[cfg(test)]
mod test_utils;

// Re-export the primary structs so callers can use `deskewer_scan::Deskewer` etc.
pub use deskewer::Deskewer;
pub use scan::outline::OutlineFinder;
pub use scan::preprocess::{PreprocessStages, Preprocessor};
pub use scan::rectify::Homography;
