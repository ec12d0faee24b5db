// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanning pipeline — edge-map preprocessing, outline search, corner ordering
// and perspective rectification, and overlay rendering.

pub mod outline;
pub mod preprocess;
pub mod rectify;
pub mod render;

pub use outline::OutlineFinder;
pub use preprocess::{PreprocessStages, Preprocessor};
pub use rectify::{Homography, order_corners, rectify, rectify_outline, target_size};
pub use render::{black_and_white, overlay, transparent_outline};
