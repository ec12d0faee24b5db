// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core geometry types shared by the detection and rectification stages.

use serde::{Deserialize, Serialize};

use crate::error::{DeskewError, Result};

/// A point in source-image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: Point2) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

impl From<(f32, f32)> for Point2 {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// Four vertices of a detected document boundary, in detection order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quad(pub [Point2; 4]);

impl Quad {
    pub fn points(&self) -> &[Point2; 4] {
        &self.0
    }

    /// Enclosed area via the shoelace formula. Vertex order may be CW or CCW.
    pub fn area(&self) -> f32 {
        let pts = &self.0;
        let mut twice = 0.0f32;
        for i in 0..pts.len() {
            let j = (i + 1) % pts.len();
            twice += pts[i].x * pts[j].y - pts[j].x * pts[i].y;
        }
        twice.abs() / 2.0
    }
}

/// Result of the outline search for one source image.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Outline {
    /// A 4-vertex boundary was found.
    Found(Quad),
    /// No contour simplified to exactly four vertices.
    #[default]
    NotFound,
}

impl Outline {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn quad(&self) -> Option<&Quad> {
        match self {
            Self::Found(quad) => Some(quad),
            Self::NotFound => None,
        }
    }

    /// The outline vertices: four when found, none otherwise.
    pub fn points(&self) -> &[Point2] {
        match self {
            Self::Found(quad) => &quad.0,
            Self::NotFound => &[],
        }
    }

    /// Borrow the quad, or fail with [`DeskewError::NoBoundary`].
    pub fn require(&self) -> Result<&Quad> {
        self.quad().ok_or(DeskewError::NoBoundary)
    }
}

/// Outline corners in fixed semantic order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderedCorners {
    pub top_left: Point2,
    pub top_right: Point2,
    pub bottom_right: Point2,
    pub bottom_left: Point2,
}

impl OrderedCorners {
    /// `[top_left, top_right, bottom_right, bottom_left]`.
    pub fn to_array(&self) -> [Point2; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    pub fn as_quad(&self) -> Quad {
        Quad(self.to_array())
    }
}
