// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Synthetic fixtures shared by the unit tests.

use deskewer_core::{Point2, Quad};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;

pub(crate) const BACKGROUND: Rgb<u8> = Rgb([40, 45, 50]);
pub(crate) const PAPER: Rgb<u8> = Rgb([235, 235, 230]);

/// A skewed page that fits comfortably inside a 640x480 frame.
/// Order: top-left, top-right, bottom-right, bottom-left.
pub(crate) const SAMPLE_CORNERS: [(i32, i32); 4] = [(120, 80), (520, 110), (540, 400), (90, 380)];

/// A light filled quadrilateral on a dark background.
pub(crate) fn synthetic_page(width: u32, height: u32, corners: [(i32, i32); 4]) -> RgbImage {
    let mut image = RgbImage::from_pixel(width, height, BACKGROUND);
    let polygon: Vec<Point<i32>> = corners.iter().map(|&(x, y)| Point::new(x, y)).collect();
    draw_polygon_mut(&mut image, &polygon, PAPER);
    image
}

pub(crate) fn quad_from(corners: [(i32, i32); 4]) -> Quad {
    Quad(corners.map(|(x, y)| Point2::new(x as f32, y as f32)))
}
