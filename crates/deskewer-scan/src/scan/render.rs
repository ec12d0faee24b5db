// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rendering — outline overlays for inspection and compositing, and global
// Otsu binarization of the rectified page.

use deskewer_core::error::Result;
use deskewer_core::{Outline, Quad};
use image::{GrayImage, Rgb, RgbImage, Rgba, RgbaImage};
use imageproc::contrast::{ThresholdType, otsu_level, threshold};
use imageproc::drawing::{Canvas, draw_line_segment_mut};
use tracing::{debug, instrument};

/// Background of [`transparent_outline`]: white with zero alpha.
const CLEAR: Rgba<u8> = Rgba([255, 255, 255, 0]);

/// Draw the outline on a copy of `base`.
#[instrument(skip(base, outline))]
pub fn overlay(
    base: &RgbImage,
    outline: &Outline,
    color: Rgb<u8>,
    thickness: u32,
) -> Result<RgbImage> {
    let quad = outline.require()?;
    let mut canvas = base.clone();
    stroke_outline(&mut canvas, quad, color, thickness);
    Ok(canvas)
}

/// Draw the outline alone on a fully transparent `width` x `height` canvas.
///
/// Stroke pixels are opaque; every other pixel has alpha 0.
#[instrument(skip(outline))]
pub fn transparent_outline(
    size: (u32, u32),
    outline: &Outline,
    color: Rgb<u8>,
    thickness: u32,
) -> Result<RgbaImage> {
    let quad = outline.require()?;
    let (width, height) = size;
    let mut canvas = RgbaImage::from_pixel(width, height, CLEAR);
    let Rgb([r, g, b]) = color;
    stroke_outline(&mut canvas, quad, Rgba([r, g, b, 255]), thickness);
    Ok(canvas)
}

/// Grayscale, then threshold at the Otsu level: brighter than the level
/// becomes white, everything else black.
#[instrument(skip_all, fields(width = image.width(), height = image.height()))]
pub fn black_and_white(image: &RgbImage) -> GrayImage {
    let gray = image::imageops::grayscale(image);
    let level = otsu_level(&gray);
    debug!(level, "Otsu threshold computed");
    threshold(&gray, level, ThresholdType::Binary)
}

/// Stroke the closed outline. Vertices are truncated to whole pixels.
///
/// Thickness 0 and 1 draw a one-pixel line; wider strokes sweep a round
/// brush exactly `thickness` pixels across.
fn stroke_outline<C>(canvas: &mut C, quad: &Quad, color: C::Pixel, thickness: u32)
where
    C: Canvas,
{
    let vertices = quad.0.map(|p| (p.x as i32, p.y as i32));
    let brush = (thickness > 1).then(|| round_brush(thickness));

    for (i, &start) in vertices.iter().enumerate() {
        let end = vertices[(i + 1) % vertices.len()];
        match &brush {
            None => draw_line_segment_mut(
                canvas,
                (start.0 as f32, start.1 as f32),
                (end.0 as f32, end.1 as f32),
                color,
            ),
            Some(brush) => stamp_segment(canvas, start, end, brush, color),
        }
    }
}

/// Pixel offsets covered by a disc of diameter `thickness`.
///
/// Even widths put the disc centre between pixels, so the offsets run
/// `-(t - 1) / 2 ..= t / 2` on both axes.
fn round_brush(thickness: u32) -> Vec<(i32, i32)> {
    let t = thickness as i32;
    let (lo, hi) = (-((t - 1) / 2), t / 2);
    let centre = (lo + hi) as f32 / 2.0;
    let radius_sq = (thickness as f32 / 2.0).powi(2);

    let mut offsets = Vec::new();
    for dy in lo..=hi {
        for dx in lo..=hi {
            let (fx, fy) = (dx as f32 - centre, dy as f32 - centre);
            if fx * fx + fy * fy <= radius_sq {
                offsets.push((dx, dy));
            }
        }
    }
    offsets
}

fn stamp_segment<C>(
    canvas: &mut C,
    start: (i32, i32),
    end: (i32, i32),
    brush: &[(i32, i32)],
    color: C::Pixel,
) where
    C: Canvas,
{
    let (width, height) = canvas.dimensions();
    let (dx, dy) = (end.0 - start.0, end.1 - start.1);
    let steps = dx.abs().max(dy.abs()).max(1);
    for step in 0..=steps {
        let t = step as f32 / steps as f32;
        let cx = (start.0 as f32 + dx as f32 * t).round() as i32;
        let cy = (start.1 as f32 + dy as f32 * t).round() as i32;
        for &(ox, oy) in brush {
            let (x, y) = (cx + ox, cy + oy);
            if x >= 0 && y >= 0 && (x as u32) < width && (y as u32) < height {
                canvas.draw_pixel(x as u32, y as u32, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::quad_from;
    use image::Luma;

    const BLUE: Rgb<u8> = Rgb([0, 0, 255]);

    fn outline() -> Outline {
        Outline::Found(quad_from([(20, 20), (100, 25), (95, 80), (25, 75)]))
    }

    #[test]
    fn overlay_keeps_dimensions_and_marks_the_outline() {
        let base = RgbImage::from_pixel(120, 100, Rgb([200, 200, 200]));
        let out = overlay(&base, &outline(), BLUE, 3).unwrap();

        assert_eq!(out.dimensions(), base.dimensions());
        assert_eq!(*out.get_pixel(20, 20), BLUE);
        assert_eq!(*out.get_pixel(60, 50), Rgb([200, 200, 200]));
        assert_eq!(*out.get_pixel(5, 95), Rgb([200, 200, 200]));
    }

    #[test]
    fn transparent_outline_is_clear_off_the_stroke() {
        let out = transparent_outline((120, 100), &outline(), BLUE, 3).unwrap();
        assert_eq!(out.dimensions(), (120, 100));

        let mut stroke = 0;
        for pixel in out.pixels() {
            match pixel.0[3] {
                0 => {}
                255 => {
                    assert_eq!(&pixel.0[..3], &[0, 0, 255]);
                    stroke += 1;
                }
                alpha => panic!("partial alpha {alpha}"),
            }
        }
        assert!(stroke > 0);
        assert_eq!(out.get_pixel(60, 50).0[3], 0);
        assert_eq!(out.get_pixel(100, 25).0[3], 255);
    }

    #[test]
    fn zero_thickness_still_draws_a_hairline() {
        let out = transparent_outline((120, 100), &outline(), BLUE, 0).unwrap();
        assert!(out.pixels().any(|p| p.0[3] == 255));
    }

    #[test]
    fn stroke_width_tracks_thickness() {
        let square = Outline::Found(quad_from([(10, 20), (90, 20), (90, 80), (10, 80)]));
        for thickness in 1..=6 {
            let out = transparent_outline((100, 100), &square, BLUE, thickness).unwrap();
            // Column through the middle of the top edge, above the bottom edge.
            let width = (0..50).filter(|&y| out.get_pixel(50, y).0[3] == 255).count();
            assert_eq!(width, thickness as usize, "thickness {thickness}");
        }
    }

    #[test]
    fn rendering_without_outline_fails() {
        let base = RgbImage::new(10, 10);
        assert!(overlay(&base, &Outline::NotFound, BLUE, 1).is_err());
        assert!(transparent_outline((10, 10), &Outline::NotFound, BLUE, 1).is_err());
    }

    #[test]
    fn otsu_splits_two_tones() {
        let gray = GrayImage::from_fn(40, 40, |x, _| Luma([if x < 15 { 50 } else { 200 }]));
        let level = otsu_level(&gray);
        assert!((50..200).contains(&level), "level {level}");
    }

    #[test]
    fn black_and_white_is_binary() {
        let image = RgbImage::from_fn(40, 40, |x, y| {
            let v = if (x / 10 + y / 10) % 2 == 0 { 30 } else { 220 };
            Rgb([v, v, v])
        });
        let bw = black_and_white(&image);
        assert_eq!(bw.dimensions(), (40, 40));
        assert_eq!(bw.get_pixel(0, 0).0[0], 0);
        assert_eq!(bw.get_pixel(10, 0).0[0], 255);
        assert!(bw.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
    }
}
