// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rectification — semantic corner ordering, target-size estimation, the
// four-point homography and the perspective warp onto an upright rectangle.

use deskewer_core::error::{DeskewError, ProcessingCause, Result};
use deskewer_core::{OrderedCorners, Outline, Point2, Quad};
use image::{Rgb, RgbImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use tracing::{debug, info, instrument};

const STAGE: &str = "rectify";

/// Label the quad's vertices as top-left, top-right, bottom-right and
/// bottom-left.
///
/// Top-left has the smallest `x + y` and bottom-right the largest; top-right
/// has the smallest `y - x` and bottom-left the largest. A single forward
/// scan with strict comparisons resolves ties in favour of the earlier point.
pub fn order_corners(quad: &Quad) -> OrderedCorners {
    let pts = quad.points();
    let sum = |p: &Point2| p.x + p.y;
    let diff = |p: &Point2| p.y - p.x;

    let (mut min_sum, mut max_sum, mut min_diff, mut max_diff) = (0, 0, 0, 0);
    for (i, p) in pts.iter().enumerate().skip(1) {
        if sum(p) < sum(&pts[min_sum]) {
            min_sum = i;
        }
        if sum(p) > sum(&pts[max_sum]) {
            max_sum = i;
        }
        if diff(p) < diff(&pts[min_diff]) {
            min_diff = i;
        }
        if diff(p) > diff(&pts[max_diff]) {
            max_diff = i;
        }
    }

    OrderedCorners {
        top_left: pts[min_sum],
        top_right: pts[min_diff],
        bottom_right: pts[max_sum],
        bottom_left: pts[max_diff],
    }
}

/// Output `(width, height)`: the longer of each pair of opposite edges, with
/// every edge length truncated to whole pixels.
pub fn target_size(corners: &OrderedCorners) -> (u32, u32) {
    let edge = |a: Point2, b: Point2| a.distance(b) as u32;

    let bottom = edge(corners.bottom_right, corners.bottom_left);
    let top = edge(corners.top_right, corners.top_left);
    let right = edge(corners.top_right, corners.bottom_right);
    let left = edge(corners.top_left, corners.bottom_left);

    (bottom.max(top), right.max(left))
}

/// The projective transform carrying four source points onto four targets.
#[derive(Debug, Clone, Copy)]
pub struct Homography {
    projection: Projection,
}

impl Homography {
    /// Fit the transform that carries each `src[i]` onto `dst[i]`.
    ///
    /// Fails when three of the points on either side lie on one line.
    pub fn from_correspondences(src: &[Point2; 4], dst: &[Point2; 4]) -> Result<Self> {
        if has_collinear_triple(src) || has_collinear_triple(dst) {
            return Err(singular());
        }
        let projection = Projection::from_control_points(
            (*src).map(|p| (p.x, p.y)),
            (*dst).map(|p| (p.x, p.y)),
        )
        .ok_or_else(singular)?;
        Ok(Self { projection })
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Map a point; `None` when it lands on the line at infinity.
    pub fn map(&self, p: Point2) -> Option<Point2> {
        let (x, y) = self.projection * (p.x, p.y);
        (x.is_finite() && y.is_finite()).then(|| Point2::new(x, y))
    }
}

fn singular() -> DeskewError {
    DeskewError::processing(STAGE, ProcessingCause::SingularTransform)
}

fn has_collinear_triple(points: &[Point2; 4]) -> bool {
    const TRIPLES: [[usize; 3]; 4] = [[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]];
    TRIPLES.iter().any(|&[a, b, c]| {
        let (p, q, r) = (points[a], points[b], points[c]);
        let cross = (q.x - p.x) as f64 * (r.y - p.y) as f64
            - (q.y - p.y) as f64 * (r.x - p.x) as f64;
        cross.abs() < 1e-6
    })
}

/// Warp `image` so the region bounded by `corners` fills an upright
/// rectangle sized by [`target_size`].
///
/// Sampling is bilinear; output pixels whose pre-image falls outside the
/// source stay black.
#[instrument(skip_all, fields(width = image.width(), height = image.height()))]
pub fn rectify(image: &RgbImage, corners: &OrderedCorners) -> Result<RgbImage> {
    let (width, height) = target_size(corners);
    if width < 2 || height < 2 {
        return Err(DeskewError::processing(
            STAGE,
            ProcessingCause::DegenerateTarget { width, height },
        ));
    }

    let (right, bottom) = ((width - 1) as f32, (height - 1) as f32);
    let dest = [
        Point2::new(0.0, 0.0),
        Point2::new(right, 0.0),
        Point2::new(right, bottom),
        Point2::new(0.0, bottom),
    ];

    let homography = Homography::from_correspondences(&corners.to_array(), &dest)?;
    debug!(?homography, "Homography fitted");

    let mut output = RgbImage::new(width, height);
    warp_into(
        image,
        homography.projection(),
        Interpolation::Bilinear,
        Rgb([0, 0, 0]),
        &mut output,
    );

    info!(out_w = width, out_h = height, "Perspective correction applied");
    Ok(output)
}

/// [`rectify`] straight from an outline, failing with
/// [`DeskewError::NoBoundary`] when none was found.
pub fn rectify_outline(image: &RgbImage, outline: &Outline) -> Result<RgbImage> {
    let quad = outline.require()?;
    rectify(image, &order_corners(quad))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{SAMPLE_CORNERS, quad_from, synthetic_page};

    fn square_corners() -> [Point2; 4] {
        [
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
        ]
    }

    #[test]
    fn square_orders_the_same_from_every_rotation_and_reflection() {
        let expected = square_corners();
        let mut input = expected;
        for _ in 0..2 {
            for _ in 0..4 {
                input.rotate_left(1);
                assert_eq!(order_corners(&Quad(input)).to_array(), expected);
            }
            input.reverse();
        }
        // A scrambled order too.
        let scrambled = [expected[2], expected[0], expected[3], expected[1]];
        assert_eq!(order_corners(&Quad(scrambled)).to_array(), expected);
    }

    #[test]
    fn ordering_is_a_permutation_and_idempotent() {
        let quads = [
            quad_from([(120, 80), (520, 110), (540, 400), (90, 380)]),
            quad_from([(90, 380), (540, 400), (120, 80), (520, 110)]),
            quad_from([(10, 40), (200, 5), (230, 160), (30, 190)]),
        ];
        for quad in quads {
            let once = order_corners(&quad);
            for p in quad.points() {
                assert!(once.to_array().contains(p), "{p:?} lost from {once:?}");
            }
            assert_eq!(order_corners(&once.as_quad()), once);
        }
    }

    #[test]
    fn ties_favour_the_first_point_scanned() {
        // (10,0), (0,10) and (5,5) all have x + y = 10.
        let quad = Quad([
            Point2::new(10.0, 0.0),
            Point2::new(0.0, 10.0),
            Point2::new(5.0, 5.0),
            Point2::new(20.0, 20.0),
        ]);
        let ordered = order_corners(&quad);
        assert_eq!(ordered.top_left, Point2::new(10.0, 0.0));
        assert_eq!(ordered.bottom_right, Point2::new(20.0, 20.0));
    }

    #[test]
    fn target_size_takes_longer_edges_truncated() {
        let corners = order_corners(&quad_from([(0, 0), (100, 0), (103, 50), (0, 40)]));
        // Bottom edge sqrt(103^2 + 10^2) = 103.48, right edge sqrt(3^2 + 50^2) = 50.09.
        assert_eq!(target_size(&corners), (103, 50));
    }

    #[test]
    fn homography_maps_each_corner_onto_its_target() {
        let src = [
            Point2::new(120.0, 80.0),
            Point2::new(520.0, 110.0),
            Point2::new(540.0, 400.0),
            Point2::new(90.0, 380.0),
        ];
        let dst = [
            Point2::new(0.0, 0.0),
            Point2::new(449.0, 0.0),
            Point2::new(449.0, 300.0),
            Point2::new(0.0, 300.0),
        ];
        let h = Homography::from_correspondences(&src, &dst).unwrap();
        for (s, d) in src.iter().zip(dst.iter()) {
            let mapped = h.map(*s).unwrap();
            assert!(mapped.distance(*d) < 0.05, "{s:?} -> {mapped:?}, expected {d:?}");
        }
    }

    #[test]
    fn collinear_correspondences_are_rejected() {
        let line = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 2.0),
            Point2::new(3.0, 3.0),
        ];
        let err = Homography::from_correspondences(&line, &square_corners()).unwrap_err();
        assert!(matches!(
            err,
            DeskewError::Processing {
                source: ProcessingCause::SingularTransform,
                ..
            }
        ));
    }

    #[test]
    fn collinear_targets_are_rejected() {
        let bent = [
            Point2::new(0.0, 0.0),
            Point2::new(5.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(0.0, 10.0),
        ];
        let err = Homography::from_correspondences(&square_corners(), &bent).unwrap_err();
        assert_eq!(err.kind(), deskewer_core::ErrorKind::ProcessingFailure);
    }

    #[test]
    fn rectify_matches_a_direct_control_point_warp() {
        let image = synthetic_page(640, 480, SAMPLE_CORNERS);
        let corners = order_corners(&quad_from(SAMPLE_CORNERS));
        let out = rectify(&image, &corners).unwrap();

        let (w, h) = out.dimensions();
        let (right, bottom) = ((w - 1) as f32, (h - 1) as f32);
        let dest = [(0.0, 0.0), (right, 0.0), (right, bottom), (0.0, bottom)];
        let projection =
            Projection::from_control_points(corners.to_array().map(|p| (p.x, p.y)), dest).unwrap();
        let mut expected = RgbImage::new(w, h);
        warp_into(
            &image,
            &projection,
            Interpolation::Bilinear,
            Rgb([0, 0, 0]),
            &mut expected,
        );
        assert_eq!(out, expected);
    }

    #[test]
    fn upright_rectangle_is_reproduced() {
        // r encodes x and g encodes y so the warp can be checked per pixel.
        let image = RgbImage::from_fn(200, 150, |x, y| Rgb([x as u8, y as u8, 128]));
        let corners = order_corners(&quad_from([(20, 30), (140, 30), (140, 110), (20, 110)]));

        let out = rectify(&image, &corners).unwrap();
        assert_eq!(out.dimensions(), (120, 80));

        for (u, v, px) in out.enumerate_pixels() {
            let Rgb([r, g, b]) = *px;
            assert!((r as i32 - (20 + u as i32)).abs() <= 2, "r at ({u},{v}) = {r}");
            assert!((g as i32 - (30 + v as i32)).abs() <= 2, "g at ({u},{v}) = {g}");
            assert_eq!(b, 128);
        }
    }

    #[test]
    fn collapsed_outline_is_degenerate() {
        let corners = order_corners(&quad_from([(5, 5), (5, 5), (5, 5), (6, 5)]));
        let err = rectify(&RgbImage::new(20, 20), &corners).unwrap_err();
        assert!(matches!(
            err,
            DeskewError::Processing {
                source: ProcessingCause::DegenerateTarget { .. },
                ..
            }
        ));
    }

    #[test]
    fn missing_outline_is_a_precondition_error() {
        let err = rectify_outline(&RgbImage::new(20, 20), &Outline::NotFound).unwrap_err();
        assert!(matches!(err, DeskewError::NoBoundary));
    }
}
