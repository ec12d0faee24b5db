// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Outline search — contour extraction on the edge map, convex hulls ranked by
// area, and closed Douglas-Peucker simplification down to the first
// four-vertex candidate.

use deskewer_core::{DeskewConfig, Outline, Point2, Quad};
use image::GrayImage;
use imageproc::contours::find_contours;
use imageproc::geometry::convex_hull;
use tracing::{debug, instrument};

/// Finds the most plausible document quadrilateral in an edge map.
#[derive(Debug, Clone)]
pub struct OutlineFinder {
    approx_epsilon_pct: f64,
}

impl OutlineFinder {
    pub fn new(config: &DeskewConfig) -> Self {
        Self {
            approx_epsilon_pct: config.approx_epsilon_pct,
        }
    }

    /// Search `edges` for the outline.
    ///
    /// Every contour (outer borders and holes alike) is reduced to its convex
    /// hull. Hulls are tried from largest to smallest area and the first one
    /// whose simplification has exactly four vertices wins. Equal areas keep
    /// extraction order.
    #[instrument(skip_all, fields(width = edges.width(), height = edges.height()))]
    pub fn find(&self, edges: &GrayImage) -> Outline {
        let contours = find_contours::<i32>(edges);

        // Fewer than three points cannot enclose any area.
        let mut hulls: Vec<(f64, Vec<Point2>)> = contours
            .iter()
            .filter(|contour| contour.points.len() >= 3)
            .map(|contour| {
                let hull: Vec<Point2> = convex_hull(contour.points.as_slice())
                    .into_iter()
                    .map(|p| Point2::new(p.x as f32, p.y as f32))
                    .collect();
                (polygon_area(&hull), hull)
            })
            .collect();
        hulls.sort_by(|a, b| b.0.total_cmp(&a.0));
        debug!(
            contours = contours.len(),
            hulls = hulls.len(),
            "Contours reduced to convex hulls"
        );

        for (rank, (area, hull)) in hulls.iter().enumerate() {
            let epsilon = self.approx_epsilon_pct * closed_perimeter(hull);
            let approx = approximate_closed_polygon(hull, epsilon);
            if let [a, b, c, d] = approx[..] {
                debug!(rank, area, "Four-vertex hull selected");
                return Outline::Found(Quad([a, b, c, d]));
            }
        }

        debug!(candidates = hulls.len(), "No hull simplified to four vertices");
        Outline::NotFound
    }
}

/// Shoelace area of a closed polygon.
pub fn polygon_area(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let twice: f64 = (0..n)
        .map(|i| {
            let (p, q) = (points[i], points[(i + 1) % n]);
            p.x as f64 * q.y as f64 - q.x as f64 * p.y as f64
        })
        .sum();
    twice.abs() / 2.0
}

/// Length of a closed polygon, including the edge back to the first vertex.
pub fn closed_perimeter(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 2 {
        return 0.0;
    }
    (0..n)
        .map(|i| points[i].distance(points[(i + 1) % n]) as f64)
        .sum()
}

/// Douglas-Peucker simplification of a closed curve.
///
/// The ring is cut at two mutually distant vertices and each half is
/// simplified as an open chain; vertices closer than `epsilon` to the chord of
/// their chain are dropped. A ring whose extent is within `epsilon`
/// collapses to a single vertex.
pub fn approximate_closed_polygon(points: &[Point2], epsilon: f64) -> Vec<Point2> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let first = farthest_from(points, 0);
    let second = farthest_from(points, first);
    if points[first].distance(points[second]) as f64 <= epsilon {
        return vec![points[first]];
    }

    let mut kept = Vec::new();
    simplify_chain(points, first, second, epsilon, &mut kept);
    simplify_chain(points, second, first, epsilon, &mut kept);
    kept.into_iter().map(|i| points[i]).collect()
}

fn farthest_from(points: &[Point2], origin: usize) -> usize {
    let anchor = points[origin];
    let mut best = origin;
    let mut best_dist = 0.0f32;
    for (i, p) in points.iter().enumerate() {
        let dist = anchor.distance(*p);
        if dist > best_dist {
            best_dist = dist;
            best = i;
        }
    }
    best
}

/// Simplify the chain walking forward (with wrap-around) from `start` to
/// `end`. Pushes the indices of the kept vertices, `start` included and `end`
/// excluded, so two complementary chains tile the ring exactly once.
fn simplify_chain(
    points: &[Point2],
    start: usize,
    end: usize,
    epsilon: f64,
    kept: &mut Vec<usize>,
) {
    let n = points.len();
    let span = (end + n - start) % n;
    let at = |offset: usize| (start + offset) % n;

    let mut keep = vec![false; span + 1];
    keep[0] = true;
    let mut stack = vec![(0usize, span)];

    while let Some((lo, hi)) = stack.pop() {
        if hi <= lo + 1 {
            continue;
        }
        let (a, b) = (points[at(lo)], points[at(hi)]);
        let mut max_dist = 0.0f64;
        let mut split = lo;
        for offset in lo + 1..hi {
            let dist = distance_to_line(points[at(offset)], a, b);
            if dist > max_dist {
                max_dist = dist;
                split = offset;
            }
        }
        if max_dist > epsilon {
            keep[split] = true;
            stack.push((split, hi));
            stack.push((lo, split));
        }
    }

    kept.extend((0..span).filter(|&offset| keep[offset]).map(at));
}

/// Perpendicular distance from `p` to the line through `a` and `b`.
fn distance_to_line(p: Point2, a: Point2, b: Point2) -> f64 {
    let (dx, dy) = ((b.x - a.x) as f64, (b.y - a.y) as f64);
    let length = (dx * dx + dy * dy).sqrt();
    if length == 0.0 {
        return p.distance(a) as f64;
    }
    ((p.x - a.x) as f64 * dy - (p.y - a.y) as f64 * dx).abs() / length
}
