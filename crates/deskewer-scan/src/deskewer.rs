// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Deskewer — the stateful pipeline facade. Holds one source image at a time
// together with everything derived from it.

use deskewer_core::DeskewConfig;
use deskewer_core::error::{DeskewError, Result};
use deskewer_core::{OrderedCorners, Outline};
use image::{DynamicImage, GrayImage, Rgb, RgbImage, RgbaImage};
use tracing::{info, instrument, warn};

use crate::scan::outline::OutlineFinder;
use crate::scan::preprocess::{PreprocessStages, Preprocessor};
use crate::scan::{rectify, render};

/// Everything derived from one source image.
///
/// Edge map and outline are computed eagerly when the image is set; corners
/// and the rectified page are filled in on first request.
struct Generation {
    id: u64,
    source: RgbImage,
    outline: Outline,
    corners: Option<OrderedCorners>,
    rectified: Option<RgbImage>,
    stages: Option<PreprocessStages>,
}

/// Finds a document in a photo and produces its deskewed rendering.
///
/// ```ignore
/// let mut deskewer = Deskewer::new(DeskewConfig::default())?;
/// if deskewer.set_image(photo)?.is_found() {
///     let page = deskewer.deskewed_image()?;
///     let overlay = deskewer.overlayed_image(Rgb([0, 0, 255]), 3)?;
/// }
/// ```
///
/// Calls take `&mut self` where caches are filled, so sharing one instance
/// across threads needs external serialisation (e.g. a `Mutex`).
pub struct Deskewer {
    config: DeskewConfig,
    preprocessor: Preprocessor,
    finder: OutlineFinder,
    last_generation: u64,
    current: Option<Generation>,
}

impl Deskewer {
    // -- Construction ---------------------------------------------------------

    /// Validate `config` and build an empty pipeline.
    pub fn new(config: DeskewConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            preprocessor: Preprocessor::new(&config),
            finder: OutlineFinder::new(&config),
            config,
            last_generation: 0,
            current: None,
        })
    }

    pub fn config(&self) -> &DeskewConfig {
        &self.config
    }

    // -- Input ----------------------------------------------------------------

    /// Replace the current image, discarding everything derived from the
    /// previous one, and search the new image for its outline.
    ///
    /// On error the previous image and its results stay in place.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn set_image(&mut self, image: RgbImage) -> Result<&Outline> {
        let stages = self.preprocessor.process_with_stages(&image)?;
        let outline = self.finder.find(&stages.edges);

        let id = self.last_generation + 1;
        self.last_generation = id;
        match &outline {
            Outline::Found(quad) => {
                info!(generation = id, corners = ?quad.points(), "Outline found")
            }
            Outline::NotFound => warn!(generation = id, "No document outline in image"),
        }

        let generation = self.current.insert(Generation {
            id,
            source: image,
            outline,
            corners: None,
            rectified: None,
            // Without debug the edge map is dropped here.
            stages: self.config.debug.then_some(stages),
        });
        Ok(&generation.outline)
    }

    /// [`Self::set_image`] for any decoded image; converted to 8-bit RGB.
    pub fn set_dynamic_image(&mut self, image: &DynamicImage) -> Result<&Outline> {
        self.set_image(image.to_rgb8())
    }

    // -- Accessors ------------------------------------------------------------

    /// Id of the current image: 0 before the first `set_image`, then
    /// incremented by every successful call.
    pub fn generation(&self) -> u64 {
        self.current.as_ref().map_or(0, |generation| generation.id)
    }

    pub fn source_image(&self) -> Result<&RgbImage> {
        Ok(&self.current()?.source)
    }

    pub fn outline(&self) -> Result<&Outline> {
        Ok(&self.current()?.outline)
    }

    /// Whether the rectified page for the current image is already cached.
    pub fn is_rectified(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|generation| generation.rectified.is_some())
    }

    /// Intermediate preprocessing images; only kept when `debug` is enabled.
    pub fn debug_stages(&self) -> Option<&PreprocessStages> {
        self.current.as_ref()?.stages.as_ref()
    }

    // -- Rectification --------------------------------------------------------

    /// Outline corners in top-left, top-right, bottom-right, bottom-left order.
    pub fn ordered_corners(&mut self) -> Result<OrderedCorners> {
        let generation = self.current_mut()?;
        if let Some(corners) = generation.corners {
            return Ok(corners);
        }
        let corners = rectify::order_corners(generation.outline.require()?);
        generation.corners = Some(corners);
        Ok(corners)
    }

    /// The perspective-corrected page, computed once per image.
    pub fn deskewed_image(&mut self) -> Result<&RgbImage> {
        let corners = self.ordered_corners()?;
        let generation = self.current_mut()?;
        let rectified = match generation.rectified.take() {
            Some(cached) => cached,
            None => rectify::rectify(&generation.source, &corners)?,
        };
        Ok(&*generation.rectified.insert(rectified))
    }

    /// The deskewed page binarized at its Otsu level.
    pub fn deskewed_black_and_white(&mut self) -> Result<GrayImage> {
        Ok(render::black_and_white(self.deskewed_image()?))
    }

    // -- Rendering ------------------------------------------------------------

    /// The source image with the outline drawn on it.
    pub fn overlayed_image(&self, color: Rgb<u8>, thickness: u32) -> Result<RgbImage> {
        let generation = self.current()?;
        render::overlay(&generation.source, &generation.outline, color, thickness)
    }

    /// The outline alone on a transparent canvas the size of the source.
    pub fn transparent_outline(&self, color: Rgb<u8>, thickness: u32) -> Result<RgbaImage> {
        let generation = self.current()?;
        render::transparent_outline(
            generation.source.dimensions(),
            &generation.outline,
            color,
            thickness,
        )
    }

    fn current(&self) -> Result<&Generation> {
        self.current.as_ref().ok_or(DeskewError::NoImage)
    }

    fn current_mut(&mut self) -> Result<&mut Generation> {
        self.current.as_mut().ok_or(DeskewError::NoImage)
    }
}
