// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch processing — decode each input, run the pipeline, and write the
// overlay, outline and rectified page next to it (or into --out-dir).

use std::path::{Path, PathBuf};

use image::{ImageError, Rgb};
use tracing::{debug, instrument, warn};

use deskewer_core::error::{DeskewError, Result};
use deskewer_core::{DriverConfig, RenderStyle};
use deskewer_scan::Deskewer;

/// What happened to one input file.
#[derive(Debug)]
pub enum Outcome {
    /// An outline was found; these files were written.
    Deskewed { outputs: Vec<PathBuf> },
    /// No outline in the image. Debug stages may still have been written.
    NoOutline,
}

/// Runs a single pipeline instance over many files.
pub struct BatchRunner {
    deskewer: Deskewer,
    style: RenderStyle,
    black_and_white: bool,
    out_dir: Option<PathBuf>,
}

impl BatchRunner {
    pub fn new(config: &DriverConfig, out_dir: Option<PathBuf>) -> Result<Self> {
        if let Some(dir) = &out_dir {
            std::fs::create_dir_all(dir)?;
        }
        Ok(Self {
            deskewer: Deskewer::new(config.deskew.clone())?,
            style: config.render,
            black_and_white: config.black_and_white,
            out_dir,
        })
    }

    #[instrument(skip(self), fields(input = %input.display()))]
    pub fn process(&mut self, input: &Path) -> Result<Outcome> {
        let photo = image::open(input).map_err(codec_error)?.to_rgb8();
        let found = self.deskewer.set_image(photo)?.is_found();

        let mut outputs = Vec::new();
        if let Some(stages) = self.deskewer.debug_stages() {
            let gray = self.output_path(input, "gray");
            stages.gray.save(&gray).map_err(codec_error)?;
            outputs.push(gray);
            if let Some(blurred) = &stages.blurred {
                let path = self.output_path(input, "blurred");
                blurred.save(&path).map_err(codec_error)?;
                outputs.push(path);
            }
            let edges = self.output_path(input, "edges");
            stages.edges.save(&edges).map_err(codec_error)?;
            outputs.push(edges);
        }

        if !found {
            warn!("No page outline; skipping");
            return Ok(Outcome::NoOutline);
        }

        let color = Rgb(self.style.color);
        let thickness = self.style.thickness;

        let path = self.output_path(input, "overlayed");
        self.deskewer
            .overlayed_image(color, thickness)?
            .save(&path)
            .map_err(codec_error)?;
        outputs.push(path);

        let path = self.output_path(input, "outline");
        self.deskewer
            .transparent_outline(color, thickness)?
            .save(&path)
            .map_err(codec_error)?;
        outputs.push(path);

        let path = self.output_path(input, "transformed");
        self.deskewer
            .deskewed_image()?
            .save(&path)
            .map_err(codec_error)?;
        outputs.push(path);

        if self.black_and_white {
            let path = self.output_path(input, "bw");
            self.deskewer
                .deskewed_black_and_white()?
                .save(&path)
                .map_err(codec_error)?;
            outputs.push(path);
        }

        debug!(written = outputs.len(), "Outputs saved");
        Ok(Outcome::Deskewed { outputs })
    }

    /// `<dir>/<input stem>.<suffix>.png`, where `dir` is `--out-dir` or the
    /// input's own directory.
    fn output_path(&self, input: &Path, suffix: &str) -> PathBuf {
        let dir = match &self.out_dir {
            Some(dir) => dir.as_path(),
            None => input.parent().unwrap_or_else(|| Path::new("")),
        };
        let stem = input
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".into());
        dir.join(format!("{stem}.{suffix}.png"))
    }
}

fn codec_error(err: ImageError) -> DeskewError {
    match err {
        ImageError::IoError(io) => DeskewError::Io(io),
        other => DeskewError::Codec(other.to_string()),
    }
}
