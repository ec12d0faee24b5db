// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Deskewer — batch driver.
//
// Entry point. Initialises logging, merges the config file with command-line
// overrides, and runs every input image through the pipeline.

mod batch;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use deskewer_core::DriverConfig;
use deskewer_core::error::Result;
use deskewer_core::human_errors::{HumanError, humanize_error};

use batch::{BatchRunner, Outcome};

#[derive(Debug, Parser)]
#[command(name = "deskewer")]
#[command(about = "Find the page in each photo and write a perspective-corrected copy")]
#[command(version)]
struct Cli {
    /// JSON driver config. Flags below override its values.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Gaussian blur kernel size (0 disables, otherwise odd).
    #[arg(long, value_name = "K")]
    blur: Option<u32>,

    /// Canny low threshold.
    #[arg(long, value_name = "T")]
    edge_threshold: Option<u32>,

    /// Polygon simplification tolerance as a fraction of contour perimeter.
    #[arg(long, value_name = "PCT")]
    epsilon: Option<f64>,

    /// Outline colour.
    #[arg(long, value_name = "R,G,B", value_parser = parse_color)]
    color: Option<[u8; 3]>,

    /// Outline stroke width in pixels.
    #[arg(long, value_name = "N")]
    thickness: Option<u32>,

    /// Also write a binarized copy of each rectified page.
    #[arg(long)]
    black_and_white: bool,

    /// Write the grayscale, blurred and edge-map stages for each input.
    #[arg(long)]
    debug: bool,

    /// Directory for outputs. Defaults to the directory of each input.
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Photos to process.
    #[arg(required = true, value_name = "IMAGES")]
    images: Vec<PathBuf>,
}

impl Cli {
    /// Config file (or defaults) with every given flag applied on top.
    fn driver_config(&self) -> Result<DriverConfig> {
        let mut config = match &self.config {
            Some(path) => DriverConfig::load(path)?,
            None => DriverConfig::default(),
        };

        let deskew = &mut config.deskew;
        if let Some(kernel) = self.blur {
            deskew.gaussian_blur_kernel_size = kernel;
        }
        if let Some(threshold) = self.edge_threshold {
            deskew.edge_low_threshold = threshold;
        }
        if let Some(epsilon) = self.epsilon {
            deskew.approx_epsilon_pct = epsilon;
        }
        deskew.debug |= self.debug;
        deskew.validate()?;

        if let Some(color) = self.color {
            config.render.color = color;
        }
        if let Some(thickness) = self.thickness {
            config.render.thickness = thickness;
        }
        config.black_and_white |= self.black_and_white;
        Ok(config)
    }
}

/// Parse `R,G,B` with each component in 0..=255.
fn parse_color(value: &str) -> std::result::Result<[u8; 3], String> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    let [r, g, b] = parts[..] else {
        return Err(format!("expected R,G,B, got {value:?}"));
    };
    let channel = |part: &str| {
        part.parse::<u8>()
            .map_err(|_| format!("colour component {part:?} is not in 0..=255"))
    };
    Ok([channel(r)?, channel(g)?, channel(b)?])
}

fn report(context: &str, human: &HumanError) {
    eprintln!("{context}: {}", human.message);
    eprintln!("  {}", human.suggestion);
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut runner = match cli
        .driver_config()
        .and_then(|config| BatchRunner::new(&config, cli.out_dir.clone()))
    {
        Ok(runner) => runner,
        Err(e) => {
            tracing::error!(error = %e, "could not start");
            report("deskewer", &humanize_error(&e));
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(inputs = cli.images.len(), "Deskewer starting");

    let mut failed = 0usize;
    for input in &cli.images {
        match runner.process(input) {
            Ok(Outcome::Deskewed { outputs }) => {
                tracing::info!(input = %input.display(), written = outputs.len(), "done");
            }
            Ok(Outcome::NoOutline) => {
                eprintln!("{}: no page outline found, skipped", input.display());
            }
            Err(e) => {
                failed += 1;
                tracing::error!(input = %input.display(), error = %e, "failed");
                report(&input.display().to_string(), &humanize_error(&e));
            }
        }
    }

    if failed > 0 {
        tracing::warn!(failed, total = cli.images.len(), "some inputs failed");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
