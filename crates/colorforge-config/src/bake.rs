//! Baked LUT planning and execution.
//!
//! One job is planned per (device target x input color space) pair of every
//! Output Transform, then handed to the external baker with the generated
//! config as input. Jobs are independent, so execution fans out over a
//! worker pool; each job remains a blocking subprocess with no timeout and
//! no retry, and the first failure fails the run.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use rayon::prelude::*;
use tracing::{debug, info};

use colorforge_core::CoreError;
use colorforge_core::codec::LutFormat;
use colorforge_core::pipeline::FormatConverter;

use crate::error::ConfigError;
use crate::space::Naming;

/// Applications the external baker can produce device LUTs for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetApp {
    Photoshop,
    Flame,
    Lustre,
    Maya,
    Houdini,
}

impl TargetApp {
    pub const ALL: [Self; 5] = [
        Self::Photoshop,
        Self::Flame,
        Self::Lustre,
        Self::Maya,
        Self::Houdini,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Photoshop => "Photoshop",
            Self::Flame => "Flame",
            Self::Lustre => "Lustre",
            Self::Maya => "Maya",
            Self::Houdini => "Houdini",
        }
    }

    /// Subdirectory of the baked output tree.
    pub const fn directory(self) -> &'static str {
        match self {
            Self::Photoshop => "photoshop",
            Self::Flame => "flame",
            Self::Lustre => "lustre",
            Self::Maya => "maya",
            Self::Houdini => "houdini",
        }
    }

    pub const fn format(self) -> LutFormat {
        match self {
            Self::Photoshop => LutFormat::Icc,
            Self::Flame => LutFormat::Flame,
            Self::Lustre => LutFormat::Lustre,
            Self::Maya => LutFormat::Cinespace,
            Self::Houdini => LutFormat::Houdini,
        }
    }

    /// Input encodings this target's users grade or render in. Compositing
    /// targets take the log working spaces; 3D renderers take linear.
    pub const fn input_spaces(self) -> &'static [&'static str] {
        match self {
            Self::Photoshop | Self::Flame | Self::Lustre => &["ACEScc", "ACESproxy", "ACEScct"],
            Self::Maya | Self::Houdini => &["ACEScg", "ACES2065-1"],
        }
    }

    /// Baked file name. Photoshop files carry no application token.
    fn file_name(self, transform: &str, input_space: &str) -> String {
        let extension = self.format().extension();
        match self {
            Self::Photoshop => format!("{transform} for {input_space}.{extension}"),
            _ => format!("{transform} for {input_space} {}.{extension}", self.label()),
        }
    }
}

/// One Output Transform eligible for baking.
#[derive(Debug, Clone)]
pub struct OutputTransform {
    /// Presentation name, e.g. `sRGB`.
    pub user_name: String,
    /// Family prefix used in baked-file descriptions, e.g. `Output`.
    pub user_name_prefix: String,
}

impl OutputTransform {
    pub fn new(user_name: impl Into<String>, user_name_prefix: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            user_name_prefix: user_name_prefix.into(),
        }
    }
}

/// Everything the planner needs to expand transforms into jobs.
#[derive(Debug, Clone)]
pub struct BakePlan {
    pub config_path: PathBuf,
    pub baked_directory: PathBuf,
    /// Base shaper; high-nit transforms substitute a PQ variant.
    pub shaper_name: String,
    pub cube_resolution: u32,
    pub shaper_resolution: u32,
    pub naming: Naming,
    pub targets: Vec<TargetApp>,
}

impl BakePlan {
    pub fn new(config_path: impl Into<PathBuf>, baked_directory: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            baked_directory: baked_directory.into(),
            shaper_name: "Log2 48 nits Shaper".to_owned(),
            cube_resolution: 65,
            shaper_resolution: 1024,
            naming: Naming::FamilyPrefixed,
            targets: TargetApp::ALL.to_vec(),
        }
    }
}

/// One fully resolved bake invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct BakeJob {
    pub input_space: String,
    pub output_space: String,
    pub shaper_space: String,
    pub description: String,
    pub format: LutFormat,
    pub cube_resolution: u32,
    pub shaper_resolution: u32,
    pub output_path: PathBuf,
}

/// Picks the shaper for one transform. HDR transforms swap the log shaper
/// for the PQ variant covering the same peak luminance.
fn shaper_for(transform_name: &str, shaper_name: &str) -> String {
    let words: Vec<&str> = shaper_name.split_whitespace().collect();
    let tail = words[words.len().saturating_sub(3)..].join(" ");
    let pq_shaper = format!("Dolby PQ {tail}");
    for nits in ["1000 nits", "2000 nits", "4000 nits"] {
        if transform_name.contains(nits) {
            return pq_shaper.replace("48 nits", nits);
        }
    }
    shaper_name.to_owned()
}

/// Expands every transform into one job per (target x input space).
///
/// A target whose dialect the baker cannot produce from 3D data is a
/// planning error, surfaced before any subprocess runs.
pub fn plan_jobs(
    transforms: &[OutputTransform],
    plan: &BakePlan,
) -> Result<Vec<BakeJob>, ConfigError> {
    let prefixed = plan.naming == Naming::FamilyPrefixed;
    let mut jobs = Vec::new();

    for transform in transforms {
        let name = &transform.user_name;
        let transform_shaper = shaper_for(name, &plan.shaper_name);

        for target in &plan.targets {
            let format = target.format();
            if !format.supports_3d() {
                return Err(CoreError::UnsupportedFormat { format, dim: 3 }.into());
            }

            for input_space in target.input_spaces() {
                let mut shaper = transform_shaper.clone();
                if *input_space == "ACEScg" {
                    shaper = format!("{shaper} - AP1");
                }

                let (input, output, shaper) = if prefixed {
                    (
                        format!("ACES - {input_space}"),
                        format!("Output - {name}"),
                        format!("Utility - {shaper}"),
                    )
                } else {
                    ((*input_space).to_owned(), name.clone(), shaper)
                };

                jobs.push(BakeJob {
                    input_space: input,
                    output_space: output,
                    shaper_space: shaper,
                    description: format!(
                        "{} - {name} for {input_space} data",
                        transform.user_name_prefix
                    ),
                    format,
                    cube_resolution: plan.cube_resolution,
                    shaper_resolution: plan.shaper_resolution,
                    output_path: plan
                        .baked_directory
                        .join(target.directory())
                        .join(target.file_name(name, input_space)),
                });
            }
        }
    }
    Ok(jobs)
}

/// Wrapper around the external baker binary.
///
/// Blocking, no timeout, no retry: a nonzero exit fails the run and partial
/// output is left in place.
#[derive(Debug, Clone)]
pub struct LutBaker {
    binary: PathBuf,
    config_path: PathBuf,
}

impl LutBaker {
    pub fn new(binary: impl Into<PathBuf>, config_path: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            config_path: config_path.into(),
        }
    }

    /// Runs one bake job to completion.
    pub fn run(&self, job: &BakeJob) -> Result<(), ConfigError> {
        let Some(bake_format) = job.format.bake_format() else {
            return Err(CoreError::UnsupportedFormat {
                format: job.format,
                dim: 3,
            }
            .into());
        };
        if let Some(parent) = job.output_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut command = Command::new(&self.binary);
        command.arg("--iconfig").arg(&self.config_path);
        command.arg("-v");
        command.args(["--inputspace", &job.input_space]);
        command.args(["--outputspace", &job.output_space]);
        command.args(["--description", &job.description]);
        command.args(["--shaperspace", &job.shaper_space]);
        command.args(["--shapersize", &job.shaper_resolution.to_string()]);
        command.args(["--cubesize", &job.cube_resolution.to_string()]);
        command.arg("--format").arg(bake_format);
        command.arg(&job.output_path);

        let command_name = self.binary.display().to_string();
        debug!(command = %command_name, path = %job.output_path.display(), "baking LUT");

        let status = command.status().map_err(|source| ConfigError::Spawn {
            command: command_name.clone(),
            source,
        })?;
        if !status.success() {
            return Err(ConfigError::ExternalTool {
                command: command_name,
                status,
            });
        }
        Ok(())
    }
}

impl FormatConverter for LutBaker {
    /// Converts a native SPI 3D file into a delegated dialect.
    fn convert(&self, spi3d: &Path, format: LutFormat, output: &Path) -> Result<(), CoreError> {
        let Some(bake_format) = format.bake_format() else {
            return Err(CoreError::UnsupportedFormat { format, dim: 3 });
        };

        let mut command = Command::new(&self.binary);
        command.arg("--lut").arg(spi3d);
        command.arg("--format").arg(bake_format);
        command.arg(output);

        let command_name = self.binary.display().to_string();
        let status = command.status().map_err(|source| CoreError::Spawn {
            command: command_name.clone(),
            source,
        })?;
        if !status.success() {
            return Err(CoreError::ExternalTool {
                command: command_name,
                status,
            });
        }
        Ok(())
    }
}

/// Runs every job over the worker pool.
///
/// Jobs already running when one fails are not cancelled; the run reports
/// the first error once the pool drains.
pub fn bake_all(baker: &LutBaker, jobs: &[BakeJob]) -> Result<(), ConfigError> {
    info!(jobs = jobs.len(), "baking device LUTs");
    jobs.par_iter().try_for_each(|job| baker.run(job))
}
