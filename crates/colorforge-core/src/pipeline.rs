//! Drives one LUT bake: sample, evaluate, shape-correct, serialize, clean up.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::codec::{self, Lut1d, LutFormat};
use crate::error::CoreError;
use crate::evaluator::{CodingDepth, EvalRequest, Evaluator, ScratchPaths};
use crate::lattice::{self, correct_shape};

/// Shared knobs for one bake.
#[derive(Debug, Clone)]
pub struct BakeRequest {
    pub programs: Vec<PathBuf>,
    pub params: BTreeMap<String, f64>,
    pub depth: CodingDepth,
    pub input_scale: f64,
    pub output_scale: f64,
    /// Leave the intermediate lattice images on disk for inspection.
    pub keep_temp_images: bool,
}

impl Default for BakeRequest {
    fn default() -> Self {
        Self {
            programs: Vec::new(),
            params: BTreeMap::new(),
            depth: CodingDepth::Half,
            input_scale: 1.0,
            output_scale: 1.0,
            keep_temp_images: false,
        }
    }
}

/// Converts a native SPI 3D file into another dialect. Implemented by the
/// external baker wrapper; 3D dialects other than SPI are delegated entirely.
pub trait FormatConverter {
    fn convert(&self, spi3d: &Path, format: LutFormat, output: &Path) -> Result<(), CoreError>;
}

/// Bakes a 1D LUT through the evaluator and writes it in the requested
/// dialect.
pub fn bake_1d(
    evaluator: &dyn Evaluator,
    request: &BakeRequest,
    resolution: u32,
    domain_min: f32,
    domain_max: f32,
    components: u32,
    format: LutFormat,
    lut_path: &Path,
) -> Result<(), CoreError> {
    if !format.supports_1d() {
        return Err(CoreError::UnsupportedFormat { format, dim: 1 });
    }

    let identity = lattice::sample_1d(resolution, domain_min, domain_max)?;
    let scratch = scratch_paths(lut_path);
    let transformed = evaluator.evaluate(
        &identity,
        &EvalRequest {
            programs: &request.programs,
            params: &request.params,
            input_scale: request.input_scale,
            output_scale: request.output_scale,
            depth: request.depth,
            scratch: scratch.clone(),
        },
    )?;

    if transformed.sample_count() != identity.sample_count() {
        return Err(CoreError::ShapeMismatch {
            width: transformed.width,
            height: transformed.height,
            expected_width: identity.width,
            expected_height: identity.height,
        });
    }

    let lut = Lut1d {
        domain_min,
        domain_max,
        channels: transformed.channels,
        data: transformed.data,
    };
    codec::write_1d(lut_path, format, &lut, components)?;
    debug!(path = %lut_path.display(), %format, "wrote 1D LUT");

    if !request.keep_temp_images {
        cleanup(&scratch)?;
    }
    Ok(())
}

/// Bakes a 3D LUT through the evaluator.
///
/// SPI output is written natively; every other supported dialect goes
/// through `converter`. Asking for a dialect with no 3D path is an error.
pub fn bake_3d(
    evaluator: &dyn Evaluator,
    request: &BakeRequest,
    resolution: u32,
    format: LutFormat,
    lut_path: &Path,
    converter: Option<&dyn FormatConverter>,
) -> Result<(), CoreError> {
    if !format.supports_3d() {
        return Err(CoreError::UnsupportedFormat { format, dim: 3 });
    }

    let identity = lattice::sample_3d(resolution)?;
    let scratch = scratch_paths(lut_path);
    let transformed = evaluator.evaluate(
        &identity,
        &EvalRequest {
            programs: &request.programs,
            params: &request.params,
            input_scale: request.input_scale,
            output_scale: request.output_scale,
            depth: request.depth,
            scratch: scratch.clone(),
        },
    )?;
    let corrected = correct_shape(transformed, resolution)?;

    let mut intermediate_spi3d = None;
    if format == LutFormat::Spi3d {
        codec::write_spi3d(lut_path, &corrected)?;
    } else {
        let converter = converter.ok_or(CoreError::ConverterUnavailable { format })?;
        let spi3d_path = lut_path.with_extension(format!("{}.spi3d", format.extension()));
        codec::write_spi3d(&spi3d_path, &corrected)?;
        converter.convert(&spi3d_path, format, lut_path)?;
        intermediate_spi3d = Some(spi3d_path);
    }
    debug!(path = %lut_path.display(), %format, "wrote 3D LUT");

    if !request.keep_temp_images {
        cleanup(&scratch)?;
        if let Some(path) = intermediate_spi3d {
            remove_if_exists(&path)?;
        }
    }
    Ok(())
}

/// Samples a closed-form curve and writes the payload directly, bypassing
/// the evaluator.
///
/// `curve` receives the domain-mapped input of each sample. This is the path
/// for camera linearization curves that exist as exact functions rather than
/// as external renderer programs.
pub fn write_sampled_1d(
    path: &Path,
    format: LutFormat,
    resolution: u32,
    domain_min: f32,
    domain_max: f32,
    curve: impl Fn(f32) -> f32,
) -> Result<(), CoreError> {
    if !format.supports_1d() {
        return Err(CoreError::UnsupportedFormat { format, dim: 1 });
    }
    if resolution < 2 {
        return Err(CoreError::ResolutionTooSmall(resolution));
    }
    if domain_min == domain_max {
        return Err(CoreError::DegenerateDomain {
            min: domain_min,
            max: domain_max,
        });
    }

    let data = (0..resolution)
        .map(|i| {
            let x = domain_min + i as f32 / (resolution - 1) as f32 * (domain_max - domain_min);
            curve(x)
        })
        .collect();
    let lut = Lut1d {
        domain_min,
        domain_max,
        channels: 1,
        data,
    };
    codec::write_1d(path, format, &lut, 1)?;
    debug!(path = %path.display(), %format, "wrote sampled 1D LUT");
    Ok(())
}

fn scratch_paths(lut_path: &Path) -> ScratchPaths {
    let stem = lut_path.with_extension("");
    ScratchPaths {
        identity_image: stem.with_extension("float.tiff"),
        transformed_image: stem.with_extension("transformed.exr"),
    }
}

fn cleanup(scratch: &ScratchPaths) -> Result<(), CoreError> {
    remove_if_exists(&scratch.identity_image)?;
    remove_if_exists(&scratch.transformed_image)?;
    Ok(())
}

fn remove_if_exists(path: &Path) -> Result<(), CoreError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}
