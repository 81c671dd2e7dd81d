//! Boundary to the external continuous-transform renderer.
//!
//! The renderer is a black box: it receives an identity lattice as a 2D
//! image, an ordered list of opaque program references, a parameter map, and
//! input/output scale factors, and returns a transformed image of the same
//! shape. Nothing in this crate parses or interprets the programs.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::error::CoreError;
use crate::lattice::Lattice;

/// Bit depth the identity lattice image is coded in when handed to the
/// renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodingDepth {
    Uint8,
    Uint10,
    Uint12,
    Uint16,
    Half,
    Float,
}

impl CodingDepth {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uint8 => "uint8",
            Self::Uint10 => "uint10",
            Self::Uint12 => "uint12",
            Self::Uint16 => "uint16",
            Self::Half => "half",
            Self::Float => "float",
        }
    }

    pub const fn is_float_coded(self) -> bool {
        matches!(self, Self::Half | Self::Float)
    }
}

/// Applies the renderer's input scale.
///
/// The semantics are asymmetric by coding depth and load-bearing: integer
/// code values are divided by the scale before evaluation, float and half
/// values are multiplied by it.
pub fn apply_input_scale(value: f32, scale: f64, depth: CodingDepth) -> f32 {
    if depth.is_float_coded() {
        (value as f64 * scale) as f32
    } else {
        (value as f64 / scale) as f32
    }
}

/// Applies the renderer's output scale — the mirror of [`apply_input_scale`]:
/// integer code values are multiplied after evaluation, float and half values
/// are divided.
pub fn apply_output_scale(value: f32, scale: f64, depth: CodingDepth) -> f32 {
    if depth.is_float_coded() {
        (value as f64 / scale) as f32
    } else {
        (value as f64 * scale) as f32
    }
}

/// Filesystem locations an evaluation is allowed to use for its intermediate
/// images. They are ordinary files; cleaning them up is the caller's explicit
/// post-phase.
#[derive(Debug, Clone)]
pub struct ScratchPaths {
    pub identity_image: PathBuf,
    pub transformed_image: PathBuf,
}

/// One evaluation request.
#[derive(Debug)]
pub struct EvalRequest<'a> {
    /// Opaque program references, applied in order. Never parsed here.
    pub programs: &'a [PathBuf],
    /// Extra named parameters forwarded to the renderer.
    pub params: &'a BTreeMap<String, f64>,
    pub input_scale: f64,
    pub output_scale: f64,
    pub depth: CodingDepth,
    pub scratch: ScratchPaths,
}

/// The collaborator seam. Implementations must return a lattice whose sample
/// data corresponds pixel-for-pixel to the input; shape repair is the
/// caller's job.
pub trait Evaluator {
    fn evaluate(&self, lattice: &Lattice, request: &EvalRequest<'_>) -> Result<Lattice, CoreError>;
}

/// In-process evaluator that applies only the scale asymmetry.
///
/// Stands in for a renderer whose program list is the identity; used by the
/// end-to-end tests and useful for dry runs.
#[derive(Debug, Default)]
pub struct IdentityEvaluator;

impl Evaluator for IdentityEvaluator {
    fn evaluate(&self, lattice: &Lattice, request: &EvalRequest<'_>) -> Result<Lattice, CoreError> {
        let mut out = lattice.clone();
        for value in &mut out.data {
            let scaled = apply_input_scale(*value, request.input_scale, request.depth);
            *value = apply_output_scale(scaled, request.output_scale, request.depth);
        }
        Ok(out)
    }
}

/// Evaluator backed by the external CTL renderer binary.
///
/// Blocking, no timeout, no retry: a hung renderer hangs the run and a
/// nonzero exit fails it.
#[derive(Debug, Clone)]
pub struct CtlRenderer {
    binary: PathBuf,
    module_path: Option<PathBuf>,
}

impl CtlRenderer {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            module_path: None,
        }
    }

    /// Directory of shared program modules exported to the renderer.
    pub fn with_module_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.module_path = Some(path.into());
        self
    }
}

impl Evaluator for CtlRenderer {
    fn evaluate(&self, lattice: &Lattice, request: &EvalRequest<'_>) -> Result<Lattice, CoreError> {
        write_lattice_image(lattice, &request.scratch.identity_image)?;

        let mut command = Command::new(&self.binary);
        for program in request.programs {
            command.arg("-ctl").arg(program);
        }
        command.arg("-force");
        command
            .arg("-input_scale")
            .arg(request.input_scale.to_string());
        command
            .arg("-output_scale")
            .arg(request.output_scale.to_string());
        // The renderer needs the alpha input pinned or it refuses RGB images.
        command.args(["-global_param1", "aIn", "1.0"]);
        for (name, value) in request.params {
            command
                .arg("-global_param1")
                .arg(name)
                .arg(value.to_string());
        }
        command.arg(&request.scratch.identity_image);
        command.arg(&request.scratch.transformed_image);

        if let Some(module_path) = &self.module_path {
            command.env("CTL_MODULE_PATH", module_path);
        }

        let command_name = self.binary.display().to_string();
        debug!(command = %command_name, programs = request.programs.len(), "invoking renderer");

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

        read_lattice_image(&request.scratch.transformed_image, lattice)
    }
}

fn write_lattice_image(lattice: &Lattice, path: &Path) -> Result<(), CoreError> {
    let pixels = image::Rgb32FImage::from_raw(lattice.width, lattice.height, lattice.data.clone())
        .ok_or(CoreError::ShapeMismatch {
            width: lattice.width,
            height: lattice.height,
            expected_width: lattice.width,
            expected_height: lattice.height,
        })?;
    image::DynamicImage::ImageRgb32F(pixels).save(path)?;
    Ok(())
}

fn read_lattice_image(path: &Path, reference: &Lattice) -> Result<Lattice, CoreError> {
    let decoded = image::open(path)?.into_rgb32f();
    let (width, height) = decoded.dimensions();
    Ok(Lattice {
        dim: reference.dim,
        resolution: reference.resolution,
        domain_min: reference.domain_min,
        domain_max: reference.domain_max,
        channels: 3,
        width,
        height,
        data: decoded.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::sample_1d;

    fn request<'a>(
        params: &'a BTreeMap<String, f64>,
        input_scale: f64,
        output_scale: f64,
        depth: CodingDepth,
    ) -> EvalRequest<'a> {
        EvalRequest {
            programs: &[],
            params,
            input_scale,
            output_scale,
            depth,
            scratch: ScratchPaths {
                identity_image: PathBuf::from("identity.tiff"),
                transformed_image: PathBuf::from("transformed.exr"),
            },
        }
    }

    #[test]
    fn test_integer_coding_divides_in_and_multiplies_out() {
        assert_eq!(apply_input_scale(1023.0, 1023.0, CodingDepth::Uint10), 1.0);
        assert_eq!(apply_output_scale(1.0, 1023.0, CodingDepth::Uint10), 1023.0);
    }

    #[test]
    fn test_float_coding_inverts_the_scale_roles() {
        assert_eq!(apply_input_scale(0.5, 2.0, CodingDepth::Float), 1.0);
        assert_eq!(apply_output_scale(1.0, 2.0, CodingDepth::Half), 0.5);
    }

    #[test]
    fn test_identity_evaluator_with_unit_scales_is_a_no_op() {
        let params = BTreeMap::new();
        let lattice = sample_1d(32, -0.125, 1.125).unwrap();
        let out = IdentityEvaluator
            .evaluate(&lattice, &request(&params, 1.0, 1.0, CodingDepth::Float))
            .unwrap();
        assert_eq!(out, lattice);
    }

    #[test]
    fn test_identity_evaluator_applies_scale_asymmetry() {
        let params = BTreeMap::new();
        let lattice = sample_1d(4, 0.0, 1.0).unwrap();

        // Float: multiply in, divide out — scales cancel.
        let float_out = IdentityEvaluator
            .evaluate(&lattice, &request(&params, 4.0, 4.0, CodingDepth::Float))
            .unwrap();
        assert_eq!(float_out, lattice);

        // Integer: divide in, multiply out with distinct scales.
        let int_out = IdentityEvaluator
            .evaluate(&lattice, &request(&params, 2.0, 8.0, CodingDepth::Uint16))
            .unwrap();
        for (a, b) in lattice.data.iter().zip(&int_out.data) {
            assert_eq!(*b, a / 2.0 * 8.0);
        }
    }
}
