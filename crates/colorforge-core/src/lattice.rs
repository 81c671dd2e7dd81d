//! Identity lattice sampling and shape correction.
//!
//! A lattice is a uniformly sampled grid — a 1D ramp or a 3D cube — used to
//! bake a continuous transform into a LUT. The external renderer only accepts
//! 2D images, so a 3D cube travels as an image of width `resolution²` and
//! height `resolution`.

use tracing::warn;

use crate::error::CoreError;

/// Dimensionality of a lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatticeDim {
    One,
    Three,
}

/// A discretized, uniformly sampled grid with interleaved channels.
#[derive(Debug, Clone, PartialEq)]
pub struct Lattice {
    pub dim: LatticeDim,
    /// Samples per axis. For 3D lattices the logical shape is `resolution³`.
    pub resolution: u32,
    pub domain_min: f32,
    pub domain_max: f32,
    pub channels: u32,
    /// Carried image width. `resolution` for 1D, `resolution²` for 3D.
    pub width: u32,
    /// Carried image height. 1 for 1D, `resolution` for 3D.
    pub height: u32,
    /// Row-major interleaved samples, `width * height * channels` long.
    pub data: Vec<f32>,
}

impl Lattice {
    /// Total number of samples (not floats).
    pub fn sample_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Value of the given channel at the given sample index.
    pub fn value(&self, sample: usize, channel: usize) -> f32 {
        self.data[sample * self.channels as usize + channel]
    }
}

/// Samples an identity 1D ramp over `[domain_min, domain_max]`.
///
/// Sample `i` maps to `domain_min + i / (resolution - 1) * (domain_max -
/// domain_min)`, replicated across three channels. A single-sample ramp has
/// no defined spacing and a degenerate domain has no extent; both are
/// configuration errors caught before any I/O happens.
pub fn sample_1d(resolution: u32, domain_min: f32, domain_max: f32) -> Result<Lattice, CoreError> {
    if resolution < 2 {
        return Err(CoreError::ResolutionTooSmall(resolution));
    }
    if domain_min == domain_max {
        return Err(CoreError::DegenerateDomain {
            min: domain_min,
            max: domain_max,
        });
    }

    let channels = 3u32;
    let mut data = vec![0.0f32; resolution as usize * channels as usize];
    for i in 0..resolution as usize {
        let value =
            i as f32 / (resolution - 1) as f32 * (domain_max - domain_min) + domain_min;
        data[i * 3] = value;
        data[i * 3 + 1] = value;
        data[i * 3 + 2] = value;
    }

    Ok(Lattice {
        dim: LatticeDim::One,
        resolution,
        domain_min,
        domain_max,
        channels,
        width: resolution,
        height: 1,
        data,
    })
}

/// Samples the canonical identity RGB cube as a 2D image.
///
/// Red varies fastest, then green, then blue; the cube is unrolled into an
/// image of width `resolution²` and height `resolution`.
pub fn sample_3d(resolution: u32) -> Result<Lattice, CoreError> {
    if resolution < 2 {
        return Err(CoreError::ResolutionTooSmall(resolution));
    }

    let res = resolution as usize;
    let step = 1.0 / (resolution - 1) as f32;
    let mut data = vec![0.0f32; res * res * res * 3];
    for b in 0..res {
        for g in 0..res {
            for r in 0..res {
                let s = (b * res * res + g * res + r) * 3;
                data[s] = r as f32 * step;
                data[s + 1] = g as f32 * step;
                data[s + 2] = b as f32 * step;
            }
        }
    }

    Ok(Lattice {
        dim: LatticeDim::Three,
        resolution,
        domain_min: 0.0,
        domain_max: 1.0,
        channels: 3,
        width: resolution * resolution,
        height: resolution,
        data,
    })
}

/// Repairs the known width/height transposition defect of the external
/// renderer.
///
/// For some resolution and bit-depth combinations the renderer returns an
/// image with the right number of pixels but the width and height values
/// swapped. The repair transposes the declared addressing while leaving the
/// per-pixel channel data untouched. A correctly shaped lattice passes
/// through unchanged; any other shape is an error.
pub fn correct_shape(lattice: Lattice, resolution: u32) -> Result<Lattice, CoreError> {
    let expected_width = resolution * resolution;
    let expected_height = resolution;

    if lattice.width == expected_width && lattice.height == expected_height {
        return Ok(lattice);
    }

    if lattice.width == expected_height && lattice.height == expected_width {
        warn!(
            width = lattice.width,
            height = lattice.height,
            expected_width,
            expected_height,
            "repairing transposed lattice image"
        );
        return Ok(Lattice {
            width: expected_width,
            height: expected_height,
            ..lattice
        });
    }

    Err(CoreError::ShapeMismatch {
        width: lattice.width,
        height: lattice.height,
        expected_width,
        expected_height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_1d_maps_endpoints_to_domain() {
        let ramp = sample_1d(16, -0.125, 1.125).unwrap();
        assert_eq!(ramp.value(0, 0), -0.125);
        assert_eq!(ramp.value(15, 2), 1.125);
        // All three channels carry the same ramp.
        for i in 0..16 {
            assert_eq!(ramp.value(i, 0), ramp.value(i, 1));
            assert_eq!(ramp.value(i, 1), ramp.value(i, 2));
        }
    }

    #[test]
    fn test_sample_1d_rejects_single_sample() {
        assert!(matches!(
            sample_1d(1, 0.0, 1.0),
            Err(CoreError::ResolutionTooSmall(1))
        ));
    }

    #[test]
    fn test_sample_1d_rejects_degenerate_domain() {
        assert!(matches!(
            sample_1d(64, 0.5, 0.5),
            Err(CoreError::DegenerateDomain { .. })
        ));
    }

    #[test]
    fn test_sample_1d_is_idempotent() {
        let a = sample_1d(4096, 0.0, 1.0).unwrap();
        let b = sample_1d(4096, 0.0, 1.0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_sample_3d_is_idempotent() {
        let a = sample_3d(17).unwrap();
        let b = sample_3d(17).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_sample_3d_red_varies_fastest() {
        let cube = sample_3d(4).unwrap();
        assert_eq!(cube.width, 16);
        assert_eq!(cube.height, 4);
        // Sample 1 is one red step in; green and blue stay at zero.
        let step = 1.0 / 3.0;
        assert_eq!(cube.value(1, 0), step);
        assert_eq!(cube.value(1, 1), 0.0);
        assert_eq!(cube.value(1, 2), 0.0);
        // Sample `resolution` is one green step in.
        assert_eq!(cube.value(4, 0), 0.0);
        assert_eq!(cube.value(4, 1), step);
        // The last sample is the white corner.
        let last = cube.sample_count() - 1;
        assert_eq!(cube.value(last, 0), 1.0);
        assert_eq!(cube.value(last, 1), 1.0);
        assert_eq!(cube.value(last, 2), 1.0);
    }

    #[test]
    fn test_correct_shape_passes_well_formed_lattice_through() {
        let cube = sample_3d(8).unwrap();
        let corrected = correct_shape(cube.clone(), 8).unwrap();
        assert_eq!(corrected, cube);
    }

    #[test]
    fn test_correct_shape_transposes_swapped_dimensions() {
        let mut cube = sample_3d(8).unwrap();
        let original = cube.clone();
        cube.width = 8;
        cube.height = 64;

        let corrected = correct_shape(cube, 8).unwrap();
        assert_eq!(corrected.width, 64);
        assert_eq!(corrected.height, 8);
        // Pixel data is preserved, only the addressing changes.
        assert_eq!(corrected.data, original.data);
        assert_eq!(corrected.value(9, 1), original.value(9, 1));
        assert_eq!(corrected.value(511, 2), original.value(511, 2));
    }

    #[test]
    fn test_correct_shape_rejects_unrelated_shape() {
        let mut cube = sample_3d(8).unwrap();
        cube.width = 32;
        cube.height = 16;
        assert!(matches!(
            correct_shape(cube, 8),
            Err(CoreError::ShapeMismatch { .. })
        ));
    }
}
