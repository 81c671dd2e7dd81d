//! Input color space factories.
//!
//! Each factory builds the color spaces for one camera vendor or encoding
//! family. Transfer curves with exact closed forms are sampled into SPI 1D
//! shaper LUTs on disk; gamut conversions ride `Matrix` steps built from the
//! published 3x3 primaries matrices.

pub mod arri;
pub mod general;
pub mod sony;

use std::path::Path;

use colorforge_core::codec::LutFormat;
use colorforge_core::pipeline::write_sampled_1d;
use colorforge_core::transform::mat44_from_mat33;
use colorforge_core::{Direction, Interpolation, TransformStep};

use crate::error::ConfigError;
use crate::space::{Allocation, ColorSpace};

/// Where and how finely the factories sample their shaper LUTs.
#[derive(Debug, Clone, Copy)]
pub struct LutSettings<'a> {
    pub directory: &'a Path,
    pub resolution_1d: u32,
}

impl<'a> LutSettings<'a> {
    pub fn new(directory: &'a Path, resolution_1d: u32) -> Self {
        Self {
            directory,
            resolution_1d,
        }
    }

    /// Fails fast when the LUT output directory is absent, before any curve
    /// is sampled.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.directory.is_dir() {
            return Err(ConfigError::MissingLutDirectory(
                self.directory.to_path_buf(),
            ));
        }
        Ok(())
    }
}

/// A color space expressed as one or more matrix steps.
pub(crate) fn matrix_space(
    name: &str,
    to_reference: &[[f64; 9]],
    from_reference: &[[f64; 9]],
    aliases: &[&str],
) -> ColorSpace {
    let mut cs = ColorSpace::new(name);
    cs.aliases = aliases.iter().map(|a| (*a).to_owned()).collect();
    cs.equality_group = name.to_owned();
    cs.family = "Utility".to_owned();
    cs.allocation = Allocation::lg2();
    for m in to_reference {
        cs.to_reference.push(TransformStep::matrix(mat44_from_mat33(*m)));
    }
    for m in from_reference {
        cs.from_reference.push(TransformStep::matrix(mat44_from_mat33(*m)));
    }
    cs
}

/// A color space whose encoding is a sampled `linear_to_<stem>` curve.
///
/// The curve is sampled over [0, 1] and written as
/// `linear_to_<stem>.spi1d`; decoding runs the LUT inverted.
pub(crate) fn transfer_space(
    name: &str,
    curve_stem: &str,
    curve: impl Fn(f32) -> f32,
    luts: LutSettings<'_>,
    aliases: &[&str],
) -> Result<ColorSpace, ConfigError> {
    let mut cs = ColorSpace::new(name);
    cs.aliases = aliases.iter().map(|a| (*a).to_owned()).collect();
    cs.equality_group = name.to_owned();
    cs.family = "Utility".to_owned();

    let lut = format!("linear_to_{curve_stem}.spi1d");
    write_sampled_1d(
        &luts.directory.join(&lut),
        LutFormat::Spi1d,
        luts.resolution_1d,
        0.0,
        1.0,
        curve,
    )?;
    cs.to_reference.push(TransformStep::LutFile {
        path: lut,
        interpolation: Interpolation::Linear,
        cccid: None,
        direction: Direction::Inverse,
    });
    Ok(cs)
}

/// A color space combining a sampled transfer curve with gamut matrices.
pub(crate) fn matrix_plus_transfer_space(
    name: &str,
    curve_stem: &str,
    curve: impl Fn(f32) -> f32,
    luts: LutSettings<'_>,
    to_reference: &[[f64; 9]],
    from_reference: &[[f64; 9]],
    aliases: &[&str],
) -> Result<ColorSpace, ConfigError> {
    let mut cs = ColorSpace::new(name);
    cs.aliases = aliases.iter().map(|a| (*a).to_owned()).collect();
    cs.equality_group = name.to_owned();
    cs.family = "Utility".to_owned();

    let lut = format!("linear_to_{curve_stem}.spi1d");
    write_sampled_1d(
        &luts.directory.join(&lut),
        LutFormat::Spi1d,
        luts.resolution_1d,
        0.0,
        1.0,
        curve,
    )?;

    if !to_reference.is_empty() {
        cs.to_reference.push(TransformStep::LutFile {
            path: lut.clone(),
            interpolation: Interpolation::Linear,
            cccid: None,
            direction: Direction::Inverse,
        });
        for m in to_reference {
            cs.to_reference.push(TransformStep::matrix(mat44_from_mat33(*m)));
        }
    }
    if !from_reference.is_empty() {
        for m in from_reference {
            cs.from_reference.push(TransformStep::matrix(mat44_from_mat33(*m)));
        }
        cs.from_reference.push(TransformStep::LutFile {
            path: lut,
            interpolation: Interpolation::Linear,
            cccid: None,
            direction: Direction::Forward,
        });
    }
    Ok(cs)
}

/// A color space combining a pure-gamma encoding with gamut matrices. No LUT
/// is written; the exponent is exact.
pub(crate) fn matrix_plus_gamma_space(
    name: &str,
    gamma: f64,
    to_reference: &[[f64; 9]],
    from_reference: &[[f64; 9]],
    aliases: &[&str],
) -> ColorSpace {
    let mut cs = ColorSpace::new(name);
    cs.aliases = aliases.iter().map(|a| (*a).to_owned()).collect();
    cs.equality_group = name.to_owned();
    cs.family = "Utility".to_owned();

    if !to_reference.is_empty() {
        cs.to_reference.push(TransformStep::Exponent {
            value: [gamma, gamma, gamma, 1.0],
        });
        for m in to_reference {
            cs.to_reference.push(TransformStep::matrix(mat44_from_mat33(*m)));
        }
    }
    if !from_reference.is_empty() {
        for m in from_reference {
            cs.from_reference.push(TransformStep::matrix(mat44_from_mat33(*m)));
        }
        cs.from_reference.push(TransformStep::Exponent {
            value: [1.0 / gamma, 1.0 / gamma, 1.0 / gamma, 1.0],
        });
    }
    cs
}

/// A camera-style space whose decoding curve is sampled directly.
///
/// Camera curves are published as code-value-to-linear functions, so the LUT
/// is written in the decoding direction (`<stem>_to_linear.spi1d`) and
/// applied forward, the mirror of [`transfer_space`].
pub(crate) fn camera_log_space(
    name: &str,
    curve_stem: &str,
    curve: impl Fn(f32) -> f32,
    luts: LutSettings<'_>,
    gamut_to_reference: Option<[f64; 9]>,
    family: &str,
    aliases: &[&str],
) -> Result<ColorSpace, ConfigError> {
    let mut cs = ColorSpace::new(name);
    cs.description = name.to_owned();
    cs.aliases = aliases.iter().map(|a| (*a).to_owned()).collect();
    cs.family = family.to_owned();

    let lut = format!("{curve_stem}_to_linear.spi1d");
    write_sampled_1d(
        &luts.directory.join(&lut),
        LutFormat::Spi1d,
        luts.resolution_1d,
        0.0,
        1.0,
        curve,
    )?;
    cs.to_reference.push(TransformStep::LutFile {
        path: lut,
        interpolation: Interpolation::Linear,
        cccid: None,
        direction: Direction::Forward,
    });
    if let Some(m) = gamut_to_reference {
        cs.to_reference.push(TransformStep::matrix(mat44_from_mat33(m)));
    }
    Ok(cs)
}

/// A camera-style linear space: gamut matrix only.
pub(crate) fn camera_linear_space(
    name: &str,
    gamut_to_reference: [f64; 9],
    family: &str,
    aliases: &[&str],
) -> ColorSpace {
    let mut cs = ColorSpace::new(name);
    cs.description = name.to_owned();
    cs.aliases = aliases.iter().map(|a| (*a).to_owned()).collect();
    cs.family = family.to_owned();
    cs.allocation = Allocation::lg2();
    cs.to_reference
        .push(TransformStep::matrix(mat44_from_mat33(gamut_to_reference)));
    cs
}

#[cfg(test)]
mod tests {
    use super::*;
    use colorforge_core::codec::read_spi1d;

    #[test]
    fn test_transfer_space_writes_the_lut_and_inverts_it() {
        let dir = tempfile::tempdir().unwrap();
        let luts = LutSettings::new(dir.path(), 256);
        let cs = transfer_space("Curve - Test", "test", |x| x * 0.5, luts, &["crv_test"]).unwrap();

        assert_eq!(cs.to_reference.len(), 1);
        let TransformStep::LutFile {
            path, direction, ..
        } = &cs.to_reference.steps()[0]
        else {
            panic!("expected a LUT file step");
        };
        assert_eq!(path, "linear_to_test.spi1d");
        assert_eq!(*direction, Direction::Inverse);

        let lut = read_spi1d(&dir.path().join("linear_to_test.spi1d")).unwrap();
        assert_eq!(lut.entries(), 256);
        assert_eq!(lut.data[255], 0.5);
    }

    #[test]
    fn test_matrix_plus_transfer_orders_lut_before_matrices() {
        let dir = tempfile::tempdir().unwrap();
        let luts = LutSettings::new(dir.path(), 64);
        let m = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
        let cs = matrix_plus_transfer_space(
            "Test - Texture",
            "test_texture",
            |x| x,
            luts,
            &[m],
            &[m],
            &[],
        )
        .unwrap();

        // Decoding: undo the curve, then convert the gamut.
        assert!(matches!(cs.to_reference.steps()[0], TransformStep::LutFile { .. }));
        assert!(matches!(cs.to_reference.steps()[1], TransformStep::Matrix { .. }));
        // Encoding mirrors it.
        assert!(matches!(cs.from_reference.steps()[0], TransformStep::Matrix { .. }));
        assert!(matches!(cs.from_reference.steps()[1], TransformStep::LutFile { .. }));
    }

    #[test]
    fn test_camera_log_space_applies_the_lut_forward() {
        let dir = tempfile::tempdir().unwrap();
        let luts = LutSettings::new(dir.path(), 64);
        let cs = camera_log_space(
            "Test-Log",
            "Test-Log",
            |x| x * 2.0,
            luts,
            Some([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]),
            "Input/Test",
            &["testlog"],
        )
        .unwrap();

        assert_eq!(cs.to_reference.len(), 2);
        let TransformStep::LutFile {
            path, direction, ..
        } = &cs.to_reference.steps()[0]
        else {
            panic!("expected a LUT file step");
        };
        assert_eq!(path, "Test-Log_to_linear.spi1d");
        assert_eq!(*direction, Direction::Forward);
        assert!(matches!(cs.to_reference.steps()[1], TransformStep::Matrix { .. }));
        assert!(cs.from_reference.is_empty());
    }

    #[test]
    fn test_gamma_space_inverts_the_exponent_on_the_way_out() {
        let m = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
        let cs = matrix_plus_gamma_space("Gamma 2.2 - Test", 2.2, &[m], &[m], &["g22_test"]);
        let TransformStep::Exponent { value } = &cs.to_reference.steps()[0] else {
            panic!("expected an exponent step");
        };
        assert_eq!(value[0], 2.2);
        let TransformStep::Exponent { value } = &cs.from_reference.steps()[1] else {
            panic!("expected an exponent step");
        };
        assert!((value[0] - 1.0 / 2.2).abs() < 1e-12);
        assert_eq!(value[3], 1.0);
    }
}
