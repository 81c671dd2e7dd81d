//! LUT serialization — dialect writers and shared text plumbing.
//!
//! 1D payloads are written natively in the SPI, Cinespace, and inline CTL
//! dialects. 3D payloads are written natively as SPI only; every other 3D
//! dialect is produced by handing the SPI file to the external baker (see
//! `pipeline`).

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::lattice::Lattice;

mod csp;
mod ctl;
mod spi;

pub use spi::read_spi1d;

/// LUT file dialects the pipeline can be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LutFormat {
    Spi1d,
    Spi3d,
    Cinespace,
    Flame,
    Lustre,
    Icc,
    Houdini,
    Ctl,
}

impl LutFormat {
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Spi1d => "spi1d",
            Self::Spi3d => "spi3d",
            Self::Cinespace => "csp",
            Self::Flame | Self::Lustre => "3dl",
            Self::Icc => "icc",
            Self::Houdini => "lut",
            Self::Ctl => "ctl",
        }
    }

    /// Name the external baker knows this dialect by, when it handles it.
    pub const fn bake_format(self) -> Option<&'static str> {
        match self {
            Self::Cinespace => Some("cinespace"),
            Self::Flame => Some("flame"),
            Self::Lustre => Some("lustre"),
            Self::Icc => Some("icc"),
            Self::Houdini => Some("houdini"),
            Self::Spi1d | Self::Spi3d | Self::Ctl => None,
        }
    }

    /// Dialects with a native 1D writer.
    pub const fn supports_1d(self) -> bool {
        matches!(self, Self::Spi1d | Self::Cinespace | Self::Ctl)
    }

    /// Dialects reachable for 3D data, natively or through the external baker.
    pub const fn supports_3d(self) -> bool {
        matches!(self, Self::Spi3d) || self.bake_format().is_some()
    }
}

impl fmt::Display for LutFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Spi1d => "spi1d",
            Self::Spi3d => "spi3d",
            Self::Cinespace => "cinespace",
            Self::Flame => "flame",
            Self::Lustre => "lustre",
            Self::Icc => "icc",
            Self::Houdini => "houdini",
            Self::Ctl => "ctl",
        };
        f.write_str(name)
    }
}

/// A 1D payload ready for serialization. Resolution is the sample count,
/// never the float count.
#[derive(Debug, Clone, PartialEq)]
pub struct Lut1d {
    pub domain_min: f32,
    pub domain_max: f32,
    /// Channels interleaved per sample in `data`.
    pub channels: u32,
    pub data: Vec<f32>,
}

impl Lut1d {
    pub fn entries(&self) -> usize {
        self.data.len() / self.channels as usize
    }
}

/// Writes a 1D payload in the requested dialect.
///
/// The written component count is `min(3, components, channels)`; a
/// single-channel payload is broadcast to three written values per sample.
/// Dialects without a native 1D writer are an error, never a silent no-op.
pub fn write_1d(
    path: &Path,
    format: LutFormat,
    lut: &Lut1d,
    components: u32,
) -> Result<(), CoreError> {
    let components = components.min(3).min(lut.channels);
    let text = match format {
        LutFormat::Spi1d => spi::render_spi1d(lut, components),
        LutFormat::Cinespace => csp::render_csp_1d(lut, components),
        LutFormat::Ctl => ctl::render_ctl_1d(lut, components),
        other => return Err(CoreError::UnsupportedFormat { format: other, dim: 1 }),
    };
    fs::write(path, scrub_nan(&text))?;
    Ok(())
}

/// Writes a 3D lattice in the native SPI dialect.
pub fn write_spi3d(path: &Path, lattice: &Lattice) -> Result<(), CoreError> {
    let text = spi::render_spi3d(lattice);
    fs::write(path, scrub_nan(&text))?;
    Ok(())
}

/// Replaces every textual NaN token (`nan` or `-nan`, any case) with `0`.
///
/// The external renderer can emit NaNs for out-of-range lattice samples;
/// downstream LUT readers reject them.
pub fn scrub_nan(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while !rest.is_empty() {
        let minus = rest.starts_with('-');
        let probe = if minus { &rest[1..] } else { rest };
        if probe.len() >= 3 && probe[..3].eq_ignore_ascii_case("nan") {
            out.push('0');
            rest = &probe[3..];
        } else if let Some(ch) = rest.chars().next() {
            out.push(ch);
            rest = &rest[ch.len_utf8()..];
        }
    }
    out
}

/// Scientific notation with a signed two-digit exponent, e.g.
/// `1.2500000000e-01`.
pub(crate) fn fmt_sci(value: f32) -> String {
    let rendered = format!("{value:.10e}");
    let Some((mantissa, exponent)) = rendered.split_once('e') else {
        return rendered;
    };
    match exponent.strip_prefix('-') {
        Some(digits) => format!("{mantissa}e-{digits:0>2}"),
        None => format!("{mantissa}e+{exponent:0>2}"),
    }
}

/// Plain decimal with a guaranteed decimal point, e.g. `1.0`, `-0.125`.
pub(crate) fn fmt_float(value: f32) -> String {
    if value == value.trunc() && value.is_finite() {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_sci_pads_exponent_to_two_digits() {
        assert_eq!(fmt_sci(1.0), "1.0000000000e+00");
        assert_eq!(fmt_sci(-0.125), "-1.2500000000e-01");
        assert_eq!(fmt_sci(0.0), "0.0000000000e+00");
        assert_eq!(fmt_sci(1.0e12), "1.0000000000e+12");
    }

    #[test]
    fn test_fmt_float_keeps_decimal_point() {
        assert_eq!(fmt_float(0.0), "0.0");
        assert_eq!(fmt_float(1.0), "1.0");
        assert_eq!(fmt_float(-0.125), "-0.125");
        assert_eq!(fmt_float(1.125), "1.125");
    }

    #[test]
    fn test_scrub_nan_zeroes_all_token_spellings() {
        assert_eq!(scrub_nan("1.0 nan -nan NaN -NAN 2.0"), "1.0 0 0 0 0 2.0");
    }

    #[test]
    fn test_scrub_nan_leaves_negative_numbers_alone() {
        assert_eq!(scrub_nan("-1.25 -0.5"), "-1.25 -0.5");
    }

    #[test]
    fn test_unsupported_1d_dialect_is_an_error() {
        let lut = Lut1d {
            domain_min: 0.0,
            domain_max: 1.0,
            channels: 1,
            data: vec![0.0, 1.0],
        };
        let dir = tempfile::tempdir().unwrap();
        let err = write_1d(&dir.path().join("x.3dl"), LutFormat::Flame, &lut, 3).unwrap_err();
        assert!(matches!(
            err,
            CoreError::UnsupportedFormat {
                format: LutFormat::Flame,
                dim: 1
            }
        ));
    }

    #[test]
    fn test_format_support_tables() {
        assert!(LutFormat::Spi1d.supports_1d());
        assert!(!LutFormat::Spi1d.supports_3d());
        assert!(LutFormat::Ctl.supports_1d());
        assert!(!LutFormat::Ctl.supports_3d());
        assert!(LutFormat::Houdini.supports_3d());
        assert!(!LutFormat::Houdini.supports_1d());
        assert_eq!(LutFormat::Flame.extension(), "3dl");
        assert_eq!(LutFormat::Lustre.extension(), "3dl");
    }
}
