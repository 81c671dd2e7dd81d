//! ARRI camera color spaces: LogC v3 at the EI 800 nominal and the ALEXA
//! Wide Gamut primaries.

use crate::error::ConfigError;
use crate::space::{ColorSpace, sanitize};
use crate::spaces::{LutSettings, camera_linear_space, camera_log_space};

const FAMILY: &str = "Input/ARRI";

const EXPOSURE_INDEX: u32 = 800;

/// ARRI LogC v3 decoding at EI 800, normalized code values in.
///
/// Constants from the ARRI "LogC Curve — Usage in VFX" specification.
#[derive(Debug, Clone, Copy)]
pub struct LogC3;

impl LogC3 {
    const A: f32 = 5.555556;
    const B: f32 = 0.052272;
    const C: f32 = 0.247190;
    const D: f32 = 0.385537;
    const E: f32 = 5.367655;
    const F: f32 = 0.092809;
    // Encoded value of the linear-segment cut, E * 0.010591 + F.
    const E_CUT: f32 = 0.149_651;

    pub fn to_linear(encoded: f32) -> f32 {
        if encoded <= Self::E_CUT {
            (encoded - Self::F) / Self::E
        } else {
            (10.0_f32.powf((encoded - Self::D) / Self::C) - Self::B) / Self::A
        }
    }
}

/// ALEXA Wide Gamut primaries to reference primaries.
pub const ALEXA_WIDE_GAMUT_TO_REFERENCE: [f64; 9] = [
    0.680206, 0.236137, 0.083658, //
    0.085415, 1.017471, -0.102886, //
    0.002057, -0.062563, 1.060506,
];

fn curve_name() -> String {
    format!("V3 LogC (EI{EXPOSURE_INDEX})")
}

fn curve_stem() -> String {
    sanitize(&format!("V3 LogC_{EXPOSURE_INDEX}"))
}

/// Full camera space: LogC curve plus Wide Gamut primaries.
pub fn log_encoded(luts: LutSettings<'_>, aliases: &[&str]) -> Result<ColorSpace, ConfigError> {
    let mut cs = camera_log_space(
        &format!("{} - Wide Gamut", curve_name()),
        &curve_stem(),
        LogC3::to_linear,
        luts,
        Some(ALEXA_WIDE_GAMUT_TO_REFERENCE),
        FAMILY,
        aliases,
    )?;
    cs.aces_transform_id = Some(format!("IDT.ARRI.Alexa-v3-logC-EI{EXPOSURE_INDEX}.a1.v1"));
    Ok(cs)
}

/// Linearization only, no gamut conversion.
pub fn curve_only(luts: LutSettings<'_>, aliases: &[&str]) -> Result<ColorSpace, ConfigError> {
    camera_log_space(
        &format!("Curve - {}", curve_name()),
        &curve_stem(),
        LogC3::to_linear,
        luts,
        None,
        FAMILY,
        aliases,
    )
}

/// Primaries only, already linear.
pub fn linear_only(aliases: &[&str]) -> ColorSpace {
    camera_linear_space(
        "Linear - ALEXA Wide Gamut",
        ALEXA_WIDE_GAMUT_TO_REFERENCE,
        FAMILY,
        aliases,
    )
}

/// The ARRI roster. The LogC shaper needs at least 16-bit resolution to
/// resolve the toe, whatever the configured default.
pub fn colorspaces(luts: LutSettings<'_>) -> Result<Vec<ColorSpace>, ConfigError> {
    luts.validate()?;
    let luts = LutSettings {
        resolution_1d: luts.resolution_1d.max(65536),
        ..luts
    };
    Ok(vec![
        log_encoded(luts, &["logc3ei800_alexawide"])?,
        curve_only(luts, &["crv_logc3ei800"])?,
        linear_only(&["lin_alexawide"]),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logc3_decodes_mid_grey_near_published_anchor() {
        // EI 800 encodes scene mid grey (0.18) near code 0.391.
        let encoded = 0.391007;
        assert!((LogC3::to_linear(encoded) - 0.18).abs() < 0.005);
    }

    #[test]
    fn test_logc3_is_continuous_at_the_cut() {
        let below = LogC3::to_linear(LogC3::E_CUT - 1e-4);
        let above = LogC3::to_linear(LogC3::E_CUT + 1e-4);
        assert!((below - above).abs() < 1e-3);
    }

    #[test]
    fn test_roster_writes_a_16_bit_shaper_even_with_a_small_default() {
        let dir = tempfile::tempdir().unwrap();
        let spaces = colorspaces(LutSettings::new(dir.path(), 1024)).unwrap();
        assert_eq!(spaces.len(), 3);
        assert_eq!(spaces[0].name, "V3 LogC (EI800) - Wide Gamut");
        assert_eq!(
            spaces[0].aces_transform_id.as_deref(),
            Some("IDT.ARRI.Alexa-v3-logC-EI800.a1.v1")
        );

        let lut = colorforge_core::codec::read_spi1d(
            &dir.path().join("V3_LogC_800_to_linear.spi1d"),
        )
        .unwrap();
        assert_eq!(lut.entries(), 65536);
    }
}
