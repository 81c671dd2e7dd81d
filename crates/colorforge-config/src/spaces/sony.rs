//! Sony camera color spaces: S-Log curves and S-Gamut primaries.
//!
//! Curve constants follow the published Sony specifications, expressed over
//! 10-bit code values. Matrices convert camera primaries to the reference
//! primaries.

use crate::error::ConfigError;
use crate::space::ColorSpace;
use crate::spaces::{LutSettings, camera_linear_space, camera_log_space};

const FAMILY: &str = "Input/Sony";

/// Sony S-Log1 decoding, 10-bit code values in, scene-linear out.
#[derive(Debug, Clone, Copy)]
pub struct SLog1;

impl SLog1 {
    const BLACK: f32 = 64.0;
    const ANCHOR: f32 = 90.0;
    const WHITE: f32 = 940.0;

    pub fn to_linear(code_value: f32) -> f32 {
        let ire = (code_value - Self::BLACK) / (Self::WHITE - Self::BLACK);
        if code_value >= Self::ANCHOR {
            (10.0_f32.powf((ire - 0.616596 - 0.03) / 0.432699) - 0.037584) * 0.9
        } else {
            (ire - 0.030_001_223) / 5.0 * 0.9
        }
    }
}

/// Sony S-Log2 decoding, 10-bit code values in, scene-linear out.
#[derive(Debug, Clone, Copy)]
pub struct SLog2;

impl SLog2 {
    pub fn to_linear(code_value: f32) -> f32 {
        let ire = (code_value - SLog1::BLACK) / (SLog1::WHITE - SLog1::BLACK);
        if code_value >= SLog1::ANCHOR {
            219.0 * (10.0_f32.powf((ire - 0.616596 - 0.03) / 0.432699) - 0.037584) / 155.0 * 0.9
        } else {
            (ire - 0.030_001_223) / 3.538_812_8 * 0.9
        }
    }
}

/// Sony S-Log3 decoding, 10-bit code values in, scene-linear out.
#[derive(Debug, Clone, Copy)]
pub struct SLog3;

impl SLog3 {
    const LINEAR_BELOW: f32 = 171.210_29;

    pub fn to_linear(code_value: f32) -> f32 {
        if code_value >= Self::LINEAR_BELOW {
            10.0_f32.powf((code_value - 420.0) / 261.5) * (0.18 + 0.01) - 0.01
        } else {
            (code_value - 95.0) * 0.011_25 / (Self::LINEAR_BELOW - 95.0)
        }
    }
}

/// The S-Log transfer functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SonyCurve {
    SLog1,
    SLog2,
    SLog3,
}

impl SonyCurve {
    pub const fn name(self) -> &'static str {
        match self {
            Self::SLog1 => "S-Log1",
            Self::SLog2 => "S-Log2",
            Self::SLog3 => "S-Log3",
        }
    }

    pub fn to_linear(self, code_value: f32) -> f32 {
        match self {
            Self::SLog1 => SLog1::to_linear(code_value),
            Self::SLog2 => SLog2::to_linear(code_value),
            Self::SLog3 => SLog3::to_linear(code_value),
        }
    }

    const fn id_token(self) -> &'static str {
        match self {
            Self::SLog1 => "SLog1",
            Self::SLog2 => "SLog2",
            Self::SLog3 => "SLog3",
        }
    }
}

/// The S-Gamut encoding primaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SonyGamut {
    SGamut,
    SGamutDaylight,
    SGamutTungsten,
    SGamut3,
    SGamut3Cine,
}

impl SonyGamut {
    pub const fn name(self) -> &'static str {
        match self {
            Self::SGamut => "S-Gamut",
            Self::SGamutDaylight => "S-Gamut Daylight",
            Self::SGamutTungsten => "S-Gamut Tungsten",
            Self::SGamut3 => "S-Gamut3",
            Self::SGamut3Cine => "S-Gamut3.Cine",
        }
    }

    /// Camera primaries to reference primaries.
    pub const fn to_reference_matrix(self) -> [f64; 9] {
        match self {
            Self::SGamut => [
                0.754338638, 0.133697046, 0.111968437, //
                0.021198141, 1.005410934, -0.026610548, //
                -0.009756991, 0.004508563, 1.005253201,
            ],
            Self::SGamutDaylight => [
                0.8764457030, 0.0145411681, 0.1090131290, //
                0.0774075345, 0.9529571767, -0.0303647111, //
                0.0573564351, -0.1151066335, 1.0577501984,
            ],
            Self::SGamutTungsten => [
                1.0110238740, -0.1362526051, 0.1252287310, //
                0.1011994504, 0.9562196265, -0.0574190769, //
                0.0600766530, -0.1010185315, 1.0409418785,
            ],
            Self::SGamut3 => [
                0.7529825954, 0.1433702162, 0.1036471884, //
                0.0217076974, 1.0153188355, -0.0370265329, //
                -0.0094160528, 0.0033704179, 1.0060456349,
            ],
            Self::SGamut3Cine => [
                0.6387886672, 0.2723514337, 0.0888598992, //
                -0.0039159061, 1.0880732308, -0.0841573249, //
                -0.0299072021, -0.0264325799, 1.0563397820,
            ],
        }
    }

    const fn id_token(self) -> &'static str {
        match self {
            Self::SGamut => "SGamut",
            Self::SGamutDaylight => "SGamut_Daylight",
            Self::SGamutTungsten => "SGamut_Tungsten",
            Self::SGamut3 => "SGamut3",
            Self::SGamut3Cine => "SGamut3.Cine",
        }
    }
}

/// Full camera space: curve plus gamut.
pub fn log_encoded(
    curve: SonyCurve,
    gamut: SonyGamut,
    luts: LutSettings<'_>,
    aliases: &[&str],
) -> Result<ColorSpace, ConfigError> {
    let name = format!("{} - {}", curve.name(), gamut.name());
    let mut cs = camera_log_space(
        &name,
        curve.name(),
        |x| curve.to_linear(1023.0 * x),
        luts,
        Some(gamut.to_reference_matrix()),
        FAMILY,
        aliases,
    )?;
    cs.aces_transform_id = Some(format!(
        "IDT.Sony.{}_{}_10i.a1.v1",
        curve.id_token(),
        gamut.id_token()
    ));
    Ok(cs)
}

/// Linearization only, no gamut conversion.
pub fn curve_only(
    curve: SonyCurve,
    luts: LutSettings<'_>,
    aliases: &[&str],
) -> Result<ColorSpace, ConfigError> {
    camera_log_space(
        &format!("Curve - {}", curve.name()),
        curve.name(),
        |x| curve.to_linear(1023.0 * x),
        luts,
        None,
        FAMILY,
        aliases,
    )
}

/// Primaries only, already linear.
pub fn linear_only(gamut: SonyGamut, aliases: &[&str]) -> ColorSpace {
    camera_linear_space(
        &format!("Linear - {}", gamut.name()),
        gamut.to_reference_matrix(),
        FAMILY,
        aliases,
    )
}

/// The full Sony roster.
pub fn colorspaces(luts: LutSettings<'_>) -> Result<Vec<ColorSpace>, ConfigError> {
    use SonyGamut::{SGamut, SGamut3, SGamut3Cine, SGamutDaylight, SGamutTungsten};

    luts.validate()?;
    let mut spaces = vec![
        log_encoded(SonyCurve::SLog1, SGamut, luts, &["slog1_sgamut"])?,
        log_encoded(SonyCurve::SLog2, SGamut, luts, &["slog2_sgamut"])?,
        log_encoded(SonyCurve::SLog2, SGamutDaylight, luts, &["slog2_sgamutday"])?,
        log_encoded(SonyCurve::SLog2, SGamutTungsten, luts, &["slog2_sgamuttung"])?,
        log_encoded(SonyCurve::SLog3, SGamut3, luts, &["slog3_sgamut3"])?,
        log_encoded(SonyCurve::SLog3, SGamut3Cine, luts, &["slog3_sgamutcine"])?,
        curve_only(SonyCurve::SLog1, luts, &["crv_slog1"])?,
        curve_only(SonyCurve::SLog2, luts, &["crv_slog2"])?,
        curve_only(SonyCurve::SLog3, luts, &["crv_slog3"])?,
    ];
    spaces.push(linear_only(SGamut, &["lin_sgamut"]));
    spaces.push(linear_only(SGamutDaylight, &["lin_sgamutday"]));
    spaces.push(linear_only(SGamutTungsten, &["lin_sgamuttung"]));
    spaces.push(linear_only(SGamut3, &["lin_sgamut3"]));
    spaces.push(linear_only(SGamut3Cine, &["lin_sgamut3cine"]));
    Ok(spaces)
}
