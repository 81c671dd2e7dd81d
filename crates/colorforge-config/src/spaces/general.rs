//! General-purpose utility color spaces: standard display curves, gamma
//! textures, the Raw data space, and the Log2 shapers the bake driver
//! references.

use colorforge_core::TransformStep;
use colorforge_core::transform::mat44_from_mat33;

use crate::error::ConfigError;
use crate::space::{ColorSpace, compact, sanitize};
use crate::spaces::{
    LutSettings, camera_log_space, matrix_plus_gamma_space, matrix_plus_transfer_space,
    matrix_space, transfer_space,
};

/// Reference primaries to CIE XYZ (D60).
pub const REFERENCE_TO_XYZ: [f64; 9] = [
    0.9525523959, 0.0000000000, 0.0000936786, //
    0.3439664498, 0.7281660966, -0.0721325464, //
    0.0000000000, 0.0000000000, 1.0088251844,
];

/// CIE XYZ (D60) to reference primaries.
pub const XYZ_TO_REFERENCE: [f64; 9] = [
    1.0498110175, 0.0000000000, -0.0000974845, //
    -0.4959030231, 1.3733130458, 0.0982400361, //
    0.0000000000, 0.0000000000, 0.9912520182,
];

/// CIE XYZ to P3-D60 primaries.
pub const XYZ_TO_P3D60: [f64; 9] = [
    2.4027414142, -0.8974841639, -0.3880533700, //
    -0.8325796487, 1.7692317536, 0.0237127115, //
    0.0388233815, -0.0824996856, 1.0363685997,
];

/// CIE XYZ to Rec.709 primaries.
pub const XYZ_TO_REC709: [f64; 9] = [
    3.20959735, -1.55742955, -0.49580497, //
    -0.97098887, 1.88517118, 0.03948941, //
    0.05971934, -0.21010444, 1.14312482,
];

/// Working primaries (AP1) to reference primaries.
pub const AP1_TO_REFERENCE: [f64; 9] = [
    0.6954522414, 0.1406786965, 0.1638690622, //
    0.0447945634, 0.8596711185, 0.0955343182, //
    -0.0055258826, 0.0040252103, 1.0015006723,
];

/// sRGB encoding per IEC 61966-2-1.
pub fn linear_to_srgb(l: f32) -> f32 {
    if l <= 0.0031308 {
        l * 12.92
    } else {
        1.055 * l.powf(1.0 / 2.4) - 0.055
    }
}

pub fn srgb_to_linear(v: f32) -> f32 {
    if v < linear_to_srgb(0.0031308) {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

/// Rec.709 camera OETF.
pub fn linear_to_rec709(l: f32) -> f32 {
    if l < 0.018 {
        l * 4.5
    } else {
        1.099 * l.powf(0.45) - 0.099
    }
}

pub fn rec709_to_linear(e: f32) -> f32 {
    if e < linear_to_rec709(0.018) {
        e / 4.5
    } else {
        ((e + 0.099) / 1.099).powf(1.0 / 0.45)
    }
}

/// Log base 2 encoding covering a fixed stop range around middle grey.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Log2Shaper {
    pub middle_grey: f32,
    pub min_exposure: f32,
    pub max_exposure: f32,
}

impl Log2Shaper {
    pub fn to_linear(self, encoded: f32) -> f32 {
        let stops = self.min_exposure + encoded * (self.max_exposure - self.min_exposure);
        self.middle_grey * stops.exp2()
    }

    pub fn to_encoded(self, linear: f32) -> f32 {
        ((linear / self.middle_grey).log2() - self.min_exposure)
            / (self.max_exposure - self.min_exposure)
    }
}

/// The `Raw` utility space: data passed through untouched.
pub fn raw() -> ColorSpace {
    let mut cs = ColorSpace::new("Raw");
    cs.aliases = vec!["raw".to_owned()];
    cs.equality_group = "Raw".to_owned();
    cs.family = "Utility".to_owned();
    cs.is_data = true;
    cs
}

/// One shaper space plus its AP1-primaries variant.
pub fn log2_shaper_pair(
    name: &str,
    shaper: Log2Shaper,
    luts: LutSettings<'_>,
) -> Result<[ColorSpace; 2], ConfigError> {
    let alias = format!("crv_{}", compact(name));
    let base = camera_log_space(
        name,
        &sanitize(name),
        |x| shaper.to_linear(x),
        luts,
        None,
        "Utility",
        &[alias.as_str()],
    )?;

    let mut ap1 = base.clone();
    ap1.name = format!("{name} - AP1");
    ap1.description = ap1.name.clone();
    ap1.aliases = vec![format!("{}_ap1", compact(name))];
    ap1.equality_group = ap1.name.clone();
    ap1.to_reference
        .push(TransformStep::matrix(mat44_from_mat33(AP1_TO_REFERENCE)));
    Ok([base, ap1])
}

/// The shaper set the bake driver selects from, by peak luminance.
///
/// The 48 nits domain is wider than the nominal [-6.5, 6.5] so the shaper
/// also spans the full log working-space range.
const SHAPER_LEVELS: [(&str, f32, f32); 4] = [
    ("Log2 48 nits Shaper", -7.246_068_8, 10.273_931),
    ("Log2 1000 nits Shaper", -12.0, 10.0),
    ("Log2 2000 nits Shaper", -12.0, 11.0),
    ("Log2 4000 nits Shaper", -12.0, 12.0),
];

/// The general roster.
pub fn colorspaces(luts: LutSettings<'_>) -> Result<Vec<ColorSpace>, ConfigError> {
    luts.validate()?;
    let display = [REFERENCE_TO_XYZ, XYZ_TO_REC709];

    let mut g18 = matrix_plus_gamma_space(
        "Gamma 1.8 - Rec.709 - Texture",
        1.8,
        &[],
        &display,
        &["g18_rec709"],
    );
    g18.description =
        "The Gamma 1.8 - Rec.709 color space for importing certain textures.".to_owned();
    let mut g22 = matrix_plus_gamma_space(
        "Gamma 2.2 - Rec.709 - Texture",
        2.2,
        &[],
        &display,
        &["g22_rec709"],
    );
    g22.description =
        "The Gamma 2.2 - Rec.709 color space for importing certain textures.".to_owned();
    let mut g24 = matrix_plus_gamma_space(
        "Gamma 2.4 - Rec.709 - Texture",
        2.4,
        &[],
        &display,
        &["g24_rec709"],
    );
    g24.description =
        "The Gamma 2.4 - Rec.709 color space for importing certain textures.".to_owned();

    let mut spaces = vec![
        matrix_space(
            "XYZ - D60",
            &[XYZ_TO_REFERENCE],
            &[REFERENCE_TO_XYZ],
            &["lin_xyz_d60"],
        ),
        matrix_space(
            "Linear - P3-D60",
            &[],
            &[REFERENCE_TO_XYZ, XYZ_TO_P3D60],
            &["lin_p3d60"],
        ),
        transfer_space("Curve - sRGB", "sRGB", linear_to_srgb, luts, &["crv_srgb"])?,
        matrix_plus_transfer_space(
            "sRGB - Texture",
            "sRGB",
            linear_to_srgb,
            luts,
            &[],
            &display,
            &["srgb_texture"],
        )?,
        transfer_space(
            "Curve - Rec.709",
            "rec709",
            linear_to_rec709,
            luts,
            &["crv_rec709"],
        )?,
        matrix_plus_transfer_space(
            "Rec.709 - Camera",
            "rec709",
            linear_to_rec709,
            luts,
            &[],
            &display,
            &["rec709_camera"],
        )?,
        g18,
        g22,
        g24,
        raw(),
    ];

    for (name, min_exposure, max_exposure) in SHAPER_LEVELS {
        let shaper = Log2Shaper {
            middle_grey: 0.18,
            min_exposure,
            max_exposure,
        };
        spaces.extend(log2_shaper_pair(name, shaper, luts)?);
    }
    Ok(spaces)
}
