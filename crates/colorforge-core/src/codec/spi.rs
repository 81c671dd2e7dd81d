//! Sony Pictures Imageworks text dialects: `.spi1d` and `.spi3d`.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::codec::{Lut1d, fmt_float, fmt_sci};
use crate::error::CoreError;
use crate::lattice::Lattice;

/// Renders the `.spi1d` text block. Header field order is fixed:
/// `Version`, `From`, `Length`, `Components`, then the braced sample block.
pub(crate) fn render_spi1d(lut: &Lut1d, components: u32) -> String {
    let entries = lut.entries();
    let channels = lut.channels as usize;

    let mut out = String::new();
    out.push_str("Version 1\n");
    let _ = writeln!(
        out,
        "From {} {}",
        fmt_float(lut.domain_min),
        fmt_float(lut.domain_max)
    );
    let _ = writeln!(out, "Length {entries}");
    let _ = writeln!(out, "Components {components}");
    out.push_str("{\n");
    for i in 0..entries {
        for j in 0..components as usize {
            out.push(' ');
            out.push_str(&fmt_sci(lut.data[i * channels + j]));
        }
        out.push('\n');
    }
    out.push_str("}\n");
    out
}

/// Reads a `.spi1d` file back into a payload.
pub fn read_spi1d(path: &Path) -> Result<Lut1d, CoreError> {
    let malformed = |reason: &str| CoreError::MalformedLut {
        path: path.to_path_buf(),
        reason: reason.to_owned(),
    };

    let text = fs::read_to_string(path)?;
    let mut lines = text.lines();

    let version = lines.next().ok_or_else(|| malformed("missing header"))?;
    if version.trim() != "Version 1" {
        return Err(malformed("unsupported version"));
    }

    let from = lines.next().ok_or_else(|| malformed("missing From line"))?;
    let mut from_fields = from
        .strip_prefix("From")
        .ok_or_else(|| malformed("missing From line"))?
        .split_whitespace();
    let domain_min: f32 = from_fields
        .next()
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| malformed("bad From minimum"))?;
    let domain_max: f32 = from_fields
        .next()
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| malformed("bad From maximum"))?;

    let length: usize = lines
        .next()
        .and_then(|l| l.strip_prefix("Length"))
        .and_then(|v| v.trim().parse().ok())
        .ok_or_else(|| malformed("bad Length line"))?;
    let components: u32 = lines
        .next()
        .and_then(|l| l.strip_prefix("Components"))
        .and_then(|v| v.trim().parse().ok())
        .ok_or_else(|| malformed("bad Components line"))?;

    if lines.next().map(str::trim) != Some("{") {
        return Err(malformed("missing opening brace"));
    }

    let mut data = Vec::with_capacity(length * components as usize);
    for line in lines {
        let line = line.trim();
        if line == "}" {
            break;
        }
        for field in line.split_whitespace() {
            let value: f32 = field.parse().map_err(|_| malformed("bad sample value"))?;
            data.push(value);
        }
    }

    if data.len() != length * components as usize {
        return Err(malformed("sample count does not match Length header"));
    }

    Ok(Lut1d {
        domain_min,
        domain_max,
        channels: components,
        data,
    })
}

/// Renders the `.spi3d` cube. Row order follows the lattice layout: red
/// varies fastest, then green, then blue.
pub(crate) fn render_spi3d(lattice: &Lattice) -> String {
    let res = lattice.resolution as usize;
    let channels = lattice.channels as usize;

    let mut out = String::new();
    out.push_str("SPILUT 1.0\n");
    out.push_str("3 3\n");
    let _ = writeln!(out, "{res} {res} {res}");
    for s in 0..lattice.sample_count() {
        let r = s % res;
        let g = (s / res) % res;
        let b = s / (res * res);
        let _ = write!(out, "{r} {g} {b}");
        for c in 0..channels.min(3) {
            out.push(' ');
            out.push_str(&fmt_float(lattice.data[s * channels + c]));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::sample_3d;

    fn affine_lut(resolution: usize, domain_min: f32, domain_max: f32) -> Lut1d {
        // y = 2x + 1 sampled over the domain.
        let data = (0..resolution)
            .map(|i| {
                let x = domain_min
                    + i as f32 / (resolution - 1) as f32 * (domain_max - domain_min);
                2.0 * x + 1.0
            })
            .collect();
        Lut1d {
            domain_min,
            domain_max,
            channels: 1,
            data,
        }
    }

    #[test]
    fn test_spi1d_header_field_order_is_fixed() {
        let lut = affine_lut(4, 0.0, 1.0);
        let text = render_spi1d(&lut, 1);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Version 1");
        assert_eq!(lines[1], "From 0.0 1.0");
        assert_eq!(lines[2], "Length 4");
        assert_eq!(lines[3], "Components 1");
        assert_eq!(lines[4], "{");
        assert_eq!(*lines.last().unwrap(), "}");
    }

    #[test]
    fn test_spi1d_round_trip_reproduces_domain_and_samples() {
        let lut = affine_lut(64, -0.125, 1.125);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("affine.spi1d");
        crate::codec::write_1d(&path, crate::codec::LutFormat::Spi1d, &lut, 1).unwrap();

        let restored = read_spi1d(&path).unwrap();
        assert_eq!(restored.domain_min, -0.125);
        assert_eq!(restored.domain_max, 1.125);
        assert_eq!(restored.entries(), 64);
        for (a, b) in lut.data.iter().zip(&restored.data) {
            assert!((a - b).abs() < 1e-6, "sample drifted: {a} vs {b}");
        }
    }

    #[test]
    fn test_spi1d_clamps_components_to_channel_count() {
        let lut = affine_lut(4, 0.0, 1.0);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clamp.spi1d");
        // Ask for 3 components from single-channel data.
        crate::codec::write_1d(&path, crate::codec::LutFormat::Spi1d, &lut, 3).unwrap();
        let restored = read_spi1d(&path).unwrap();
        assert_eq!(restored.channels, 1);
    }

    #[test]
    fn test_spi3d_header_and_corner_rows() {
        let cube = sample_3d(2).unwrap();
        let text = render_spi3d(&cube);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "SPILUT 1.0");
        assert_eq!(lines[1], "3 3");
        assert_eq!(lines[2], "2 2 2");
        assert_eq!(lines[3], "0 0 0 0.0 0.0 0.0");
        // Second row advances red only.
        assert_eq!(lines[4], "1 0 0 1.0 0.0 0.0");
        assert_eq!(*lines.last().unwrap(), "1 1 1 1.0 1.0 1.0");
    }
}
