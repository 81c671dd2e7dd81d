//! Rising Sun Research Cinespace `.csp` 1D dialect.

use std::fmt::Write as _;

use crate::codec::{Lut1d, fmt_float, fmt_sci};

/// Renders the `.csp` 1D block.
///
/// The preamble is fixed: magic, dimensionality, empty metadata block, then
/// three identity per-channel pre-ramps spanning the payload domain. The
/// payload is framed by its sample count.
pub(crate) fn render_csp_1d(lut: &Lut1d, components: u32) -> String {
    let entries = lut.entries();
    let channels = lut.channels as usize;
    let domain = format!(
        "{} {}",
        fmt_float(lut.domain_min),
        fmt_float(lut.domain_max)
    );

    let mut out = String::new();
    out.push_str("CSPLUTV100\n");
    out.push_str("1D\n");
    out.push('\n');
    out.push_str("BEGIN METADATA\n");
    out.push_str("END METADATA\n");
    out.push('\n');
    for _ in 0..3 {
        out.push_str("2\n");
        let _ = writeln!(out, "{domain}");
        out.push_str("0.0 1.0\n");
    }
    out.push('\n');
    let _ = writeln!(out, "{entries}");

    if components == 1 {
        // Broadcast the single channel to all three written values.
        for i in 0..entries {
            let value = fmt_sci(lut.data[i * channels]);
            let _ = writeln!(out, " {value} {value} {value}");
        }
    } else {
        for i in 0..entries {
            for j in 0..components as usize {
                out.push(' ');
                out.push_str(&fmt_sci(lut.data[i * channels + j]));
            }
            out.push('\n');
        }
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csp_preamble_is_fixed() {
        let lut = Lut1d {
            domain_min: -0.125,
            domain_max: 1.125,
            channels: 1,
            data: vec![0.0, 0.5, 1.0],
        };
        let text = render_csp_1d(&lut, 1);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "CSPLUTV100");
        assert_eq!(lines[1], "1D");
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "BEGIN METADATA");
        assert_eq!(lines[4], "END METADATA");
        // Three identical pre-ramps covering the domain.
        for ramp in 0..3 {
            let base = 6 + ramp * 3;
            assert_eq!(lines[base], "2");
            assert_eq!(lines[base + 1], "-0.125 1.125");
            assert_eq!(lines[base + 2], "0.0 1.0");
        }
        assert_eq!(lines[16], "3");
    }

    #[test]
    fn test_csp_single_channel_broadcasts_to_three_values() {
        let lut = Lut1d {
            domain_min: 0.0,
            domain_max: 1.0,
            channels: 1,
            data: vec![0.25],
        };
        let text = render_csp_1d(&lut, 1);
        let row = text
            .lines()
            .find(|l| l.contains("e-01"))
            .expect("payload row");
        assert_eq!(row.split_whitespace().count(), 3);
    }

    #[test]
    fn test_csp_three_channel_rows_interleave() {
        let lut = Lut1d {
            domain_min: 0.0,
            domain_max: 1.0,
            channels: 3,
            data: vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6],
        };
        let text = render_csp_1d(&lut, 3);
        let rows: Vec<&str> = text.lines().filter(|l| l.starts_with(' ')).collect();
        assert_eq!(rows.len(), 2);
        let first: Vec<f32> = rows[0]
            .split_whitespace()
            .map(|v| v.parse().unwrap())
            .collect();
        assert!((first[0] - 0.1).abs() < 1e-6);
        assert!((first[2] - 0.3).abs() < 1e-6);
    }
}
