//! Inline CTL 1D dialect — a literal source array plus a `main()` shader.

use std::fmt::Write as _;

use crate::codec::{Lut1d, fmt_float};

/// Renders a `.ctl` source file embedding the payload.
///
/// The `main()` signature is fixed: four varying inputs, four varying
/// outputs, alpha passed through. One `lut[]` array is emitted for a single
/// written component, `lut0..lut2` for three.
pub(crate) fn render_ctl_1d(lut: &Lut1d, components: u32) -> String {
    let entries = lut.entries();
    let channels = lut.channels as usize;

    let mut out = String::new();
    let _ = writeln!(out, "// {entries} x {components} LUT generated by \"colorforge\"");
    out.push('\n');
    let _ = writeln!(out, "const float min1d = {};", fmt_float(lut.domain_min));
    let _ = writeln!(out, "const float max1d = {};", fmt_float(lut.domain_max));
    out.push('\n');

    if components == 1 {
        write_array(&mut out, "lut", lut, 0, entries, channels);
    } else {
        for j in 0..components as usize {
            write_array(&mut out, &format!("lut{j}"), lut, j, entries, channels);
        }
    }

    out.push_str("void main\n");
    out.push_str("(\n");
    out.push_str("  input varying float rIn,\n");
    out.push_str("  input varying float gIn,\n");
    out.push_str("  input varying float bIn,\n");
    out.push_str("  input varying float aIn,\n");
    out.push_str("  output varying float rOut,\n");
    out.push_str("  output varying float gOut,\n");
    out.push_str("  output varying float bOut,\n");
    out.push_str("  output varying float aOut\n");
    out.push_str(")\n");
    out.push_str("{\n");
    out.push_str("  float r = rIn;\n");
    out.push_str("  float g = gIn;\n");
    out.push_str("  float b = bIn;\n");
    out.push('\n');
    out.push_str("  // Apply LUT\n");
    if components == 1 {
        out.push_str("  r = lookup1D(lut, min1d, max1d, r);\n");
        out.push_str("  g = lookup1D(lut, min1d, max1d, g);\n");
        out.push_str("  b = lookup1D(lut, min1d, max1d, b);\n");
    } else if components == 3 {
        out.push_str("  r = lookup1D(lut0, min1d, max1d, r);\n");
        out.push_str("  g = lookup1D(lut1, min1d, max1d, g);\n");
        out.push_str("  b = lookup1D(lut2, min1d, max1d, b);\n");
    }
    out.push('\n');
    out.push_str("  rOut = r;\n");
    out.push_str("  gOut = g;\n");
    out.push_str("  bOut = b;\n");
    out.push_str("  aOut = aIn;\n");
    out.push_str("}\n");
    out
}

fn write_array(
    out: &mut String,
    name: &str,
    lut: &Lut1d,
    channel: usize,
    entries: usize,
    channels: usize,
) {
    let _ = writeln!(out, "const float {name}[] = {{");
    for i in 0..entries {
        out.push_str(&fmt_float(lut.data[i * channels + channel]));
        if i != entries - 1 {
            out.push(',');
        }
        out.push('\n');
    }
    out.push_str("};\n");
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray_ramp() -> Lut1d {
        Lut1d {
            domain_min: 0.0,
            domain_max: 1.0,
            channels: 1,
            data: vec![0.0, 0.5, 1.0],
        }
    }

    #[test]
    fn test_ctl_main_signature_is_fixed() {
        let text = render_ctl_1d(&gray_ramp(), 1);
        let expected = "void main\n(\n  input varying float rIn,\n  input varying float gIn,\n  \
                        input varying float bIn,\n  input varying float aIn,\n  output varying \
                        float rOut,\n  output varying float gOut,\n  output varying float bOut,\n  \
                        output varying float aOut\n)";
        assert!(text.contains(expected), "main() signature drifted:\n{text}");
    }

    #[test]
    fn test_ctl_single_component_uses_one_array() {
        let text = render_ctl_1d(&gray_ramp(), 1);
        assert!(text.contains("const float lut[] = {"));
        assert!(text.contains("r = lookup1D(lut, min1d, max1d, r);"));
        assert!(!text.contains("lut0"));
    }

    #[test]
    fn test_ctl_three_components_use_per_channel_arrays() {
        let lut = Lut1d {
            domain_min: 0.0,
            domain_max: 1.0,
            channels: 3,
            data: vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6],
        };
        let text = render_ctl_1d(&lut, 3);
        for name in ["lut0", "lut1", "lut2"] {
            assert!(text.contains(&format!("const float {name}[] = {{")));
        }
        assert!(text.contains("g = lookup1D(lut1, min1d, max1d, g);"));
    }

    #[test]
    fn test_ctl_domain_constants_written_verbatim() {
        let lut = Lut1d {
            domain_min: -0.125,
            domain_max: 1.125,
            channels: 1,
            data: vec![0.0, 1.0],
        };
        let text = render_ctl_1d(&lut, 1);
        assert!(text.contains("const float min1d = -0.125;"));
        assert!(text.contains("const float max1d = 1.125;"));
    }
}
