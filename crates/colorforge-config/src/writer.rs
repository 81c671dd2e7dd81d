//! Serialization of the finished graph to the industry config dialect.
//!
//! The dialect has a fixed top-level field order and per-node type tags, so
//! the text is emitted directly rather than through a generic serializer.
//! Presentation names are resolved here and only here; a name that never
//! entered the graph aborts the write.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use colorforge_core::{ComposedTransform, Direction, TransformChain, TransformStep};

use crate::error::ConfigError;
use crate::graph::NameTable;
use crate::space::ColorSpace;

/// One display and its ordered views.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayDef {
    pub name: String,
    pub views: Vec<ViewDef>,
}

/// One serialized view. `looks` is metadata attached under the multi-display
/// look policy.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewDef {
    pub name: String,
    pub colorspace: String,
    pub looks: Vec<String>,
}

/// One serialized look definition.
#[derive(Debug, Clone, PartialEq)]
pub struct LookDef {
    pub name: String,
    pub process_space: String,
    pub transform: TransformStep,
}

/// The finished, validated configuration. Produced only by a successful
/// graph build; never exists in a partially assembled state.
#[derive(Debug, Clone, Default)]
pub struct ConfigDocument {
    pub description: String,
    pub search_paths: Vec<String>,
    /// Role name → declared color space name.
    pub roles: Vec<(String, String)>,
    pub displays: Vec<DisplayDef>,
    pub active_displays: Vec<String>,
    pub active_views: Vec<String>,
    pub looks: Vec<LookDef>,
    /// Emission order: reference, looks, regular spaces, role spaces,
    /// deferred aliases.
    pub colorspaces: Vec<ColorSpace>,
    pub names: NameTable,
}

impl ConfigDocument {
    /// Renders the config text.
    pub fn serialize(&self) -> Result<String, ConfigError> {
        let mut out = String::new();
        out.push_str("ocio_profile_version: 1\n\n");

        let _ = writeln!(out, "search_path: {}", self.search_paths.join(":"));
        out.push_str("strictparsing: true\n");
        out.push_str("luma: [0.2126, 0.7152, 0.0722]\n\n");

        let _ = writeln!(out, "description: {}", self.description);
        out.push('\n');

        out.push_str("roles:\n");
        let mut roles = self.roles.clone();
        roles.sort();
        for (role, target) in &roles {
            let _ = writeln!(out, "  {role}: {}", self.names.present(target)?);
        }
        out.push('\n');

        out.push_str("displays:\n");
        for display in &self.displays {
            let _ = writeln!(out, "  {}:", display.name);
            for view in &display.views {
                let colorspace = self.names.present(&view.colorspace)?;
                if view.looks.is_empty() {
                    let _ = writeln!(
                        out,
                        "    - !<View> {{name: {}, colorspace: {colorspace}}}",
                        view.name
                    );
                } else {
                    let _ = writeln!(
                        out,
                        "    - !<View> {{name: {}, colorspace: {colorspace}, looks: {}}}",
                        view.name,
                        view.looks.join(", ")
                    );
                }
            }
        }
        out.push('\n');

        let _ = writeln!(out, "active_displays: [{}]", self.active_displays.join(", "));
        let _ = writeln!(out, "active_views: [{}]", self.active_views.join(", "));
        out.push('\n');

        if !self.looks.is_empty() {
            out.push_str("looks:\n");
            for look in &self.looks {
                out.push_str("  - !<Look>\n");
                let _ = writeln!(out, "    name: {}", look.name);
                let _ = writeln!(
                    out,
                    "    process_space: {}",
                    self.names.present(&look.process_space)?
                );
                let _ = writeln!(
                    out,
                    "    transform: {}",
                    render_step(&look.transform, &self.names)?
                );
            }
            out.push('\n');
        }

        out.push_str("colorspaces:\n");
        for space in &self.colorspaces {
            self.render_colorspace(&mut out, space)?;
        }
        Ok(out)
    }

    /// Serializes and writes the config file in one step.
    pub fn write_to(&self, path: &Path) -> Result<(), ConfigError> {
        let text = self.serialize()?;
        fs::write(path, text)?;
        Ok(())
    }

    fn render_colorspace(&self, out: &mut String, space: &ColorSpace) -> Result<(), ConfigError> {
        out.push_str("  - !<ColorSpace>\n");
        let _ = writeln!(out, "    name: {}", self.names.present(&space.name)?);
        let _ = writeln!(out, "    family: {}", space.family);
        let _ = writeln!(out, "    equalitygroup: \"{}\"", space.equality_group);
        let _ = writeln!(out, "    bitdepth: {}", space.bit_depth.as_str());

        let mut description = space.description.clone();
        if let Some(id) = &space.aces_transform_id {
            description.push_str("\n\nACES Transform ID : ");
            description.push_str(id);
        }
        if description.contains('\n') {
            out.push_str("    description: |\n");
            for line in description.lines() {
                if line.is_empty() {
                    out.push('\n');
                } else {
                    let _ = writeln!(out, "      {line}");
                }
            }
        } else {
            let _ = writeln!(out, "    description: {description}");
        }

        let _ = writeln!(out, "    isdata: {}", space.is_data);
        let _ = writeln!(out, "    allocation: {}", space.allocation.kind.as_str());
        let vars: Vec<String> = space.allocation.vars.iter().map(|v| fmt_num(*v)).collect();
        let _ = writeln!(out, "    allocationvars: [{}]", vars.join(", "));

        self.render_chain(out, "to_reference", &space.to_reference)?;
        self.render_chain(out, "from_reference", &space.from_reference)?;
        Ok(())
    }

    fn render_chain(
        &self,
        out: &mut String,
        field: &str,
        chain: &TransformChain,
    ) -> Result<(), ConfigError> {
        match chain.compose() {
            None => {}
            Some(ComposedTransform::Single(step)) => {
                let _ = writeln!(out, "    {field}: {}", render_step(&step, &self.names)?);
            }
            Some(ComposedTransform::Group(steps)) => {
                let _ = writeln!(out, "    {field}: !<GroupTransform>");
                out.push_str("      children:\n");
                for step in &steps {
                    let _ = writeln!(out, "        - {}", render_step(step, &self.names)?);
                }
            }
        }
        Ok(())
    }
}

fn render_step(step: &TransformStep, names: &NameTable) -> Result<String, ConfigError> {
    let rendered = match step {
        TransformStep::Matrix {
            matrix,
            offset,
            direction,
        } => {
            let matrix: Vec<String> = matrix.iter().map(|v| fmt_num(*v)).collect();
            let offset: Vec<String> = offset.iter().map(|v| fmt_num(*v)).collect();
            format!(
                "!<MatrixTransform> {{matrix: [{}], offset: [{}]{}}}",
                matrix.join(", "),
                offset.join(", "),
                direction_suffix(*direction)
            )
        }
        TransformStep::LutFile {
            path,
            interpolation,
            cccid,
            direction,
        } => {
            let cccid = match cccid {
                Some(id) => format!(", cccid: {id}"),
                None => String::new(),
            };
            format!(
                "!<FileTransform> {{src: {path}{cccid}, interpolation: {}{}}}",
                interpolation.as_str(),
                direction_suffix(*direction)
            )
        }
        TransformStep::Exponent { value } => {
            let value: Vec<String> = value.iter().map(|v| fmt_num(*v)).collect();
            format!("!<ExponentTransform> {{value: [{}]}}", value.join(", "))
        }
        TransformStep::Log { base, direction } => format!(
            "!<LogTransform> {{base: {}{}}}",
            fmt_num(*base),
            direction_suffix(*direction)
        ),
        TransformStep::ColorSpaceRef {
            src,
            dst,
            direction,
        } => format!(
            "!<ColorSpaceTransform> {{src: {}, dst: {}{}}}",
            names.present(src)?,
            names.present(dst)?,
            direction_suffix(*direction)
        ),
        TransformStep::LookRef {
            look,
            src,
            dst,
            direction,
        } => format!(
            "!<LookTransform> {{look: {look}, src: {}, dst: {}{}}}",
            names.present(src)?,
            names.present(dst)?,
            direction_suffix(*direction)
        ),
    };
    Ok(rendered)
}

/// Forward is the dialect default and stays implicit.
fn direction_suffix(direction: Direction) -> &'static str {
    match direction {
        Direction::Forward => "",
        Direction::Inverse => ", direction: inverse",
    }
}

fn fmt_num(value: f64) -> String {
    format!("{value}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{BuildOptions, ConfigData, Roles, View, build_config};
    use crate::look::Look;
    use crate::space::{Allocation, Naming};
    use colorforge_core::Interpolation;
    use std::collections::BTreeMap;

    fn sample_doc(naming: Naming) -> ConfigDocument {
        let mut reference = ColorSpace::new("ACES2065-1");
        reference.family = "ACES".to_owned();
        reference.aliases = vec!["lin_ap0".to_owned()];
        reference.allocation = Allocation::lg2();

        let mut log = ColorSpace::new("ACEScc");
        log.family = "ACES".to_owned();
        log.aces_transform_id = Some("ACEScsc.ACEScc_to_ACES.a1.0.3".to_owned());
        log.to_reference
            .push(TransformStep::lut_file("ACEScc_to_linear.spi1d", Interpolation::Linear));
        log.to_reference.push(TransformStep::matrix([
            1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0,
        ]));

        let mut raw = ColorSpace::new("Raw");
        raw.family = "Utility".to_owned();
        raw.is_data = true;

        let mut odt = ColorSpace::new("sRGB");
        odt.family = "Output".to_owned();
        odt.from_reference
            .push(TransformStep::lut_file("odt.spi3d", Interpolation::Tetrahedral));
        odt.to_reference
            .push(TransformStep::lut_file("inv.spi3d", Interpolation::Tetrahedral));

        let mut displays = BTreeMap::new();
        displays.insert("sRGB".to_owned(), vec![View::new("Output Transform", "sRGB")]);

        let data = ConfigData {
            reference,
            colorspaces: vec![log, raw, odt],
            roles: Roles {
                color_picking: "ACEScc".to_owned(),
                color_timing: "ACEScc".to_owned(),
                compositing_log: "ACEScc".to_owned(),
                data: "Raw".to_owned(),
                default: "ACES2065-1".to_owned(),
                matte_paint: "ACEScc".to_owned(),
                reference: "Raw".to_owned(),
                scene_linear: "ACES2065-1".to_owned(),
                texture_paint: "ACEScc".to_owned(),
            },
            displays,
            default_display: "sRGB".to_owned(),
        };
        let options = BuildOptions {
            description: "A test configuration".to_owned(),
            naming,
            looks: vec![Look::new("Grade", "ACEScc", "grade.cc", None)],
            ..BuildOptions::default()
        };
        build_config(&data, &options).unwrap()
    }

    #[test]
    fn test_top_level_field_order_is_fixed() {
        let text = sample_doc(Naming::FamilyPrefixed).serialize().unwrap();
        let positions: Vec<usize> = [
            "ocio_profile_version: 1",
            "search_path: luts",
            "strictparsing: true",
            "description: A test configuration",
            "roles:",
            "displays:",
            "active_displays:",
            "active_views:",
            "looks:",
            "colorspaces:",
        ]
        .iter()
        .map(|field| text.find(field).unwrap_or_else(|| panic!("missing {field}")))
        .collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted, "top-level fields out of order");
    }

    #[test]
    fn test_prefixed_names_appear_only_in_the_text() {
        let doc = sample_doc(Naming::FamilyPrefixed);
        let text = doc.serialize().unwrap();
        assert!(text.contains("name: ACES - ACEScc"));
        assert!(text.contains("name: Output - sRGB"));
        // The in-memory objects keep their declared names.
        assert!(doc.colorspaces.iter().any(|c| c.name == "ACEScc"));
        assert!(!doc.colorspaces.iter().any(|c| c.name == "ACES - ACEScc"));
    }

    #[test]
    fn test_multi_step_chain_wraps_in_an_ordered_group() {
        let text = sample_doc(Naming::Plain).serialize().unwrap();
        let group = text.find("to_reference: !<GroupTransform>").unwrap();
        let file = text[group..].find("!<FileTransform> {src: ACEScc_to_linear.spi1d").unwrap();
        let matrix = text[group..].find("!<MatrixTransform>").unwrap();
        assert!(file < matrix, "group children reordered");
    }

    #[test]
    fn test_single_step_chain_is_emitted_inline() {
        let text = sample_doc(Naming::Plain).serialize().unwrap();
        assert!(text.contains("from_reference: !<FileTransform> {src: odt.spi3d, interpolation: tetrahedral}"));
    }

    #[test]
    fn test_aces_transform_id_is_appended_to_the_description() {
        let text = sample_doc(Naming::Plain).serialize().unwrap();
        assert!(text.contains("ACES Transform ID : ACEScsc.ACEScc_to_ACES.a1.0.3"));
    }

    #[test]
    fn test_look_block_references_presented_process_space() {
        let text = sample_doc(Naming::FamilyPrefixed).serialize().unwrap();
        assert!(text.contains("process_space: ACES - ACEScc"));
        assert!(text.contains("transform: !<FileTransform> {src: grade.cc, interpolation: best}"));
    }

    #[test]
    fn test_missing_prefix_aborts_serialization() {
        let mut doc = sample_doc(Naming::FamilyPrefixed);
        doc.roles.push(("bogus".to_owned(), "Unregistered".to_owned()));
        assert!(matches!(
            doc.serialize(),
            Err(ConfigError::MissingPrefix(name)) if name == "Unregistered"
        ));
    }
}
