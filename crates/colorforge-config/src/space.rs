//! Color space descriptions and the naming rules applied to them.
//!
//! A `ColorSpace` is a plain value: it is built once, never mutated after it
//! enters the graph, and its family-prefixed presentation name is computed
//! only when the config text is written.

use serde::{Deserialize, Serialize};

use colorforge_core::TransformChain;

/// Coding depth a color space declares for its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BitDepth {
    Uint8,
    Uint10,
    Uint12,
    Uint14,
    Uint16,
    Uint32,
    F16,
    F32,
}

impl BitDepth {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uint8 => "8ui",
            Self::Uint10 => "10ui",
            Self::Uint12 => "12ui",
            Self::Uint14 => "14ui",
            Self::Uint16 => "16ui",
            Self::Uint32 => "32ui",
            Self::F16 => "16f",
            Self::F32 => "32f",
        }
    }
}

/// GPU allocation strategy hint written into the config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllocationType {
    Uniform,
    Lg2,
}

impl AllocationType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uniform => "uniform",
            Self::Lg2 => "lg2",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub kind: AllocationType,
    pub vars: Vec<f64>,
}

impl Default for Allocation {
    fn default() -> Self {
        Self {
            kind: AllocationType::Uniform,
            vars: vec![0.0, 1.0],
        }
    }
}

impl Allocation {
    /// The allocation used by scene-linear spaces.
    pub fn lg2() -> Self {
        Self {
            kind: AllocationType::Lg2,
            vars: vec![-8.0, 5.0, 0.003_906_25],
        }
    }

    pub fn uniform(min: f64, max: f64) -> Self {
        Self {
            kind: AllocationType::Uniform,
            vars: vec![min, max],
        }
    }
}

/// Everything needed to define one color space in the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorSpace {
    pub name: String,
    /// Short alternate names emitted as alias color spaces.
    pub aliases: Vec<String>,
    pub description: String,
    /// Slash-separated grouping, e.g. `Input/Sony`.
    pub family: String,
    pub equality_group: String,
    pub is_data: bool,
    pub bit_depth: BitDepth,
    pub allocation: Allocation,
    /// Steps converting native values to the reference space.
    pub to_reference: TransformChain,
    /// Steps converting reference values to this space.
    pub from_reference: TransformChain,
    pub aces_transform_id: Option<String>,
}

impl ColorSpace {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            description: format!("The {name} color space"),
            name,
            aliases: Vec::new(),
            family: String::new(),
            equality_group: String::new(),
            is_data: false,
            bit_depth: BitDepth::F32,
            allocation: Allocation::default(),
            to_reference: TransformChain::new(),
            from_reference: TransformChain::new(),
            aces_transform_id: None,
        }
    }

    /// Family-prefixed presentation name, used when flat color space lists
    /// need the grouping folded into the name itself.
    pub fn prefixed_name(&self) -> String {
        let prefix = self.family.replace('/', " - ");
        format!("{prefix} - {}", self.name)
    }
}

/// How color space names appear in the serialized config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Naming {
    /// Names exactly as declared.
    #[default]
    Plain,
    /// Every regular space presented as `<family> - <name>`.
    FamilyPrefixed,
}

/// Replaces characters that trip up path handling in downstream tools.
pub fn sanitize(value: &str) -> String {
    value.replace([' ', '(', ')'], "_")
}

/// Strips parentheses from a view name; some consumers reject them.
pub fn sanitize_view_name(value: &str) -> String {
    value.replace(['(', ')'], "")
}

/// Collapses a name to its lowercase alphanumeric core, the form used for
/// generated alias names.
pub fn compact(value: &str) -> String {
    let mut out = value.to_lowercase();
    for pattern in [" ", "(", ")", ".", "-"] {
        out = out.replace(pattern, "_");
    }
    out = out.replace("___", "_");
    out = out.replace("__", "_");
    out.replace('_', "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixed_name_folds_family_path() {
        let mut cs = ColorSpace::new("Canon-Log");
        cs.family = "Input/Canon".to_owned();
        assert_eq!(cs.prefixed_name(), "Input - Canon - Canon-Log");
    }

    #[test]
    fn test_sanitize_replaces_path_hostile_characters() {
        assert_eq!(sanitize("sRGB (D60 sim.)"), "sRGB__D60_sim._");
    }

    #[test]
    fn test_sanitize_view_name_strips_parentheses_only() {
        assert_eq!(sanitize_view_name("sRGB (D60 sim.)"), "sRGB D60 sim.");
    }

    #[test]
    fn test_compact_reduces_to_lowercase_core() {
        assert_eq!(compact("Rec.709 - Curve"), "rec709curve");
        assert_eq!(compact("S-Log3 (Venice)"), "slog3venice");
    }

    #[test]
    fn test_new_space_defaults_match_declared_contract() {
        let cs = ColorSpace::new("Raw");
        assert_eq!(cs.description, "The Raw color space");
        assert_eq!(cs.bit_depth, BitDepth::F32);
        assert_eq!(cs.allocation, Allocation::default());
        assert!(cs.to_reference.is_empty());
        assert!(cs.from_reference.is_empty());
    }
}
