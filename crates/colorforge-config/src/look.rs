//! Looks — creative transforms inserted into a view's chain.

use colorforge_core::{Direction, Interpolation, TransformStep};

use crate::space::{ColorSpace, compact};

/// Policy for wiring looks into the display/view topology. Exactly one
/// applies per build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookPolicy {
    /// Attach the look list as metadata to every display/view pair.
    MultiDisplay,
    /// Deep-copy each Output Transform color space with the looks folded
    /// into its chains and add the copy as an extra view.
    SingleDisplay,
}

/// A named creative transform with the space it is applied in.
#[derive(Debug, Clone, PartialEq)]
pub struct Look {
    pub name: String,
    pub process_space: String,
    pub lut_step: TransformStep,
}

impl Look {
    pub fn new(
        name: impl Into<String>,
        process_space: impl Into<String>,
        lut_path: impl Into<String>,
        cccid: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            process_space: process_space.into(),
            lut_step: TransformStep::LutFile {
                path: lut_path.into(),
                interpolation: Interpolation::Best,
                cccid,
                direction: Direction::Forward,
            },
        }
    }

    /// The degenerate color space standing in for this look.
    ///
    /// Some consumers cannot address looks directly, so every look also
    /// materializes as a color space whose from-reference chain is a single
    /// forward look reference.
    pub fn colorspace(&self, reference: &str) -> ColorSpace {
        let mut cs = ColorSpace::new(self.name.clone());
        cs.description = format!("The {} Look colorspace", self.name);
        cs.family = "Look".to_owned();
        cs.aliases = vec![format!("look_{}", compact(&self.name))];
        cs.from_reference
            .push(TransformStep::look(&*self.name, reference, Direction::Forward));
        cs
    }
}

/// Copies an Output Transform color space with the given looks folded in.
///
/// Forward look references are inserted at the head of the from-reference
/// chain in declaration order; the to-reference chain gets the mirrored
/// inverse references appended in reverse order, keeping the stacked looks
/// invertible.
pub fn augment_with_looks(
    space: &ColorSpace,
    look_names: &[String],
    reference: &str,
) -> ColorSpace {
    let mut copy = space.clone();
    let count = look_names.len();

    for (i, name) in look_names.iter().enumerate() {
        if !copy.from_reference.is_empty() {
            copy.from_reference
                .insert(i, TransformStep::look(&**name, reference, Direction::Forward));
        }
        if !copy.to_reference.is_empty() {
            let mirrored = &look_names[count - 1 - i];
            copy.to_reference
                .push(TransformStep::look(&**mirrored, reference, Direction::Inverse));
        }
    }

    let joined = look_names.join(", ");
    copy.name = format!("{} with {joined}", space.name);
    copy.aliases = vec![format!("out_{}", compact(&copy.name))];
    copy
}
