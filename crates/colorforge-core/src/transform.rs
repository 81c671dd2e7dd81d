//! Elementary transform steps and the ordered chains built from them.
//!
//! A color space is described by two chains: one converting its native values
//! to the reference space and one converting back. Chains never evaluate
//! anything themselves; they compose into a form the config writer and the
//! external renderer both consume.

use serde::{Deserialize, Serialize};

/// Direction a step is applied in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Inverse,
}

impl Direction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Inverse => "inverse",
        }
    }

    pub const fn inverted(self) -> Self {
        match self {
            Self::Forward => Self::Inverse,
            Self::Inverse => Self::Forward,
        }
    }
}

/// Interpolation used when sampling a LUT file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interpolation {
    Linear,
    Nearest,
    Tetrahedral,
    Best,
}

impl Interpolation {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Nearest => "nearest",
            Self::Tetrahedral => "tetrahedral",
            Self::Best => "best",
        }
    }
}

/// One elementary transform operation.
///
/// The set is closed: consumers match exhaustively, so a step kind unknown to
/// part of the pipeline cannot exist at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TransformStep {
    /// 4x4 matrix with offset, row-major.
    Matrix {
        matrix: [f64; 16],
        offset: [f64; 4],
        direction: Direction,
    },
    /// Reference to an on-disk LUT file, resolved against the config search path.
    LutFile {
        path: String,
        interpolation: Interpolation,
        cccid: Option<String>,
        direction: Direction,
    },
    /// Per-channel exponent.
    Exponent { value: [f64; 4] },
    /// Logarithm with the given base.
    Log { base: f64, direction: Direction },
    /// Conversion routed through two named color spaces.
    ColorSpaceRef {
        src: String,
        dst: String,
        direction: Direction,
    },
    /// A named look applied between two color spaces.
    LookRef {
        look: String,
        src: String,
        dst: String,
        direction: Direction,
    },
}

impl TransformStep {
    /// Forward LUT file step with the given interpolation.
    pub fn lut_file(path: impl Into<String>, interpolation: Interpolation) -> Self {
        Self::LutFile {
            path: path.into(),
            interpolation,
            cccid: None,
            direction: Direction::Forward,
        }
    }

    /// Forward matrix step with a zero offset.
    pub fn matrix(matrix: [f64; 16]) -> Self {
        Self::Matrix {
            matrix,
            offset: [0.0; 4],
            direction: Direction::Forward,
        }
    }

    /// Forward look reference pinned to the reference space on both sides.
    pub fn look(look: impl Into<String>, reference: &str, direction: Direction) -> Self {
        Self::LookRef {
            look: look.into(),
            src: reference.to_owned(),
            dst: reference.to_owned(),
            direction,
        }
    }
}

/// Expands a row-major 3x3 matrix to the 4x4 layout steps carry.
pub fn mat44_from_mat33(m: [f64; 9]) -> [f64; 16] {
    [
        m[0], m[1], m[2], 0.0, //
        m[3], m[4], m[5], 0.0, //
        m[6], m[7], m[8], 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ]
}

/// An ordered sequence of steps. Order is semantically significant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformChain {
    steps: Vec<TransformStep>,
}

impl TransformChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_steps(steps: Vec<TransformStep>) -> Self {
        Self { steps }
    }

    pub fn push(&mut self, step: TransformStep) {
        self.steps.push(step);
    }

    pub fn insert(&mut self, index: usize, step: TransformStep) {
        self.steps.insert(index, step);
    }

    pub fn steps(&self) -> &[TransformStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Collapses the chain into an evaluable form.
    ///
    /// An empty chain attaches no transform at all. A single step is emitted
    /// directly. Anything longer becomes an explicit ordered group so that
    /// evaluation order survives serialization.
    pub fn compose(&self) -> Option<ComposedTransform> {
        match self.steps.as_slice() {
            [] => None,
            [step] => Some(ComposedTransform::Single(step.clone())),
            steps => Some(ComposedTransform::Group(steps.to_vec())),
        }
    }
}

/// The collapsed form of a chain.
#[derive(Debug, Clone, PartialEq)]
pub enum ComposedTransform {
    Single(TransformStep),
    Group(Vec<TransformStep>),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_steps() -> Vec<TransformStep> {
        vec![
            TransformStep::matrix(mat44_from_mat33([
                0.5, 0.0, 0.0, 0.0, 0.5, 0.0, 0.0, 0.0, 0.5,
            ])),
            TransformStep::lut_file("curve.spi1d", Interpolation::Linear),
            TransformStep::Log {
                base: 2.0,
                direction: Direction::Inverse,
            },
        ]
    }

    #[test]
    fn test_compose_empty_chain_attaches_nothing() {
        assert_eq!(TransformChain::new().compose(), None);
    }

    #[test]
    fn test_compose_single_step_is_emitted_directly() {
        let step = TransformStep::Exponent {
            value: [2.2, 2.2, 2.2, 1.0],
        };
        let chain = TransformChain::from_steps(vec![step.clone()]);
        assert_eq!(chain.compose(), Some(ComposedTransform::Single(step)));
    }

    #[test]
    fn test_compose_preserves_step_order() {
        let steps = sample_steps();
        let chain = TransformChain::from_steps(steps.clone());
        assert_eq!(chain.compose(), Some(ComposedTransform::Group(steps)));
    }

    #[test]
    fn test_mat44_embeds_rows_and_identity_tail() {
        let m = mat44_from_mat33([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        assert_eq!(&m[0..3], &[1.0, 2.0, 3.0]);
        assert_eq!(m[3], 0.0);
        assert_eq!(&m[4..7], &[4.0, 5.0, 6.0]);
        assert_eq!(&m[12..16], &[0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_step_tags_are_stable_on_the_wire() {
        // Saved chains dispatch on the variant tag; renaming one breaks them.
        let json = serde_json::to_string(&sample_steps()).unwrap();
        for tag in ["\"Matrix\"", "\"LutFile\"", "\"Log\""] {
            assert!(json.contains(tag), "missing {tag} in {json}");
        }
        let restored: Vec<TransformStep> = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, sample_steps());
    }

    #[test]
    fn test_direction_round_trips_through_inversion() {
        assert_eq!(Direction::Forward.inverted(), Direction::Inverse);
        assert_eq!(Direction::Forward.inverted().inverted(), Direction::Forward);
    }
}
