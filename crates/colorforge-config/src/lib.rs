//! Colorforge Config — color space graph assembly and config serialization.
//!
//! Builds the full graph of color spaces, roles, looks, and display/view
//! topology from declarative inputs, then serializes it to the industry
//! config dialect. LUT generation and the external renderer boundary live in
//! `colorforge-core`; this crate decides what gets baked and how the result
//! is wired together.

pub mod bake;
pub mod error;
pub mod graph;
pub mod look;
pub mod space;
pub mod spaces;
pub mod writer;

// Re-exports for convenience.
pub use bake::{BakeJob, BakePlan, LutBaker, OutputTransform, TargetApp, bake_all, plan_jobs};
pub use error::ConfigError;
pub use graph::{BuildOptions, ConfigData, GenerationContext, Roles, View, build_config};
pub use look::{Look, LookPolicy};
pub use space::{Allocation, AllocationType, BitDepth, ColorSpace, Naming};
pub use spaces::LutSettings;
pub use writer::ConfigDocument;
