use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use crate::codec::LutFormat;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("lattice resolution must be at least 2, got {0}")]
    ResolutionTooSmall(u32),
    #[error("degenerate sampling domain: min {min} equals max {max}")]
    DegenerateDomain { min: f32, max: f32 },
    #[error(
        "unexpected lattice shape {width}x{height}, expected {expected_width}x{expected_height}"
    )]
    ShapeMismatch {
        width: u32,
        height: u32,
        expected_width: u32,
        expected_height: u32,
    },
    #[error("{format} does not support {dim}D data")]
    UnsupportedFormat { format: LutFormat, dim: u8 },
    #[error("no external converter available to write {format} from 3D data")]
    ConverterUnavailable { format: LutFormat },
    #[error("malformed LUT file {path}: {reason}")]
    MalformedLut { path: PathBuf, reason: String },
    #[error("failed to launch `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("`{command}` exited with {status}")]
    ExternalTool { command: String, status: ExitStatus },
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Io(#[from] io::Error),
}
