use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use colorforge_core::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("color space `{0}` is missing from the prefix map")]
    MissingPrefix(String),
    #[error("duplicate color space name `{0}`")]
    DuplicateColorSpace(String),
    #[error("alias points at undefined color space `{0}`")]
    AliasTargetMissing(String),
    #[error("role `{role}` points at undefined color space `{target}`")]
    RoleTargetMissing { role: String, target: String },
    #[error("view `{view}` of display `{display}` references undefined color space `{target}`")]
    ViewTargetMissing {
        display: String,
        view: String,
        target: String,
    },
    #[error("LUT directory {0} does not exist")]
    MissingLutDirectory(PathBuf),
    #[error("failed to launch `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("`{command}` exited with {status}")]
    ExternalTool { command: String, status: ExitStatus },
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Io(#[from] io::Error),
}
