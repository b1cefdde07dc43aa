// error.rs - Recipe error taxonomy

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecipeError {
    /// Override key outside the fixed option set, or a value outside the
    /// option's domain. Rejected before any I/O happens.
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// Expected text missing from an upstream file. The source tree has
    /// drifted from the version this recipe was written against; retrying
    /// cannot fix it.
    #[error("patch mismatch in {}: expected text not found: {needle:?}", .file.display())]
    PatchMismatch { file: PathBuf, needle: String },

    #[error("configure failed: {0}")]
    Configure(String),

    #[error("build failed: {0}")]
    Build(String),

    #[error("test suite failed: {0}")]
    Test(String),

    #[error("install failed: {0}")]
    Install(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
