// source.rs - Source-tree layout conventions
//
// Fetching and extraction are someone else's job. This module owns the
// fixed paths the rest of the recipe relies on: the extracted
// libjpeg-turbo-<version> directory renamed to the working name, and the
// upstream CMakeLists.txt set aside so the recipe's wrapper can take its
// place.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::RecipeError;
use crate::patch::SOURCE_SUBFOLDER;

/// Where the upstream CMake description ends up after the swap; all
/// CMake-side patches target this file.
pub const CMAKELISTS_ORIGINAL: &str = "CMakeLists_original.txt";

pub struct SourceTree {
    root: PathBuf,
}

impl SourceTree {
    pub fn new(root: &Path) -> Self {
        SourceTree {
            root: root.to_path_buf(),
        }
    }

    pub fn source_dir(&self) -> PathBuf {
        self.root.join(SOURCE_SUBFOLDER)
    }

    /// Rename the extracted directory to the fixed working name. A
    /// previous run may already have done it, in which case nothing
    /// happens.
    pub fn adopt_extracted(&self, version: &str) -> Result<PathBuf, RecipeError> {
        let subfolder = self.source_dir();
        if subfolder.is_dir() {
            debug!("source tree already at {}", subfolder.display());
            return Ok(subfolder);
        }

        let extracted = self.root.join(format!("libjpeg-turbo-{}", version));
        if !extracted.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("extracted source not found at {}", extracted.display()),
            )
            .into());
        }
        fs::rename(&extracted, &subfolder)?;
        Ok(subfolder)
    }

    /// Set the upstream CMakeLists aside and install the recipe wrapper
    /// in its place. Only the toolchain-generator strategy reads the
    /// wrapper; the rename runs once, the wrapper copy overwrites.
    pub fn install_cmake_wrapper(&self, wrapper: &Path) -> Result<(), RecipeError> {
        let source_dir = self.source_dir();
        let original = source_dir.join(CMAKELISTS_ORIGINAL);
        if !original.exists() {
            fs::rename(source_dir.join("CMakeLists.txt"), &original)?;
        }
        fs::copy(wrapper, source_dir.join("CMakeLists.txt"))?;
        Ok(())
    }
}
