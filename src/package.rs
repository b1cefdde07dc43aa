// package.rs - Install-tree normalization
//
// Strips the build system's extras out of the freshly installed prefix so
// every platform ends up with the same layout: include/, lib/, licenses/,
// nothing else. Only the library artifacts are the package's deliverable.

use std::fs;
use std::io;
use std::path::Path;

use log::debug;
use serde::Serialize;

use crate::error::RecipeError;
use crate::options::OptionSet;
use crate::platform::PlatformTag;

/// Command-line tools the upstream build installs alongside the library.
pub const TOOL_BINARIES: [&str; 6] = [
    "cjpeg", "djpeg", "jpegtran", "tjbench", "wrjpgcom", "rdjpgcom",
];

// Which extension a tool binary carries varies by platform; try them all.
const BIN_EXTENSIONS: [&str; 3] = ["", ".exe", ".js"];

const DOC_DIRS: [&str; 3] = ["share/man", "share/doc", "doc"];

/// What normalization will do to a package root, and the linkable names
/// the result exposes. Pure function of (platform tag, option set).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactSpec {
    pub libs: Vec<String>,
    pub remove_dirs: Vec<&'static str>,
    pub remove_bins: Vec<String>,
    pub copy_generated_header: bool,
}

impl ArtifactSpec {
    pub fn for_build(tag: PlatformTag, options: &OptionSet) -> Self {
        // MSVC names its static archives apart from the import libraries;
        // every other platform uses the unsuffixed names.
        let static_suffix = tag == PlatformTag::WindowsMsvc && !options.enabled("shared");
        let libs = ["jpeg", "turbojpeg"]
            .iter()
            .map(|name| {
                if static_suffix {
                    format!("{}-static", name)
                } else {
                    (*name).to_string()
                }
            })
            .collect();

        let remove_bins = TOOL_BINARIES
            .iter()
            .flat_map(|name| {
                BIN_EXTENSIONS
                    .iter()
                    .map(move |ext| format!("bin/{}{}", name, ext))
            })
            .collect();

        ArtifactSpec {
            libs,
            remove_dirs: DOC_DIRS.to_vec(),
            remove_bins,
            copy_generated_header: tag == PlatformTag::WindowsMsvc,
        }
    }

    /// Apply to a fully installed package root. Binary cleanup is
    /// best-effort: absence is the normal case on every platform that
    /// uses a different extension.
    pub fn apply(
        &self,
        package_root: &Path,
        source_dir: &Path,
        build_dir: &Path,
    ) -> Result<(), RecipeError> {
        for dir in &self.remove_dirs {
            let path = package_root.join(dir);
            if path.is_dir() {
                fs::remove_dir_all(&path)?;
            }
        }

        for bin in &self.remove_bins {
            let path = package_root.join(bin);
            match fs::remove_file(&path) {
                Ok(()) => debug!("removed {}", path.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => debug!("leaving {} in place: {}", path.display(), e),
            }
        }

        copy_licenses(source_dir, &package_root.join("licenses"))?;

        // jconfig.h is produced by build-time feature detection and only
        // exists once configure has run.
        if self.copy_generated_header {
            let include = package_root.join("include");
            fs::create_dir_all(&include)?;
            fs::copy(build_dir.join("jconfig.h"), include.join("jconfig.h"))?;
        }

        Ok(())
    }
}

pub fn normalize(
    package_root: &Path,
    source_dir: &Path,
    build_dir: &Path,
    tag: PlatformTag,
    options: &OptionSet,
) -> Result<ArtifactSpec, RecipeError> {
    let spec = ArtifactSpec::for_build(tag, options);
    spec.apply(package_root, source_dir, build_dir)?;
    Ok(spec)
}

/// Copy every LICENSE*-named file out of the source tree, flattened into
/// the licenses/ directory.
fn copy_licenses(source_dir: &Path, licenses_dir: &Path) -> Result<(), RecipeError> {
    fs::create_dir_all(licenses_dir)?;

    fn walk(dir: &Path, licenses_dir: &Path) -> Result<(), RecipeError> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                walk(&path, licenses_dir)?;
            } else if entry
                .file_name()
                .to_string_lossy()
                .to_ascii_lowercase()
                .starts_with("license")
            {
                fs::copy(&path, licenses_dir.join(entry.file_name()))?;
            }
        }
        Ok(())
    }

    walk(source_dir, licenses_dir)
}
