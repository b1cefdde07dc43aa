// platform.rs - Target classification
//
// Normalizes a target descriptor into one of four platform tags. The tag
// drives both the patch plan and the strategy choice, so it is computed
// exactly once per build and never revisited.

use serde::Serialize;

use crate::options::OptionSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BuildType {
    Debug,
    Release,
}

/// Description of the machine and toolchain the library is built for.
///
/// The web toolchain is an explicit field on the descriptor (`compiler`
/// set to `emcc`); nothing in this crate reads ambient environment
/// variables to detect it.
#[derive(Debug, Clone, Serialize)]
pub struct TargetDescriptor {
    pub os: Option<String>,
    pub compiler: String,
    pub compiler_family: Option<String>,
    pub arch: Option<String>,
    pub build_type: BuildType,
}

impl TargetDescriptor {
    pub fn is_emscripten(&self) -> bool {
        self.compiler.eq_ignore_ascii_case("emcc")
    }

    pub fn is_windows(&self) -> bool {
        matches!(self.os.as_deref(), Some(os) if os.eq_ignore_ascii_case("windows"))
    }

    pub fn is_darwin(&self) -> bool {
        matches!(self.os.as_deref(), Some(os)
            if os.eq_ignore_ascii_case("macos") || os.eq_ignore_ascii_case("darwin"))
    }

    fn is_msvc(&self) -> bool {
        let matches_family = |name: &str| {
            name.eq_ignore_ascii_case("msvc") || name.eq_ignore_ascii_case("visual studio")
        };
        matches_family(&self.compiler)
            || self.compiler_family.as_deref().is_some_and(matches_family)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlatformTag {
    Unix,
    WindowsMsvc,
    WindowsMingw,
    Web,
}

impl PlatformTag {
    /// First match wins. The web check precedes the OS checks: a web
    /// build may carry a spoofed or absent OS field.
    pub fn classify(target: &TargetDescriptor) -> Self {
        if target.is_emscripten() {
            return Self::Web;
        }
        if target.is_windows() && target.is_msvc() {
            return Self::WindowsMsvc;
        }
        if target.is_windows() {
            return Self::WindowsMingw;
        }
        Self::Unix
    }

    /// Remove options that have no meaning on this platform. Must run
    /// before strategy selection; the keys are gone afterwards, not false.
    pub fn prune_options(self, options: &mut OptionSet) {
        match self {
            Self::WindowsMsvc => {
                options.remove("fPIC");
            }
            Self::Web => {
                options.remove("fPIC");
                options.remove("shared");
                options.remove("simd");
            }
            Self::Unix | Self::WindowsMingw => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn target(os: Option<&str>, compiler: &str, family: Option<&str>) -> TargetDescriptor {
        TargetDescriptor {
            os: os.map(String::from),
            compiler: compiler.to_string(),
            compiler_family: family.map(String::from),
            arch: Some("x86_64".to_string()),
            build_type: BuildType::Release,
        }
    }

    #[test]
    fn test_classify_unix() {
        assert_eq!(
            PlatformTag::classify(&target(Some("linux"), "gcc", None)),
            PlatformTag::Unix
        );
        assert_eq!(
            PlatformTag::classify(&target(Some("macos"), "clang", None)),
            PlatformTag::Unix
        );
    }

    #[test]
    fn test_classify_windows() {
        assert_eq!(
            PlatformTag::classify(&target(Some("windows"), "msvc", None)),
            PlatformTag::WindowsMsvc
        );
        assert_eq!(
            PlatformTag::classify(&target(Some("windows"), "cl", Some("Visual Studio"))),
            PlatformTag::WindowsMsvc
        );
        assert_eq!(
            PlatformTag::classify(&target(Some("windows"), "gcc", None)),
            PlatformTag::WindowsMingw
        );
    }

    #[test]
    fn test_web_check_precedes_os_checks() {
        // A web build may carry a spoofed Windows OS field, or none at all.
        assert_eq!(
            PlatformTag::classify(&target(Some("windows"), "emcc", None)),
            PlatformTag::Web
        );
        assert_eq!(
            PlatformTag::classify(&target(None, "emcc", None)),
            PlatformTag::Web
        );
    }

    #[test]
    fn test_prune_options_msvc() {
        let mut options = OptionSet::resolve(&BTreeMap::new()).unwrap();
        PlatformTag::WindowsMsvc.prune_options(&mut options);
        assert!(!options.contains("fPIC"));
        assert!(options.contains("shared"));
        assert!(options.contains("simd"));
    }

    #[test]
    fn test_prune_options_web() {
        let mut options = OptionSet::resolve(&BTreeMap::new()).unwrap();
        PlatformTag::Web.prune_options(&mut options);
        assert!(!options.contains("fPIC"));
        assert!(!options.contains("shared"));
        assert!(!options.contains("simd"));
    }
}
