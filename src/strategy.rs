// strategy.rs - Build-system selection and option translation
//
// Maps the platform tag onto one of the two build strategies and
// translates the resolved option set into that strategy's vocabulary.
// Every boolean option emits its disabled form explicitly; the underlying
// build systems default several of these features to enabled.

use serde::Serialize;

use crate::options::OptionSet;
use crate::platform::PlatformTag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StrategyKind {
    /// Autotools configure script driven by make.
    ConfigureMake,
    /// CMake project generation: configure, build, test, install.
    ToolchainGenerator,
}

impl StrategyKind {
    pub fn for_platform(tag: PlatformTag) -> Self {
        match tag {
            PlatformTag::Unix | PlatformTag::WindowsMingw => Self::ConfigureMake,
            PlatformTag::WindowsMsvc | PlatformTag::Web => Self::ToolchainGenerator,
        }
    }
}

/// The resolved argument set for one build invocation. Built once,
/// never mutated mid-build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StrategyPlan {
    ConfigureMake {
        args: Vec<String>,
        /// None when the platform pruned the fPIC key.
        fpic: Option<bool>,
    },
    ToolchainGenerator {
        definitions: Vec<(String, String)>,
    },
}

impl StrategyPlan {
    /// Whether the build as planned compiles the SIMD kernels. Always
    /// false on the web target, where consumers must not assume
    /// SIMD-accelerated performance.
    pub fn simd_enabled(&self) -> bool {
        match self {
            Self::ConfigureMake { args, .. } => args.iter().any(|arg| arg == "--with-simd"),
            Self::ToolchainGenerator { definitions } => definitions
                .iter()
                .any(|(key, value)| key == "WITH_SIMD" && value == "ON"),
        }
    }
}

/// `--with-X` / `--without-X` pair, never omitted.
fn with_flag(options: &OptionSet, key: &str, flag: &str) -> String {
    if options.enabled(key) {
        format!("--with-{}", flag)
    } else {
        format!("--without-{}", flag)
    }
}

fn on_off(enabled: bool) -> String {
    if enabled { "ON" } else { "OFF" }.to_string()
}

pub fn select(tag: PlatformTag, options: &OptionSet) -> (StrategyKind, StrategyPlan) {
    let kind = StrategyKind::for_platform(tag);

    let plan = match kind {
        StrategyKind::ConfigureMake => {
            let mut args = Vec::new();
            // Shared and static are mutually exclusive; exactly one of the
            // two is ever requested.
            if options.enabled("shared") {
                args.push("--disable-static".to_string());
                args.push("--enable-shared".to_string());
            } else {
                args.push("--disable-shared".to_string());
                args.push("--enable-static".to_string());
            }
            args.push(with_flag(options, "jpeg7_compat", "jpeg7"));
            args.push(with_flag(options, "jpeg8_compat", "jpeg8"));
            args.push(with_flag(options, "arith_encoder", "arith-enc"));
            args.push(with_flag(options, "arith_decoder", "arith-dec"));
            args.push(with_flag(options, "turbojpeg", "turbojpeg"));
            args.push(with_flag(options, "mem_src_dst", "mem-srcdst"));
            args.push(with_flag(options, "bit12", "12bit"));
            args.push(with_flag(options, "java", "java"));
            args.push(with_flag(options, "simd", "simd"));

            StrategyPlan::ConfigureMake {
                args,
                fpic: options.contains("fPIC").then(|| options.enabled("fPIC")),
            }
        }
        StrategyKind::ToolchainGenerator => {
            // Hardware SIMD instructions do not exist on the web target;
            // force the kernels off no matter what was requested.
            let simd = tag != PlatformTag::Web && options.enabled("simd");
            let shared = options.enabled("shared");
            let definitions = vec![
                ("ENABLE_STATIC".to_string(), on_off(!shared)),
                ("ENABLE_SHARED".to_string(), on_off(shared)),
                ("WITH_SIMD".to_string(), on_off(simd)),
                ("WITH_ARITH_ENC".to_string(), on_off(options.enabled("arith_encoder"))),
                ("WITH_ARITH_DEC".to_string(), on_off(options.enabled("arith_decoder"))),
                ("WITH_JPEG7".to_string(), on_off(options.enabled("jpeg7_compat"))),
                ("WITH_JPEG8".to_string(), on_off(options.enabled("jpeg8_compat"))),
                ("WITH_MEM_SRCDST".to_string(), on_off(options.enabled("mem_src_dst"))),
                ("WITH_TURBOJPEG".to_string(), on_off(options.enabled("turbojpeg"))),
                ("WITH_JAVA".to_string(), on_off(options.enabled("java"))),
                ("WITH_12BIT".to_string(), on_off(options.enabled("bit12"))),
            ];

            StrategyPlan::ToolchainGenerator { definitions }
        }
    };

    (kind, plan)
}
