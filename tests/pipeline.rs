use std::collections::BTreeMap;
use std::path::PathBuf;

use jpegturbo_recipe::error::RecipeError;
use jpegturbo_recipe::patch::PatchOperation;
use jpegturbo_recipe::platform::{BuildType, PlatformTag, TargetDescriptor};
use jpegturbo_recipe::recipe::{DEFAULT_VERSION, Recipe};
use jpegturbo_recipe::strategy::{StrategyKind, StrategyPlan};

fn recipe(target: TargetDescriptor, overrides: &[(&str, bool)]) -> Recipe {
    Recipe {
        version: DEFAULT_VERSION.to_string(),
        target,
        overrides: overrides
            .iter()
            .map(|(key, value)| (key.to_string(), *value))
            .collect(),
        work_root: PathBuf::from("."),
        package_root: PathBuf::from("pkg"),
        assets_dir: PathBuf::from("assets"),
    }
}

fn target(os: Option<&str>, compiler: &str) -> TargetDescriptor {
    TargetDescriptor {
        os: os.map(String::from),
        compiler: compiler.to_string(),
        compiler_family: None,
        arch: Some("x86_64".to_string()),
        build_type: BuildType::Release,
    }
}

#[test]
fn scenario_unix_gcc_defaults() {
    let plan = recipe(target(Some("linux"), "gcc"), &[]).plan().unwrap();

    assert_eq!(plan.tag, PlatformTag::Unix);
    assert_eq!(plan.kind, StrategyKind::ConfigureMake);
    assert!(plan.patches.is_empty());
    assert_eq!(plan.artifacts.libs, vec!["jpeg", "turbojpeg"]);

    let StrategyPlan::ConfigureMake { args, fpic } = &plan.strategy else {
        panic!("expected configure-make plan");
    };
    assert!(args.contains(&"--enable-static".to_string()));
    assert!(args.contains(&"--with-simd".to_string()));
    assert_eq!(*fpic, Some(true));
}

#[test]
fn scenario_windows_msvc_static() {
    let plan = recipe(target(Some("windows"), "msvc"), &[("shared", false)])
        .plan()
        .unwrap();

    assert_eq!(plan.tag, PlatformTag::WindowsMsvc);
    assert_eq!(plan.kind, StrategyKind::ToolchainGenerator);
    assert!(!plan.options.contains("fPIC"));
    assert_eq!(plan.artifacts.libs, vec!["jpeg-static", "turbojpeg-static"]);
    assert!(plan.artifacts.copy_generated_header);

    let StrategyPlan::ToolchainGenerator { definitions } = &plan.strategy else {
        panic!("expected toolchain-generator plan");
    };
    assert!(definitions.contains(&("ENABLE_STATIC".to_string(), "ON".to_string())));
    assert!(definitions.contains(&("ENABLE_SHARED".to_string(), "OFF".to_string())));
}

#[test]
fn scenario_web_defaults() {
    // No OS field at all; only the compiler identity marks the target.
    let plan = recipe(target(None, "emcc"), &[]).plan().unwrap();

    assert_eq!(plan.tag, PlatformTag::Web);
    assert_eq!(plan.kind, StrategyKind::ToolchainGenerator);
    for key in ["fPIC", "shared", "simd"] {
        assert!(!plan.options.contains(key), "{} should be pruned", key);
    }
    assert!(!plan.strategy.simd_enabled());

    assert!(plan.patches.iter().any(|op| matches!(op,
        PatchOperation::Replace { replacement, .. }
            if replacement.starts_with("#message(FATAL_ERROR"))));
    assert!(plan.patches.iter().any(|op| matches!(op,
        PatchOperation::Copy { destination, .. }
            if destination.ends_with("sharedlib/helper.js"))));
}

#[test]
fn web_simd_override_still_forced_off() {
    let plan = recipe(target(Some("windows"), "emcc"), &[("simd", true)])
        .plan()
        .unwrap();
    // Spoofed Windows OS field loses to the web toolchain check.
    assert_eq!(plan.tag, PlatformTag::Web);
    assert!(!plan.strategy.simd_enabled());
}

#[test]
fn unknown_override_rejected_before_any_io() {
    let err = recipe(target(Some("linux"), "gcc"), &[("with_lasers", true)])
        .plan()
        .unwrap_err();
    assert!(matches!(err, RecipeError::InvalidOption(_)));
}

#[tokio::test]
async fn run_fails_cleanly_without_extracted_source() {
    let work = tempfile::tempdir().unwrap();
    let mut r = recipe(target(Some("linux"), "gcc"), &[]);
    r.work_root = work.path().to_path_buf();

    let err = r.run().await.unwrap_err();
    assert!(matches!(err, RecipeError::Io(_)));
    // Nothing was created in the work root.
    assert_eq!(std::fs::read_dir(work.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn run_applies_patches_before_building() {
    // A cmake-strategy run against a synthetic tree must get through
    // prepare and patching, then fail at the configure stage (there is no
    // real cmake project here). The patched files prove the ordering.
    let work = tempfile::tempdir().unwrap();
    let source = work.path().join("libjpeg-turbo-1.5.2");
    std::fs::create_dir_all(source.join("sharedlib")).unwrap();
    std::fs::write(
        source.join("CMakeLists.txt"),
        "message(FATAL_ERROR \"Platform not supported by this build system.  Use autotools instead.\")\n\
         set(COMPILE_FLAGS \"-DGIF_SUPPORTED -DPPM_SUPPORTED -DUSE_SETMODE\")\n\
         set(COMPILE_FLAGS \"-DBMP_SUPPORTED -DGIF_SUPPORTED -DPPM_SUPPORTED -DTARGA_SUPPORTED -DUSE_SETMODE\")\n\
         ${CMAKE_CURRENT_BINARY_DIR}/tjbench-static.exe\n\
         ${CMAKE_CURRENT_BINARY_DIR}/cjpeg-static.exe\n\
         ${CMAKE_CURRENT_BINARY_DIR}/djpeg-static.exe\n\
         ${CMAKE_CURRENT_BINARY_DIR}/jpegtran-static.exe\n\
         # These tests are carefully chosen to provide full coverage of as many of the\n",
    )
    .unwrap();
    std::fs::write(
        source.join("sharedlib/CMakeLists.txt"),
        "add_executable(cjpeg ../cjpeg.c ../cdjpeg.c ../rdgif.c ../rdppm.c)\n\
         set_property(TARGET jpegtran PROPERTY COMPILE_FLAGS \"-DUSE_SETMODE\")\n",
    )
    .unwrap();

    let assets = work.path().join("recipe-assets");
    std::fs::create_dir_all(assets.join("helpers/sharedlib")).unwrap();
    std::fs::write(assets.join("CMakeLists.txt"), "include(CMakeLists_original.txt)\n").unwrap();
    std::fs::write(assets.join("helpers/sharedlib/helper.js"), "// glue\n").unwrap();
    for name in ["cjpeg", "djpeg", "jpegtran", "md5cmp", "tjunittest"] {
        std::fs::write(assets.join("helpers").join(name), "#!/bin/sh\n").unwrap();
    }

    let mut r = recipe(target(None, "emcc"), &[]);
    r.work_root = work.path().to_path_buf();
    r.assets_dir = assets.clone();
    r.package_root = work.path().join("pkg");

    let err = r.run().await.unwrap_err();
    assert!(matches!(err, RecipeError::Configure(_)), "got {:?}", err);

    // The tree was prepared and patched before the executor gave up.
    let patched = std::fs::read_to_string(
        work.path().join("source_subfolder/CMakeLists_original.txt"),
    )
    .unwrap();
    assert!(patched.contains("#message(FATAL_ERROR"));
    assert!(patched.contains("bin/tjbench-static.exe"));
    assert!(patched.contains("MD5_PPM_3x2_FLOAT"));
    assert!(work.path().join("source_subfolder/sharedlib/helper.js").is_file());
    assert!(work.path().join("cjpeg").is_file());
    // No package root was left behind as if it were valid.
    assert!(!work.path().join("pkg").exists());
}
