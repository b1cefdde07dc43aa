// autotools.rs - configure/make executor
//
// Drives the upstream configure script and make, scoped to the source
// directory. Works for unix and mingw shells; on Windows the configure
// script runs under sh and the prefix is spelled MSYS-style.

use std::path::Path;
use std::process::Command;

use super::{BuildContext, BuildStrategy, run_stage};
use crate::error::RecipeError;
use crate::patch::PatchOperation;
use crate::strategy::StrategyPlan;

pub struct ConfigureMakeExecutor;

// Darwin shared libraries embed an rpath-relative install name; the
// packaged dylib wants the bare soname as its identity.
const RPATH_INSTALL_NAME: &str = r"-install_name \$rpath/\$soname";
const BARE_INSTALL_NAME: &str = r"-install_name \$soname";

impl BuildStrategy for ConfigureMakeExecutor {
    fn run(&self, ctx: &BuildContext) -> Result<(), RecipeError> {
        let StrategyPlan::ConfigureMake { args, fpic } = &ctx.plan else {
            return Err(RecipeError::Configure(
                "configure-make executor handed a toolchain-generator plan".to_string(),
            ));
        };

        // This edit depends on the configure-make strategy specifically,
        // so it lives here rather than in the general patch plan. Same
        // validation and idempotence rules apply.
        if ctx.shared && ctx.target.is_darwin() {
            PatchOperation::replace("configure", RPATH_INSTALL_NAME, BARE_INSTALL_NAME)
                .apply(&ctx.source_dir, &ctx.source_dir)?;
        }

        let prefix = if ctx.target.is_windows() {
            unix_path(&ctx.prefix)
        } else {
            ctx.prefix.display().to_string()
        };

        let mut configure = if ctx.target.is_windows() {
            let mut command = Command::new("sh");
            command.arg("./configure");
            command
        } else {
            Command::new("./configure")
        };
        configure
            .arg(format!("--prefix={}", prefix))
            .args(args)
            .current_dir(&ctx.source_dir);
        if *fpic == Some(true) {
            configure
                .env("CFLAGS", pic_flags(std::env::var("CFLAGS").ok().as_deref()))
                .env("CXXFLAGS", pic_flags(std::env::var("CXXFLAGS").ok().as_deref()));
        }
        run_stage("configure", &mut configure, RecipeError::Configure)?;

        run_stage(
            "make",
            Command::new("make").current_dir(&ctx.source_dir),
            RecipeError::Build,
        )?;

        run_stage(
            "make install",
            Command::new("make")
                .arg("install")
                .current_dir(&ctx.source_dir),
            RecipeError::Install,
        )?;

        Ok(())
    }
}

/// Append -fPIC to whatever compiler flags the caller's environment
/// already carries; never drop them.
fn pic_flags(inherited: Option<&str>) -> String {
    match inherited {
        Some(flags) if !flags.trim().is_empty() => format!("{} -fPIC", flags.trim_end()),
        _ => "-fPIC".to_string(),
    }
}

/// MSYS-style spelling of a native Windows path (C:\x -> /c/x).
fn unix_path(path: &Path) -> String {
    let spelled = path.display().to_string().replace('\\', "/");
    let bytes = spelled.as_bytes();
    if bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic() {
        format!(
            "/{}{}",
            bytes[0].to_ascii_lowercase() as char,
            &spelled[2..]
        )
    } else {
        spelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_pic_flags_appends_to_inherited() {
        assert_eq!(pic_flags(None), "-fPIC");
        assert_eq!(pic_flags(Some("")), "-fPIC");
        assert_eq!(pic_flags(Some("-O2 -g")), "-O2 -g -fPIC");
    }

    #[test]
    fn test_unix_path() {
        assert_eq!(unix_path(Path::new(r"C:\pkg\jpeg")), "/c/pkg/jpeg");
        assert_eq!(unix_path(Path::new("/opt/pkg")), "/opt/pkg");
    }

    #[test]
    fn test_install_name_edit_matches_upstream_configure() {
        // The literal upstream configure fragment the executor rewrites.
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("configure"),
            format!("ldflags=\"{}\"\n", RPATH_INSTALL_NAME),
        )
        .unwrap();

        let op = PatchOperation::replace("configure", RPATH_INSTALL_NAME, BARE_INSTALL_NAME);
        op.apply(dir.path(), dir.path()).unwrap();
        op.apply(dir.path(), dir.path()).unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("configure")).unwrap(),
            format!("ldflags=\"{}\"\n", BARE_INSTALL_NAME)
        );
    }
}
