// cmake.rs - toolchain-generator executor
//
// Configures the recipe's CMake wrapper out-of-tree, builds, runs the
// upstream test suite, and installs. Install only happens after the test
// stage passes; a broken codec must never be packaged.

use std::fs;
use std::process::Command;

use super::{BuildContext, BuildStrategy, run_stage};
use crate::error::RecipeError;
use crate::platform::BuildType;
use crate::strategy::StrategyPlan;

pub struct ToolchainGeneratorExecutor;

impl BuildStrategy for ToolchainGeneratorExecutor {
    fn run(&self, ctx: &BuildContext) -> Result<(), RecipeError> {
        let StrategyPlan::ToolchainGenerator { definitions } = &ctx.plan else {
            return Err(RecipeError::Configure(
                "toolchain-generator executor handed a configure-make plan".to_string(),
            ));
        };

        fs::create_dir_all(&ctx.build_dir)?;

        let build_type = match ctx.target.build_type {
            BuildType::Debug => "Debug",
            BuildType::Release => "Release",
        };

        let mut configure = Command::new("cmake");
        configure
            .arg(format!("-DCMAKE_INSTALL_PREFIX={}", ctx.prefix.display()))
            .arg(format!("-DCMAKE_BUILD_TYPE={}", build_type));
        for (key, value) in definitions {
            configure.arg(format!("-D{}={}", key, value));
        }
        configure.arg(&ctx.source_dir).current_dir(&ctx.build_dir);
        run_stage("cmake configure", &mut configure, RecipeError::Configure)?;

        run_stage(
            "cmake build",
            Command::new("cmake")
                .args(["--build", "."])
                .current_dir(&ctx.build_dir),
            RecipeError::Build,
        )?;

        run_stage(
            "ctest",
            Command::new("ctest").current_dir(&ctx.build_dir),
            RecipeError::Test,
        )?;

        run_stage(
            "cmake install",
            Command::new("cmake")
                .args(["--build", ".", "--target", "install"])
                .current_dir(&ctx.build_dir),
            RecipeError::Install,
        )?;

        Ok(())
    }
}
