// build/mod.rs - Build execution layer

pub mod autotools;
pub mod cmake;
pub mod helpers;
pub mod source;

pub use self::autotools::ConfigureMakeExecutor;
pub use self::cmake::ToolchainGeneratorExecutor;

use std::path::PathBuf;
use std::process::Command;

use self::helpers::{ebegin, eend};

use crate::error::RecipeError;
use crate::platform::TargetDescriptor;
use crate::strategy::StrategyPlan;

/// Everything an executor needs for one build: the patched source tree,
/// the install prefix, and the resolved plan. Executors never see the
/// option set directly.
pub struct BuildContext {
    pub source_dir: PathBuf,
    pub build_dir: PathBuf,
    pub prefix: PathBuf,
    pub plan: StrategyPlan,
    pub target: TargetDescriptor,
    pub shared: bool,
}

/// One build-system family behind a single dispatch seam.
pub trait BuildStrategy {
    fn run(&self, ctx: &BuildContext) -> Result<(), RecipeError>;
}

/// Run one child build-system stage to completion, surfacing its output
/// and mapping a non-zero exit to the stage's error variant.
pub(crate) fn run_stage(
    stage: &str,
    command: &mut Command,
    to_error: fn(String) -> RecipeError,
) -> Result<(), RecipeError> {
    ebegin(&format!("Running {}", stage));

    let output = command
        .output()
        .map_err(|e| to_error(format!("failed to spawn {} stage: {}", stage, e)))?;

    if !output.stdout.is_empty() {
        print!("{}", String::from_utf8_lossy(&output.stdout));
    }
    if !output.stderr.is_empty() {
        eprint!("{}", String::from_utf8_lossy(&output.stderr));
    }

    eend(if output.status.success() { 0 } else { 1 });

    if !output.status.success() {
        return Err(to_error(format!(
            "{} stage exited with {}: {}",
            stage,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim_end()
        )));
    }
    Ok(())
}
