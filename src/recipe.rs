// recipe.rs - The build pipeline
//
// One build invocation is a strict sequence: resolve options, classify
// the target, prune, prepare the source tree, patch, run the chosen
// executor, normalize the install. Every stage's output feeds the next;
// nothing runs concurrently against the same tree.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::build::helpers::{einfo, ewarn};
use crate::build::source::SourceTree;
use crate::build::{
    BuildContext, BuildStrategy, ConfigureMakeExecutor, ToolchainGeneratorExecutor,
};
use crate::error::RecipeError;
use crate::options::OptionSet;
use crate::package::{self, ArtifactSpec};
use crate::patch::{self, PatchOperation};
use crate::platform::{PlatformTag, TargetDescriptor};
use crate::strategy::{self, StrategyKind, StrategyPlan};

pub const DEFAULT_VERSION: &str = "1.5.2";

pub struct Recipe {
    pub version: String,
    pub target: TargetDescriptor,
    pub overrides: BTreeMap<String, bool>,
    /// Directory holding the extracted upstream tree.
    pub work_root: PathBuf,
    /// Install prefix; becomes the package root.
    pub package_root: PathBuf,
    /// Recipe-owned files: the CMake wrapper and the web helper scripts.
    pub assets_dir: PathBuf,
}

/// Everything knowable before touching the source tree.
#[derive(Debug, Serialize)]
pub struct BuildPlan {
    pub tag: PlatformTag,
    pub kind: StrategyKind,
    pub options: OptionSet,
    pub patches: Vec<PatchOperation>,
    pub strategy: StrategyPlan,
    pub artifacts: ArtifactSpec,
}

#[derive(Debug, Serialize)]
pub struct BuildReport {
    pub tag: PlatformTag,
    pub kind: StrategyKind,
    pub simd: bool,
    pub libs: Vec<String>,
}

impl Recipe {
    /// Resolve the whole plan without any filesystem writes. Backs the
    /// pretend mode and the first half of `run`.
    pub fn plan(&self) -> Result<BuildPlan, RecipeError> {
        let mut options = OptionSet::resolve(&self.overrides)?;
        let tag = PlatformTag::classify(&self.target);
        tag.prune_options(&mut options);

        let kind = StrategyKind::for_platform(tag);
        let patches = patch::plan(tag, kind);
        let (_, strategy) = strategy::select(tag, &options);
        let artifacts = ArtifactSpec::for_build(tag, &options);

        Ok(BuildPlan {
            tag,
            kind,
            options,
            patches,
            strategy,
            artifacts,
        })
    }

    /// Run the pipeline end to end. The normalizer only runs after a
    /// fully successful executor stage; an aborted build leaves applied
    /// patches in place (they are safe to re-apply) but no package root
    /// considered valid.
    pub async fn run(&self) -> Result<BuildReport, RecipeError> {
        let plan = self.plan()?;
        einfo(&format!(
            "building libjpeg-turbo {} for {:?} via {:?}",
            self.version, plan.tag, plan.kind
        ));

        let tree = SourceTree::new(&self.work_root);
        let source_dir = tree.adopt_extracted(&self.version)?;
        if plan.kind == StrategyKind::ToolchainGenerator {
            tree.install_cmake_wrapper(&self.assets_dir.join("CMakeLists.txt"))?;
        }

        patch::apply_plan(&plan.patches, &self.work_root, &self.assets_dir)?;

        let build_dir = match plan.kind {
            StrategyKind::ConfigureMake => source_dir.clone(),
            StrategyKind::ToolchainGenerator => self.work_root.join("build"),
        };
        let ctx = BuildContext {
            source_dir: source_dir.clone(),
            build_dir: build_dir.clone(),
            prefix: self.package_root.clone(),
            plan: plan.strategy.clone(),
            target: self.target.clone(),
            shared: plan.options.enabled("shared"),
        };
        let executor: Box<dyn BuildStrategy> = match plan.kind {
            StrategyKind::ConfigureMake => Box::new(ConfigureMakeExecutor),
            StrategyKind::ToolchainGenerator => Box::new(ToolchainGeneratorExecutor),
        };
        executor.run(&ctx)?;

        let artifacts = package::normalize(
            &self.package_root,
            &source_dir,
            &build_dir,
            plan.tag,
            &plan.options,
        )?;

        let simd = plan.strategy.simd_enabled();
        if !simd && plan.tag == PlatformTag::Web {
            ewarn("SIMD kernels disabled on the web target; do not expect accelerated throughput");
        }

        Ok(BuildReport {
            tag: plan.tag,
            kind: plan.kind,
            simd,
            libs: artifacts.libs,
        })
    }
}
