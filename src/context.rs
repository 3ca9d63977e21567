//! Pipeline run configuration.

use semver::Version;
use std::path::{Path, PathBuf};

/// Application display name for the main executable tree.
pub const APP_NAME: &str = "YakTaa";

/// Executable base name of the companion editor tree.
pub const EDITOR_NAME: &str = "YakTaaWorldEditor";

/// Display name of the companion editor (Start-menu entry, shortcuts).
pub const EDITOR_DISPLAY_NAME: &str = "YakTaa World Editor";

/// Default branch pushed to the remote.
pub const DEFAULT_BRANCH: &str = "main";

/// Immutable-after-construction configuration for one pipeline run.
///
/// Owned by the orchestrator for the lifetime of the run; never persisted.
/// Stage idempotency is always derived from external observable state, so
/// nothing here caches progress.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    /// Project root containing the application sources
    pub project_root: PathBuf,
    /// Installer destination directory (created on demand)
    pub output_dir: PathBuf,
    /// Built-artifact destination directory (created on demand)
    pub dist_dir: PathBuf,
    /// Target repository name on the hosting service
    pub repo_name: String,
    /// Preferred branch name for the remote push
    pub default_branch: String,
    /// Version being released
    pub version: Version,
}

impl PipelineContext {
    /// Build a context from the confirmed run parameters.
    ///
    /// `output_dir` and `dist_dir` default to `<root>/Output` and
    /// `<root>/dist` when not overridden.
    pub fn new(
        project_root: PathBuf,
        output_dir: Option<PathBuf>,
        dist_dir: Option<PathBuf>,
        repo_name: String,
        default_branch: String,
        version: Version,
    ) -> Self {
        let output_dir = output_dir.unwrap_or_else(|| project_root.join("Output"));
        let dist_dir = dist_dir.unwrap_or_else(|| project_root.join("dist"));
        Self {
            project_root,
            output_dir,
            dist_dir,
            repo_name,
            default_branch,
            version,
        }
    }

    /// Release tag for this run's version (`v<version>`)
    pub fn tag(&self) -> String {
        format!("v{}", self.version)
    }

    /// Fixed installer base name, versioned
    pub fn installer_base_name(&self) -> String {
        format!("{}-Setup-{}", APP_NAME, self.version)
    }

    /// Glob pattern the composed installer must match in the output directory.
    ///
    /// Scoped to this run's version: a leftover installer from a prior
    /// version's run must never satisfy the pattern.
    pub fn installer_pattern(&self) -> String {
        format!("{}-Setup-{}*.exe", APP_NAME, self.version)
    }

    /// Expected main application executable after a build
    pub fn app_executable(&self) -> PathBuf {
        executable_in(&self.dist_dir, APP_NAME)
    }

    /// Expected companion editor executable after a build
    pub fn editor_executable(&self) -> PathBuf {
        executable_in(&self.dist_dir, EDITOR_NAME)
    }
}

fn executable_in(dist_dir: &Path, name: &str) -> PathBuf {
    dist_dir
        .join(name)
        .join(format!("{}{}", name, std::env::consts::EXE_SUFFIX))
}
