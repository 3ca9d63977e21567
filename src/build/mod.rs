//! Artifact building.
//!
//! Transforms source plus a generated build descriptor into the two
//! platform executable trees via the external build tool, then verifies
//! both expected executables exist on disk. The tool may exit successfully
//! yet omit an artifact when inputs are misconfigured, so the post-condition
//! check is distinct from the exit-code check.

pub mod descriptor;

pub use descriptor::{BuildDescriptor, PathMapping};

use crate::context::PipelineContext;
use crate::error::{BuildError, Result};
use crate::tools::{ToolHandle, ToolRunner};
use std::path::PathBuf;

/// Verified output of one build: both executable trees.
#[derive(Debug, Clone)]
pub struct BuiltArtifacts {
    /// Main application tree root
    pub app_dir: PathBuf,
    /// Main application executable
    pub app_exe: PathBuf,
    /// Companion editor tree root
    pub editor_dir: PathBuf,
    /// Companion editor executable
    pub editor_exe: PathBuf,
}

/// Invoke the build tool with the rendered descriptor and verify the
/// post-condition: both expected executables exist.
pub async fn build<R: ToolRunner>(
    runner: &R,
    pyinstaller: &ToolHandle,
    ctx: &PipelineContext,
    descriptor: &BuildDescriptor,
) -> Result<BuiltArtifacts> {
    tokio::fs::create_dir_all(&ctx.dist_dir).await?;

    // Ephemeral: rewritten on every run, consumed exactly once
    let spec_path = ctx.dist_dir.join("yaktaa.spec");
    descriptor::write_spec(descriptor, &spec_path).await?;

    let spec_arg = spec_path.to_string_lossy();
    let output = runner
        .run(&pyinstaller.path, &[spec_arg.as_ref()], &ctx.project_root)
        .await?;
    if !output.success() {
        return Err(BuildError::BuildToolFailed {
            diagnostic: output.diagnostic(),
        }
        .into());
    }

    let app_exe = ctx.app_executable();
    let editor_exe = ctx.editor_executable();
    for expected in [&app_exe, &editor_exe] {
        if !expected.is_file() {
            return Err(BuildError::ArtifactMissing {
                path: expected.clone(),
            }
            .into());
        }
    }

    Ok(BuiltArtifacts {
        app_dir: app_exe
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| ctx.dist_dir.clone()),
        app_exe,
        editor_dir: editor_exe
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| ctx.dist_dir.clone()),
        editor_exe,
    })
}
