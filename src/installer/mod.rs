//! Installer composition.
//!
//! Transforms the built artifact trees plus a generated installer
//! descriptor into a single distributable installer file via the external
//! installer compiler, then verifies exactly one installer matches the
//! expected name pattern.

pub mod descriptor;

pub use descriptor::{FileAssociation, InstallEntry, InstallerDescriptor, Redistributable};

use crate::build::BuiltArtifacts;
use crate::cli::OutputManager;
use crate::context::PipelineContext;
use crate::error::{InstallerError, Result};
use crate::prompt::Prompter;
use crate::tools::{ToolHandle, ToolRunner};
use std::path::PathBuf;
use std::time::SystemTime;

/// Compose the installer from the built artifacts.
pub async fn compose<R: ToolRunner, P: Prompter>(
    runner: &R,
    iscc: &ToolHandle,
    prompter: &P,
    ctx: &PipelineContext,
    artifacts: &BuiltArtifacts,
    output: &OutputManager,
) -> Result<PathBuf> {
    log::debug!(
        "composing installer from {} and {}",
        artifacts.app_dir.display(),
        artifacts.editor_dir.display()
    );
    tokio::fs::create_dir_all(&ctx.output_dir).await?;

    // Ephemeral: rewritten on every run, consumed exactly once
    let spec = descriptor::generate(ctx, prompter, output)?;
    let script_path = ctx.output_dir.join("installer.iss");
    descriptor::write_script(&spec, &script_path).await?;

    let script_arg = script_path.to_string_lossy();
    let outdir_arg = format!("/O{}", ctx.output_dir.display());
    let result = runner
        .run(
            &iscc.path,
            &[script_arg.as_ref(), &outdir_arg],
            &ctx.project_root,
        )
        .await?;
    if !result.success() {
        return Err(InstallerError::CompilerFailed {
            diagnostic: result.diagnostic(),
        }
        .into());
    }

    select_installer(ctx, output)
}

/// Find the composed installer in the output directory.
///
/// Exactly one file should match this run's versioned name pattern. Zero is
/// [`InstallerError::InstallerMissing`]; more than one is ambiguous and the
/// most recently modified is selected with a warning, so a fresh compile
/// always beats a leftover from an earlier run.
pub fn select_installer(ctx: &PipelineContext, output: &OutputManager) -> Result<PathBuf> {
    let pattern = ctx.output_dir.join(ctx.installer_pattern());
    let pattern_str = pattern.to_string_lossy();

    let mut matches: Vec<PathBuf> = glob::glob(&pattern_str)
        .map_err(|e| anyhow::anyhow!("invalid installer pattern '{pattern_str}': {e}"))?
        .flatten()
        .collect();

    match matches.len() {
        0 => Err(InstallerError::InstallerMissing {
            pattern: ctx.installer_pattern(),
            dir: ctx.output_dir.clone(),
        }
        .into()),
        1 => Ok(matches.remove(0)),
        n => {
            output.warn(&format!(
                "{n} installers match '{}'; selecting the most recently modified",
                ctx.installer_pattern()
            ));
            matches.sort_by_key(|path| {
                std::fs::metadata(path)
                    .and_then(|m| m.modified())
                    .unwrap_or(SystemTime::UNIX_EPOCH)
            });
            matches.reverse();
            Ok(matches.remove(0))
        }
    }
}
