//! Release publication.
//!
//! Ensures a tagged, versioned release exists on the hosting service with
//! the installer attached as the sole downloadable asset. Re-running with a
//! version whose tag already exists fails loudly: overwriting a public
//! release is a correctness hazard, not a convenience.

use crate::build;
use crate::cli::OutputManager;
use crate::context::{APP_NAME, PipelineContext};
use crate::error::{PublishError, RepoError, Result};
use crate::installer;
use crate::prompt::Prompter;
use crate::repo::{RemoteRef, RemoteState, remote_state};
use crate::tools::{ToolHandle, Toolchain, ToolRunner};
use chrono::Utc;
use std::path::{Path, PathBuf};

/// The externally-visible artifact of a successful run.
#[derive(Debug, Clone)]
pub struct ReleaseRecord {
    /// Version tag (`v<version>`)
    pub tag: String,
    /// Release title
    pub title: String,
    /// Fixed-format release notes
    pub notes: String,
    /// Installer attached as the sole asset
    pub asset: PathBuf,
}

/// Publish the release for this run's version.
///
/// When the installer is absent, offers exactly one fallback: run the full
/// build → compose sub-pipeline, then re-check. When the remote has zero
/// files, synthesizes and pushes a minimal description file first — the
/// hosting service's release mechanism requires a non-empty default branch.
pub async fn publish<R: ToolRunner, P: Prompter>(
    runner: &R,
    tools: &Toolchain,
    prompter: &P,
    ctx: &PipelineContext,
    remote: &RemoteRef,
    output: &OutputManager,
) -> Result<ReleaseRecord> {
    let installer_path = resolve_installer(runner, tools, prompter, ctx, output).await?;

    let state = remote_state(runner, &tools.gh, &remote.owner, &remote.name, &ctx.project_root)
        .await?;
    if state == RemoteState::ExistsEmpty {
        output.info("remote repository is empty; bootstrapping description file");
        bootstrap_description(runner, &tools.git, ctx, remote).await?;
    } else {
        log::debug!("remote has content; no bootstrap needed");
    }

    let tag = ctx.tag();
    let title = format!("{APP_NAME} {tag}");
    let asset_name = installer_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| ctx.installer_base_name());
    let notes = format!(
        "{APP_NAME} release {version}\n\nPublished {date}.\nInstaller asset: {asset_name}",
        version = ctx.version,
        date = Utc::now().format("%Y-%m-%d"),
    );

    let installer_arg = installer_path.to_string_lossy();
    let create = runner
        .run(
            &tools.gh.path,
            &[
                "release",
                "create",
                &tag,
                installer_arg.as_ref(),
                "--repo",
                &remote.slug(),
                "--title",
                &title,
                "--notes",
                &notes,
            ],
            &ctx.project_root,
        )
        .await?;
    if !create.success() {
        // No guard against an existing tag by design: duplicate-version
        // invocation must fail here rather than silently overwrite.
        return Err(PublishError::ReleaseCreateFailed {
            tag,
            diagnostic: create.diagnostic(),
        }
        .into());
    }

    Ok(ReleaseRecord {
        tag,
        title,
        notes,
        asset: installer_path,
    })
}

/// Require the installer to exist, with one rebuild fallback.
async fn resolve_installer<R: ToolRunner, P: Prompter>(
    runner: &R,
    tools: &Toolchain,
    prompter: &P,
    ctx: &PipelineContext,
    output: &OutputManager,
) -> Result<PathBuf> {
    if let Ok(path) = installer::select_installer(ctx, output) {
        return Ok(path);
    }

    let rebuild = prompter.confirm(
        "No installer found in the output directory. Run the build sub-pipeline now?",
        true,
    )?;
    if rebuild {
        let descriptor = build::descriptor::generate(runner, &tools.python, ctx, output).await?;
        let artifacts = build::build(runner, &tools.pyinstaller, ctx, &descriptor).await?;
        installer::compose(runner, &tools.iscc, prompter, ctx, &artifacts, output).await?;
    }

    installer::select_installer(ctx, output).map_err(|_| {
        PublishError::NoInstallerArtifact {
            path: ctx.output_dir.join(ctx.installer_pattern()),
        }
        .into()
    })
}

/// Synthesize a minimal description file and push it so the default branch
/// is non-empty.
async fn bootstrap_description<R: ToolRunner>(
    runner: &R,
    git: &ToolHandle,
    ctx: &PipelineContext,
    remote: &RemoteRef,
) -> Result<()> {
    let readme = ctx.project_root.join("README.md");
    if !readme.is_file() {
        let body = format!(
            "# {APP_NAME}\n\nDesktop application packaged and released by the yaktaa_release pipeline.\n"
        );
        tokio::fs::write(&readme, body).await?;
    }

    git_command(runner, git, &ctx.project_root, &["add", "README.md"], "add").await?;
    git_command(
        runner,
        git,
        &ctx.project_root,
        &["commit", "-m", "Add project description"],
        "commit",
    )
    .await?;

    let push = runner
        .run(
            &git.path,
            &["push", "origin", &remote.branch],
            &ctx.project_root,
        )
        .await?;
    if !push.success() {
        return Err(RepoError::PushFailed {
            diagnostic: push.diagnostic(),
        }
        .into());
    }
    Ok(())
}

async fn git_command<R: ToolRunner>(
    runner: &R,
    git: &ToolHandle,
    root: &Path,
    args: &[&str],
    operation: &str,
) -> Result<()> {
    let result = runner.run(&git.path, args, root).await?;
    if !result.success() {
        return Err(RepoError::GitCommandFailed {
            operation: operation.to_string(),
            diagnostic: result.diagnostic(),
        }
        .into());
    }
    Ok(())
}
