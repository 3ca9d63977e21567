//! Remote repository publication.

use crate::context::PipelineContext;
use crate::error::{RepoError, Result};
use crate::tools::{ToolHandle, ToolRunner};
use serde::Deserialize;
use std::path::Path;

/// Derived remote repository state.
///
/// Recomputed from hosting-service responses on every run, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteState {
    /// No repository with the target owner/name exists
    Absent,
    /// The repository exists but its default branch has zero files
    ExistsEmpty,
    /// The repository exists and has content
    ExistsWithContent,
}

/// A published remote the local history is pushed to.
#[derive(Debug, Clone)]
pub struct RemoteRef {
    /// Repository owner (the authenticated user)
    pub owner: String,
    /// Repository name
    pub name: String,
    /// Remote URL attached as "origin"
    pub url: String,
    /// Branch pushed with upstream tracking
    pub branch: String,
}

impl RemoteRef {
    /// owner/name slug used by the hosting-service CLI
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Deserialize)]
struct AuthenticatedUser {
    login: String,
}

/// Ensure the hosting-service CLI is authenticated, handing off to its
/// interactive login once if not.
pub async fn ensure_authenticated<R: ToolRunner>(
    runner: &R,
    gh: &ToolHandle,
    cwd: &Path,
) -> Result<()> {
    let status = runner.run(&gh.path, &["auth", "status"], cwd).await?;
    if status.success() {
        return Ok(());
    }

    log::info!("hosting-service CLI not authenticated; handing off to login");
    runner
        .run_interactive(&gh.path, &["auth", "login"], cwd)
        .await?;

    let recheck = runner.run(&gh.path, &["auth", "status"], cwd).await?;
    if recheck.success() {
        Ok(())
    } else {
        Err(RepoError::AuthenticationFailed {
            diagnostic: recheck.diagnostic(),
        }
        .into())
    }
}

/// Resolve the authenticated user's login from the hosting service.
pub async fn authenticated_login<R: ToolRunner>(
    runner: &R,
    gh: &ToolHandle,
    cwd: &Path,
) -> Result<String> {
    let output = runner.run(&gh.path, &["api", "user"], cwd).await?;
    if !output.success() {
        return Err(RepoError::AuthenticationFailed {
            diagnostic: output.diagnostic(),
        }
        .into());
    }
    let user: AuthenticatedUser = serde_json::from_str(output.stdout_trimmed())?;
    Ok(user.login)
}

/// Ensure a hosted repository exists and local history is pushed to it.
///
/// A pre-existing "origin" remote is removed first: a prior run may have
/// pointed it at a stale or wrong location. This is the one sanctioned
/// "correct prior state" mutation in the pipeline.
pub async fn ensure_published<R: ToolRunner>(
    runner: &R,
    git: &ToolHandle,
    gh: &ToolHandle,
    ctx: &PipelineContext,
) -> Result<RemoteRef> {
    let root = &ctx.project_root;

    ensure_authenticated(runner, gh, root).await?;

    // Correct prior state: drop any stale "origin"
    let existing = runner
        .run(&git.path, &["remote", "get-url", "origin"], root)
        .await?;
    if existing.success() {
        log::debug!(
            "replacing existing origin remote ({})",
            existing.stdout_trimmed()
        );
        git_command(runner, git, root, &["remote", "remove", "origin"], "remote remove").await?;
    }

    let owner = authenticated_login(runner, gh, root).await?;
    let slug = format!("{}/{}", owner, ctx.repo_name);

    let view = runner.run(&gh.path, &["repo", "view", &slug], root).await?;
    if !view.success() {
        log::info!("remote repository {slug} absent; creating as private");
        let create = runner
            .run(&gh.path, &["repo", "create", &ctx.repo_name, "--private"], root)
            .await?;
        if !create.success() {
            return Err(RepoError::RemoteCreateFailed {
                diagnostic: create.diagnostic(),
            }
            .into());
        }
    }

    let url = format!("https://github.com/{slug}.git");
    git_command(runner, git, root, &["remote", "add", "origin", &url], "remote add").await?;

    let branch = resolve_branch(runner, git, root, &ctx.default_branch).await?;

    let push = runner
        .run(&git.path, &["push", "-u", "origin", &branch], root)
        .await?;
    if !push.success() {
        return Err(RepoError::PushFailed {
            diagnostic: push.diagnostic(),
        }
        .into());
    }

    Ok(RemoteRef {
        owner,
        name: ctx.repo_name.clone(),
        url,
        branch,
    })
}

/// Determine the branch to push: prefer the fixed default branch if it
/// exists; otherwise the current branch; in detached state, create the
/// default branch.
async fn resolve_branch<R: ToolRunner>(
    runner: &R,
    git: &ToolHandle,
    root: &Path,
    default_branch: &str,
) -> Result<String> {
    let default_ref = format!("refs/heads/{default_branch}");
    let has_default = runner
        .run(
            &git.path,
            &["show-ref", "--verify", "--quiet", &default_ref],
            root,
        )
        .await?;
    if has_default.success() {
        return Ok(default_branch.to_string());
    }

    let current = runner
        .run(&git.path, &["branch", "--show-current"], root)
        .await?;
    if current.success() && !current.stdout_trimmed().is_empty() {
        return Ok(current.stdout_trimmed().to_string());
    }

    git_command(
        runner,
        git,
        root,
        &["checkout", "-b", default_branch],
        "branch create",
    )
    .await?;
    Ok(default_branch.to_string())
}

/// Derive the remote state for an owner/name known to exist or not.
///
/// An empty repository has no readable contents listing, which the
/// hosting-service CLI reports as a failure; that maps to "exists, empty"
/// when the repository itself is viewable.
pub async fn remote_state<R: ToolRunner>(
    runner: &R,
    gh: &ToolHandle,
    owner: &str,
    name: &str,
    cwd: &Path,
) -> Result<RemoteState> {
    let slug = format!("{owner}/{name}");

    let view = runner.run(&gh.path, &["repo", "view", &slug], cwd).await?;
    if !view.success() {
        return Ok(RemoteState::Absent);
    }

    let contents = runner
        .run(&gh.path, &["api", &format!("repos/{slug}/contents/")], cwd)
        .await?;
    if !contents.success() {
        return Ok(RemoteState::ExistsEmpty);
    }

    let entries: Vec<serde_json::Value> =
        serde_json::from_str(contents.stdout_trimmed()).unwrap_or_default();
    Ok(if entries.is_empty() {
        RemoteState::ExistsEmpty
    } else {
        RemoteState::ExistsWithContent
    })
}

async fn git_command<R: ToolRunner>(
    runner: &R,
    git: &ToolHandle,
    root: &Path,
    args: &[&str],
    operation: &str,
) -> Result<()> {
    let output = runner.run(&git.path, args, root).await?;
    if !output.success() {
        return Err(RepoError::GitCommandFailed {
            operation: operation.to_string(),
            diagnostic: output.diagnostic(),
        }
        .into());
    }
    Ok(())
}
