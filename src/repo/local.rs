//! Local repository initialization.

use crate::error::{RepoError, Result};
use crate::tools::{ToolHandle, ToolRunner};
use std::path::Path;

/// Derived local repository state.
///
/// Recomputed by inspection at the start of every run, never cached across
/// runs: the working directory may have been altered externally in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryState {
    /// No history-metadata directory exists
    Uninitialized,
    /// History metadata exists but the log is empty
    InitializedNoCommits,
    /// At least one commit exists
    InitializedWithCommits,
}

/// Derive the repository state by inspection.
///
/// Checks whether the history-metadata directory exists on disk, then
/// whether a log query resolves at least one entry.
pub async fn repository_state<R: ToolRunner>(
    runner: &R,
    git: &ToolHandle,
    root: &Path,
) -> Result<RepositoryState> {
    if !root.join(".git").is_dir() {
        return Ok(RepositoryState::Uninitialized);
    }

    let head = runner
        .run(&git.path, &["rev-parse", "--verify", "--quiet", "HEAD"], root)
        .await?;
    Ok(if head.success() {
        RepositoryState::InitializedWithCommits
    } else {
        RepositoryState::InitializedNoCommits
    })
}

/// Bring the working directory to "has version history" state, idempotently.
///
/// Transitions:
/// - uninitialized: init, set line-ending normalization, stage everything,
///   create the first commit;
/// - initialized without commits: reset any partial staging, stage
///   everything, create the first commit;
/// - initialized with commits: no-op.
pub async fn ensure_initialized<R: ToolRunner>(
    runner: &R,
    git: &ToolHandle,
    root: &Path,
) -> Result<RepositoryState> {
    match repository_state(runner, git, root).await? {
        RepositoryState::Uninitialized => {
            git_command(runner, git, root, &["init"], "init").await?;
            git_command(
                runner,
                git,
                root,
                &["config", "core.autocrlf", "true"],
                "config core.autocrlf",
            )
            .await?;
            stage_and_commit(runner, git, root).await?;
        }
        RepositoryState::InitializedNoCommits => {
            // A prior run may have left a partial index behind
            git_command(runner, git, root, &["reset"], "reset").await?;
            stage_and_commit(runner, git, root).await?;
        }
        RepositoryState::InitializedWithCommits => {
            log::debug!("repository already has commits; nothing to do");
        }
    }
    Ok(RepositoryState::InitializedWithCommits)
}

async fn stage_and_commit<R: ToolRunner>(
    runner: &R,
    git: &ToolHandle,
    root: &Path,
) -> Result<()> {
    git_command(runner, git, root, &["add", "-A"], "add").await?;

    let commit = runner
        .run(&git.path, &["commit", "-m", "Initial commit"], root)
        .await?;
    if !commit.success() {
        return Err(RepoError::InitFailed {
            diagnostic: commit.diagnostic(),
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
