//! Authorship identity resolution.

use crate::error::{RepoError, Result};
use crate::prompt::Prompter;
use crate::tools::{ToolHandle, ToolRunner};
use std::path::Path;

/// Persistent authorship identity read from the version-control config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Author name
    pub name: String,
    /// Contact email
    pub email: String,
}

/// Ensure both identity fields are configured, prompting only for the
/// missing ones and persisting them globally.
///
/// A fully-configured identity short-circuits with no prompts. Existing
/// non-empty fields are never overwritten.
pub async fn ensure_identity<R: ToolRunner, P: Prompter>(
    runner: &R,
    git: &ToolHandle,
    prompter: &P,
    cwd: &Path,
) -> Result<Identity> {
    let name = ensure_field(runner, git, prompter, cwd, "user.name", "Author name").await?;
    let email = ensure_field(runner, git, prompter, cwd, "user.email", "Contact email").await?;
    Ok(Identity { name, email })
}

async fn ensure_field<R: ToolRunner, P: Prompter>(
    runner: &R,
    git: &ToolHandle,
    prompter: &P,
    cwd: &Path,
    key: &str,
    label: &str,
) -> Result<String> {
    let read = runner.run(&git.path, &["config", "--global", key], cwd).await?;
    if read.success() && !read.stdout_trimmed().is_empty() {
        return Ok(read.stdout_trimmed().to_string());
    }

    let value = prompter.input(label, None)?;
    let write = runner
        .run(&git.path, &["config", "--global", key, &value], cwd)
        .await?;
    if !write.success() {
        return Err(RepoError::GitCommandFailed {
            operation: format!("config {key}"),
            diagnostic: write.diagnostic(),
        }
        .into());
    }
    Ok(value)
}
