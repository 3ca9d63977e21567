//! Error types for pipeline operations.
//!
//! Every stage failure carries the stage's diagnostic context (the external
//! tool's command line, exit code, and captured stderr) so a failed run can
//! be remediated and safely re-invoked.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Main error type for all pipeline operations
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Tool availability errors
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Local and remote repository errors
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),

    /// Artifact build errors
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// Installer composition errors
    #[error("Installer error: {0}")]
    Installer(#[from] InstallerError),

    /// Release publication errors
    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    /// Interactive prompt errors
    #[error("Prompt error: {0}")]
    Prompt(#[from] PromptError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing errors (hosting-service CLI responses)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Descriptor template parsing errors
    #[error("Template error: {0}")]
    Template(#[from] Box<handlebars::TemplateError>),

    /// Descriptor template rendering errors
    #[error("Render error: {0}")]
    Render(#[from] handlebars::RenderError),

    /// Version string parsing errors
    #[error("Version error: {0}")]
    Version(#[from] semver::Error),

    /// Generic errors from anyhow
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

impl From<handlebars::TemplateError> for PipelineError {
    fn from(error: handlebars::TemplateError) -> Self {
        PipelineError::Template(Box::new(error))
    }
}

/// Tool availability errors
#[derive(Error, Debug)]
pub enum ToolError {
    /// Tool cannot be invoked after one bounded self-repair cycle
    #[error("Tool '{name}' unavailable after self-repair attempt: {detail}")]
    Unavailable {
        /// Tool name
        name: String,
        /// What was attempted and why it failed
        detail: String,
    },

    /// External tool process could not be spawned
    #[error("Failed to spawn '{command}': {error}")]
    Spawn {
        /// Command line that failed to spawn
        command: String,
        /// The underlying I/O error
        error: std::io::Error,
    },
}

/// Local and remote repository errors
#[derive(Error, Debug)]
pub enum RepoError {
    /// First commit failed during local repository initialization
    #[error("Repository initialization failed: {diagnostic}")]
    InitFailed {
        /// Captured tool diagnostic (exit code and stderr)
        diagnostic: String,
    },

    /// Hosting-service repository creation failed
    #[error("Remote repository creation failed: {diagnostic}")]
    RemoteCreateFailed {
        /// Captured tool diagnostic (exit code and stderr)
        diagnostic: String,
    },

    /// Push to the remote failed
    #[error("Push failed: {diagnostic}")]
    PushFailed {
        /// Captured tool diagnostic (exit code and stderr)
        diagnostic: String,
    },

    /// Hosting-service authentication could not be established
    #[error("Hosting-service authentication failed: {diagnostic}")]
    AuthenticationFailed {
        /// Captured tool diagnostic (exit code and stderr)
        diagnostic: String,
    },

    /// Ancillary version-control command reported a non-zero exit code
    #[error("Git {operation} failed: {diagnostic}")]
    GitCommandFailed {
        /// Operation that failed (e.g., "remote remove", "branch create")
        operation: String,
        /// Captured tool diagnostic (exit code and stderr)
        diagnostic: String,
    },
}

/// Artifact build errors
#[derive(Error, Debug)]
pub enum BuildError {
    /// Build tool reported a non-zero exit code
    #[error("Build tool failed: {diagnostic}")]
    BuildToolFailed {
        /// Captured tool diagnostic (exit code and stderr)
        diagnostic: String,
    },

    /// Expected executable absent after a build that exited successfully
    #[error("Expected artifact missing after build: {path}")]
    ArtifactMissing {
        /// Path that was expected to exist
        path: PathBuf,
    },
}

/// Installer composition errors
#[derive(Error, Debug)]
pub enum InstallerError {
    /// Installer compiler reported a non-zero exit code
    #[error("Installer compiler failed: {diagnostic}")]
    CompilerFailed {
        /// Captured tool diagnostic (exit code and stderr)
        diagnostic: String,
    },

    /// No installer file matched the expected name pattern after compilation
    #[error("No installer matching '{pattern}' found in {dir}")]
    InstallerMissing {
        /// Expected installer name pattern
        pattern: String,
        /// Output directory that was searched
        dir: PathBuf,
    },
}

/// Release publication errors
#[derive(Error, Debug)]
pub enum PublishError {
    /// No installer artifact exists, even after the one sanctioned rebuild
    #[error("No installer artifact available at {path}")]
    NoInstallerArtifact {
        /// Path where the installer was expected
        path: PathBuf,
    },

    /// Release creation failed (including an already-existing version tag)
    #[error("Release creation failed for tag '{tag}': {diagnostic}")]
    ReleaseCreateFailed {
        /// Tag that was being created
        tag: String,
        /// Captured tool diagnostic (exit code and stderr)
        diagnostic: String,
    },
}

/// Interactive prompt errors
#[derive(Error, Debug)]
pub enum PromptError {
    /// Terminal interaction failed
    #[error("Terminal interaction failed: {0}")]
    Terminal(#[from] dialoguer::Error),

    /// A required value was requested in non-interactive mode
    #[error("Value for '{field}' required but running non-interactively")]
    NonInteractive {
        /// Field that needed a value
        field: String,
    },
}

impl PipelineError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            PipelineError::Tool(ToolError::Unavailable { name, .. }) => vec![
                format!("Install '{name}' manually and ensure it is on PATH"),
                "Re-run the pipeline; completed stages are skipped".to_string(),
            ],
            PipelineError::Repo(RepoError::AuthenticationFailed { .. }) => vec![
                "Authenticate with the hosting service: gh auth login".to_string(),
                "Verify the token scopes include 'repo'".to_string(),
            ],
            PipelineError::Repo(RepoError::PushFailed { .. }) => vec![
                "Check network connectivity and remote URL: git remote -v".to_string(),
                "Verify push access to the repository".to_string(),
            ],
            PipelineError::Publish(PublishError::ReleaseCreateFailed { tag, .. }) => vec![
                format!("If tag '{tag}' already exists, bump the version and re-run"),
                "Existing releases are never overwritten".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }
}
