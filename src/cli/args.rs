//! Command line argument parsing and validation.
//!
//! The tool is designed to "just work": point it at the project directory,
//! confirm the repository name and version, and it builds, packages, and
//! releases.

use clap::Parser;
use std::path::PathBuf;

/// Idempotent build-and-release pipeline for the YakTaa desktop application
#[derive(Parser, Debug)]
#[command(
    name = "yaktaa_release",
    about = "Build, package, and release the YakTaa desktop application",
    long_about = "Runs the full release pipeline: verify external tools, ensure \
authorship identity, initialize and publish the repository, build both \
executable trees, compose the installer, and publish a tagged release with \
the installer attached.

Every stage checks whether its work is already done before acting, so the \
command can be re-run safely after a mid-run failure."
)]
pub struct Args {
    /// Project root containing the application sources
    #[arg(index = 1, value_name = "PROJECT_ROOT", default_value = ".")]
    pub project_root: PathBuf,

    /// Repository name on the hosting service (defaults to the project
    /// directory name, confirmed interactively)
    #[arg(long, value_name = "NAME")]
    pub repo: Option<String>,

    /// Version to release (semantic version, confirmed interactively)
    #[arg(long, value_name = "VERSION")]
    pub version: Option<String>,

    /// Branch pushed to the remote
    #[arg(long, value_name = "BRANCH", default_value = crate::context::DEFAULT_BRANCH)]
    pub branch: String,

    /// Installer destination directory (default: <PROJECT_ROOT>/Output)
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Built-artifact destination directory (default: <PROJECT_ROOT>/dist)
    #[arg(long, value_name = "DIR")]
    pub dist_dir: Option<PathBuf>,

    /// Show verbose output
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Suppress all non-error output
    #[arg(long, short = 'q', conflicts_with = "verbose")]
    pub quiet: bool,

    /// Accept every confirmation and use defaults for prompts
    #[arg(long = "yes", short = 'y')]
    pub assume_yes: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if !self.project_root.is_dir() {
            return Err(format!(
                "project root '{}' is not a directory",
                self.project_root.display()
            ));
        }
        if let Some(version) = &self.version
            && semver::Version::parse(version).is_err()
        {
            return Err(format!("'{version}' is not a valid semantic version"));
        }
        if self.branch.trim().is_empty() {
            return Err("branch name must not be empty".to_string());
        }
        Ok(())
    }
}
