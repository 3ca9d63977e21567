//! Command line interface for yaktaa_release.
//!
//! Parses arguments, confirms the run parameters interactively, and hands
//! off to the pipeline orchestrator.

mod args;
mod output;

pub use args::Args;
pub use output::OutputManager;

use crate::context::PipelineContext;
use crate::error::Result;
use crate::pipeline::Pipeline;
use crate::prompt::{Prompter, TerminalPrompter};
use crate::tools::ProcessRunner;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    if let Err(message) = args.validate() {
        return Err(anyhow::anyhow!(message).into());
    }

    let output = OutputManager::new(args.verbose, args.quiet);
    let prompter = TerminalPrompter::new(args.assume_yes);

    let project_root = args
        .project_root
        .canonicalize()
        .unwrap_or(args.project_root.clone());

    let repo_name = match &args.repo {
        Some(name) => name.clone(),
        None => {
            let default = project_root
                .file_name()
                .map(|n| n.to_string_lossy().into_owned());
            prompter.input("Repository name", default.as_deref())?
        }
    };

    let version_input = prompter.input("Version to release", args.version.as_deref())?;
    let version = semver::Version::parse(version_input.trim())?;

    let ctx = PipelineContext::new(
        project_root,
        args.output_dir.clone(),
        args.dist_dir.clone(),
        repo_name,
        args.branch.clone(),
        version,
    );

    let pipeline = Pipeline::new(ProcessRunner, prompter, output.clone());
    let record = pipeline.run(&ctx).await?;

    output.println("");
    output.success(&format!(
        "release {} published with {}",
        record.tag,
        record.asset.display()
    ));
    Ok(0)
}
