//! Stage orchestration.
//!
//! Runs the fixed stage sequence: tooling, identity, local repository,
//! remote repository, build, installer, release. Every stage re-derives its
//! own "already done" predicate from external state, so re-invoking the
//! whole pipeline after a mid-run failure resumes where the world actually
//! is rather than where a progress file claims it is.

use crate::build;
use crate::cli::OutputManager;
use crate::context::PipelineContext;
use crate::error::Result;
use crate::installer;
use crate::prompt::Prompter;
use crate::release::{self, ReleaseRecord};
use crate::repo;
use crate::tools::{ToolRunner, Toolchain};

/// One pipeline run, generic over the process and prompt seams.
pub struct Pipeline<R: ToolRunner, P: Prompter> {
    runner: R,
    prompter: P,
    output: OutputManager,
}

impl<R: ToolRunner, P: Prompter> Pipeline<R, P> {
    /// Assemble a pipeline from its seams.
    pub fn new(runner: R, prompter: P, output: OutputManager) -> Self {
        Self {
            runner,
            prompter,
            output,
        }
    }

    /// Run every stage in order, stopping at the first failure.
    pub async fn run(&self, ctx: &PipelineContext) -> Result<ReleaseRecord> {
        let root = &ctx.project_root;

        self.output.section("Tooling");
        let tools = Toolchain::ensure_all(&self.runner, root).await?;
        for handle in [
            &tools.git,
            &tools.gh,
            &tools.python,
            &tools.pyinstaller,
            &tools.iscc,
        ] {
            self.output
                .verbose(&format!("{}: {}", handle.name, handle.path.display()));
        }
        self.output.success("all required tools are invocable");

        self.output.section("Identity");
        let identity =
            repo::ensure_identity(&self.runner, &tools.git, &self.prompter, root).await?;
        self.output
            .success(&format!("committing as {} <{}>", identity.name, identity.email));

        self.output.section("Local repository");
        repo::ensure_initialized(&self.runner, &tools.git, root).await?;
        self.output.success("local history present");

        self.output.section("Remote repository");
        let remote =
            repo::ensure_published(&self.runner, &tools.git, &tools.gh, ctx).await?;
        self.output
            .success(&format!("pushed {} to {}", remote.branch, remote.slug()));

        self.output.section("Build");
        let descriptor =
            build::descriptor::generate(&self.runner, &tools.python, ctx, &self.output).await?;
        let artifacts = build::build(&self.runner, &tools.pyinstaller, ctx, &descriptor).await?;
        self.output.success(&format!(
            "built {} and {}",
            artifacts.app_exe.display(),
            artifacts.editor_exe.display()
        ));

        self.output.section("Installer");
        let installer_path = installer::compose(
            &self.runner,
            &tools.iscc,
            &self.prompter,
            ctx,
            &artifacts,
            &self.output,
        )
        .await?;
        self.output
            .success(&format!("composed {}", installer_path.display()));

        self.output.section("Release");
        let record = release::publish(
            &self.runner,
            &tools,
            &self.prompter,
            ctx,
            &remote,
            &self.output,
        )
        .await?;
        self.output.success(&format!(
            "published {} with asset {}",
            record.tag,
            record.asset.display()
        ));

        Ok(record)
    }
}
