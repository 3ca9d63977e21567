//! Tool invocation boundary.
//!
//! External tools are opaque executables. Every invocation goes through
//! [`ToolRunner`] and comes back as a [`ToolOutput`] carrying the exit code,
//! stdout, and stderr structurally. Exit codes never drive control flow
//! outside this boundary.

use crate::error::ToolError;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Captured result of one external tool invocation.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Rendered command line, for diagnostics
    pub command: String,
    /// Exit code, `None` if the process was terminated by a signal
    pub code: Option<i32>,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

impl ToolOutput {
    /// Whether the tool reported success (exit code 0)
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Standard output with surrounding whitespace removed
    pub fn stdout_trimmed(&self) -> &str {
        self.stdout.trim()
    }

    /// Render the exit state and stderr for inclusion in a stage error
    pub fn diagnostic(&self) -> String {
        let code = match self.code {
            Some(code) => code.to_string(),
            None => "killed by signal".to_string(),
        };
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            format!("`{}` exited with code {}", self.command, code)
        } else {
            format!("`{}` exited with code {}: {}", self.command, code, stderr)
        }
    }
}

/// Render a command line for logging and diagnostics
pub fn render_command(program: &Path, args: &[&str]) -> String {
    let mut rendered = program.display().to_string();
    for arg in args {
        rendered.push(' ');
        if arg.contains(char::is_whitespace) {
            rendered.push('"');
            rendered.push_str(arg);
            rendered.push('"');
        } else {
            rendered.push_str(arg);
        }
    }
    rendered
}

/// Boundary trait for external tool execution.
///
/// Stages are generic over this trait so tests can substitute a scripted
/// runner and assert which mutating calls a stage performed.
#[allow(async_fn_in_trait)]
pub trait ToolRunner: Send + Sync {
    /// Run a tool to completion, capturing stdout and stderr.
    async fn run(
        &self,
        program: &Path,
        args: &[&str],
        cwd: &Path,
    ) -> Result<ToolOutput, ToolError>;

    /// Run a tool with inherited stdio for interactive handoff
    /// (e.g., hosting-service login). Only the exit state is captured.
    async fn run_interactive(
        &self,
        program: &Path,
        args: &[&str],
        cwd: &Path,
    ) -> Result<ToolOutput, ToolError>;
}

/// Production runner backed by `tokio::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
    async fn run(
        &self,
        program: &Path,
        args: &[&str],
        cwd: &Path,
    ) -> Result<ToolOutput, ToolError> {
        let command = render_command(program, args);
        log::debug!("invoking: {command}");

        let output = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|error| ToolError::Spawn {
                command: command.clone(),
                error,
            })?;

        let result = ToolOutput {
            command,
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        log::debug!("exit code: {:?}", result.code);
        Ok(result)
    }

    async fn run_interactive(
        &self,
        program: &Path,
        args: &[&str],
        cwd: &Path,
    ) -> Result<ToolOutput, ToolError> {
        let command = render_command(program, args);
        log::debug!("invoking (interactive): {command}");

        let status = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .status()
            .await
            .map_err(|error| ToolError::Spawn {
                command: command.clone(),
                error,
            })?;

        Ok(ToolOutput {
            command,
            code: status.code(),
            stdout: String::new(),
            stderr: String::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn diagnostic_includes_command_and_stderr() {
        let output = ToolOutput {
            command: "git push -u origin main".to_string(),
            code: Some(128),
            stdout: String::new(),
            stderr: "fatal: could not read from remote\n".to_string(),
        };
        let diagnostic = output.diagnostic();
        assert!(diagnostic.contains("git push"));
        assert!(diagnostic.contains("128"));
        assert!(diagnostic.contains("could not read from remote"));
    }

    #[test]
    fn render_command_quotes_whitespace() {
        let rendered = render_command(
            &PathBuf::from("git"),
            &["commit", "-m", "Initial commit"],
        );
        assert_eq!(rendered, "git commit -m \"Initial commit\"");
    }
}
