//! External tool availability checking.
//!
//! Verifies that the required external executables are invocable, attempting
//! one bounded self-repair cycle (well-known location probing, then an
//! unattended package-manager install) before failing. Resolution never
//! mutates the process environment; resolved locations are carried in
//! explicit [`ToolHandle`]s threaded through the pipeline.

mod locate;
mod runner;

pub use runner::{ProcessRunner, ToolOutput, ToolRunner, render_command};

use crate::error::ToolError;
use std::path::{Path, PathBuf};

/// A resolved, invocable reference to an external executable.
///
/// Created during availability checking; read-only thereafter.
#[derive(Debug, Clone)]
pub struct ToolHandle {
    /// Logical tool name (e.g., "git")
    pub name: String,
    /// Resolved invocation path (bare name when found on PATH)
    pub path: PathBuf,
    /// Whether a version probe succeeded against this path
    pub version_verified: bool,
}

impl ToolHandle {
    /// Construct a handle for an already-resolved tool without probing.
    ///
    /// Used when the caller owns the resolution (tests, embedding).
    pub fn preresolved(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            version_verified: false,
        }
    }
}

/// Static description of one required external tool.
#[derive(Debug, Clone, Copy)]
pub struct ToolSpec {
    /// Logical name, keys the well-known location tables
    pub name: &'static str,
    /// Invocable program name
    pub program: &'static str,
    /// Arguments for the invocability probe
    pub probe_args: &'static [&'static str],
}

impl ToolSpec {
    /// Version-control tool
    pub const fn git() -> Self {
        Self {
            name: "git",
            program: "git",
            probe_args: &["--version"],
        }
    }

    /// Hosting-service CLI
    pub const fn gh() -> Self {
        Self {
            name: "gh",
            program: "gh",
            probe_args: &["--version"],
        }
    }

    /// Interpreter used to resolve toolkit and package locations
    pub const fn python() -> Self {
        Self {
            name: "python",
            program: if cfg!(windows) { "python" } else { "python3" },
            probe_args: &["--version"],
        }
    }

    /// Artifact build tool
    pub const fn pyinstaller() -> Self {
        Self {
            name: "pyinstaller",
            program: "pyinstaller",
            probe_args: &["--version"],
        }
    }

    /// Installer compiler
    pub const fn iscc() -> Self {
        Self {
            name: "iscc",
            program: "iscc",
            probe_args: &["/?"],
        }
    }

    /// Platform executable file name (with suffix on Windows)
    pub fn executable_name(&self) -> String {
        format!("{}{}", self.program, std::env::consts::EXE_SUFFIX)
    }
}

/// Ensure a tool is invocable, with one bounded self-repair cycle.
///
/// Policy: (a) direct invocation; (b) probe a fixed ordered list of
/// well-known install locations; (c) on a hit, return a handle carrying the
/// absolute path so later invocations bypass PATH entirely; (d) attempt one
/// unattended install via the platform package manager and retry once;
/// (e) fail with [`ToolError::Unavailable`]. Never loops.
pub async fn ensure<R: ToolRunner>(
    runner: &R,
    spec: &ToolSpec,
    cwd: &Path,
) -> Result<ToolHandle, ToolError> {
    // (a) direct invocation, resolved through PATH when possible
    let direct = which::which(spec.program).unwrap_or_else(|_| PathBuf::from(spec.program));
    if let Some(handle) = probe(runner, spec, &direct, cwd).await {
        return Ok(handle);
    }

    // (b) + (c) fixed well-known locations for this platform
    if let Some(handle) = probe_well_known(runner, spec, cwd).await {
        return Ok(handle);
    }

    // (d) one unattended install, then a single retry
    if let Some(command) = locate::install_command(spec.name) {
        log::info!("attempting unattended install of '{}'", spec.name);
        let program = PathBuf::from(&command[0]);
        let args: Vec<&str> = command[1..].iter().map(String::as_str).collect();
        match runner.run(&program, &args, cwd).await {
            Ok(output) if output.success() => {
                if let Some(handle) = probe(runner, spec, Path::new(spec.program), cwd).await {
                    return Ok(handle);
                }
                if let Some(handle) = probe_well_known(runner, spec, cwd).await {
                    return Ok(handle);
                }
                return Err(ToolError::Unavailable {
                    name: spec.name.to_string(),
                    detail: "still not invocable after unattended install".to_string(),
                });
            }
            Ok(output) => {
                return Err(ToolError::Unavailable {
                    name: spec.name.to_string(),
                    detail: format!("unattended install failed: {}", output.diagnostic()),
                });
            }
            Err(error) => {
                return Err(ToolError::Unavailable {
                    name: spec.name.to_string(),
                    detail: format!("package manager not invocable: {error}"),
                });
            }
        }
    }

    Err(ToolError::Unavailable {
        name: spec.name.to_string(),
        detail: "not invocable and no unattended install available on this platform".to_string(),
    })
}

async fn probe<R: ToolRunner>(
    runner: &R,
    spec: &ToolSpec,
    path: &Path,
    cwd: &Path,
) -> Option<ToolHandle> {
    match runner.run(path, spec.probe_args, cwd).await {
        Ok(output) if output.success() => Some(ToolHandle {
            name: spec.name.to_string(),
            path: path.to_path_buf(),
            version_verified: true,
        }),
        _ => None,
    }
}

async fn probe_well_known<R: ToolRunner>(
    runner: &R,
    spec: &ToolSpec,
    cwd: &Path,
) -> Option<ToolHandle> {
    for dir in locate::well_known_dirs(spec.name) {
        let candidate = dir.join(spec.executable_name());
        if candidate.is_file()
            && let Some(handle) = probe(runner, spec, &candidate, cwd).await
        {
            return Some(handle);
        }
    }
    None
}

/// The full set of resolved tools one pipeline run needs.
#[derive(Debug, Clone)]
pub struct Toolchain {
    /// Version-control tool
    pub git: ToolHandle,
    /// Hosting-service CLI
    pub gh: ToolHandle,
    /// Interpreter for descriptor generation
    pub python: ToolHandle,
    /// Artifact build tool
    pub pyinstaller: ToolHandle,
    /// Installer compiler
    pub iscc: ToolHandle,
}

impl Toolchain {
    /// Resolve every required tool, failing on the first that stays
    /// unavailable after its self-repair cycle.
    pub async fn ensure_all<R: ToolRunner>(runner: &R, cwd: &Path) -> Result<Self, ToolError> {
        Ok(Self {
            git: ensure(runner, &ToolSpec::git(), cwd).await?,
            gh: ensure(runner, &ToolSpec::gh(), cwd).await?,
            python: ensure(runner, &ToolSpec::python(), cwd).await?,
            pyinstaller: ensure(runner, &ToolSpec::pyinstaller(), cwd).await?,
            iscc: ensure(runner, &ToolSpec::iscc(), cwd).await?,
        })
    }
}
