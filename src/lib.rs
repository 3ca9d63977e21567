//! # YakTaa Release
//!
//! Idempotent build-and-release pipeline for the YakTaa desktop application.
//!
//! Transforms an application source tree into a published, versioned,
//! installable release through a fixed stage sequence. Every stage derives
//! its "already done" predicate from external observable state, so the
//! pipeline can be re-run safely after a failure at any point.
//!
//! ## Stages
//!
//! - **Tooling**: verify every required external tool is invocable, with one
//!   bounded self-repair cycle per tool
//! - **Identity**: ensure version-control authorship identity is configured
//! - **Local repository**: initialize history and create the first commit
//! - **Remote repository**: create the hosted repository and push
//! - **Build**: generate a build descriptor and produce both executable trees
//! - **Installer**: compose a single distributable installer
//! - **Release**: publish a tagged release with the installer attached
//!
//! ## Usage
//!
//! ```bash
//! yaktaa_release /path/to/yaktaa --version 1.2.0
//! yaktaa_release . --repo yaktaa --version 1.2.0 --yes
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Core modules
pub mod build;
pub mod cli;
pub mod context;
pub mod error;
pub mod installer;
pub mod pipeline;
pub mod prompt;
pub mod release;
pub mod repo;
pub mod tools;

// Re-export main types for public API
pub use cli::{Args, OutputManager};
pub use context::PipelineContext;
pub use error::{PipelineError, Result};
pub use pipeline::Pipeline;
pub use prompt::{Prompter, TerminalPrompter};
pub use release::ReleaseRecord;
pub use tools::{ProcessRunner, ToolHandle, ToolRunner, Toolchain};
