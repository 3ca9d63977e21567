//! YakTaa Release - idempotent build-and-release pipeline for the YakTaa
//! desktop application.
//!
//! This binary runs the full pipeline: tool verification, identity
//! resolution, repository initialization and publication, artifact building,
//! installer composition, and release publication.

use std::process;
use yaktaa_release::cli;
use yaktaa_release::cli::OutputManager;

#[tokio::main]
async fn main() {
    env_logger::init();

    match cli::run().await {
        Ok(exit_code) => {
            process::exit(exit_code);
        }
        Err(e) => {
            // Never quiet for fatal errors
            let output = OutputManager::new(false, false);
            output.error(&format!("Fatal error: {e}"));

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() {
                output.println("\n💡 Recovery suggestions:");
                for suggestion in suggestions {
                    output.indent(&suggestion);
                }
            }

            process::exit(1);
        }
    }
}
