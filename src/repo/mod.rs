//! Local and remote repository stages.
//!
//! Each stage derives its "already done" predicate from observable state
//! (the history-metadata directory, tool queries, hosting-service responses)
//! on every invocation, so a run interrupted at any point can be safely
//! re-invoked.

mod identity;
mod local;
mod remote;

pub use identity::{Identity, ensure_identity};
pub use local::{RepositoryState, ensure_initialized, repository_state};
pub use remote::{
    RemoteRef, RemoteState, authenticated_login, ensure_authenticated, ensure_published,
    remote_state,
};
