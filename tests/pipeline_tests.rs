//! Behavioral tests for the pipeline stages, run against scripted seams.
//!
//! Each test drives a real stage function with a `ScriptedRunner` and
//! asserts on the exact external commands the stage issued, so idempotency
//! and failure behavior are checked without touching git, the hosting
//! service, or the build tools.

mod common;

use common::{ScriptedPrompter, ScriptedRunner};
use std::fs;
use std::path::Path;
use yaktaa_release::build::{self, BuildDescriptor};
use yaktaa_release::cli::OutputManager;
use yaktaa_release::context::{APP_NAME, DEFAULT_BRANCH, EDITOR_NAME};
use yaktaa_release::error::ToolError;
use yaktaa_release::release;
use yaktaa_release::repo::{
    RemoteRef, RepositoryState, ensure_identity, ensure_initialized, ensure_published,
};
use yaktaa_release::tools::{ToolHandle, ToolSpec, Toolchain, ensure};
use yaktaa_release::{Pipeline, PipelineContext};

fn quiet() -> OutputManager {
    OutputManager::new(false, true)
}

fn handle(name: &str) -> ToolHandle {
    ToolHandle::preresolved(name, name)
}

fn toolchain() -> Toolchain {
    Toolchain {
        git: handle("git"),
        gh: handle("gh"),
        python: handle("python3"),
        pyinstaller: handle("pyinstaller"),
        iscc: handle("iscc"),
    }
}

fn context(root: &Path) -> PipelineContext {
    PipelineContext::new(
        root.to_path_buf(),
        None,
        None,
        "yaktaa".to_string(),
        DEFAULT_BRANCH.to_string(),
        semver::Version::new(1, 2, 0),
    )
}

fn remote() -> RemoteRef {
    RemoteRef {
        owner: "alice".to_string(),
        name: "yaktaa".to_string(),
        url: "https://github.com/alice/yaktaa.git".to_string(),
        branch: "main".to_string(),
    }
}

#[tokio::test]
async fn initialized_repository_second_run_makes_no_mutations() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::create_dir(dir.path().join(".git")).expect(".git");
    let runner = ScriptedRunner::new().on("rev-parse", 0, "abc123");

    let state = ensure_initialized(&runner, &handle("git"), dir.path())
        .await
        .expect("idempotent");

    assert_eq!(state, RepositoryState::InitializedWithCommits);
    // The only command issued is the state derivation itself
    assert_eq!(runner.calls().len(), 1);
    assert_eq!(runner.calls_matching("commit"), 0);
}

#[tokio::test]
async fn uninitialized_repository_gets_full_init_sequence() {
    let dir = tempfile::tempdir().expect("tempdir");
    let runner = ScriptedRunner::new();

    ensure_initialized(&runner, &handle("git"), dir.path())
        .await
        .expect("initializes");

    let calls = runner.calls();
    assert_eq!(calls.len(), 4);
    assert_eq!(calls[0], "git init");
    assert!(calls[1].contains("core.autocrlf true"));
    assert!(calls[2].contains("add -A"));
    assert!(calls[3].contains("Initial commit"));
}

#[tokio::test]
async fn partial_init_resets_before_committing() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::create_dir(dir.path().join(".git")).expect(".git");
    let runner = ScriptedRunner::new().on("rev-parse", 1, "");

    ensure_initialized(&runner, &handle("git"), dir.path())
        .await
        .expect("recovers");

    assert_eq!(runner.calls_matching("reset"), 1);
    assert!(!runner.calls().contains(&"git init".to_string()));
    assert_eq!(runner.calls_matching("Initial commit"), 1);
}

#[tokio::test]
async fn stale_origin_is_replaced_not_fatal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = context(dir.path());
    let runner = ScriptedRunner::new()
        .on("auth status", 0, "")
        .on("get-url", 0, "https://github.com/old/elsewhere.git")
        .on("api user", 0, r#"{"login":"alice"}"#)
        .on("repo view", 0, "")
        .on("show-ref", 0, "");

    let published = ensure_published(&runner, &handle("git"), &handle("gh"), &ctx)
        .await
        .expect("publishes");

    assert_eq!(published.slug(), "alice/yaktaa");
    assert_eq!(runner.calls_matching("remote remove origin"), 1);
    assert_eq!(runner.calls_matching("repo create"), 0);
    assert_eq!(runner.calls_matching("push -u origin main"), 1);
}

#[tokio::test]
async fn absent_remote_is_created_private() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = context(dir.path());
    let runner = ScriptedRunner::new()
        .on("auth status", 0, "")
        .on("get-url", 1, "")
        .on("api user", 0, r#"{"login":"alice"}"#)
        .on("repo view", 1, "")
        .on("show-ref", 0, "");

    ensure_published(&runner, &handle("git"), &handle("gh"), &ctx)
        .await
        .expect("publishes");

    assert_eq!(runner.calls_matching("repo create yaktaa --private"), 1);
    assert_eq!(runner.calls_matching("remote remove"), 0);
    assert_eq!(
        runner.calls_matching("remote add origin https://github.com/alice/yaktaa.git"),
        1
    );
}

#[tokio::test]
async fn build_fails_when_editor_artifact_missing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = context(dir.path());
    let app_exe = ctx.app_executable();
    fs::create_dir_all(app_exe.parent().expect("parent")).expect("app tree");
    fs::write(&app_exe, b"exe").expect("app exe");

    let descriptor = BuildDescriptor {
        app_name: APP_NAME.to_string(),
        editor_name: EDITOR_NAME.to_string(),
        app_entry: "main.py".to_string(),
        editor_entry: "yaktaa_world_editor/main.py".to_string(),
        hidden_imports: vec![],
        datas: vec![],
        binaries: vec![],
        icon: None,
    };
    // Build tool exits 0 but produced only one of the two trees
    let runner = ScriptedRunner::new();

    let error = build::build(&runner, &handle("pyinstaller"), &ctx, &descriptor)
        .await
        .unwrap_err();
    assert!(error.to_string().contains("missing"));
    assert!(error.to_string().contains(EDITOR_NAME));
}

#[tokio::test]
async fn empty_remote_gets_description_file_before_release() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = context(dir.path());
    fs::create_dir_all(&ctx.output_dir).expect("output dir");
    fs::write(ctx.output_dir.join("YakTaa-Setup-1.2.0.exe"), b"i").expect("installer");

    let runner = ScriptedRunner::new()
        .on("repo view", 0, "")
        .on("repos/", 1, "")
        .on("release create", 0, "");
    let prompter = ScriptedPrompter::new();

    let record = release::publish(&runner, &toolchain(), &prompter, &ctx, &remote(), &quiet())
        .await
        .expect("publishes");

    assert!(dir.path().join("README.md").is_file());
    assert_eq!(runner.calls_matching("add README.md"), 1);
    assert_eq!(runner.calls_matching("push origin main"), 1);
    assert_eq!(record.tag, "v1.2.0");
}

#[tokio::test]
async fn populated_remote_skips_description_bootstrap() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = context(dir.path());
    fs::create_dir_all(&ctx.output_dir).expect("output dir");
    fs::write(ctx.output_dir.join("YakTaa-Setup-1.2.0.exe"), b"i").expect("installer");

    let runner = ScriptedRunner::new()
        .on("repo view", 0, "")
        .on("repos/", 0, r#"[{"name":"README.md"}]"#)
        .on("release create", 0, "");
    let prompter = ScriptedPrompter::new();

    release::publish(&runner, &toolchain(), &prompter, &ctx, &remote(), &quiet())
        .await
        .expect("publishes");

    assert!(!dir.path().join("README.md").exists());
    assert_eq!(runner.calls_matching("add README.md"), 0);
}

#[tokio::test]
async fn leftover_installer_from_prior_version_is_never_attached() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = context(dir.path());
    fs::create_dir_all(&ctx.output_dir).expect("output dir");

    // A failed earlier run left the previous version's installer behind,
    // older on disk than the current one
    let stale = ctx.output_dir.join("YakTaa-Setup-1.1.0.exe");
    fs::write(&stale, b"old").expect("stale installer");
    let earlier = std::time::SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_000_000);
    fs::File::options()
        .write(true)
        .open(&stale)
        .expect("open")
        .set_modified(earlier)
        .expect("set mtime");
    fs::write(ctx.output_dir.join("YakTaa-Setup-1.2.0.exe"), b"new").expect("installer");

    let runner = ScriptedRunner::new()
        .on("repo view", 0, "")
        .on("repos/", 0, r#"[{"name":"README.md"}]"#)
        .on("release create", 0, "");
    let prompter = ScriptedPrompter::new();

    let record = release::publish(&runner, &toolchain(), &prompter, &ctx, &remote(), &quiet())
        .await
        .expect("publishes");

    assert_eq!(record.tag, "v1.2.0");
    assert!(record.asset.ends_with("YakTaa-Setup-1.2.0.exe"));
    assert_eq!(runner.calls_matching("YakTaa-Setup-1.1.0.exe"), 0);
}

#[tokio::test]
async fn existing_release_tag_fails_without_retry() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = context(dir.path());
    fs::create_dir_all(&ctx.output_dir).expect("output dir");
    fs::write(ctx.output_dir.join("YakTaa-Setup-1.2.0.exe"), b"i").expect("installer");

    let runner = ScriptedRunner::new()
        .on("repo view", 0, "")
        .on("repos/", 0, r#"[{"name":"README.md"}]"#)
        .on_with_stderr("release create", 1, "", "a release with this tag already exists");
    let prompter = ScriptedPrompter::new();

    let error = release::publish(&runner, &toolchain(), &prompter, &ctx, &remote(), &quiet())
        .await
        .unwrap_err();

    assert!(error.to_string().contains("v1.2.0"));
    assert!(error.to_string().contains("already exists"));
    assert_eq!(runner.calls_matching("release create"), 1);
}

#[tokio::test]
async fn missing_installer_with_rebuild_declined_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = context(dir.path());
    fs::create_dir_all(&ctx.output_dir).expect("output dir");

    let runner = ScriptedRunner::new();
    let prompter = ScriptedPrompter::new().with_confirm(false);

    let error = release::publish(&runner, &toolchain(), &prompter, &ctx, &remote(), &quiet())
        .await
        .unwrap_err();

    assert!(error.to_string().contains("No installer artifact"));
    // Declined rebuild means no tool was ever invoked
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn unattended_install_attempted_at_most_once() {
    let dir = tempfile::tempdir().expect("tempdir");
    // The pip rule must come first: the install command line also names the tool
    let runner = ScriptedRunner::new()
        .on("pip install", 0, "")
        .on("pyinstaller", 1, "");

    let error = ensure(&runner, &ToolSpec::pyinstaller(), dir.path())
        .await
        .unwrap_err();

    assert!(matches!(error, ToolError::Unavailable { .. }));
    assert_eq!(runner.calls_matching("pip install"), 1);
}

#[tokio::test]
async fn configured_identity_asks_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let runner = ScriptedRunner::new()
        .on("user.name", 0, "Alice\n")
        .on("user.email", 0, "alice@example.com\n");
    let prompter = ScriptedPrompter::new();

    let identity = ensure_identity(&runner, &handle("git"), &prompter, dir.path())
        .await
        .expect("resolves");

    assert_eq!(identity.name, "Alice");
    assert_eq!(identity.email, "alice@example.com");
    assert_eq!(runner.calls().len(), 2);
}

#[tokio::test]
async fn missing_identity_field_prompted_once_and_persisted() {
    let dir = tempfile::tempdir().expect("tempdir");
    let runner = ScriptedRunner::new()
        .on("user.name", 1, "")
        .on("user.name", 0, "")
        .on("user.email", 0, "bob@example.com\n");
    let prompter = ScriptedPrompter::new().with_input("Bob");

    let identity = ensure_identity(&runner, &handle("git"), &prompter, dir.path())
        .await
        .expect("resolves");

    assert_eq!(identity.name, "Bob");
    assert_eq!(runner.calls_matching("user.name Bob"), 1);
    assert_eq!(prompter.unconsumed_inputs(), 0);
}

#[tokio::test]
async fn full_pipeline_run_publishes_release() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    let ctx = context(root);

    fs::create_dir(root.join(".git")).expect(".git");
    for exe in [ctx.app_executable(), ctx.editor_executable()] {
        fs::create_dir_all(exe.parent().expect("parent")).expect("tree");
        fs::write(&exe, b"exe").expect("exe");
    }
    fs::create_dir_all(&ctx.output_dir).expect("output dir");
    fs::write(ctx.output_dir.join("YakTaa-Setup-1.2.0.exe"), b"i").expect("installer");

    let runner = ScriptedRunner::new()
        .on("-c ", 1, "") // package location queries: nothing resolvable
        .on("user.name", 0, "Alice\n")
        .on("user.email", 0, "alice@example.com\n")
        .on("rev-parse", 0, "abc123")
        .on("auth status", 0, "")
        .on("get-url", 1, "")
        .on("api user", 0, r#"{"login":"alice"}"#)
        .on("repo view", 0, "")
        .on("repos/", 0, r#"[{"name":"README.md"}]"#)
        .on("show-ref", 0, "")
        .on("release create", 0, "");
    let prompter = ScriptedPrompter::new();

    let pipeline = Pipeline::new(runner, prompter, quiet());
    let record = pipeline.run(&ctx).await.expect("full run");

    assert_eq!(record.tag, "v1.2.0");
    assert!(record.asset.ends_with("YakTaa-Setup-1.2.0.exe"));
    // Remote already has content, so no description bootstrap
    assert!(!root.join("README.md").exists());
}
