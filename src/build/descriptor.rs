//! Build descriptor generation and rendering.
//!
//! The descriptor is a typed, ephemeral specification regenerated fresh on
//! every run, because upstream dependency locations (the UI toolkit's
//! installed binaries in particular) may have changed between runs. It is
//! rendered through a Handlebars template and consumed exactly once by the
//! build tool.

use crate::cli::OutputManager;
use crate::context::{APP_NAME, EDITOR_NAME, PipelineContext};
use crate::error::Result;
use crate::tools::{ToolHandle, ToolRunner};
use handlebars::Handlebars;
use serde::Serialize;
use std::path::Path;

/// Fixed list of modules the build tool cannot discover by static analysis.
const HIDDEN_IMPORTS: &[&str] = &[
    "PyQt6.QtSvg",
    "PyQt6.QtMultimedia",
    "PyQt6.sip",
    "sqlite3",
];

/// Auxiliary packages whose data directories are bundled when present.
/// Each is attempted independently; a missing package is skipped, not fatal.
const AUX_PACKAGES: &[&str] = &["certifi", "pygments"];

/// Qt runtime libraries copied alongside the executable.
const QT_RUNTIME_LIBS: &[&str] = &["Qt6Core", "Qt6Gui", "Qt6Widgets", "Qt6Svg", "Qt6Multimedia"];

/// Qt plugin categories copied alongside the executable.
const QT_PLUGIN_CATEGORIES: &[&str] = &["platforms", "styles", "imageformats", "multimedia"];

/// A source path collected into a target directory inside the bundle.
#[derive(Debug, Clone, Serialize)]
pub struct PathMapping {
    /// Absolute source path on the build machine
    pub source: String,
    /// Directory inside the bundle
    pub target: String,
}

/// Generated, ephemeral build specification.
#[derive(Debug, Clone, Serialize)]
pub struct BuildDescriptor {
    /// Main application executable base name
    pub app_name: String,
    /// Companion editor executable base name
    pub editor_name: String,
    /// Main application entry script, relative to the project root
    pub app_entry: String,
    /// Companion editor entry script, relative to the project root
    pub editor_entry: String,
    /// Modules forced into the bundle
    pub hidden_imports: Vec<String>,
    /// Data directories to collect
    pub datas: Vec<PathMapping>,
    /// Dynamic libraries and plugins to copy alongside the executable
    pub binaries: Vec<PathMapping>,
    /// Application icon, omitted gracefully when absent
    pub icon: Option<String>,
}

/// Generate the descriptor by inspecting the build machine.
pub async fn generate<R: ToolRunner>(
    runner: &R,
    python: &ToolHandle,
    ctx: &PipelineContext,
    output: &OutputManager,
) -> Result<BuildDescriptor> {
    let root = &ctx.project_root;

    let toolkit = resolve_package_dir(runner, python, root, "PyQt6").await;
    if toolkit.is_none() {
        output.warn("UI toolkit installation path not resolvable; runtime libraries will not be copied explicitly");
    }

    let mut datas = Vec::new();
    for package in AUX_PACKAGES {
        match resolve_package_dir(runner, python, root, package).await {
            Some(dir) => datas.push(PathMapping {
                source: dir,
                target: (*package).to_string(),
            }),
            None => output.warn(&format!("optional package '{package}' not found; skipped")),
        }
    }

    let mut binaries = Vec::new();
    if let Some(toolkit_dir) = &toolkit {
        let toolkit_path = Path::new(toolkit_dir);
        for lib in QT_RUNTIME_LIBS {
            binaries.push(PathMapping {
                source: toolkit_path
                    .join("Qt6")
                    .join("bin")
                    .join(format!("{lib}.dll"))
                    .display()
                    .to_string(),
                target: ".".to_string(),
            });
        }
        for category in QT_PLUGIN_CATEGORIES {
            binaries.push(PathMapping {
                source: toolkit_path
                    .join("Qt6")
                    .join("plugins")
                    .join(category)
                    .display()
                    .to_string(),
                target: format!("PyQt6/Qt6/plugins/{category}"),
            });
        }
    }

    let icon_path = root.join("resources").join("icons").join("yaktaa.ico");
    let icon = if icon_path.is_file() {
        Some(icon_path.display().to_string())
    } else {
        output.warn("application icon not found; building without one");
        None
    };

    Ok(BuildDescriptor {
        app_name: APP_NAME.to_string(),
        editor_name: EDITOR_NAME.to_string(),
        app_entry: "main.py".to_string(),
        editor_entry: "yaktaa_world_editor/main.py".to_string(),
        hidden_imports: HIDDEN_IMPORTS.iter().map(|s| s.to_string()).collect(),
        datas,
        binaries,
        icon,
    })
}

/// Resolve an installed package's directory via the interpreter.
/// Returns `None` when the package is not importable.
async fn resolve_package_dir<R: ToolRunner>(
    runner: &R,
    python: &ToolHandle,
    cwd: &Path,
    package: &str,
) -> Option<String> {
    let script = format!("import os, {package}; print(os.path.dirname({package}.__file__))");
    match runner.run(&python.path, &["-c", &script], cwd).await {
        Ok(output) if output.success() && !output.stdout_trimmed().is_empty() => {
            Some(output.stdout_trimmed().to_string())
        }
        _ => None,
    }
}

/// Render the descriptor and write it to the given path.
pub async fn write_spec(descriptor: &BuildDescriptor, path: &Path) -> Result<()> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars.register_template_string("build.spec", SPEC_TEMPLATE)?;

    let rendered = handlebars.render("build.spec", descriptor)?;
    tokio::fs::write(path, rendered).await?;
    Ok(())
}

/// Build-tool specification template (PyInstaller spec file).
const SPEC_TEMPLATE: &str = r#"# -*- mode: python ; coding: utf-8 -*-
# Generated build descriptor. Regenerated on every run; do not edit.

block_cipher = None

datas = [
{{#each datas}}    (r'{{source}}', r'{{target}}'),
{{/each}}]

binaries = [
{{#each binaries}}    (r'{{source}}', r'{{target}}'),
{{/each}}]

hiddenimports = [
{{#each hidden_imports}}    '{{this}}',
{{/each}}]

app_a = Analysis(
    [r'{{app_entry}}'],
    pathex=[],
    binaries=binaries,
    datas=datas,
    hiddenimports=hiddenimports,
    noarchive=False,
)
app_pyz = PYZ(app_a.pure, app_a.zipped_data, cipher=block_cipher)
app_exe = EXE(
    app_pyz,
    app_a.scripts,
    [],
    exclude_binaries=True,
    name='{{app_name}}',
    console=False,
{{#if icon}}    icon=r'{{icon}}',
{{/if}})
app_coll = COLLECT(
    app_exe,
    app_a.binaries,
    app_a.zipfiles,
    app_a.datas,
    name='{{app_name}}',
)

editor_a = Analysis(
    [r'{{editor_entry}}'],
    pathex=[],
    binaries=binaries,
    datas=datas,
    hiddenimports=hiddenimports,
    noarchive=False,
)
editor_pyz = PYZ(editor_a.pure, editor_a.zipped_data, cipher=block_cipher)
editor_exe = EXE(
    editor_pyz,
    editor_a.scripts,
    [],
    exclude_binaries=True,
    name='{{editor_name}}',
    console=False,
{{#if icon}}    icon=r'{{icon}}',
{{/if}})
editor_coll = COLLECT(
    editor_exe,
    editor_a.binaries,
    editor_a.zipfiles,
    editor_a.datas,
    name='{{editor_name}}',
)
"#;
