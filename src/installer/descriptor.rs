//! Installer descriptor generation and rendering.
//!
//! The descriptor is a typed, ephemeral specification consumed exactly once
//! by the installer compiler. It carries a stable application identifier,
//! per-artifact file-inclusion globs, optional icon references, file
//! association rules, and a registry-guarded pre-install step for the
//! platform runtime redistributable.

use crate::cli::OutputManager;
use crate::context::{APP_NAME, EDITOR_DISPLAY_NAME, EDITOR_NAME, PipelineContext};
use crate::error::Result;
use crate::prompt::Prompter;
use handlebars::Handlebars;
use serde::Serialize;
use std::path::Path;
use uuid::Uuid;

/// Publisher recorded in installer metadata.
const PUBLISHER: &str = "YakTaa Project";

/// Registry key probed to decide whether the redistributable install runs.
const VC_REDIST_KEY: &str = "SOFTWARE\\Microsoft\\VisualStudio\\14.0\\VC\\Runtimes\\x64";

/// Registry value name under [`VC_REDIST_KEY`].
const VC_REDIST_VALUE: &str = "Installed";

/// One file-inclusion rule: a source glob collected into a destination.
#[derive(Debug, Clone, Serialize)]
pub struct InstallEntry {
    /// Source glob on the build machine
    pub source_glob: String,
    /// Destination directory expression in the installer's syntax
    pub dest_dir: String,
}

/// One file-association registration rule.
#[derive(Debug, Clone, Serialize)]
pub struct FileAssociation {
    /// File extension including the leading dot
    pub extension: String,
    /// Programmatic identifier registered for the extension
    pub prog_id: String,
    /// Human-readable description
    pub description: String,
}

/// Bundled platform runtime redistributable with its presence guard.
#[derive(Debug, Clone, Serialize)]
pub struct Redistributable {
    /// Path to the bundled redistributable installer
    pub path: String,
    /// Redistributable file name (used in the generated script)
    pub file_name: String,
    /// Registry key probed before installing
    pub registry_key: String,
    /// Registry value name probed before installing
    pub registry_value: String,
}

/// Generated, ephemeral installer specification.
#[derive(Debug, Clone, Serialize)]
pub struct InstallerDescriptor {
    /// Stable application identifier (deterministic GUID)
    pub app_id: String,
    /// Application display name
    pub app_name: String,
    /// Companion editor executable base name
    pub editor_name: String,
    /// Companion editor display name
    pub editor_display_name: String,
    /// Version being packaged
    pub version: String,
    /// Publisher metadata
    pub publisher: String,
    /// Installer output directory
    pub output_dir: String,
    /// Installer base file name (without extension)
    pub output_base_name: String,
    /// Per-artifact file-inclusion rules
    pub entries: Vec<InstallEntry>,
    /// Setup icon, omitted gracefully when absent
    pub icon: Option<String>,
    /// File-association registration rules
    pub associations: Vec<FileAssociation>,
    /// Bundled redistributable, or `None` when users download it manually
    pub redistributable: Option<Redistributable>,
}

/// Stable application identifier: a name-derived GUID, identical across
/// runs so upgrades replace rather than duplicate the installation.
pub fn stable_app_id() -> String {
    let id = Uuid::new_v5(&Uuid::NAMESPACE_DNS, b"yaktaa.app");
    format!("{}{}{}", "{{", id.to_string().to_uppercase(), "}")
}

/// Generate the descriptor from the run context.
///
/// The icon is omitted with a warning when absent. When the bundled
/// redistributable is missing, the manual-download fallback is confirmed
/// interactively; declining aborts the stage.
pub fn generate<P: Prompter>(
    ctx: &PipelineContext,
    prompter: &P,
    output: &OutputManager,
) -> Result<InstallerDescriptor> {
    let entries = vec![
        InstallEntry {
            source_glob: ctx.dist_dir.join(APP_NAME).join("*").display().to_string(),
            dest_dir: "{app}".to_string(),
        },
        InstallEntry {
            source_glob: ctx
                .dist_dir
                .join(EDITOR_NAME)
                .join("*")
                .display()
                .to_string(),
            dest_dir: "{app}\\WorldEditor".to_string(),
        },
    ];

    let icon_path = ctx
        .project_root
        .join("resources")
        .join("icons")
        .join("yaktaa.ico");
    let icon = if icon_path.is_file() {
        Some(icon_path.display().to_string())
    } else {
        output.warn("setup icon not found; composing installer without one");
        None
    };

    let redist_path = ctx
        .project_root
        .join("redist")
        .join("VC_redist.x64.exe");
    let redistributable = if redist_path.is_file() {
        Some(Redistributable {
            path: redist_path.display().to_string(),
            file_name: "VC_redist.x64.exe".to_string(),
            registry_key: VC_REDIST_KEY.to_string(),
            registry_value: VC_REDIST_VALUE.to_string(),
        })
    } else {
        let proceed = prompter.confirm(
            "Bundled VC++ redistributable not found. Continue and let users download it manually?",
            true,
        )?;
        if !proceed {
            return Err(anyhow::anyhow!(
                "redistributable not bundled and manual download declined; place VC_redist.x64.exe under redist/ and re-run"
            )
            .into());
        }
        output.warn("redistributable not bundled; skipped");
        None
    };

    let associations = vec![
        FileAssociation {
            extension: ".ykt".to_string(),
            prog_id: "YakTaa.Save".to_string(),
            description: "YakTaa Saved Game".to_string(),
        },
        FileAssociation {
            extension: ".ywd".to_string(),
            prog_id: "YakTaa.World".to_string(),
            description: "YakTaa World Data".to_string(),
        },
    ];

    Ok(InstallerDescriptor {
        app_id: stable_app_id(),
        app_name: APP_NAME.to_string(),
        editor_name: EDITOR_NAME.to_string(),
        editor_display_name: EDITOR_DISPLAY_NAME.to_string(),
        version: ctx.version.to_string(),
        publisher: PUBLISHER.to_string(),
        output_dir: ctx.output_dir.display().to_string(),
        output_base_name: ctx.installer_base_name(),
        entries,
        icon,
        associations,
        redistributable,
    })
}

/// Render the descriptor and write it to the given path.
pub async fn write_script(descriptor: &InstallerDescriptor, path: &Path) -> Result<()> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars.register_template_string("installer.iss", ISS_TEMPLATE)?;

    let rendered = handlebars.render("installer.iss", descriptor)?;
    tokio::fs::write(path, rendered).await?;
    Ok(())
}

/// Installer compiler script template (Inno Setup).
const ISS_TEMPLATE: &str = r#"; Generated installer descriptor. Regenerated on every run; do not edit.

[Setup]
AppId={{app_id}}
AppName={{app_name}}
AppVersion={{version}}
AppPublisher={{publisher}}
DefaultDirName={autopf}\\{{app_name}}
DefaultGroupName={{app_name}}
OutputDir={{output_dir}}
OutputBaseFilename={{output_base_name}}
Compression=lzma2
SolidCompression=yes
ChangesAssociations=yes
{{#if icon}}SetupIconFile={{icon}}
{{/if}}
[Files]
{{#each entries}}Source: "{{source_glob}}"; DestDir: "{{dest_dir}}"; Flags: ignoreversion recursesubdirs createallsubdirs
{{/each}}{{#if redistributable}}Source: "{{redistributable.path}}"; DestDir: "{tmp}"; Flags: deleteafterinstall; Check: VCRedistNeeded
{{/if}}
[Icons]
Name: "{group}\\{{app_name}}"; Filename: "{app}\\{{app_name}}.exe"
Name: "{group}\\{{editor_display_name}}"; Filename: "{app}\WorldEditor\\{{editor_name}}.exe"

[Registry]
{{#each associations}}Root: HKA; Subkey: "Software\Classes\\{{extension}}"; ValueType: string; ValueData: "{{prog_id}}"; Flags: uninsdeletevalue
Root: HKA; Subkey: "Software\Classes\\{{prog_id}}"; ValueType: string; ValueData: "{{description}}"; Flags: uninsdeletekey
Root: HKA; Subkey: "Software\Classes\\{{prog_id}}\shell\open\command"; ValueType: string; ValueData: """{app}\\{{../app_name}}.exe"" ""%1"""
{{/each}}
{{#if redistributable}}[Run]
Filename: "{tmp}\\{{redistributable.file_name}}"; Parameters: "/install /quiet /norestart"; StatusMsg: "Installing Visual C++ runtime..."; Check: VCRedistNeeded

[Code]
function VCRedistNeeded(): Boolean;
var
  Installed: Cardinal;
begin
  if RegQueryDWordValue(HKLM64, '{{redistributable.registry_key}}', '{{redistributable.registry_value}}', Installed) then
    Result := Installed <> 1
  else
    Result := True;
end;
{{/if}}"#;
