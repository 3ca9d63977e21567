//! Well-known install locations and unattended install commands.
//!
//! Used by the availability checker's bounded self-repair: when a tool is
//! not directly invocable, a fixed ordered list of install locations for the
//! current platform is probed before attempting an unattended install via
//! the platform package manager.

use std::path::PathBuf;

/// Fixed, ordered list of well-known install locations for a tool.
///
/// Only directories are returned; the caller joins the executable name and
/// checks for existence. The list is intentionally small and platform-scoped.
pub fn well_known_dirs(tool: &str) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if cfg!(windows) {
        let program_files = [
            PathBuf::from("C:\\Program Files"),
            PathBuf::from("C:\\Program Files (x86)"),
        ];
        match tool {
            "git" => {
                for base in &program_files {
                    candidates.push(base.join("Git").join("cmd"));
                }
            }
            "gh" => {
                for base in &program_files {
                    candidates.push(base.join("GitHub CLI"));
                }
            }
            "iscc" => {
                for base in &program_files {
                    candidates.push(base.join("Inno Setup 6"));
                }
            }
            "python" | "pyinstaller" => {
                if let Some(home) = dirs::home_dir() {
                    let programs = home.join("AppData").join("Local").join("Programs");
                    for version in ["Python313", "Python312", "Python311"] {
                        let root = programs.join("Python").join(version);
                        if tool == "python" {
                            candidates.push(root.clone());
                        } else {
                            candidates.push(root.join("Scripts"));
                        }
                    }
                }
            }
            _ => {}
        }
    } else {
        candidates.push(PathBuf::from("/usr/local/bin"));
        candidates.push(PathBuf::from("/opt/homebrew/bin"));
        if let Some(home) = dirs::home_dir() {
            candidates.push(home.join(".local").join("bin"));
        }
    }

    candidates
}

/// Unattended install command for a tool via the platform package manager.
///
/// Returns the full command line (program first), or `None` when no
/// unattended install path exists for this tool on this platform.
pub fn install_command(tool: &str) -> Option<Vec<String>> {
    let parts: Vec<&str> = if cfg!(windows) {
        let winget_id = match tool {
            "git" => "Git.Git",
            "gh" => "GitHub.cli",
            "iscc" => "JRSoftware.InnoSetup",
            "python" => "Python.Python.3.12",
            // PyInstaller ships through pip, not winget
            "pyinstaller" => {
                return Some(
                    ["python", "-m", "pip", "install", "--user", "pyinstaller"]
                        .iter()
                        .map(|s| s.to_string())
                        .collect(),
                );
            }
            _ => return None,
        };
        return Some(
            vec![
                "winget",
                "install",
                "--id",
                winget_id,
                "-e",
                "--silent",
                "--accept-package-agreements",
                "--accept-source-agreements",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        );
    } else if cfg!(target_os = "macos") {
        match tool {
            "git" => vec!["brew", "install", "git"],
            "gh" => vec!["brew", "install", "gh"],
            "pyinstaller" => vec!["python3", "-m", "pip", "install", "--user", "pyinstaller"],
            // Inno Setup has no macOS package; manual remediation required
            _ => return None,
        }
    } else {
        match tool {
            "pyinstaller" => vec!["python3", "-m", "pip", "install", "--user", "pyinstaller"],
            _ => return None,
        }
    };

    Some(parts.iter().map(|s| s.to_string()).collect())
}
