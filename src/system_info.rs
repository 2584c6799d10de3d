//! Host operating system description used in the generator instructions.

use std::collections::HashMap;
use std::fs;
use std::process::Command;
use tracing::debug;

/// Human-readable name and version of the host OS, e.g. `Linux Ubuntu 24.04`.
pub fn os_description() -> String {
    let description = match std::env::consts::OS {
        "linux" => linux_description(),
        "macos" => macos_description(),
        "windows" => windows_description(),
        other => format!("Unknown platform: {}", other),
    };
    debug!("Detected operating system: {}", description);
    description
}

fn linux_description() -> String {
    match fs::read_to_string("/etc/os-release") {
        Ok(content) => {
            let fields = parse_os_release(&content);
            format!(
                "Linux {} {}",
                fields.get("NAME").map(String::as_str).unwrap_or("unknown"),
                fields.get("VERSION_ID").map(String::as_str).unwrap_or("unknown"),
            )
        }
        Err(_) => "Linux (unknown distro)".to_string(),
    }
}

fn macos_description() -> String {
    command_stdout("sw_vers", &["-productVersion"])
        .map(|version| format!("macOS {}", version.trim()))
        .unwrap_or_else(|| "macOS (unknown version)".to_string())
}

fn windows_description() -> String {
    command_stdout("wmic", &["os", "get", "Caption"])
        .and_then(|out| parse_wmic_caption(&out))
        .unwrap_or_else(|| "Windows (unknown version)".to_string())
}

fn command_stdout(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Parses `KEY=value` lines from an os-release file, stripping quotes.
pub fn parse_os_release(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }
            let (key, value) = line.split_once('=')?;
            Some((key.to_string(), value.trim_matches('"').trim_matches('\'').to_string()))
        })
        .collect()
}

/// Second line of `wmic os get Caption` output, trimmed.
fn parse_wmic_caption(output: &str) -> Option<String> {
    output
        .trim()
        .lines()
        .nth(1)
        .map(str::trim)
        .filter(|caption| !caption.is_empty())
        .map(str::to_string)
}
