//! Preset lookup: files, the user presets directory, and factory presets.
//!
//! # Directory Structure
//!
//! - **User presets**: `~/.config/osc3x/presets/` (Linux), `~/Library/Application Support/osc3x/presets/` (macOS), `%APPDATA%\osc3x\presets\` (Windows)
//!
//! # Example
//!
//! ```rust,no_run
//! use osc3x_config::resolve_preset;
//!
//! // A path, a user preset name, or a factory preset name.
//! let preset = resolve_preset("detuned_saw").unwrap();
//! let custom = resolve_preset("./presets/03.toml").unwrap();
//! ```

use std::path::{Path, PathBuf};

use osc3x_synth::Preset;

use crate::error::ConfigError;
use crate::factory_presets::get_factory_preset;
use crate::loader::load_preset_file;

/// Application name used for directory paths.
const APP_NAME: &str = "osc3x";

/// Subdirectory name for presets.
const PRESETS_SUBDIR: &str = "presets";

/// Returns the user-specific presets directory.
///
/// Returns a fallback path if the config directory cannot be determined.
pub fn user_presets_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
        .join(PRESETS_SUBDIR)
}

/// Find a preset file by path or by name in the user presets directory.
///
/// `.toml` is appended to bare names.
pub fn find_preset(name: &str) -> Option<PathBuf> {
    let path = PathBuf::from(name);
    if path.is_file() {
        return Some(path);
    }

    let filename = if name.ends_with(".toml") {
        name.to_string()
    } else {
        format!("{name}.toml")
    };
    let user_path = user_presets_dir().join(filename);
    user_path.is_file().then_some(user_path)
}

/// Resolve a preset argument: an existing file, then a user preset, then a
/// factory preset of that name.
pub fn resolve_preset(name_or_path: &str) -> Result<Preset, ConfigError> {
    if let Some(path) = find_preset(name_or_path) {
        return load_preset_file(path);
    }
    get_factory_preset(name_or_path)
        .ok_or_else(|| ConfigError::PresetNotFound(name_or_path.to_string()))
}

/// `*.toml` files directly inside `dir`, sorted by file name.
pub fn list_presets_in_dir(dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let entries = std::fs::read_dir(dir).map_err(|e| ConfigError::read_file(dir, e))?;

    let mut presets: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
        })
        .collect();
    presets.sort();
    Ok(presets)
}

/// Get the preset name from a file path (the file stem).
///
/// # Example
///
/// ```rust
/// use osc3x_config::preset_name_from_path;
/// use std::path::Path;
///
/// let name = preset_name_from_path(Path::new("/path/to/07.toml"));
/// assert_eq!(name, Some("07".to_string()));
/// ```
pub fn preset_name_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
}
