//! Config file location.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

/// Application directory name under the config base.
const APP_DIR: &str = "timetable";

/// Config file name.
const CONFIG_FILE: &str = "config.toml";

/// Resolves the config file path.
///
/// Lookup order:
/// 1. `{dir}/config.toml` when `--dir` is given.
/// 2. `$XDG_CONFIG_HOME/timetable/config.toml` when set to an absolute path.
/// 3. `$HOME/.config/timetable/config.toml`.
///
/// # Errors
///
/// Returns an error if neither `XDG_CONFIG_HOME` nor `HOME` is usable
/// (when `dir` is `None`).
pub fn resolve_config_path(dir: Option<&PathBuf>) -> Result<PathBuf> {
    if let Some(d) = dir {
        return Ok(d.join(CONFIG_FILE));
    }
    config_path_from(
        std::env::var_os("XDG_CONFIG_HOME"),
        std::env::var_os("HOME"),
    )
}

/// Picks the config base from the XDG and home values.
fn config_path_from(xdg_config_home: Option<OsString>, home: Option<OsString>) -> Result<PathBuf> {
    // Relative XDG values are invalid and ignored.
    let base = match xdg_config_home.map(PathBuf::from) {
        Some(xdg) if xdg.is_absolute() => xdg,
        _ => match home {
            Some(home) if !home.is_empty() => Path::new(&home).join(".config"),
            _ => bail!("neither XDG_CONFIG_HOME nor HOME is set"),
        },
    };
    Ok(base.join(APP_DIR).join(CONFIG_FILE))
}
