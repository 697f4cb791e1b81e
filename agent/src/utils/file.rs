//! Path helpers for locating the config file

use std::path::PathBuf;

/// Expand a config path to an absolute path.
///
/// `~` and `~/path` resolve against the home directory; relative paths and
/// bare names resolve against the current directory. Absolute paths are
/// returned unchanged.
pub fn expand_path(path: &str) -> PathBuf {
    let path = path.trim();

    let expanded = match path {
        "~" => dirs::home_dir().unwrap_or_else(|| PathBuf::from(path)),
        _ => match (path.strip_prefix("~/"), dirs::home_dir()) {
            (Some(rest), Some(home)) => home.join(rest),
            _ => PathBuf::from(path),
        },
    };

    if expanded.is_absolute() {
        return expanded;
    }
    match std::env::current_dir() {
        Ok(cwd) if path.is_empty() => cwd,
        Ok(cwd) => cwd.join(expanded),
        Err(_) if path.is_empty() => PathBuf::from("."),
        Err(_) => expanded,
    }
}
