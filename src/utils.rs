/*!
 * Utility functions for contextify
 */

use std::env;
use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR, MAIN_SEPARATOR_STR};

/// Lexically clean a path: collapse `.` and duplicate separators, resolve
/// `..` against preceding components. Purely textual, never touches the
/// file system. An empty or fully collapsed relative path becomes `.`.
pub fn clean_path(path: &str) -> String {
    let rooted = path.starts_with(MAIN_SEPARATOR);
    let mut parts: Vec<&str> = Vec::new();

    for component in Path::new(path).components() {
        match component {
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
            Component::ParentDir => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else if !rooted {
                    parts.push("..");
                }
            }
            Component::Normal(name) => parts.push(name.to_str().unwrap_or_default()),
        }
    }

    let body = parts.join(MAIN_SEPARATOR_STR);
    if rooted {
        format!("{}{}", MAIN_SEPARATOR, body)
    } else if body.is_empty() {
        ".".to_string()
    } else {
        body
    }
}

/// If `target` lies inside `dir`, return its path relative to `dir`.
///
/// Used to exclude the tool's own artifacts (output file, config file,
/// executable) from the scan when they live under the scan root.
pub fn path_within(dir: &Path, target: &Path) -> Option<String> {
    let dir = absolutize(dir)?;
    let target = absolutize(target)?;
    let rel = target.strip_prefix(&dir).ok()?;
    if rel.as_os_str().is_empty() {
        return None;
    }
    Some(rel.to_string_lossy().into_owned())
}

fn absolutize(path: &Path) -> Option<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir().ok()?.join(path)
    };
    Some(PathBuf::from(clean_path(&joined.to_string_lossy())))
}

/// Format a human-readable file size
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
