/*!
 * ASCII directory tree rendering
 */

use std::fs;
use std::path::Path;

use crate::diagnostics::DiagnosticSink;
use crate::filter::matches_ignore_pattern;

/// Recursively build the lines of an ASCII directory tree.
///
/// Pure function of its inputs: `dir` is the directory to render, `prefix`
/// the indentation accumulated so far (empty at the root, which also emits
/// the directory's base name), and `root` the scan root that relative
/// paths are filtered against. `.git` directories are excluded outright,
/// independent of the ignore patterns. Subdirectories are listed before
/// files at each level, each group sorted lexicographically.
///
/// A directory whose children cannot be listed is reported to the
/// diagnostic sink and contributes whatever lines were already built.
pub fn build_tree(
    dir: &Path,
    patterns: &[String],
    prefix: &str,
    root: &Path,
    diag: &dyn DiagnosticSink,
) -> Vec<String> {
    if dir.file_name().is_some_and(|name| name == ".git") {
        return Vec::new();
    }

    let mut lines = Vec::new();
    if prefix.is_empty() {
        let name = dir.file_name().unwrap_or(dir.as_os_str());
        lines.push(name.to_string_lossy().into_owned());
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            diag.report(&format!("Error reading directory {}: {}", dir.display(), e));
            return lines;
        }
    };

    let mut dirs = Vec::new();
    let mut files = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                diag.report(&format!("Error reading directory {}: {}", dir.display(), e));
                continue;
            }
        };
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if is_dir && name == ".git" {
            continue;
        }
        let full = entry.path();
        let rel = full.strip_prefix(root).unwrap_or(&full);
        if matches_ignore_pattern(&rel.to_string_lossy(), is_dir, patterns) {
            continue;
        }
        if is_dir {
            dirs.push(name);
        } else {
            files.push(name);
        }
    }

    dirs.sort();
    files.sort();

    for (i, name) in dirs.iter().enumerate() {
        // The last subdirectory is only "last" when no files follow it.
        let is_last = i == dirs.len() - 1 && files.is_empty();
        let (pointer, extension) = if is_last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };
        lines.push(format!("{}{}{}", prefix, pointer, name));
        let sub_prefix = format!("{}{}", prefix, extension);
        lines.extend(build_tree(&dir.join(name), patterns, &sub_prefix, root, diag));
    }

    for (i, name) in files.iter().enumerate() {
        let pointer = if i == files.len() - 1 {
            "└── "
        } else {
            "├── "
        };
        lines.push(format!("{}{}{}", prefix, pointer, name));
    }

    lines
}
