/*!
 * Ignore-pattern loading and matching
 */

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, MAIN_SEPARATOR, MAIN_SEPARATOR_STR};

use glob_match::glob_match;

use crate::error::{ContextifyError, Result};
use crate::utils::clean_path;

/// Load glob patterns from a newline-delimited filter file.
///
/// Blank lines and `#` comments are skipped; remaining lines keep their
/// original order. A missing file is not a failure and yields an empty
/// list. Any other read problem is fatal for the run.
pub fn load_ignore_list(path: &Path) -> Result<Vec<String>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(ContextifyError::IgnoreFile(e)),
    };

    let mut patterns = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(ContextifyError::IgnoreFile)?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        patterns.push(line.to_string());
    }
    Ok(patterns)
}

/// Check whether a root-relative path matches any ignore pattern.
///
/// The path is lexically cleaned first; directories get a trailing
/// separator so patterns like `build/` match only directories. Each
/// pattern is tried verbatim and again with a `*` suffix, which lets a
/// bare prefix pattern catch same-segment variants. `*` never crosses a
/// path separator; there is no negation and no `**`. This is a simple
/// prefix glob matcher, not a gitignore implementation.
pub fn matches_ignore_pattern(path: &str, is_dir: bool, patterns: &[String]) -> bool {
    let mut normalized = clean_path(path);
    if is_dir {
        normalized.push(MAIN_SEPARATOR);
    }

    for pattern in patterns {
        let pattern = pattern.replace('/', MAIN_SEPARATOR_STR);
        if glob_match(&pattern, &normalized) {
            return true;
        }
        if glob_match(&format!("{}*", pattern), &normalized) {
            return true;
        }
    }
    false
}
