/*!
 * File collection and binary detection
 */

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::diagnostics::DiagnosticSink;
use crate::error::Result;
use crate::filter::matches_ignore_pattern;

/// Bytes sampled from the start of a file for binary detection
const SAMPLE_LEN: usize = 1024;

/// Control codes that still count as text
const TEXT_CONTROL: [u8; 7] = [0x07, 0x08, 0x09, 0x0A, 0x0C, 0x0D, 0x1B];

/// Heuristically classify a file as binary.
///
/// Never fails: a file that cannot be opened or read is reported to the
/// diagnostic sink and treated as non-binary so the run continues. A file
/// is binary when its leading sample contains a NUL byte or any control
/// byte outside the conventional text set (bell, backspace, tab, newline,
/// form feed, carriage return, escape). Empty files are non-binary.
pub fn is_binary(path: &Path, diag: &dyn DiagnosticSink) -> bool {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            match e.kind() {
                io::ErrorKind::NotFound => {
                    diag.report(&format!("File does not exist: {}", path.display()))
                }
                io::ErrorKind::PermissionDenied => {
                    diag.report(&format!("Permission denied: {}", path.display()))
                }
                _ => diag.report(&format!("Error opening file {}: {}", path.display(), e)),
            }
            return false;
        }
    };

    let mut sample = [0u8; SAMPLE_LEN];
    let len = match file.read(&mut sample) {
        Ok(len) => len,
        Err(_) => return false,
    };

    sample[..len]
        .iter()
        .any(|&b| b == 0 || (b < 0x20 && !TEXT_CONTROL.contains(&b)))
}

/// Walk the directory once and collect root-relative paths of all files
/// not matched by the ignore patterns, in lexical depth-first order.
///
/// A directory that matches a pattern is pruned outright: its contents are
/// never visited. Walk errors are fatal for the run.
pub fn collect_files(root: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 {
                return true;
            }
            if !entry.file_type().is_dir() {
                return true;
            }
            let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
            !matches_ignore_pattern(&rel.to_string_lossy(), true, patterns)
        });

    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_dir() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .to_path_buf();
        if !matches_ignore_pattern(&rel.to_string_lossy(), false, patterns) {
            files.push(rel);
        }
    }

    Ok(files)
}
