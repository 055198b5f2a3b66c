/*!
 * Aggregation pipeline: walk, filter, render, write
 */

use std::fs;
use std::io::{self, Write};
use std::sync::Arc;

use indicatif::ProgressBar;

use crate::config::Config;
use crate::diagnostics::DiagnosticSink;
use crate::error::{ContextifyError, Result};
use crate::filter::load_ignore_list;
use crate::scanner::{collect_files, is_binary};
use crate::tree::build_tree;

/// UTF-8 byte-order mark written at the start of the output
pub const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Wraps a writer and counts bytes written through it
pub struct CountingWriter<W: Write> {
    inner: W,
    count: u64,
}

impl<W: Write> CountingWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, count: 0 }
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.count += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Counters accumulated over one aggregation run
#[derive(Debug, Clone, Default)]
pub struct WriterStatistics {
    /// Files whose content was written to the output
    pub files_written: usize,
    /// Files skipped because they were detected as binary
    pub binary_skipped: usize,
    /// Files skipped because their content could not be read
    pub read_failures: usize,
}

/// Aggregator: streams preprompt, directory tree and file contents into an
/// output sink in a single sequential pass
pub struct ContextWriter {
    config: Config,
    progress: Arc<ProgressBar>,
    statistics: WriterStatistics,
}

impl ContextWriter {
    /// Create a new writer
    pub fn new(config: Config, progress: Arc<ProgressBar>) -> Self {
        Self {
            config,
            progress,
            statistics: WriterStatistics::default(),
        }
    }

    /// Get the counters from the last run
    pub fn statistics(&self) -> &WriterStatistics {
        &self.statistics
    }

    /// Run one aggregation pass and return the total bytes written.
    ///
    /// Patterns come from the scan root's `.gitignore` (filter-file
    /// patterns first) merged with the configured omit list. Every file
    /// path that ends up in the contents section also appears in the tree;
    /// binary files appear only in the tree and are reported to the
    /// diagnostic sink. Per-file read failures are recoverable; any sink
    /// write failure aborts the run with the failing stage named.
    pub fn write<W: Write>(&mut self, sink: W, diag: &dyn DiagnosticSink) -> Result<u64> {
        self.statistics = WriterStatistics::default();

        let mut patterns = load_ignore_list(&self.config.directory.join(".gitignore"))?;
        patterns.extend(self.config.omit.iter().cloned());

        let files = collect_files(&self.config.directory, &patterns)?;
        self.progress.set_length(files.len() as u64);

        let mut out = CountingWriter::new(sink);

        out.write_all(&UTF8_BOM)
            .map_err(|e| write_error("BOM", e))?;
        out.write_all(self.config.preprompt.as_bytes())
            .map_err(|e| write_error("preprompt", e))?;
        out.write_all(b"Directory structure:\n")
            .map_err(|e| write_error("directory header", e))?;

        let tree = build_tree(&self.config.directory, &patterns, "", &self.config.directory, diag);
        let tree = format!("{}\n\n", tree.join("\n"));
        out.write_all(tree.as_bytes())
            .map_err(|e| write_error("directory tree", e))?;

        out.write_all(b"File contents:\n\n")
            .map_err(|e| write_error("contents header", e))?;

        for rel in &files {
            self.progress.inc(1);
            self.progress.set_message(rel.display().to_string());

            let full = self.config.directory.join(rel);
            if is_binary(&full, diag) {
                diag.report(&format!("Skipping binary file: {}", rel.display()));
                self.statistics.binary_skipped += 1;
                continue;
            }

            let content = match fs::read(&full) {
                Ok(content) => content,
                Err(e) => {
                    match e.kind() {
                        io::ErrorKind::NotFound => {
                            diag.report(&format!("File not found: {}", rel.display()))
                        }
                        io::ErrorKind::PermissionDenied => {
                            diag.report(&format!("Permission denied: {}", rel.display()))
                        }
                        _ => diag.report(&format!("Error reading {}: {}", rel.display(), e)),
                    }
                    self.statistics.read_failures += 1;
                    continue;
                }
            };

            out.write_all(format!("=== File: {} ===\n", rel.display()).as_bytes())
                .map_err(|e| write_error(&format!("file header for {}", rel.display()), e))?;
            out.write_all(&content)
                .map_err(|e| write_error(&format!("file content for {}", rel.display()), e))?;
            out.write_all(b"\n\n")
                .map_err(|e| write_error(&format!("file footer for {}", rel.display()), e))?;
            self.statistics.files_written += 1;
        }

        out.flush().map_err(|e| write_error("output flush", e))?;
        Ok(out.count())
    }
}

fn write_error(stage: &str, source: io::Error) -> ContextifyError {
    ContextifyError::Write {
        stage: stage.to_string(),
        source,
    }
}
