/*!
 * Diagnostic side channel for contextify
 *
 * Recoverable problems (unreadable files, skipped binaries, partial
 * directory listings) are reported here, never to the output sink, so the
 * core stays unit-testable without capturing real process streams.
 */

/// Accepts one line of diagnostic text per event
pub trait DiagnosticSink {
    fn report(&self, line: &str);
}

/// Production sink: one line per event on stderr
pub struct StderrDiagnostics;

impl DiagnosticSink for StderrDiagnostics {
    fn report(&self, line: &str) {
        eprintln!("{}", line);
    }
}
