/*!
 * Tests for contextify functionality
 */

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use clap::Parser;
use indicatif::ProgressBar;
use tempfile::tempdir;

use crate::config::{Args, Config, DEFAULT_PREPROMPT, DEFAULT_TOKEN_LIMIT};
use crate::diagnostics::DiagnosticSink;
use crate::error::ContextifyError;
use crate::filter::load_ignore_list;
use crate::scanner::{collect_files, is_binary};
use crate::tree::build_tree;
use crate::writer::ContextWriter;

/// Diagnostic sink that records lines in memory
#[derive(Default)]
struct MemorySink(Mutex<Vec<String>>);

impl MemorySink {
    fn lines(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl DiagnosticSink for MemorySink {
    fn report(&self, line: &str) {
        self.0.lock().unwrap().push(line.to_string());
    }
}

fn hidden_progress() -> Arc<ProgressBar> {
    Arc::new(ProgressBar::hidden())
}

fn test_config(dir: &Path, omit: &[&str], preprompt: &str) -> Config {
    Config {
        directory: dir.to_path_buf(),
        token_limit: DEFAULT_TOKEN_LIMIT,
        output: PathBuf::from("output.txt"),
        omit: omit.iter().map(|s| s.to_string()).collect(),
        preprompt: preprompt.to_string(),
        request: String::new(),
    }
}

#[test]
fn test_load_ignore_list() -> io::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join(".gitignore");
    fs::write(&path, "*.log\n\n# comment\n  .dir/  \n")?;

    let patterns = load_ignore_list(&path).unwrap();
    assert_eq!(patterns, vec!["*.log".to_string(), ".dir/".to_string()]);
    Ok(())
}

#[test]
fn test_load_ignore_list_missing_file() {
    let dir = tempdir().unwrap();
    let patterns = load_ignore_list(&dir.path().join("nonexistent")).unwrap();
    assert!(patterns.is_empty());
}

#[test]
fn test_is_binary() -> io::Result<()> {
    let dir = tempdir()?;
    let sink = MemorySink::default();

    let text = dir.path().join("text.txt");
    fs::write(&text, "hello world")?;
    assert!(!is_binary(&text, &sink));

    let nul = dir.path().join("binary.bin");
    fs::write(&nul, [0x00u8, 0x01, 0x02])?;
    assert!(is_binary(&nul, &sink));

    let control = dir.path().join("control.bin");
    fs::write(&control, [b'a', 0x01, b'b'])?;
    assert!(is_binary(&control, &sink));

    // Tabs, newlines and escape are still text
    let escapes = dir.path().join("escapes.txt");
    fs::write(&escapes, b"a\tb\r\nc\x1b[0m")?;
    assert!(!is_binary(&escapes, &sink));

    let empty = dir.path().join("empty");
    File::create(&empty)?;
    assert!(!is_binary(&empty, &sink));

    assert!(sink.lines().is_empty());
    Ok(())
}

#[test]
fn test_is_binary_unreadable_file_reports_and_continues() {
    let sink = MemorySink::default();
    assert!(!is_binary(Path::new("/no/such/file"), &sink));
    let lines = sink.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("File does not exist"));
}

#[test]
fn test_build_tree() -> io::Result<()> {
    let dir = tempdir()?;
    let root = dir.path().join("testdir");
    fs::create_dir(&root)?;
    fs::write(root.join("file1.txt"), "content")?;
    fs::create_dir(root.join("subdir"))?;
    fs::write(root.join("subdir").join("file2.txt"), "content")?;

    let sink = MemorySink::default();
    let lines = build_tree(&root, &[], "", &root, &sink);
    assert_eq!(
        lines,
        vec![
            "testdir".to_string(),
            "├── subdir".to_string(),
            "│   └── file2.txt".to_string(),
            "└── file1.txt".to_string(),
        ]
    );
    Ok(())
}

#[test]
fn test_build_tree_connectors() -> io::Result<()> {
    // The last subdirectory only gets the corner connector when the level
    // has no files after it.
    let dir = tempdir()?;
    let root = dir.path().join("root");
    fs::create_dir(&root)?;
    fs::create_dir(root.join("alpha"))?;
    fs::create_dir(root.join("beta"))?;

    let sink = MemorySink::default();
    let lines = build_tree(&root, &[], "", &root, &sink);
    assert_eq!(
        lines,
        vec![
            "root".to_string(),
            "├── alpha".to_string(),
            "└── beta".to_string(),
        ]
    );
    Ok(())
}

#[test]
fn test_build_tree_respects_ignore_patterns() -> io::Result<()> {
    let dir = tempdir()?;
    let root = dir.path().join("root");
    fs::create_dir(&root)?;
    fs::write(root.join("keep.txt"), "keep")?;
    fs::write(root.join("drop.log"), "drop")?;
    fs::create_dir(root.join("build"))?;
    fs::write(root.join("build").join("artifact"), "x")?;

    let sink = MemorySink::default();
    let patterns = vec!["*.log".to_string(), "build/".to_string()];
    let lines = build_tree(&root, &patterns, "", &root, &sink);
    assert_eq!(lines, vec!["root".to_string(), "└── keep.txt".to_string()]);
    Ok(())
}

#[test]
fn test_build_tree_skips_git() -> io::Result<()> {
    let dir = tempdir()?;
    let root = dir.path().join("root");
    fs::create_dir(&root)?;
    fs::write(root.join("file.txt"), "content")?;
    fs::create_dir(root.join(".git"))?;
    fs::write(root.join(".git").join("config"), "[core]")?;

    let sink = MemorySink::default();
    let lines = build_tree(&root, &[], "", &root, &sink);
    assert_eq!(lines, vec!["root".to_string(), "└── file.txt".to_string()]);
    Ok(())
}

#[test]
fn test_collect_files_order_and_pruning() -> io::Result<()> {
    let dir = tempdir()?;
    let root = dir.path();
    fs::create_dir(root.join("a"))?;
    fs::write(root.join("a").join("z.txt"), "z")?;
    fs::write(root.join("b.txt"), "b")?;
    fs::create_dir(root.join("skipdir"))?;
    fs::write(root.join("skipdir").join("c.txt"), "c")?;

    let patterns = vec!["skipdir/".to_string()];
    let files = collect_files(root, &patterns).unwrap();
    assert_eq!(
        files,
        vec![PathBuf::from("a/z.txt"), PathBuf::from("b.txt")]
    );
    Ok(())
}

#[test]
fn test_collect_files_skips_ignored_files() -> io::Result<()> {
    let dir = tempdir()?;
    let root = dir.path();
    fs::write(root.join("keep.txt"), "keep")?;
    fs::write(root.join("drop.log"), "drop")?;

    let files = collect_files(root, &["*.log".to_string()]).unwrap();
    assert_eq!(files, vec![PathBuf::from("keep.txt")]);
    Ok(())
}

#[test]
fn test_end_to_end_output() -> io::Result<()> {
    let dir = tempdir()?;
    fs::write(dir.path().join("file1.txt"), "content1")?;
    fs::write(dir.path().join("file2.bin"), [0x00u8, 0x01])?;

    let config = test_config(dir.path(), &["*.bin"], "Preprompt\n");
    let sink = MemorySink::default();
    let mut writer = ContextWriter::new(config, hidden_progress());

    let mut buf = Vec::new();
    let total = writer.write(&mut buf, &sink).unwrap();

    let dirname = dir.path().file_name().unwrap().to_string_lossy();
    let expected = format!(
        "\u{feff}Preprompt\nDirectory structure:\n{}\n└── file1.txt\n\nFile contents:\n\n=== File: file1.txt ===\ncontent1\n\n",
        dirname
    );
    assert_eq!(String::from_utf8(buf).unwrap(), expected);
    assert_eq!(total, expected.len() as u64);
    Ok(())
}

#[test]
fn test_end_to_end_is_idempotent() -> io::Result<()> {
    let dir = tempdir()?;
    fs::write(dir.path().join("file1.txt"), "content1")?;
    fs::create_dir(dir.path().join("sub"))?;
    fs::write(dir.path().join("sub").join("file2.txt"), "content2")?;

    let config = test_config(dir.path(), &[], "Preprompt\n");
    let sink = MemorySink::default();

    let mut first = Vec::new();
    let mut second = Vec::new();
    let first_total = ContextWriter::new(config.clone(), hidden_progress())
        .write(&mut first, &sink)
        .unwrap();
    let second_total = ContextWriter::new(config, hidden_progress())
        .write(&mut second, &sink)
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(first_total, second_total);
    Ok(())
}

#[test]
fn test_binary_files_listed_in_tree_but_not_in_contents() -> io::Result<()> {
    let dir = tempdir()?;
    fs::write(dir.path().join("a.txt"), "text")?;
    fs::write(dir.path().join("b.bin"), [0x00u8, 0xff, 0x00])?;

    let config = test_config(dir.path(), &[], "P\n");
    let sink = MemorySink::default();
    let mut writer = ContextWriter::new(config, hidden_progress());

    let mut buf = Vec::new();
    writer.write(&mut buf, &sink).unwrap();
    let output = String::from_utf8(buf).unwrap();

    // In the tree, absent from the contents section
    assert!(output.contains("├── a.txt") || output.contains("└── a.txt"));
    assert!(output.contains("└── b.bin"));
    assert!(output.contains("=== File: a.txt ==="));
    assert!(!output.contains("=== File: b.bin ==="));

    assert!(sink
        .lines()
        .iter()
        .any(|line| line.contains("Skipping binary file: b.bin")));

    let stats = writer.statistics();
    assert_eq!(stats.files_written, 1);
    assert_eq!(stats.binary_skipped, 1);
    assert_eq!(stats.read_failures, 0);
    Ok(())
}

#[test]
fn test_ignore_file_in_scan_root_is_applied() -> io::Result<()> {
    let dir = tempdir()?;
    fs::write(dir.path().join(".gitignore"), "*.md\n")?;
    fs::write(dir.path().join("keep.txt"), "keep-me")?;
    fs::write(dir.path().join("note.md"), "drop-me")?;

    let config = test_config(dir.path(), &[], "P\n");
    let sink = MemorySink::default();
    let mut buf = Vec::new();
    ContextWriter::new(config, hidden_progress())
        .write(&mut buf, &sink)
        .unwrap();
    let output = String::from_utf8(buf).unwrap();

    assert!(output.contains("keep-me"));
    assert!(!output.contains("drop-me"));
    assert!(!output.contains("note.md"));
    Ok(())
}

/// Sink whose first write fails, to exercise fatal write handling
struct FailingWriter;

impl Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_write_failure_is_fatal_and_names_the_stage() -> io::Result<()> {
    let dir = tempdir()?;
    fs::write(dir.path().join("file.txt"), "content")?;

    let config = test_config(dir.path(), &[], "P\n");
    let sink = MemorySink::default();
    let result = ContextWriter::new(config, hidden_progress()).write(FailingWriter, &sink);

    match result {
        Err(ContextifyError::Write { stage, .. }) => assert_eq!(stage, "BOM"),
        other => panic!("expected a write error, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_config_from_flags() {
    let args = Args::parse_from([
        "contextify",
        "-d",
        "dir",
        "-t",
        "1000",
        "-o",
        "output.txt",
        "-s",
        "omit",
        "-p",
        "preprompt",
        "-r",
        "request",
    ]);
    let config = Config::from_args(&args).unwrap();

    assert_eq!(config.directory, PathBuf::from("dir"));
    assert_eq!(config.token_limit, 1000);
    assert_eq!(config.output, PathBuf::from("output.txt"));
    assert_eq!(config.omit, vec!["omit".to_string()]);
    assert_eq!(config.preprompt, "preprompt\n\nRequest:\n\nrequest");
    assert_eq!(config.request, "request");
}

#[test]
fn test_config_defaults() {
    let args = Args::parse_from(["contextify", "-o", "out.txt"]);
    let config = Config::from_args(&args).unwrap();

    assert_eq!(config.directory, PathBuf::from("."));
    assert_eq!(config.token_limit, DEFAULT_TOKEN_LIMIT);
    assert_eq!(config.preprompt, DEFAULT_PREPROMPT);
    assert!(config.omit.is_empty());
}

#[test]
fn test_config_request_token_substitution() {
    let args = Args::parse_from([
        "contextify",
        "-o",
        "out.txt",
        "-p",
        "Before <request> After",
        "-r",
        "do the thing",
    ]);
    let config = Config::from_args(&args).unwrap();
    assert_eq!(config.preprompt, "Before do the thing After");
}

#[test]
fn test_config_missing_output_is_an_error() {
    let args = Args::parse_from(["contextify", "-d", "dir"]);
    let err = Config::from_args(&args).unwrap_err();
    assert_eq!(
        err.to_string(),
        "output path is required; use -o or --output to specify"
    );
}

#[test]
fn test_config_flag_conflicts_with_other_options() {
    assert!(Args::try_parse_from(["contextify", "-c", "cfg.yaml", "-o", "out.txt"]).is_err());
    assert!(Args::try_parse_from(["contextify", "-c", "cfg.yaml", "-s", "x"]).is_err());
}

#[test]
fn test_config_from_yaml_file() -> io::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("config.yaml");
    fs::write(
        &path,
        "directory: configdir\ntoken_limit: 2000\noutput: out.txt\nomit:\n  - omit1\npreprompt: preprompt\nrequest: req\n",
    )?;

    let args = Args::parse_from(["contextify", "-c", path.to_str().unwrap()]);
    let config = Config::from_args(&args).unwrap();

    assert_eq!(config.directory, PathBuf::from("configdir"));
    assert_eq!(config.token_limit, 2000);
    assert_eq!(config.output, PathBuf::from("out.txt"));
    assert_eq!(config.omit, vec!["omit1".to_string()]);
    assert_eq!(config.preprompt, "preprompt\n\nRequest:\n\nreq");
    Ok(())
}

#[test]
fn test_config_from_yaml_requires_output() -> io::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("config.yaml");
    fs::write(&path, "directory: configdir\n")?;

    let args = Args::parse_from(["contextify", "-c", path.to_str().unwrap()]);
    let err = Config::from_args(&args).unwrap_err();
    assert_eq!(err.to_string(), "output path is required in the config file");
    Ok(())
}

#[test]
fn test_generate_default_config() -> io::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("nested").join("config.yaml");
    Config::generate_default(&path, Path::new("."), Some("my request")).unwrap();

    let data = fs::read_to_string(&path)?;
    let file: crate::config::ConfigFile = serde_yaml::from_str(&data).unwrap();
    assert_eq!(file.token_limit, DEFAULT_TOKEN_LIMIT);
    assert_eq!(file.omit, vec![".git/".to_string()]);
    assert!(file.output.ends_with("_codebase.txt"));
    assert_eq!(file.preprompt, DEFAULT_PREPROMPT);
    assert_eq!(file.request, "my request");
    Ok(())
}
