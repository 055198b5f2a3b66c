/*!
 * Command-line interface for contextify
 */

use std::env;
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Instant;

use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};

use contextify::clipboard;
use contextify::config::{Args, Config};
use contextify::diagnostics::StderrDiagnostics;
use contextify::error::Result;
use contextify::report::{ReportFormat, Reporter, RunSummary};
use contextify::utils::path_within;
use contextify::writer::ContextWriter;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    // Show help if no arguments provided
    if env::args().len() <= 1 {
        Args::command().print_help()?;
        return Ok(());
    }

    let args = Args::parse();

    // Handle shell completion generation
    if let Some(shell) = args.generate {
        let mut cmd = Args::command();
        let name = cmd.get_name().to_string();
        clap_complete::generate(shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    // Handle config generation
    if let Some(path) = &args.generate_config {
        let directory = args.directory.clone().unwrap_or_else(|| PathBuf::from("."));
        Config::generate_default(path, &directory, args.request.as_deref())?;
        println!("Default config file generated at {}", path.display());
        return Ok(());
    }

    let mut config = Config::from_args(&args)?;
    config.validate()?;

    // Never ingest the tool's own artifacts when they live under the scan root
    let mut own_artifacts: Vec<PathBuf> = Vec::new();
    if let Ok(exe) = env::current_exe() {
        own_artifacts.push(exe);
    }
    if let Some(config_path) = &args.config {
        own_artifacts.push(config_path.clone());
    }
    own_artifacts.push(config.output.clone());
    for artifact in own_artifacts {
        if let Some(pattern) = path_within(&config.directory, &artifact) {
            config.omit.push(pattern);
        }
    }

    // Ensure the output directory exists and open the sink
    if let Some(parent) = config.output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let outfile = File::create(&config.output)?;

    let progress = ProgressBar::new(0);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} {wide_msg:.dim} {pos}/{len} ({percent}%)")
            .unwrap(),
    );
    progress.enable_steady_tick(std::time::Duration::from_millis(100));
    progress.set_prefix("Combining");

    let mut writer = ContextWriter::new(config.clone(), Arc::new(progress.clone()));

    let start_time = Instant::now();
    let total_bytes = writer.write(BufWriter::new(outfile), &StderrDiagnostics)?;
    let duration = start_time.elapsed();

    progress.finish_and_clear();

    let stats = writer.statistics();
    let summary = RunSummary {
        output_file: config.output.display().to_string(),
        duration,
        files_written: stats.files_written,
        binary_skipped: stats.binary_skipped,
        read_failures: stats.read_failures,
        bytes_written: total_bytes,
        token_limit: config.token_limit,
    };

    Reporter::new(ReportFormat::ConsoleTable).print_report(&summary);

    if summary.fits() {
        match fs::read_to_string(&config.output) {
            Ok(content) => match clipboard::copy_to_clipboard(&content) {
                Ok(()) => println!("Output copied to clipboard."),
                Err(e) => println!(
                    "Clipboard not supported: {}. Output is still available in {}.",
                    e,
                    config.output.display()
                ),
            },
            Err(e) => eprintln!("Failed to read output file for clipboard: {}", e),
        }
    } else {
        println!(
            "Warning: the combined file exceeds the context limit of {} tokens. You may need to split it or reduce the number of files.",
            config.token_limit
        );
    }

    Ok(())
}
