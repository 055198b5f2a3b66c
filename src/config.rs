/*!
 * Configuration handling for contextify
 */

use std::env;
use std::fs;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use clap::Parser;
use clap_complete::Shell;
use serde::{Deserialize, Serialize};

use crate::error::{ContextifyError, Result};

/// Default context window size, in tokens
pub const DEFAULT_TOKEN_LIMIT: usize = 128_000;

/// Rough characters-per-token ratio used for size estimates
pub const CHARS_PER_TOKEN: usize = 4;

/// Preprompt prepended to the output when none is supplied.
///
/// Carries a `<request>` token replaced by the user's request; when the
/// token is absent from a custom preprompt, the request is appended as a
/// literal "Request:" section instead.
pub const DEFAULT_PREPROMPT: &str = "I have dumped the entire context of my code base, and I have a specific request. Please come up with a proposal to address my request - including the code and general approach.

Ensure that you leave no details out, and specifically follow my requirements. I know what I am doing, and you can assume that there is a reason for my arbitrary requirements.

When generating the full instructions with all of the details, keep in mind that I require very specific, step-by-step instructions. Come up with discrete steps such that I can build incrementally and verify success at each step, keeping your response concise.

Request:

<request>

The entire codebase is pasted below as context:

";

/// Command-line arguments for contextify
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "contextify",
    version = env!("CARGO_PKG_VERSION"),
    about = "Concatenate a directory tree into a single text document for LLM context",
    long_about = "Walks a directory, filters out ignored and binary files, and concatenates the remaining text files (with a directory tree header and a preprompt) into one document for pasting into a Large Language Model context window."
)]
pub struct Args {
    /// Path to config YAML file
    #[clap(
        short,
        long,
        conflicts_with_all = ["directory", "tokens", "output", "skip", "preprompt", "request"]
    )]
    pub config: Option<PathBuf>,

    /// Directory to process
    #[clap(short, long)]
    pub directory: Option<PathBuf>,

    /// Context/token limit
    #[clap(short, long)]
    pub tokens: Option<usize>,

    /// Output file path (relative or absolute)
    #[clap(short, long)]
    pub output: Option<PathBuf>,

    /// Comma-separated list of files or directories to omit
    #[clap(short, long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Preprompt message to prepend to the output
    #[clap(short, long)]
    pub preprompt: Option<String>,

    /// Request to include in the preprompt
    #[clap(short, long)]
    pub request: Option<String>,

    /// Generate a default config file at the specified path
    #[clap(short = 'g', long)]
    pub generate_config: Option<PathBuf>,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,
}

/// On-disk YAML representation of the configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub directory: String,
    #[serde(default)]
    pub token_limit: usize,
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub omit: Vec<String>,
    #[serde(default)]
    pub preprompt: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub request: String,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Target directory to process
    pub directory: PathBuf,

    /// Context window size the output is measured against
    pub token_limit: usize,

    /// Output file path
    pub output: PathBuf,

    /// Patterns to omit, merged with the scan root's ignore file
    pub omit: Vec<String>,

    /// Text prepended to the output
    pub preprompt: String,

    /// Request folded into the preprompt
    pub request: String,
}

impl Config {
    /// Create configuration from command-line arguments or a config file
    pub fn from_args(args: &Args) -> Result<Self> {
        let mut config = if let Some(path) = &args.config {
            let data = fs::read_to_string(path).map_err(|e| {
                ContextifyError::Config(format!("error reading config file: {}", e))
            })?;
            let file: ConfigFile = serde_yaml::from_str(&data).map_err(|e| {
                ContextifyError::Config(format!("error parsing config file: {}", e))
            })?;
            if file.output.is_empty() {
                return Err(ContextifyError::Config(
                    "output path is required in the config file".to_string(),
                ));
            }
            Config {
                directory: PathBuf::from(if file.directory.is_empty() {
                    "."
                } else {
                    file.directory.as_str()
                }),
                token_limit: if file.token_limit == 0 {
                    DEFAULT_TOKEN_LIMIT
                } else {
                    file.token_limit
                },
                output: PathBuf::from(file.output),
                omit: file.omit,
                preprompt: if file.preprompt.is_empty() {
                    DEFAULT_PREPROMPT.to_string()
                } else {
                    file.preprompt
                },
                request: file.request,
            }
        } else {
            let output = args.output.clone().ok_or_else(|| {
                ContextifyError::Config(
                    "output path is required; use -o or --output to specify".to_string(),
                )
            })?;
            Config {
                directory: args.directory.clone().unwrap_or_else(|| PathBuf::from(".")),
                token_limit: args.tokens.unwrap_or(DEFAULT_TOKEN_LIMIT),
                output,
                omit: args.skip.clone(),
                preprompt: args
                    .preprompt
                    .clone()
                    .unwrap_or_else(|| DEFAULT_PREPROMPT.to_string()),
                request: args.request.clone().unwrap_or_default(),
            }
        };

        if !config.request.is_empty() {
            if config.preprompt.contains("<request>") {
                config.preprompt = config.preprompt.replacen("<request>", &config.request, 1);
            } else {
                config.preprompt.push_str("\n\nRequest:\n\n");
                config.preprompt.push_str(&config.request);
            }
        }

        Ok(config)
    }

    /// Validate the configuration before any output I/O begins
    pub fn validate(&self) -> Result<()> {
        if !self.directory.is_dir() {
            return Err(ContextifyError::Config(format!(
                "target directory not found: {}",
                self.directory.display()
            )));
        }
        Ok(())
    }

    /// Write a default YAML config file for `directory` at `path`
    pub fn generate_default(path: &Path, directory: &Path, request: Option<&str>) -> Result<()> {
        let abs = if directory.is_absolute() {
            directory.to_path_buf()
        } else {
            env::current_dir()?.join(directory)
        };
        let basename = abs
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "current_dir".to_string());

        let default_output = env::temp_dir()
            .join("contextify")
            .join(format!("{}_codebase.txt", basename));

        let file = ConfigFile {
            directory: directory.display().to_string(),
            token_limit: DEFAULT_TOKEN_LIMIT,
            output: default_output.display().to_string(),
            omit: vec![format!(".git{}", MAIN_SEPARATOR)],
            preprompt: DEFAULT_PREPROMPT.to_string(),
            request: request.unwrap_or_default().to_string(),
        };

        let yaml = serde_yaml::to_string(&file)
            .map_err(|e| ContextifyError::Config(format!("error generating config: {}", e)))?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, yaml)?;
        Ok(())
    }
}
