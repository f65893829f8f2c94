use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Command-line arguments for the droid-triage decoder.
///
/// The input is a directory of files already pulled from the device; the
/// output directory receives the findings, the error log, the run summary
/// and any extracted media.
#[derive(Parser, Debug)]
#[clap(name = "droid-triage", about = "Android artifact decoder and lockscreen recovery")]
pub struct Args {
    /// Directory of artifacts pulled from the device
    pub input: Option<PathBuf>,

    /// Output directory (default: <input>-decoded next to the input)
    #[clap(short, long)]
    pub output: Option<PathBuf>,

    /// Path to decoder configuration YAML file
    #[clap(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Verbose logging
    #[clap(short, long)]
    pub verbose: bool,

    /// Shortest PIN length to try (overrides config)
    #[clap(long)]
    pub min_pin_length: Option<usize>,

    /// Longest PIN length to try (overrides config)
    #[clap(long)]
    pub max_pin_length: Option<usize>,

    /// Worker threads for credential recovery (default: all cores)
    #[clap(short = 'j', long)]
    pub workers: Option<usize>,

    /// Report the gesture hash without searching for the pattern
    #[clap(long)]
    pub no_gesture_crack: bool,

    /// Decoders to skip (comma-separated names)
    #[clap(long, help = "Decoders to skip (comma-separated names, see list-decoders)")]
    pub disable: Option<String>,

    /// Subcommands
    #[clap(subcommand)]
    pub command: Option<Commands>,
}

impl Args {
    /// Names given to `--disable`, trimmed, empties dropped
    pub fn disabled_decoders(&self) -> Vec<String> {
        self.disable
            .as_deref()
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Where results go: `--output`, or `<input>-decoded` beside the input.
    ///
    /// The input is resolved first so that `.` or a trailing `..` still
    /// names a real directory and the output never lands inside the tree
    /// being ingested.
    pub fn output_dir(&self, input: &Path) -> Result<PathBuf> {
        if let Some(path) = &self.output {
            return Ok(path.clone());
        }

        let input = input
            .canonicalize()
            .context(format!("Failed to resolve input directory {}", input.display()))?;
        let name = input.file_name().ok_or_else(|| {
            anyhow!("Cannot place output beside {}; pass --output", input.display())
        })?;
        Ok(input.with_file_name(format!("{}-decoded", name.to_string_lossy())))
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a default configuration file
    InitConfig {
        /// Path to output configuration file
        #[clap(default_value = "decoders.yaml")]
        path: PathBuf,
    },

    /// List every decoder with the artifacts it reads
    ListDecoders,
}
