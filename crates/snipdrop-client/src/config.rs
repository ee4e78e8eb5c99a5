use std::path::PathBuf;

use clap::{Parser, Subcommand};
use snipdrop_core::LineRange;

/// Configuration for the snipdrop command-line client.
#[derive(Parser, Debug, Clone)]
#[command(name = "snipdrop")]
#[command(about = "Capture text fragments as snippets and reorganize them by category")]
pub struct Config {
    /// Snippet service address (defaults to the local service port for this platform)
    #[arg(long, env = "SNIPDROP_BASE_URL")]
    pub base_url: Option<String>,

    /// HTTP request timeout (seconds)
    #[arg(long, default_value = "30", env = "SNIPDROP_TIMEOUT_SECS")]
    pub timeout_secs: u64,

    /// Project name recorded in snippet descriptions
    #[arg(long, default_value = "Unknown", env = "SNIPDROP_PROJECT")]
    pub project: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Refresh from the service and print snippets grouped by category
    List,

    /// Capture a file, or a line range of it, as a new snippet
    Save {
        file: PathBuf,

        /// One-based line or range, e.g. `3` or `3-10`
        #[arg(long, value_parser = parse_lines)]
        lines: Option<LineRange>,

        /// Category to classify the snippet as (inferred from the extension otherwise)
        #[arg(long)]
        category: Option<String>,
    },

    /// Move a snippet into another category
    Reclassify { id: String, category: String },

    /// Print the display text of a snippet
    Show { id: String },
}

impl Config {
    /// Service address, falling back to the platform default port.
    pub fn service_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None if cfg!(target_os = "linux") => "http://localhost:5323".to_string(),
            None => "http://localhost:1000".to_string(),
        }
    }
}

/// Parse a one-based `N` or `N-M` into a zero-based range.
fn parse_lines(value: &str) -> Result<LineRange, String> {
    let parse = |n: &str| -> Result<usize, String> {
        match n.trim().parse::<usize>() {
            Ok(0) | Err(_) => Err(format!("invalid line number: {:?}", n)),
            Ok(n) => Ok(n - 1),
        }
    };

    let (start, end) = match value.split_once('-') {
        Some((start, end)) => (parse(start)?, parse(end)?),
        None => {
            let line = parse(value)?;
            (line, line)
        }
    };
    if end < start {
        return Err(format!("range ends before it starts: {}", value));
    }
    Ok(LineRange::new(start, end))
}
