//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum, ValueHint};

use crate::application::services::InputFormat;

/// Build element trees from nested key-value descriptions
#[derive(Parser, Debug)]
#[command(name = "json2dom")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert a description and print it as HTML
    Render {
        /// Description file (.json or .toml)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Mount into a container element with this id (default: container_id setting)
        #[arg(short, long, num_args = 0..=1, default_missing_value = "")]
        mount: Option<String>,
        /// Input format (default: from file extension)
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,
        /// Write HTML to this file instead of stdout
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
        /// Single-line output
        #[arg(long)]
        compact: bool,
    },

    /// Show the constructed element tree
    Tree {
        /// Description file (.json or .toml)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Input format (default: from file extension)
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,
    },

    /// Validate a description by building it
    Check {
        /// Description files (.json or .toml)
        #[arg(required = true, value_hint = ValueHint::FilePath)]
        files: Vec<PathBuf>,
        /// Input format (default: from file extension)
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,
    },

    /// Build the bundled issue-form demo
    Demo {
        /// Click the callback button after building
        #[arg(long)]
        click: bool,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Show global config file location
    Path,
    /// Print a commented config template
    Template,
}

/// Description text formats accepted on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    Json,
    Toml,
}

impl From<FormatArg> for InputFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Json => InputFormat::Json,
            FormatArg::Toml => InputFormat::Toml,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    // https://docs.rs/clap/latest/clap/_derive/_tutorial/index.html#testing
    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn given_render_with_bare_mount_when_parsing_then_mount_is_empty() {
        let cli = Cli::try_parse_from(["json2dom", "render", "page.json", "--mount"]).unwrap();
        match cli.command {
            Some(Commands::Render { mount, .. }) => assert_eq!(mount.as_deref(), Some("")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn given_repeated_debug_flags_when_parsing_then_counts() {
        let cli = Cli::try_parse_from(["json2dom", "-dd", "demo"]).unwrap();
        assert_eq!(cli.debug, 2);
    }
}
