//! CLI interface using clap
//!
//! Provides the command-line interface for DocAudit

mod commands;

pub use commands::*;

use clap::{Parser, Subcommand};

/// DocAudit - Documentation accuracy review tool
#[derive(Parser, Debug)]
#[command(name = "docaudit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the repository root (defaults to current directory)
    #[arg(short, long, global = true, default_value = ".")]
    pub path: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json)
    #[arg(short = 'o', long, global = true, default_value = "text")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Review a documentation file against the repository
    Review(ReviewArgs),

    /// Review every markdown file under a directory
    ReviewDir(ReviewDirArgs),

    /// Show the references a documentation file makes
    Refs(RefsArgs),

    /// Find repository files containing the given keywords
    Locate(LocateArgs),

    /// Verify a documentation file against one specific source file
    Verify(VerifyArgs),
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Arguments for the review command
#[derive(Parser, Debug)]
pub struct ReviewArgs {
    /// Path to the documentation file
    pub doc: String,

    /// Restrict verification to one file (relative to the repository root)
    #[arg(short, long)]
    pub target: Option<String>,

    /// Post the report to GitHub Discussions
    #[arg(long)]
    pub post: bool,

    /// GitHub repository name (owner/name), required when posting
    #[arg(long)]
    pub repo_name: Option<String>,

    /// GitHub Discussions category ID, required when posting
    #[arg(long)]
    pub category_id: Option<String>,

    /// GitHub token for posting
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

/// Arguments for the review-dir command
#[derive(Parser, Debug)]
pub struct ReviewDirArgs {
    /// Directory containing documentation files
    pub dir: String,
}

/// Arguments for the refs command
#[derive(Parser, Debug)]
pub struct RefsArgs {
    /// Path to the documentation file
    pub doc: String,
}

/// Arguments for the locate command
#[derive(Parser, Debug)]
pub struct LocateArgs {
    /// Keywords to search for
    #[arg(required = true)]
    pub keywords: Vec<String>,
}

/// Arguments for the verify command
#[derive(Parser, Debug)]
pub struct VerifyArgs {
    /// Path to the documentation file
    pub doc: String,

    /// Source file to verify against (relative to the repository root)
    #[arg(short, long)]
    pub file: String,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["docaudit", "review", "docs/guide.md"]);
        assert!(matches!(cli.command, Commands::Review(_)));

        if let Commands::Review(args) = cli.command {
            assert_eq!(args.doc, "docs/guide.md");
            assert!(!args.post);
        }
    }

    #[test]
    fn test_locate_requires_keywords() {
        assert!(Cli::try_parse_from(["docaudit", "locate"]).is_err());

        let cli = Cli::parse_from(["docaudit", "locate", "fetch", "parse"]);
        if let Commands::Locate(args) = cli.command {
            assert_eq!(args.keywords, vec!["fetch", "parse"]);
        } else {
            panic!("expected locate command");
        }
    }

    #[test]
    fn test_verify_command() {
        let cli = Cli::parse_from(["docaudit", "verify", "guide.md", "--file", "src/util.py"]);
        if let Commands::Verify(args) = cli.command {
            assert_eq!(args.file, "src/util.py");
        } else {
            panic!("expected verify command");
        }
    }
}
