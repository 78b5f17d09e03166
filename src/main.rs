//! DocAudit - Documentation accuracy review tool
//!
//! Reviews documentation files against the real codebase, reporting code
//! examples and config samples that no longer match the implementation.

use anyhow::Result;
use clap::Parser;
use docaudit::cli::{
    locate, print_refs_text, print_result_json, print_result_text, refs, review, review_dir,
    verify, Cli, Commands, OutputFormat,
};
use std::path::Path;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    // Repository root
    let repo_root = Path::new(&cli.path);

    // Execute command
    match cli.command {
        Commands::Review(args) => {
            let result = review(repo_root, &args)?;

            match cli.format {
                OutputFormat::Json => print_result_json(&result)?,
                OutputFormat::Text => print_result_text(&result),
            }
        }

        Commands::ReviewDir(args) => {
            let results = review_dir(repo_root, &args)?;

            match cli.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&results)?);
                }
                OutputFormat::Text => {
                    let total: usize = results.iter().map(|r| r.discrepancies.len()).sum();
                    println!("\n{} file(s) reviewed, {} discrepancy(ies) total", results.len(), total);
                }
            }
        }

        Commands::Refs(args) => {
            let references = refs(&args)?;

            match cli.format {
                OutputFormat::Json => {
                    let json = serde_json::json!({
                        "related_files": references.related_files,
                        "keywords": references.keywords,
                    });
                    println!("{}", serde_json::to_string_pretty(&json)?);
                }
                OutputFormat::Text => print_refs_text(&references),
            }
        }

        Commands::Locate(args) => {
            let files = locate(repo_root, &args)?;

            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&files)?),
                OutputFormat::Text => {
                    if files.is_empty() {
                        println!("No files matched.");
                    } else {
                        for file in &files {
                            println!("{}", file);
                        }
                    }
                }
            }
        }

        Commands::Verify(args) => {
            let result = verify(repo_root, &args)?;

            match cli.format {
                OutputFormat::Json => print_result_json(&result)?,
                OutputFormat::Text => print_result_text(&result),
            }
        }
    }

    Ok(())
}
