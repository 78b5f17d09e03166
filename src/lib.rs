//! DocAudit - Documentation accuracy review tool
//!
//! This library reviews documentation against the codebase it describes:
//! it extracts the file references and code samples a document makes,
//! locates the corresponding source files, compares the samples against
//! the real content, and renders a discrepancy report.

pub mod cli;
pub mod compare;
pub mod config;
pub mod extract;
pub mod locate;
pub mod publish;
pub mod report;
pub mod review;

/// Re-export commonly used types
pub use compare::{DiscrepancyKind, DiscrepancyRecord, Severity};
pub use config::ReviewConfig;
pub use locate::Locator;
pub use review::{ReviewError, ReviewResult, Reviewer};

/// Application-wide error type
pub use anyhow::Result;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "docaudit";
