// Reportfmt Core Library
//
// Document-formatting rules engine for financial report DOCX files.
// Classifies cover-page paragraphs and statement-table columns, rewrites
// their formatting against a fixed style guide, and validates the result.

pub mod config;
pub mod docx;
pub mod error;
pub mod processor;
pub mod rules;
pub mod types;

// Re-export main types and functions for easy use
pub use config::StyleConfig;
pub use docx::{Document, DocxPackage};
pub use error::{Error, Result};
pub use processor::{
    ProcessOptions, ProcessOutcome, ProcessedBytes, ReportProcessor, ValidationMode,
};
pub use types::*;
