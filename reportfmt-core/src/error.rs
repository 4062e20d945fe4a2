//! Error types for report formatting.

use std::io;
use thiserror::Error;

/// Result type alias for formatting operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading, transforming, or writing a report.
///
/// Load-side and write-side failures are fatal and abort the pipeline.
/// Attribute mismatches discovered after formatting are NOT errors — they
/// travel as [`crate::types::ValidationIssue`] data inside the report.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is not a readable document package.
    #[error("not a valid .docx package: {0}")]
    Package(#[from] zip::result::ZipError),

    /// A required part of the package is missing.
    #[error("missing package part: {0}")]
    MissingPart(String),

    /// The document markup could not be parsed.
    #[error("markup error: {0}")]
    Markup(String),

    /// A table does not match the fixed column schema, so no widths were
    /// rewritten for it.
    #[error("table {table} has {columns} columns, expected {expected}")]
    TableShape {
        table: usize,
        columns: usize,
        expected: usize,
    },

    /// Failure serializing the processed document back to bytes.
    #[error("serialization error: {0}")]
    Serialize(String),

    /// A style configuration file could not be parsed.
    #[error("config error: {0}")]
    Config(#[from] serde_yaml::Error),
}

impl From<quick_xml::Error> for Error {
    fn from(e: quick_xml::Error) -> Self {
        Error::Markup(e.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        Error::Markup(e.to_string())
    }
}
