//! DOCX container and markup access.
//!
//! `package` owns the zip container, `document` the main part and its
//! paragraph/run/table surface, `markup` the low-level attribute overrides,
//! and `xml` the element tree everything else is built on.

pub mod document;
pub mod markup;
pub mod package;
pub mod xml;

pub use document::Document;
pub use package::DocxPackage;
