//! Pipeline orchestration.
//!
//! One document per run: load → base style → cover engine → table engine
//! → optional validation → finalize. A failing stage aborts the pipeline
//! and surfaces its error; a failing validation is not an error but an
//! outcome, resolved by the configured [`ValidationMode`].

use crate::config::StyleConfig;
use crate::docx::DocxPackage;
use crate::error::{Error, Result};
use crate::rules::{validation, CoverRule, TableRule, Validator};
use crate::types::ValidationReport;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// What to do with a document that fails validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// Keep the non-compliant artifact for visual diagnosis, next to a
    /// structured log of every issue.
    Diagnostic,
    /// Refuse the artifact; only the issue report leaves the pipeline.
    Strict,
}

#[derive(Debug, Clone)]
pub struct ProcessOptions {
    pub validate: bool,
    pub mode: ValidationMode,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            validate: true,
            mode: ValidationMode::Diagnostic,
        }
    }
}

/// Result of a path-based run.
#[derive(Debug)]
pub enum ProcessOutcome {
    /// Validation passed (or was off); the processed document is at `output`.
    Clean { output: PathBuf },
    /// Diagnostic mode: the non-compliant document and its issue log were
    /// written for inspection.
    Issues {
        output: PathBuf,
        report_path: PathBuf,
        report: ValidationReport,
    },
    /// Strict mode: no artifact, report only.
    Rejected { report: ValidationReport },
}

/// Result of a byte-based run (service surface).
#[derive(Debug)]
pub enum ProcessedBytes {
    Clean(Vec<u8>),
    WithIssues {
        bytes: Vec<u8>,
        report: ValidationReport,
    },
    Rejected {
        report: ValidationReport,
    },
}

pub struct ReportProcessor {
    config: StyleConfig,
}

impl Default for ReportProcessor {
    fn default() -> Self {
        Self::new(StyleConfig::default())
    }
}

impl ReportProcessor {
    pub fn new(config: StyleConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StyleConfig {
        &self.config
    }

    /// Run the formatting stages over a loaded package.
    pub fn format_package(&self, package: &mut DocxPackage) -> Result<()> {
        let stage = Instant::now();
        if !package.normalize_base_style(&self.config) {
            println!("⚠️  No Normal style found, skipping base font normalization");
        }
        println!("⏱️  Base style: {:.3}s", stage.elapsed().as_secs_f64());

        let stage = Instant::now();
        println!("📐 Formatting cover page...");
        CoverRule::new(&self.config).apply(&mut package.document)?;
        println!("⏱️  Cover formatting: {:.3}s", stage.elapsed().as_secs_f64());

        let stage = Instant::now();
        println!("📊 Formatting tables...");
        TableRule::new(&self.config).apply(&mut package.document)?;
        println!("⏱️  Table formatting: {:.3}s", stage.elapsed().as_secs_f64());

        Ok(())
    }

    /// Re-inspect a processed package against the configured targets.
    pub fn validate_package(&self, package: &DocxPackage) -> ValidationReport {
        let stage = Instant::now();
        println!("🔍 Validating...");
        let report = Validator::new(&self.config).validate(&package.document);
        println!("⏱️  Validation: {:.3}s", stage.elapsed().as_secs_f64());
        report
    }

    /// Full pipeline over files on disk.
    pub fn process_path(
        &self,
        input: &Path,
        output: &Path,
        options: &ProcessOptions,
    ) -> Result<ProcessOutcome> {
        let start = Instant::now();
        println!("📄 Loading document: {}", input.display());
        let mut package = DocxPackage::open(input)?;

        self.format_package(&mut package)?;

        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let outcome = if options.validate {
            let report = self.validate_package(&package);
            validation::print_report(&report);

            if report.pass {
                package.save(output)?;
                ProcessOutcome::Clean {
                    output: output.to_path_buf(),
                }
            } else {
                match options.mode {
                    ValidationMode::Diagnostic => {
                        let (issue_doc, issue_log) = issue_paths(output);
                        package.save(&issue_doc)?;
                        std::fs::write(&issue_log, report_json(&report)?)?;
                        println!("❌ Validation FAILED. Output saved to: {}", issue_doc.display());
                        println!("   Issue log saved to: {}", issue_log.display());
                        ProcessOutcome::Issues {
                            output: issue_doc,
                            report_path: issue_log,
                            report,
                        }
                    }
                    ValidationMode::Strict => {
                        println!("❌ Validation FAILED. No artifact written (strict mode)");
                        ProcessOutcome::Rejected { report }
                    }
                }
            }
        } else {
            package.save(output)?;
            ProcessOutcome::Clean {
                output: output.to_path_buf(),
            }
        };

        println!(
            "⏱️  Total processing time: {:.3}s",
            start.elapsed().as_secs_f64()
        );
        Ok(outcome)
    }

    /// Full pipeline over in-memory bytes (service surface).
    pub fn process_bytes(&self, bytes: &[u8], options: &ProcessOptions) -> Result<ProcessedBytes> {
        let mut package = DocxPackage::from_bytes(bytes)?;
        self.format_package(&mut package)?;

        if !options.validate {
            return Ok(ProcessedBytes::Clean(package.to_bytes()?));
        }

        let report = self.validate_package(&package);
        if report.pass {
            Ok(ProcessedBytes::Clean(package.to_bytes()?))
        } else {
            match options.mode {
                ValidationMode::Diagnostic => Ok(ProcessedBytes::WithIssues {
                    bytes: package.to_bytes()?,
                    report,
                }),
                ValidationMode::Strict => Ok(ProcessedBytes::Rejected { report }),
            }
        }
    }
}

/// Sibling artifact paths for a failed run: the document for visual
/// diagnosis and the structured issue log.
fn issue_paths(output: &Path) -> (PathBuf, PathBuf) {
    let stem = output
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let parent = output.parent().unwrap_or_else(|| Path::new(""));
    (
        parent.join(format!("{stem}_WITH_ISSUES.docx")),
        parent.join(format!("{stem}_ISSUES.json")),
    )
}

/// Structured issue log. No timestamps: identical input bytes produce an
/// identical log.
pub fn report_json(report: &ValidationReport) -> Result<Vec<u8>> {
    let value = serde_json::json!({
        "pass": report.pass,
        "issues": report.records(),
    });
    serde_json::to_vec_pretty(&value).map_err(|e| Error::Serialize(e.to_string()))
}
