//! Shared application state.

use anyhow::Result;
use reportfmt_core::{ProcessOptions, StyleConfig, ValidationMode};
use std::path::PathBuf;

pub struct AppState {
    /// Style targets every request is formatted against.
    pub config: StyleConfig,
    /// Reject non-compliant reports instead of returning them.
    pub strict: bool,
    /// Where uploads are spooled for the duration of a request.
    pub upload_dir: PathBuf,
}

impl AppState {
    /// Configuration from the environment: `REPORTFMT_CONFIG` for a YAML
    /// style override, `REPORTFMT_STRICT` for the validation policy.
    pub fn from_env() -> Result<Self> {
        let config = StyleConfig::load_with_fallback(
            std::env::var("REPORTFMT_CONFIG").ok().as_deref(),
        );
        let strict = matches!(
            std::env::var("REPORTFMT_STRICT").ok().as_deref(),
            Some("1") | Some("true") | Some("yes")
        );
        Self::new(config, strict)
    }

    pub fn new(config: StyleConfig, strict: bool) -> Result<Self> {
        let upload_dir = std::env::temp_dir().join("reportfmt-uploads");
        std::fs::create_dir_all(&upload_dir)?;
        Ok(Self {
            config,
            strict,
            upload_dir,
        })
    }

    pub fn options(&self) -> ProcessOptions {
        ProcessOptions {
            validate: true,
            mode: if self.strict {
                ValidationMode::Strict
            } else {
                ValidationMode::Diagnostic
            },
        }
    }
}
