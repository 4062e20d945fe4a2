use crate::error::Result;
use serde::{Deserialize, Serialize};

// Unit conversions. The markup layer speaks twips (1/20 pt); the style
// guide speaks centimetres and points. The cm path goes through EMU the
// same way cell widths are stored on disk, so a configured width and the
// grid value written for it can never drift apart.
const EMU_PER_CM: f64 = 360_000.0;
const EMU_PER_TWIP: f64 = 635.0;

/// Convert centimetres to twips (truncating, matching the on-disk grid).
pub fn cm_to_twips(cm: f64) -> u32 {
    ((cm * EMU_PER_CM) / EMU_PER_TWIP) as u32
}

/// Convert points to the half-point units used by run sizes.
pub fn pt_to_half_points(pt: f32) -> u32 {
    (pt * 2.0).round() as u32
}

// Default value functions for serde
fn default_font_name() -> String {
    "Arial".to_string()
}

fn default_body_size_pt() -> f32 {
    9.0
}

fn default_title_size_pt() -> f32 {
    14.0
}

fn default_start_row() -> usize {
    19
}

fn default_scan_rows() -> usize {
    30
}

fn default_row_height_cm() -> f64 {
    0.37
}

fn default_column_widths_cm() -> Vec<f64> {
    vec![11.99, 1.20, 2.30, 2.30]
}

fn default_hanging_indent_cm() -> f64 {
    0.63
}

fn default_cell_margin_side() -> u32 {
    28 // twips, ≈0.05 cm
}

fn default_cell_margin_tb() -> u32 {
    0
}

/// The style guide as data. Loaded once per run and never mutated; any
/// future rule change is a configuration edit, not a code edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleConfig {
    #[serde(default)]
    pub typography: TypographyConfig,
    #[serde(default)]
    pub cover: CoverConfig,
    #[serde(default)]
    pub table: TableConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypographyConfig {
    /// Body font applied to every run outside the title.
    #[serde(default = "default_font_name")]
    pub font_name: String,
    /// Body size in points.
    #[serde(default = "default_body_size_pt")]
    pub body_size_pt: f32,
}

impl TypographyConfig {
    pub fn body_size_half_points(&self) -> u32 {
        pt_to_half_points(self.body_size_pt)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverConfig {
    /// Row (1-based) where the first visible cover line must sit.
    #[serde(default = "default_start_row")]
    pub start_row: usize,
    /// How many leading rows the cover engine classifies.
    #[serde(default = "default_scan_rows")]
    pub scan_rows: usize,
    /// Title size in points.
    #[serde(default = "default_title_size_pt")]
    pub title_size_pt: f32,
}

impl CoverConfig {
    pub fn title_size_half_points(&self) -> u32 {
        pt_to_half_points(self.title_size_pt)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    /// Minimum row height ("at least" rule).
    #[serde(default = "default_row_height_cm")]
    pub row_height_cm: f64,
    /// The fixed four-column grid, description first.
    #[serde(default = "default_column_widths_cm")]
    pub column_widths_cm: Vec<f64>,
    /// Hanging indent for wrapped description text.
    #[serde(default = "default_hanging_indent_cm")]
    pub hanging_indent_cm: f64,
    /// Left/right cell margin in twips.
    #[serde(default = "default_cell_margin_side")]
    pub cell_margin_side_twips: u32,
    /// Top/bottom cell margin in twips.
    #[serde(default = "default_cell_margin_tb")]
    pub cell_margin_tb_twips: u32,
}

impl TableConfig {
    pub fn row_height_twips(&self) -> u32 {
        cm_to_twips(self.row_height_cm)
    }

    pub fn column_widths_twips(&self) -> Vec<u32> {
        self.column_widths_cm
            .iter()
            .map(|&cm| cm_to_twips(cm))
            .collect()
    }

    pub fn hanging_indent_twips(&self) -> u32 {
        cm_to_twips(self.hanging_indent_cm)
    }

    /// Number of columns in the fixed schema.
    pub fn column_count(&self) -> usize {
        self.column_widths_cm.len()
    }
}

impl Default for TypographyConfig {
    fn default() -> Self {
        Self {
            font_name: default_font_name(),
            body_size_pt: default_body_size_pt(),
        }
    }
}

impl Default for CoverConfig {
    fn default() -> Self {
        Self {
            start_row: default_start_row(),
            scan_rows: default_scan_rows(),
            title_size_pt: default_title_size_pt(),
        }
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            row_height_cm: default_row_height_cm(),
            column_widths_cm: default_column_widths_cm(),
            hanging_indent_cm: default_hanging_indent_cm(),
            cell_margin_side_twips: default_cell_margin_side(),
            cell_margin_tb_twips: default_cell_margin_tb(),
        }
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            typography: TypographyConfig::default(),
            cover: CoverConfig::default(),
            table: TableConfig::default(),
        }
    }
}

impl StyleConfig {
    /// Load config from file path (functional approach)
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: StyleConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load config with fallback to default
    pub fn load_with_fallback(path: Option<&str>) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|_| {
                eprintln!("⚠️  Failed to load config from {}, using defaults", p);
                Self::default()
            }),
            None => Self::default(),
        }
    }
}
