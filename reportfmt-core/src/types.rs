use serde::{Deserialize, Serialize};

// ===== SEMANTIC CLASSIFICATION TYPES =====
// Closed tagged variants with a fixed resolution priority. Both the rule
// engines and the validator classify through the same code in
// `rules::classify`, so the two sides can never disagree about what a
// paragraph or column *is*.

/// Semantic classification of a cover-page paragraph.
///
/// Resolution priority when a paragraph could match more than one pattern,
/// fixed: Title > FormerlyName > FinancialStatementType > Period >
/// UnauditedNotice. Empty paragraphs are Blank; unmatched non-empty
/// paragraphs are Other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Section {
    /// Company title line, optionally carrying a "(formerly …)" tail.
    Title,
    /// A standalone "(formerly …)" line below the title.
    FormerlyName,
    /// The "… Financial Statements" line.
    FinancialStatementType,
    /// The reporting period line (month or quarter plus a year).
    Period,
    /// The "(Unaudited …)" / "(Expressed in …)" notice line.
    UnauditedNotice,
    /// No visible text.
    Blank,
    /// Visible text matching none of the known patterns.
    Other,
}

impl Section {
    pub fn label(&self) -> &'static str {
        match self {
            Section::Title => "Title",
            Section::FormerlyName => "FormerlyName",
            Section::FinancialStatementType => "FinancialStatementType",
            Section::Period => "Period",
            Section::UnauditedNotice => "UnauditedNotice",
            Section::Blank => "Blank",
            Section::Other => "Other",
        }
    }
}

/// Semantic classification of a statement-table column, derived once per
/// table from the header row and never stored in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnRole {
    /// Line-item description text (always column 0).
    Description,
    /// Comparative figures for the earlier period — forced un-bold.
    PriorPeriod,
    /// Figures for the latest period — forced bold.
    CurrentPeriod,
    /// Anything else (note references, spacers).
    Other,
}

impl ColumnRole {
    pub fn label(&self) -> &'static str {
        match self {
            ColumnRole::Description => "Description",
            ColumnRole::PriorPeriod => "PriorPeriod",
            ColumnRole::CurrentPeriod => "CurrentPeriod",
            ColumnRole::Other => "Other",
        }
    }
}

// ===== VALIDATION TYPES =====

/// A single detected deviation from the style guide.
///
/// Issues are data, never control flow: the validator collects them in
/// document order and the pipeline decides afterwards what to do with the
/// report. Paragraph and row indices are 0-based; the human-readable
/// rendering in [`ValidationIssue::record`] converts to 1-based rows the
/// way proofreaders count them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ValidationIssue {
    /// No cover paragraph classified as Title — the vertical-offset rule
    /// had no anchor to certify.
    MissingTitle,
    /// The first visible cover line does not sit on the configured row.
    CoverStartRow { expected: usize, observed: usize },
    /// Title line style mismatch.
    TitleStyle {
        paragraph: usize,
        bold: bool,
        title_size: bool,
        centered: bool,
    },
    /// Statement-type line must be bold with Each Word Capitalized.
    StatementStyle {
        paragraph: usize,
        bold: bool,
        title_case: bool,
    },
    /// Period line must be bold.
    PeriodStyle { paragraph: usize, bold: bool },
    /// Unaudited notice must be un-bold and sentence case.
    UnauditedStyle {
        paragraph: usize,
        bold: bool,
        sentence_case: bool,
    },
    /// Consecutive classified sections must be separated by exactly one
    /// blank paragraph.
    BlankSpacing {
        paragraph: usize,
        section: Section,
        observed: usize,
    },
    /// Table does not match the fixed four-column schema.
    TableShape { table: usize, columns: usize },
    /// A grid column width differs from the configured value.
    ColumnWidth {
        table: usize,
        column: usize,
        expected_twips: u32,
        observed_twips: u32,
    },
    /// Table cell margins are absent or differ from the configured values.
    CellMargins {
        table: usize,
        expected_side: u32,
        expected_tb: u32,
        observed: Option<(u32, u32)>,
    },
    /// A row is shorter than the configured minimum height.
    RowHeight {
        table: usize,
        row: usize,
        expected_twips: u32,
        observed_twips: Option<u32>,
    },
    /// Description-column text is missing the configured hanging indent.
    HangingIndent {
        table: usize,
        row: usize,
        expected_twips: u32,
        observed_left: Option<u32>,
        observed_hanging: Option<u32>,
    },
    /// A period-column cell has the wrong bold state for its role.
    BoldState {
        table: usize,
        row: usize,
        column: usize,
        role: ColumnRole,
        expected_bold: bool,
    },
    /// A body run is not in the configured body font.
    ParagraphFont {
        paragraph: usize,
        preview: String,
        observed_name: Option<String>,
        observed_size: Option<u32>,
    },
    /// A table-cell run is not in the configured body font.
    CellFont {
        table: usize,
        row: usize,
        column: usize,
        preview: String,
        observed_name: Option<String>,
        observed_size: Option<u32>,
    },
}

impl ValidationIssue {
    /// Stable rule name, used in reports and logs.
    pub fn rule(&self) -> &'static str {
        match self {
            ValidationIssue::MissingTitle => "cover-title-present",
            ValidationIssue::CoverStartRow { .. } => "cover-start-row",
            ValidationIssue::TitleStyle { .. } => "cover-title-style",
            ValidationIssue::StatementStyle { .. } => "cover-statement-style",
            ValidationIssue::PeriodStyle { .. } => "cover-period-style",
            ValidationIssue::UnauditedStyle { .. } => "cover-unaudited-style",
            ValidationIssue::BlankSpacing { .. } => "cover-blank-spacing",
            ValidationIssue::TableShape { .. } => "table-shape",
            ValidationIssue::ColumnWidth { .. } => "table-column-width",
            ValidationIssue::CellMargins { .. } => "table-cell-margins",
            ValidationIssue::RowHeight { .. } => "table-row-height",
            ValidationIssue::HangingIndent { .. } => "table-hanging-indent",
            ValidationIssue::BoldState { .. } => "table-period-bold",
            ValidationIssue::ParagraphFont { .. } => "body-font",
            ValidationIssue::CellFont { .. } => "body-font",
        }
    }

    /// Flatten into a location / rule / expected / observed record for the
    /// structured issue log.
    pub fn record(&self) -> IssueRecord {
        let (location, expected, observed) = match self {
            ValidationIssue::MissingTitle => (
                "cover".to_string(),
                "a Title-classified paragraph".to_string(),
                "none".to_string(),
            ),
            ValidationIssue::CoverStartRow { expected, observed } => (
                "cover".to_string(),
                format!("first text on row {expected}"),
                format!("first text on row {observed}"),
            ),
            ValidationIssue::TitleStyle {
                paragraph,
                bold,
                title_size,
                centered,
            } => (
                format!("cover row {}", paragraph + 1),
                "bold, title size, centered".to_string(),
                format!("bold={bold}, title_size={title_size}, centered={centered}"),
            ),
            ValidationIssue::StatementStyle {
                paragraph,
                bold,
                title_case,
            } => (
                format!("cover row {}", paragraph + 1),
                "bold, Each Word Capitalized".to_string(),
                format!("bold={bold}, title_case={title_case}"),
            ),
            ValidationIssue::PeriodStyle { paragraph, bold } => (
                format!("cover row {}", paragraph + 1),
                "bold".to_string(),
                format!("bold={bold}"),
            ),
            ValidationIssue::UnauditedStyle {
                paragraph,
                bold,
                sentence_case,
            } => (
                format!("cover row {}", paragraph + 1),
                "un-bold, sentence case".to_string(),
                format!("bold={bold}, sentence_case={sentence_case}"),
            ),
            ValidationIssue::BlankSpacing {
                paragraph,
                section,
                observed,
            } => (
                format!("cover row {} ({})", paragraph + 1, section.label()),
                "exactly 1 blank row before the next section".to_string(),
                format!("{observed} blank rows"),
            ),
            ValidationIssue::TableShape { table, columns } => (
                format!("table {}", table + 1),
                "4 columns".to_string(),
                format!("{columns} columns"),
            ),
            ValidationIssue::ColumnWidth {
                table,
                column,
                expected_twips,
                observed_twips,
            } => (
                format!("table {}, column {}", table + 1, column + 1),
                format!("{expected_twips} twips"),
                format!("{observed_twips} twips"),
            ),
            ValidationIssue::CellMargins {
                table,
                expected_side,
                expected_tb,
                observed,
            } => (
                format!("table {}", table + 1),
                format!("margins {expected_side}/{expected_tb} twips (side/tb)"),
                match observed {
                    Some((side, tb)) => format!("margins {side}/{tb} twips"),
                    None => "no cell margins set".to_string(),
                },
            ),
            ValidationIssue::RowHeight {
                table,
                row,
                expected_twips,
                observed_twips,
            } => (
                format!("table {}, row {}", table + 1, row + 1),
                format!("at least {expected_twips} twips"),
                match observed_twips {
                    Some(h) => format!("{h} twips"),
                    None => "no height set".to_string(),
                },
            ),
            ValidationIssue::HangingIndent {
                table,
                row,
                expected_twips,
                observed_left,
                observed_hanging,
            } => (
                format!("table {}, row {}, column 1", table + 1, row + 1),
                format!("left={expected_twips}, hanging={expected_twips} twips"),
                format!(
                    "left={}, hanging={}",
                    observed_left.map_or("none".to_string(), |v| v.to_string()),
                    observed_hanging.map_or("none".to_string(), |v| v.to_string()),
                ),
            ),
            ValidationIssue::BoldState {
                table,
                row,
                column,
                role,
                expected_bold,
            } => (
                format!(
                    "table {}, row {}, column {} ({})",
                    table + 1,
                    row + 1,
                    column + 1,
                    role.label()
                ),
                format!("bold={expected_bold}"),
                format!("bold={}", !expected_bold),
            ),
            ValidationIssue::ParagraphFont {
                paragraph,
                preview,
                observed_name,
                observed_size,
            } => (
                format!("paragraph {} (\"{}\")", paragraph + 1, preview),
                "configured body font".to_string(),
                format!(
                    "name={}, size={}",
                    observed_name.as_deref().unwrap_or("inherited"),
                    observed_size.map_or("inherited".to_string(), |s| format!("{s} half-points")),
                ),
            ),
            ValidationIssue::CellFont {
                table,
                row,
                column,
                preview,
                observed_name,
                observed_size,
            } => (
                format!(
                    "table {}, row {}, column {} (\"{}\")",
                    table + 1,
                    row + 1,
                    column + 1,
                    preview
                ),
                "configured body font".to_string(),
                format!(
                    "name={}, size={}",
                    observed_name.as_deref().unwrap_or("inherited"),
                    observed_size.map_or("inherited".to_string(), |s| format!("{s} half-points")),
                ),
            ),
        };

        IssueRecord {
            location,
            rule: self.rule().to_string(),
            expected,
            observed,
        }
    }
}

/// Flattened issue entry: where, which rule, what was expected, what was
/// seen. This is the row format of the structured issue log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueRecord {
    pub location: String,
    pub rule: String,
    pub expected: String,
    pub observed: String,
}

/// Outcome of a validation pass over a processed document.
///
/// Given identical input bytes the report is byte-for-byte reproducible:
/// issues are ordered by document position and carry no timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub pass: bool,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn new(issues: Vec<ValidationIssue>) -> Self {
        Self {
            pass: issues.is_empty(),
            issues,
        }
    }

    /// Flattened records for the structured issue log.
    pub fn records(&self) -> Vec<IssueRecord> {
        self.issues.iter().map(|i| i.record()).collect()
    }
}
