//! Post-formatting validation.
//!
//! Re-walks the document with the same classifier the rule engines used
//! and compares every observed attribute against the configured targets.
//! The validator never mutates the document, and its report is
//! reproducible byte-for-byte for identical input: issues are collected in
//! document order and carry no timestamps.

use crate::config::{cm_to_twips, StyleConfig};
use crate::docx::document::{
    cell_paragraphs, cell_text, paragraph_alignment, paragraph_runs, paragraph_text, row_cells,
    run_font_name, run_is_bold, run_size_half_points, run_text, table_column_count, table_rows,
    Document,
};
use crate::docx::markup;
use crate::docx::xml::XmlElement;
use crate::rules::classify::{
    assign_column_roles, classify_section, is_sentence_case, is_title_case,
};
use crate::rules::table::header_texts;
use crate::types::{ColumnRole, Section, ValidationIssue, ValidationReport};

/// Width comparison tolerance (0.1 cm) — absorbs unit-conversion rounding
/// in documents produced by other tooling.
fn width_tolerance_twips() -> u32 {
    cm_to_twips(0.1)
}

pub struct Validator<'a> {
    config: &'a StyleConfig,
}

impl<'a> Validator<'a> {
    pub fn new(config: &'a StyleConfig) -> Self {
        Self { config }
    }

    pub fn validate(&self, doc: &Document) -> ValidationReport {
        let mut issues = Vec::new();
        let title_ordinal = self.check_cover(doc, &mut issues);
        self.check_tables(doc, &mut issues);
        self.check_fonts(doc, title_ordinal, &mut issues);
        ValidationReport::new(issues)
    }

    /// Cover checks. Returns the Title paragraph ordinal so the global
    /// font pass can exempt its larger size.
    fn check_cover(&self, doc: &Document, issues: &mut Vec<ValidationIssue>) -> Option<usize> {
        let paragraphs = doc.paragraphs();
        let texts: Vec<String> = paragraphs
            .iter()
            .map(|p| paragraph_text(p).trim().to_string())
            .collect();

        if let Some(first) = texts.iter().position(|t| !t.is_empty()) {
            if first != self.config.cover.start_row - 1 {
                issues.push(ValidationIssue::CoverStartRow {
                    expected: self.config.cover.start_row,
                    observed: first + 1,
                });
            }
        }

        let window = self.config.cover.scan_rows.min(paragraphs.len());
        let classified: Vec<(usize, Section)> = (0..window)
            .filter_map(|i| {
                let section = classify_section(&texts[i]);
                (!matches!(section, Section::Blank | Section::Other)).then_some((i, section))
            })
            .collect();

        if !classified.iter().any(|(_, s)| *s == Section::Title) {
            issues.push(ValidationIssue::MissingTitle);
        }

        let mut title_ordinal = None;
        for &(i, section) in &classified {
            let paragraph = paragraphs[i];
            match section {
                Section::Title => {
                    if title_ordinal.is_none() {
                        title_ordinal = Some(i);
                    }
                    self.check_title_style(i, paragraph, issues);
                }
                Section::FinancialStatementType => {
                    self.check_statement_style(i, paragraph, &texts[i], issues);
                }
                Section::Period => {
                    self.check_period_style(i, paragraph, issues);
                }
                Section::UnauditedNotice => {
                    self.check_unaudited_style(i, paragraph, &texts[i], issues);
                }
                Section::FormerlyName => {}
                Section::Blank | Section::Other => unreachable!("filtered above"),
            }
        }

        // Exactly one blank row between consecutive classified sections.
        for pair in classified.windows(2) {
            let (a, section) = pair[0];
            let (b, _) = pair[1];
            let blanks = texts[a + 1..b].iter().filter(|t| t.is_empty()).count();
            if b - a - 1 != 1 || blanks != 1 {
                issues.push(ValidationIssue::BlankSpacing {
                    paragraph: a,
                    section,
                    observed: blanks,
                });
            }
        }

        title_ordinal
    }

    fn check_title_style(
        &self,
        ordinal: usize,
        paragraph: &XmlElement,
        issues: &mut Vec<ValidationIssue>,
    ) {
        let runs: Vec<_> = paragraph_runs(paragraph)
            .into_iter()
            .filter(|r| !run_text(r).trim().is_empty())
            .collect();

        let bold = !runs.is_empty() && runs.iter().all(|r| run_is_bold(r) == Some(true));
        let title_size = runs
            .iter()
            .any(|r| run_size_half_points(r) == Some(self.config.cover.title_size_half_points()));
        let centered = paragraph_alignment(paragraph) == Some("center");

        if !(bold && title_size && centered) {
            issues.push(ValidationIssue::TitleStyle {
                paragraph: ordinal,
                bold,
                title_size,
                centered,
            });
        }
    }

    fn check_statement_style(
        &self,
        ordinal: usize,
        paragraph: &XmlElement,
        text: &str,
        issues: &mut Vec<ValidationIssue>,
    ) {
        let bold = paragraph_runs(paragraph)
            .iter()
            .any(|r| run_is_bold(r) == Some(true));
        let title_case = is_title_case(text);
        if !(bold && title_case) {
            issues.push(ValidationIssue::StatementStyle {
                paragraph: ordinal,
                bold,
                title_case,
            });
        }
    }

    fn check_period_style(
        &self,
        ordinal: usize,
        paragraph: &XmlElement,
        issues: &mut Vec<ValidationIssue>,
    ) {
        let bold = paragraph_runs(paragraph)
            .iter()
            .any(|r| run_is_bold(r) == Some(true));
        if !bold {
            issues.push(ValidationIssue::PeriodStyle {
                paragraph: ordinal,
                bold,
            });
        }
    }

    fn check_unaudited_style(
        &self,
        ordinal: usize,
        paragraph: &XmlElement,
        text: &str,
        issues: &mut Vec<ValidationIssue>,
    ) {
        let bold = paragraph_runs(paragraph)
            .iter()
            .any(|r| run_is_bold(r) == Some(true));
        let sentence_case = is_sentence_case(text);
        if bold || !sentence_case {
            issues.push(ValidationIssue::UnauditedStyle {
                paragraph: ordinal,
                bold,
                sentence_case,
            });
        }
    }

    fn check_tables(&self, doc: &Document, issues: &mut Vec<ValidationIssue>) {
        let expected_columns = self.config.table.column_count();
        let expected_widths = self.config.table.column_widths_twips();
        let tolerance = width_tolerance_twips();

        for (t, table) in doc.tables().iter().enumerate() {
            let columns = table_column_count(table);
            if columns != expected_columns {
                issues.push(ValidationIssue::TableShape { table: t, columns });
                continue;
            }

            // Column widths: the grid is authoritative; fall back to the
            // first row's explicit cell widths when no grid is present.
            let observed_widths = {
                let grid = markup::column_grid(table);
                if grid.len() == expected_columns {
                    grid
                } else {
                    table_rows(table)
                        .first()
                        .map(|row| {
                            row_cells(row)
                                .iter()
                                .map(|c| markup::cell_width(c).unwrap_or(0))
                                .collect()
                        })
                        .unwrap_or_default()
                }
            };
            for (c, &expected) in expected_widths.iter().enumerate() {
                let observed = observed_widths.get(c).copied().unwrap_or(0);
                if expected.abs_diff(observed) > tolerance {
                    issues.push(ValidationIssue::ColumnWidth {
                        table: t,
                        column: c,
                        expected_twips: expected,
                        observed_twips: observed,
                    });
                }
            }

            let expected_side = self.config.table.cell_margin_side_twips;
            let expected_tb = self.config.table.cell_margin_tb_twips;
            match markup::cell_margins(table) {
                Some((side, tb)) if side == expected_side && tb == expected_tb => {}
                observed => issues.push(ValidationIssue::CellMargins {
                    table: t,
                    expected_side,
                    expected_tb,
                    observed,
                }),
            }

            // Row heights: report the first offending row, not a flood.
            let expected_height = self.config.table.row_height_twips();
            for (r, row) in table_rows(table).iter().enumerate() {
                let observed = markup::row_height(row);
                if !matches!(observed, Some(h) if h >= expected_height) {
                    issues.push(ValidationIssue::RowHeight {
                        table: t,
                        row: r,
                        expected_twips: expected_height,
                        observed_twips: observed,
                    });
                    break;
                }
            }

            self.check_hanging_indent(t, table, issues);
            self.check_period_bolding(t, table, issues);
        }
    }

    /// First data row with description text carries the indent check for
    /// the whole table.
    fn check_hanging_indent(
        &self,
        t: usize,
        table: &XmlElement,
        issues: &mut Vec<ValidationIssue>,
    ) {
        let expected = self.config.table.hanging_indent_twips();
        let tolerance = width_tolerance_twips();

        for (r, row) in table_rows(table).iter().enumerate().skip(1) {
            let Some(cell) = row_cells(row).first().copied() else {
                continue;
            };
            if cell_text(cell).trim().is_empty() {
                continue;
            }
            let Some(paragraph) = cell_paragraphs(cell).first().copied() else {
                continue;
            };

            let observed = markup::hanging_indent(paragraph);
            let ok = matches!(
                observed,
                Some((left, hanging))
                    if left.abs_diff(expected) <= tolerance && hanging.abs_diff(expected) <= tolerance
            );
            if !ok {
                let (observed_left, observed_hanging) = match observed {
                    Some((l, h)) => (Some(l), Some(h)),
                    None => (None, None),
                };
                issues.push(ValidationIssue::HangingIndent {
                    table: t,
                    row: r,
                    expected_twips: expected,
                    observed_left,
                    observed_hanging,
                });
            }
            break;
        }
    }

    fn check_period_bolding(
        &self,
        t: usize,
        table: &XmlElement,
        issues: &mut Vec<ValidationIssue>,
    ) {
        let roles = assign_column_roles(&header_texts(table, self.config.table.column_count()));

        for (r, row) in table_rows(table).iter().enumerate().skip(1) {
            for (c, cell) in row_cells(row).iter().enumerate() {
                let (role, expected_bold) = match roles.get(c) {
                    Some(ColumnRole::CurrentPeriod) => (ColumnRole::CurrentPeriod, true),
                    Some(ColumnRole::PriorPeriod) => (ColumnRole::PriorPeriod, false),
                    _ => continue,
                };
                if cell_text(cell).trim().is_empty() {
                    continue;
                }

                let compliant = cell_paragraphs(cell)
                    .iter()
                    .flat_map(|p| paragraph_runs(p))
                    .filter(|run| !run_text(run).trim().is_empty())
                    .all(|run| (run_is_bold(run) == Some(true)) == expected_bold);
                if !compliant {
                    issues.push(ValidationIssue::BoldState {
                        table: t,
                        row: r,
                        column: c,
                        role,
                        expected_bold,
                    });
                }
            }
        }
    }

    /// Global font pass: every visible run outside the title must carry
    /// the body font name; sizes are only checked where explicitly set,
    /// since inherited sizes resolve through the package's base style.
    fn check_fonts(
        &self,
        doc: &Document,
        title_ordinal: Option<usize>,
        issues: &mut Vec<ValidationIssue>,
    ) {
        let font = self.config.typography.font_name.as_str();
        let size = self.config.typography.body_size_half_points();

        for (i, paragraph) in doc.paragraphs().iter().enumerate() {
            if Some(i) == title_ordinal {
                continue;
            }
            let text = paragraph_text(paragraph);
            let text = text.trim();
            if text.is_empty() {
                continue;
            }

            for run in paragraph_runs(paragraph) {
                if run_text(run).trim().is_empty() {
                    continue;
                }
                let observed_name = run_font_name(run);
                let observed_size = run_size_half_points(run);
                let name_bad = observed_name != Some(font);
                let size_bad = matches!(observed_size, Some(s) if s != size);
                if name_bad || size_bad {
                    issues.push(ValidationIssue::ParagraphFont {
                        paragraph: i,
                        preview: preview(text, 30),
                        observed_name: observed_name.map(str::to_string),
                        observed_size,
                    });
                    break; // one report per paragraph is enough
                }
            }
        }

        for (t, table) in doc.tables().iter().enumerate() {
            for (r, row) in table_rows(table).iter().enumerate() {
                for (c, cell) in row_cells(row).iter().enumerate() {
                    'cell: for paragraph in cell_paragraphs(cell) {
                        let text = paragraph_text(paragraph);
                        let text = text.trim();
                        if text.is_empty() {
                            continue;
                        }
                        for run in paragraph_runs(paragraph) {
                            if run_text(run).trim().is_empty() {
                                continue;
                            }
                            let observed_name = run_font_name(run);
                            let observed_size = run_size_half_points(run);
                            let name_bad = observed_name != Some(font);
                            let size_bad = matches!(observed_size, Some(s) if s != size);
                            if name_bad || size_bad {
                                issues.push(ValidationIssue::CellFont {
                                    table: t,
                                    row: r,
                                    column: c,
                                    preview: preview(text, 20),
                                    observed_name: observed_name.map(str::to_string),
                                    observed_size,
                                });
                                break 'cell;
                            }
                        }
                    }
                }
            }
        }
    }
}

fn preview(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}

/// Console rendering of a report, one PASS/FAIL line per finding.
pub fn print_report(report: &ValidationReport) {
    if report.pass {
        println!("✅ [PASS] Document complies with the style guide");
        return;
    }
    println!("❌ Validation found {} issue(s):", report.issues.len());
    for issue in &report.issues {
        let record = issue.record();
        println!(
            "   [FAIL] {} — {}: expected {}, observed {}",
            record.rule, record.location, record.expected, record.observed
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::cover::CoverRule;
    use crate::rules::table::TableRule;

    const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

    fn parse_doc(body: &str) -> Document {
        Document::parse(&format!(
            r#"<w:document xmlns:w="{WML_NS}"><w:body>{body}</w:body></w:document>"#
        ))
        .unwrap()
    }

    fn cover_body(start_row: usize) -> String {
        let mut body = String::new();
        for _ in 0..start_row - 1 {
            body.push_str("<w:p/>");
        }
        body.push_str("<w:p><w:r><w:t>ACME CORP (formerly Beta Inc.)</w:t></w:r></w:p>");
        body.push_str("<w:p/>");
        body.push_str("<w:p><w:r><w:t>Condensed Interim Financial Statements</w:t></w:r></w:p>");
        body.push_str("<w:p/>");
        body.push_str("<w:p><w:r><w:t>September 30, 2025</w:t></w:r></w:p>");
        body.push_str("<w:p/>");
        body.push_str("<w:p><w:r><w:t>(Unaudited - expressed in canadian dollars)</w:t></w:r></w:p>");
        body
    }

    #[test]
    fn untouched_noncompliant_document_fails_without_mutation() {
        let config = StyleConfig::default();
        let validator = Validator::new(&config);
        let doc = parse_doc(&cover_body(1)); // text starts on row 1, nothing styled
        let before = doc.clone();

        let report = validator.validate(&doc);
        assert!(!report.pass);
        assert!(report
            .issues
            .iter()
            .any(|i| matches!(i, ValidationIssue::CoverStartRow { observed: 1, .. })));
        assert!(report
            .issues
            .iter()
            .any(|i| matches!(i, ValidationIssue::TitleStyle { .. })));
        // the validator never mutates
        assert_eq!(before.root(), doc.root());
    }

    #[test]
    fn formatted_cover_passes_cover_checks() {
        let config = StyleConfig::default();
        let mut doc = parse_doc(&cover_body(1));
        CoverRule::new(&config).apply(&mut doc).unwrap();

        let report = Validator::new(&config).validate(&doc);
        for issue in &report.issues {
            assert!(
                !matches!(
                    issue,
                    ValidationIssue::MissingTitle
                        | ValidationIssue::TitleStyle { .. }
                        | ValidationIssue::BlankSpacing { .. }
                ),
                "unexpected cover issue: {issue:?}"
            );
        }
    }

    #[test]
    fn missing_title_is_reported() {
        let config = StyleConfig::default();
        let doc = parse_doc("<w:p><w:r><w:t>September 30, 2025</w:t></w:r></w:p>");
        let report = Validator::new(&config).validate(&doc);
        assert!(report
            .issues
            .iter()
            .any(|i| matches!(i, ValidationIssue::MissingTitle)));
    }

    #[test]
    fn wrong_widths_and_margins_are_itemized() {
        let config = StyleConfig::default();
        let body = "<w:tbl><w:tblPr/><w:tblGrid>\
             <w:gridCol w:w=\"9000\"/><w:gridCol w:w=\"680\"/>\
             <w:gridCol w:w=\"1303\"/><w:gridCol w:w=\"1303\"/></w:tblGrid>\
             <w:tr><w:tc><w:p><w:r><w:t>Description</w:t></w:r></w:p></w:tc>\
             <w:tc><w:p/></w:tc><w:tc><w:p/></w:tc><w:tc><w:p/></w:tc></w:tr></w:tbl>";
        let doc = parse_doc(body);
        let report = Validator::new(&config).validate(&doc);

        assert!(report.issues.iter().any(|i| matches!(
            i,
            ValidationIssue::ColumnWidth { column: 0, observed_twips: 9000, .. }
        )));
        // only the deviating column is reported
        assert!(!report
            .issues
            .iter()
            .any(|i| matches!(i, ValidationIssue::ColumnWidth { column: 1, .. })));
        assert!(report
            .issues
            .iter()
            .any(|i| matches!(i, ValidationIssue::CellMargins { observed: None, .. })));
    }

    #[test]
    fn validation_is_reproducible() {
        let config = StyleConfig::default();
        let doc = parse_doc(&cover_body(1));
        let validator = Validator::new(&config);

        let first = serde_json::to_string(&validator.validate(&doc)).unwrap();
        for _ in 0..5 {
            let again = serde_json::to_string(&validator.validate(&doc)).unwrap();
            assert_eq!(first, again);
        }
    }

    #[test]
    fn fully_formatted_document_yields_zero_issues() {
        let config = StyleConfig::default();
        let table = "<w:tbl><w:tblPr/><w:tblGrid>\
             <w:gridCol w:w=\"6797\"/><w:gridCol w:w=\"680\"/>\
             <w:gridCol w:w=\"1303\"/><w:gridCol w:w=\"1303\"/></w:tblGrid>\
             <w:tr><w:tc><w:p><w:r><w:t>Description</w:t></w:r></w:p></w:tc>\
             <w:tc><w:p><w:r><w:t>Notes</w:t></w:r></w:p></w:tc>\
             <w:tc><w:p><w:r><w:t>Sep 2025</w:t></w:r></w:p></w:tc>\
             <w:tc><w:p><w:r><w:t>Sep 2024</w:t></w:r></w:p></w:tc></w:tr>\
             <w:tr><w:tc><w:p><w:r><w:t>Cash</w:t></w:r></w:p></w:tc>\
             <w:tc><w:p><w:r><w:t>4</w:t></w:r></w:p></w:tc>\
             <w:tc><w:p><w:r><w:t>1,200</w:t></w:r></w:p></w:tc>\
             <w:tc><w:p><w:r><w:t>900</w:t></w:r></w:p></w:tc></w:tr></w:tbl>";
        let body = format!("{}{}", cover_body(StyleConfig::default().cover.start_row), table);
        let mut doc = parse_doc(&body);

        CoverRule::new(&config).apply(&mut doc).unwrap();
        TableRule::new(&config).apply(&mut doc).unwrap();

        let report = Validator::new(&config).validate(&doc);
        assert!(report.pass, "unexpected issues: {:#?}", report.issues);
    }
}
