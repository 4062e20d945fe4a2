//! Pipeline property tests.
//!
//! Fixtures are fabricated in memory as minimal document packages, pushed
//! through the full pipeline, and checked against the formatting
//! invariants: idempotence, blank spacing, the start row, the fixed
//! column grid and the period bolding — plus the structural-mismatch and
//! diagnostic/strict outcomes at the disk surface.

use reportfmt_core::docx::document::{
    cell_paragraphs, is_blank_paragraph, paragraph_runs, paragraph_text, row_cells, run_is_bold,
    table_rows, Document,
};
use reportfmt_core::docx::markup;
use reportfmt_core::docx::DocxPackage;
use reportfmt_core::processor::{ProcessOptions, ProcessOutcome, ReportProcessor, ValidationMode};
use reportfmt_core::rules::{CoverRule, TableRule, Validator};
use reportfmt_core::{Error, StyleConfig, ValidationIssue};

const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

// ============================================================================
// Fixture helpers
// ============================================================================

fn paragraph(text: &str) -> String {
    if text.is_empty() {
        "<w:p/>".to_string()
    } else {
        format!("<w:p><w:r><w:t>{text}</w:t></w:r></w:p>")
    }
}

fn table(grid_widths: &[u32], rows: &[Vec<&str>]) -> String {
    let grid: String = grid_widths
        .iter()
        .map(|w| format!("<w:gridCol w:w=\"{w}\"/>"))
        .collect();
    let body: String = rows
        .iter()
        .map(|cells| {
            let tcs: String = cells
                .iter()
                .map(|text| {
                    if text.is_empty() {
                        "<w:tc><w:p/></w:tc>".to_string()
                    } else {
                        format!("<w:tc><w:p><w:r><w:t>{text}</w:t></w:r></w:p></w:tc>")
                    }
                })
                .collect();
            format!("<w:tr>{tcs}</w:tr>")
        })
        .collect();
    format!("<w:tbl><w:tblPr/><w:tblGrid>{grid}</w:tblGrid>{body}</w:tbl>")
}

fn document_xml(body: &str) -> String {
    format!(r#"<w:document xmlns:w="{WML_NS}"><w:body>{body}</w:body></w:document>"#)
}

fn standard_cover() -> String {
    [
        "ACME MINING CORP. (formerly Beta Resources Inc.)",
        "Condensed Interim Financial Statements",
        "September 30, 2025",
        "(Unaudited - expressed in Canadian dollars)",
    ]
    .iter()
    .map(|line| paragraph(line))
    .collect()
}

fn standard_table_rows() -> Vec<Vec<&'static str>> {
    vec![
        vec!["Description", "Notes", "Sep 2025", "Sep 2024"],
        vec!["Cash and equivalents", "4", "1,200", "900"],
        vec!["Exploration assets", "", "5,400", "5,100"],
    ]
}

fn standard_package() -> DocxPackage {
    let body = format!(
        "{}{}",
        standard_cover(),
        table(&[9000, 9000, 9000, 9000], &standard_table_rows())
    );
    DocxPackage::from_document_xml(&document_xml(&body)).unwrap()
}

fn first_text_ordinal(doc: &Document) -> Option<usize> {
    doc.paragraphs()
        .iter()
        .position(|p| !is_blank_paragraph(p))
}

fn cell_bold_states(doc: &Document, table: usize, row: usize, column: usize) -> Vec<Option<bool>> {
    let tables = doc.tables();
    let rows = table_rows(tables[table]);
    let cells = row_cells(rows[row]);
    cell_paragraphs(cells[column])
        .iter()
        .flat_map(|p| paragraph_runs(p))
        .map(run_is_bold)
        .collect()
}

// ============================================================================
// Idempotence
// ============================================================================

mod idempotence {
    use super::*;

    #[test]
    fn second_run_yields_zero_issues_and_identical_markup() {
        let processor = ReportProcessor::default();
        let mut package = standard_package();

        processor.format_package(&mut package).unwrap();
        let first_report = processor.validate_package(&package);
        assert!(first_report.pass, "first run issues: {:#?}", first_report.issues);
        let first_markup = package.document.to_xml_bytes().unwrap();

        processor.format_package(&mut package).unwrap();
        let second_report = processor.validate_package(&package);
        assert!(second_report.pass, "second run issues: {:#?}", second_report.issues);
        let second_markup = package.document.to_xml_bytes().unwrap();

        assert_eq!(first_markup, second_markup);
    }

    #[test]
    fn bolding_converges_instead_of_toggling() {
        let processor = ReportProcessor::default();
        let mut package = standard_package();

        for _ in 0..3 {
            processor.format_package(&mut package).unwrap();
            assert_eq!(cell_bold_states(&package.document, 0, 1, 2), vec![Some(true)]);
            assert_eq!(cell_bold_states(&package.document, 0, 1, 3), vec![Some(false)]);
        }
    }
}

// ============================================================================
// Cover invariants
// ============================================================================

mod cover_invariants {
    use super::*;

    #[test]
    fn first_text_lands_on_the_configured_row() {
        let config = StyleConfig::default();
        let processor = ReportProcessor::default();

        // from too high and from too low
        for leading_blanks in [0usize, 30] {
            let mut body: String = (0..leading_blanks).map(|_| paragraph("")).collect();
            body.push_str(&standard_cover());
            let mut package = DocxPackage::from_document_xml(&document_xml(&body)).unwrap();
            processor.format_package(&mut package).unwrap();
            assert_eq!(
                first_text_ordinal(&package.document),
                Some(config.cover.start_row - 1)
            );
        }
    }

    #[test]
    fn exactly_one_blank_between_classified_sections() {
        let processor = ReportProcessor::default();

        // zero blanks between all sections, then three extra in the middle
        let body = format!(
            "{}{}{}{}{}{}{}",
            paragraph("ACME MINING CORP. (formerly Beta Resources Inc.)"),
            paragraph("Condensed Interim Financial Statements"),
            paragraph(""),
            paragraph(""),
            paragraph(""),
            paragraph("September 30, 2025"),
            paragraph("(Unaudited)"),
        );
        let mut package = DocxPackage::from_document_xml(&document_xml(&body)).unwrap();
        processor.format_package(&mut package).unwrap();

        let texts: Vec<String> = package
            .document
            .paragraphs()
            .iter()
            .map(|p| paragraph_text(p).trim().to_string())
            .collect();
        let visible: Vec<&String> = texts.iter().filter(|t| !t.is_empty()).collect();
        assert_eq!(visible.len(), 4);

        // between each pair of visible lines: exactly one blank row
        let positions: Vec<usize> = texts
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.is_empty())
            .map(|(i, _)| i)
            .collect();
        for pair in positions.windows(2) {
            assert_eq!(pair[1] - pair[0], 2, "rows {} and {} not separated by one blank", pair[0], pair[1]);
        }
    }

    #[test]
    fn period_anchored_cover_aligns_and_spaces() {
        // 5 blanks, "Q3 2025", no blank, "Unaudited"
        let config = StyleConfig::default();
        let processor = ReportProcessor::default();

        let mut body: String = (0..5).map(|_| paragraph("")).collect();
        body.push_str(&paragraph("Q3 2025"));
        body.push_str(&paragraph("Unaudited"));
        let mut package = DocxPackage::from_document_xml(&document_xml(&body)).unwrap();
        processor.format_package(&mut package).unwrap();

        let doc = &package.document;
        let q3 = first_text_ordinal(doc).unwrap();
        assert_eq!(q3, config.cover.start_row - 1);
        assert_eq!(paragraph_text(doc.paragraphs()[q3]).trim(), "Q3 2025");
        assert!(is_blank_paragraph(doc.paragraphs()[q3 + 1]));
        assert_eq!(paragraph_text(doc.paragraphs()[q3 + 2]).trim(), "Unaudited");

        // no title anywhere — the validator reports it instead of the
        // engine guessing one
        let report = processor.validate_package(&package);
        assert!(report
            .issues
            .iter()
            .any(|i| matches!(i, ValidationIssue::MissingTitle)));
    }
}

// ============================================================================
// Table invariants
// ============================================================================

mod table_invariants {
    use super::*;

    #[test]
    fn grid_is_rewritten_regardless_of_starting_widths() {
        let config = StyleConfig::default();
        let processor = ReportProcessor::default();
        let expected = config.table.column_widths_twips();

        for starting in [[20000u32, 20000, 20000, 20000], [10, 10, 10, 10]] {
            let body = format!(
                "{}{}",
                standard_cover(),
                table(&starting, &standard_table_rows())
            );
            let mut package = DocxPackage::from_document_xml(&document_xml(&body)).unwrap();
            processor.format_package(&mut package).unwrap();
            let tables = package.document.tables();
            assert_eq!(markup::column_grid(tables[0]), expected);
        }
    }

    #[test]
    fn dated_headers_bold_current_and_unbold_prior() {
        let processor = ReportProcessor::default();
        let mut package = standard_package();
        processor.format_package(&mut package).unwrap();

        let config = StyleConfig::default();
        let doc = &package.document;
        for row in 1..=2 {
            for state in cell_bold_states(doc, 0, row, 2) {
                assert_eq!(state, Some(true), "current-period row {row} not bold");
            }
            // row 2 has an empty notes cell; bold states only exist where
            // runs do
            for state in cell_bold_states(doc, 0, row, 3) {
                assert_eq!(state, Some(false), "prior-period row {row} still bold");
            }
        }
        let tables = doc.tables();
        assert_eq!(
            markup::column_grid(tables[0]),
            config.table.column_widths_twips()
        );
    }

    #[test]
    fn five_column_table_raises_structural_mismatch() {
        let processor = ReportProcessor::default();
        let body = format!(
            "{}{}",
            standard_cover(),
            table(
                &[3000, 3000, 3000, 3000, 3000],
                &[vec!["a", "b", "c", "d", "e"]],
            )
        );
        let mut package = DocxPackage::from_document_xml(&document_xml(&body)).unwrap();

        match processor.format_package(&mut package) {
            Err(Error::TableShape { columns: 5, expected: 4, .. }) => {}
            other => panic!("expected TableShape error, got {other:?}"),
        }
        // the mismatched grid was left untouched
        let tables = package.document.tables();
        assert_eq!(markup::column_grid(tables[0]).len(), 5);
    }
}

// ============================================================================
// Validator behavior
// ============================================================================

mod validator_behavior {
    use super::*;

    #[test]
    fn untouched_noncompliant_document_is_itemized_not_mutated() {
        let config = StyleConfig::default();
        let package = standard_package();
        let before = package.document.to_xml_bytes().unwrap();

        let report = Validator::new(&config).validate(&package.document);
        assert!(!report.pass);

        // one issue per deviating attribute family
        let rules: Vec<&str> = report.issues.iter().map(|i| i.rule()).collect();
        for expected in [
            "cover-start-row",
            "cover-title-style",
            "table-column-width",
            "table-cell-margins",
            "table-row-height",
            "table-hanging-indent",
            "table-period-bold",
        ] {
            assert!(rules.contains(&expected), "missing {expected} in {rules:?}");
        }

        let after = package.document.to_xml_bytes().unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn shared_classifier_keeps_engines_and_validator_in_agreement() {
        // Format, then validate: any disagreement between the two sides
        // would surface as a residual issue here.
        let config = StyleConfig::default();
        let mut package = standard_package();
        CoverRule::new(&config).apply(&mut package.document).unwrap();
        TableRule::new(&config).apply(&mut package.document).unwrap();
        package.normalize_base_style(&config);

        let report = Validator::new(&config).validate(&package.document);
        assert!(report.pass, "residual issues: {:#?}", report.issues);
    }
}

// ============================================================================
// Disk surface: outcomes and artifacts
// ============================================================================

mod disk_surface {
    use super::*;

    #[test]
    fn compliant_input_round_trips_to_a_clean_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("report.docx");
        let output = dir.path().join("report_processed.docx");

        standard_package().save(&input).unwrap();

        let processor = ReportProcessor::default();
        let outcome = processor
            .process_path(&input, &output, &ProcessOptions::default())
            .unwrap();

        match outcome {
            ProcessOutcome::Clean { output: path } => {
                assert!(path.exists());
                // and the artifact reloads as a compliant document
                let reloaded = DocxPackage::open(&path).unwrap();
                let report = processor.validate_package(&reloaded);
                assert!(report.pass, "reloaded issues: {:#?}", report.issues);
            }
            other => panic!("expected Clean outcome, got {other:?}"),
        }
    }

    #[test]
    fn diagnostic_mode_keeps_the_artifact_and_the_log() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("untitled.docx");
        let output = dir.path().join("untitled_processed.docx");

        // no title line anywhere → validation must fail
        let body = format!("{}{}", paragraph("September 30, 2025"), paragraph("(Unaudited)"));
        DocxPackage::from_document_xml(&document_xml(&body))
            .unwrap()
            .save(&input)
            .unwrap();

        let outcome = ReportProcessor::default()
            .process_path(&input, &output, &ProcessOptions::default())
            .unwrap();

        match outcome {
            ProcessOutcome::Issues {
                output,
                report_path,
                report,
            } => {
                assert!(output.ends_with("untitled_processed_WITH_ISSUES.docx"));
                assert!(output.exists());
                assert!(report_path.exists());
                assert!(!report.pass);
                let log = std::fs::read_to_string(&report_path).unwrap();
                assert!(log.contains("cover-title-present"));
            }
            other => panic!("expected Issues outcome, got {other:?}"),
        }
        assert!(!output.exists(), "primary artifact must not be written on failure");
    }

    #[test]
    fn strict_mode_refuses_the_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("untitled.docx");
        let output = dir.path().join("untitled_processed.docx");

        let body = paragraph("September 30, 2025");
        DocxPackage::from_document_xml(&document_xml(&body))
            .unwrap()
            .save(&input)
            .unwrap();

        let options = ProcessOptions {
            validate: true,
            mode: ValidationMode::Strict,
        };
        let outcome = ReportProcessor::default()
            .process_path(&input, &output, &options)
            .unwrap();

        match outcome {
            ProcessOutcome::Rejected { report } => assert!(!report.pass),
            other => panic!("expected Rejected outcome, got {other:?}"),
        }
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| name != "untitled.docx")
            .collect();
        assert!(leftovers.is_empty(), "strict mode wrote {leftovers:?}");
    }

    #[test]
    fn load_error_aborts_before_any_rule_runs() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("not_a_report.docx");
        let output = dir.path().join("out.docx");
        std::fs::write(&input, b"these are not document bytes").unwrap();

        let result = ReportProcessor::default().process_path(
            &input,
            &output,
            &ProcessOptions::default(),
        );
        assert!(matches!(result, Err(Error::Package(_))));
        assert!(!output.exists());
    }
}
