//! Cover page rule engine.
//!
//! Two passes over the leading body paragraphs: pin the first visible line
//! to the configured start row, then classify each line and rewrite its
//! run formatting, keeping exactly one blank row between classified
//! sections.

use crate::config::StyleConfig;
use crate::docx::document::{
    add_run, clear_paragraph_runs, is_blank_paragraph, make_blank_paragraph, paragraph_text,
    paragraph_runs_mut, set_paragraph_alignment, set_paragraph_style, set_run_bold, set_run_font,
    set_run_italic, set_run_size, set_run_text, run_text, Document,
};
use crate::docx::xml::{XmlElement, XmlNode};
use crate::error::Result;
use crate::rules::classify::{
    classify_section, formerly_span, sentence_case, title_case, title_parts,
};
use crate::types::Section;

pub struct CoverRule<'a> {
    config: &'a StyleConfig,
}

impl<'a> CoverRule<'a> {
    pub fn new(config: &'a StyleConfig) -> Self {
        Self { config }
    }

    pub fn apply(&self, doc: &mut Document) -> Result<()> {
        self.normalize_vertical_offset(doc);
        self.apply_text_styling(doc);
        Ok(())
    }

    /// Land the first visible cover line on the configured start row by
    /// inserting or deleting leading blank rows. Only blank rows are ever
    /// deleted; hitting text stops the trim early.
    fn normalize_vertical_offset(&self, doc: &mut Document) {
        let first_text = doc
            .paragraphs()
            .iter()
            .position(|p| !is_blank_paragraph(p));
        let Some(first_text) = first_text else {
            // Nothing visible, nothing to align.
            return;
        };

        let required = self.config.cover.start_row - 1;
        let font = self.config.typography.font_name.clone();
        let size = self.config.typography.body_size_half_points();

        if first_text < required {
            for _ in 0..(required - first_text) {
                doc.insert_paragraph(0, make_blank_paragraph(&font, size));
            }
        } else if first_text > required {
            let mut removed = 0;
            while removed < first_text - required {
                let Some(top) = doc.paragraphs().first().copied() else {
                    break;
                };
                if !is_blank_paragraph(top) {
                    println!(
                        "⚠️  Stopped trimming cover rows: found text after removing {removed}"
                    );
                    break;
                }
                doc.remove_paragraph(0);
                removed += 1;
            }
        }
    }

    /// Classify and restyle the scan window, enforcing one blank row after
    /// every classified section that is followed by more content.
    fn apply_text_styling(&self, doc: &mut Document) {
        let mut i = 0usize;
        while i < self.config.cover.scan_rows {
            let Some(paragraph) = paragraph_mut(doc, i) else {
                break;
            };
            let text = paragraph_text(paragraph).trim().to_string();

            match classify_section(&text) {
                Section::Title => {
                    self.format_title(paragraph, &text);
                    self.enforce_one_blank_after(doc, i);
                    i += 2; // skip the blank row that now follows
                }
                Section::FormerlyName => {
                    self.format_formerly_line(paragraph, &text);
                    self.enforce_one_blank_after(doc, i);
                    i += 2;
                }
                Section::FinancialStatementType => {
                    self.format_statement_line(paragraph);
                    self.enforce_one_blank_after(doc, i);
                    i += 2;
                }
                Section::Period => {
                    self.format_period_line(paragraph);
                    self.enforce_one_blank_after(doc, i);
                    i += 2;
                }
                Section::UnauditedNotice => {
                    self.format_unaudited_line(paragraph, &text);
                    i += 1;
                }
                Section::Blank | Section::Other => {
                    i += 1;
                }
            }
        }
    }

    /// Title line: centered, title-size bold; the company name uppercased,
    /// a "(formerly …)" tail lowered with the old name in Title Case —
    /// span by span, never the whole line at once.
    fn format_title(&self, paragraph: &mut XmlElement, text: &str) {
        set_paragraph_alignment(paragraph, "center");
        clear_paragraph_runs(paragraph);

        let spans: Vec<String> = match title_parts(text) {
            Some(parts) => vec![
                parts.name.to_uppercase(),
                parts.formerly.to_lowercase(),
                title_case(parts.old_name),
                parts.close.to_string(),
            ],
            None => vec![text.to_uppercase()],
        };

        let font = self.config.typography.font_name.clone();
        let size = self.config.cover.title_size_half_points();
        for span in spans.iter().filter(|s| !s.is_empty()) {
            let run = add_run(paragraph, span);
            set_run_font(run, &font);
            set_run_size(run, size);
            set_run_bold(run, true);
        }
    }

    /// Standalone "(formerly …)" line: body font, centered, italics on the
    /// matched span only.
    fn format_formerly_line(&self, paragraph: &mut XmlElement, text: &str) {
        set_paragraph_alignment(paragraph, "center");
        clear_paragraph_runs(paragraph);

        let (start, end) = formerly_span(text).unwrap_or((0, text.len()));
        let spans = [
            (&text[..start], false),
            (&text[start..end], true),
            (&text[end..], false),
        ];

        let font = self.config.typography.font_name.clone();
        let size = self.config.typography.body_size_half_points();
        for (span, italic) in spans.iter().filter(|(s, _)| !s.is_empty()) {
            let run = add_run(paragraph, span);
            set_run_font(run, &font);
            set_run_size(run, size);
            set_run_bold(run, false);
            if *italic {
                set_run_italic(run, true);
            }
        }
    }

    fn format_statement_line(&self, paragraph: &mut XmlElement) {
        set_paragraph_style(paragraph, "Normal");
        set_paragraph_alignment(paragraph, "center");
        let font = self.config.typography.font_name.clone();
        let size = self.config.typography.body_size_half_points();
        for run in paragraph_runs_mut(paragraph) {
            set_run_font(run, &font);
            set_run_size(run, size);
            set_run_bold(run, true);
            let cased = title_case(&run_text(run));
            set_run_text(run, &cased);
        }
    }

    fn format_period_line(&self, paragraph: &mut XmlElement) {
        set_paragraph_style(paragraph, "Normal");
        set_paragraph_alignment(paragraph, "center");
        let font = self.config.typography.font_name.clone();
        let size = self.config.typography.body_size_half_points();
        for run in paragraph_runs_mut(paragraph) {
            set_run_bold(run, true);
            set_run_font(run, &font);
            set_run_size(run, size);
        }
    }

    fn format_unaudited_line(&self, paragraph: &mut XmlElement, text: &str) {
        set_paragraph_style(paragraph, "Normal");
        set_paragraph_alignment(paragraph, "center");
        clear_paragraph_runs(paragraph);

        let font = self.config.typography.font_name.clone();
        let run = add_run(paragraph, &sentence_case(text));
        set_run_font(run, &font);
        set_run_size(run, self.config.typography.body_size_half_points());
        set_run_bold(run, false);
    }

    /// Exactly one blank row after the given paragraph: insert one when the
    /// next paragraph carries text, collapse a run of blanks down to one.
    /// A following table (or nothing at all but section properties) is
    /// left alone.
    fn enforce_one_blank_after(&self, doc: &mut Document, ordinal: usize) {
        let Some(index) = doc.paragraph_node_index(ordinal) else {
            return;
        };
        let font = self.config.typography.font_name.clone();
        let size = self.config.typography.body_size_half_points();

        let next_kind = {
            let body = doc.body();
            match body.children.get(index + 1) {
                None => NextSibling::End,
                Some(XmlNode::Element(e)) if e.name == "w:sectPr" => NextSibling::End,
                Some(XmlNode::Element(e)) if e.name == "w:p" => {
                    if is_blank_paragraph(e) {
                        NextSibling::BlankParagraph
                    } else {
                        NextSibling::TextParagraph
                    }
                }
                Some(_) => NextSibling::OtherBlock,
            }
        };

        let body = doc.body_mut();
        match next_kind {
            NextSibling::End | NextSibling::TextParagraph => {
                body.children.insert(
                    index + 1,
                    XmlNode::Element(make_blank_paragraph(&font, size)),
                );
            }
            NextSibling::BlankParagraph => {
                // Collapse every further consecutive blank row.
                while let Some(XmlNode::Element(e)) = body.children.get(index + 2) {
                    if e.name == "w:p" && is_blank_paragraph(e) {
                        body.children.remove(index + 2);
                    } else {
                        break;
                    }
                }
            }
            NextSibling::OtherBlock => {}
        }
    }
}

enum NextSibling {
    End,
    TextParagraph,
    BlankParagraph,
    OtherBlock,
}

fn paragraph_mut(doc: &mut Document, ordinal: usize) -> Option<&mut XmlElement> {
    let index = doc.paragraph_node_index(ordinal)?;
    doc.body_mut().children[index].as_element_mut()
}
