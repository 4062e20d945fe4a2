//! Table rule engine.
//!
//! Statement tables carry a fixed four-column schema. Each table is gated
//! on that shape, its column roles are read from the header row, and then
//! the grid, margins, heights, fonts and period bolding are rewritten to
//! the configured targets through the markup adapter.

use crate::config::StyleConfig;
use crate::docx::document::{
    cell_paragraphs_mut, cell_text, paragraph_runs_mut, row_cells, row_cells_mut, set_run_bold,
    set_run_font, set_run_size, table_column_count, table_rows, table_rows_mut, Document,
};
use crate::docx::markup;
use crate::docx::xml::XmlElement;
use crate::error::{Error, Result};
use crate::rules::classify::assign_column_roles;
use crate::types::ColumnRole;

pub struct TableRule<'a> {
    config: &'a StyleConfig,
}

impl<'a> TableRule<'a> {
    pub fn new(config: &'a StyleConfig) -> Self {
        Self { config }
    }

    pub fn apply(&self, doc: &mut Document) -> Result<()> {
        let table_count = doc.tables().len();
        for ordinal in 0..table_count {
            let table = table_mut(doc, ordinal).expect("counted above");

            let columns = table_column_count(table);
            let expected = self.config.table.column_count();
            if columns != expected {
                // Rewriting widths against the wrong shape would misformat
                // silently; refuse instead.
                return Err(Error::TableShape {
                    table: ordinal,
                    columns,
                    expected,
                });
            }

            let roles = assign_column_roles(&header_texts(table, expected));
            self.apply_structural_rules(table);
            self.apply_semantic_bolding(table, &roles);
        }
        Ok(())
    }

    /// Grid, margins, row heights, cell widths, fonts and the description
    /// hanging indent.
    fn apply_structural_rules(&self, table: &mut XmlElement) {
        let widths = self.config.table.column_widths_twips();
        markup::set_column_grid(table, &widths);
        markup::set_cell_margins(
            table,
            self.config.table.cell_margin_side_twips,
            self.config.table.cell_margin_tb_twips,
        );

        let font = self.config.typography.font_name.clone();
        let size = self.config.typography.body_size_half_points();
        let row_height = self.config.table.row_height_twips();
        let hanging = self.config.table.hanging_indent_twips();

        for row in table_rows_mut(table) {
            markup::set_row_height(row, row_height);

            for (column, cell) in row_cells_mut(row).into_iter().enumerate() {
                if let Some(&width) = widths.get(column) {
                    markup::set_cell_width(cell, width);
                }

                let has_text = !cell_text(cell).trim().is_empty();
                for paragraph in cell_paragraphs_mut(cell) {
                    for run in paragraph_runs_mut(paragraph) {
                        set_run_font(run, &font);
                        set_run_size(run, size);
                    }
                    if column == 0 && has_text {
                        markup::set_hanging_indent(paragraph, hanging);
                    }
                }
            }
        }
    }

    /// Bold the CurrentPeriod column and explicitly un-bold the
    /// PriorPeriod column across the data rows. Both directions write an
    /// absolute state, so re-running converges instead of toggling.
    fn apply_semantic_bolding(&self, table: &mut XmlElement, roles: &[ColumnRole]) {
        for (row_index, row) in table_rows_mut(table).into_iter().enumerate() {
            if row_index == 0 {
                continue; // header row keeps its own emphasis
            }
            for (column, cell) in row_cells_mut(row).into_iter().enumerate() {
                let bold = match roles.get(column) {
                    Some(ColumnRole::CurrentPeriod) => true,
                    Some(ColumnRole::PriorPeriod) => false,
                    _ => continue,
                };
                for paragraph in cell_paragraphs_mut(cell) {
                    for run in paragraph_runs_mut(paragraph) {
                        set_run_bold(run, bold);
                    }
                }
            }
        }
    }
}

fn table_mut(doc: &mut Document, ordinal: usize) -> Option<&mut XmlElement> {
    doc.body_mut().elements_named_mut("w:tbl").nth(ordinal)
}

/// Header-row cell texts, padded out to the schema width so role
/// assignment always sees one entry per column. The validator reads roles
/// through this same path.
pub(crate) fn header_texts(table: &XmlElement, columns: usize) -> Vec<String> {
    let mut headers: Vec<String> = table_rows(table)
        .first()
        .map(|row| {
            row_cells(row)
                .iter()
                .map(|cell| cell_text(cell).trim().to_string())
                .collect()
        })
        .unwrap_or_default();
    headers.resize(columns, String::new());
    headers.truncate(columns);
    headers
}
