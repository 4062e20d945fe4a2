//! Direct attribute overrides beyond the paragraph/run surface.
//!
//! Column grids, cell margins, row heights and hanging indents live in
//! markup the high-level helpers do not expose. The rule engines call the
//! semantic operations here (set the grid, set the margins) and never see
//! element names, so the one place that rewrites raw table structure stays
//! in this file. Each setter has a matching reader used by the validator.

use crate::docx::document::{insert_ordered, set_paragraph_prop};
use crate::docx::xml::XmlElement;

// Schema order of the table-row and table-cell property children we write.
const ROW_PROP_ORDER: &[&str] = &["w:trHeight"];
const CELL_PROP_ORDER: &[&str] = &["w:tcW"];

fn ensure_table_props(table: &mut XmlElement) -> &mut XmlElement {
    if table.child("w:tblPr").is_none() {
        table.insert_element(0, XmlElement::new("w:tblPr"));
    }
    table.child_mut("w:tblPr").expect("just inserted")
}

/// Replace the table's column grid wholesale with the given widths.
///
/// The grid is authoritative for layout: patching individual `w:gridCol`
/// entries leaves stale remnants that contradict the replaced values, so
/// the old definition is always dropped before the new one is written.
pub fn set_column_grid(table: &mut XmlElement, widths_twips: &[u32]) {
    table.remove_children_named("w:tblGrid");

    let mut grid = XmlElement::new("w:tblGrid");
    for width in widths_twips {
        grid.push_element(XmlElement::new("w:gridCol").with_attr("w:w", &width.to_string()));
    }

    // The grid sits between the table properties and the first row.
    let index = match table.position_of("w:tblPr") {
        Some(idx) => idx + 1,
        None => 0,
    };
    table.insert_element(index, grid);
}

/// Grid column widths in twips, empty when no grid is defined.
pub fn column_grid(table: &XmlElement) -> Vec<u32> {
    table
        .child("w:tblGrid")
        .map(|grid| {
            grid.elements_named("w:gridCol")
                .filter_map(|col| col.attr("w:w"))
                .filter_map(|w| w.parse().ok())
                .collect()
        })
        .unwrap_or_default()
}

/// Set table-level cell margins: one value for left/right, one for
/// top/bottom. Any existing margin definition is replaced.
pub fn set_cell_margins(table: &mut XmlElement, side_twips: u32, tb_twips: u32) {
    let props = ensure_table_props(table);
    props.remove_children_named("w:tblCellMar");

    let mut margins = XmlElement::new("w:tblCellMar");
    for (name, value) in [
        ("w:top", tb_twips),
        ("w:left", side_twips),
        ("w:bottom", tb_twips),
        ("w:right", side_twips),
    ] {
        margins.push_element(
            XmlElement::new(name)
                .with_attr("w:w", &value.to_string())
                .with_attr("w:type", "dxa"),
        );
    }
    props.push_element(margins);
}

/// Observed (side, top/bottom) cell margins, `None` when unset.
pub fn cell_margins(table: &XmlElement) -> Option<(u32, u32)> {
    let margins = table.child("w:tblPr")?.child("w:tblCellMar")?;
    let side = margins.child("w:left")?.attr("w:w")?.parse().ok()?;
    let tb = margins.child("w:top")?.attr("w:w")?.parse().ok()?;
    Some((side, tb))
}

/// Minimum row height ("at least" rule, so content can still grow).
pub fn set_row_height(row: &mut XmlElement, twips: u32) {
    if row.child("w:trPr").is_none() {
        row.insert_element(0, XmlElement::new("w:trPr"));
    }
    let props = row.child_mut("w:trPr").expect("just inserted");
    props.remove_children_named("w:trHeight");
    insert_ordered(
        props,
        XmlElement::new("w:trHeight")
            .with_attr("w:val", &twips.to_string())
            .with_attr("w:hRule", "atLeast"),
        ROW_PROP_ORDER,
    );
}

pub fn row_height(row: &XmlElement) -> Option<u32> {
    row.child("w:trPr")?
        .child("w:trHeight")?
        .attr("w:val")?
        .parse()
        .ok()
}

/// Explicit cell width, written alongside the grid for redundancy — the
/// grid wins in renderers, but stray cell widths would contradict it.
pub fn set_cell_width(cell: &mut XmlElement, twips: u32) {
    if cell.child("w:tcPr").is_none() {
        cell.insert_element(0, XmlElement::new("w:tcPr"));
    }
    let props = cell.child_mut("w:tcPr").expect("just inserted");
    props.remove_children_named("w:tcW");
    insert_ordered(
        props,
        XmlElement::new("w:tcW")
            .with_attr("w:w", &twips.to_string())
            .with_attr("w:type", "dxa"),
        CELL_PROP_ORDER,
    );
}

pub fn cell_width(cell: &XmlElement) -> Option<u32> {
    cell.child("w:tcPr")?
        .child("w:tcW")?
        .attr("w:w")?
        .parse()
        .ok()
}

/// Hanging indent: body of the paragraph at `twips`, first line pulled
/// back to the margin.
pub fn set_hanging_indent(paragraph: &mut XmlElement, twips: u32) {
    set_paragraph_prop(
        paragraph,
        XmlElement::new("w:ind")
            .with_attr("w:left", &twips.to_string())
            .with_attr("w:hanging", &twips.to_string()),
    );
}

/// Observed (left, hanging) indent values, `None` when unset.
pub fn hanging_indent(paragraph: &XmlElement) -> Option<(u32, u32)> {
    let ind = paragraph.child("w:pPr")?.child("w:ind")?;
    let left = ind.attr("w:left")?.parse().ok()?;
    let hanging = ind.attr("w:hanging")?.parse().ok()?;
    Some((left, hanging))
}
