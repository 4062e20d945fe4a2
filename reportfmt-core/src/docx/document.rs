//! The main document part and its paragraph / run / table surface.
//!
//! Paragraphs (`w:p`), runs (`w:r`) and tables (`w:tbl`) are thin views
//! over the markup tree: free functions that read or rewrite the element
//! in place. Property containers (`w:pPr`, `w:rPr`, `w:tcPr`, `w:trPr`)
//! must stay the first child of their parent — every mutator here goes
//! through an `ensure_*` helper that maintains that invariant.

use crate::docx::xml::{self, XmlElement, XmlNode};
use crate::error::{Error, Result};

/// The in-memory tree of `word/document.xml`. One exclusive owner per
/// processing run; the rule engines mutate it in place and it serializes
/// back to bytes at the end.
#[derive(Debug, Clone)]
pub struct Document {
    root: XmlElement,
}

impl Document {
    pub fn parse(xml_text: &str) -> Result<Self> {
        let root = xml::parse(xml_text)?;
        Self::from_root(root)
    }

    pub fn from_root(root: XmlElement) -> Result<Self> {
        if root.child("w:body").is_none() {
            return Err(Error::Markup("document has no w:body".to_string()));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    pub fn to_xml_bytes(&self) -> Result<Vec<u8>> {
        xml::serialize(&self.root)
    }

    pub fn body(&self) -> &XmlElement {
        self.root.child("w:body").expect("checked at construction")
    }

    pub fn body_mut(&mut self) -> &mut XmlElement {
        self.root
            .child_mut("w:body")
            .expect("checked at construction")
    }

    /// Body paragraphs in document order.
    pub fn paragraphs(&self) -> Vec<&XmlElement> {
        self.body().elements_named("w:p").collect()
    }

    /// Body tables in document order.
    pub fn tables(&self) -> Vec<&XmlElement> {
        self.body().elements_named("w:tbl").collect()
    }

    /// Body-child index of the nth paragraph, if it exists.
    pub fn paragraph_node_index(&self, ordinal: usize) -> Option<usize> {
        let mut seen = 0usize;
        for (idx, node) in self.body().children.iter().enumerate() {
            if let XmlNode::Element(e) = node {
                if e.name == "w:p" {
                    if seen == ordinal {
                        return Some(idx);
                    }
                    seen += 1;
                }
            }
        }
        None
    }

    /// Insert a paragraph so it becomes the nth paragraph of the body.
    pub fn insert_paragraph(&mut self, ordinal: usize, paragraph: XmlElement) {
        let index = self
            .paragraph_node_index(ordinal)
            .unwrap_or_else(|| self.end_of_content_index());
        self.body_mut().children.insert(index, XmlNode::Element(paragraph));
    }

    /// Append a paragraph at the end of body content, before any trailing
    /// section properties.
    pub fn append_paragraph(&mut self, paragraph: XmlElement) {
        let index = self.end_of_content_index();
        self.body_mut().children.insert(index, XmlNode::Element(paragraph));
    }

    /// Remove the nth paragraph of the body.
    pub fn remove_paragraph(&mut self, ordinal: usize) {
        if let Some(index) = self.paragraph_node_index(ordinal) {
            self.body_mut().children.remove(index);
        }
    }

    fn end_of_content_index(&self) -> usize {
        match self.body().position_of("w:sectPr") {
            Some(idx) => idx,
            None => self.body().children.len(),
        }
    }
}

// ===== PARAGRAPH HELPERS =====

/// Visible text of a paragraph: every `w:t` descendant, concatenated.
/// Covers runs nested in hyperlinks and other containers.
pub fn paragraph_text(paragraph: &XmlElement) -> String {
    let mut out = String::new();
    collect_run_text(paragraph, &mut out);
    out
}

fn collect_run_text(element: &XmlElement, out: &mut String) {
    for child in element.elements() {
        if child.name == "w:t" {
            out.push_str(&child.text_content());
        } else {
            collect_run_text(child, out);
        }
    }
}

/// A paragraph with no visible text counts as a blank row.
pub fn is_blank_paragraph(paragraph: &XmlElement) -> bool {
    paragraph_text(paragraph).trim().is_empty()
}

/// Direct runs of a paragraph.
pub fn paragraph_runs(paragraph: &XmlElement) -> Vec<&XmlElement> {
    paragraph.elements_named("w:r").collect()
}

pub fn paragraph_runs_mut(paragraph: &mut XmlElement) -> Vec<&mut XmlElement> {
    paragraph.elements_named_mut("w:r").collect()
}

fn ensure_first_child<'a>(parent: &'a mut XmlElement, name: &str) -> &'a mut XmlElement {
    if parent.child(name).is_none() {
        parent.insert_element(0, XmlElement::new(name));
    }
    parent.child_mut(name).expect("just inserted")
}

// WordprocessingML property containers are schema sequences — children
// must appear in a fixed relative order or strict consumers reject the
// part. Only the properties this crate writes are listed.
const RUN_PROP_ORDER: &[&str] = &["w:rFonts", "w:b", "w:i", "w:sz", "w:szCs"];
const PARA_PROP_ORDER: &[&str] = &["w:pStyle", "w:spacing", "w:ind", "w:jc", "w:rPr"];

fn order_rank(order: &[&str], name: &str) -> usize {
    order.iter().position(|&n| n == name).unwrap_or(order.len())
}

/// Insert `element` into a property container at its schema position.
/// Children this crate does not know about keep their place; the new
/// element lands before the first higher-ranked sibling.
pub(crate) fn insert_ordered(props: &mut XmlElement, element: XmlElement, order: &[&str]) {
    let rank = order_rank(order, &element.name);
    let index = props
        .children
        .iter()
        .position(|node| match node {
            XmlNode::Element(e) => order_rank(order, &e.name) > rank,
            XmlNode::Text(_) => false,
        })
        .unwrap_or(props.children.len());
    props.children.insert(index, XmlNode::Element(element));
}

pub(crate) fn set_paragraph_prop(paragraph: &mut XmlElement, element: XmlElement) {
    let props = ensure_paragraph_props(paragraph);
    props.remove_children_named(&element.name);
    insert_ordered(props, element, PARA_PROP_ORDER);
}

fn set_run_prop(run: &mut XmlElement, element: XmlElement) {
    let props = ensure_run_props(run);
    props.remove_children_named(&element.name);
    insert_ordered(props, element, RUN_PROP_ORDER);
}

/// Paragraph properties container, created in first position if absent.
pub fn ensure_paragraph_props(paragraph: &mut XmlElement) -> &mut XmlElement {
    ensure_first_child(paragraph, "w:pPr")
}

pub fn set_paragraph_style(paragraph: &mut XmlElement, style_id: &str) {
    set_paragraph_prop(
        paragraph,
        XmlElement::new("w:pStyle").with_attr("w:val", style_id),
    );
}

pub fn set_paragraph_alignment(paragraph: &mut XmlElement, alignment: &str) {
    set_paragraph_prop(
        paragraph,
        XmlElement::new("w:jc").with_attr("w:val", alignment),
    );
}

pub fn paragraph_alignment(paragraph: &XmlElement) -> Option<&str> {
    paragraph
        .child("w:pPr")
        .and_then(|p| p.child("w:jc"))
        .and_then(|jc| jc.attr("w:val"))
}

/// Remove every run from a paragraph, leaving its properties alone.
pub fn clear_paragraph_runs(paragraph: &mut XmlElement) {
    paragraph.children.retain(|node| match node {
        XmlNode::Element(e) => e.name == "w:pPr",
        XmlNode::Text(_) => false,
    });
}

/// Append a run carrying the given text; returns it for styling.
pub fn add_run<'a>(paragraph: &'a mut XmlElement, text: &str) -> &'a mut XmlElement {
    let mut run = XmlElement::new("w:r");
    run.push_element(make_text_element(text));
    paragraph.push_element(run);
    paragraph
        .elements_named_mut("w:r")
        .last()
        .expect("just appended")
}

fn make_text_element(text: &str) -> XmlElement {
    let mut t = XmlElement::new("w:t");
    if text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace) {
        t.set_attr("xml:space", "preserve");
    }
    t.children.push(XmlNode::Text(text.to_string()));
    t
}

/// A blank paragraph carrying an empty, body-styled run, used for cover
/// spacing rows.
pub fn make_blank_paragraph(font_name: &str, size_half_points: u32) -> XmlElement {
    let mut paragraph = XmlElement::new("w:p");
    let mut run = XmlElement::new("w:r");
    set_run_font(&mut run, font_name);
    set_run_size(&mut run, size_half_points);
    paragraph.push_element(run);
    paragraph
}

// ===== RUN HELPERS =====

pub fn run_text(run: &XmlElement) -> String {
    run.elements_named("w:t")
        .map(|t| t.text_content())
        .collect()
}

pub fn set_run_text(run: &mut XmlElement, text: &str) {
    run.children.retain(|node| match node {
        XmlNode::Element(e) => e.name != "w:t",
        XmlNode::Text(_) => false,
    });
    run.push_element(make_text_element(text));
}

/// Run properties container, created in first position if absent.
pub fn ensure_run_props(run: &mut XmlElement) -> &mut XmlElement {
    ensure_first_child(run, "w:rPr")
}

pub fn set_run_font(run: &mut XmlElement, name: &str) {
    set_run_prop(
        run,
        XmlElement::new("w:rFonts")
            .with_attr("w:ascii", name)
            .with_attr("w:hAnsi", name)
            .with_attr("w:cs", name),
    );
}

pub fn set_run_size(run: &mut XmlElement, half_points: u32) {
    let value = half_points.to_string();
    set_run_prop(run, XmlElement::new("w:sz").with_attr("w:val", &value));
    set_run_prop(run, XmlElement::new("w:szCs").with_attr("w:val", &value));
}

/// Force an explicit bold state. `false` writes `<w:b w:val="0"/>` rather
/// than removing the toggle, so a bold inherited from a style is still
/// overridden.
pub fn set_run_bold(run: &mut XmlElement, bold: bool) {
    set_run_toggle(run, "w:b", bold)
}

pub fn set_run_italic(run: &mut XmlElement, italic: bool) {
    set_run_toggle(run, "w:i", italic)
}

fn set_run_toggle(run: &mut XmlElement, name: &str, on: bool) {
    let mut toggle = XmlElement::new(name);
    if !on {
        toggle.set_attr("w:val", "0");
    }
    set_run_prop(run, toggle);
}

/// Explicit bold state of a run: `None` when no toggle is present (the
/// run inherits), otherwise the toggle's value.
pub fn run_is_bold(run: &XmlElement) -> Option<bool> {
    run_toggle(run, "w:b")
}

pub fn run_is_italic(run: &XmlElement) -> Option<bool> {
    run_toggle(run, "w:i")
}

fn run_toggle(run: &XmlElement, name: &str) -> Option<bool> {
    let toggle = run.child("w:rPr")?.child(name)?;
    Some(!matches!(toggle.attr("w:val"), Some("0") | Some("false") | Some("none")))
}

pub fn run_font_name(run: &XmlElement) -> Option<&str> {
    run.child("w:rPr")?.child("w:rFonts")?.attr("w:ascii")
}

pub fn run_size_half_points(run: &XmlElement) -> Option<u32> {
    run.child("w:rPr")?
        .child("w:sz")?
        .attr("w:val")?
        .parse()
        .ok()
}

// ===== TABLE HELPERS =====

pub fn table_rows(table: &XmlElement) -> Vec<&XmlElement> {
    table.elements_named("w:tr").collect()
}

pub fn table_rows_mut(table: &mut XmlElement) -> Vec<&mut XmlElement> {
    table.elements_named_mut("w:tr").collect()
}

pub fn row_cells(row: &XmlElement) -> Vec<&XmlElement> {
    row.elements_named("w:tc").collect()
}

pub fn row_cells_mut(row: &mut XmlElement) -> Vec<&mut XmlElement> {
    row.elements_named_mut("w:tc").collect()
}

pub fn cell_paragraphs(cell: &XmlElement) -> Vec<&XmlElement> {
    cell.elements_named("w:p").collect()
}

pub fn cell_paragraphs_mut(cell: &mut XmlElement) -> Vec<&mut XmlElement> {
    cell.elements_named_mut("w:p").collect()
}

/// Visible text of a cell: its paragraphs joined with newlines.
pub fn cell_text(cell: &XmlElement) -> String {
    cell_paragraphs(cell)
        .iter()
        .map(|p| paragraph_text(p))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Number of logical columns: the grid definition when present, else the
/// first row's cell count.
pub fn table_column_count(table: &XmlElement) -> usize {
    if let Some(grid) = table.child("w:tblGrid") {
        let cols = grid.elements_named("w:gridCol").count();
        if cols > 0 {
            return cols;
        }
    }
    table_rows(table)
        .first()
        .map(|row| row_cells(row).len())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(body: &str) -> Document {
        Document::parse(&format!("<w:document><w:body>{body}</w:body></w:document>")).unwrap()
    }

    #[test]
    fn paragraph_text_spans_nested_runs() {
        let d = doc(
            "<w:p><w:r><w:t>Hello </w:t></w:r>\
             <w:hyperlink><w:r><w:t>world</w:t></w:r></w:hyperlink></w:p>",
        );
        assert_eq!(paragraph_text(d.paragraphs()[0]), "Hello world");
    }

    #[test]
    fn blank_detection_ignores_whitespace() {
        let d = doc("<w:p><w:r><w:t>  </w:t></w:r></w:p><w:p/>");
        assert!(is_blank_paragraph(d.paragraphs()[0]));
        assert!(is_blank_paragraph(d.paragraphs()[1]));
    }

    #[test]
    fn run_props_stay_first_child() {
        let mut run = XmlElement::new("w:r");
        run.push_element(make_text_element("x"));
        set_run_bold(&mut run, true);
        set_run_font(&mut run, "Arial");
        assert_eq!(run.elements().next().unwrap().name, "w:rPr");
        assert_eq!(run_is_bold(&run), Some(true));
        assert_eq!(run_font_name(&run), Some("Arial"));
        assert_eq!(run_text(&run), "x");
    }

    #[test]
    fn explicit_unbold_is_observable() {
        let mut run = XmlElement::new("w:r");
        set_run_bold(&mut run, true);
        set_run_bold(&mut run, false);
        assert_eq!(run_is_bold(&run), Some(false));
        // One toggle only — re-running converges instead of stacking.
        let props = run.child("w:rPr").unwrap();
        assert_eq!(props.elements_named("w:b").count(), 1);
    }

    #[test]
    fn insert_and_remove_paragraphs_respects_sect_pr() {
        let mut d = doc("<w:p><w:r><w:t>a</w:t></w:r></w:p><w:sectPr/>");
        d.append_paragraph(make_blank_paragraph("Arial", 18));
        assert_eq!(d.paragraphs().len(), 2);
        // sectPr still last
        let last = d.body().children.last().unwrap().as_element().unwrap();
        assert_eq!(last.name, "w:sectPr");

        d.insert_paragraph(0, make_blank_paragraph("Arial", 18));
        assert!(is_blank_paragraph(d.paragraphs()[0]));
        d.remove_paragraph(0);
        assert_eq!(paragraph_text(d.paragraphs()[0]), "a");
    }

    #[test]
    fn column_count_prefers_grid() {
        let d = doc(
            "<w:tbl><w:tblGrid><w:gridCol w:w=\"100\"/><w:gridCol w:w=\"100\"/></w:tblGrid>\
             <w:tr><w:tc><w:p/></w:tc></w:tr></w:tbl>",
        );
        assert_eq!(table_column_count(d.tables()[0]), 2);
    }
}
