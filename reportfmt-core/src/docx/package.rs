//! The .docx container: a zip of XML parts.
//!
//! Only `word/document.xml` and `word/styles.xml` are parsed; every other
//! part passes through byte-for-byte in its original order, so headers,
//! footers, themes and embedded media survive a round trip untouched.

use crate::config::StyleConfig;
use crate::docx::document::Document;
use crate::docx::xml::{self, XmlElement};
use crate::error::{Error, Result};
use std::io::{Cursor, Read, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const DOCUMENT_PART: &str = "word/document.xml";
const STYLES_PART: &str = "word/styles.xml";

const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// One zip entry. Parsed parts are position markers so the rewritten
/// package keeps the original entry order.
#[derive(Debug, Clone)]
enum Part {
    Raw { name: String, data: Vec<u8> },
    Directory { name: String },
    DocumentXml,
    StylesXml,
}

#[derive(Debug, Clone)]
pub struct DocxPackage {
    parts: Vec<Part>,
    pub document: Document,
    styles: Option<XmlElement>,
}

impl DocxPackage {
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;

        let mut parts = Vec::with_capacity(archive.len());
        let mut document = None;
        let mut styles = None;

        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            let name = entry.name().to_string();

            if entry.is_dir() {
                parts.push(Part::Directory { name });
                continue;
            }

            let mut data = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut data)?;

            match name.as_str() {
                DOCUMENT_PART => {
                    let text = std::str::from_utf8(&data)
                        .map_err(|e| Error::Markup(format!("{DOCUMENT_PART}: {e}")))?;
                    document = Some(Document::parse(text)?);
                    parts.push(Part::DocumentXml);
                }
                STYLES_PART => {
                    let text = std::str::from_utf8(&data)
                        .map_err(|e| Error::Markup(format!("{STYLES_PART}: {e}")))?;
                    styles = Some(xml::parse(text)?);
                    parts.push(Part::StylesXml);
                }
                _ => parts.push(Part::Raw { name, data }),
            }
        }

        let document = document.ok_or_else(|| Error::MissingPart(DOCUMENT_PART.to_string()))?;

        Ok(Self {
            parts,
            document,
            styles,
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        for part in &self.parts {
            match part {
                Part::Raw { name, data } => {
                    writer.start_file(name.as_str(), options)?;
                    writer.write_all(data)?;
                }
                Part::Directory { name } => {
                    writer.add_directory(name.as_str(), options)?;
                }
                Part::DocumentXml => {
                    writer.start_file(DOCUMENT_PART, options)?;
                    writer.write_all(&self.document.to_xml_bytes()?)?;
                }
                Part::StylesXml => {
                    let styles = self.styles.as_ref().expect("marker implies parsed part");
                    writer.start_file(STYLES_PART, options)?;
                    writer.write_all(&xml::serialize(styles)?)?;
                }
            }
        }

        let cursor = writer
            .finish()
            .map_err(|e| Error::Serialize(e.to_string()))?;
        Ok(cursor.into_inner())
    }

    /// Point the package's base "Normal" paragraph style at the configured
    /// body font, so text that inherits instead of carrying explicit run
    /// properties still renders on-guide. Returns false when the package
    /// has no styles part or no Normal style to rewrite.
    pub fn normalize_base_style(&mut self, config: &StyleConfig) -> bool {
        let Some(styles) = self.styles.as_mut() else {
            return false;
        };
        let Some(normal) = styles.elements_named_mut("w:style").find(|style| {
            style.attr("w:type") == Some("paragraph")
                && (style.attr("w:styleId") == Some("Normal")
                    || style.attr("w:default") == Some("1"))
        }) else {
            return false;
        };

        if normal.child("w:rPr").is_none() {
            normal.push_element(XmlElement::new("w:rPr"));
        }
        let props = normal.child_mut("w:rPr").expect("just inserted");

        let name = config.typography.font_name.as_str();
        let size = config.typography.body_size_half_points().to_string();

        props.remove_children_named("w:rFonts");
        props.insert_element(
            0,
            XmlElement::new("w:rFonts")
                .with_attr("w:ascii", name)
                .with_attr("w:hAnsi", name)
                .with_attr("w:cs", name),
        );
        for sz in ["w:sz", "w:szCs"] {
            props.remove_children_named(sz);
            props.push_element(XmlElement::new(sz).with_attr("w:val", &size));
        }
        true
    }

    /// Build a minimal single-part package around a document tree. Used to
    /// fabricate fixtures and demo inputs without a seed file.
    pub fn from_document_xml(document_xml: &str) -> Result<Self> {
        let document = Document::parse(document_xml)?;
        let styles = xml::parse(&format!(
            r#"<w:styles xmlns:w="{WML_NS}"><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style></w:styles>"#
        ))?;

        let content_types = concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
            r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
            r#"<Default Extension="xml" ContentType="application/xml"/>"#,
            r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
            r#"<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>"#,
            r#"</Types>"#,
        );
        let package_rels = concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
            r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>"#,
            r#"</Relationships>"#,
        );
        let document_rels = concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
            r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
            r#"</Relationships>"#,
        );

        Ok(Self {
            parts: vec![
                Part::Raw {
                    name: "[Content_Types].xml".to_string(),
                    data: content_types.as_bytes().to_vec(),
                },
                Part::Raw {
                    name: "_rels/.rels".to_string(),
                    data: package_rels.as_bytes().to_vec(),
                },
                Part::Raw {
                    name: "word/_rels/document.xml.rels".to_string(),
                    data: document_rels.as_bytes().to_vec(),
                },
                Part::DocumentXml,
                Part::StylesXml,
            ],
            document,
            styles: Some(styles),
        })
    }
}
