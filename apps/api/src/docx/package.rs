//! Writes a [`Document`] as an OPC/ZIP WordprocessingML container.
//!
//! Entries are written in a fixed order with a fixed timestamp, so the same
//! document always produces the same bytes.

use std::collections::BTreeSet;
use std::io::{Cursor, Write};

use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::docx::document::{
    Block, Document, Relationship, Story, FOOTER_REL_ID, SETTINGS_REL_ID, STYLES_REL_ID,
};
use crate::docx::units::pt_to_half_points;
use crate::docx::xml::Element;
use crate::docx::DocxError;

pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_WP: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_PIC: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";
const NS_WPS: &str = "http://schemas.microsoft.com/office/word/2010/wordprocessingShape";

const NS_CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
const NS_PACKAGE_RELS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const REL_STYLES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
const REL_SETTINGS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings";
const REL_FOOTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer";
const REL_IMAGE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

const CT_MAIN: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
const CT_STYLES: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml";
const CT_SETTINGS: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml";
const CT_FOOTER: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml";
const CT_RELS: &str = "application/vnd.openxmlformats-package.relationships+xml";

/// Serializes the whole document into DOCX bytes.
pub fn write_docx(doc: &Document) -> Result<Vec<u8>, DocxError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    let mut put = |name: &str, bytes: &[u8]| -> Result<(), DocxError> {
        zip.start_file(name, options)?;
        zip.write_all(bytes)?;
        Ok(())
    };

    put("[Content_Types].xml", &content_types(doc).to_part_bytes()?)?;
    put("_rels/.rels", &package_rels().to_part_bytes()?)?;
    put("word/document.xml", &document_part(doc).to_part_bytes()?)?;
    put(
        "word/_rels/document.xml.rels",
        &relationships_part(&body_relationships(doc.body())).to_part_bytes()?,
    )?;
    put("word/styles.xml", &styles_part(doc).to_part_bytes()?)?;
    put("word/settings.xml", &settings_part().to_part_bytes()?)?;
    put("word/footer1.xml", &footer_part(doc).to_part_bytes()?)?;
    put(
        "word/_rels/footer1.xml.rels",
        &relationships_part(&image_relationships(doc.footer())).to_part_bytes()?,
    )?;
    for media in doc.media() {
        put(&format!("word/media/{}", media.file_name), &media.bytes)?;
    }

    let bytes = zip.finish()?.into_inner();
    debug!(
        "DOCX written: {} bytes, {} media part(s)",
        bytes.len(),
        doc.media().len()
    );
    Ok(bytes)
}

fn with_namespaces(root: Element) -> Element {
    root.with_attr("xmlns:w", NS_W)
        .with_attr("xmlns:r", NS_R)
        .with_attr("xmlns:wp", NS_WP)
        .with_attr("xmlns:a", NS_A)
        .with_attr("xmlns:pic", NS_PIC)
        .with_attr("xmlns:wps", NS_WPS)
}

fn push_blocks(target: &mut Element, blocks: &[Block]) {
    for block in blocks {
        target.push(block.to_element());
    }
}

fn document_part(doc: &Document) -> Element {
    let setup = doc.setup();
    let mut body = Element::new("w:body");
    push_blocks(&mut body, doc.body().blocks());

    let sect = Element::new("w:sectPr")
        .with_child(
            Element::new("w:footerReference")
                .with_attr("w:type", "default")
                .with_attr("r:id", FOOTER_REL_ID),
        )
        .with_child(
            Element::new("w:pgSz")
                .with_attr("w:w", setup.width)
                .with_attr("w:h", setup.height),
        )
        .with_child(
            Element::new("w:pgMar")
                .with_attr("w:top", setup.margin_top)
                .with_attr("w:right", setup.margin_right)
                .with_attr("w:bottom", setup.margin_bottom)
                .with_attr("w:left", setup.margin_left)
                .with_attr("w:header", setup.header_distance)
                .with_attr("w:footer", setup.footer_distance)
                .with_attr("w:gutter", 0),
        )
        .with_child(Element::new("w:cols").with_attr("w:space", 708));
    body.push(sect);

    with_namespaces(Element::new("w:document")).with_child(body)
}

fn footer_part(doc: &Document) -> Element {
    let mut ftr = with_namespaces(Element::new("w:ftr"));
    push_blocks(&mut ftr, doc.footer().blocks());
    // A footer part must contain at least one paragraph.
    if doc.footer().blocks().is_empty() {
        ftr.push(Element::new("w:p"));
    }
    ftr
}

fn font_slots(family: &str) -> Element {
    Element::new("w:rFonts")
        .with_attr("w:ascii", family)
        .with_attr("w:hAnsi", family)
        .with_attr("w:eastAsia", family)
        .with_attr("w:cs", family)
}

fn styles_part(doc: &Document) -> Element {
    let font = doc.base_font();
    let size = pt_to_half_points(font.size_pt);
    let base_rpr = || {
        Element::new("w:rPr")
            .with_child(font_slots(&font.family))
            .with_child(Element::new("w:sz").with_attr("w:val", size))
            .with_child(Element::new("w:szCs").with_attr("w:val", size))
    };

    let defaults = Element::new("w:docDefaults")
        .with_child(
            Element::new("w:rPrDefault").with_child(
                base_rpr().with_child(Element::new("w:lang").with_attr("w:val", "fr-FR")),
            ),
        )
        .with_child(
            Element::new("w:pPrDefault").with_child(
                Element::new("w:pPr").with_child(
                    Element::new("w:spacing")
                        .with_attr("w:after", 0)
                        .with_attr("w:line", 240)
                        .with_attr("w:lineRule", "auto"),
                ),
            ),
        );

    let normal = Element::new("w:style")
        .with_attr("w:type", "paragraph")
        .with_attr("w:default", 1)
        .with_attr("w:styleId", "Normal")
        .with_child(Element::new("w:name").with_attr("w:val", "Normal"))
        .with_child(Element::new("w:qFormat"))
        .with_child(base_rpr());

    let cell_margin = |side: &str, w: i32| {
        Element::new(side)
            .with_attr("w:w", w)
            .with_attr("w:type", "dxa")
    };
    let table_normal = Element::new("w:style")
        .with_attr("w:type", "table")
        .with_attr("w:default", 1)
        .with_attr("w:styleId", "TableNormal")
        .with_child(Element::new("w:name").with_attr("w:val", "Normal Table"))
        .with_child(Element::new("w:uiPriority").with_attr("w:val", 99))
        .with_child(Element::new("w:semiHidden"))
        .with_child(
            Element::new("w:tblPr")
                .with_child(cell_margin("w:tblInd", 0))
                .with_child(
                    Element::new("w:tblCellMar")
                        .with_child(cell_margin("w:top", 0))
                        .with_child(cell_margin("w:left", 108))
                        .with_child(cell_margin("w:bottom", 0))
                        .with_child(cell_margin("w:right", 108)),
                ),
        );

    Element::new("w:styles")
        .with_attr("xmlns:w", NS_W)
        .with_child(defaults)
        .with_child(normal)
        .with_child(table_normal)
}

fn settings_part() -> Element {
    Element::new("w:settings")
        .with_attr("xmlns:w", NS_W)
        .with_child(Element::new("w:defaultTabStop").with_attr("w:val", 708))
        .with_child(Element::new("w:characterSpacingControl").with_attr("w:val", "doNotCompress"))
        .with_child(
            Element::new("w:compat").with_child(
                Element::new("w:compatSetting")
                    .with_attr("w:name", "compatibilityMode")
                    .with_attr("w:uri", "http://schemas.microsoft.com/office/word")
                    .with_attr("w:val", 15),
            ),
        )
}

fn content_types(doc: &Document) -> Element {
    let mut types = Element::new("Types").with_attr("xmlns", NS_CONTENT_TYPES);
    types.push(
        Element::new("Default")
            .with_attr("Extension", "rels")
            .with_attr("ContentType", CT_RELS),
    );
    types.push(
        Element::new("Default")
            .with_attr("Extension", "xml")
            .with_attr("ContentType", "application/xml"),
    );

    let extensions: BTreeSet<String> = doc
        .media()
        .iter()
        .map(|m| m.extension().to_ascii_lowercase())
        .collect();
    for ext in extensions {
        let content_type = match ext.as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            _ => "image/png",
        };
        types.push(
            Element::new("Default")
                .with_attr("Extension", &ext)
                .with_attr("ContentType", content_type),
        );
    }

    for (part, content_type) in [
        ("/word/document.xml", CT_MAIN),
        ("/word/styles.xml", CT_STYLES),
        ("/word/settings.xml", CT_SETTINGS),
        ("/word/footer1.xml", CT_FOOTER),
    ] {
        types.push(
            Element::new("Override")
                .with_attr("PartName", part)
                .with_attr("ContentType", content_type),
        );
    }
    types
}

fn package_rels() -> Element {
    relationships_part(&[(
        "rId1".to_string(),
        REL_OFFICE_DOCUMENT,
        "word/document.xml".to_string(),
    )])
}

fn body_relationships(body: &Story) -> Vec<(String, &'static str, String)> {
    let mut rels = vec![
        (STYLES_REL_ID.to_string(), REL_STYLES, "styles.xml".to_string()),
        (SETTINGS_REL_ID.to_string(), REL_SETTINGS, "settings.xml".to_string()),
        (FOOTER_REL_ID.to_string(), REL_FOOTER, "footer1.xml".to_string()),
    ];
    rels.extend(image_relationships(body));
    rels
}

fn image_relationships(story: &Story) -> Vec<(String, &'static str, String)> {
    story
        .relationships()
        .iter()
        .map(|Relationship { id, target }| (id.clone(), REL_IMAGE, target.clone()))
        .collect()
}

fn relationships_part(rels: &[(String, &'static str, String)]) -> Element {
    let mut root = Element::new("Relationships").with_attr("xmlns", NS_PACKAGE_RELS);
    for (id, kind, target) in rels {
        root.push(
            Element::new("Relationship")
                .with_attr("Id", id)
                .with_attr("Type", kind)
                .with_attr("Target", target),
        );
    }
    root
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;
    use crate::docx::document::{BaseFont, PageSetup, Paragraph, Run, StoryKind};

    fn sample() -> Document {
        let mut doc = Document::new(
            PageSetup::a4(1.8, 0.8),
            BaseFont {
                family: "Century Gothic".to_string(),
                size_pt: 10.0,
            },
        );
        let mut p = Paragraph::new();
        p.push_run(Run::text("Bonjour & bienvenue"));
        doc.push_paragraph(p);
        doc.add_image(StoryKind::Footer, vec![0x89, b'P', b'N', b'G'], "png");
        doc
    }

    fn read_entry(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut out = String::new();
        file.read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn test_container_has_required_parts() {
        let bytes = write_docx(&sample()).unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        for part in [
            "[Content_Types].xml",
            "_rels/.rels",
            "word/document.xml",
            "word/_rels/document.xml.rels",
            "word/styles.xml",
            "word/settings.xml",
            "word/footer1.xml",
            "word/_rels/footer1.xml.rels",
            "word/media/image1.png",
        ] {
            assert!(names.contains(&part), "missing {part}");
        }
    }

    #[test]
    fn test_document_xml_is_well_formed_with_geometry() {
        let bytes = write_docx(&sample()).unwrap();
        let xml = read_entry(&bytes, "word/document.xml");
        let parsed = roxmltree::Document::parse(&xml).unwrap();
        let pg_sz = parsed
            .descendants()
            .find(|n| n.tag_name().name() == "pgSz")
            .unwrap();
        assert_eq!(pg_sz.attribute((NS_W, "w")), Some("11906"));
        assert_eq!(pg_sz.attribute((NS_W, "h")), Some("16838"));
        let pg_mar = parsed
            .descendants()
            .find(|n| n.tag_name().name() == "pgMar")
            .unwrap();
        assert_eq!(pg_mar.attribute((NS_W, "left")), Some("1020"));
        assert_eq!(pg_mar.attribute((NS_W, "footer")), Some("454"));
        assert!(xml.contains("Bonjour &amp; bienvenue"));
    }

    #[test]
    fn test_styles_apply_base_font_everywhere() {
        let bytes = write_docx(&sample()).unwrap();
        let xml = read_entry(&bytes, "word/styles.xml");
        assert!(xml.contains(r#"w:ascii="Century Gothic""#));
        assert!(xml.contains(r#"w:eastAsia="Century Gothic""#));
        assert!(xml.contains(r#"w:cs="Century Gothic""#));
        assert!(xml.contains(r#"<w:sz w:val="20"/>"#));
    }

    #[test]
    fn test_footer_relationships_point_to_media() {
        let bytes = write_docx(&sample()).unwrap();
        let rels = read_entry(&bytes, "word/_rels/footer1.xml.rels");
        assert!(rels.contains(r#"Id="rId1""#));
        assert!(rels.contains("media/image1.png"));
        let types = read_entry(&bytes, "[Content_Types].xml");
        assert!(types.contains(r#"Extension="png""#));
    }

    #[test]
    fn test_identical_documents_give_identical_bytes() {
        let a = write_docx(&sample()).unwrap();
        let b = write_docx(&sample()).unwrap();
        assert_eq!(a, b);
    }
}
