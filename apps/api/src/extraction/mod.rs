//! Raw text extraction from uploaded résumés (PDF or DOCX).
//!
//! Only the file extension decides the format. Content that cannot be parsed
//! yields an empty string; the caller decides that empty text is an error.

use std::io::{Cursor, Read};
use std::path::Path;

use anyhow::{anyhow, Context};
use thiserror::Error;
use tracing::{debug, warn};

const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const NS_MC: &str = "http://schemas.openxmlformats.org/markup-compatibility/2006";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported format '{0}'. Use PDF or DOCX.")]
    UnsupportedFormat(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Pdf,
    Docx,
}

impl SourceFormat {
    /// Format from a file name or path, by case-insensitive extension.
    pub fn detect(name: &str) -> Result<Self, ExtractError> {
        let extension = Path::new(name)
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "pdf" => Ok(SourceFormat::Pdf),
            "docx" => Ok(SourceFormat::Docx),
            _ => Err(ExtractError::UnsupportedFormat(format!(".{extension}"))),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            SourceFormat::Pdf => "pdf",
            SourceFormat::Docx => "docx",
        }
    }
}

/// Extracts the text of the file at `path`.
pub fn extract_text(path: &Path) -> Result<String, ExtractError> {
    let format = SourceFormat::detect(&path.to_string_lossy())?;
    let bytes = std::fs::read(path).map_err(|source| ExtractError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let text = extract_from_bytes(format, &bytes);
    debug!(
        "Extracted {} characters from {} ({:?})",
        text.chars().count(),
        path.display(),
        format
    );
    Ok(text)
}

/// Extracts text from in-memory file content. Unreadable content gives `""`.
pub fn extract_from_bytes(format: SourceFormat, bytes: &[u8]) -> String {
    let result = match format {
        SourceFormat::Pdf => pdf_text(bytes),
        SourceFormat::Docx => docx_text(bytes),
    };
    match result {
        Ok(text) => text.trim().to_string(),
        Err(reason) => {
            warn!("Could not read {} content: {reason:#}", format.extension());
            String::new()
        }
    }
}

fn pdf_text(bytes: &[u8]) -> anyhow::Result<String> {
    // pdf-extract panics on some malformed files.
    std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes))
        .map_err(|_| anyhow!("PDF parser panicked"))?
        .context("Failed to extract PDF text")
}

/// Paragraph texts of `word/document.xml` in document order, trimmed, blank
/// paragraphs dropped, one per line. Table cells and text boxes are included.
fn docx_text(bytes: &[u8]) -> anyhow::Result<String> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).context("DOCX is not a valid ZIP archive")?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .context("DOCX has no word/document.xml")?
        .read_to_string(&mut xml)
        .context("Failed to read word/document.xml")?;

    let doc = roxmltree::Document::parse(&xml).context("word/document.xml is not valid XML")?;
    let paragraphs: Vec<String> = doc
        .descendants()
        .filter(|n| n.has_tag_name((NS_W, "p")))
        .filter(|n| !n.ancestors().any(|a| a.has_tag_name((NS_MC, "Fallback"))))
        .map(paragraph_text)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    Ok(paragraphs.join("\n"))
}

/// Text directly owned by paragraph `p`, excluding nested paragraphs (text boxes).
fn paragraph_text(p: roxmltree::Node) -> String {
    let mut out = String::new();
    for node in p.descendants().skip(1) {
        let nested = node
            .ancestors()
            .take_while(|a| *a != p)
            .any(|a| a.has_tag_name((NS_W, "p")));
        if nested {
            continue;
        }
        match node.tag_name() {
            name if name.namespace() != Some(NS_W) => {}
            name if name.name() == "t" => out.push_str(node.text().unwrap_or_default()),
            name if name.name() == "tab" => out.push('\t'),
            name if name.name() == "br" => out.push(' '),
            _ => {}
        }
    }
    out
}
