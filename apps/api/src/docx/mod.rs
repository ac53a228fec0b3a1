//! Minimal WordprocessingML writer: element tree, document model, unit
//! conversions and the ZIP container.

pub mod document;
pub mod package;
pub mod units;
pub mod xml;

use thiserror::Error;

pub use document::{
    Alignment, BaseFont, Block, Document, FieldChar, PageSetup, Paragraph, Run, StoryKind, Table,
    TableCell, TableRow,
};
pub use package::{write_docx, DOCX_MIME};

#[derive(Debug, Error)]
pub enum DocxError {
    #[error("XML serialization error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
