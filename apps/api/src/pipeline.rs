//! End-to-end conversion: extract → structure → render.
//!
//! Extraction and rendering are blocking and run on the blocking pool. The
//! structuring call is the only long await. Any failure aborts the whole
//! conversion.

use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::docx::DocxError;
use crate::extraction::{self, ExtractError, SourceFormat};
use crate::models::cv::CvRecord;
use crate::render::{self, RenderOptions};
use crate::structuring::{CvStructurer, StructureError};

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("{0}")]
    Input(String),

    #[error("Format non supporté ({0}). Envoyez un fichier PDF ou DOCX.")]
    UnsupportedFormat(String),

    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    MalformedResponse(String),

    #[error("{0}")]
    Configuration(String),

    #[error("Rendering failed: {0}")]
    Render(#[from] DocxError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ExtractError> for ConvertError {
    fn from(e: ExtractError) -> Self {
        match e {
            ExtractError::UnsupportedFormat(ext) => ConvertError::UnsupportedFormat(ext),
            ExtractError::Io { path, source } => {
                ConvertError::Io(std::io::Error::new(source.kind(), format!("{path}: {source}")))
            }
        }
    }
}

impl From<StructureError> for ConvertError {
    fn from(e: StructureError) -> Self {
        match e {
            StructureError::Configuration(m) => ConvertError::Configuration(m),
            StructureError::Upstream(m) => ConvertError::Upstream(m),
            StructureError::MalformedResponse(m) => ConvertError::MalformedResponse(m),
        }
    }
}

/// Result of one conversion.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub record: CvRecord,
    pub docx: Vec<u8>,
}

/// Converts the résumé stored at `path`.
pub async fn convert_document(
    path: &Path,
    structurer: &dyn CvStructurer,
    options: &RenderOptions,
) -> Result<Conversion, ConvertError> {
    SourceFormat::detect(&path.to_string_lossy())?;

    let owned: PathBuf = path.to_path_buf();
    let text = tokio::task::spawn_blocking(move || extraction::extract_text(&owned))
        .await
        .map_err(|e| ConvertError::Internal(format!("extraction task failed: {e}")))??;

    if text.trim().is_empty() {
        return Err(ConvertError::Input(
            "Impossible d'extraire le texte du CV. Le fichier semble vide ou protégé.".to_string(),
        ));
    }
    info!(
        "Extracted {} characters from {}",
        text.chars().count(),
        path.display()
    );

    let record = structurer.structure(&text).await?;

    let options = options.clone();
    let (record, docx) = tokio::task::spawn_blocking(move || {
        render::render_cv(&record, &options).map(|docx| (record, docx))
    })
    .await
    .map_err(|e| ConvertError::Internal(format!("render task failed: {e}")))??;

    info!("Converted {} into {} bytes of DOCX", path.display(), docx.len());
    Ok(Conversion { record, docx })
}

/// Converts uploaded bytes. The upload is written to a temporary file in
/// `upload_dir` that is removed whichever way the conversion ends.
pub async fn convert_upload(
    bytes: &[u8],
    filename: &str,
    upload_dir: &Path,
    structurer: &dyn CvStructurer,
    options: &RenderOptions,
) -> Result<Conversion, ConvertError> {
    if filename.trim().is_empty() {
        return Err(ConvertError::Input("Nom de fichier vide.".to_string()));
    }
    let format = SourceFormat::detect(filename)?;

    let mut upload = tempfile::Builder::new()
        .prefix("cv_upload_")
        .suffix(&format!(".{}", format.extension()))
        .tempfile_in(upload_dir)?;
    upload.write_all(bytes)?;
    upload.flush()?;

    let result = convert_document(upload.path(), structurer, options).await;
    if let Err(e) = upload.close() {
        warn!("Could not remove temporary upload: {e}");
    }
    result
}

/// `CV_Maltem_<Name>[_<suffix>].docx`, restricted to characters safe in a
/// file name and an HTTP header.
pub fn output_file_name(full_name: &str, suffix: Option<&str>) -> String {
    let mut name: String = full_name
        .trim()
        .chars()
        .map(fold_accent)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if name.trim_matches('_').is_empty() {
        name = "CV".to_string();
    }
    match suffix {
        Some(suffix) => format!("CV_Maltem_{name}_{suffix}.docx"),
        None => format!("CV_Maltem_{name}.docx"),
    }
}

fn fold_accent(c: char) -> char {
    match c {
        'à' | 'â' | 'ä' | 'á' | 'ã' => 'a',
        'À' | 'Â' | 'Ä' | 'Á' | 'Ã' => 'A',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'î' | 'ï' | 'í' => 'i',
        'Î' | 'Ï' | 'Í' => 'I',
        'ô' | 'ö' | 'ó' | 'õ' => 'o',
        'Ô' | 'Ö' | 'Ó' | 'Õ' => 'O',
        'ù' | 'û' | 'ü' | 'ú' => 'u',
        'Ù' | 'Û' | 'Ü' | 'Ú' => 'U',
        'ç' => 'c',
        'Ç' => 'C',
        'ñ' => 'n',
        'Ñ' => 'N',
        other => other,
    }
}
