//! PDF -> DOCX conversion via the embedded pdfium library.
//!
//! pdfium wraps a C++ library with thread-local state, so the whole
//! extraction runs inside `tokio::task::spawn_blocking`. Both the library
//! binding and the document handle are released by drop on every path,
//! including extraction errors.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use docx_rs::{BreakType, Docx, Paragraph, Run};
use pdfium_render::prelude::*;

use crate::application::error::ApplicationError;
use crate::application::services::ConverterService;
use crate::services::error::ConvertError;

pub struct PdfToDocxService;

impl PdfToDocxService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ConverterService for PdfToDocxService {
    async fn convert(
        &self,
        input_path: &Path,
        output_dir: &Path,
    ) -> Result<PathBuf, ApplicationError> {
        let stem = input_path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                ConvertError::Internal(format!(
                    "Input path has no usable stem: {}",
                    input_path.display()
                ))
            })?;
        let out_path = output_dir.join(format!("{}.docx", stem));

        let input = input_path.to_path_buf();
        let out = out_path.clone();
        tokio::task::spawn_blocking(move || convert_blocking(&input, &out))
            .await
            .map_err(|e| ConvertError::Internal(format!("Conversion task panicked: {}", e)))??;

        Ok(out_path)
    }
}

fn convert_blocking(input_path: &Path, out_path: &Path) -> Result<(), ConvertError> {
    let pages = extract_page_text(input_path)?;
    write_docx(&pages, out_path)
}

/// Pull the text of every page. The pdfium handles drop before this
/// returns, whether or not extraction succeeded.
fn extract_page_text(input_path: &Path) -> Result<Vec<String>, ConvertError> {
    let pdfium = Pdfium::default();

    let document = pdfium
        .load_pdf_from_file(input_path, None)
        .map_err(|e| ConvertError::InvalidDocument(format!("{:?}", e)))?;

    let mut pages = Vec::new();
    for page in document.pages().iter() {
        // A page with no extractable text still counts as a page.
        let text = page.text().map(|t| t.all()).unwrap_or_default();
        pages.push(text);
    }

    Ok(pages)
}

/// Assemble the extracted pages into a DOCX, one paragraph per source line
/// and a page break between source pages.
fn write_docx(pages: &[String], out_path: &Path) -> Result<(), ConvertError> {
    let mut docx = Docx::new();

    for (idx, page) in pages.iter().enumerate() {
        if idx > 0 {
            docx = docx
                .add_paragraph(Paragraph::new().add_run(Run::new().add_break(BreakType::Page)));
        }
        for line in page.lines() {
            docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(line)));
        }
    }

    let file = std::fs::File::create(out_path)?;
    docx.build()
        .pack(file)
        .map_err(|e| ConvertError::Internal(format!("Failed to pack docx: {}", e)))?;

    Ok(())
}
