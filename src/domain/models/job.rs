use std::fmt;
use std::path::PathBuf;

use uuid::Uuid;

pub const DOCX_MEDIA_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// The three supported conversion routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionKind {
    PdfToDocx,
    DocxToPdf,
    XlsxToPdf,
}

impl ConversionKind {
    /// Whether the declared filename carries an acceptable suffix for this
    /// route. Matches on the lowercased suffix only, like the original
    /// service did.
    pub fn accepts(&self, filename: &str) -> bool {
        let lower = filename.to_lowercase();
        match self {
            ConversionKind::PdfToDocx => lower.ends_with(".pdf"),
            ConversionKind::DocxToPdf => lower.ends_with(".docx"),
            ConversionKind::XlsxToPdf => lower.ends_with(".xls") || lower.ends_with(".xlsx"),
        }
    }

    pub fn rejection_detail(&self) -> &'static str {
        match self {
            ConversionKind::PdfToDocx => "Please upload a .pdf file",
            ConversionKind::DocxToPdf => "Please upload a .docx file",
            ConversionKind::XlsxToPdf => "Please upload an Excel file (.xls or .xlsx)",
        }
    }

    pub fn target_extension(&self) -> &'static str {
        match self {
            ConversionKind::PdfToDocx => "docx",
            ConversionKind::DocxToPdf | ConversionKind::XlsxToPdf => "pdf",
        }
    }

    /// Media type of the converted file returned to the caller.
    pub fn media_type(&self) -> &'static str {
        match self {
            ConversionKind::PdfToDocx => DOCX_MEDIA_TYPE,
            ConversionKind::DocxToPdf | ConversionKind::XlsxToPdf => PDF_MEDIA_TYPE,
        }
    }
}

impl fmt::Display for ConversionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConversionKind::PdfToDocx => "pdf->docx",
            ConversionKind::DocxToPdf => "docx->pdf",
            ConversionKind::XlsxToPdf => "xlsx->pdf",
        };
        f.write_str(name)
    }
}

/// Per-request record tracking one uploaded file through intake, conversion,
/// and cleanup.
///
/// The job owns its scratch paths: the staged source file and a private
/// output directory keyed by the job id. Dropping the job removes both, so
/// any early exit from a handler (rejection, upload failure, converter
/// failure, or the request future being dropped mid-flight) leaves nothing
/// behind. [`UploadJob::release`] hands the output directory over once its
/// lifetime is tied to the response stream instead.
#[derive(Debug)]
pub struct UploadJob {
    pub id: Uuid,
    pub original_filename: String,
    pub source_path: PathBuf,
    pub output_dir: PathBuf,
    released: bool,
}

impl UploadJob {
    pub fn new(id: Uuid, original_filename: String, source_path: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            id,
            original_filename,
            source_path,
            output_dir,
            released: false,
        }
    }

    /// Filename advertised to the caller for the converted file: the
    /// sanitized stem of the uploaded name plus the route's target
    /// extension.
    pub fn output_display_name(&self, kind: ConversionKind) -> String {
        let stem = std::path::Path::new(&self.original_filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("converted");
        format!("{}.{}", sanitize_display_name(stem), kind.target_extension())
    }

    /// Defuse the drop cleanup and hand the output directory to the caller.
    /// The source file must already be gone by the time this is called.
    pub fn release(mut self) -> PathBuf {
        self.released = true;
        std::mem::take(&mut self.output_dir)
    }
}

impl Drop for UploadJob {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let _ = std::fs::remove_file(&self.source_path);
        let _ = std::fs::remove_dir_all(&self.output_dir);
    }
}

/// Reduce a caller-supplied name to something safe inside a
/// `Content-Disposition` header.
fn sanitize_display_name(name: &str) -> String {
    let safe = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect::<String>();

    if safe.is_empty() {
        "converted".to_string()
    } else {
        safe
    }
}
