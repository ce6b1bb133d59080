mod error;
mod office_convert;
mod pdf_to_docx;
mod workspace;

pub use error::{ConvertError, UploadError};
pub use office_convert::LibreOfficeService;
pub use pdf_to_docx::PdfToDocxService;
pub use workspace::Workspace;

use std::sync::Arc;

use crate::{
    application::services::ConverterService,
    domain::{config::settings::Settings, models::job::ConversionKind},
};

pub fn create_converter_service(
    kind: ConversionKind,
    settings: &Settings,
) -> Arc<dyn ConverterService> {
    match kind {
        ConversionKind::PdfToDocx => Arc::new(PdfToDocxService::new()),
        ConversionKind::DocxToPdf | ConversionKind::XlsxToPdf => Arc::new(
            LibreOfficeService::new(settings.soffice_bin.clone(), settings.convert_timeout_secs),
        ),
    }
}
