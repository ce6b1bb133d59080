use axum::extract::FromRef;
use std::sync::Arc;

use crate::{
    application::services::ConverterService,
    domain::{config::settings::Settings, models::job::ConversionKind},
    services::Workspace,
};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub workspace: Arc<Workspace>,
    #[from_ref(skip)]
    pub pdf_to_docx: Arc<dyn ConverterService>,
    #[from_ref(skip)]
    pub office_to_pdf: Arc<dyn ConverterService>,
}

impl AppState {
    pub fn converter_for(&self, kind: ConversionKind) -> Arc<dyn ConverterService> {
        match kind {
            ConversionKind::PdfToDocx => self.pdf_to_docx.clone(),
            ConversionKind::DocxToPdf | ConversionKind::XlsxToPdf => self.office_to_pdf.clone(),
        }
    }
}
