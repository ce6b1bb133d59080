use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct UploadFileResponse {
    pub message: String,
    pub filename: String,
}
