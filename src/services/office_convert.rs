use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::application::error::ApplicationError;
use crate::application::services::ConverterService;
use crate::services::error::ConvertError;

/// Converter backed by a headless LibreOffice process.
///
/// Serves both the DOCX -> PDF and XLSX -> PDF routes; LibreOffice infers
/// the input format itself and writes `<input stem>.pdf` into the output
/// directory.
pub struct LibreOfficeService {
    program: String,
    timeout_secs: u64,
}

impl LibreOfficeService {
    pub fn new(program: String, timeout_secs: u64) -> Self {
        Self {
            program,
            timeout_secs,
        }
    }

    fn expected_output(input_path: &Path, output_dir: &Path) -> Result<PathBuf, ConvertError> {
        let stem = input_path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                ConvertError::Internal(format!(
                    "Input path has no usable stem: {}",
                    input_path.display()
                ))
            })?;
        Ok(output_dir.join(format!("{}.pdf", stem)))
    }

    async fn run(&self, input_path: &Path, output_dir: &Path) -> Result<(), ConvertError> {
        let output = tokio::time::timeout(
            Duration::from_secs(self.timeout_secs),
            Command::new(&self.program)
                .arg("--headless")
                .arg("--convert-to")
                .arg("pdf")
                .arg("--outdir")
                .arg(output_dir)
                .arg(input_path)
                .output(),
        )
        .await
        .map_err(|_| ConvertError::Timeout(self.timeout_secs))?
        .map_err(|e| ConvertError::Launch(format!("{}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ConvertError::Tool {
                status: output.status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl ConverterService for LibreOfficeService {
    async fn convert(
        &self,
        input_path: &Path,
        output_dir: &Path,
    ) -> Result<PathBuf, ApplicationError> {
        let out_path = Self::expected_output(input_path, output_dir)?;

        debug!(
            input = %input_path.display(),
            outdir = %output_dir.display(),
            program = %self.program,
            "Converting with LibreOffice"
        );

        self.run(input_path, output_dir).await?;

        // LibreOffice reports success in some degenerate cases without
        // writing a file; surface that as a converter failure rather than
        // handing the caller a dangling path.
        if !out_path.exists() {
            return Err(ConvertError::MissingOutput(out_path).into());
        }

        Ok(out_path)
    }
}
