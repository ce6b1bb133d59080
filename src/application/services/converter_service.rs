use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::application::error::ApplicationError;

/// Uniform contract over the heterogeneous conversion backends.
///
/// A converter takes a staged input file and a private output directory and
/// either produces exactly one output file inside that directory or fails.
/// It never touches the input beyond reading it; intake and cleanup belong
/// to the caller.
#[async_trait]
pub trait ConverterService: Send + Sync {
    async fn convert(&self, input_path: &Path, output_dir: &Path)
        -> Result<PathBuf, ApplicationError>;
}
