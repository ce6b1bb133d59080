use std::path::PathBuf;

pub const DEFAULT_API_KEY: &str = "dev-key-change-me";

const DEFAULT_MAX_UPLOAD_BYTES: u64 = 25 * 1024 * 1024;
const DEFAULT_CONVERT_TIMEOUT_SECS: u64 = 120;

/// Process configuration, read once from the environment at startup and
/// injected through `AppState` rather than consulted ambiently.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Shared secret expected in the `X-API-Key` header.
    pub api_key: String,
    /// Hard cap on uploaded file size, in bytes.
    pub max_upload_bytes: u64,
    /// Scratch directory for staged uploads.
    pub upload_dir: PathBuf,
    /// Scratch directory for per-job conversion outputs.
    pub output_dir: PathBuf,
    pub port: u16,
    /// Program invoked for office conversions.
    pub soffice_bin: String,
    /// Wall-clock limit for one external conversion.
    pub convert_timeout_secs: u64,
}

impl Settings {
    pub fn from_env() -> Self {
        let api_key = std::env::var("API_KEY").unwrap_or_else(|_| DEFAULT_API_KEY.to_string());

        let max_upload_bytes = std::env::var("MAX_UPLOAD_BYTES")
            .map(|v| {
                v.parse::<u64>()
                    .expect("MAX_UPLOAD_BYTES must be a valid u64")
            })
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        let upload_dir = std::env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("temp_uploads"));

        let output_dir = std::env::var("OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("temp_outputs"));

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .expect("PORT must be a valid u16");

        let soffice_bin =
            std::env::var("SOFFICE_BIN").unwrap_or_else(|_| "libreoffice".to_string());

        let convert_timeout_secs = std::env::var("CONVERT_TIMEOUT_SECS")
            .map(|v| {
                v.parse::<u64>()
                    .expect("CONVERT_TIMEOUT_SECS must be a valid u64")
            })
            .unwrap_or(DEFAULT_CONVERT_TIMEOUT_SECS);

        Self {
            api_key,
            max_upload_bytes,
            upload_dir,
            output_dir,
            port,
            soffice_bin,
            convert_timeout_secs,
        }
    }

    /// True while the process still runs with the insecure placeholder key.
    pub fn uses_default_api_key(&self) -> bool {
        self.api_key == DEFAULT_API_KEY
    }
}
