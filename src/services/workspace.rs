use std::io;
use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::Response;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::warn;
use uuid::Uuid;

use crate::application::error::ApplicationError;
use crate::domain::models::job::UploadJob;
use crate::services::error::UploadError;

/// Owner of the two scratch directories and of every file operation in the
/// upload/convert/deliver pipeline.
///
/// Constructed once at startup and injected through `AppState`; tests build
/// their own over temporary directories.
#[derive(Debug)]
pub struct Workspace {
    upload_dir: PathBuf,
    output_dir: PathBuf,
}

impl Workspace {
    /// Create the workspace, making both scratch directories if absent.
    pub fn new(upload_dir: PathBuf, output_dir: PathBuf) -> io::Result<Self> {
        std::fs::create_dir_all(&upload_dir)?;
        std::fs::create_dir_all(&output_dir)?;
        Ok(Self {
            upload_dir,
            output_dir,
        })
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Allocate scratch paths for one upload.
    ///
    /// The on-disk source name is `<job id>.<ext>`; only the extension of
    /// the caller-supplied name is kept, so the name can never escape the
    /// upload directory or collide with another job. Each job also gets a
    /// private output directory `<output>/<job id>/`, which keeps
    /// same-stem conversions disjoint under concurrent load.
    pub fn stage(&self, original_filename: &str) -> Result<UploadJob, ApplicationError> {
        let id = Uuid::new_v4();

        let source_name = match Path::new(original_filename)
            .extension()
            .and_then(|e| e.to_str())
        {
            Some(ext) => format!("{}.{}", id, ext.to_lowercase()),
            None => id.to_string(),
        };
        let source_path = self.upload_dir.join(source_name);

        let output_dir = self.output_dir.join(id.to_string());
        std::fs::create_dir_all(&output_dir).map_err(|e| {
            ApplicationError::InternalError(format!("Failed to create job output dir: {}", e))
        })?;

        Ok(UploadJob::new(
            id,
            original_filename.to_string(),
            source_path,
            output_dir,
        ))
    }

    /// Stream `source` into `dest`, enforcing a hard byte cap.
    ///
    /// Chunks are written as they arrive; the running total is checked
    /// before each write and the call fails with [`UploadError::TooLarge`]
    /// the moment it exceeds `max_bytes`. The partial file is removed on
    /// every early exit, including the future being dropped because the
    /// client went away.
    pub async fn save_capped<S, E>(
        &self,
        source: S,
        dest: &Path,
        max_bytes: u64,
    ) -> Result<u64, UploadError>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: std::fmt::Display,
    {
        futures::pin_mut!(source);

        let mut file = tokio::fs::File::create(dest).await?;
        let guard = PartialFileGuard::new(dest.to_path_buf());
        let mut written: u64 = 0;

        while let Some(chunk) = source.next().await {
            let chunk = chunk.map_err(|e| UploadError::Stream(e.to_string()))?;
            written += chunk.len() as u64;
            if written > max_bytes {
                return Err(UploadError::TooLarge(max_bytes));
            }
            file.write_all(&chunk).await?;
        }

        file.flush().await?;
        guard.keep();
        Ok(written)
    }

    /// Best-effort removal of a scratch file. Absence is not an error;
    /// anything else is logged and swallowed.
    pub fn delete(&self, path: &Path) {
        if let Err(e) = std::fs::remove_file(path) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(path = %path.display(), error = %e, "Failed to remove scratch file");
            }
        }
    }

    /// Best-effort removal of a per-job directory and its contents.
    pub fn remove_dir(&self, dir: &Path) {
        if let Err(e) = std::fs::remove_dir_all(dir) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(path = %dir.display(), error = %e, "Failed to remove scratch dir");
            }
        }
    }

    /// Stream a converted file to the caller, then delete it.
    ///
    /// Ownership of the job's output directory moves into the response body
    /// stream. When the stream is dropped, after the last byte is
    /// transmitted or mid-stream when the client aborts, the directory and
    /// the file inside it are removed. Deletion is therefore ordered
    /// strictly after the transmission window, never before or during.
    pub async fn deliver_and_delete(
        &self,
        output_dir: PathBuf,
        output_path: &Path,
        display_filename: &str,
        media_type: &str,
    ) -> Result<Response, ApplicationError> {
        // Constructed before the open so an unreadable output still gets
        // reclaimed when the guard drops on the error return.
        let guard = RemoveDirOnDrop::new(output_dir);

        let file = tokio::fs::File::open(output_path).await.map_err(|e| {
            ApplicationError::InternalError(format!("Failed to open converted file: {}", e))
        })?;
        let content_length = file.metadata().await.ok().map(|m| m.len());

        let stream = ReaderStream::new(file).map(move |chunk| {
            let _ = &guard;
            chunk
        });

        let mut builder = Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, media_type)
            .header(
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", display_filename),
            );
        if let Some(len) = content_length {
            builder = builder.header(header::CONTENT_LENGTH, len);
        }

        Ok(builder.body(Body::from_stream(stream)).unwrap())
    }
}

/// Removes a partially written upload unless defused by a completed write.
struct PartialFileGuard {
    path: Option<PathBuf>,
}

impl PartialFileGuard {
    fn new(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    fn keep(mut self) {
        self.path = None;
    }
}

impl Drop for PartialFileGuard {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

/// Removes a per-job output directory when dropped.
///
/// Deletion goes through the runtime when one is available so a large file
/// does not block the worker thread that happens to drop the stream.
struct RemoveDirOnDrop {
    path: PathBuf,
}

impl RemoveDirOnDrop {
    fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Drop for RemoveDirOnDrop {
    fn drop(&mut self) {
        let path = std::mem::take(&mut self.path);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    let _ = tokio::fs::remove_dir_all(&path).await;
                });
            }
            Err(_) => {
                let _ = std::fs::remove_dir_all(&path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn chunks(parts: &[&[u8]]) -> impl Stream<Item = Result<Bytes, std::convert::Infallible>> + Unpin {
        stream::iter(
            parts
                .iter()
                .map(|p| Ok(Bytes::copy_from_slice(p)))
                .collect::<Vec<_>>(),
        )
    }

    fn test_workspace() -> (tempfile::TempDir, Workspace) {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(
            dir.path().join("temp_uploads"),
            dir.path().join("temp_outputs"),
        )
        .unwrap();
        (dir, workspace)
    }

    #[tokio::test]
    async fn save_capped_writes_identical_bytes_under_cap() {
        let (_dir, workspace) = test_workspace();
        let dest = workspace.upload_dir().join("under.bin");

        let written = workspace
            .save_capped(chunks(&[b"hello ", b"world"]), &dest, 1000)
            .await
            .unwrap();

        assert_eq!(written, 11);
        assert_eq!(std::fs::read(&dest).unwrap(), b"hello world");
    }

    #[tokio::test]
    async fn save_capped_exact_cap_succeeds() {
        let (_dir, workspace) = test_workspace();
        let dest = workspace.upload_dir().join("exact.bin");

        let written = workspace
            .save_capped(chunks(&[b"12345"]), &dest, 5)
            .await
            .unwrap();

        assert_eq!(written, 5);
        assert!(dest.exists());
    }

    #[tokio::test]
    async fn save_capped_over_cap_fails_and_leaves_no_file() {
        let (_dir, workspace) = test_workspace();
        let dest = workspace.upload_dir().join("over.bin");

        let result = workspace
            .save_capped(chunks(&[b"12345", b"67890", b"x"]), &dest, 10)
            .await;

        match result {
            Err(UploadError::TooLarge(limit)) => assert_eq!(limit, 10),
            other => panic!("expected TooLarge, got {:?}", other.map(|_| ())),
        }
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn save_capped_stream_error_leaves_no_file() {
        let (_dir, workspace) = test_workspace();
        let dest = workspace.upload_dir().join("broken.bin");

        let source = stream::iter(vec![
            Ok(Bytes::from_static(b"start")),
            Err("connection reset"),
        ]);

        let result = workspace.save_capped(source, &dest, 1000).await;

        assert!(matches!(result, Err(UploadError::Stream(_))));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn save_capped_cancellation_leaves_no_file() {
        let (_dir, workspace) = test_workspace();
        let dest = workspace.upload_dir().join("cancelled.bin");

        // A stream that never finishes, simulating a stalled client.
        let source = stream::iter(vec![Ok::<_, std::convert::Infallible>(Bytes::from_static(
            b"start",
        ))])
        .chain(stream::pending());

        let save = workspace.save_capped(source, &dest, 1000);
        tokio::select! {
            _ = save => panic!("save should not complete"),
            _ = tokio::time::sleep(std::time::Duration::from_millis(50)) => {}
        }

        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn stage_assigns_disjoint_paths_for_same_filename() {
        let (_dir, workspace) = test_workspace();

        let a = workspace.stage("report.xlsx").unwrap();
        let b = workspace.stage("report.xlsx").unwrap();

        assert_ne!(a.source_path, b.source_path);
        assert_ne!(a.output_dir, b.output_dir);
        assert!(a.output_dir.exists());
        assert!(b.output_dir.exists());
    }

    #[tokio::test]
    async fn stage_never_uses_caller_name_as_path() {
        let (_dir, workspace) = test_workspace();

        let job = workspace.stage("../../../etc/passwd").unwrap();

        assert!(job.source_path.starts_with(workspace.upload_dir()));
        assert_eq!(
            job.source_path.parent().unwrap(),
            workspace.upload_dir(),
            "staged file must sit directly inside the upload dir"
        );
    }

    #[test]
    fn delete_tolerates_missing_file() {
        let (_dir, workspace) = test_workspace();
        workspace.delete(&workspace.upload_dir().join("never-existed.pdf"));
    }

    #[tokio::test]
    async fn deliver_and_delete_streams_bytes_then_removes_dir() {
        let (_dir, workspace) = test_workspace();

        let job_dir = workspace.output_dir().join("job");
        std::fs::create_dir_all(&job_dir).unwrap();
        let out_path = job_dir.join("report.pdf");
        std::fs::write(&out_path, b"%PDF-1.7 fake").unwrap();

        let response = workspace
            .deliver_and_delete(job_dir.clone(), &out_path, "report.pdf", "application/pdf")
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/pdf"
        );
        assert_eq!(
            response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=\"report.pdf\""
        );

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"%PDF-1.7 fake");

        // Deletion is spawned when the stream drops; give it a moment.
        for _ in 0..50 {
            if !job_dir.exists() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert!(!job_dir.exists());
    }

    #[tokio::test]
    async fn deliver_and_delete_aborted_stream_still_removes_dir() {
        let (_dir, workspace) = test_workspace();

        let job_dir = workspace.output_dir().join("aborted");
        std::fs::create_dir_all(&job_dir).unwrap();
        let out_path = job_dir.join("big.docx");
        std::fs::write(&out_path, vec![0u8; 256 * 1024]).unwrap();

        let response = workspace
            .deliver_and_delete(
                job_dir.clone(),
                &out_path,
                "big.docx",
                crate::domain::models::job::DOCX_MEDIA_TYPE,
            )
            .await
            .unwrap();

        // Drop the body without reading it, as a disconnecting client would.
        drop(response);

        for _ in 0..50 {
            if !job_dir.exists() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert!(!job_dir.exists());
    }
}
