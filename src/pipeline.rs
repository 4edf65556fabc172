//! The request orchestration pipeline.
//!
//! [`Pipeline::handle`] is the heart of the service: validate the inbound
//! (file, instruction) pair, persist the upload, normalize it, attempt one
//! edit, and materialize a result. Failures past validation never escape as
//! errors — the transform failing, or even the result persist failing, still
//! produces a well-formed [`EditOutcome`]. The fallback path ("copy the
//! normalized original") is an explicit branch, [`Disposition::Fallback`],
//! not an unwinding afterthought.
//!
//! Ordering matters: the four cheap validations reject before anything is
//! persisted. Decode failure is also a validation failure, but by then the
//! raw upload is already durable — that is by specification, so a user can
//! still retrieve what they sent.

use crate::capability::EngineConfig;
use crate::engine::Engine;
use crate::preprocess;
use crate::store::{ArtifactKind, ArtifactStore, StoreError};
use image::{ImageFormat, RgbImage};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, warn};

/// The closed set of accepted upload extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageExt {
    Png,
    Jpg,
    Jpeg,
    Gif,
}

impl ImageExt {
    /// Parse the extension off a filename, case-insensitively.
    pub fn from_filename(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ImageExt::Png),
            "jpg" => Some(ImageExt::Jpg),
            "jpeg" => Some(ImageExt::Jpeg),
            "gif" => Some(ImageExt::Gif),
            _ => None,
        }
    }

    /// Encoding format for result artifacts of this extension.
    pub fn image_format(self) -> ImageFormat {
        match self {
            ImageExt::Png => ImageFormat::Png,
            ImageExt::Jpg | ImageExt::Jpeg => ImageFormat::Jpeg,
            ImageExt::Gif => ImageFormat::Gif,
        }
    }
}

/// One inbound edit request, discarded after the pipeline completes.
#[derive(Debug)]
pub struct EditRequest {
    pub instruction: String,
    pub source_bytes: Vec<u8>,
    pub original_name: String,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No file selected")]
    MissingFile,
    #[error("Please provide editing instructions")]
    EmptyInstruction,
    #[error("Invalid file type. Please upload PNG, JPG, JPEG, or GIF files.")]
    DisallowedExtension,
    #[error("File is too large (limit is {0} MiB)")]
    Oversized(usize),
    #[error("The uploaded file could not be read as an image")]
    UndecodableImage,
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),
    #[error("internal task failure: {0}")]
    Internal(String),
}

/// Which branch produced the result artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// The engine edited the image.
    Transformed,
    /// The normalized original was copied instead (engine degraded, edit
    /// failed, or result persist failed).
    Fallback,
}

/// Structured outcome handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    pub upload_id: String,
    /// Present unless even the fallback persist failed.
    pub result_id: Option<String>,
    pub disposition: Disposition,
}

impl EditOutcome {
    pub fn succeeded(&self) -> bool {
        self.disposition == Disposition::Transformed
    }
}

/// The orchestrator. Holds the immutable engine config and shares the store
/// and engine across concurrent requests.
pub struct Pipeline {
    store: Arc<ArtifactStore>,
    engine: Arc<Engine>,
    cfg: EngineConfig,
    max_upload_bytes: usize,
}

impl Pipeline {
    pub fn new(
        store: Arc<ArtifactStore>,
        engine: Arc<Engine>,
        cfg: EngineConfig,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            store,
            engine,
            cfg,
            max_upload_bytes,
        }
    }

    /// Validate per the data-model invariants, rejecting on first violation.
    fn validate(&self, req: &EditRequest) -> Result<ImageExt, ValidationError> {
        if req.original_name.is_empty() || req.source_bytes.is_empty() {
            return Err(ValidationError::MissingFile);
        }
        if req.instruction.trim().is_empty() {
            return Err(ValidationError::EmptyInstruction);
        }
        let ext = ImageExt::from_filename(&req.original_name)
            .ok_or(ValidationError::DisallowedExtension)?;
        if req.source_bytes.len() > self.max_upload_bytes {
            return Err(ValidationError::Oversized(
                self.max_upload_bytes / (1024 * 1024),
            ));
        }
        Ok(ext)
    }

    /// Run one request through the pipeline.
    ///
    /// Errors only for validation failures and for an upload that could not
    /// be persisted at all. Everything downstream of a durable upload is
    /// folded into the returned [`EditOutcome`].
    pub async fn handle(&self, req: EditRequest) -> Result<EditOutcome, PipelineError> {
        let ext = self.validate(&req)?;
        let instruction = req.instruction.trim().to_string();

        let upload = self
            .store
            .put(&req.source_bytes, ArtifactKind::Upload, &req.original_name)?;

        // Decode and downscale off the async executor.
        let max_dimension = self.cfg.max_dimension;
        let source_bytes = req.source_bytes;
        let normalized = run_blocking(move || preprocess::normalize(&source_bytes, max_dimension))
            .await?
            .map_err(|_| ValidationError::UndecodableImage)?;

        let (edited, disposition) = if self.engine.is_degraded() {
            (None, Disposition::Fallback)
        } else {
            match self.engine.edit(&normalized, &instruction).await {
                Ok(img) => (Some(img), Disposition::Transformed),
                Err(e) => {
                    // One attempt per request; the fallback is the sole
                    // recovery path.
                    warn!(upload = %upload.id, error = %e, "transform failed, falling back");
                    (None, Disposition::Fallback)
                }
            }
        };

        let result_image = edited.unwrap_or(normalized);
        let result_id = format!("processed_{}", upload.id);
        match self.persist_result(result_image, ext, &result_id).await {
            Ok(()) => Ok(EditOutcome {
                upload_id: upload.id,
                result_id: Some(result_id),
                disposition,
            }),
            Err(e) => {
                // Best-effort: report total failure, never raise.
                error!(upload = %upload.id, error = %e, "result persist failed");
                Ok(EditOutcome {
                    upload_id: upload.id,
                    result_id: None,
                    disposition: Disposition::Fallback,
                })
            }
        }
    }

    async fn persist_result(
        &self,
        image: RgbImage,
        ext: ImageExt,
        result_id: &str,
    ) -> Result<(), PipelineError> {
        let encoded = run_blocking(move || preprocess::encode(&image, ext.image_format()))
            .await?
            .map_err(|e| PipelineError::Internal(e.to_string()))?;
        self.store
            .put_exact(&encoded, ArtifactKind::Result, result_id)?;
        Ok(())
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T, PipelineError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| PipelineError::Internal(e.to_string()))
}
