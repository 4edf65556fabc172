//! Transform backend trait and error taxonomy.
//!
//! [`TransformBackend`] is the seam between the orchestration pipeline and
//! whatever actually edits pixels. The production implementation is
//! [`RemoteBackend`](super::remote::RemoteBackend); tests swap in the
//! recording `MockBackend` below.

use super::params::EditParams;
use async_trait::async_trait;
use image::RgbImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// The engine failed to initialize and every edit is rejected outright.
    #[error("transform engine is degraded")]
    Degraded,
    /// The backend could not be reached or refused the request.
    #[error("engine request failed: {0}")]
    Request(String),
    /// The backend answered, but not with a usable image.
    #[error("engine returned a malformed image: {0}")]
    BadImage(String),
}

/// The whole contract with the external transformation capability.
#[async_trait]
pub trait TransformBackend: Send + Sync {
    /// Cheap readiness check, run once at adapter initialization.
    async fn probe(&self) -> Result<(), EngineError>;

    /// One synchronous edit attempt. Implementations must convert every
    /// internal fault into an [`EngineError`] — a panic here is a defect.
    async fn edit(&self, image: &RgbImage, params: &EditParams) -> Result<RgbImage, EngineError>;
}
