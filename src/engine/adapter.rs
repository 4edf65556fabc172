//! Degradation-aware engine adapter.
//!
//! [`Engine`] binds a [`TransformBackend`] to its lifecycle rules:
//!
//! - Initialization probes the backend exactly once. Failure is sticky: the
//!   engine is `Degraded` for the rest of the process, with no retry and no
//!   partially initialized state observable.
//! - The accelerator behind the backend is a singleton exclusive resource,
//!   so edits serialize through a width-1 async mutex. The guard is released
//!   by scope on success and failure alike.
//! - Exactly one edit attempt per request. Retry policy belongs to callers,
//!   and the pipeline's policy is: no retry, fall back.

use super::backend::{EngineError, TransformBackend};
use super::params::EditParams;
use crate::capability::EngineConfig;
use image::RgbImage;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

/// The process-wide engine handle: either ready or permanently degraded.
pub enum Engine {
    Ready {
        backend: Arc<dyn TransformBackend>,
        edit_lock: Mutex<()>,
    },
    Degraded,
}

impl Engine {
    /// Probe `backend` and bind it, or degrade. Never fails — an unusable
    /// backend is a service-quality problem, not a startup error.
    pub async fn initialize(backend: Arc<dyn TransformBackend>, cfg: &EngineConfig) -> Self {
        match backend.probe().await {
            Ok(()) => {
                info!(
                    backend = %cfg.backend,
                    precision = %cfg.precision,
                    max_dimension = cfg.max_dimension,
                    "transform engine ready"
                );
                Self::ready(backend)
            }
            Err(e) => {
                // Logged once; every request from here on falls back.
                error!(error = %e, "transform engine failed to initialize, serving degraded");
                Engine::Degraded
            }
        }
    }

    /// Construct a ready engine directly (tests, pre-probed backends).
    pub fn ready(backend: Arc<dyn TransformBackend>) -> Self {
        Engine::Ready {
            backend,
            edit_lock: Mutex::new(()),
        }
    }

    /// Construct the degraded state directly (tests, startup failure).
    pub fn degraded() -> Self {
        Engine::Degraded
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Engine::Degraded)
    }

    /// One edit attempt with the fixed parameter set.
    ///
    /// Degraded engines reject immediately. Ready engines hold the
    /// exclusivity lock for the duration of the backend call.
    pub async fn edit(&self, image: &RgbImage, instruction: &str) -> Result<RgbImage, EngineError> {
        match self {
            Engine::Degraded => Err(EngineError::Degraded),
            Engine::Ready { backend, edit_lock } => {
                let _exclusive = edit_lock.lock().await;
                let params = EditParams::for_instruction(instruction);
                backend.edit(image, &params).await
            }
        }
    }
}
