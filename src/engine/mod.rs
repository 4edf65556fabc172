//! The transform engine seam.
//!
//! The actual image-transformation capability (a diffusion model on a GPU)
//! is opaque to this crate: [`backend::TransformBackend`] is the whole
//! contract, [`remote::RemoteBackend`] is the production binding to an
//! out-of-process inference sidecar, and [`adapter::Engine`] owns lifecycle
//! (initialize-or-degrade) and the accelerator exclusivity lock.

pub mod adapter;
pub mod backend;
pub mod params;
pub mod remote;

pub use adapter::Engine;
pub use backend::{EngineError, TransformBackend};
pub use params::EditParams;
pub use remote::RemoteBackend;
