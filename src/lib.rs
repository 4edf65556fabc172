//! # Promptbrush
//!
//! A small web service for instruction-driven image editing. Upload an image,
//! type what you want changed ("make the sky purple"), and get the edited
//! image back from an external diffusion engine — or, when the engine is
//! unavailable or fails, a graceful copy of the normalized original.
//!
//! # Architecture: Orchestration Over an Opaque Engine
//!
//! The transformation engine itself (model weights, numeric kernels, the GPU)
//! is deliberately out of process, behind a tiny JSON/HTTP contract. This
//! crate owns everything around it:
//!
//! ```text
//! POST /upload → validate → store upload → normalize → edit ──ok──→ store result
//!                                              │          │
//!                                              │        failed
//!                                              └──────────┴─────→ store normalized copy
//! ```
//!
//! Every request ends in a well-formed outcome. Engine failures are contained
//! inside the pipeline and reported as a degraded-but-successful page, never
//! as a crash or an HTTP 5xx.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`capability`] | Hardware probe and pure (backend, precision, ceiling) selection |
//! | [`engine`] | Transform engine trait, fixed invocation params, HTTP sidecar client, degradation-aware adapter |
//! | [`preprocess`] | Decode → RGB8 → aspect-preserving Lanczos3 downscale |
//! | [`pipeline`] | Request validation and the edit-or-fallback orchestration |
//! | [`store`] | Append-only filesystem artifact store with traversal-safe retrieval |
//! | [`naming`] | Filename sanitization and uuid-prefixed unique names |
//! | [`config`] | Environment-layered application configuration |
//! | [`pages`] | Maud-rendered submission and result views |
//! | [`flash`] | Signed one-shot flash messages |
//! | [`server`] | Axum router: form, multipart upload, artifact streaming |
//!
//! # Design Decisions
//!
//! ## Degradation as a Value, Not a Global
//!
//! Whether the engine is usable is decided once at startup and captured in an
//! explicit two-state [`engine::Engine`] value (`Ready` / `Degraded`) that is
//! threaded into the pipeline. Tests construct either state directly; there
//! is no ambient flag to set up or tear down.
//!
//! ## Fallback as a First-Class Branch
//!
//! "Try the engine, copy the original on failure" is modeled as
//! [`pipeline::Disposition`] (`Transformed` vs `Fallback`) rather than an
//! error-unwinding afterthought, so the fallback path is as testable as the
//! happy path.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/): compile-time
//! checked, type-safe, auto-escaped, and with no template directory to ship
//! or get out of sync.
//!
//! ## Filesystem as the Only Store
//!
//! Artifacts live in two flat directories (`uploads/`, `output/`) under names
//! that are unique by construction (uuid prefix + sanitized original name).
//! No database, no index file — the naming convention is the only persisted
//! state, and the no-overwrite invariant removes any need for write locking.

pub mod capability;
pub mod config;
pub mod engine;
pub mod flash;
pub mod naming;
pub mod pages;
pub mod pipeline;
pub mod preprocess;
pub mod server;
pub mod store;
