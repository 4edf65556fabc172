//! Hardware capability probing and backend/precision selection.
//!
//! Selection is a pure function from a [`CapabilityReport`] to an
//! [`EngineConfig`], decoupled from the probing mechanism so the policy can
//! be unit-tested with synthetic reports. Probing runs once at process start;
//! the resulting config is immutable for the lifetime of the process.
//!
//! Priority order and precision policy:
//!
//! | Probe hit | Backend | Precision | Max dimension |
//! |-----------|---------|-----------|---------------|
//! | Unified-memory GPU (Apple Silicon) | `metal` | bf16 | 1024 |
//! | Discrete GPU (CUDA) | `cuda` | fp16 | 1536 |
//! | Neither | `cpu` | fp32 | 1024 |
//!
//! Selection never fails. An unusable engine degrades at adapter
//! initialization (see [`crate::engine::Engine`]), never here.

use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Acceleration backend the engine should bind to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Discrete NVIDIA GPU.
    Cuda,
    /// Apple unified-memory GPU.
    Metal,
    /// No acceleration.
    Cpu,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Backend::Cuda => "cuda",
            Backend::Metal => "metal",
            Backend::Cpu => "cpu",
        })
    }
}

/// Numeric precision the engine should run at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    Fp16,
    Bf16,
    Fp32,
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Precision::Fp16 => "fp16",
            Precision::Bf16 => "bf16",
            Precision::Fp32 => "fp32",
        })
    }
}

/// Process-wide engine configuration, fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngineConfig {
    pub backend: Backend,
    pub precision: Precision,
    /// Ceiling for the larger image dimension during preprocessing.
    pub max_dimension: u32,
}

/// Raw result of the hardware probe, before any policy is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapabilityReport {
    pub unified_memory_gpu: bool,
    pub discrete_gpu: bool,
}

impl CapabilityReport {
    /// Probe the running host.
    ///
    /// Unified-memory detection is a compile-target check (Apple Silicon).
    /// Discrete-GPU detection looks for a loaded NVIDIA driver, honoring
    /// `CUDA_VISIBLE_DEVICES=""` as an explicit opt-out.
    pub fn detect() -> Self {
        Self {
            unified_memory_gpu: cfg!(all(target_os = "macos", target_arch = "aarch64")),
            discrete_gpu: nvidia_driver_present(),
        }
    }
}

fn nvidia_driver_present() -> bool {
    if let Some(devices) = std::env::var_os("CUDA_VISIBLE_DEVICES") {
        if devices.is_empty() || devices == *"-1" {
            return false;
        }
    }
    Path::new("/proc/driver/nvidia/version").exists()
}

/// Map a capability report to an engine configuration.
///
/// Pure and total: every report maps to exactly one config, and a host with
/// both GPU kinds prefers the unified-memory path (it is probed first).
pub fn select(report: CapabilityReport) -> EngineConfig {
    if report.unified_memory_gpu {
        EngineConfig {
            backend: Backend::Metal,
            precision: Precision::Bf16,
            max_dimension: 1024,
        }
    } else if report.discrete_gpu {
        EngineConfig {
            backend: Backend::Cuda,
            precision: Precision::Fp16,
            max_dimension: 1536,
        }
    } else {
        EngineConfig {
            backend: Backend::Cpu,
            precision: Precision::Fp32,
            max_dimension: 1024,
        }
    }
}
