//! kubesim-workload — pods, containers and their resource totals.
//!
//! Bridges workload descriptions to the resource algebra in
//! `kubesim-resource`. The simulator's scheduler and node model call into
//! this crate to learn how much a pod asks for; they are not part of it.
//!
//! # Components
//!
//! - **`pod`** — `Pod`, `Container`, `ResourceRequirements`
//! - **`aggregate`** — Per-pod and per-node request totals
//! - **`manifest`** — TOML / JSON pod manifests with raw quantity strings

pub mod aggregate;
pub mod error;
pub mod manifest;
pub mod pod;

pub use aggregate::{remaining, total_requests, total_requests_of};
pub use error::{WorkloadError, WorkloadResult};
pub use manifest::{ContainerManifest, Manifest, PodManifest};
pub use pod::{Container, DEFAULT_NAMESPACE, Pod, ResourceRequirements};
