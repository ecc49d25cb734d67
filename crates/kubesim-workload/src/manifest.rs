//! Pod manifest parser.
//!
//! Manifests are TOML (or JSON, by `.json` extension) files holding one or
//! more pods with raw resource strings:
//!
//! ```toml
//! [[pod]]
//! name = "trainer"
//!
//! [[pod.containers]]
//! name = "main"
//! [pod.containers.requests]
//! cpu = "3"
//! memory = "5Gi"
//! "nvidia.com/gpu" = "1"
//! ```
//!
//! Values may also be bare integers (`cpu = 4`). Raw values are validated
//! by the list builder when a manifest is turned into [`Pod`]s.

use std::collections::BTreeMap;
use std::path::Path;

use kubesim_resource::{RawQuantity, ResourceList, build};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{WorkloadError, WorkloadResult};
use crate::pod::{Container, DEFAULT_NAMESPACE, Pod, ResourceRequirements};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default, rename = "pod")]
    pub pods: Vec<PodManifest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PodManifest {
    pub name: String,
    pub namespace: Option<String>,
    #[serde(default)]
    pub containers: Vec<ContainerManifest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerManifest {
    pub name: String,
    #[serde(default)]
    pub requests: BTreeMap<String, RawQuantity>,
    #[serde(default)]
    pub limits: BTreeMap<String, RawQuantity>,
}

impl Manifest {
    pub fn from_file(path: &Path) -> WorkloadResult<Self> {
        info!(path = %path.display(), "loading pod manifest");
        let content = std::fs::read_to_string(path)?;
        if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    pub fn from_toml_str(content: &str) -> WorkloadResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> WorkloadResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> WorkloadResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate every pod. Fails on the first malformed quantity.
    pub fn into_pods(self) -> WorkloadResult<Vec<Pod>> {
        let pods = self
            .pods
            .into_iter()
            .map(PodManifest::into_pod)
            .collect::<WorkloadResult<Vec<_>>>()?;
        debug!(pods = pods.len(), "validated pod manifest");
        Ok(pods)
    }
}

impl PodManifest {
    pub fn into_pod(self) -> WorkloadResult<Pod> {
        let containers = self
            .containers
            .into_iter()
            .map(ContainerManifest::into_container)
            .collect::<WorkloadResult<Vec<_>>>()?;

        Ok(Pod {
            name: self.name,
            namespace: self.namespace.unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
            containers,
        })
    }

    /// Render a typed pod back into raw manifest form.
    pub fn from_pod(pod: &Pod) -> Self {
        let raw = |list: &ResourceList| -> BTreeMap<String, RawQuantity> {
            list.iter()
                .map(|(name, quantity)| (name.to_string(), RawQuantity::from(quantity)))
                .collect()
        };

        PodManifest {
            name: pod.name.clone(),
            namespace: (pod.namespace != DEFAULT_NAMESPACE).then(|| pod.namespace.clone()),
            containers: pod
                .containers
                .iter()
                .map(|c| ContainerManifest {
                    name: c.name.clone(),
                    requests: raw(&c.resources.requests),
                    limits: raw(&c.resources.limits),
                })
                .collect(),
        }
    }
}

impl ContainerManifest {
    fn into_container(self) -> WorkloadResult<Container> {
        let invalid = |source| WorkloadError::Resource {
            container: self.name.clone(),
            source,
        };

        let requests = build(&self.requests).map_err(invalid)?;
        let limits = build(&self.limits).map_err(invalid)?;

        Ok(Container {
            name: self.name,
            resources: ResourceRequirements { requests, limits },
        })
    }
}
