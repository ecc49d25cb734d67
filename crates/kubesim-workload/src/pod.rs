//! Workload types handed to the simulator.
//!
//! These mirror the subset of a Kubernetes pod the resource algebra cares
//! about. Resource lists are already typed; raw strings are handled by the
//! manifest layer.

use kubesim_resource::ResourceList;
use serde::{Deserialize, Serialize};

/// Namespace used when a manifest does not name one.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Requests and limits of a single container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRequirements {
    /// Amounts the scheduler reserves for the container.
    #[serde(default)]
    pub requests: ResourceList,
    /// Upper bounds enforced at runtime. Not used for aggregation.
    #[serde(default)]
    pub limits: ResourceList,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub name: String,
    #[serde(default)]
    pub resources: ResourceRequirements,
}

/// A schedulable workload: an ordered sequence of containers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pod {
    pub name: String,
    pub namespace: String,
    #[serde(default)]
    pub containers: Vec<Container>,
}

impl Pod {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            containers: Vec::new(),
        }
    }

    /// Returns this pod with `container` appended.
    pub fn with_container(mut self, container: Container) -> Self {
        self.containers.push(container);
        self
    }

    /// `{namespace}/{name}`.
    pub fn key(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }
}

impl Container {
    pub fn new(name: impl Into<String>, requests: ResourceList, limits: ResourceList) -> Self {
        Self {
            name: name.into(),
            resources: ResourceRequirements { requests, limits },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kubesim_resource::build;

    #[test]
    fn new_pod_uses_default_namespace() {
        let pod = Pod::new("web");
        assert_eq!(pod.namespace, DEFAULT_NAMESPACE);
        assert_eq!(pod.key(), "default/web");
        assert!(pod.containers.is_empty());
    }

    #[test]
    fn containers_keep_order() {
        let pod = Pod::new("web")
            .with_container(Container::new("a", ResourceList::new(), ResourceList::new()))
            .with_container(Container::new("b", ResourceList::new(), ResourceList::new()));
        let names: Vec<&str> = pod.containers.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn json_round_trip() {
        let pod = Pod::new("trainer").with_container(Container::new(
            "main",
            build([("cpu", "3"), ("memory", "5Gi")]).unwrap(),
            build([("cpu", "4")]).unwrap(),
        ));

        let json = serde_json::to_string(&pod).unwrap();
        assert!(json.contains(r#""memory":"5Gi""#));

        let back: Pod = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pod);
    }

    #[test]
    fn missing_resources_default_to_empty() {
        let pod: Pod = serde_json::from_str(
            r#"{"name":"p","namespace":"ns","containers":[{"name":"c"}]}"#,
        )
        .unwrap();
        assert!(pod.containers[0].resources.requests.is_empty());
        assert!(pod.containers[0].resources.limits.is_empty());
    }
}
