//! Request aggregation.
//!
//! Only `requests` are summed: they are what a scheduler reserves against.
//! `limits` never contribute.

use kubesim_resource::{NotGreaterOrEqualError, ResourceList, diff, sum};
use tracing::trace;

use crate::pod::Pod;

/// Sum of the requests of every container in `pod`. A pod without
/// containers requests nothing.
pub fn total_requests(pod: &Pod) -> ResourceList {
    let total = pod
        .containers
        .iter()
        .fold(ResourceList::new(), |acc, c| sum(&acc, &c.resources.requests));

    trace!(pod = %pod.key(), requests = %total, "aggregated pod requests");
    total
}

/// Sum of [`total_requests`] over `pods`, e.g. everything bound to a node.
pub fn total_requests_of<'a>(pods: impl IntoIterator<Item = &'a Pod>) -> ResourceList {
    pods.into_iter()
        .fold(ResourceList::new(), |acc, pod| sum(&acc, &total_requests(pod)))
}

/// What is left of `capacity` once `pods` have reserved their requests.
///
/// Fails when the pods request more of some resource than `capacity`
/// holds.
pub fn remaining<'a>(
    capacity: &ResourceList,
    pods: impl IntoIterator<Item = &'a Pod>,
) -> Result<ResourceList, NotGreaterOrEqualError> {
    diff(capacity, &total_requests_of(pods))
}
