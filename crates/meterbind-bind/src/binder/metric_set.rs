//! Generic binder for resources that publish their own metric set.
//!
//! Always checked last: a resource matching a more specific binder never
//! falls through to this one. Names are used exactly as the resource
//! declares them; the dispatcher's instance tag keeps two sets apart.

use meterbind_core::{MeterBindError, Result};

use crate::discover::{DiscoveredResource, ResourceRef};
use crate::snapshot::{ResourceKind, ResourceSnapshot, SnapshotField};

use super::MetricBinder;

/// Publishes whatever a [`MetricSet`](crate::snapshot::MetricSet) resource
/// exposes, unmodified.
#[derive(Default)]
pub struct MetricSetBinder;

impl MetricSetBinder {
    pub fn new() -> Self {
        Self
    }
}

impl MetricBinder for MetricSetBinder {
    fn name(&self) -> &'static str {
        "metric_set"
    }

    fn supports(&self, resource: &DiscoveredResource) -> bool {
        matches!(resource.resource, ResourceRef::MetricSet(_))
    }

    fn snapshot(&self, resource: &DiscoveredResource) -> Result<ResourceSnapshot> {
        let ResourceRef::MetricSet(set) = &resource.resource else {
            return Err(MeterBindError::UnsupportedResource {
                name: resource.display_name.clone(),
            });
        };

        let fields = set
            .metrics()
            .into_iter()
            .map(|(name, kind, read)| SnapshotField { name, kind, read })
            .collect();

        Ok(ResourceSnapshot {
            kind: ResourceKind::MetricSet,
            fields,
        })
    }
}
