//! HTTP client pool binder.
//!
//! Metric names follow the established `okhttp3.*` convention bit-for-bit;
//! existing dashboards key on them, so they are not negotiable. Limits
//! (`max.requests*`) are exposed as counters and the live pool counts as
//! time gauges, matching the convention the names come from.

use std::sync::Arc;

use meterbind_core::{MeterBindError, MetricKind, MetricValue, Result};

use crate::discover::{DiscoveredResource, ResourceRef};
use crate::snapshot::{HttpPoolStats, ResourceKind, ResourceSnapshot};

use super::MetricBinder;

/// Prefix used for all HTTP client pool metric names.
pub const HTTP_POOL_METRIC_PREFIX: &str = "okhttp3";

pub const METRIC_DISPATCHER_MAX_REQUESTS: &str = "okhttp3.dispatcher.max.requests";
pub const METRIC_DISPATCHER_MAX_REQUESTS_PERHOST: &str = "okhttp3.dispatcher.max.requests.perhost";
pub const METRIC_DISPATCHER_QUEUED_CALLS_COUNT: &str = "okhttp3.dispatcher.queued.calls.count";
pub const METRIC_DISPATCHER_RUNNING_CALLS_COUNT: &str = "okhttp3.dispatcher.running.calls.count";
pub const METRIC_CONNECTION_POOL_CONNECTION_COUNT: &str = "okhttp3.connection.pool.connection.count";
pub const METRIC_CONNECTION_POOL_IDLE_CONNECTION_COUNT: &str =
    "okhttp3.connection.pool.idle.connection.count";

/// Binds dispatcher queue/running counts, request limits, and connection
/// pool counts of an HTTP client.
#[derive(Default)]
pub struct HttpPoolBinder;

impl HttpPoolBinder {
    pub fn new() -> Self {
        Self
    }
}

/// Wrap one getter as a live accessor over the shared pool reference.
fn read_field(
    pool: &Arc<dyn HttpPoolStats>,
    getter: fn(&dyn HttpPoolStats) -> Result<i64>,
) -> meterbind_core::Accessor {
    let pool = Arc::clone(pool);
    Arc::new(move || getter(pool.as_ref()).map(MetricValue::I64))
}

impl MetricBinder for HttpPoolBinder {
    fn name(&self) -> &'static str {
        "http_pool"
    }

    fn supports(&self, resource: &DiscoveredResource) -> bool {
        matches!(resource.resource, ResourceRef::HttpPool(_))
    }

    fn snapshot(&self, resource: &DiscoveredResource) -> Result<ResourceSnapshot> {
        let ResourceRef::HttpPool(pool) = &resource.resource else {
            return Err(MeterBindError::UnsupportedResource {
                name: resource.display_name.clone(),
            });
        };

        Ok(ResourceSnapshot::new(ResourceKind::HttpClientPool)
            .field(
                METRIC_DISPATCHER_MAX_REQUESTS,
                MetricKind::Counter,
                read_field(pool, |p| p.max_requests()),
            )
            .field(
                METRIC_DISPATCHER_MAX_REQUESTS_PERHOST,
                MetricKind::Counter,
                read_field(pool, |p| p.max_requests_per_host()),
            )
            .field(
                METRIC_DISPATCHER_QUEUED_CALLS_COUNT,
                MetricKind::TimeGauge,
                read_field(pool, |p| p.queued_calls_count()),
            )
            .field(
                METRIC_DISPATCHER_RUNNING_CALLS_COUNT,
                MetricKind::TimeGauge,
                read_field(pool, |p| p.running_calls_count()),
            )
            .field(
                METRIC_CONNECTION_POOL_CONNECTION_COUNT,
                MetricKind::TimeGauge,
                read_field(pool, |p| p.connection_count()),
            )
            .field(
                METRIC_CONNECTION_POOL_IDLE_CONNECTION_COUNT,
                MetricKind::TimeGauge,
                read_field(pool, |p| p.idle_connection_count()),
            ))
    }
}
