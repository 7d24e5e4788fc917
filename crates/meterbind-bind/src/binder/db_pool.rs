//! Database connection pool binder.
//!
//! Names follow the `jdbc.connections.*` convention so pool metrics from
//! different pool implementations land on the same dashboard series.

use std::sync::Arc;

use meterbind_core::{MeterBindError, MetricKind, MetricValue, Result};

use crate::discover::{DiscoveredResource, ResourceRef};
use crate::snapshot::{DbPoolStats, ResourceKind, ResourceSnapshot};

use super::MetricBinder;

pub const METRIC_DB_CONNECTIONS_ACTIVE: &str = "jdbc.connections.active";
pub const METRIC_DB_CONNECTIONS_IDLE: &str = "jdbc.connections.idle";
pub const METRIC_DB_CONNECTIONS_PENDING: &str = "jdbc.connections.pending";
pub const METRIC_DB_CONNECTIONS_MAX: &str = "jdbc.connections.max";
pub const METRIC_DB_CONNECTIONS_MIN: &str = "jdbc.connections.min";

/// Binds active/idle/pending counts and configured limits of a database
/// connection pool.
#[derive(Default)]
pub struct DbPoolBinder;

impl DbPoolBinder {
    pub fn new() -> Self {
        Self
    }
}

fn read_field(
    pool: &Arc<dyn DbPoolStats>,
    getter: fn(&dyn DbPoolStats) -> Result<i64>,
) -> meterbind_core::Accessor {
    let pool = Arc::clone(pool);
    Arc::new(move || getter(pool.as_ref()).map(MetricValue::I64))
}

impl MetricBinder for DbPoolBinder {
    fn name(&self) -> &'static str {
        "db_pool"
    }

    fn supports(&self, resource: &DiscoveredResource) -> bool {
        matches!(resource.resource, ResourceRef::DbPool(_))
    }

    fn snapshot(&self, resource: &DiscoveredResource) -> Result<ResourceSnapshot> {
        let ResourceRef::DbPool(pool) = &resource.resource else {
            return Err(MeterBindError::UnsupportedResource {
                name: resource.display_name.clone(),
            });
        };

        Ok(ResourceSnapshot::new(ResourceKind::DbConnectionPool)
            .field(
                METRIC_DB_CONNECTIONS_ACTIVE,
                MetricKind::Gauge,
                read_field(pool, |p| p.active_connections()),
            )
            .field(
                METRIC_DB_CONNECTIONS_IDLE,
                MetricKind::Gauge,
                read_field(pool, |p| p.idle_connections()),
            )
            .field(
                METRIC_DB_CONNECTIONS_PENDING,
                MetricKind::Gauge,
                read_field(pool, |p| p.pending_threads()),
            )
            .field(
                METRIC_DB_CONNECTIONS_MAX,
                MetricKind::Counter,
                read_field(pool, |p| p.max_connections()),
            )
            .field(
                METRIC_DB_CONNECTIONS_MIN,
                MetricKind::Counter,
                read_field(pool, |p| p.min_connections()),
            ))
    }
}
