//! Read-only view of a live resource's instrumentable fields.
//!
//! A snapshot never copies values: each field carries a zero-argument
//! accessor closing over a live `Arc` to the resource, so gauges read
//! current state on every scrape. The capability traits here are the whole
//! surface a binder sees; the pools themselves live in the host application.

use meterbind_core::{Accessor, MetricKind, Result};

/// Resource categories the built-in binders know about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// HTTP client dispatcher + connection pool.
    HttpClientPool,
    /// Database connection pool.
    DbConnectionPool,
    /// Any resource that publishes its own metric set directly.
    MetricSet,
    /// Opaque managed object no built-in binder can read.
    Other,
}

impl ResourceKind {
    /// Tag value used to label metrics by resource category.
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::HttpClientPool => "http_client_pool",
            ResourceKind::DbConnectionPool => "db_connection_pool",
            ResourceKind::MetricSet => "metric_set",
            ResourceKind::Other => "other",
        }
    }
}

/// One instrumentable field: stable name, metric kind, live accessor.
pub struct SnapshotField {
    pub name: String,
    pub kind: MetricKind,
    pub read: Accessor,
}

/// Instrumentable fields of one live resource at the moment of binding.
pub struct ResourceSnapshot {
    pub kind: ResourceKind,
    pub fields: Vec<SnapshotField>,
}

impl ResourceSnapshot {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            fields: Vec::new(),
        }
    }

    /// Add one field (builder style).
    pub fn field(mut self, name: impl Into<String>, kind: MetricKind, read: Accessor) -> Self {
        self.fields.push(SnapshotField {
            name: name.into(),
            kind,
            read,
        });
        self
    }
}

/// Live counters of an HTTP client's dispatcher and connection pool.
///
/// Every getter is fallible so a torn-down pool can fail per field; the
/// binder skips the failing field and keeps the rest. Reads must be cheap
/// and non-blocking; a slow accessor is a bug in the pool, not a registry
/// concern.
pub trait HttpPoolStats: Send + Sync {
    fn max_requests(&self) -> Result<i64>;
    fn max_requests_per_host(&self) -> Result<i64>;
    fn queued_calls_count(&self) -> Result<i64>;
    fn running_calls_count(&self) -> Result<i64>;
    fn connection_count(&self) -> Result<i64>;
    fn idle_connection_count(&self) -> Result<i64>;
}

/// Live counters of a database connection pool.
pub trait DbPoolStats: Send + Sync {
    fn active_connections(&self) -> Result<i64>;
    fn idle_connections(&self) -> Result<i64>;
    fn pending_threads(&self) -> Result<i64>;
    fn max_connections(&self) -> Result<i64>;
    fn min_connections(&self) -> Result<i64>;
}

/// A resource that is directly publishable: it names its own metrics.
pub trait MetricSet: Send + Sync {
    fn metrics(&self) -> Vec<(String, MetricKind, Accessor)>;
}
