//! Per-variant binder coverage: DB pool and direct metric sets.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use meterbind_bind::{
    BindConfig, BinderDispatcher, DbPoolStats, DiscoveredResource, MetricSet, ResourceRef,
    StaticDiscovery,
};
use meterbind_core::{Accessor, MetricKind, MetricRegistry, MetricValue, Result};

struct FakeDbPool {
    active: AtomicI64,
    idle: AtomicI64,
}

impl DbPoolStats for FakeDbPool {
    fn active_connections(&self) -> Result<i64> {
        Ok(self.active.load(Ordering::Relaxed))
    }
    fn idle_connections(&self) -> Result<i64> {
        Ok(self.idle.load(Ordering::Relaxed))
    }
    fn pending_threads(&self) -> Result<i64> {
        Ok(0)
    }
    fn max_connections(&self) -> Result<i64> {
        Ok(10)
    }
    fn min_connections(&self) -> Result<i64> {
        Ok(1)
    }
}

#[test]
fn db_pool_binds_connection_gauges() {
    let pool = Arc::new(FakeDbPool {
        active: AtomicI64::new(3),
        idle: AtomicI64::new(7),
    });
    let mut discovery = StaticDiscovery::new();
    discovery.add(DiscoveredResource::new(
        ResourceRef::DbPool(Arc::clone(&pool) as Arc<dyn DbPoolStats>),
        "orders-db",
    ));

    let registry = MetricRegistry::new();
    let summary = BinderDispatcher::new(BindConfig::enabled()).dispatch_all(&discovery, &registry);
    assert_eq!(summary.bound, 1);
    assert_eq!(registry.len(), 5);

    pool.active.store(9, Ordering::Relaxed);
    let active = registry
        .scrape()
        .into_iter()
        .find(|(h, _)| h.name() == "jdbc.connections.active")
        .unwrap();
    assert_eq!(active.1, MetricValue::I64(9));
    assert_eq!(active.0.tags().get("name"), Some("orders-db"));

    let max = registry
        .scrape()
        .into_iter()
        .find(|(h, _)| h.name() == "jdbc.connections.max")
        .unwrap();
    assert_eq!(max.1, MetricValue::I64(10));
}

struct QueueDepths {
    depth: Arc<AtomicI64>,
}

impl MetricSet for QueueDepths {
    fn metrics(&self) -> Vec<(String, MetricKind, Accessor)> {
        let depth = Arc::clone(&self.depth);
        let read: Accessor =
            Arc::new(move || Ok(MetricValue::I64(depth.load(Ordering::Relaxed))));
        vec![("workqueue.depth".into(), MetricKind::Gauge, read)]
    }
}

#[test]
fn metric_set_resource_is_directly_publishable() {
    let depth = Arc::new(AtomicI64::new(0));
    let set = Arc::new(QueueDepths {
        depth: Arc::clone(&depth),
    });
    let mut discovery = StaticDiscovery::new();
    discovery.add(DiscoveredResource::new(
        ResourceRef::MetricSet(set as Arc<dyn MetricSet>),
        "work-queue",
    ));

    let registry = MetricRegistry::new();
    let summary = BinderDispatcher::new(BindConfig::enabled()).dispatch_all(&discovery, &registry);
    assert_eq!(summary.bound, 1);

    depth.store(41, Ordering::Relaxed);
    let scraped = registry.scrape();
    assert_eq!(scraped.len(), 1);
    assert_eq!(scraped[0].0.name(), "workqueue.depth");
    assert_eq!(scraped[0].0.tags().get("name"), Some("work-queue"));
    assert_eq!(scraped[0].1, MetricValue::I64(41));
}
