//! Request-scoped call timing.
//!
//! Hosts record per-call durations with arbitrary attributes; only the
//! attribute keys named in `request_tag_keys` are promoted to tags, the rest
//! are dropped so unbounded attribute values cannot explode metric
//! cardinality. Each distinct tag combination lazily registers one call
//! counter and one cumulative duration timer over its own atomics.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;

use meterbind_core::{MetricHandle, MetricRegistry, MetricValue, TagSet};

use crate::config::BindConfig;

pub const METRIC_CALLS_COUNT: &str = "okhttp3.calls.count";
pub const METRIC_CALLS_DURATION_MICROS: &str = "okhttp3.calls.duration.micros";

struct CallCell {
    count: AtomicU64,
    total_micros: AtomicU64,
}

/// Accumulates call counts and durations, keyed by promoted tag set.
pub struct CallRecorder {
    registry: Arc<MetricRegistry>,
    tag_keys: Vec<String>,
    base_tags: TagSet,
    cells: DashMap<TagSet, Arc<CallCell>>,
}

impl CallRecorder {
    pub fn new(config: &BindConfig, registry: Arc<MetricRegistry>) -> Self {
        let mut base_tags = TagSet::new();
        for (k, v) in &config.extra_tags {
            base_tags.insert(k.clone(), v.clone());
        }
        Self {
            registry,
            tag_keys: config.request_tag_keys.clone(),
            base_tags,
            cells: DashMap::new(),
        }
    }

    /// Record one finished call.
    ///
    /// `attrs` are per-call attributes (method, host, anything the caller
    /// tracks); attributes not named in `request_tag_keys` are ignored.
    /// Lock-free on the hot path once a tag combination has its cell.
    pub fn record(&self, attrs: &[(&str, &str)], elapsed: Duration) {
        let tags = self.promote(attrs);
        let cell = match self.cells.get(&tags) {
            Some(cell) => Arc::clone(cell.value()),
            None => self.cell_for(tags),
        };
        cell.count.fetch_add(1, Ordering::Relaxed);
        cell.total_micros
            .fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);
    }

    /// Number of distinct tag combinations observed so far.
    pub fn series(&self) -> usize {
        self.cells.len()
    }

    fn promote(&self, attrs: &[(&str, &str)]) -> TagSet {
        let mut tags = self.base_tags.clone();
        for (k, v) in attrs {
            if self.tag_keys.iter().any(|key| key == k) {
                tags.insert((*k).to_string(), (*v).to_string());
            }
        }
        tags
    }

    /// Slow path: create the cell and register its two metrics.
    fn cell_for(&self, tags: TagSet) -> Arc<CallCell> {
        let cell = self
            .cells
            .entry(tags.clone())
            .or_insert_with(|| {
                Arc::new(CallCell {
                    count: AtomicU64::new(0),
                    total_micros: AtomicU64::new(0),
                })
            })
            .value()
            .clone();

        let count_cell = Arc::clone(&cell);
        let count_handle = MetricHandle::counter(METRIC_CALLS_COUNT).with_tags(&tags);
        if let Err(err) = self.registry.register(
            count_handle,
            Arc::new(move || {
                Ok(MetricValue::I64(
                    count_cell.count.load(Ordering::Relaxed) as i64
                ))
            }),
        ) {
            // A racing recorder already registered this combination.
            tracing::debug!(%err, "call count already registered");
        }

        let duration_cell = Arc::clone(&cell);
        let duration_handle = MetricHandle::timer(METRIC_CALLS_DURATION_MICROS).with_tags(&tags);
        if let Err(err) = self.registry.register(
            duration_handle,
            Arc::new(move || {
                Ok(MetricValue::I64(
                    duration_cell.total_micros.load(Ordering::Relaxed) as i64,
                ))
            }),
        ) {
            tracing::debug!(%err, "call duration already registered");
        }

        cell
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn unlisted_attributes_are_dropped() {
        let mut config = BindConfig::enabled();
        config.request_tag_keys = vec!["method".into()];
        let registry = Arc::new(MetricRegistry::new());
        let recorder = CallRecorder::new(&config, Arc::clone(&registry));

        recorder.record(
            &[("method", "GET"), ("user_id", "12345")],
            Duration::from_millis(3),
        );
        recorder.record(
            &[("method", "GET"), ("user_id", "67890")],
            Duration::from_millis(4),
        );

        // One series despite two distinct user ids.
        assert_eq!(recorder.series(), 1);
        let scraped = registry.scrape();
        assert_eq!(scraped.len(), 2);
        let count = scraped
            .iter()
            .find(|(h, _)| h.name() == METRIC_CALLS_COUNT)
            .unwrap();
        assert_eq!(count.0.tags().get("method"), Some("GET"));
        assert_eq!(count.1, MetricValue::I64(2));
        let total = scraped
            .iter()
            .find(|(h, _)| h.name() == METRIC_CALLS_DURATION_MICROS)
            .unwrap();
        assert_eq!(total.1, MetricValue::I64(7_000));
    }
}
