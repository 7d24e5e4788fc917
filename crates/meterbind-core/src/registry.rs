//! Process-wide metric registry with live-reading accessors.
//!
//! Entries are keyed by [`MetricHandle`] identity in a `DashMap`, so
//! registrations for unrelated resources never contend on a single lock and
//! `scrape` observes either the pre- or post-registration state of any one
//! handle, never a torn entry. Values are not copied at registration time:
//! every scrape re-invokes the stored accessor against the live resource.

use std::fmt::Write;
use std::sync::Arc;

use dashmap::DashMap;

use crate::error::{MeterBindError, Result};
use crate::handle::MetricHandle;

/// Current numeric value of one metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    I64(i64),
    F64(f64),
}

impl MetricValue {
    pub fn as_f64(self) -> f64 {
        match self {
            MetricValue::I64(v) => v as f64,
            MetricValue::F64(v) => v,
        }
    }
}

impl From<i64> for MetricValue {
    fn from(v: i64) -> Self {
        MetricValue::I64(v)
    }
}

impl From<f64> for MetricValue {
    fn from(v: f64) -> Self {
        MetricValue::F64(v)
    }
}

/// Zero-argument live read of one instrumented field.
///
/// Must close over a live reference to the resource, not a copied value, and
/// must be cheap and non-blocking. A failing read is reported per scrape and
/// never unregisters the handle.
pub type Accessor = Arc<dyn Fn() -> Result<MetricValue> + Send + Sync>;

/// Process-wide sink for metric registrations, de-duplicated by identity.
///
/// Created once at application start and shared (`Arc`) across binders and
/// the exporter; there is no teardown beyond process exit and per-handle
/// [`unregister`](MetricRegistry::unregister).
#[derive(Default)]
pub struct MetricRegistry {
    entries: DashMap<MetricHandle, Accessor>,
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Register a live-reading metric.
    ///
    /// Fails with [`MeterBindError::AlreadyRegistered`] when an identical
    /// (name, tags) handle already exists. The check-and-insert is atomic:
    /// two racing callers cannot both succeed for the same identity, and the
    /// loser gets the error to treat as "skip, already bound".
    pub fn register(&self, handle: MetricHandle, accessor: Accessor) -> Result<()> {
        match self.entries.entry(handle) {
            dashmap::mapref::entry::Entry::Occupied(occupied) => {
                Err(MeterBindError::AlreadyRegistered {
                    name: occupied.key().to_string(),
                })
            }
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                vacant.insert(accessor);
                Ok(())
            }
        }
    }

    /// Remove one entry; no-op when absent.
    pub fn unregister(&self, handle: &MetricHandle) {
        self.entries.remove(handle);
    }

    pub fn contains(&self, handle: &MetricHandle) -> bool {
        self.entries.contains_key(handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered handles, sorted by (name, tags).
    pub fn handles(&self) -> Vec<MetricHandle> {
        let mut out: Vec<MetricHandle> = self.entries.iter().map(|e| e.key().clone()).collect();
        out.sort();
        out
    }

    /// Read every registered metric now.
    ///
    /// Each call re-invokes the accessors, so the output reflects live state
    /// at scrape time. Output is sorted by handle identity for deterministic
    /// exposition. A handle whose accessor fails is logged and omitted from
    /// this scrape only; it stays registered.
    pub fn scrape(&self) -> Vec<(MetricHandle, MetricValue)> {
        let mut out = Vec::with_capacity(self.entries.len());
        for entry in self.entries.iter() {
            match (entry.value())() {
                Ok(value) => out.push((entry.key().clone(), value)),
                Err(err) => {
                    tracing::warn!(metric = %entry.key(), %err, "accessor read failed; omitting sample");
                }
            }
        }
        out.sort_by(|(a, _), (b, _)| a.cmp(b));
        out
    }

    /// Render the current scrape in Prometheus text exposition format.
    ///
    /// Dotted metric names are rewritten with underscores for exposition;
    /// the registered (dotted) name is what identity is keyed on.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let mut last_name: Option<String> = None;
        for (handle, value) in self.scrape() {
            let expo_name = handle.name().replace('.', "_");
            if last_name.as_deref() != Some(handle.name()) {
                let _ = writeln!(out, "# TYPE {} {}", expo_name, expo_kind(&handle));
                last_name = Some(handle.name().to_string());
            }
            let label_str = handle
                .tags()
                .iter()
                .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
                .collect::<Vec<_>>()
                .join(",");
            let rendered = match value {
                MetricValue::I64(v) => v.to_string(),
                MetricValue::F64(v) => v.to_string(),
            };
            if label_str.is_empty() {
                let _ = writeln!(out, "{} {}", expo_name, rendered);
            } else {
                let _ = writeln!(out, "{}{{{}}} {}", expo_name, label_str, rendered);
            }
        }
        out
    }
}

/// Map internal kinds onto the exposition type vocabulary.
fn expo_kind(handle: &MetricHandle) -> &'static str {
    match handle.kind() {
        crate::handle::MetricKind::Counter => "counter",
        _ => "gauge",
    }
}

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}
