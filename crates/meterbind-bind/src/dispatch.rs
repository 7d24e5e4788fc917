//! Binder dispatcher: discovery, filtering, and idempotent binding.
//!
//! One dispatcher is constructed at startup with the binding config and the
//! binder variants in priority order (more specific first, the generic
//! metric-set binder always last). Binding may run concurrently on whatever
//! threads the lifecycle system initializes resources from; the bound-record
//! side table makes check-then-bind atomic per resource identity.

use std::sync::Arc;

use dashmap::DashMap;

use meterbind_core::{MetricHandle, MetricRegistry, TagSet};

use crate::binder::{DbPoolBinder, HttpPoolBinder, MetricBinder, MetricSetBinder};
use crate::config::BindConfig;
use crate::discover::{DiscoveredResource, Discovery, ResourceIdentity};

/// What has already been bound for one resource instance.
///
/// Re-binding the same identity returns this record untouched instead of
/// registering anything new.
#[derive(Debug, Clone)]
pub struct BindingRecord {
    pub identity: ResourceIdentity,
    pub binder: &'static str,
    pub handles: Vec<MetricHandle>,
}

/// Outcome counts of one `dispatch_all` pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DispatchSummary {
    pub discovered: usize,
    pub bound: usize,
    pub skipped_filtered: usize,
    pub skipped_unsupported: usize,
    pub skipped_already_bound: usize,
    pub fields_skipped: usize,
    pub discovery_failed: bool,
}

/// Iterates discovered resources, selects the matching binder variant, and
/// guards against double-binding.
pub struct BinderDispatcher {
    config: BindConfig,
    binders: Vec<Arc<dyn MetricBinder>>,
    bound: DashMap<ResourceIdentity, Arc<BindingRecord>>,
    display_names: DashMap<String, ResourceIdentity>,
    host: Option<String>,
}

impl BinderDispatcher {
    /// Install the built-in binders in priority order.
    pub fn new(config: BindConfig) -> Self {
        let host = if config.include_host_tag {
            Some(hostname())
        } else {
            None
        };
        Self {
            config,
            binders: vec![
                Arc::new(HttpPoolBinder::new()),
                Arc::new(DbPoolBinder::new()),
                Arc::new(MetricSetBinder::new()),
            ],
            bound: DashMap::new(),
            display_names: DashMap::new(),
            host,
        }
    }

    /// Append a custom binder, checked after the built-in specific variants
    /// but before the generic metric-set fallback.
    pub fn with_binder(mut self, binder: Arc<dyn MetricBinder>) -> Self {
        let at = self.binders.len().saturating_sub(1);
        self.binders.insert(at, binder);
        self
    }

    /// Existing binding record for a resource, if any.
    pub fn record(&self, identity: ResourceIdentity) -> Option<Arc<BindingRecord>> {
        self.bound.get(&identity).map(|r| Arc::clone(r.value()))
    }

    /// Discover and bind every eligible resource. Never fails: all errors
    /// are downgraded to log lines and skip counts.
    pub fn dispatch_all(
        &self,
        discovery: &dyn Discovery,
        registry: &MetricRegistry,
    ) -> DispatchSummary {
        let mut summary = DispatchSummary::default();
        if !self.config.enabled {
            tracing::debug!("instrumentation disabled; skipping dispatch");
            return summary;
        }

        let resources = match discovery.discover() {
            Ok(resources) => resources,
            Err(err) => {
                tracing::warn!(%err, "resource discovery unavailable; zero bindings this pass");
                summary.discovery_failed = true;
                return summary;
            }
        };
        summary.discovered = resources.len();

        for resource in &resources {
            self.dispatch_one(resource, registry, &mut summary);
        }

        tracing::info!(
            discovered = summary.discovered,
            bound = summary.bound,
            filtered = summary.skipped_filtered,
            unsupported = summary.skipped_unsupported,
            already_bound = summary.skipped_already_bound,
            fields_skipped = summary.fields_skipped,
            "bind pass complete"
        );
        summary
    }

    fn dispatch_one(
        &self,
        resource: &DiscoveredResource,
        registry: &MetricRegistry,
        summary: &mut DispatchSummary,
    ) {
        // Filtering policy runs before any bind attempt.
        if is_internal_name(&resource.display_name) && !self.config.include_internal {
            tracing::debug!(name = %resource.display_name, "filtered: internal resource");
            summary.skipped_filtered += 1;
            return;
        }

        // First supporting variant wins; no match is not an error.
        let Some(binder) = self.binders.iter().find(|b| b.supports(resource)) else {
            tracing::debug!(name = %resource.display_name, "no binder variant; skipping");
            summary.skipped_unsupported += 1;
            return;
        };

        let identity = resource.identity();
        match self.bound.entry(identity) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                tracing::debug!(name = %resource.display_name, "already bound; no-op");
                summary.skipped_already_bound += 1;
            }
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                match self.bind_new(binder.as_ref(), resource, identity, registry, summary) {
                    Some(record) => {
                        vacant.insert(Arc::new(record));
                        summary.bound += 1;
                    }
                    None => {
                        summary.skipped_unsupported += 1;
                    }
                }
            }
        }
    }

    /// Register every readable field of a freshly matched resource.
    ///
    /// Returns `None` when the binder could not produce a snapshot at all;
    /// individual unreadable fields are skipped, not fatal.
    fn bind_new(
        &self,
        binder: &dyn MetricBinder,
        resource: &DiscoveredResource,
        identity: ResourceIdentity,
        registry: &MetricRegistry,
        summary: &mut DispatchSummary,
    ) -> Option<BindingRecord> {
        let snapshot = match binder.snapshot(resource) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                tracing::warn!(name = %resource.display_name, %err, "snapshot failed; skipping resource");
                return None;
            }
        };

        // Claim the display name before building any tags. The claim is an
        // atomic entry insert, so of two resources sharing a name (even
        // binding concurrently) exactly one becomes owner and every other
        // claimant tags `instance`, keeping their handle sets disjoint.
        let owner = *self
            .display_names
            .entry(resource.display_name.clone())
            .or_insert(identity);
        let tags = self.base_tags(resource, identity, owner != identity);
        let mut handles = Vec::with_capacity(snapshot.fields.len());
        for field in snapshot.fields {
            // Probe once at bind time so a field torn down before binding is
            // dropped here instead of erroring on every future scrape.
            if let Err(err) = (field.read)() {
                tracing::warn!(
                    name = %resource.display_name,
                    field = %field.name,
                    %err,
                    "field unreadable at bind time; skipping field"
                );
                summary.fields_skipped += 1;
                continue;
            }

            let handle = MetricHandle::new(&field.name, field.kind).with_tags(&tags);
            match registry.register(handle.clone(), field.read) {
                Ok(()) => handles.push(handle),
                Err(err) if err.is_already_registered() => {
                    // The identity side table already stops genuine re-binds,
                    // so a duplicate here is owned by some other resource.
                    // Skip the field; absorbing the handle would let a later
                    // unbind tear down the owner's live metric.
                    tracing::warn!(metric = %handle, "handle owned by another resource; skipping field");
                    summary.fields_skipped += 1;
                }
                Err(err) => {
                    tracing::warn!(metric = %handle, %err, "registration failed; skipping field");
                    summary.fields_skipped += 1;
                }
            }
        }

        Some(BindingRecord {
            identity,
            binder: binder.name(),
            handles,
        })
    }

    /// Tags applied to every handle of one resource: instance-discriminating
    /// `name`, the configured static tags, an optional host tag, and a
    /// further `instance` tag when another live resource owns this display
    /// name.
    fn base_tags(
        &self,
        resource: &DiscoveredResource,
        identity: ResourceIdentity,
        shared_name: bool,
    ) -> TagSet {
        let mut tags = TagSet::new();
        tags.insert("name".into(), resource.display_name.clone());
        for (k, v) in &self.config.extra_tags {
            tags.insert(k.clone(), v.clone());
        }
        if let Some(host) = &self.host {
            tags.insert("host".into(), host.clone());
        }
        if shared_name {
            tags.insert("instance".into(), identity.short_hex());
        }
        tags
    }

    /// Tear down one resource's bindings. Safe to call even if bind never
    /// completed for this identity.
    pub fn unbind(&self, identity: ResourceIdentity, registry: &MetricRegistry) {
        let Some((_, record)) = self.bound.remove(&identity) else {
            return;
        };
        for handle in &record.handles {
            registry.unregister(handle);
        }
        self.display_names
            .retain(|_, owner| *owner != record.identity);
        tracing::debug!(binder = record.binder, metrics = record.handles.len(), "unbound resource");
    }
}

/// Reserved display names are platform-internal and excluded by default.
fn is_internal_name(name: &str) -> bool {
    name.starts_with("internal.") || name.contains("jvm")
}

/// Host-identifying tag value. Resolution failure falls back to a fixed
/// marker rather than erroring: tagging is never worth failing a bind.
fn hostname() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "unknown-host".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_name_predicate() {
        assert!(is_internal_name("internal.ticket-cache"));
        assert!(is_internal_name("jvm.gc"));
        assert!(!is_internal_name("pool-A"));
    }
}
