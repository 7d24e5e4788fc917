//! Discovery interface supplied by the external lifecycle collaborator.
//!
//! The core never scans a container itself: whatever manages the process's
//! objects hands over already-resolved concrete references together with an
//! opaque display name. Unwrapping proxies to find the real object is the
//! collaborator's job, not ours.

use std::any::Any;
use std::sync::Arc;

use meterbind_core::Result;

use crate::snapshot::{DbPoolStats, HttpPoolStats, MetricSet, ResourceKind};

/// Already-resolved reference to one managed resource.
///
/// Tagged-variant dispatch: each variant corresponds to one capability the
/// built-in binders can read, replacing runtime type-check chains.
#[derive(Clone)]
pub enum ResourceRef {
    HttpPool(Arc<dyn HttpPoolStats>),
    DbPool(Arc<dyn DbPoolStats>),
    MetricSet(Arc<dyn MetricSet>),
    /// Managed object no built-in binder understands. Custom binders may
    /// downcast; everything else skips it silently.
    Opaque(Arc<dyn Any + Send + Sync>),
}

impl ResourceRef {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceRef::HttpPool(_) => ResourceKind::HttpClientPool,
            ResourceRef::DbPool(_) => ResourceKind::DbConnectionPool,
            ResourceRef::MetricSet(_) => ResourceKind::MetricSet,
            ResourceRef::Opaque(_) => ResourceKind::Other,
        }
    }

    /// Identity of the underlying allocation.
    ///
    /// A recreated resource lives at a fresh allocation and therefore gets a
    /// fresh identity, so teardown-and-recreate produces a new binding.
    pub fn identity(&self) -> ResourceIdentity {
        let addr = match self {
            ResourceRef::HttpPool(r) => Arc::as_ptr(r) as *const () as usize,
            ResourceRef::DbPool(r) => Arc::as_ptr(r) as *const () as usize,
            ResourceRef::MetricSet(r) => Arc::as_ptr(r) as *const () as usize,
            ResourceRef::Opaque(r) => Arc::as_ptr(r) as *const () as usize,
        };
        ResourceIdentity(addr)
    }
}

/// Opaque key identifying one resource instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceIdentity(usize);

impl ResourceIdentity {
    /// Short stable form used as an instance-discriminating tag value.
    pub fn short_hex(self) -> String {
        format!("{:x}", self.0)
    }
}

/// One discovered resource: live reference plus display name.
#[derive(Clone)]
pub struct DiscoveredResource {
    pub resource: ResourceRef,
    pub display_name: String,
}

impl DiscoveredResource {
    pub fn new(resource: ResourceRef, display_name: impl Into<String>) -> Self {
        Self {
            resource,
            display_name: display_name.into(),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.resource.kind()
    }

    pub fn identity(&self) -> ResourceIdentity {
        self.resource.identity()
    }
}

/// Managed-object inventory of the running process.
///
/// Failure maps to [`MeterBindError::DiscoveryUnavailable`]: the dispatcher
/// logs one warning and proceeds with zero bindings, never crashing the
/// host.
///
/// [`MeterBindError::DiscoveryUnavailable`]: meterbind_core::MeterBindError::DiscoveryUnavailable
pub trait Discovery: Send + Sync {
    fn discover(&self) -> Result<Vec<DiscoveredResource>>;
}

/// Fixed inventory, for hosts without a lifecycle system and for tests.
#[derive(Default)]
pub struct StaticDiscovery {
    resources: Vec<DiscoveredResource>,
}

impl StaticDiscovery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, resource: DiscoveredResource) -> &mut Self {
        self.resources.push(resource);
        self
    }
}

impl Discovery for StaticDiscovery {
    fn discover(&self) -> Result<Vec<DiscoveredResource>> {
        Ok(self.resources.clone())
    }
}
