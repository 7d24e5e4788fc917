//! Binder variants, one per resource kind.
//!
//! Re-exports the binder trait and the built-in variants so downstream
//! consumers can depend on this module directly.

pub mod db_pool;
pub mod http_pool;
pub mod metric_set;

pub use db_pool::DbPoolBinder;
pub use http_pool::HttpPoolBinder;
pub use metric_set::MetricSetBinder;

use meterbind_core::Result;

use crate::discover::DiscoveredResource;
use crate::snapshot::ResourceSnapshot;

/// Unit of logic that reads one resource kind's internal counters.
///
/// `supports` is a pure capability check with no side effects; `snapshot`
/// builds the live-accessor view the dispatcher registers. Registration
/// itself (tagging, idempotence, collision policy) belongs to the
/// dispatcher, not the binder.
pub trait MetricBinder: Send + Sync {
    /// Stable variant name, used in binding records and logs.
    fn name(&self) -> &'static str;

    /// Whether this variant can read the candidate. No side effects.
    fn supports(&self, resource: &DiscoveredResource) -> bool;

    /// Build the live view of the resource's instrumentable fields.
    fn snapshot(&self, resource: &DiscoveredResource) -> Result<ResourceSnapshot>;
}
