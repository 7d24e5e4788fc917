//! meterbind bind: resource discovery, binder variants, and the dispatcher.
//!
//! This crate wires the capability traits, the binder variants that read
//! them, the filtering policy, and the idempotent dispatcher into a cohesive
//! binding stack. It is intended to be consumed by host applications (via the
//! facade crate) and by integration tests.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod binder;
pub mod calls;
pub mod config;
pub mod discover;
pub mod dispatch;
pub mod snapshot;

pub use binder::{DbPoolBinder, HttpPoolBinder, MetricBinder, MetricSetBinder};
pub use calls::CallRecorder;
pub use config::BindConfig;
pub use discover::{DiscoveredResource, Discovery, ResourceIdentity, ResourceRef, StaticDiscovery};
pub use dispatch::{BinderDispatcher, BindingRecord, DispatchSummary};
pub use snapshot::{DbPoolStats, HttpPoolStats, MetricSet, ResourceKind, ResourceSnapshot, SnapshotField};
