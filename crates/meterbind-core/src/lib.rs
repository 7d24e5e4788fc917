//! meterbind core: metric identity, the process-wide registry, and error types.
//!
//! This crate defines the registration contract shared by every binder
//! variant: an immutable [`MetricHandle`] identifying one published metric,
//! and a [`MetricRegistry`] that accepts live-reading accessors and
//! de-duplicates by handle identity. It intentionally carries no runtime or
//! discovery dependencies so it can be reused by exporters and test harnesses.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Instrumentation is best-effort; all fallible paths surface as
//! `MeterBindError`/`Result` so a broken accessor never crashes the host.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod handle;
pub mod registry;

/// Shared result type.
pub use error::{MeterBindError, Result};
pub use handle::{MetricHandle, MetricKind, TagSet};
pub use registry::{Accessor, MetricRegistry, MetricValue};
