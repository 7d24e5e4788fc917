//! Shared error type across meterbind crates.
//!
//! No variant here is fatal to the hosting process: instrumentation is
//! best-effort, and every failure is caught at the binder boundary and
//! converted to a log line plus a skip.

use thiserror::Error;

/// Shared result type.
pub type Result<T> = std::result::Result<T, MeterBindError>;

/// Unified error type used by the registry and binders.
#[derive(Debug, Error)]
pub enum MeterBindError {
    /// An identical (name, tags) handle is already registered. Expected under
    /// concurrent or repeated bind attempts; callers treat it as a no-op.
    #[error("already registered: {name}")]
    AlreadyRegistered { name: String },

    /// No binder variant supports the candidate resource.
    #[error("unsupported resource: {name}")]
    UnsupportedResource { name: String },

    /// One field accessor failed to read; the remaining fields still bind.
    #[error("accessor read failed for {field}: {reason}")]
    AccessorReadFailure { field: String, reason: String },

    /// The discovery collaborator could not enumerate resources.
    #[error("discovery unavailable: {0}")]
    DiscoveryUnavailable(String),

    /// Rejected configuration.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl MeterBindError {
    /// True for the duplicate-registration case, which binders swallow as
    /// "skip, already bound" rather than propagating.
    pub fn is_already_registered(&self) -> bool {
        matches!(self, MeterBindError::AlreadyRegistered { .. })
    }
}
