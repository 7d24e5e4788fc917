//! Top-level facade crate for meterbind.
//!
//! Re-exports core types and the binding library so hosts can depend on a single crate.

pub mod core {
    pub use meterbind_core::*;
}

pub mod bind {
    pub use meterbind_bind::*;
}
