//! Window-host side effects driven by mode changes.

mod bounds_sync;

pub use bounds_sync::BoundsSynchronizer;
