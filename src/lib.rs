#![deny(missing_docs)]

//! Ordered bidirectional map, [`collections::BiMap`], where every left value is paired with exactly one right value and either side can be used to look up the other.

//!# Features
//!
//! This crate supports the following cargo features:
//! - `cap` : report memory usage in tests via the cap crate.

/// Containers.
pub mod collections;
