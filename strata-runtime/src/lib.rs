//! # strata-runtime
//!
//! Wires the graph store, hierarchy engine, and retrieval engine together
//! around one [`StrataConfig`](strata_core::StrataConfig) and exposes the two
//! operations callers need: rebuild the hierarchy and search.

pub mod runtime;

pub use runtime::{Collaborators, RuntimeOptions, StrataRuntime};
