//! # Engine Module
//!
//! This module implements the greedy selection machinery: everything between a
//! validated distance matrix and the ordered index sequence a caller consumes.
//!
//! ## Architecture
//!
//! The module is organized into specialized submodules:
//!
//! - **Configuration** ([`config`]) - Selection mode, fraction, cluster-size
//!   schedule, and the builder that assembles them
//! - **Error Handling** ([`error`]) - Selection-specific error types, raised
//!   eagerly before any computation
//! - **Weight Transform** ([`weights`]) - The default monotonic transform
//!   applied to distances before aggregation
//! - **Selection Walk** ([`selection`]) - The lazily-advancing iterator that
//!   owns the masked distance buffer and accumulators for one call
//!
//! ## Key Capabilities
//!
//! - **Sentinel masking** with `f64::NAN` so selected rows and the diagonal can
//!   never be re-selected and never dominate a weighted sum
//! - **Cluster bookkeeping** with fixed or cyclic variable cluster sizes
//! - **Stochastic overrides** injecting controlled randomness without breaking
//!   the uniqueness invariant
//! - **Lazy evaluation** so truncating the walk never pays for unrequested picks

pub mod config;
pub mod error;
pub mod selection;
pub mod weights;
