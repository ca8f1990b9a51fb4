//! # sitedist Core Library
//!
//! A library for generating uniform, clustered, and random spatial distributions of
//! anchor-site indices on nanocrystal core surfaces.
//!
//! Given a set of candidate surface sites, as Cartesian coordinates or as a
//! pre-computed symmetric distance matrix, the library greedily builds an ordered
//! subset of site indices that is maximally spread out (uniform), maximally grouped
//! (cluster), or randomly permuted, optionally in fixed- or variable-size clusters
//! and with controlled stochastic tie-breaking.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture to ensure a clear
//! separation of concerns, making it modular, testable, and extensible.
//!
//! - **[`core`]: The Foundation.** Contains stateless data models ([`core::models::point_set::PointSet`])
//!   and the distance metrics ([`core::distance`]): plain Euclidean separation and the
//!   edge-following shortest-path metric over a surface proximity graph.
//!
//! - **[`engine`]: The Logic Core.** This stateful layer implements the greedy selection
//!   machinery: parameter validation, the weight transform, and the lazily-advancing
//!   [`engine::selection::SelectionWalk`] iterator that owns the masked distance buffer
//!   and accumulators for the duration of a single call.
//!
//! - **[`workflows`]: The Public API.** This is the highest-level, user-facing layer.
//!   It ties the `engine` and `core` together to execute a complete selection, from
//!   metric construction through lazy truncation of the yielded index sequence.

pub mod core;
pub mod engine;
pub mod workflows;
