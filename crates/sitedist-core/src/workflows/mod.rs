//! # Workflows Module
//!
//! This module provides the high-level, user-facing entry points of the
//! library. A workflow ties the `core` and `engine` layers together: it
//! validates the caller's parameters, derives the candidate-restricted
//! distance matrix with the requested metric, drives the lazy selection walk,
//! and maps the yielded matrix rows back to the caller's site indices.
//!
//! - **Distribution Workflow** ([`distribute`]) - Complete index selection,
//!   from geometry to the truncated, ordered index sequence.

pub mod distribute;
