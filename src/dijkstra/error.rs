// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

/// Error conditions which may occur during [find_path](crate::find_path).
///
/// Lack of a route is not an error - it results in an empty [Path](crate::Path)
/// with an infinite cost.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum SearchError {
    /// The start or end node doesn't exist in a graph.
    #[error("invalid node: {0}")]
    InvalidReference(usize),

    /// The penalty factor is negative or not finite.
    #[error("invalid penalty factor: {0}")]
    InvalidPenalty(f64),
}
