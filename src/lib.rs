// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Safety-first routing between two geographic points.
//!
//! Instead of minimizing pure distance, routes minimize a blend of distance and risk,
//! where risk is derived from nearby reported [hazards](Hazard). For every request
//! a small complete graph is synthesized from the start, the end and a handful of
//! [waypoints](generate_waypoints) pushed away from hazards. Each waypoint gets a
//! [safety score](SafetyScorer), and a [Dijkstra search](find_path) charges a
//! penalty for entering unsafe nodes.
//!
//! # Example
//!
//! ```
//! let hazards = saferoute::MemoryHazardSource::new();
//! hazards
//!     .report(saferoute::Hazard::new(52.2297, 21.0122, "unsafe area"))
//!     .expect("in-memory store is never poisoned");
//!
//! let router = saferoute::Router::default();
//! let route = router
//!     .compute_route(
//!         &hazards,
//!         saferoute::Coordinates::new(52.2297, 21.0000),
//!         saferoute::Coordinates::new(52.2297, 21.0300),
//!     )
//!     .expect("coordinates are valid");
//!
//! println!("Route: {:?}", route);
//! ```

pub mod c;
mod dijkstra;
mod distance;
mod graph;
pub mod hazard;
mod route;
pub mod scorer;
mod waypoints;

use serde::{Deserialize, Serialize};

pub use dijkstra::{find_path, find_path_with_penalty, Path, SearchError, DEFAULT_PENALTY_FACTOR};
pub use distance::{earth_distance, EARTH_RADIUS};
pub use graph::{Graph, GraphBuilder};
pub use hazard::{BoundingBox, Hazard, HazardSource, MemoryHazardSource, SourceUnavailable};
pub use route::{InputError, RouteResult, RouteWaypoint, Router, RouterOptions};
pub use scorer::{classify_risk, RiskLevel, SafetyScorer};
pub use waypoints::{generate_waypoints, DEFAULT_WAYPOINT_COUNT};

/// A latitude-longitude position, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[repr(C)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Purpose of a [Node] in a routing [Graph].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(C)]
pub enum NodeRole {
    Start = 0,
    End = 1,
    Waypoint = 2,
}

/// Represents an element of the [Graph].
///
/// Nodes only live for the duration of a single routing request.
/// `safety_score` must be within `[0, 1]`; start and end nodes are always
/// fully safe (`1.0`).
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct Node {
    pub lat: f64,
    pub lon: f64,
    pub safety_score: f64,
    pub role: NodeRole,
}

impl Node {
    pub const fn start(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            safety_score: 1.0,
            role: NodeRole::Start,
        }
    }

    pub const fn end(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            safety_score: 1.0,
            role: NodeRole::End,
        }
    }

    /// Creates a waypoint with a placeholder, neutral safety score.
    pub const fn waypoint(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            safety_score: scorer::NEUTRAL_SCORE,
            role: NodeRole::Waypoint,
        }
    }

    pub const fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lon)
    }
}

/// Represents a directed connection between two [Nodes](Node) of a [Graph],
/// identified by their indices.
///
/// `distance` is the great-circle distance between the nodes, in kilometers,
/// and must not be negative.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    pub distance: f64,
}
