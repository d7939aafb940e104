// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

use crate::scorer::mean;
use crate::{classify_risk, Coordinates, Graph, Path, RiskLevel};

/// A single point of a computed route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[repr(C)]
pub struct RouteWaypoint {
    pub lat: f64,
    pub lon: f64,
    pub safety_score: f64,
    pub risk_level: RiskLevel,
}

/// Annotated result of a [routing request](crate::Router::compute_route).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    pub start: Coordinates,
    pub end: Coordinates,
    pub route: Vec<RouteWaypoint>,
    pub total_distance_km: f64,

    /// Mean safety score of all route points; 0.5 for an empty route.
    pub route_safety_score: f64,
    pub overall_risk_level: RiskLevel,
    pub waypoint_count: usize,

    /// Number of all hazards considered for the request, not only the nearby ones.
    pub hazard_count: usize,

    /// Total search cost (distance plus safety penalties), absent if no route was found.
    pub total_cost: Option<f64>,
}

/// Maps a [Path] over a [Graph] into an annotated [RouteResult].
pub(crate) fn assemble(
    g: &Graph,
    path: &Path,
    start: Coordinates,
    end: Coordinates,
    hazard_count: usize,
) -> RouteResult {
    let route: Vec<RouteWaypoint> = path
        .nodes
        .iter()
        .filter_map(|&idx| g.get_node(idx))
        .map(|node| RouteWaypoint {
            lat: node.lat,
            lon: node.lon,
            safety_score: node.safety_score,
            risk_level: classify_risk(node.safety_score),
        })
        .collect();

    let total_distance_km = path
        .nodes
        .windows(2)
        .map(|pair| g.get_edge(pair[0], pair[1]))
        .fold(0.0, |total, d| total + d);

    let route_safety_score = mean(route.iter().map(|w| w.safety_score));

    RouteResult {
        start,
        end,
        waypoint_count: route.len(),
        route,
        total_distance_km,
        route_safety_score,
        overall_risk_level: classify_risk(route_safety_score),
        hazard_count,
        total_cost: if path.is_empty() { None } else { Some(path.cost) },
    }
}
