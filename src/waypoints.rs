// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{earth_distance, Coordinates, Hazard, Node};

/// Recommended value for the `count` argument of [generate_waypoints],
/// resulting in 4 intermediate points.
pub const DEFAULT_WAYPOINT_COUNT: usize = 5;

/// Hazards closer than this distance (in kilometers) push waypoints away.
pub const REPULSION_RADIUS: f64 = 1.0;

/// Displacement (in degrees) caused by a single nearby hazard.
pub const REPULSION_STEP: f64 = 0.01;

/// Generates `count - 1` waypoints equally spaced between `start` and `end`
/// (excluding both), each pushed away from hazards closer than [REPULSION_RADIUS].
///
/// Every such hazard moves the waypoint by [REPULSION_STEP] degrees along the
/// direction from the hazard to the interpolated point. Displacements add up without
/// normalization, so a cluster of hazards moves a waypoint further than a single one.
///
/// Returned nodes have the [Waypoint](crate::NodeRole::Waypoint) role and a placeholder
/// safety score, which is expected to be overwritten by a
/// [SafetyScorer](crate::SafetyScorer).
pub fn generate_waypoints(
    start: Coordinates,
    end: Coordinates,
    hazards: &[Hazard],
    count: usize,
) -> Vec<Node> {
    (1..count)
        .map(|i| {
            let t = i as f64 / count as f64;
            let lat = start.lat + t * (end.lat - start.lat);
            let lon = start.lon + t * (end.lon - start.lon);

            let (d_lat, d_lon) = hazards
                .iter()
                .filter(|h| earth_distance(lat, lon, h.latitude, h.longitude) < REPULSION_RADIUS)
                .fold((0.0, 0.0), |(d_lat, d_lon), h| {
                    let angle = (lat - h.latitude).atan2(lon - h.longitude);
                    (
                        d_lat + REPULSION_STEP * angle.sin(),
                        d_lon + REPULSION_STEP * angle.cos(),
                    )
                });

            Node::waypoint(lat + d_lat, lon + d_lon)
        })
        .collect()
}
