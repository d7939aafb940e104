// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::scorer::{hazard_context, LocationScore, NEARBY_WINDOW};
use crate::{
    find_path_with_penalty, generate_waypoints, Coordinates, Graph, GraphBuilder, Hazard,
    HazardSource, Path, SafetyScorer, DEFAULT_PENALTY_FACTOR, DEFAULT_WAYPOINT_COUNT,
};

mod assembler;

pub use assembler::{RouteResult, RouteWaypoint};

/// Rejected request coordinates or routing options.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum InputError {
    #[error("{point} latitude not within [-90, 90]: {value}")]
    Latitude { point: &'static str, value: f64 },

    #[error("{point} longitude not within [-180, 180]: {value}")]
    Longitude { point: &'static str, value: f64 },

    #[error("penalty factor must be finite and non-negative: {0}")]
    PenaltyFactor(f64),
}

fn validate(point: &'static str, c: Coordinates) -> Result<(), InputError> {
    if !(-90.0..=90.0).contains(&c.lat) {
        Err(InputError::Latitude { point, value: c.lat })
    } else if !(-180.0..=180.0).contains(&c.lon) {
        Err(InputError::Longitude { point, value: c.lon })
    } else {
        Ok(())
    }
}

/// Additional controls for computing routes with a [Router].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouterOptions {
    /// Controls the number of synthesized waypoints, see
    /// [generate_waypoints](crate::generate_waypoints).
    pub waypoint_count: usize,

    /// Multiplier of the safety deficit of every entered node, see
    /// [find_path_with_penalty](crate::find_path_with_penalty).
    pub penalty_factor: f64,

    /// Score waypoints on the rayon thread pool.
    pub parallel_scoring: bool,
}

impl RouterOptions {
    /// Checks the options which can't be used for a search.
    pub fn validate(&self) -> Result<(), InputError> {
        if self.penalty_factor.is_finite() && self.penalty_factor >= 0.0 {
            Ok(())
        } else {
            Err(InputError::PenaltyFactor(self.penalty_factor))
        }
    }
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            waypoint_count: DEFAULT_WAYPOINT_COUNT,
            penalty_factor: DEFAULT_PENALTY_FACTOR,
            parallel_scoring: true,
        }
    }
}

/// Computes safety-first routes and location scores against a [HazardSource].
///
/// A router holds no per-request state and can be shared between threads.
#[derive(Debug, Default)]
pub struct Router {
    scorer: SafetyScorer,
    options: RouterOptions,
}

impl Router {
    pub fn new(scorer: SafetyScorer, options: RouterOptions) -> Self {
        Self { scorer, options }
    }

    pub fn scorer(&self) -> &SafetyScorer {
        &self.scorer
    }

    pub fn options(&self) -> &RouterOptions {
        &self.options
    }

    /// Computes the safest-shortest route between two points, using all hazards
    /// from the provided source.
    ///
    /// Only invalid coordinates or [RouterOptions] fail the request. If the source
    /// is unavailable, the route is computed as if there were no hazards.
    pub fn compute_route<S: HazardSource + ?Sized>(
        &self,
        source: &S,
        start: Coordinates,
        end: Coordinates,
    ) -> Result<RouteResult, InputError> {
        self.options.validate()?;
        validate("start", start)?;
        validate("end", end)?;
        let hazards = self.fetch_hazards(source);
        Ok(self.route_between(&hazards, start, end))
    }

    /// Same as [Router::compute_route], but with an already retrieved list of hazards.
    pub fn compute_route_with_hazards(
        &self,
        hazards: &[Hazard],
        start: Coordinates,
        end: Coordinates,
    ) -> Result<RouteResult, InputError> {
        self.options.validate()?;
        validate("start", start)?;
        validate("end", end)?;
        Ok(self.route_between(hazards, start, end))
    }

    /// Builds the routing [Graph] for a request, without searching it.
    pub fn build_graph(&self, hazards: &[Hazard], start: Coordinates, end: Coordinates) -> Graph {
        let waypoints = generate_waypoints(start, end, hazards, self.options.waypoint_count);
        GraphBuilder::new(&self.scorer, hazards)
            .parallel(self.options.parallel_scoring)
            .build(start, end, waypoints)
    }

    fn route_between(
        &self,
        hazards: &[Hazard],
        start: Coordinates,
        end: Coordinates,
    ) -> RouteResult {
        let g = self.build_graph(hazards, start, end);

        let penalty_factor = self.options.penalty_factor;
        let path = match find_path_with_penalty(&g, Graph::START, Graph::END, penalty_factor) {
            Ok(path) => path,
            Err(e) => {
                // Start and end always exist in a built graph, and options are validated
                log::error!("route search failed: {}", e);
                Path::none()
            }
        };
        if path.is_empty() {
            log::warn!(
                "no route from ({}, {}) to ({}, {})",
                start.lat,
                start.lon,
                end.lat,
                end.lon
            );
        }

        let result = assembler::assemble(&g, &path, start, end, hazards.len());
        log::info!(
            "route from ({}, {}) to ({}, {}): {} points, {:.3} km, safety {:.3} ({})",
            start.lat,
            start.lon,
            end.lat,
            end.lon,
            result.waypoint_count,
            result.total_distance_km,
            result.route_safety_score,
            result.overall_risk_level
        );
        result
    }

    /// Scores a single location, counting the hazards from the provided source
    /// within [NEARBY_WINDOW] degrees.
    pub fn score_location<S: HazardSource + ?Sized>(
        &self,
        source: &S,
        lat: f64,
        lon: f64,
        hazard_type: &str,
    ) -> Result<LocationScore, InputError> {
        validate("scored", Coordinates::new(lat, lon))?;
        let hazards = self.fetch_hazards(source);
        let (_, nearby) = hazard_context(&hazards, lat, lon, NEARBY_WINDOW);
        Ok(self.scorer.assess(lat, lon, hazard_type, nearby))
    }

    fn fetch_hazards<S: HazardSource + ?Sized>(&self, source: &S) -> Vec<Hazard> {
        match source.fetch_all() {
            Ok(hazards) => hazards,
            Err(e) => {
                log::warn!("hazard source unavailable, assuming no hazards: {}", e);
                Vec::default()
            }
        }
    }
}
