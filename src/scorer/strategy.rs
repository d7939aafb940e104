// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use super::ScoringError;

/// Estimates how safe a location is based only on its (normalized) position.
///
/// `lat_norm` and `lon_norm` are in `[0, 1)`. Implementations must be `Send + Sync`
/// so that waypoints can be scored across threads.
pub trait SpatialScoringStrategy: Send + Sync {
    fn spatial_score(&self, lat_norm: f64, lon_norm: f64) -> Result<f64, ScoringError>;
}

/// Estimates how safe a location is based on its hazard context: the type
/// of the closest hazard and the number of hazards around.
pub trait ContextualScoringStrategy: Send + Sync {
    fn contextual_score(&self, hazard_type: &str, nearby_hazards: usize)
        -> Result<f64, ScoringError>;
}

/// Default [SpatialScoringStrategy]: `0.5 + 0.25 * lat_norm + 0.25 * lon_norm`.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ArithmeticSpatial;

impl SpatialScoringStrategy for ArithmeticSpatial {
    fn spatial_score(&self, lat_norm: f64, lon_norm: f64) -> Result<f64, ScoringError> {
        Ok(0.5 + 0.25 * lat_norm + 0.25 * lon_norm)
    }
}

/// Default [ContextualScoringStrategy]: `max(0, 0.7 - 0.1 * nearby_hazards)`.
/// The hazard type is ignored.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ArithmeticContextual;

impl ContextualScoringStrategy for ArithmeticContextual {
    fn contextual_score(
        &self,
        _hazard_type: &str,
        nearby_hazards: usize,
    ) -> Result<f64, ScoringError> {
        Ok((0.7 - 0.1 * nearby_hazards as f64).max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_spatial() {
        assert_eq!(ArithmeticSpatial.spatial_score(0.0, 0.0).unwrap(), 0.5);
        assert_eq!(ArithmeticSpatial.spatial_score(0.5, 0.5).unwrap(), 0.75);
    }

    #[test]
    fn arithmetic_contextual_floors_at_zero() {
        let s = |n| ArithmeticContextual.contextual_score("unknown", n).unwrap();
        assert!((s(0) - 0.7).abs() < 1e-12);
        assert!((s(3) - 0.4).abs() < 1e-12);
        assert!(s(7) >= 0.0 && s(7) < 1e-12);
        assert_eq!(s(20), 0.0);
    }
}
