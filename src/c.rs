// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use super::*;

use std::borrow::Cow;
use std::ffi::{c_char, CStr};
use std::mem::forget;
use std::ptr::null_mut;
use std::slice;

use crate::scorer::{NEUTRAL_SCORE, UNKNOWN_HAZARD};

#[repr(C)]
pub struct CHazard {
    pub lat: f64,
    pub lon: f64,
    pub hazard_type: *const c_char,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub enum CRouteResultType {
    Ok = 0,
    InvalidInput = 1,
}

#[repr(C)]
pub struct CRouteResult {
    pub waypoints: *mut RouteWaypoint,
    pub len: usize,
    pub capacity: usize,
    pub total_distance_km: f64,
    pub route_safety_score: f64,
    pub overall_risk_level: RiskLevel,
    pub hazard_count: usize,
    pub type_: CRouteResultType,
}

impl CRouteResult {
    fn ok(result: RouteResult) -> Self {
        let mut waypoints = result.route;
        let ptr = waypoints.as_mut_ptr();
        let len = waypoints.len();
        let capacity = waypoints.capacity();
        forget(waypoints);

        CRouteResult {
            waypoints: ptr,
            len,
            capacity,
            total_distance_km: result.total_distance_km,
            route_safety_score: result.route_safety_score,
            overall_risk_level: result.overall_risk_level,
            hazard_count: result.hazard_count,
            type_: CRouteResultType::Ok,
        }
    }

    fn invalid_input() -> Self {
        CRouteResult {
            waypoints: null_mut(),
            len: 0,
            capacity: 0,
            total_distance_km: 0.0,
            route_safety_score: NEUTRAL_SCORE,
            overall_risk_level: classify_risk(NEUTRAL_SCORE),
            hazard_count: 0,
            type_: CRouteResultType::InvalidInput,
        }
    }
}

unsafe fn hazard_type_from_c<'a>(ptr: *const c_char) -> Cow<'a, str> {
    if ptr.is_null() {
        Cow::Borrowed(UNKNOWN_HAZARD)
    } else {
        CStr::from_ptr(ptr).to_string_lossy()
    }
}

unsafe fn hazards_from_c(hazards: *const CHazard, len: usize) -> Vec<Hazard> {
    if hazards.is_null() {
        return Vec::default();
    }

    slice::from_raw_parts(hazards, len)
        .iter()
        .map(|h| Hazard::new(h.lat, h.lon, hazard_type_from_c(h.hazard_type)))
        .collect()
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn saferoute_score_location(
    lat: f64,
    lon: f64,
    hazard_type: *const c_char,
    nearby_hazards: usize,
) -> f64 {
    SafetyScorer::default()
        .score_location(lat, lon, &hazard_type_from_c(hazard_type), nearby_hazards)
        .value()
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn saferoute_classify_risk(score: f64) -> RiskLevel {
    classify_risk(score)
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn saferoute_compute_route(
    hazards: *const CHazard,
    hazards_len: usize,
    start_lat: f64,
    start_lon: f64,
    end_lat: f64,
    end_lon: f64,
    waypoint_count: usize,
) -> CRouteResult {
    let hazards = hazards_from_c(hazards, hazards_len);
    let router = Router::new(
        SafetyScorer::default(),
        RouterOptions {
            waypoint_count,
            ..RouterOptions::default()
        },
    );

    match router.compute_route_with_hazards(
        &hazards,
        Coordinates::new(start_lat, start_lon),
        Coordinates::new(end_lat, end_lon),
    ) {
        Ok(result) => CRouteResult::ok(result),
        Err(e) => {
            log::warn!("rejected route request: {}", e);
            CRouteResult::invalid_input()
        }
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn saferoute_route_result_delete(result: CRouteResult) {
    if !result.waypoints.is_null() {
        drop(Vec::from_raw_parts(result.waypoints, result.len, result.capacity));
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn saferoute_earth_distance(
    lat1: f64,
    lon1: f64,
    lat2: f64,
    lon2: f64,
) -> f64 {
    earth_distance(lat1, lon1, lat2, lon2)
}
