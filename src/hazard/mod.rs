// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

mod reader;

pub use reader::{hazards_from_buffer, hazards_from_io, FileFormat, FileHazardSource};

/// A reported unsafe condition at a specific location.
///
/// Hazards are immutable once recorded; the routing core only reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hazard {
    pub latitude: f64,
    pub longitude: f64,

    /// Category of the hazard, e.g. "no streetlight", "unsafe area" or "stray animals".
    pub hazard_type: String,

    /// Free-form description provided by the reporter.
    #[serde(default)]
    pub description: String,

    /// Identifier of the reporting user, if known.
    #[serde(default)]
    pub reported_by: Option<String>,

    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,

    /// Safety score precomputed by the store, if any. Not used for routing.
    #[serde(default)]
    pub safety_score: Option<f64>,
}

impl Hazard {
    /// Creates a hazard of the given type reported now by an anonymous user.
    pub fn new<S: Into<String>>(latitude: f64, longitude: f64, hazard_type: S) -> Self {
        Self {
            latitude,
            longitude,
            hazard_type: hazard_type.into(),
            description: String::default(),
            reported_by: None,
            timestamp: Utc::now(),
            safety_score: None,
        }
    }

    /// Checks whether both the latitude and longitude difference between the hazard
    /// and the provided position are strictly below `window` degrees.
    pub fn is_within_window(&self, lat: f64, lon: f64, window: f64) -> bool {
        (self.latitude - lat).abs() < window && (self.longitude - lon).abs() < window
    }
}

/// Axis-aligned latitude/longitude window, bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Creates a box spanning `margin` degrees around the provided point.
    pub fn around(lat: f64, lon: f64, margin: f64) -> Self {
        Self {
            min_lat: lat - margin,
            min_lon: lon - margin,
            max_lat: lat + margin,
            max_lon: lon + margin,
        }
    }

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }
}

/// Error returned by a [HazardSource] when hazards can't be retrieved.
#[derive(Debug, thiserror::Error)]
pub enum SourceUnavailable {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("hazard store lock poisoned")]
    Poisoned,
}

/// Read access to a collection of [Hazards](Hazard).
///
/// Any backing store (memory, file, database, remote service) can be used
/// by the [Router](crate::Router) through this trait.
pub trait HazardSource: Send + Sync {
    /// Retrieves all known hazards.
    fn fetch_all(&self) -> Result<Vec<Hazard>, SourceUnavailable>;

    /// Retrieves hazards located inside the provided [BoundingBox].
    ///
    /// The default implementation filters the result of [HazardSource::fetch_all].
    fn fetch_near(&self, bbox: &BoundingBox) -> Result<Vec<Hazard>, SourceUnavailable> {
        let mut hazards = self.fetch_all()?;
        hazards.retain(|h| bbox.contains(h.latitude, h.longitude));
        Ok(hazards)
    }
}

/// Append-only in-memory hazard store.
#[derive(Debug, Default)]
pub struct MemoryHazardSource(RwLock<Vec<Hazard>>);

impl MemoryHazardSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a new hazard.
    pub fn report(&self, hazard: Hazard) -> Result<(), SourceUnavailable> {
        let mut hazards = self.0.write().map_err(|_| SourceUnavailable::Poisoned)?;
        log::debug!(
            "recorded {:?} hazard at ({}, {})",
            hazard.hazard_type,
            hazard.latitude,
            hazard.longitude
        );
        hazards.push(hazard);
        Ok(())
    }

    /// Returns the number of recorded hazards.
    pub fn len(&self) -> Result<usize, SourceUnavailable> {
        let hazards = self.0.read().map_err(|_| SourceUnavailable::Poisoned)?;
        Ok(hazards.len())
    }

    pub fn is_empty(&self) -> Result<bool, SourceUnavailable> {
        Ok(self.len()? == 0)
    }
}

impl From<Vec<Hazard>> for MemoryHazardSource {
    fn from(hazards: Vec<Hazard>) -> Self {
        Self(RwLock::new(hazards))
    }
}

impl FromIterator<Hazard> for MemoryHazardSource {
    fn from_iter<I: IntoIterator<Item = Hazard>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl HazardSource for MemoryHazardSource {
    fn fetch_all(&self) -> Result<Vec<Hazard>, SourceUnavailable> {
        self.0
            .read()
            .map(|h| h.clone())
            .map_err(|_| SourceUnavailable::Poisoned)
    }
}

impl HazardSource for Vec<Hazard> {
    fn fetch_all(&self) -> Result<Vec<Hazard>, SourceUnavailable> {
        Ok(self.clone())
    }
}
