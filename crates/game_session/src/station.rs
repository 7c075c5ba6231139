//! Stations and their layout validator.
//!
//! Stations are small regions inside a kitchen that only exist while a game
//! is running. Ingredient stations hand out one fixed ingredient; trash and
//! assembly stations are part of the layout but accept no commands.

use crate::error::{MapError, MapResult};
use town_types::{BoundingBox, Ingredient};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationKind {
    Ingredient(Ingredient),
    Trash,
    Assembly,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: String,
    pub bounds: BoundingBox,
    pub kind: StationKind,
}

impl Station {
    pub fn new(id: impl Into<String>, bounds: BoundingBox, kind: StationKind) -> Self {
        Self {
            id: id.into(),
            bounds,
            kind,
        }
    }

    /// The ingredient this station dispenses, if any.
    pub fn ingredient(&self) -> Option<Ingredient> {
        match self.kind {
            StationKind::Ingredient(ingredient) => Some(ingredient),
            StationKind::Trash | StationKind::Assembly => None,
        }
    }
}

/// Checks a station layout for duplicate ids and overlapping bounds.
///
/// Both checks compare every pair of stations. Kitchens hold a handful of
/// stations and this runs once per game start, so the quadratic cost is fine.
///
/// # Returns
///
/// `Ok(())` for a clean layout, otherwise the first problem found as a
/// [`MapError::DuplicateStationId`] or [`MapError::OverlappingStations`].
pub fn validate_stations(stations: &[Station]) -> MapResult<()> {
    for (index, station) in stations.iter().enumerate() {
        if stations[index + 1..].iter().any(|other| other.id == station.id) {
            return Err(MapError::DuplicateStationId(station.id.clone()));
        }
    }
    for (index, station) in stations.iter().enumerate() {
        if let Some(other) = stations[index + 1..]
            .iter()
            .find(|other| station.bounds.overlaps(&other.bounds))
        {
            return Err(MapError::OverlappingStations(
                station.id.clone(),
                other.id.clone(),
            ));
        }
    }
    Ok(())
}
