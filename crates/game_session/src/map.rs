//! Map description loader.
//!
//! Reads the object layer of a tiled map export and turns typed objects into
//! game regions and stations. Each object's `type` property picks what it
//! becomes:
//!
//! | `type`        | result                                              |
//! |---------------|-----------------------------------------------------|
//! | `Undercooked` | a game region                                       |
//! | `Ingredient`  | an ingredient station (`ingredient` or `ingredientName` property) |
//! | `Trash`       | a trash station                                     |
//! | `Assembly`    | an assembly station                                 |
//!
//! Objects without a `type` property are not ours and are skipped. A station
//! joins the region named by its `area` property, or every region when the
//! property is absent. Each region's station layout is validated here so that
//! corrupt maps are rejected when the town loads.

use crate::error::{MapError, MapResult};
use crate::station::{validate_stations, Station, StationKind};
use serde::Deserialize;
use std::path::Path;
use town_types::{BoundingBox, Ingredient};
use tracing::debug;

/// Name of the tiled layer holding interactable objects.
pub const OBJECT_LAYER: &str = "Objects";

#[derive(Debug, Deserialize)]
struct TiledMap {
    #[serde(default)]
    layers: Vec<TiledLayer>,
}

#[derive(Debug, Deserialize)]
struct TiledLayer {
    #[serde(default)]
    name: String,
    #[serde(default)]
    objects: Vec<TiledObject>,
}

#[derive(Debug, Deserialize)]
struct TiledObject {
    #[serde(default)]
    name: String,
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
    #[serde(default)]
    width: Option<f64>,
    #[serde(default)]
    height: Option<f64>,
    #[serde(default)]
    properties: Vec<TiledProperty>,
}

#[derive(Debug, Deserialize)]
struct TiledProperty {
    name: String,
    #[serde(default)]
    value: serde_json::Value,
}

impl TiledObject {
    fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|property| property.name == name)
            .and_then(|property| property.value.as_str())
    }

    fn malformed(&self, reason: impl Into<String>) -> MapError {
        MapError::MalformedMapObject {
            name: self.name.clone(),
            reason: reason.into(),
        }
    }

    fn bounds(&self) -> MapResult<BoundingBox> {
        match (self.width, self.height) {
            (Some(width), Some(height)) if width > 0.0 && height > 0.0 => {
                Ok(BoundingBox::new(self.x, self.y, width, height))
            }
            _ => Err(self.malformed("missing or zero width/height")),
        }
    }

    fn ingredient(&self) -> MapResult<Ingredient> {
        let raw = self
            .property("ingredient")
            .or_else(|| self.property("ingredientName"))
            .ok_or_else(|| self.malformed("ingredient station names no ingredient"))?;
        raw.parse().map_err(|e| self.malformed(format!("{e}")))
    }
}

/// A game region and the stations laid out inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSpec {
    pub id: String,
    pub bounds: BoundingBox,
    pub stations: Vec<Station>,
}

/// Regions and stations derived from one map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapDescription {
    pub regions: Vec<RegionSpec>,
}

impl MapDescription {
    /// Reads and parses a map file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to a tiled JSON export
    pub fn load(path: impl AsRef<Path>) -> MapResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| MapError::FileRead(path.to_path_buf(), e))?;
        Self::from_json(&json)
    }

    /// Parses a tiled JSON export held in memory.
    pub fn from_json(json: &str) -> MapResult<Self> {
        let map: TiledMap = serde_json::from_str(json)?;
        let layer = map
            .layers
            .iter()
            .find(|layer| layer.name == OBJECT_LAYER)
            .ok_or_else(|| MapError::MissingObjectLayer(OBJECT_LAYER.to_string()))?;

        let mut regions: Vec<RegionSpec> = Vec::new();
        let mut stations: Vec<(Option<&str>, Station)> = Vec::new();

        for object in &layer.objects {
            let Some(kind) = object.property("type") else {
                debug!("Skipping untyped map object '{}'", object.name);
                continue;
            };
            if object.name.is_empty() {
                return Err(object.malformed("object has no name"));
            }
            let bounds = object.bounds()?;
            let station_kind = match kind {
                "Undercooked" => {
                    if regions.iter().any(|region| region.id == object.name) {
                        return Err(MapError::DuplicateRegionId(object.name.clone()));
                    }
                    regions.push(RegionSpec {
                        id: object.name.clone(),
                        bounds,
                        stations: Vec::new(),
                    });
                    continue;
                }
                "Ingredient" => StationKind::Ingredient(object.ingredient()?),
                "Trash" => StationKind::Trash,
                "Assembly" => StationKind::Assembly,
                other => {
                    return Err(MapError::UnknownAreaType {
                        name: object.name.clone(),
                        kind: other.to_string(),
                    })
                }
            };
            stations.push((
                object.property("area"),
                Station::new(object.name.clone(), bounds, station_kind),
            ));
        }

        for (area, station) in stations {
            match area {
                Some(area) => regions
                    .iter_mut()
                    .find(|region| region.id == area)
                    .ok_or_else(|| MapError::MalformedMapObject {
                        name: station.id.clone(),
                        reason: format!("station refers to unknown area {area}"),
                    })?
                    .stations
                    .push(station),
                None => {
                    for region in regions.iter_mut() {
                        region.stations.push(station.clone());
                    }
                }
            }
        }

        for region in &regions {
            validate_stations(&region.stations)?;
        }
        Ok(Self { regions })
    }

    pub fn region(&self, id: &str) -> Option<&RegionSpec> {
        self.regions.iter().find(|region| region.id == id)
    }
}
