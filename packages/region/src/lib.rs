#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! In-memory region index for track crossing detection.
//!
//! Reads a `GeoJSON` feature collection of region polygons (typically US
//! counties keyed by FIPS code), keeps each region's geometry as a
//! [`RegionGeometry`] variant, and builds an R-tree of region envelopes so
//! the crossing detector only tests regions near the track.
//!
//! Iteration always follows the order features appeared in the source
//! document.

pub mod fips;
pub mod geometry;

use std::collections::BTreeSet;

use geo::{LineString, MultiPolygon, Polygon};
use geojson::{Feature, feature::Id};
use rstar::{AABB, RTree, RTreeObject};
use thiserror::Error;

pub use geometry::{PointPolicy, RegionGeometry};

/// Errors that can occur while building a region index.
#[derive(Debug, Error)]
pub enum RegionError {
    /// The document is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The document is not a feature collection.
    #[error("Expected a GeoJSON FeatureCollection: {message}")]
    NotFeatureCollection {
        /// Description of what was found instead.
        message: String,
    },

    /// A single feature was unusable.
    #[error("Invalid feature {id:?}: {message}")]
    InvalidFeature {
        /// Feature id, when one could be read.
        id: Option<String>,
        /// Description of what went wrong.
        message: String,
    },
}

/// Options applied while reading region features.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegionIndexOptions {
    /// Left-pad all-digit ids to five-digit county FIPS codes.
    pub pad_fips: bool,
}

/// A single addressable region.
#[derive(Debug, Clone)]
pub struct Region {
    /// Opaque identifier (e.g. a county FIPS code).
    pub id: String,
    /// Region footprint.
    pub geometry: RegionGeometry,
}

/// R-tree entry pointing back into [`RegionIndex::regions`].
struct RegionEnvelope {
    position: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for RegionEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Ordered collection of regions with an envelope index.
pub struct RegionIndex {
    regions: Vec<Region>,
    envelopes: RTree<RegionEnvelope>,
}

impl std::fmt::Debug for RegionIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegionIndex")
            .field("regions", &self.regions.len())
            .finish_non_exhaustive()
    }
}

impl RegionIndex {
    /// Builds an index from regions, keeping the first region for any
    /// repeated id.
    #[must_use]
    pub fn from_regions(regions: Vec<Region>) -> Self {
        let mut seen = BTreeSet::new();
        let mut kept = Vec::with_capacity(regions.len());

        for region in regions {
            if seen.insert(region.id.clone()) {
                kept.push(region);
            } else {
                log::warn!("Duplicate region id {}, keeping the first", region.id);
            }
        }

        let entries = kept
            .iter()
            .enumerate()
            .filter_map(|(position, region)| {
                let rect = region.geometry.bounding_rect()?;
                Some(RegionEnvelope {
                    position,
                    envelope: AABB::from_corners(
                        [rect.min().x, rect.min().y],
                        [rect.max().x, rect.max().y],
                    ),
                })
            })
            .collect();

        Self {
            regions: kept,
            envelopes: RTree::bulk_load(entries),
        }
    }

    /// Parses a `GeoJSON` feature collection document.
    ///
    /// Features that lack an id, carry a geometry other than `Polygon` or
    /// `MultiPolygon`, or have malformed coordinates are skipped with a
    /// warning.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError`] if the document is not JSON or is not a
    /// feature collection.
    pub fn from_geojson_str(
        document: &str,
        options: RegionIndexOptions,
    ) -> Result<Self, RegionError> {
        let value: serde_json::Value = serde_json::from_str(document)?;
        Self::from_geojson_value(value, options)
    }

    /// Same as [`Self::from_geojson_str`] for an already-parsed document.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::NotFeatureCollection`] if `value` has no
    /// `features` array.
    pub fn from_geojson_value(
        value: serde_json::Value,
        options: RegionIndexOptions,
    ) -> Result<Self, RegionError> {
        let serde_json::Value::Object(mut document) = value else {
            return Err(RegionError::NotFeatureCollection {
                message: "document is not an object".to_string(),
            });
        };

        let Some(serde_json::Value::Array(features)) = document.remove("features") else {
            return Err(RegionError::NotFeatureCollection {
                message: "missing \"features\" array".to_string(),
            });
        };

        let total = features.len();
        let mut regions = Vec::with_capacity(total);

        for feature in features {
            match region_from_feature(feature, options) {
                Ok(region) => regions.push(region),
                Err(e) => log::warn!("Skipping region feature: {e}"),
            }
        }

        let index = Self::from_regions(regions);
        log::info!("Indexed {} regions of {total} features", index.len());
        Ok(index)
    }

    /// Regions in source order.
    #[must_use]
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Looks up a region by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.id == id)
    }

    /// Number of indexed regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// True when no feature survived ingestion.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Positions (ascending) of regions whose envelope intersects the box
    /// spanned by `min` and `max` (`[lon, lat]`).
    #[must_use]
    pub fn positions_near(&self, min: [f64; 2], max: [f64; 2]) -> Vec<usize> {
        let query = AABB::from_corners(min, max);
        let mut positions: Vec<usize> = self
            .envelopes
            .locate_in_envelope_intersecting(&query)
            .map(|entry| entry.position)
            .collect();
        positions.sort_unstable();
        positions
    }
}

fn region_from_feature(
    value: serde_json::Value,
    options: RegionIndexOptions,
) -> Result<Region, RegionError> {
    let feature = Feature::from_json_value(value).map_err(|e| RegionError::InvalidFeature {
        id: None,
        message: e.to_string(),
    })?;

    let id = match &feature.id {
        Some(Id::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(Id::Number(n)) => n.to_string(),
        _ => {
            return Err(RegionError::InvalidFeature {
                id: None,
                message: "feature has no id".to_string(),
            });
        }
    };
    let id = if options.pad_fips {
        fips::pad_county_fips(&id)
    } else {
        id
    };

    let invalid = |message: String| RegionError::InvalidFeature {
        id: Some(id.clone()),
        message,
    };

    let Some(geometry) = &feature.geometry else {
        return Err(invalid("feature has no geometry".to_string()));
    };

    let geometry = match &geometry.value {
        geojson::Value::Polygon(rings) => {
            RegionGeometry::Polygon(outer_ring_polygon(rings).map_err(invalid)?)
        }
        geojson::Value::MultiPolygon(polygons) => {
            if polygons.is_empty() {
                return Err(invalid("empty MultiPolygon".to_string()));
            }
            let members = polygons
                .iter()
                .map(|rings| outer_ring_polygon(rings))
                .collect::<Result<Vec<_>, _>>()
                .map_err(invalid)?;
            RegionGeometry::MultiPolygon(MultiPolygon(members))
        }
        other => {
            return Err(invalid(format!(
                "unsupported geometry type {}",
                geometry_type_name(other)
            )));
        }
    };

    Ok(Region { id, geometry })
}

const fn geometry_type_name(value: &geojson::Value) -> &'static str {
    match value {
        geojson::Value::Point(_) => "Point",
        geojson::Value::MultiPoint(_) => "MultiPoint",
        geojson::Value::LineString(_) => "LineString",
        geojson::Value::MultiLineString(_) => "MultiLineString",
        geojson::Value::Polygon(_) => "Polygon",
        geojson::Value::MultiPolygon(_) => "MultiPolygon",
        geojson::Value::GeometryCollection(_) => "GeometryCollection",
    }
}

/// Builds a polygon from the first (outer) ring; holes are ignored.
fn outer_ring_polygon(rings: &[Vec<Vec<f64>>]) -> Result<Polygon<f64>, String> {
    let ring = rings.first().ok_or_else(|| "polygon has no rings".to_string())?;

    let mut coords = Vec::with_capacity(ring.len());
    for position in ring {
        let (Some(&lon), Some(&lat)) = (position.first(), position.get(1)) else {
            return Err("position has fewer than two ordinates".to_string());
        };
        if !lon.is_finite() || !lat.is_finite() {
            return Err("non-finite coordinate".to_string());
        }
        coords.push((lon, lat));
    }

    if coords.len() < 3 {
        return Err(format!("ring has {} positions, need at least 3", coords.len()));
    }

    Ok(Polygon::new(LineString::from(coords), vec![]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection(features: &serde_json::Value) -> String {
        serde_json::json!({ "type": "FeatureCollection", "features": features }).to_string()
    }

    fn square_feature(id: &serde_json::Value, min: f64, max: f64) -> serde_json::Value {
        serde_json::json!({
            "type": "Feature",
            "id": id,
            "properties": {},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[min, min], [max, min], [max, max], [min, max], [min, min]]]
            }
        })
    }

    #[test]
    fn reads_polygons_and_multipolygons_in_order() {
        let doc = collection(&serde_json::json!([
            square_feature(&serde_json::json!("B"), 0.0, 1.0),
            {
                "type": "Feature",
                "id": "A",
                "properties": {},
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[2.0, 2.0], [3.0, 2.0], [3.0, 3.0], [2.0, 2.0]]],
                        [[[5.0, 5.0], [6.0, 5.0], [6.0, 6.0], [5.0, 5.0]]]
                    ]
                }
            }
        ]));

        let index = RegionIndex::from_geojson_str(&doc, RegionIndexOptions::default()).unwrap();

        let ids: Vec<&str> = index.regions().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["B", "A"]);
        assert!(matches!(
            index.get("A").unwrap().geometry,
            RegionGeometry::MultiPolygon(_)
        ));
    }

    #[test]
    fn skips_unusable_features() {
        let doc = collection(&serde_json::json!([
            {
                "type": "Feature",
                "properties": {},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
                }
            },
            {
                "type": "Feature",
                "id": "point",
                "properties": {},
                "geometry": { "type": "Point", "coordinates": [0.0, 0.0] }
            },
            {
                "type": "Feature",
                "id": "degenerate",
                "properties": {},
                "geometry": { "type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0]]] }
            },
            {
                "type": "Feature",
                "id": "weird",
                "properties": {},
                "geometry": { "type": "Blob", "coordinates": [] }
            },
            square_feature(&serde_json::json!("ok"), 0.0, 1.0)
        ]));

        let index = RegionIndex::from_geojson_str(&doc, RegionIndexOptions::default()).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.regions()[0].id, "ok");
    }

    #[test]
    fn numeric_ids_and_fips_padding() {
        let doc = collection(&serde_json::json!([square_feature(
            &serde_json::json!(1001),
            0.0,
            1.0
        )]));

        let plain = RegionIndex::from_geojson_str(&doc, RegionIndexOptions::default()).unwrap();
        assert_eq!(plain.regions()[0].id, "1001");

        let padded =
            RegionIndex::from_geojson_str(&doc, RegionIndexOptions { pad_fips: true }).unwrap();
        assert_eq!(padded.regions()[0].id, "01001");
    }

    #[test]
    fn holes_are_ignored() {
        let doc = collection(&serde_json::json!([{
            "type": "Feature",
            "id": "donut",
            "properties": {},
            "geometry": {
                "type": "Polygon",
                "coordinates": [
                    [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]],
                    [[4.0, 4.0], [6.0, 4.0], [6.0, 6.0], [4.0, 6.0], [4.0, 4.0]]
                ]
            }
        }]));

        let index = RegionIndex::from_geojson_str(&doc, RegionIndexOptions::default()).unwrap();
        let region = index.get("donut").unwrap();
        assert!(region.geometry.touches_point(5.0, 5.0, PointPolicy::Interior));
    }

    #[test]
    fn duplicate_ids_keep_first() {
        let doc = collection(&serde_json::json!([
            square_feature(&serde_json::json!("X"), 0.0, 1.0),
            square_feature(&serde_json::json!("X"), 5.0, 6.0)
        ]));

        let index = RegionIndex::from_geojson_str(&doc, RegionIndexOptions::default()).unwrap();
        assert_eq!(index.len(), 1);
        assert!(index.regions()[0].geometry.touches_point(
            0.5,
            0.5,
            PointPolicy::Inclusive
        ));
    }

    #[test]
    fn positions_near_uses_envelopes() {
        let doc = collection(&serde_json::json!([
            square_feature(&serde_json::json!("far"), 50.0, 51.0),
            square_feature(&serde_json::json!("near"), 0.0, 1.0),
            square_feature(&serde_json::json!("edge"), 2.0, 3.0)
        ]));

        let index = RegionIndex::from_geojson_str(&doc, RegionIndexOptions::default()).unwrap();
        assert_eq!(index.positions_near([0.5, 0.5], [2.0, 2.0]), vec![1, 2]);
    }

    #[test]
    fn rejects_non_collection() {
        assert!(matches!(
            RegionIndex::from_geojson_str("[1, 2]", RegionIndexOptions::default()),
            Err(RegionError::NotFeatureCollection { .. })
        ));
        assert!(matches!(
            RegionIndex::from_geojson_str("{", RegionIndexOptions::default()),
            Err(RegionError::Json(_))
        ));
    }
}
