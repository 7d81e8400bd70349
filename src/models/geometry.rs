//! Boundary geometry carried through the merge, plus the derived envelope.

use geo::{BoundingRect, Coord, LineString, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// A GeoJSON position. Kept as a plain number array so 3D positions survive.
pub type Position = Vec<f64>;

/// Polygonal boundary in GeoJSON layout: `{"type": ..., "coordinates": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Polygon(Vec<Vec<Position>>),
    MultiPolygon(Vec<Vec<Vec<Position>>>),
}

impl Geometry {
    /// Accept a raw GeoJSON geometry value from an input document.
    ///
    /// `null`, non-polygonal types and malformed coordinates all yield `None`;
    /// geometry is advisory and never fails a merge.
    pub fn from_value(value: Value) -> Option<Self> {
        if value.is_null() {
            return None;
        }
        match serde_json::from_value::<Geometry>(value) {
            Ok(geometry) => Some(geometry),
            Err(e) => {
                debug!("Dropping unsupported geometry: {}", e);
                None
            }
        }
    }

    pub fn to_multi_polygon(&self) -> MultiPolygon<f64> {
        match self {
            Geometry::Polygon(rings) => MultiPolygon::new(to_polygon(rings).into_iter().collect()),
            Geometry::MultiPolygon(polygons) => {
                MultiPolygon::new(polygons.iter().filter_map(|p| to_polygon(p)).collect())
            }
        }
    }

    /// Envelope of the geometry, `None` when it has no usable coordinates.
    pub fn bbox(&self) -> Option<GeoBbox> {
        self.to_multi_polygon()
            .bounding_rect()
            .map(|rect| GeoBbox::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y))
    }
}

fn to_ring(positions: &[Position]) -> LineString<f64> {
    positions
        .iter()
        .filter(|p| p.len() >= 2)
        .map(|p| Coord { x: p[0], y: p[1] })
        .collect::<Vec<_>>()
        .into()
}

fn to_polygon(rings: &[Vec<Position>]) -> Option<Polygon<f64>> {
    let (exterior, interiors) = rings.split_first()?;
    let exterior = to_ring(exterior);
    if exterior.0.is_empty() {
        return None;
    }
    Some(Polygon::new(
        exterior,
        interiors.iter().map(|r| to_ring(r)).collect(),
    ))
}

/// Bounding box envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoBbox {
    #[serde(rename = "type")]
    pub geo_type: String,
    pub coordinates: [[f64; 2]; 2], // [[minLon, maxLat], [maxLon, minLat]]
}

impl GeoBbox {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            geo_type: "envelope".to_string(),
            coordinates: [[min_lon, max_lat], [max_lon, min_lat]],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_polygon_bbox() {
        let geometry = Geometry::from_value(json!({
            "type": "Polygon",
            "coordinates": [[[116.0, 39.0], [117.0, 39.0], [117.0, 41.0], [116.0, 39.0]]]
        }))
        .unwrap();

        let bbox = geometry.bbox().unwrap();
        assert_eq!(bbox.coordinates, [[116.0, 41.0], [117.0, 39.0]]);
    }

    #[test]
    fn test_multipolygon_keeps_third_dimension() {
        let value = json!({
            "type": "MultiPolygon",
            "coordinates": [[[[1.0, 1.0, 5.0], [2.0, 1.0, 5.0], [2.0, 2.0, 5.0], [1.0, 1.0, 5.0]]]]
        });
        let geometry = Geometry::from_value(value.clone()).unwrap();
        assert_eq!(serde_json::to_value(&geometry).unwrap(), value);
        assert!(geometry.bbox().is_some());
    }

    #[test]
    fn test_unsupported_geometry_dropped() {
        assert!(Geometry::from_value(Value::Null).is_none());
        assert!(Geometry::from_value(json!({"type": "Point", "coordinates": [1.0, 2.0]})).is_none());
        assert!(Geometry::from_value(json!({"type": "Polygon", "coordinates": "bogus"})).is_none());
    }

    #[test]
    fn test_empty_polygon_has_no_bbox() {
        let geometry = Geometry::Polygon(vec![]);
        assert!(geometry.bbox().is_none());
    }
}
