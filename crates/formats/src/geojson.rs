use foundation::math::Vec2;
use foundation::{Aabb2, GeoPoint};
use serde_json::{Map, Value};

/// One polygon: outer ring first, then holes. Rings are closed.
pub type Polygon = Vec<Vec<GeoPoint>>;

/// A named country shape. Non-polygonal geometries decode to no polygons.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryFeature {
    pub id: Option<String>,
    pub name: String,
    pub polygons: Vec<Polygon>,
}

impl CountryFeature {
    /// Lon/lat bounds over every ring.
    pub fn bounds(&self) -> Aabb2 {
        let mut b = Aabb2::empty();
        for p in self.polygons.iter().flatten().flatten() {
            b.include(Vec2::new(p.longitude, p.latitude));
        }
        b
    }

    pub fn vertex_count(&self) -> usize {
        self.polygons.iter().flatten().map(Vec::len).sum()
    }
}

/// Decoded boundary topology, in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureCollection {
    pub features: Vec<CountryFeature>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TopologyError {
    Json(String),
    UnsupportedDocument(String),
    MissingObject(String),
    InvalidArc { index: usize, reason: String },
    InvalidFeature { index: usize, reason: String },
}

impl std::fmt::Display for TopologyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TopologyError::Json(msg) => write!(f, "topology JSON parse error: {msg}"),
            TopologyError::UnsupportedDocument(ty) => {
                write!(f, "expected Topology or FeatureCollection, got {ty:?}")
            }
            TopologyError::MissingObject(name) => write!(f, "topology has no object {name:?}"),
            TopologyError::InvalidArc { index, reason } => {
                write!(f, "invalid arc at index {index}: {reason}")
            }
            TopologyError::InvalidFeature { index, reason } => {
                write!(f, "invalid feature at index {index}: {reason}")
            }
        }
    }
}

impl std::error::Error for TopologyError {}

impl FeatureCollection {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn feature(&self, name: &str) -> Option<&CountryFeature> {
        self.features.iter().find(|f| f.name == name)
    }

    pub fn from_geojson_str(payload: &str) -> Result<Self, TopologyError> {
        let value: Value =
            serde_json::from_str(payload).map_err(|e| TopologyError::Json(e.to_string()))?;
        Self::from_geojson_value(&value)
    }

    pub fn from_geojson_value(value: &Value) -> Result<Self, TopologyError> {
        let obj = value
            .as_object()
            .ok_or_else(|| TopologyError::UnsupportedDocument("non-object".to_string()))?;
        let ty = obj.get("type").and_then(|v| v.as_str()).unwrap_or("");
        if ty != "FeatureCollection" {
            return Err(TopologyError::UnsupportedDocument(ty.to_string()));
        }

        let features_val = obj
            .get("features")
            .and_then(|v| v.as_array())
            .ok_or_else(|| TopologyError::InvalidFeature {
                index: 0,
                reason: "features must be an array".to_string(),
            })?;

        let mut features = Vec::with_capacity(features_val.len());
        for (index, feat_val) in features_val.iter().enumerate() {
            let feat_obj = feat_val
                .as_object()
                .ok_or_else(|| TopologyError::InvalidFeature {
                    index,
                    reason: "feature must be an object".to_string(),
                })?;

            let polygons = match feat_obj.get("geometry") {
                None | Some(Value::Null) => Vec::new(),
                Some(geometry) => parse_polygonal(geometry)
                    .map_err(|reason| TopologyError::InvalidFeature { index, reason })?,
            };

            features.push(CountryFeature {
                id: feature_id(feat_obj.get("id")),
                name: feature_name(feat_obj.get("properties").and_then(|v| v.as_object())),
                polygons,
            });
        }

        Ok(Self { features })
    }
}

pub(crate) fn feature_id(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn feature_name(properties: Option<&Map<String, Value>>) -> String {
    properties
        .and_then(|p| p.get("name"))
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

/// Accepts a position, tolerating float noise just past the valid range
/// (quantized topologies land on 180.0000000001).
pub(crate) fn position(lon: f64, lat: f64) -> Result<GeoPoint, String> {
    const SLACK: f64 = 1e-6;
    let snap = |v: f64, limit: f64| {
        if v.abs() > limit && v.abs() <= limit + SLACK {
            limit.copysign(v)
        } else {
            v
        }
    };
    GeoPoint::try_new(snap(lon, 180.0), snap(lat, 90.0)).map_err(|e| e.to_string())
}

fn parse_polygonal(value: &Value) -> Result<Vec<Polygon>, String> {
    let obj = value
        .as_object()
        .ok_or("geometry must be an object".to_string())?;
    let ty = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("geometry missing type".to_string())?;

    match ty {
        "Polygon" => Ok(vec![parse_polygon(coordinates(obj)?)?]),
        "MultiPolygon" => {
            let polys = coordinates(obj)?
                .as_array()
                .ok_or("MultiPolygon coordinates must be an array of polygons".to_string())?;
            polys.iter().map(parse_polygon).collect()
        }
        "GeometryCollection" => {
            let geometries = obj
                .get("geometries")
                .and_then(|v| v.as_array())
                .ok_or("GeometryCollection missing geometries".to_string())?;
            let mut out = Vec::new();
            for g in geometries {
                out.extend(parse_polygonal(g)?);
            }
            Ok(out)
        }
        _ => Ok(Vec::new()),
    }
}

fn coordinates(obj: &Map<String, Value>) -> Result<&Value, String> {
    obj.get("coordinates")
        .ok_or("geometry missing coordinates".to_string())
}

fn parse_polygon(coords: &Value) -> Result<Polygon, String> {
    let rings = coords
        .as_array()
        .ok_or("Polygon coordinates must be an array of rings".to_string())?;
    rings.iter().map(parse_ring).collect()
}

fn parse_ring(coords: &Value) -> Result<Vec<GeoPoint>, String> {
    let arr = coords
        .as_array()
        .ok_or("ring must be an array of positions".to_string())?;
    let mut out = Vec::with_capacity(arr.len());
    for item in arr {
        let pos = item
            .as_array()
            .filter(|p| p.len() >= 2)
            .ok_or("position must be [lon, lat]".to_string())?;
        let lon = pos[0].as_f64().ok_or("lon must be a number".to_string())?;
        let lat = pos[1].as_f64().ok_or("lat must be a number".to_string())?;
        out.push(position(lon, lat)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "id": 566,
                "properties": { "name": "Nigeria" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[3, 4], [14, 4], [14, 14], [3, 14], [3, 4]]]
                }
            },
            {
                "type": "Feature",
                "properties": { "name": "Islands" },
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[0, 0], [1, 0], [1, 1], [0, 0]]],
                        [[[5, 5], [6, 5], [6, 6], [5, 5]]]
                    ]
                }
            },
            {
                "type": "Feature",
                "properties": { "name": "Nowhere" },
                "geometry": null
            }
        ]
    }"#;

    #[test]
    fn parses_country_polygons() {
        let fc = FeatureCollection::from_geojson_str(SQUARE).expect("parse");
        assert_eq!(fc.len(), 3);

        let nigeria = fc.feature("Nigeria").expect("nigeria");
        assert_eq!(nigeria.id.as_deref(), Some("566"));
        assert_eq!(nigeria.polygons.len(), 1);
        assert_eq!(nigeria.vertex_count(), 5);
        let b = nigeria.bounds();
        assert_eq!(b.min, [3.0, 4.0]);
        assert_eq!(b.max, [14.0, 14.0]);

        assert_eq!(fc.feature("Islands").expect("islands").polygons.len(), 2);
        assert!(fc.feature("Nowhere").expect("null geometry").polygons.is_empty());
    }

    #[test]
    fn rejects_other_documents() {
        let err = FeatureCollection::from_geojson_str(r#"{"type":"Topology"}"#).unwrap_err();
        assert_eq!(err, TopologyError::UnsupportedDocument("Topology".into()));
    }

    #[test]
    fn out_of_range_position_is_an_error() {
        let payload = SQUARE.replace("[14, 14]", "[14, 140]");
        let err = FeatureCollection::from_geojson_str(&payload).unwrap_err();
        assert!(matches!(err, TopologyError::InvalidFeature { index: 0, .. }));
    }

    #[test]
    fn snaps_float_noise_at_the_antimeridian() {
        let p = position(180.000_000_000_1, -90.000_000_01).expect("snapped");
        assert_eq!(p, GeoPoint::new(180.0, -90.0));
        assert!(position(180.1, 0.0).is_err());
    }
}
