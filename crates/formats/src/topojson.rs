//! TopoJSON decoding.
//!
//! Arcs are shared polylines; geometries reference them by index, with `~i`
//! (negative) meaning arc `i` walked backwards. Quantized topologies carry a
//! `transform` and delta-encode each arc's positions.

use serde::Deserialize;
use serde_json::{Map, Value};

use foundation::GeoPoint;

use crate::geojson::{
    CountryFeature, FeatureCollection, Polygon, TopologyError, feature_id, feature_name, position,
};

/// Object holding country shapes in world-atlas style topologies.
pub const DEFAULT_OBJECT: &str = "countries";

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct QuantizeTransform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

#[derive(Debug, Deserialize)]
struct TopologyDoc {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    transform: Option<QuantizeTransform>,
    #[serde(default)]
    arcs: Vec<Vec<Vec<f64>>>,
    #[serde(default)]
    objects: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct GeometryDoc {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    arcs: Value,
    #[serde(default)]
    geometries: Vec<GeometryDoc>,
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

/// Decodes either a TopoJSON `Topology` (reading `object_name`) or a plain
/// GeoJSON `FeatureCollection`.
pub fn decode_topology_document(
    payload: &str,
    object_name: &str,
) -> Result<FeatureCollection, TopologyError> {
    let value: Value =
        serde_json::from_str(payload).map_err(|e| TopologyError::Json(e.to_string()))?;
    match value.get("type").and_then(|v| v.as_str()) {
        Some("Topology") => decode_topology(value, object_name),
        Some("FeatureCollection") => FeatureCollection::from_geojson_value(&value),
        other => Err(TopologyError::UnsupportedDocument(
            other.unwrap_or_default().to_string(),
        )),
    }
}

/// topojson-client `feature(topology, topology.objects[object_name])`.
pub fn decode_topology(
    value: Value,
    object_name: &str,
) -> Result<FeatureCollection, TopologyError> {
    let doc: TopologyDoc =
        serde_json::from_value(value).map_err(|e| TopologyError::Json(e.to_string()))?;
    if doc.kind != "Topology" {
        return Err(TopologyError::UnsupportedDocument(doc.kind));
    }

    let arcs = decode_arcs(&doc.arcs, doc.transform.as_ref())?;
    let object = doc
        .objects
        .get(object_name)
        .cloned()
        .ok_or_else(|| TopologyError::MissingObject(object_name.to_string()))?;
    let object: GeometryDoc = serde_json::from_value(object)
        .map_err(|e| TopologyError::Json(e.to_string()))?;

    let geometries = match object.kind.as_deref() {
        Some("GeometryCollection") => object.geometries,
        _ => vec![object],
    };

    let mut features = Vec::with_capacity(geometries.len());
    for (index, geometry) in geometries.iter().enumerate() {
        let polygons = geometry_polygons(geometry, &arcs)
            .map_err(|reason| TopologyError::InvalidFeature { index, reason })?;
        features.push(CountryFeature {
            id: feature_id(geometry.id.as_ref()),
            name: feature_name(geometry.properties.as_ref()),
            polygons,
        });
    }
    Ok(FeatureCollection { features })
}

fn decode_arcs(
    raw: &[Vec<Vec<f64>>],
    transform: Option<&QuantizeTransform>,
) -> Result<Vec<Vec<GeoPoint>>, TopologyError> {
    raw.iter()
        .enumerate()
        .map(|(index, arc)| {
            let (mut x, mut y) = (0.0, 0.0);
            arc.iter()
                .map(|pos| {
                    let &[px, py, ..] = pos.as_slice() else {
                        return Err(TopologyError::InvalidArc {
                            index,
                            reason: "position must be [x, y]".to_string(),
                        });
                    };
                    let (lon, lat) = match transform {
                        Some(t) => {
                            x += px;
                            y += py;
                            (x * t.scale[0] + t.translate[0], y * t.scale[1] + t.translate[1])
                        }
                        None => (px, py),
                    };
                    position(lon, lat).map_err(|reason| TopologyError::InvalidArc { index, reason })
                })
                .collect()
        })
        .collect()
}

fn geometry_polygons(
    geometry: &GeometryDoc,
    arcs: &[Vec<GeoPoint>],
) -> Result<Vec<Polygon>, String> {
    match geometry.kind.as_deref() {
        Some("Polygon") => {
            let rings: Vec<Vec<i64>> = arc_refs(&geometry.arcs)?;
            Ok(vec![polygon(&rings, arcs)?])
        }
        Some("MultiPolygon") => {
            let polys: Vec<Vec<Vec<i64>>> = arc_refs(&geometry.arcs)?;
            polys.iter().map(|rings| polygon(rings, arcs)).collect()
        }
        Some("GeometryCollection") => {
            let mut out = Vec::new();
            for g in &geometry.geometries {
                out.extend(geometry_polygons(g, arcs)?);
            }
            Ok(out)
        }
        _ => Ok(Vec::new()),
    }
}

fn arc_refs<T: serde::de::DeserializeOwned>(value: &Value) -> Result<T, String> {
    T::deserialize(value).map_err(|e| format!("bad arc references: {e}"))
}

fn polygon(rings: &[Vec<i64>], arcs: &[Vec<GeoPoint>]) -> Result<Polygon, String> {
    rings.iter().map(|r| ring(r, arcs)).collect()
}

fn ring(refs: &[i64], arcs: &[Vec<GeoPoint>]) -> Result<Vec<GeoPoint>, String> {
    let mut points: Vec<GeoPoint> = Vec::new();
    for &r in refs {
        // Consecutive arcs share their joining vertex.
        points.pop();
        let (index, reversed) = if r < 0 { (!r, true) } else { (r, false) };
        let arc = usize::try_from(index)
            .ok()
            .and_then(|i| arcs.get(i))
            .ok_or_else(|| format!("arc reference {r} out of range"))?;
        let start = points.len();
        points.extend_from_slice(arc);
        if reversed {
            points[start..].reverse();
        }
    }
    if let Some(&first) = points.first() {
        while points.len() < 4 {
            points.push(first);
        }
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(coords: &[(f64, f64)]) -> Vec<GeoPoint> {
        coords.iter().map(|&(x, y)| GeoPoint::new(x, y)).collect()
    }

    #[test]
    fn stitches_shared_arcs_into_one_ring() {
        let payload = r#"{
            "type": "Topology",
            "arcs": [
                [[0, 0], [10, 0], [10, 10]],
                [[10, 10], [0, 10], [0, 0]]
            ],
            "objects": {
                "countries": {
                    "type": "GeometryCollection",
                    "geometries": [
                        { "type": "Polygon", "id": "1", "arcs": [[0, 1]], "properties": { "name": "Square" } },
                        { "type": "Polygon", "arcs": [[-2, -1]], "properties": { "name": "Backwards" } }
                    ]
                }
            }
        }"#;
        let fc = decode_topology_document(payload, DEFAULT_OBJECT).expect("decode");
        assert_eq!(fc.len(), 2);

        let square = fc.feature("Square").expect("square");
        assert_eq!(square.id.as_deref(), Some("1"));
        assert_eq!(
            square.polygons,
            vec![vec![pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)])]]
        );

        let backwards = fc.feature("Backwards").expect("backwards");
        assert_eq!(
            backwards.polygons,
            vec![vec![pts(&[(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0), (0.0, 0.0)])]]
        );
    }

    #[test]
    fn quantized_arcs_are_delta_decoded_per_arc() {
        let payload = r#"{
            "type": "Topology",
            "transform": { "scale": [0.5, 0.5], "translate": [-10, 5] },
            "arcs": [
                [[0, 0], [20, 0], [0, 20], [-20, -20]],
                [[4, 4], [2, 0]]
            ],
            "objects": {
                "land": { "type": "MultiPolygon", "arcs": [[[0]]], "properties": { "name": "Tri" } }
            }
        }"#;
        let fc = decode_topology_document(payload, "land").expect("decode");
        assert_eq!(
            fc.features[0].polygons[0][0],
            pts(&[(-10.0, 5.0), (0.0, 5.0), (0.0, 15.0), (-10.0, 5.0)])
        );
    }

    #[test]
    fn degenerate_ring_is_padded() {
        let got = ring(&[0], &[pts(&[(1.0, 1.0), (2.0, 2.0)])]).expect("ring");
        assert_eq!(got, pts(&[(1.0, 1.0), (2.0, 2.0), (1.0, 1.0), (1.0, 1.0)]));
    }

    #[test]
    fn feature_collections_pass_through() {
        let payload = r#"{ "type": "FeatureCollection", "features": [] }"#;
        assert!(decode_topology_document(payload, DEFAULT_OBJECT)
            .expect("decode")
            .is_empty());
    }

    #[test]
    fn reports_missing_object_and_bad_references() {
        let payload = r#"{ "type": "Topology", "arcs": [], "objects": {} }"#;
        assert_eq!(
            decode_topology_document(payload, DEFAULT_OBJECT).unwrap_err(),
            TopologyError::MissingObject("countries".into())
        );

        let payload = r#"{ "type": "Topology", "arcs": [],
            "objects": { "countries": { "type": "Polygon", "arcs": [[3]] } } }"#;
        assert!(matches!(
            decode_topology_document(payload, DEFAULT_OBJECT).unwrap_err(),
            TopologyError::InvalidFeature { index: 0, .. }
        ));

        assert!(matches!(
            decode_topology_document(r#"{ "type": "Point" }"#, DEFAULT_OBJECT).unwrap_err(),
            TopologyError::UnsupportedDocument(_)
        ));
    }
}
