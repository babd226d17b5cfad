use std::sync::Arc;

use formats::FeatureCollection;
use scene::{ProjectionState, ScalePolicy, Viewport};

/// Coarse West African outlines, enough for hover and picking.
pub const FIXTURE_GEOJSON: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {"type": "Feature", "id": "566", "properties": {"name": "Nigeria"},
         "geometry": {"type": "Polygon", "coordinates": [[
            [2.7, 6.3], [8.5, 4.3], [14.6, 10.0], [13.6, 13.7], [4.1, 13.5], [2.7, 6.3]
         ]]}},
        {"type": "Feature", "id": "288", "properties": {"name": "Ghana"},
         "geometry": {"type": "Polygon", "coordinates": [[
            [-3.25, 4.7], [1.2, 6.1], [0.0, 11.1], [-2.9, 11.0], [-3.25, 4.7]
         ]]}}
    ]
}"#;

pub fn fixture_collection() -> FeatureCollection {
    FeatureCollection::from_geojson_str(FIXTURE_GEOJSON).expect("fixture parses")
}

pub fn fixture_features() -> Arc<FeatureCollection> {
    Arc::new(fixture_collection())
}

pub fn world_projection() -> ProjectionState {
    ProjectionState::for_viewport(Viewport::new(800.0, 600.0), ScalePolicy::FitViewport)
}
