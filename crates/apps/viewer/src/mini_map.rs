use catalog::{Dataset, DatasetEntry};
use foundation::RgbColor;
use layers::{
    BoundaryLayer, BoundaryTheme, LayerStyle, MAP_BACKGROUND, MarkerLayer, MarkerOptions,
    MarkerProfile, ProjectedCountry, RenderedMarker,
};
use scene::{ProjectionState, ScalePolicy};
use streaming::TopologyState;

use crate::config::EngineConfig;
use crate::map_view::{MapStatus, attach_topology_state};

pub const MINI_MAP_TITLE: &str = "Global Distribution";
const MINI_STROKE_WIDTH: f64 = 0.3;

const BOUNDARY_LAYER_ID: u64 = 21;
const MARKER_LAYER_ID: u64 = 22;

/// Static overview of one entry's regions on the detail page. No zoom, no
/// pointer handling.
pub struct MiniMap {
    projection: ProjectionState,
    boundaries: BoundaryLayer,
    markers: MarkerLayer,
    status: MapStatus,
}

#[derive(Debug)]
pub struct MiniMapFrame<'a> {
    pub title: &'static str,
    pub background: RgbColor,
    pub countries: Vec<(&'a ProjectedCountry, LayerStyle)>,
    pub markers: &'a [RenderedMarker],
}

impl MiniMap {
    pub fn new(config: &EngineConfig, entry: &DatasetEntry) -> Self {
        let projection = ProjectionState::for_viewport(
            config.mini_viewport(),
            ScalePolicy::Fixed(config.mini_scale),
        );
        let dataset = Dataset::try_new(vec![entry.clone()]).unwrap_or_default();
        Self {
            projection,
            boundaries: BoundaryLayer::new(
                BOUNDARY_LAYER_ID,
                BoundaryTheme::World {
                    stroke_width: MINI_STROKE_WIDTH,
                },
            ),
            markers: MarkerLayer::new(
                MARKER_LAYER_ID,
                MarkerOptions::new(MarkerProfile::mini_map()),
                dataset,
                projection,
            ),
            status: MapStatus::Loading,
        }
    }

    pub fn projection(&self) -> &ProjectionState {
        &self.projection
    }

    pub fn status(&self) -> MapStatus {
        self.status
    }

    pub fn attach_topology(&mut self, state: TopologyState) {
        self.status = attach_topology_state(state, &mut self.boundaries, &self.projection);
    }

    pub fn frame(&self) -> Option<MiniMapFrame<'_>> {
        (self.status == MapStatus::Ready).then(|| MiniMapFrame {
            title: MINI_MAP_TITLE,
            background: MAP_BACKGROUND,
            countries: self.boundaries.styled(),
            markers: self.markers.markers(),
        })
    }
}
