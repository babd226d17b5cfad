//! The interactive world map.
//!
//! Owns the zoom controller, the marker layer (registered as the controller's
//! listener), the boundary layer and the pointer router. Boundaries are built
//! once per projection; zoom and pan only move the group transform and
//! recompute the markers.

use std::sync::Arc;

use catalog::{Dataset, DatasetFilter, StaticGeoLookup};
use foundation::RgbColor;
use formats::FeatureCollection;
use layers::{
    BoundaryLayer, BoundaryTheme, LayerStyle, MAP_BACKGROUND, MarkerLayer, MarkerOptions,
    ProjectedCountry, RenderedMarker,
};
use runtime::{EventBus, Frame};
use scene::{Gesture, ProjectionState, ScalePolicy, TransformController, Viewport, ZoomTransform};
use streaming::{TopologySource, TopologyState};

use crate::config::EngineConfig;
use crate::events::{EngineEvent, Tooltip};
use crate::interaction::{InteractionRouter, PointerEvent};

pub const MAP_INSTRUCTIONS: &str =
    "Scroll to zoom • Click and drag to pan • Click labels for details";
pub const LOADING_MESSAGE: &str = "Loading world map...";

const BOUNDARY_LAYER_ID: u64 = 1;
const MARKER_LAYER_ID: u64 = 2;

/// Where the boundary topology stands for a view.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MapStatus {
    Loading,
    Ready,
    /// The fetch failed. Terminal for the session.
    Unavailable,
}

/// Feeds a topology outcome into a boundary layer and reports the status.
pub(crate) fn attach_topology_state(
    state: TopologyState,
    boundaries: &mut BoundaryLayer,
    projection: &ProjectionState,
) -> MapStatus {
    match state {
        TopologyState::Loading => MapStatus::Loading,
        TopologyState::Ready(features) => {
            boundaries.set_features(features);
            boundaries.prepare(projection);
            MapStatus::Ready
        }
        TopologyState::Unavailable => MapStatus::Unavailable,
    }
}

pub(crate) fn topology_event(
    status: MapStatus,
    features: Option<&FeatureCollection>,
) -> Option<EngineEvent> {
    match status {
        MapStatus::Loading => None,
        MapStatus::Ready => Some(EngineEvent::TopologyReady {
            countries: features.map_or(0, FeatureCollection::len),
        }),
        MapStatus::Unavailable => Some(EngineEvent::TopologyUnavailable),
    }
}

/// One legend row: an entry, its colour and whether it is on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendRow {
    pub id: String,
    pub name: String,
    pub color: RgbColor,
    pub regions: usize,
    pub visible: bool,
}

/// What the host draws for the current frame.
#[derive(Debug)]
pub enum MapScene<'a> {
    Loading { message: &'static str },
    /// Nothing to draw; the topology could not be loaded.
    Unavailable,
    Ready(MapFrame<'a>),
}

#[derive(Debug)]
pub struct MapFrame<'a> {
    pub background: RgbColor,
    /// Group transform applied to countries and markers alike.
    pub zoom: ZoomTransform,
    pub countries: Vec<(&'a ProjectedCountry, LayerStyle)>,
    pub markers: &'a [RenderedMarker],
    pub tooltip: Option<&'a Tooltip>,
    pub instructions: &'static str,
}

pub struct WorldMapView {
    viewport: Viewport,
    projection: ProjectionState,
    controller: TransformController,
    markers: MarkerLayer,
    boundaries: BoundaryLayer,
    router: InteractionRouter,
    status: MapStatus,
    catalog: Dataset,
    lookup: StaticGeoLookup,
    filter: DatasetFilter,
    frame: Frame,
    events: EventBus<EngineEvent>,
}

impl WorldMapView {
    pub fn new(config: &EngineConfig, catalog: Dataset) -> Self {
        let viewport = config.map_viewport();
        let projection = ProjectionState::for_viewport(viewport, ScalePolicy::FitViewport);
        let lookup = StaticGeoLookup::builtin().with_dataset_locations(&catalog);
        let markers = MarkerLayer::new(
            MARKER_LAYER_ID,
            MarkerOptions::default(),
            catalog.clone(),
            projection,
        );
        tracing::info!(
            entries = catalog.len(),
            regions = catalog.region_count(),
            width = viewport.width,
            height = viewport.height,
            "world map mounted"
        );
        Self {
            viewport,
            projection,
            controller: TransformController::new(viewport, config.zoom_config()),
            markers,
            boundaries: BoundaryLayer::new(
                BOUNDARY_LAYER_ID,
                BoundaryTheme::World {
                    stroke_width: config.boundary_stroke_width,
                },
            ),
            router: InteractionRouter::new(),
            status: MapStatus::Loading,
            catalog,
            lookup,
            filter: DatasetFilter::default(),
            frame: Frame::first(),
            events: EventBus::new(),
        }
    }

    pub fn status(&self) -> MapStatus {
        self.status
    }

    pub fn attach_topology(&mut self, state: TopologyState) {
        let features = match &state {
            TopologyState::Ready(features) => Some(Arc::clone(features)),
            _ => None,
        };
        let status = attach_topology_state(state, &mut self.boundaries, &self.projection);
        if status == self.status {
            return;
        }
        self.status = status;
        if let Some(event) = topology_event(status, features.as_deref()) {
            self.emit(event);
        }
    }

    /// Awaits the shared topology fetch and attaches the outcome.
    pub async fn load_topology(&mut self, source: &TopologySource) -> MapStatus {
        // The outcome is cached in the source; `state()` reads it back.
        let _ = source.load().await;
        self.attach_topology(source.state());
        self.status
    }

    pub fn projection(&self) -> &ProjectionState {
        &self.projection
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn transform(&self) -> ZoomTransform {
        self.controller.transform()
    }

    pub fn markers(&self) -> &MarkerLayer {
        &self.markers
    }

    pub fn boundaries(&self) -> &BoundaryLayer {
        &self.boundaries
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.router.tooltip()
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    /// Advances to the next animation frame.
    pub fn tick(&mut self) -> Frame {
        self.frame = self.frame.next();
        self.frame
    }

    pub fn gesture(&mut self, gesture: Gesture) -> ZoomTransform {
        let before = self.controller.transform();
        let after = self
            .controller
            .apply_gesture(gesture, self.frame, &mut self.markers);
        if after != before {
            self.emit(EngineEvent::Zoom(after));
        }
        after
    }

    pub fn reset_zoom(&mut self) -> ZoomTransform {
        let before = self.controller.transform();
        let after = self.controller.reset(self.frame, &mut self.markers);
        if after != before {
            self.emit(EngineEvent::Zoom(after));
        }
        after
    }

    /// New surface size: fresh projection, boundary rebuild, marker
    /// recompute, and the pan constraint re-applied.
    pub fn resize(&mut self, viewport: Viewport) {
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        self.projection = ProjectionState::for_viewport(viewport, ScalePolicy::FitViewport);
        self.boundaries.prepare(&self.projection);
        self.markers.set_projection(self.projection);
        let before = self.controller.transform();
        let after = self
            .controller
            .resize(viewport, self.frame, &mut self.markers);
        if after != before {
            self.emit(EngineEvent::Zoom(after));
        }
    }

    pub fn filter(&self) -> &DatasetFilter {
        &self.filter
    }

    /// Replaces the filter and swaps in the reduced snapshot.
    pub fn set_filter(&mut self, filter: DatasetFilter) {
        self.filter = filter;
        let visible = self.filter.apply(&self.catalog, &self.lookup);
        tracing::debug!(
            entries = visible.len(),
            regions = visible.region_count(),
            "dataset filter applied"
        );
        let label_hovered = self.markers.label_hovered();
        self.markers.set_dataset(visible);
        for event in self.router.release_stale_hover(&self.markers) {
            self.emit(event);
        }
        if label_hovered.is_some() && self.markers.label_hovered().is_none() {
            self.emit(EngineEvent::LabelHover(None));
        }
    }

    /// Legend click: shows or hides one entry.
    pub fn toggle_entry(&mut self, id: &str) {
        let mut ids = self.filter.entry_ids.clone().unwrap_or_else(|| {
            self.catalog
                .entries()
                .iter()
                .map(|e| e.id.clone())
                .collect()
        });
        if !ids.remove(id) {
            ids.insert(id.to_string());
        }
        let mut filter = self.filter.clone();
        filter.entry_ids = Some(ids);
        self.set_filter(filter);
    }

    pub fn legend(&self) -> Vec<LegendRow> {
        self.catalog
            .entries()
            .iter()
            .map(|e| LegendRow {
                id: e.id.clone(),
                name: e.name.clone(),
                color: e.color,
                regions: e.regions.len(),
                visible: self
                    .filter
                    .entry_ids
                    .as_ref()
                    .is_none_or(|ids| ids.contains(&e.id)),
            })
            .collect()
    }

    /// Routes a pointer event. Ignored until the map is drawn.
    pub fn pointer(&mut self, event: PointerEvent) -> Vec<EngineEvent> {
        if self.status != MapStatus::Ready {
            return Vec::new();
        }
        let out = self
            .router
            .dispatch(event, &mut self.markers, &mut self.boundaries);
        for e in &out {
            self.emit(e.clone());
        }
        out
    }

    pub fn events(&self) -> &EventBus<EngineEvent> {
        &self.events
    }

    /// Drains the view's events. Zoom changes are already mirrored there as
    /// [`EngineEvent::Zoom`], so the controller's own record is discarded.
    pub fn drain_events(&mut self) -> Vec<runtime::Event<EngineEvent>> {
        self.controller.drain_events();
        self.events.drain()
    }

    pub fn scene(&self) -> MapScene<'_> {
        match self.status {
            MapStatus::Loading => MapScene::Loading {
                message: LOADING_MESSAGE,
            },
            MapStatus::Unavailable => MapScene::Unavailable,
            MapStatus::Ready => MapScene::Ready(MapFrame {
                background: MAP_BACKGROUND,
                zoom: self.controller.transform(),
                countries: self.boundaries.styled(),
                markers: self.markers.markers(),
                tooltip: self.router.tooltip(),
                instructions: MAP_INSTRUCTIONS,
            }),
        }
    }

    fn emit(&mut self, event: EngineEvent) {
        self.events.emit(self.frame, event.kind(), event);
    }
}
