//! Scroll-driven story map.
//!
//! Scrolling selects a step through [`ScrollStepMapper`]; each step change
//! reprojects the map, restyles the boundaries, swaps the marker options and
//! restarts the overlay animations. Markers come from the catalog entry whose
//! id matches the story.

use catalog::Dataset;
use foundation::RgbColor;
use foundation::math::ScreenPoint;
use foundation::time::Time;
use layers::{
    BoundaryLayer, BoundaryTheme, LabelLayoutConfig, LayerStyle, MarkerLayer, MarkerOptions,
    MarkerProfile, OverlayAnnotator, OverlayRequest, OverlaySample, PlacedLabel,
    ProjectedCountry, RegionKey, STORY_BACKGROUND, Tween, layout_labels,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use runtime::{EventBus, Frame};
use scene::{ProjectionState, ScalePolicy, Viewport};
use story::{
    NarrativeStep, ScrollState, ScrollStepMapper, StepChange, StepMapConfig, StepProgress, Story,
};
use streaming::{TopologySource, TopologyState};

use crate::config::EngineConfig;
use crate::events::EngineEvent;
use crate::map_view::{MapStatus, attach_topology_state, topology_event};

const BOUNDARY_LAYER_ID: u64 = 11;
const MARKER_LAYER_ID: u64 = 12;
const OVERLAY_LAYER_ID: u64 = 13;

/// Marker growth and glow fade after a step change.
const MARKER_APPEAR_S: f64 = 1.0;

/// A story marker sampled at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct StoryMarker {
    pub region: RegionKey,
    pub country: String,
    pub center: ScreenPoint,
    pub color: RgbColor,
    pub core_radius: f64,
    pub stroke_width: f64,
    pub glow_radius: f64,
    pub glow_opacity: f64,
}

#[derive(Debug)]
pub struct StoryFrame<'a> {
    pub background: RgbColor,
    pub step: &'a NarrativeStep,
    pub progress: StepProgress,
    pub countries: Vec<(&'a ProjectedCountry, LayerStyle)>,
    pub markers: Vec<StoryMarker>,
    /// Prevalence labels that survived collision culling.
    pub labels: Vec<PlacedLabel>,
    pub label_opacity: f64,
    pub overlays: Vec<OverlaySample>,
}

pub struct StoryView {
    mapper: ScrollStepMapper,
    viewport: Viewport,
    projection: ProjectionState,
    boundaries: BoundaryLayer,
    markers: MarkerLayer,
    markers_visible: bool,
    annotator: OverlayAnnotator<StdRng>,
    label_config: LabelLayoutConfig,
    step_started: Time,
    status: MapStatus,
    frame: Frame,
    events: EventBus<EngineEvent>,
}

impl StoryView {
    /// Mounts on the first step at `now`.
    pub fn new(config: &EngineConfig, story: Story, catalog: &Dataset, now: Time) -> Self {
        let viewport = config.story_viewport();
        let dataset = catalog
            .entry(&story.id)
            .and_then(|entry| Dataset::try_new(vec![entry.clone()]).ok())
            .unwrap_or_else(|| {
                tracing::warn!(story = %story.id, "no catalog entry for story; markers disabled");
                Dataset::empty()
            });
        let mapper = ScrollStepMapper::new(story, viewport);
        let initial = mapper.config();
        let projection = initial.as_ref().map(|c| c.projection).unwrap_or_else(|| {
            ProjectionState::for_viewport(viewport, ScalePolicy::Focus(None))
        });

        let mut label_config = LabelLayoutConfig::new(viewport);
        label_config.cell_px = config.label_cell_px;
        label_config.max_labels = config.max_labels;

        let mut view = Self {
            mapper,
            viewport,
            projection,
            boundaries: BoundaryLayer::new(BOUNDARY_LAYER_ID, BoundaryTheme::world()),
            markers: MarkerLayer::new(
                MARKER_LAYER_ID,
                MarkerOptions::new(MarkerProfile::story()),
                dataset,
                projection,
            ),
            markers_visible: false,
            annotator: OverlayAnnotator::new(
                OVERLAY_LAYER_ID,
                StdRng::seed_from_u64(config.overlay_seed),
            ),
            label_config,
            step_started: now,
            status: MapStatus::Loading,
            frame: Frame::first(),
            events: EventBus::new(),
        };
        if let Some(initial) = initial {
            view.apply(&initial, now);
        }
        tracing::info!(
            story = %view.mapper.story().id,
            steps = view.mapper.story().len(),
            "story mounted"
        );
        view
    }

    pub fn story(&self) -> &Story {
        self.mapper.story()
    }

    pub fn current(&self) -> usize {
        self.mapper.current()
    }

    pub fn progress(&self) -> StepProgress {
        self.mapper.progress()
    }

    pub fn projection(&self) -> &ProjectionState {
        &self.projection
    }

    pub fn boundaries(&self) -> &BoundaryLayer {
        &self.boundaries
    }

    pub fn markers(&self) -> Option<&MarkerLayer> {
        self.markers_visible.then_some(&self.markers)
    }

    pub fn annotator(&self) -> &OverlayAnnotator<StdRng> {
        &self.annotator
    }

    pub fn status(&self) -> MapStatus {
        self.status
    }

    pub fn attach_topology(&mut self, state: TopologyState) {
        let features = match &state {
            TopologyState::Ready(features) => Some(std::sync::Arc::clone(features)),
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

    pub async fn load_topology(&mut self, source: &TopologySource) -> MapStatus {
        let _ = source.load().await;
        self.attach_topology(source.state());
        self.status
    }

    /// Handles a scroll signal. Only a step change touches the map.
    pub fn scroll(&mut self, scroll: ScrollState, now: Time) -> Option<StepChange> {
        self.frame = self.frame.next();
        let change = self.mapper.on_scroll(scroll)?;
        self.apply(&change.config, now);
        self.emit(EngineEvent::StepChanged {
            from: change.from,
            to: change.to,
        });
        Some(change)
    }

    /// Reprojects the current step for a new surface size.
    pub fn resize(&mut self, viewport: Viewport, now: Time) {
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        self.label_config.viewport = viewport;
        if let Some(config) = self.mapper.resize(viewport) {
            self.apply(&config, now);
        }
    }

    pub fn events(&self) -> &EventBus<EngineEvent> {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<runtime::Event<EngineEvent>> {
        self.events.drain()
    }

    /// Samples the map at `now`. `None` until the topology is ready.
    pub fn frame(&self, now: Time) -> Option<StoryFrame<'_>> {
        if self.status != MapStatus::Ready {
            return None;
        }
        let step = self.mapper.current_step()?;
        let (markers, labels) = if self.markers_visible {
            let markers = self.sample_markers(now);
            let labels = if self.markers.options().prevalence_labels {
                layout_labels(self.markers.markers(), &self.markers.zoom(), self.label_config)
            } else {
                Vec::new()
            };
            (markers, labels)
        } else {
            (Vec::new(), Vec::new())
        };
        Some(StoryFrame {
            background: STORY_BACKGROUND,
            step,
            progress: self.mapper.progress(),
            countries: self.boundaries.styled(),
            markers,
            labels,
            label_opacity: self.annotator.label_opacity(now).unwrap_or(0.0),
            overlays: self.annotator.sample(now),
        })
    }

    /// True once every step-change animation has finished.
    pub fn is_settled(&self, now: Time) -> bool {
        let markers_done = !self.markers_visible
            || Tween::appear(self.step_started, 0.0, MARKER_APPEAR_S, 1.0).is_finished(now);
        markers_done && self.annotator.is_settled(now)
    }

    fn apply(&mut self, config: &StepMapConfig, now: Time) {
        self.projection = config.projection;
        self.boundaries
            .set_theme(BoundaryTheme::Story(config.boundary.clone()));
        self.boundaries.prepare(&self.projection);

        self.markers.set_projection(self.projection);
        self.markers_visible = match &config.markers {
            Some(options) => {
                self.markers.set_options(options.clone());
                true
            }
            None => false,
        };

        let request = OverlayRequest {
            directives: &config.overlays,
            highlighted: &config.boundary.highlighted,
            focus_center: self.projection.center,
            projection: &self.projection,
            viewport: self.viewport,
        };
        self.annotator.render(&request, now);
        self.step_started = now;
        tracing::debug!(
            step = config.index,
            scale = self.projection.scale,
            markers = self.markers_visible,
            overlays = self.annotator.effects().len(),
            "story step applied"
        );
    }

    fn sample_markers(&self, now: Time) -> Vec<StoryMarker> {
        self.markers
            .markers()
            .iter()
            .map(|m| {
                let glow_target = m.halos.first().map_or(0.0, |h| h.opacity);
                let core = Tween::appear(self.step_started, 0.0, MARKER_APPEAR_S, m.radius);
                let glow = Tween::appear(self.step_started, 0.0, MARKER_APPEAR_S, glow_target);
                StoryMarker {
                    region: m.region,
                    country: m.country.clone(),
                    center: m.screen_pos,
                    color: m.color,
                    core_radius: core.value_at(now),
                    stroke_width: m.stroke_width,
                    glow_radius: m.glow_radius,
                    glow_opacity: glow.value_at(now),
                }
            })
            .collect()
    }

    fn emit(&mut self, event: EngineEvent) {
        self.events.emit(self.frame, event.kind(), event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixture_features;
    use layers::{OverlayDirective, STORY_HIGHLIGHT, STORY_LAND_FILL, THREAT};
    use scene::STORY_DEFAULT_SCALE;
    use story::builtin_story;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn scroll(offset: f64) -> ScrollState {
        ScrollState::new(offset, 800.0).expect("valid scroll")
    }

    fn mounted(id: &str) -> StoryView {
        let story = builtin_story(id).expect("story");
        let config = EngineConfig::default();
        let mut view = StoryView::new(&config, story, &Dataset::builtin(), Time::ZERO);
        view.attach_topology(TopologyState::Ready(fixture_features()));
        view
    }

    fn style_of<'a>(frame: &'a StoryFrame<'_>, name: &str) -> &'a LayerStyle {
        frame
            .countries
            .iter()
            .find(|(c, _)| c.name == name)
            .map(|(_, s)| s)
            .expect("country styled")
    }

    #[test]
    fn mounts_on_the_intro_step() {
        let view = mounted("sickle-cell");
        assert_eq!(view.current(), 0);
        assert_eq!(view.projection().scale, STORY_DEFAULT_SCALE);
        assert!(view.markers().is_none());

        let frame = view.frame(Time::ZERO).expect("ready");
        assert_eq!(frame.background, STORY_BACKGROUND);
        assert_eq!(frame.progress.label(), "Step 1 of 6");
        for name in ["Nigeria", "Ghana"] {
            let style = style_of(&frame, name);
            assert_eq!(style.opacity, 0.7);
            assert_eq!(style.fill, STORY_LAND_FILL);
        }
        assert!(frame.overlays.is_empty());
    }

    #[test]
    fn nothing_is_drawn_before_topology() {
        let story = builtin_story("thalassemia").expect("story");
        let config = EngineConfig::default();
        let view = StoryView::new(&config, story, &Dataset::builtin(), Time::ZERO);
        assert_eq!(view.status(), MapStatus::Loading);
        assert!(view.frame(Time::ZERO).is_none());
    }

    #[test]
    fn threat_step_reprojects_and_highlights() {
        let mut view = mounted("sickle-cell");
        let t0 = Time(10.0);
        let change = view.scroll(scroll(850.0), t0).expect("step change");
        assert_eq!((change.from, change.to), (0, 1));
        assert_eq!(view.projection().scale, 400.0);
        assert!(view.projection().center.is_some());

        let frame = view.frame(t0.offset(3.0)).expect("ready");
        assert_eq!(style_of(&frame, "Nigeria").fill, THREAT);
        assert_eq!(style_of(&frame, "Nigeria").opacity, 1.0);
        let threats = frame
            .overlays
            .iter()
            .filter(|o| o.directive == OverlayDirective::ThreatZone)
            .count();
        assert!(threats > 0);
        assert_eq!(view.events().count_kind("story.step_changed"), 1);
    }

    #[test]
    fn same_step_scroll_is_ignored() {
        let mut view = mounted("sickle-cell");
        view.scroll(scroll(900.0), Time(1.0));
        let renders = view.annotator().render_count();
        let builds = view.boundaries().build_count();
        assert!(view.scroll(scroll(1200.0), Time(2.0)).is_none());
        assert_eq!(view.annotator().render_count(), renders);
        assert_eq!(view.boundaries().build_count(), builds);
    }

    #[test]
    fn markers_grow_in_after_a_step_change() {
        let mut view = mounted("sickle-cell");
        let t0 = Time(5.0);
        view.scroll(scroll(1650.0), t0).expect("mutation step");
        assert_eq!(view.current(), 2);

        let start = view.frame(t0).expect("ready");
        assert!(!start.markers.is_empty());
        assert!(
            start
                .markers
                .iter()
                .all(|m| m.core_radius == 0.0 && m.glow_opacity == 0.0)
        );

        let mid = view.frame(t0.offset(0.5)).expect("ready");
        assert!(mid.markers.iter().all(|m| m.core_radius > 0.0 && m.core_radius < 8.0));

        let done = view.frame(t0.offset(1.0)).expect("ready");
        for m in &done.markers {
            assert_close(m.core_radius, 8.0, 1e-12);
            assert_close(m.glow_opacity, 0.2, 1e-12);
            assert_eq!(m.color, RgbColor::rgb(0xef, 0x44, 0x44));
        }
        assert!(done.labels.is_empty());
        assert!(view.is_settled(t0.offset(1.0)));
        assert!(!view.is_settled(t0.offset(0.5)));
    }

    #[test]
    fn prevalence_step_places_labels_after_the_fade() {
        let mut view = mounted("sickle-cell");
        let t0 = Time(20.0);
        view.scroll(scroll(3300.0), t0);
        assert_eq!(view.current(), 4);

        let early = view.frame(t0.offset(0.25)).expect("ready");
        assert_eq!(early.label_opacity, 0.0);
        assert!(!early.labels.is_empty());

        let late = view.frame(t0.offset(2.0)).expect("ready");
        assert_close(late.label_opacity, 1.0, 1e-12);
        assert!(late.labels.iter().any(|l| l.text == "Nigeria: 24%"));
        let nigeria = late
            .markers
            .iter()
            .find(|m| m.country == "Nigeria")
            .expect("marker");
        assert_eq!(nigeria.glow_radius, 48.0);
    }

    #[test]
    fn scrolling_back_restores_the_earlier_step() {
        let mut view = mounted("thalassemia");
        view.scroll(scroll(1700.0), Time(1.0));
        let there = *view.projection();
        view.scroll(scroll(3300.0), Time(2.0));
        view.scroll(scroll(1700.0), Time(3.0));
        assert_eq!(*view.projection(), there);
        assert_eq!(view.current(), 2);
    }

    #[test]
    fn missing_catalog_entry_means_no_markers() {
        let story = builtin_story("sickle-cell").expect("story");
        let config = EngineConfig::default();
        let mut view = StoryView::new(&config, story, &Dataset::empty(), Time::ZERO);
        view.attach_topology(TopologyState::Ready(fixture_features()));
        view.scroll(scroll(1650.0), Time(1.0));
        let frame = view.frame(Time(3.0)).expect("ready");
        assert!(frame.markers.is_empty());
        assert_eq!(style_of(&frame, "Nigeria").fill, STORY_HIGHLIGHT);
    }

    #[test]
    fn seeded_views_replay_identically() {
        let a = {
            let mut v = mounted("sickle-cell");
            v.scroll(scroll(800.0), Time(1.0));
            v.frame(Time(4.0)).expect("ready").overlays
        };
        let b = {
            let mut v = mounted("sickle-cell");
            v.scroll(scroll(800.0), Time(1.0));
            v.frame(Time(4.0)).expect("ready").overlays
        };
        assert_eq!(a, b);
    }
}
