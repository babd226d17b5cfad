//! Scroll position to narrative step.
//!
//! The step index is a pure function of the scroll offset and the scroll
//! container height, and each step's map configuration is a pure function of
//! the step. Nothing depends on how the reader got to a step, so scrolling
//! back and forth can never leave stale state behind.

use std::collections::BTreeSet;

use layers::{HighlightStyle, MarkerOptions, MarkerProfile, OverlayDirective};
use scene::{ProjectionState, ScalePolicy, Viewport};

use crate::step::{NarrativeStep, ScrollState, Story};

/// `clamp(floor(offset / viewport_height), 0, step_count - 1)`. Zero steps
/// map to index 0.
pub fn map_offset_to_step(scroll: ScrollState, step_count: usize) -> usize {
    if step_count == 0 {
        return 0;
    }
    let raw = (scroll.offset / scroll.viewport_height).floor().max(0.0);
    // Float to int casts saturate, so huge offsets land on the last step.
    (raw as usize).min(step_count - 1)
}

/// Everything the story map needs to draw one step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepMapConfig {
    pub index: usize,
    pub projection: ProjectionState,
    pub boundary: HighlightStyle,
    pub overlays: BTreeSet<OverlayDirective>,
    /// `None` when the step hides the markers.
    pub markers: Option<MarkerOptions>,
}

impl StepMapConfig {
    pub fn derive(step: &NarrativeStep, index: usize, viewport: Viewport) -> Self {
        let markers = step.show_markers.then(|| {
            MarkerOptions::new(MarkerProfile::story())
                .with_prevalence_labels(step.has(OverlayDirective::PrevalenceLabels))
                .with_color(Some(step.marker_color()))
        });
        Self {
            index,
            projection: ProjectionState::for_viewport(viewport, ScalePolicy::Focus(step.focus)),
            boundary: HighlightStyle::new(
                step.highlighted_countries.clone(),
                step.has(OverlayDirective::ThreatZone),
            ),
            overlays: step.overlay_directives.clone(),
            markers,
        }
    }
}

/// Emitted when scrolling lands on a different step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepChange {
    pub from: usize,
    pub to: usize,
    pub config: StepMapConfig,
}

/// Step indicator state: "Step i of N", card emphasis and progress dots.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StepProgress {
    pub index: usize,
    pub count: usize,
}

impl StepProgress {
    pub fn label_for(&self, index: usize) -> String {
        format!("Step {} of {}", index + 1, self.count)
    }

    pub fn label(&self) -> String {
        self.label_for(self.index)
    }

    pub fn card_opacity(&self, index: usize) -> f64 {
        if index == self.index { 1.0 } else { 0.5 }
    }

    /// One entry per step; `true` marks the active dot.
    pub fn dots(&self) -> Vec<bool> {
        (0..self.count).map(|i| i == self.index).collect()
    }
}

#[derive(Debug, Clone)]
pub struct ScrollStepMapper {
    story: Story,
    viewport: Viewport,
    current: usize,
}

impl ScrollStepMapper {
    /// Starts on the first step.
    pub fn new(story: Story, viewport: Viewport) -> Self {
        Self {
            story,
            viewport,
            current: 0,
        }
    }

    pub fn story(&self) -> &Story {
        &self.story
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn current_step(&self) -> Option<&NarrativeStep> {
        self.story.step(self.current)
    }

    pub fn config(&self) -> Option<StepMapConfig> {
        self.config_for(self.current)
    }

    pub fn config_for(&self, index: usize) -> Option<StepMapConfig> {
        let step = self.story.step(index)?;
        Some(StepMapConfig::derive(step, index, self.viewport))
    }

    pub fn progress(&self) -> StepProgress {
        StepProgress {
            index: self.current,
            count: self.story.len(),
        }
    }

    /// Returns the change when the offset selects a different step.
    pub fn on_scroll(&mut self, scroll: ScrollState) -> Option<StepChange> {
        let next = map_offset_to_step(scroll, self.story.len());
        if next == self.current {
            return None;
        }
        let config = self.config_for(next)?;
        let from = std::mem::replace(&mut self.current, next);
        tracing::debug!(story = %self.story.id, from, to = next, "story step changed");
        Some(StepChange {
            from,
            to: next,
            config,
        })
    }

    /// The map surface changed size; the current step's projection follows.
    pub fn resize(&mut self, viewport: Viewport) -> Option<StepMapConfig> {
        self.viewport = viewport;
        self.config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stories::builtin_story;
    use foundation::RgbColor;
    use layers::{STORY_HIGHLIGHT, STORY_LAND_FILL, THREAT};
    use scene::STORY_DEFAULT_SCALE;

    fn scroll(offset: f64) -> ScrollState {
        ScrollState::new(offset, 800.0).expect("valid scroll")
    }

    fn story_viewport() -> Viewport {
        Viewport::new(1000.0, 600.0)
    }

    #[test]
    fn top_of_page_is_the_first_step() {
        for n in [1, 4, 6] {
            assert_eq!(map_offset_to_step(scroll(0.0), n), 0);
        }
        assert_eq!(map_offset_to_step(scroll(0.0), 0), 0);
    }

    #[test]
    fn mapping_is_monotonic_and_clamped() {
        let mut last = 0;
        for i in 0..200 {
            let o = i as f64 * 37.5;
            let step = map_offset_to_step(scroll(o), 6);
            assert!(step >= last, "offset {o} went back to {step}");
            assert!(step <= 5);
            last = step;
        }
        assert_eq!(map_offset_to_step(scroll(799.9), 6), 0);
        assert_eq!(map_offset_to_step(scroll(800.0), 6), 1);
        assert_eq!(map_offset_to_step(scroll(1e12), 6), 5);
        assert_eq!(map_offset_to_step(scroll(f64::MAX), 6), 5);
    }

    #[test]
    fn mapping_is_idempotent() {
        let s = scroll(2431.0);
        let first = map_offset_to_step(s, 5);
        for _ in 0..10 {
            assert_eq!(map_offset_to_step(s, 5), first);
        }
    }

    #[test]
    fn mapper_emits_only_on_change() {
        let story = builtin_story("sickle-cell").expect("story");
        let mut mapper = ScrollStepMapper::new(story, story_viewport());
        assert_eq!(mapper.current(), 0);
        assert_eq!(mapper.on_scroll(scroll(100.0)), None);

        let change = mapper.on_scroll(scroll(900.0)).expect("step change");
        assert_eq!((change.from, change.to), (0, 1));
        assert_eq!(change.config.projection.scale, 400.0);
        assert!(change.config.overlays.contains(&OverlayDirective::ThreatZone));
        assert_eq!(mapper.on_scroll(scroll(1000.0)), None);

        let back = mapper.on_scroll(scroll(0.0)).expect("back to intro");
        assert_eq!((back.from, back.to), (1, 0));
    }

    #[test]
    fn configuration_depends_only_on_the_index() {
        let story = builtin_story("thalassemia").expect("story");
        let mut a = ScrollStepMapper::new(story.clone(), story_viewport());
        let mut b = ScrollStepMapper::new(story, story_viewport());

        a.on_scroll(scroll(3200.0));
        b.on_scroll(scroll(800.0));
        b.on_scroll(scroll(2400.0));
        b.on_scroll(scroll(3300.0));
        assert_eq!(a.current(), b.current());
        assert_eq!(a.config(), b.config());
    }

    #[test]
    fn intro_uses_default_scale_and_uniform_boundaries() {
        let story = builtin_story("g6pd-deficiency").expect("story");
        let mapper = ScrollStepMapper::new(story, story_viewport());
        let config = mapper.config().expect("config");
        assert_eq!(config.projection.scale, STORY_DEFAULT_SCALE);
        assert_eq!(config.projection.center, None);
        assert!(config.markers.is_none());
        for country in ["Nigeria", "Greece", "India"] {
            let style = config.boundary.style_for(country);
            assert_eq!(style.opacity, 0.7);
            assert_eq!(style.fill, STORY_LAND_FILL);
        }
    }

    #[test]
    fn highlight_colour_follows_the_threat_directive() {
        let story = builtin_story("sickle-cell").expect("story");
        let mapper = ScrollStepMapper::new(story, story_viewport());

        let threat = mapper.config_for(1).expect("malaria belt");
        assert_eq!(threat.boundary.style_for("Nigeria").fill, THREAT);
        assert_eq!(threat.boundary.style_for("Peru").opacity, 0.3);

        let calm = mapper.config_for(2).expect("mutation emerges");
        assert_eq!(calm.boundary.style_for("Nigeria").fill, STORY_HIGHLIGHT);
        let markers = calm.markers.expect("markers shown");
        assert_eq!(markers.color_override, Some(RgbColor::rgb(0xef, 0x44, 0x44)));
        assert!(!markers.prevalence_labels);

        let labelled = mapper.config_for(4).expect("natural selection");
        assert!(labelled.markers.expect("markers").prevalence_labels);
    }

    #[test]
    fn progress_tracks_the_active_step() {
        let story = builtin_story("lactose-intolerance").expect("story");
        let mut mapper = ScrollStepMapper::new(story, story_viewport());
        mapper.on_scroll(scroll(1700.0));
        let p = mapper.progress();
        assert_eq!(p.label(), "Step 3 of 5");
        assert_eq!(p.label_for(0), "Step 1 of 5");
        assert_eq!(p.card_opacity(2), 1.0);
        assert_eq!(p.card_opacity(0), 0.5);
        assert_eq!(p.dots(), vec![false, false, true, false, false]);
    }

    #[test]
    fn resize_keeps_the_step_and_moves_the_projection() {
        let story = builtin_story("sickle-cell").expect("story");
        let mut mapper = ScrollStepMapper::new(story, story_viewport());
        mapper.on_scroll(scroll(1600.0));
        let config = mapper.resize(Viewport::new(500.0, 300.0)).expect("config");
        assert_eq!(config.index, 2);
        assert_eq!(config.projection.translate.x, 250.0);
        assert_eq!(config.projection.scale, 800.0);
    }
}
