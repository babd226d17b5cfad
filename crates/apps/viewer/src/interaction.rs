//! Pointer dispatch for the world map.
//!
//! One router hit-tests every pointer event against the current marker
//! geometry and boundary mesh and turns the outcome into [`EngineEvent`]s.
//! Marker hover, label hover and country hover are tracked independently, so
//! a country stays highlighted while a marker on top of it is hovered.

use foundation::math::{ScreenPoint, Vec2};
use layers::{BoundaryLayer, MarkerLayer, RegionKey};

use crate::events::{EngineEvent, NavigationRequest, Tooltip};

pub const TOOLTIP_OFFSET: Vec2 = Vec2::new(10.0, 10.0);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PointerKind {
    Move,
    Leave,
    Click,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    /// Position on the map surface.
    pub local: ScreenPoint,
    /// Position on the page, for tooltip placement.
    pub page: Vec2,
}

impl PointerEvent {
    pub fn moved(local: ScreenPoint, page: Vec2) -> Self {
        Self {
            kind: PointerKind::Move,
            local,
            page,
        }
    }

    pub fn clicked(local: ScreenPoint, page: Vec2) -> Self {
        Self {
            kind: PointerKind::Click,
            local,
            page,
        }
    }

    pub fn left() -> Self {
        Self {
            kind: PointerKind::Leave,
            local: Vec2::ZERO,
            page: Vec2::ZERO,
        }
    }
}

#[derive(Debug, Default)]
pub struct InteractionRouter {
    tooltip: Option<Tooltip>,
}

impl InteractionRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    /// Drops a tooltip whose marker vanished with a dataset swap.
    pub fn release_stale_hover(&mut self, markers: &MarkerLayer) -> Vec<EngineEvent> {
        if markers.hovered().is_some() || self.tooltip.take().is_none() {
            return Vec::new();
        }
        vec![EngineEvent::MarkerHover(None), EngineEvent::Tooltip(None)]
    }

    pub fn dispatch(
        &mut self,
        event: PointerEvent,
        markers: &mut MarkerLayer,
        boundaries: &mut BoundaryLayer,
    ) -> Vec<EngineEvent> {
        let mut out = Vec::new();
        match event.kind {
            PointerKind::Move => {
                let marker = markers.hit_test(event.local).map(|m| m.region);
                let label = markers.label_hit_test(event.local).map(|m| m.region);
                let map_point = markers.zoom().invert(event.local);
                let country = boundaries.pick(map_point);
                self.hover_marker(marker, event.page, markers, &mut out);
                if markers.set_label_hovered(label) {
                    out.push(EngineEvent::LabelHover(label));
                }
                hover_country(country, boundaries, &mut out);
            }
            PointerKind::Leave => {
                self.hover_marker(None, event.page, markers, &mut out);
                if markers.set_label_hovered(None) {
                    out.push(EngineEvent::LabelHover(None));
                }
                hover_country(None, boundaries, &mut out);
            }
            PointerKind::Click => {
                let key = markers
                    .hit_test(event.local)
                    .or_else(|| markers.label_hit_test(event.local))
                    .map(|m| m.region);
                if let Some(request) = key.and_then(|k| navigation_request(markers, k)) {
                    tracing::info!(
                        entry = %request.entry.id,
                        country = %request.region.country,
                        "region selected"
                    );
                    out.push(EngineEvent::Navigate(request));
                }
            }
        }
        out
    }

    fn hover_marker(
        &mut self,
        key: Option<RegionKey>,
        page: Vec2,
        markers: &mut MarkerLayer,
        out: &mut Vec<EngineEvent>,
    ) {
        let stale = key.is_none() && self.tooltip.is_some();
        if !markers.set_hovered(key) && !stale {
            return;
        }
        out.push(EngineEvent::MarkerHover(key));
        self.tooltip = key.and_then(|k| {
            let request = navigation_request(markers, k)?;
            Some(Tooltip {
                text: format!(
                    "{} - {}: {}",
                    request.entry.name, request.region.country, request.region.population
                ),
                position: page + TOOLTIP_OFFSET,
            })
        });
        out.push(EngineEvent::Tooltip(self.tooltip.clone()));
    }
}

fn hover_country(index: Option<usize>, boundaries: &mut BoundaryLayer, out: &mut Vec<EngineEvent>) {
    if boundaries.set_hovered(index) {
        let name = boundaries.hovered().map(|c| c.name.clone());
        out.push(EngineEvent::CountryHover(name));
    }
}

fn navigation_request(markers: &MarkerLayer, key: RegionKey) -> Option<NavigationRequest> {
    let entry = markers.dataset().entries().get(key.entry_index)?;
    let region = entry.regions.get(key.region_index)?;
    Some(NavigationRequest {
        entry: entry.clone(),
        region: region.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fixture_features, world_projection};
    use catalog::Dataset;
    use layers::{BoundaryTheme, LAND_FILL, LAND_HOVER_FILL, MarkerOptions};
    use scene::ZoomTransform;

    struct Harness {
        router: InteractionRouter,
        markers: MarkerLayer,
        boundaries: BoundaryLayer,
    }

    impl Harness {
        fn new() -> Self {
            let projection = world_projection();
            let sickle = Dataset::builtin()
                .entry("sickle-cell")
                .cloned()
                .expect("seed entry");
            let dataset = Dataset::try_new(vec![sickle]).expect("dataset");
            let markers = MarkerLayer::new(1, MarkerOptions::default(), dataset, projection);
            let mut boundaries = BoundaryLayer::new(2, BoundaryTheme::world());
            boundaries.set_features(fixture_features());
            boundaries.prepare(&projection);
            Self {
                router: InteractionRouter::new(),
                markers,
                boundaries,
            }
        }

        fn send(&mut self, event: PointerEvent) -> Vec<EngineEvent> {
            self.router
                .dispatch(event, &mut self.markers, &mut self.boundaries)
        }

        fn nigeria(&self) -> ScreenPoint {
            self.markers
                .markers()
                .iter()
                .find(|m| m.country == "Nigeria")
                .map(|m| m.screen_pos)
                .expect("Nigeria marker")
        }
    }

    #[test]
    fn hovering_a_marker_shows_the_tooltip() {
        let mut h = Harness::new();
        let at = h.nigeria();
        let events = h.send(PointerEvent::moved(at, Vec2::new(500.0, 320.0)));

        let tooltip = h.router.tooltip().expect("tooltip shown");
        assert_eq!(tooltip.text, "Sickle Cell Disease - Nigeria: 2-3% carrier rate");
        assert_eq!(tooltip.position, Vec2::new(510.0, 330.0));
        assert!(events.contains(&EngineEvent::Tooltip(Some(tooltip.clone()))));

        let hovered = h.markers.hovered().expect("marker hovered");
        assert_eq!(h.markers.marker(hovered).map(|m| m.radius), Some(10.0));
    }

    #[test]
    fn leaving_clears_tooltip_and_restores_radius() {
        let mut h = Harness::new();
        let at = h.nigeria();
        h.send(PointerEvent::moved(at, Vec2::new(500.0, 320.0)));
        let key = h.markers.hovered().expect("hovered");

        let events = h.send(PointerEvent::left());
        assert!(h.router.tooltip().is_none());
        assert!(events.contains(&EngineEvent::Tooltip(None)));
        assert!(events.contains(&EngineEvent::MarkerHover(None)));
        assert_eq!(h.markers.marker(key).map(|m| m.radius), Some(7.0));
    }

    #[test]
    fn moving_within_a_marker_is_quiet() {
        let mut h = Harness::new();
        let at = h.nigeria();
        h.send(PointerEvent::moved(at, Vec2::new(500.0, 320.0)));
        let nudged = PointerEvent::moved(at + Vec2::new(1.0, 0.0), Vec2::new(501.0, 320.0));
        let events = h.send(nudged);
        assert!(events.is_empty());
        assert_eq!(
            h.router.tooltip().map(|t| t.position),
            Some(Vec2::new(510.0, 330.0))
        );
    }

    #[test]
    fn country_hover_is_independent_of_marker_hover() {
        let mut h = Harness::new();
        let at = h.nigeria();
        let events = h.send(PointerEvent::moved(at, Vec2::ZERO));
        assert!(events.contains(&EngineEvent::CountryHover(Some("Nigeria".into()))));
        assert!(h.markers.hovered().is_some());

        let hovered = h.boundaries.hovered().expect("country hovered");
        assert_eq!(hovered.name, "Nigeria");
        let styles = h.boundaries.styled();
        let (_, nigeria) = styles
            .iter()
            .find(|(c, _)| c.name == "Nigeria")
            .expect("styled");
        assert_eq!(nigeria.fill, LAND_HOVER_FILL);
        assert_eq!(nigeria.stroke_width, 1.0);
        let (_, ghana) = styles.iter().find(|(c, _)| c.name == "Ghana").expect("styled");
        assert_eq!(ghana.fill, LAND_FILL);

        // Off the grown marker but still inside Nigeria.
        let events = h.send(PointerEvent::moved(at + Vec2::new(0.0, 12.0), Vec2::ZERO));
        assert!(events.contains(&EngineEvent::Tooltip(None)));
        assert!(!events.iter().any(|e| matches!(e, EngineEvent::CountryHover(_))));
        assert_eq!(h.boundaries.hovered().map(|c| c.name.as_str()), Some("Nigeria"));
    }

    #[test]
    fn clicking_a_marker_requests_navigation() {
        let mut h = Harness::new();
        let at = h.nigeria();
        let events = h.send(PointerEvent::clicked(at, Vec2::ZERO));
        let request = events
            .iter()
            .find_map(|e| match e {
                EngineEvent::Navigate(r) => Some(r),
                _ => None,
            })
            .expect("navigation");
        assert_eq!(request.entry.id, "sickle-cell");
        assert_eq!(request.region.country, "Nigeria");
    }

    #[test]
    fn clicking_a_label_requests_navigation() {
        let mut h = Harness::new();
        let m = h
            .markers
            .markers()
            .iter()
            .find(|m| m.country == "Nigeria")
            .cloned()
            .expect("marker");
        // Upper half of the label box, clear of the neighbouring labels.
        let label = ZoomTransform::IDENTITY.apply(m.label_pos) - Vec2::new(0.0, 9.0);
        assert!(h.markers.hit_test(label).is_none());

        let events = h.send(PointerEvent::moved(label, Vec2::ZERO));
        assert!(events.contains(&EngineEvent::LabelHover(Some(m.region))));
        assert_eq!(
            h.markers.marker(m.region).map(|m| m.label.fill),
            Some(m.color)
        );

        let events = h.send(PointerEvent::clicked(label, Vec2::ZERO));
        assert!(events.iter().any(|e| matches!(
            e,
            EngineEvent::Navigate(r) if r.region.country == "Nigeria"
        )));
    }

    #[test]
    fn clicking_empty_ocean_does_nothing() {
        let mut h = Harness::new();
        let events = h.send(PointerEvent::clicked(Vec2::new(5.0, 5.0), Vec2::ZERO));
        assert!(events.is_empty());
    }
}
