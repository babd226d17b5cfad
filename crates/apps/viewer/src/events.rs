use catalog::{DatasetEntry, Region};
use foundation::math::Vec2;
use layers::RegionKey;
use scene::ZoomTransform;

/// Floating tooltip next to the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub text: String,
    /// Page coordinates of the tooltip's top-left corner.
    pub position: Vec2,
}

/// The user picked a region; the host opens its detail view.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationRequest {
    pub entry: DatasetEntry,
    pub region: Region,
}

/// Everything the engine tells its host.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// `None` hides the tooltip.
    Tooltip(Option<Tooltip>),
    MarkerHover(Option<RegionKey>),
    LabelHover(Option<RegionKey>),
    CountryHover(Option<String>),
    Navigate(NavigationRequest),
    Zoom(ZoomTransform),
    StepChanged { from: usize, to: usize },
    TopologyReady { countries: usize },
    TopologyUnavailable,
}

impl EngineEvent {
    /// Stable tag used as the event bus kind.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineEvent::Tooltip(_) => "pointer.tooltip",
            EngineEvent::MarkerHover(_) => "pointer.marker_hover",
            EngineEvent::LabelHover(_) => "pointer.label_hover",
            EngineEvent::CountryHover(_) => "pointer.country_hover",
            EngineEvent::Navigate(_) => "navigate",
            EngineEvent::Zoom(_) => "zoom.changed",
            EngineEvent::StepChanged { .. } => "story.step_changed",
            EngineEvent::TopologyReady { .. } => "topology.ready",
            EngineEvent::TopologyUnavailable => "topology.unavailable",
        }
    }
}
