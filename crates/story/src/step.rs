use std::collections::BTreeSet;

use foundation::{GeoPoint, RgbColor};
use layers::{OverlayDirective, STORY_MARKER_DEFAULT};
use scene::MapFocus;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub enum StoryError {
    Parse(String),
    NoSteps { story: String },
    DuplicateStep { story: String, step: String },
    InvalidFocus { story: String, step: String, reason: String },
    InvalidColor { story: String, step: String, value: String },
    InvalidScroll { offset: f64, viewport_height: f64 },
    UnknownStory(String),
}

impl std::fmt::Display for StoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoryError::Parse(msg) => write!(f, "story JSON parse error: {msg}"),
            StoryError::NoSteps { story } => write!(f, "story {story:?} has no steps"),
            StoryError::DuplicateStep { story, step } => {
                write!(f, "story {story:?} repeats step id {step:?}")
            }
            StoryError::InvalidFocus {
                story,
                step,
                reason,
            } => write!(f, "story {story:?} step {step:?} has a bad focus: {reason}"),
            StoryError::InvalidColor { story, step, value } => {
                write!(f, "story {story:?} step {step:?} marker colour {value:?} is not #rrggbb")
            }
            StoryError::InvalidScroll {
                offset,
                viewport_height,
            } => write!(
                f,
                "scroll offset {offset} with viewport height {viewport_height} is not usable"
            ),
            StoryError::UnknownStory(id) => write!(f, "no story with id {id:?}"),
        }
    }
}

impl std::error::Error for StoryError {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepStat {
    pub label: String,
    pub value: String,
}

/// One authored unit of a story.
#[derive(Debug, Clone, PartialEq)]
pub struct NarrativeStep {
    pub id: String,
    pub title: String,
    pub body: String,
    pub focus: Option<MapFocus>,
    pub highlighted_countries: BTreeSet<String>,
    pub overlay_directives: BTreeSet<OverlayDirective>,
    pub show_markers: bool,
    pub marker_color: Option<RgbColor>,
    pub stats: Vec<StepStat>,
}

impl NarrativeStep {
    pub fn has(&self, directive: OverlayDirective) -> bool {
        self.overlay_directives.contains(&directive)
    }

    pub fn marker_color(&self) -> RgbColor {
        self.marker_color.unwrap_or(STORY_MARKER_DEFAULT)
    }
}

/// A titled, non-empty sequence of steps. `id` names the dataset entry the
/// story's markers come from.
#[derive(Debug, Clone, PartialEq)]
pub struct Story {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    steps: Vec<NarrativeStep>,
}

impl Story {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        subtitle: impl Into<String>,
        steps: Vec<NarrativeStep>,
    ) -> Result<Self, StoryError> {
        let id = id.into();
        if steps.is_empty() {
            return Err(StoryError::NoSteps { story: id });
        }
        let mut seen = BTreeSet::new();
        for step in &steps {
            if !seen.insert(step.id.as_str()) {
                return Err(StoryError::DuplicateStep {
                    story: id,
                    step: step.id.clone(),
                });
            }
        }
        Ok(Self {
            id,
            title: title.into(),
            subtitle: subtitle.into(),
            steps,
        })
    }

    pub fn steps(&self) -> &[NarrativeStep] {
        &self.steps
    }

    pub fn step(&self, index: usize) -> Option<&NarrativeStep> {
        self.steps.get(index)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn from_record(record: StoryRecord) -> Result<Self, StoryError> {
        let story_id = record.id;
        let steps = record
            .steps
            .into_iter()
            .map(|s| s.into_step(&story_id))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(story_id, record.title, record.subtitle, steps)
    }

    /// Parses a JSON array of stories.
    pub fn list_from_json_str(payload: &str) -> Result<Vec<Self>, StoryError> {
        let records: Vec<StoryRecord> =
            serde_json::from_str(payload).map_err(|e| StoryError::Parse(e.to_string()))?;
        records.into_iter().map(Self::from_record).collect()
    }
}

/// Scroll container position. `offset >= 0`, `viewport_height > 0`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScrollState {
    pub offset: f64,
    pub viewport_height: f64,
}

impl ScrollState {
    /// Overscroll above the top (negative offset) reads as the top.
    pub fn new(offset: f64, viewport_height: f64) -> Result<Self, StoryError> {
        if !offset.is_finite() || !viewport_height.is_finite() || viewport_height <= 0.0 {
            return Err(StoryError::InvalidScroll {
                offset,
                viewport_height,
            });
        }
        Ok(Self {
            offset: offset.max(0.0),
            viewport_height,
        })
    }

    pub fn top(viewport_height: f64) -> Result<Self, StoryError> {
        Self::new(0.0, viewport_height)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusRecord {
    /// `[longitude, latitude]`.
    pub center: [f64; 2],
    pub scale: f64,
}

/// Wire form of a step. Directive flags follow the authored JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    pub id: String,
    pub title: String,
    pub text: String,
    #[serde(default)]
    pub map_focus: Option<FocusRecord>,
    #[serde(default)]
    pub highlight_regions: Vec<String>,
    #[serde(default)]
    pub show_threat: bool,
    #[serde(default)]
    pub show_markers: bool,
    #[serde(default)]
    pub show_protection: bool,
    #[serde(default)]
    pub show_prevalence: bool,
    #[serde(default)]
    pub show_farming_zone: bool,
    #[serde(default)]
    pub marker_color: Option<String>,
    #[serde(default)]
    pub stats: Vec<StepStat>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryRecord {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub steps: Vec<StepRecord>,
}

impl StepRecord {
    fn into_step(self, story: &str) -> Result<NarrativeStep, StoryError> {
        let focus = match self.map_focus {
            None => None,
            Some(FocusRecord {
                center: [lng, lat],
                scale,
            }) => {
                let bad = |reason: String| StoryError::InvalidFocus {
                    story: story.to_string(),
                    step: self.id.clone(),
                    reason,
                };
                if !scale.is_finite() || scale <= 0.0 {
                    return Err(bad(format!("scale {scale} must be positive")));
                }
                let center = GeoPoint::try_new(lng, lat).map_err(|e| bad(e.to_string()))?;
                Some(MapFocus { center, scale })
            }
        };

        let marker_color = self
            .marker_color
            .map(|hex| {
                RgbColor::from_hex(&hex).map_err(|_| StoryError::InvalidColor {
                    story: story.to_string(),
                    step: self.id.clone(),
                    value: hex,
                })
            })
            .transpose()?;

        let flags = [
            (self.show_threat, OverlayDirective::ThreatZone),
            (self.show_protection, OverlayDirective::ProtectionMark),
            (self.show_prevalence, OverlayDirective::PrevalenceLabels),
            (self.show_farming_zone, OverlayDirective::FarmingZone),
        ];
        let overlay_directives = flags
            .into_iter()
            .filter_map(|(on, d)| on.then_some(d))
            .collect();

        Ok(NarrativeStep {
            id: self.id,
            title: self.title,
            body: self.text,
            focus,
            highlighted_countries: self.highlight_regions.into_iter().collect(),
            overlay_directives,
            show_markers: self.show_markers,
            marker_color,
            stats: self.stats,
        })
    }
}
