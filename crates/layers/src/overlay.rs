//! Ephemeral step annotations.
//!
//! Every [`OverlayAnnotator::render`] drops the previous effects and spawns
//! fresh ones for the requested directives. Effects are plain data plus
//! [`Tween`]s; nothing is subscribed, so a finished effect just rests at its
//! target values until the next render replaces it.

use std::collections::BTreeSet;
use std::str::FromStr;

use foundation::math::Vec2;
use foundation::{GeoPoint, RgbColor, Time};
use rand::Rng;
use scene::{ProjectionState, Viewport, project};

use crate::animation::Tween;
use crate::layer::{Layer, LayerId, LayerKind};
use crate::symbology::{PROTECTION, THREAT, WHITE};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OverlayDirective {
    ThreatZone,
    ProtectionMark,
    PrevalenceLabels,
    FarmingZone,
}

impl OverlayDirective {
    pub const ALL: [OverlayDirective; 4] = [
        OverlayDirective::ThreatZone,
        OverlayDirective::ProtectionMark,
        OverlayDirective::PrevalenceLabels,
        OverlayDirective::FarmingZone,
    ];

    /// Bottom to top.
    const PAINT_ORDER: [OverlayDirective; 4] = [
        OverlayDirective::FarmingZone,
        OverlayDirective::ThreatZone,
        OverlayDirective::PrevalenceLabels,
        OverlayDirective::ProtectionMark,
    ];

    pub fn name(self) -> &'static str {
        match self {
            OverlayDirective::ThreatZone => "threat_zone",
            OverlayDirective::ProtectionMark => "protection_mark",
            OverlayDirective::PrevalenceLabels => "prevalence_labels",
            OverlayDirective::FarmingZone => "farming_zone",
        }
    }
}

impl std::fmt::Display for OverlayDirective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDirective(pub String);

impl std::fmt::Display for UnknownDirective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown overlay directive {:?}", self.0)
    }
}

impl std::error::Error for UnknownDirective {}

impl FromStr for OverlayDirective {
    type Err = UnknownDirective;

    /// Accepts `threat_zone`, `THREAT_ZONE`, `threatZone` and `threat-zone`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();
        Self::ALL
            .into_iter()
            .find(|d| d.name().replace('_', "") == folded)
            .ok_or_else(|| UnknownDirective(s.to_string()))
    }
}

pub const SHIELD_PATH: &str = "M 0,-20 L 15,0 L 0,25 L -15,0 Z";
pub const SHIELD_GLYPH: char = '\u{2713}';

const THREAT_RADIUS: f64 = 50.0;
const THREAT_OPACITY: f64 = 0.3;
const THREAT_DURATION_S: f64 = 1.5;
const THREAT_STAGGER_S: f64 = 0.2;
const SHIELD_OFFSET: Vec2 = Vec2::new(100.0, -50.0);
const SHIELD_DURATION_S: f64 = 1.0;
const FARMING_RADII: (f64, f64) = (150.0, 80.0);
const FARMING_OPACITY: f64 = 0.2;
const FARMING_DURATION_S: f64 = 1.5;
const LABEL_DELAY_S: f64 = 0.5;
const LABEL_DURATION_S: f64 = 0.8;

#[derive(Debug, Clone, PartialEq)]
pub enum OverlayShape {
    Circle {
        center: Vec2,
        radius: Tween,
    },
    Ellipse {
        center: Vec2,
        rx: Tween,
        ry: Tween,
    },
    Shield {
        origin: Vec2,
        path: &'static str,
        glyph: char,
    },
    /// Drives the fade-in of marker prevalence labels; draws nothing itself.
    LabelFade,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayEffect {
    pub directive: OverlayDirective,
    pub shape: OverlayShape,
    pub fill: RgbColor,
    pub stroke: Option<(RgbColor, f64)>,
    pub opacity: Tween,
}

impl OverlayEffect {
    pub fn sample(&self, now: Time) -> OverlaySample {
        let geometry = match &self.shape {
            OverlayShape::Circle { center, radius } => SampledShape::Circle {
                center: *center,
                radius: radius.value_at(now),
            },
            OverlayShape::Ellipse { center, rx, ry } => SampledShape::Ellipse {
                center: *center,
                rx: rx.value_at(now),
                ry: ry.value_at(now),
            },
            OverlayShape::Shield {
                origin,
                path,
                glyph,
            } => SampledShape::Shield {
                origin: *origin,
                path,
                glyph: *glyph,
            },
            OverlayShape::LabelFade => SampledShape::LabelFade,
        };
        OverlaySample {
            directive: self.directive,
            geometry,
            fill: self.fill,
            opacity: self.opacity.value_at(now),
        }
    }

    fn is_finished(&self, now: Time) -> bool {
        let shape_done = match &self.shape {
            OverlayShape::Circle { radius, .. } => radius.is_finished(now),
            OverlayShape::Ellipse { rx, ry, .. } => rx.is_finished(now) && ry.is_finished(now),
            OverlayShape::Shield { .. } | OverlayShape::LabelFade => true,
        };
        shape_done && self.opacity.is_finished(now)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SampledShape {
    Circle {
        center: Vec2,
        radius: f64,
    },
    Ellipse {
        center: Vec2,
        rx: f64,
        ry: f64,
    },
    Shield {
        origin: Vec2,
        path: &'static str,
        glyph: char,
    },
    LabelFade,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverlaySample {
    pub directive: OverlayDirective,
    pub geometry: SampledShape,
    pub fill: RgbColor,
    pub opacity: f64,
}

/// Everything one step contributes to its overlays.
#[derive(Debug, Clone, Copy)]
pub struct OverlayRequest<'a> {
    pub directives: &'a BTreeSet<OverlayDirective>,
    pub highlighted: &'a BTreeSet<String>,
    pub focus_center: Option<GeoPoint>,
    pub projection: &'a ProjectionState,
    pub viewport: Viewport,
}

/// Spawns step overlays. Threat-zone placement draws from the injected
/// generator, so a seeded generator makes renders reproducible.
#[derive(Debug)]
pub struct OverlayAnnotator<R: Rng> {
    id: LayerId,
    rng: R,
    effects: Vec<OverlayEffect>,
    renders: u64,
}

impl<R: Rng> OverlayAnnotator<R> {
    pub fn new(id: u64, rng: R) -> Self {
        Self {
            id: LayerId(id),
            rng,
            effects: Vec::new(),
            renders: 0,
        }
    }

    /// Replaces every effect with a fresh set started at `now`.
    pub fn render(&mut self, request: &OverlayRequest<'_>, now: Time) -> &[OverlayEffect] {
        self.effects.clear();
        self.renders += 1;

        for directive in OverlayDirective::PAINT_ORDER {
            if !request.directives.contains(&directive) {
                continue;
            }
            match directive {
                OverlayDirective::ThreatZone => self.spawn_threat_zones(request, now),
                OverlayDirective::ProtectionMark => self.spawn_shield(request, now),
                OverlayDirective::PrevalenceLabels => self.effects.push(OverlayEffect {
                    directive,
                    shape: OverlayShape::LabelFade,
                    fill: WHITE,
                    stroke: None,
                    opacity: Tween::appear(now, LABEL_DELAY_S, LABEL_DURATION_S, 1.0),
                }),
                OverlayDirective::FarmingZone => self.spawn_farming_zone(request, now),
            }
        }

        tracing::debug!(
            effects = self.effects.len(),
            render = self.renders,
            "overlay effects spawned"
        );
        &self.effects
    }

    pub fn clear(&mut self) {
        self.effects.clear();
    }

    pub fn effects(&self) -> &[OverlayEffect] {
        &self.effects
    }

    pub fn render_count(&self) -> u64 {
        self.renders
    }

    pub fn sample(&self, now: Time) -> Vec<OverlaySample> {
        self.effects.iter().map(|e| e.sample(now)).collect()
    }

    /// True once every running animation has reached its target.
    pub fn is_settled(&self, now: Time) -> bool {
        self.effects.iter().all(|e| e.is_finished(now))
    }

    /// Current prevalence-label opacity, `None` when labels are not requested.
    pub fn label_opacity(&self, now: Time) -> Option<f64> {
        self.effects
            .iter()
            .find(|e| e.shape == OverlayShape::LabelFade)
            .map(|e| e.opacity.value_at(now))
    }

    fn spawn_threat_zones(&mut self, request: &OverlayRequest<'_>, now: Time) {
        for (index, country) in request.highlighted.iter().enumerate() {
            let lng = self.rng.gen_range(-10.0..50.0);
            let lat = self.rng.gen_range(-10.0..30.0);
            let Some(center) = project(GeoPoint::new(lng, lat), request.projection) else {
                tracing::debug!(%country, lng, lat, "threat zone off projection");
                continue;
            };
            self.effects.push(OverlayEffect {
                directive: OverlayDirective::ThreatZone,
                shape: OverlayShape::Circle {
                    center,
                    radius: Tween::appear(
                        now,
                        THREAT_STAGGER_S * index as f64,
                        THREAT_DURATION_S,
                        THREAT_RADIUS,
                    ),
                },
                fill: THREAT,
                stroke: None,
                opacity: Tween::constant(THREAT_OPACITY),
            });
        }
    }

    fn spawn_shield(&mut self, request: &OverlayRequest<'_>, now: Time) {
        let anchor = request.focus_center.unwrap_or(GeoPoint::new(0.0, 0.0));
        let Some(p) = project(anchor, request.projection) else {
            tracing::debug!(?anchor, "protection mark anchor off projection");
            return;
        };
        self.effects.push(OverlayEffect {
            directive: OverlayDirective::ProtectionMark,
            shape: OverlayShape::Shield {
                origin: p + SHIELD_OFFSET,
                path: SHIELD_PATH,
                glyph: SHIELD_GLYPH,
            },
            fill: PROTECTION,
            stroke: Some((WHITE, 2.0)),
            opacity: Tween::appear(now, 0.0, SHIELD_DURATION_S, 1.0),
        });
    }

    fn spawn_farming_zone(&mut self, request: &OverlayRequest<'_>, now: Time) {
        let v = request.viewport;
        self.effects.push(OverlayEffect {
            directive: OverlayDirective::FarmingZone,
            shape: OverlayShape::Ellipse {
                center: Vec2::new(v.width / 2.0 - 50.0, v.height / 3.0),
                rx: Tween::appear(now, 0.0, FARMING_DURATION_S, FARMING_RADII.0),
                ry: Tween::appear(now, 0.0, FARMING_DURATION_S, FARMING_RADII.1),
            },
            fill: PROTECTION,
            stroke: None,
            opacity: Tween::constant(FARMING_OPACITY),
        });
    }
}

impl<R: Rng> Layer for OverlayAnnotator<R> {
    fn id(&self) -> LayerId {
        self.id
    }

    fn kind(&self) -> LayerKind {
        LayerKind::Overlay
    }
}
