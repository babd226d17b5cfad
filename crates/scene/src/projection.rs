//! Geographic → screen projection for one render pass.
//!
//! A [`ProjectionState`] is derived from the viewport (and, in story mode,
//! the step focus) and shared by the boundary mesh and the marker layer so
//! the two always agree. It is never persisted.

use std::f64::consts::PI;

use foundation::GeoPoint;
use foundation::math::{ScreenPoint, SphericalRotation, Vec2, natural_earth1, natural_earth1_invert};

use crate::viewport::Viewport;

/// Scale used by story steps that do not name a focus.
pub const STORY_DEFAULT_SCALE: f64 = 200.0;

/// Points this close to the rotated antimeridian are treated as clipped.
const SEAM_EPSILON: f64 = 1e-9;

/// Where a narrative step points the map.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MapFocus {
    pub center: GeoPoint,
    pub scale: f64,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ScalePolicy {
    /// `min(W, H) / 3`, the world map default.
    FitViewport,
    /// `focus.scale`, or [`STORY_DEFAULT_SCALE`] without a focus.
    Focus(Option<MapFocus>),
    Fixed(f64),
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ProjectionState {
    pub scale: f64,
    pub translate: Vec2,
    /// Geographic point drawn at `translate`. `None` keeps (0°, 0°) there.
    pub center: Option<GeoPoint>,
    /// Reference meridian rotation. Introduces a clip seam opposite it.
    pub rotation: Option<SphericalRotation>,
}

impl ProjectionState {
    pub fn for_viewport(viewport: Viewport, policy: ScalePolicy) -> Self {
        let (scale, center) = match policy {
            ScalePolicy::FitViewport => (viewport.min_side() / 3.0, None),
            ScalePolicy::Focus(Some(focus)) => (focus.scale, Some(focus.center)),
            ScalePolicy::Focus(None) => (STORY_DEFAULT_SCALE, None),
            ScalePolicy::Fixed(scale) => (scale, None),
        };
        debug_assert!(scale > 0.0, "projection scale must be positive");
        Self {
            scale,
            translate: viewport.center(),
            center,
            rotation: None,
        }
    }

    pub fn with_center(mut self, center: GeoPoint) -> Self {
        self.center = Some(center);
        self
    }

    pub fn with_rotation(mut self, rotation: SphericalRotation) -> Self {
        self.rotation = (!rotation.is_identity()).then_some(rotation);
        self
    }

    fn raw(&self, point: GeoPoint) -> Option<Vec2> {
        let (mut lambda, mut phi) = point.to_radians();
        if let Some(rotation) = self.rotation {
            (lambda, phi) = rotation.rotate(lambda, phi);
            if (lambda.abs() - PI).abs() < SEAM_EPSILON {
                return None;
            }
        }
        let raw = natural_earth1(lambda, phi);
        raw.is_finite().then_some(raw)
    }

    fn center_offset(&self) -> Vec2 {
        self.center
            .map(|c| {
                let (lambda, phi) = c.to_radians();
                natural_earth1(lambda, phi)
            })
            .unwrap_or(Vec2::ZERO)
    }
}

/// Projects `point`, or `None` when it cannot be placed (non-finite result,
/// or on the seam of a rotated projection). Callers skip `None`.
pub fn project(point: GeoPoint, state: &ProjectionState) -> Option<ScreenPoint> {
    let raw = state.raw(point)?;
    let c = state.center_offset();
    let screen = Vec2::new(
        state.translate.x + state.scale * (raw.x - c.x),
        state.translate.y - state.scale * (raw.y - c.y),
    );
    screen.is_finite().then_some(screen)
}

/// Screen → geographic. `None` off the projected globe.
pub fn invert(screen: ScreenPoint, state: &ProjectionState) -> Option<GeoPoint> {
    let c = state.center_offset();
    let x = (screen.x - state.translate.x) / state.scale + c.x;
    let y = (state.translate.y - screen.y) / state.scale + c.y;
    let (mut lambda, mut phi) = natural_earth1_invert(x, y)?;
    if let Some(rotation) = state.rotation {
        (lambda, phi) = rotation.invert(lambda, phi);
    }
    GeoPoint::try_new(lambda.to_degrees(), phi.to_degrees()).ok()
}

/// Projects a ring, dropping vertices that cannot be placed.
pub fn project_ring(ring: &[GeoPoint], state: &ProjectionState) -> Vec<ScreenPoint> {
    ring.iter().filter_map(|p| project(*p, state)).collect()
}
