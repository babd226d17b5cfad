//! Pan/zoom state for the world map.
//!
//! [`TransformController`] is the single writer of [`ZoomTransform`]. Gesture
//! handling follows d3-zoom: scale is clamped to `[min_k, max_k]` and the
//! translation is constrained so the visible window stays inside the viewport
//! grown by `translate_margin` on every side.

use foundation::math::{ScreenPoint, Vec2};
use runtime::{Event, EventBus, Frame};

use crate::viewport::Viewport;

/// `screen = (x, y) + k · map`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ZoomTransform {
    pub k: f64,
    pub x: f64,
    pub y: f64,
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ZoomTransform {
    pub const IDENTITY: ZoomTransform = ZoomTransform {
        k: 1.0,
        x: 0.0,
        y: 0.0,
    };

    pub fn apply(&self, p: Vec2) -> ScreenPoint {
        Vec2::new(self.x + self.k * p.x, self.y + self.k * p.y)
    }

    pub fn invert(&self, screen: ScreenPoint) -> Vec2 {
        Vec2::new((screen.x - self.x) / self.k, (screen.y - self.y) / self.k)
    }

    /// Translates by a map-space delta.
    fn translate(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + self.k * dx,
            y: self.y + self.k * dy,
            ..self
        }
    }

    fn is_finite(&self) -> bool {
        self.k.is_finite() && self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ZoomConfig {
    pub min_k: f64,
    pub max_k: f64,
    /// Fraction of the viewport the map may be dragged past each edge.
    pub translate_margin: f64,
    /// Wheel exponent per pixel of `delta_y` (d3 default 0.002).
    pub wheel_step: f64,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min_k: 1.0,
            max_k: 8.0,
            translate_margin: 0.3,
            wheel_step: 0.002,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Gesture {
    /// Drag by a pixel delta.
    Pan { delta: Vec2 },
    /// Multiply `k` by `factor`, keeping `anchor` fixed on screen.
    ZoomBy { factor: f64, anchor: ScreenPoint },
    /// Set `k`, keeping `anchor` fixed on screen.
    ZoomTo { k: f64, anchor: ScreenPoint },
    /// Mouse wheel in pixel mode.
    Wheel { delta_y: f64, anchor: ScreenPoint },
}

/// Receives every transform change before the controller returns.
pub trait TransformListener {
    fn transform_changed(&mut self, transform: &ZoomTransform);
}

impl<F: FnMut(&ZoomTransform)> TransformListener for F {
    fn transform_changed(&mut self, transform: &ZoomTransform) {
        self(transform)
    }
}

pub const EVENT_ZOOM_CHANGED: &str = "zoom.changed";
pub const EVENT_ZOOM_RESET: &str = "zoom.reset";

#[derive(Debug)]
pub struct TransformController {
    viewport: Viewport,
    config: ZoomConfig,
    transform: ZoomTransform,
    events: EventBus<ZoomTransform>,
}

impl TransformController {
    pub fn new(viewport: Viewport, config: ZoomConfig) -> Self {
        Self {
            viewport,
            config,
            transform: ZoomTransform::IDENTITY,
            events: EventBus::new(),
        }
    }

    pub fn transform(&self) -> ZoomTransform {
        self.transform
    }

    pub fn config(&self) -> &ZoomConfig {
        &self.config
    }

    pub fn events(&self) -> &EventBus<ZoomTransform> {
        &self.events
    }

    /// Hands recorded transform changes to the host; the bus starts empty again.
    pub fn drain_events(&mut self) -> Vec<Event<ZoomTransform>> {
        self.events.drain()
    }

    /// Applies a gesture. Out-of-range input is clamped, never rejected;
    /// non-finite input leaves the transform unchanged.
    pub fn apply_gesture(
        &mut self,
        gesture: Gesture,
        frame: Frame,
        listener: &mut dyn TransformListener,
    ) -> ZoomTransform {
        let t = self.transform;
        let next = match gesture {
            Gesture::Pan { delta } => ZoomTransform {
                x: t.x + delta.x,
                y: t.y + delta.y,
                ..t
            },
            Gesture::ZoomBy { factor, anchor } => self.scale_to(t, t.k * factor, anchor),
            Gesture::ZoomTo { k, anchor } => self.scale_to(t, k, anchor),
            Gesture::Wheel { delta_y, anchor } => {
                let factor = 2f64.powf(-delta_y * self.config.wheel_step);
                self.scale_to(t, t.k * factor, anchor)
            }
        };
        if !next.is_finite() {
            tracing::debug!(?gesture, "ignoring non-finite gesture");
            return self.transform;
        }
        let next = self.constrain(next);
        self.commit(next, frame, EVENT_ZOOM_CHANGED, listener)
    }

    /// Back to identity.
    pub fn reset(&mut self, frame: Frame, listener: &mut dyn TransformListener) -> ZoomTransform {
        self.commit(ZoomTransform::IDENTITY, frame, EVENT_ZOOM_RESET, listener)
    }

    /// A resize re-applies the translate constraint against the new extent.
    pub fn resize(
        &mut self,
        viewport: Viewport,
        frame: Frame,
        listener: &mut dyn TransformListener,
    ) -> ZoomTransform {
        self.viewport = viewport;
        let next = self.constrain(self.transform);
        self.commit(next, frame, EVENT_ZOOM_CHANGED, listener)
    }

    fn commit(
        &mut self,
        next: ZoomTransform,
        frame: Frame,
        kind: &'static str,
        listener: &mut dyn TransformListener,
    ) -> ZoomTransform {
        if next != self.transform {
            self.transform = next;
            tracing::debug!(k = next.k, x = next.x, y = next.y, kind, "zoom transform");
            listener.transform_changed(&next);
            self.events.emit(frame, kind, next);
        }
        self.transform
    }

    fn scale_to(&self, t: ZoomTransform, k: f64, anchor: ScreenPoint) -> ZoomTransform {
        let k = k.clamp(self.config.min_k, self.config.max_k);
        let p = t.invert(anchor);
        ZoomTransform {
            k,
            x: anchor.x - p.x * k,
            y: anchor.y - p.y * k,
        }
    }

    /// d3-zoom `defaultConstrain`.
    fn constrain(&self, t: ZoomTransform) -> ZoomTransform {
        let (w, h) = (self.viewport.width, self.viewport.height);
        let m = self.config.translate_margin;
        let (ex0, ey0, ex1, ey1) = (-m * w, -m * h, (1.0 + m) * w, (1.0 + m) * h);

        let lo = t.invert(Vec2::ZERO);
        let hi = t.invert(Vec2::new(w, h));
        let dx0 = lo.x - ex0;
        let dx1 = hi.x - ex1;
        let dy0 = lo.y - ey0;
        let dy1 = hi.y - ey1;

        t.translate(axis_shift(dx0, dx1), axis_shift(dy0, dy1))
    }
}

fn axis_shift(d0: f64, d1: f64) -> f64 {
    if d1 > d0 {
        (d0 + d1) / 2.0
    } else if d0 < 0.0 {
        d0
    } else {
        d1.max(0.0)
    }
}
