//! Per-region marker geometry.
//!
//! Markers live in map space (projected pixels before the zoom transform) so
//! the whole layer can be repositioned by the zoom group transform. With a
//! zoom-compensated profile every size is multiplied by `1/k`, which keeps
//! the apparent on-screen size constant: `radius(k) · k = 7`.

use catalog::Dataset;
use foundation::RgbColor;
use foundation::math::{ScreenPoint, Vec2};
use scene::{
    Circle, ProjectionState, TransformListener, ZoomTransform, project, topmost_circle,
    topmost_rect,
};

use crate::labels::marker_label_bounds;
use crate::layer::{Layer, LayerId, LayerKind};
use crate::symbology::MarkerProfile;

/// Position of a region inside the dataset snapshot it was drawn from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegionKey {
    pub entry_index: usize,
    pub region_index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerOptions {
    pub profile: MarkerProfile,
    /// Glow and label distance follow prevalence, label reads
    /// `"{country}: {prevalence}%"`.
    pub prevalence_labels: bool,
    /// Replaces the entry colour for every marker.
    pub color_override: Option<RgbColor>,
}

impl MarkerOptions {
    pub fn new(profile: MarkerProfile) -> Self {
        Self {
            profile,
            prevalence_labels: false,
            color_override: None,
        }
    }

    pub fn with_prevalence_labels(mut self, on: bool) -> Self {
        self.prevalence_labels = on;
        self
    }

    pub fn with_color(mut self, color: Option<RgbColor>) -> Self {
        self.color_override = color;
        self
    }
}

impl Default for MarkerOptions {
    fn default() -> Self {
        Self::new(MarkerProfile::full_map())
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct HaloCircle {
    pub radius: f64,
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerLabel {
    pub text: String,
    pub font_px: f64,
    pub weight: u16,
    pub fill: RgbColor,
    pub halo_px: f64,
}

/// Drawable geometry for one region. Lengths are in map units.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedMarker {
    pub dataset_id: String,
    pub region: RegionKey,
    pub country: String,
    pub prevalence: f64,
    pub color: RgbColor,
    pub map_pos: Vec2,
    pub screen_pos: ScreenPoint,
    /// Core radius.
    pub radius: f64,
    pub glow_radius: f64,
    /// Outermost first, drawn before the core.
    pub halos: Vec<HaloCircle>,
    pub stroke_width: f64,
    pub label_pos: Vec2,
    pub label: MarkerLabel,
}

impl RenderedMarker {
    pub fn core(&self) -> Circle {
        Circle::new(self.map_pos, self.radius)
    }
}

pub fn marker_scale(profile: &MarkerProfile, zoom: &ZoomTransform) -> f64 {
    if profile.zoom_compensated && zoom.k > 0.0 {
        1.0 / zoom.k
    } else {
        1.0
    }
}

/// Geometry for every projectable region, in dataset order (entries, then
/// their regions). Regions the projection cannot place are left out.
pub fn compute_markers(
    dataset: &Dataset,
    projection: &ProjectionState,
    zoom: &ZoomTransform,
    options: &MarkerOptions,
) -> Vec<RenderedMarker> {
    let profile = &options.profile;
    let ms = marker_scale(profile, zoom);
    let mut out = Vec::with_capacity(dataset.region_count());

    for r in dataset.regions() {
        let Some(map_pos) = project(r.region.location, projection) else {
            tracing::debug!(
                entry = %r.entry.id,
                country = %r.region.country,
                "unprojectable region skipped"
            );
            continue;
        };

        let mut halos: Vec<HaloCircle> = profile
            .halos
            .iter()
            .map(|h| HaloCircle {
                radius: h.radius * ms,
                opacity: h.opacity,
            })
            .collect();

        let (glow_radius, label_offset, text) = if options.prevalence_labels {
            let glow = r.region.prevalence * 2.0;
            if let Some(outer) = halos.first_mut() {
                outer.radius = glow * ms;
            }
            (
                glow * ms,
                glow.max(profile.label_offset) * ms,
                format!("{}: {}%", r.region.country, r.region.prevalence),
            )
        } else {
            (
                profile.glow_radius() * ms,
                profile.label_offset * ms,
                r.region.country.clone(),
            )
        };

        out.push(RenderedMarker {
            dataset_id: r.entry.id.clone(),
            region: RegionKey {
                entry_index: r.entry_index,
                region_index: r.region_index,
            },
            country: r.region.country.clone(),
            prevalence: r.region.prevalence,
            color: options.color_override.unwrap_or(r.entry.color),
            map_pos,
            screen_pos: zoom.apply(map_pos),
            radius: profile.core_radius * ms,
            glow_radius,
            halos,
            stroke_width: profile.stroke_width * ms,
            label_pos: Vec2::new(map_pos.x, map_pos.y - label_offset),
            label: MarkerLabel {
                text,
                font_px: profile.label_font_px * ms,
                weight: profile.label_weight,
                fill: profile.label_fill,
                halo_px: profile.label_halo_px * ms,
            },
        });
    }

    out
}

/// Marker geometry kept in step with the dataset, projection and zoom.
///
/// Registered as the controller's [`TransformListener`], so a zoom change
/// recomputes the markers before the gesture call returns.
#[derive(Debug, Clone)]
pub struct MarkerLayer {
    id: LayerId,
    options: MarkerOptions,
    dataset: Dataset,
    projection: ProjectionState,
    zoom: ZoomTransform,
    hovered: Option<RegionKey>,
    label_hovered: Option<RegionKey>,
    markers: Vec<RenderedMarker>,
    recomputes: u64,
}

impl MarkerLayer {
    pub fn new(
        id: u64,
        options: MarkerOptions,
        dataset: Dataset,
        projection: ProjectionState,
    ) -> Self {
        let mut layer = Self {
            id: LayerId(id),
            options,
            dataset,
            projection,
            zoom: ZoomTransform::IDENTITY,
            hovered: None,
            label_hovered: None,
            markers: Vec::new(),
            recomputes: 0,
        };
        layer.recompute();
        layer
    }

    pub fn markers(&self) -> &[RenderedMarker] {
        &self.markers
    }

    pub fn marker(&self, key: RegionKey) -> Option<&RenderedMarker> {
        self.markers.iter().find(|m| m.region == key)
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn projection(&self) -> &ProjectionState {
        &self.projection
    }

    pub fn zoom(&self) -> ZoomTransform {
        self.zoom
    }

    pub fn options(&self) -> &MarkerOptions {
        &self.options
    }

    pub fn hovered(&self) -> Option<RegionKey> {
        self.hovered
    }

    /// Number of full recomputes so far.
    pub fn recompute_count(&self) -> u64 {
        self.recomputes
    }

    /// Swaps in a new snapshot. Re-delivery of identical content is a no-op.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        if dataset == self.dataset {
            return;
        }
        self.dataset = dataset;
        self.hovered = None;
        self.label_hovered = None;
        self.recompute();
    }

    pub fn set_projection(&mut self, projection: ProjectionState) {
        if projection == self.projection {
            return;
        }
        self.projection = projection;
        self.recompute();
    }

    pub fn set_options(&mut self, options: MarkerOptions) {
        if options == self.options {
            return;
        }
        self.options = options;
        self.recompute();
    }

    /// Grows the hovered core to the profile's hover radius. Returns whether
    /// the hover target changed.
    pub fn set_hovered(&mut self, key: Option<RegionKey>) -> bool {
        if key == self.hovered {
            return false;
        }
        let ms = marker_scale(&self.options.profile, &self.zoom);
        let profile = &self.options.profile;
        for m in &mut self.markers {
            if Some(m.region) == self.hovered {
                m.radius = profile.core_radius * ms;
            }
            if Some(m.region) == key {
                m.radius = profile.hover_radius * ms;
            }
        }
        self.hovered = key;
        true
    }

    pub fn label_hovered(&self) -> Option<RegionKey> {
        self.label_hovered
    }

    /// Tints the hovered label with its entry colour and restores the
    /// previous one. Returns whether the target changed.
    pub fn set_label_hovered(&mut self, key: Option<RegionKey>) -> bool {
        if key == self.label_hovered {
            return false;
        }
        let fill = self.options.profile.label_fill;
        for m in &mut self.markers {
            if Some(m.region) == self.label_hovered {
                m.label.fill = fill;
            }
            if Some(m.region) == key {
                m.label.fill = m.color;
            }
        }
        self.label_hovered = key;
        true
    }

    /// Topmost marker core under a screen point.
    pub fn hit_test(&self, screen: ScreenPoint) -> Option<&RenderedMarker> {
        let p = self.zoom.invert(screen);
        let cores: Vec<Circle> = self.markers.iter().map(RenderedMarker::core).collect();
        topmost_circle(&cores, p).map(|i| &self.markers[i])
    }

    /// Topmost marker label under a screen point.
    pub fn label_hit_test(&self, screen: ScreenPoint) -> Option<&RenderedMarker> {
        let boxes: Vec<_> = self
            .markers
            .iter()
            .map(|m| marker_label_bounds(m, &self.zoom))
            .collect();
        topmost_rect(&boxes, screen).map(|i| &self.markers[i])
    }

    fn recompute(&mut self) {
        let mut markers =
            compute_markers(&self.dataset, &self.projection, &self.zoom, &self.options);
        if let Some(key) = self.hovered {
            let ms = marker_scale(&self.options.profile, &self.zoom);
            match markers.iter_mut().find(|m| m.region == key) {
                Some(m) => m.radius = self.options.profile.hover_radius * ms,
                None => self.hovered = None,
            }
        }
        if let Some(key) = self.label_hovered {
            match markers.iter_mut().find(|m| m.region == key) {
                Some(m) => m.label.fill = m.color,
                None => self.label_hovered = None,
            }
        }
        self.markers = markers;
        self.recomputes += 1;
    }
}

impl TransformListener for MarkerLayer {
    fn transform_changed(&mut self, transform: &ZoomTransform) {
        self.zoom = *transform;
        self.recompute();
    }
}

impl Layer for MarkerLayer {
    fn id(&self) -> LayerId {
        self.id
    }

    fn kind(&self) -> LayerKind {
        LayerKind::Markers
    }
}
