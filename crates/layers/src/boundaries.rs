//! Country polygons projected and triangulated once per projection.
//!
//! Zoom and pan never rebuild the mesh; the zoom group transform moves it.
//! Only a new [`ProjectionState`] (viewport resize, story step focus) or new
//! topology triggers a rebuild.

use std::collections::BTreeSet;
use std::sync::Arc;

use earcutr::earcut;
use formats::{CountryFeature, FeatureCollection};
use foundation::Aabb2;
use foundation::math::Vec2;
use scene::{ProjectionState, point_in_polygon, project_ring};

use crate::layer::{Layer, LayerId, LayerKind};
use crate::symbology::{
    LAND_FILL, LAND_HOVER_FILL, LAND_STROKE, LayerStyle, STORY_HIGHLIGHT, STORY_LAND_FILL,
    STORY_LAND_STROKE, THREAT,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedCountry {
    pub name: String,
    pub id: Option<String>,
    /// Per polygon, outer ring first. Rings are open (no closing duplicate).
    pub polygons: Vec<Vec<Vec<Vec2>>>,
    pub bounds: Aabb2,
    /// Flat triangle list, three vertices per triangle.
    pub triangles: Vec<Vec2>,
}

impl ProjectedCountry {
    fn from_feature(feature: &CountryFeature, projection: &ProjectionState) -> Self {
        let mut polygons = Vec::with_capacity(feature.polygons.len());
        let mut triangles = Vec::new();
        let mut bounds = Aabb2::empty();

        for polygon in &feature.polygons {
            let rings: Vec<Vec<Vec2>> = polygon
                .iter()
                .map(|ring| {
                    let mut pts = project_ring(ring, projection);
                    drop_closing_duplicate(&mut pts);
                    pts
                })
                .filter(|ring| ring.len() >= 3)
                .collect();
            if rings.is_empty() {
                continue;
            }
            for p in rings.iter().flatten() {
                bounds.include(*p);
            }
            triangles.extend(triangulate_rings(&rings));
            polygons.push(rings);
        }

        Self {
            name: feature.name.clone(),
            id: feature.id.clone(),
            polygons,
            bounds,
            triangles,
        }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        self.bounds.contains(p) && self.polygons.iter().any(|rings| point_in_polygon(p, rings))
    }
}

/// Projected boundaries for exactly one [`ProjectionState`].
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryMesh {
    projection: ProjectionState,
    countries: Vec<ProjectedCountry>,
}

impl BoundaryMesh {
    pub fn build(features: &FeatureCollection, projection: &ProjectionState) -> Self {
        let countries: Vec<ProjectedCountry> = features
            .features
            .iter()
            .map(|f| ProjectedCountry::from_feature(f, projection))
            .collect();
        let mesh = Self {
            projection: *projection,
            countries,
        };
        tracing::debug!(
            countries = mesh.countries.len(),
            triangles = mesh.triangle_count(),
            scale = projection.scale,
            "built boundary mesh"
        );
        mesh
    }

    pub fn projection(&self) -> &ProjectionState {
        &self.projection
    }

    pub fn countries(&self) -> &[ProjectedCountry] {
        &self.countries
    }

    pub fn country(&self, name: &str) -> Option<&ProjectedCountry> {
        self.countries.iter().find(|c| c.name == name)
    }

    pub fn triangle_count(&self) -> usize {
        self.countries.iter().map(|c| c.triangles.len() / 3).sum()
    }

    /// Topmost country containing a map-space point. Later features are
    /// drawn over earlier ones.
    pub fn pick(&self, map_point: Vec2) -> Option<usize> {
        self.countries.iter().rposition(|c| c.contains(map_point))
    }
}

/// Highlight rule for narrative steps.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HighlightStyle {
    pub highlighted: BTreeSet<String>,
    /// Highlighted countries turn red instead of blue.
    pub threat: bool,
}

impl HighlightStyle {
    pub fn new(highlighted: BTreeSet<String>, threat: bool) -> Self {
        Self { highlighted, threat }
    }

    /// An empty highlight set renders every country at a uniform 0.7 instead
    /// of the 1 / 0.3 split.
    pub fn style_for(&self, country: &str) -> LayerStyle {
        let hit = self.highlighted.contains(country);
        let fill = match (hit, self.threat) {
            (true, true) => THREAT,
            (true, false) => STORY_HIGHLIGHT,
            (false, _) => STORY_LAND_FILL,
        };
        let opacity = if self.highlighted.is_empty() {
            0.7
        } else if hit {
            1.0
        } else {
            0.3
        };
        LayerStyle::new(fill, STORY_LAND_STROKE, 0.5, opacity)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryTheme {
    /// Interactive world map with hover highlight.
    World { stroke_width: f64 },
    Story(HighlightStyle),
}

impl BoundaryTheme {
    pub fn world() -> Self {
        BoundaryTheme::World { stroke_width: 0.5 }
    }
}

pub fn world_style(stroke_width: f64, hovered: bool) -> LayerStyle {
    if hovered {
        LayerStyle::new(LAND_HOVER_FILL, LAND_STROKE, 1.0, 1.0)
    } else {
        LayerStyle::new(LAND_FILL, LAND_STROKE, stroke_width, 1.0)
    }
}

#[derive(Debug, Clone)]
pub struct BoundaryLayer {
    id: LayerId,
    theme: BoundaryTheme,
    features: Option<Arc<FeatureCollection>>,
    mesh: Option<BoundaryMesh>,
    hovered: Option<usize>,
    builds: u64,
}

impl BoundaryLayer {
    pub fn new(id: u64, theme: BoundaryTheme) -> Self {
        Self {
            id: LayerId(id),
            theme,
            features: None,
            mesh: None,
            hovered: None,
            builds: 0,
        }
    }

    pub fn set_features(&mut self, features: Arc<FeatureCollection>) {
        self.features = Some(features);
        self.mesh = None;
        self.hovered = None;
    }

    /// Returns the mesh for `projection`, rebuilding only when it differs
    /// from the cached one. `None` until topology is available.
    pub fn prepare(&mut self, projection: &ProjectionState) -> Option<&BoundaryMesh> {
        let features = self.features.as_ref()?;
        let stale = self
            .mesh
            .as_ref()
            .is_none_or(|mesh| mesh.projection() != projection);
        if stale {
            self.mesh = Some(BoundaryMesh::build(features, projection));
            self.hovered = None;
            self.builds += 1;
        }
        self.mesh.as_ref()
    }

    pub fn mesh(&self) -> Option<&BoundaryMesh> {
        self.mesh.as_ref()
    }

    pub fn build_count(&self) -> u64 {
        self.builds
    }

    pub fn theme(&self) -> &BoundaryTheme {
        &self.theme
    }

    pub fn set_theme(&mut self, theme: BoundaryTheme) {
        self.theme = theme;
    }

    pub fn hovered(&self) -> Option<&ProjectedCountry> {
        let mesh = self.mesh.as_ref()?;
        mesh.countries.get(self.hovered?)
    }

    /// Returns whether the hovered country changed.
    pub fn set_hovered(&mut self, index: Option<usize>) -> bool {
        if index == self.hovered {
            return false;
        }
        self.hovered = index;
        true
    }

    pub fn pick(&self, map_point: Vec2) -> Option<usize> {
        self.mesh.as_ref()?.pick(map_point)
    }

    pub fn style_for(&self, index: usize) -> Option<LayerStyle> {
        let country = self.mesh.as_ref()?.countries.get(index)?;
        Some(match &self.theme {
            BoundaryTheme::World { stroke_width } => {
                world_style(*stroke_width, self.hovered == Some(index))
            }
            BoundaryTheme::Story(rule) => rule.style_for(&country.name),
        })
    }

    /// Countries in draw order with their current paint.
    pub fn styled(&self) -> Vec<(&ProjectedCountry, LayerStyle)> {
        let Some(mesh) = self.mesh.as_ref() else {
            return Vec::new();
        };
        mesh.countries
            .iter()
            .enumerate()
            .filter_map(|(i, c)| self.style_for(i).map(|s| (c, s)))
            .collect()
    }
}

impl Layer for BoundaryLayer {
    fn id(&self) -> LayerId {
        self.id
    }

    fn kind(&self) -> LayerKind {
        LayerKind::Boundaries
    }
}

fn triangulate_rings(rings: &[Vec<Vec2>]) -> Vec<Vec2> {
    let mut vertices: Vec<Vec2> = Vec::new();
    let mut coords: Vec<f64> = Vec::new();
    let mut hole_indices: Vec<usize> = Vec::new();

    for (ring_i, ring) in rings.iter().enumerate() {
        if ring_i > 0 {
            hole_indices.push(vertices.len());
        }
        for p in ring {
            coords.push(p.x);
            coords.push(p.y);
            vertices.push(*p);
        }
    }

    if vertices.len() < 3 {
        return Vec::new();
    }

    let indices = match earcut(&coords, &hole_indices, 2) {
        Ok(ix) => ix,
        Err(e) => {
            tracing::debug!(error = ?e, "polygon triangulation failed");
            return Vec::new();
        }
    };
    indices.into_iter().filter_map(|i| vertices.get(i).copied()).collect()
}

fn drop_closing_duplicate(points: &mut Vec<Vec2>) {
    let closed = match (points.first(), points.last()) {
        (Some(first), Some(last)) => points.len() >= 2 && first.distance(*last) < 1e-9,
        _ => false,
    };
    if closed {
        points.pop();
    }
}
