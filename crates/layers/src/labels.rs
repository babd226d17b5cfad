//! Marker label geometry and collision culling.
//!
//! Labels are anchored at the middle of their baseline, like SVG text with
//! `text-anchor: middle`. Sizes come from a fixed per-character estimate
//! since no font metrics are available to the engine.

use std::collections::HashSet;

use foundation::Aabb2;
use foundation::math::{ScreenPoint, Vec2, stable_total_cmp_f64};
use scene::{Viewport, ZoomTransform};

use crate::markers::RenderedMarker;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LabelLayoutConfig {
    pub viewport: Viewport,
    pub cell_px: f64,
    pub padding_px: f64,
    pub max_labels: usize,
}

impl LabelLayoutConfig {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            cell_px: 16.0,
            padding_px: 2.0,
            max_labels: 400,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLabel {
    /// Index into the marker slice the layout ran over.
    pub marker_index: usize,
    pub text: String,
    pub screen_pos: ScreenPoint,
    pub size_px: [f64; 2],
}

pub fn estimate_text_size(text: &str, font_px: f64) -> [f64; 2] {
    let count = text.chars().count().max(1) as f64;
    [font_px * 0.6 * count, font_px]
}

/// Screen box of a label drawn at `anchor` (baseline middle).
pub fn label_bounds(text: &str, font_px: f64, anchor: ScreenPoint) -> Aabb2 {
    let [w, h] = estimate_text_size(text, font_px);
    Aabb2::new([anchor.x - w * 0.5, anchor.y - h], [anchor.x + w * 0.5, anchor.y])
}

/// Screen box of a marker's label under `zoom`.
pub fn marker_label_bounds(marker: &RenderedMarker, zoom: &ZoomTransform) -> Aabb2 {
    label_bounds(
        &marker.label.text,
        marker.label.font_px * zoom.k,
        zoom.apply(marker.label_pos),
    )
}

/// Greedy placement: higher prevalence first, ties keep draw order. A label
/// is dropped when its padded box touches an occupied grid cell or lies
/// entirely outside the viewport.
pub fn layout_labels(
    markers: &[RenderedMarker],
    zoom: &ZoomTransform,
    config: LabelLayoutConfig,
) -> Vec<PlacedLabel> {
    let mut order: Vec<usize> = (0..markers.len()).collect();
    order.sort_by(|&a, &b| stable_total_cmp_f64(markers[b].prevalence, markers[a].prevalence));

    let mut out = Vec::new();
    let mut occupied: HashSet<u64> = HashSet::new();

    for index in order {
        if out.len() >= config.max_labels {
            break;
        }
        let marker = &markers[index];
        let anchor = zoom.apply(marker.label_pos);
        if !anchor.is_finite() {
            continue;
        }

        let font_px = marker.label.font_px * zoom.k;
        let size = estimate_text_size(&marker.label.text, font_px);
        let half_w = size[0] * 0.5 + config.padding_px;
        let half_h = size[1] * 0.5 + config.padding_px;
        let center = Vec2::new(anchor.x, anchor.y - size[1] * 0.5);

        if center.x + half_w < 0.0
            || center.y + half_h < 0.0
            || center.x - half_w > config.viewport.width
            || center.y - half_h > config.viewport.height
        {
            continue;
        }

        if !try_place_label(&mut occupied, center, [half_w, half_h], config.cell_px) {
            continue;
        }

        out.push(PlacedLabel {
            marker_index: index,
            text: marker.label.text.clone(),
            screen_pos: anchor,
            size_px: size,
        });
    }

    out.sort_by_key(|l| l.marker_index);
    out
}

fn try_place_label(
    occupied: &mut HashSet<u64>,
    center: Vec2,
    half_size: [f64; 2],
    cell_px: f64,
) -> bool {
    let min_x = ((center.x - half_size[0]) / cell_px).floor() as i32;
    let max_x = ((center.x + half_size[0]) / cell_px).floor() as i32;
    let min_y = ((center.y - half_size[1]) / cell_px).floor() as i32;
    let max_y = ((center.y + half_size[1]) / cell_px).floor() as i32;

    for cy in min_y..=max_y {
        for cx in min_x..=max_x {
            if occupied.contains(&cell_key(cx, cy)) {
                return false;
            }
        }
    }

    for cy in min_y..=max_y {
        for cx in min_x..=max_x {
            occupied.insert(cell_key(cx, cy));
        }
    }

    true
}

fn cell_key(cx: i32, cy: i32) -> u64 {
    ((cx as u64) << 32) ^ (cy as u32 as u64)
}
