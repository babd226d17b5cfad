use foundation::RgbColor;

pub const MAP_BACKGROUND: RgbColor = RgbColor::rgb(0xf0, 0xf9, 0xff);
pub const LAND_FILL: RgbColor = RgbColor::rgb(0xe0, 0xf2, 0xfe);
pub const LAND_HOVER_FILL: RgbColor = RgbColor::rgb(0xba, 0xe6, 0xfd);
pub const LAND_STROKE: RgbColor = RgbColor::rgb(0x94, 0xa3, 0xb8);

pub const STORY_BACKGROUND: RgbColor = RgbColor::rgb(0x0f, 0x17, 0x2a);
pub const STORY_LAND_FILL: RgbColor = RgbColor::rgb(0x1e, 0x29, 0x3b);
pub const STORY_LAND_STROKE: RgbColor = RgbColor::rgb(0x47, 0x55, 0x69);
pub const STORY_HIGHLIGHT: RgbColor = RgbColor::rgb(0x1e, 0x40, 0xaf);
pub const THREAT: RgbColor = RgbColor::rgb(0xdc, 0x26, 0x26);
pub const PROTECTION: RgbColor = RgbColor::rgb(0x10, 0xb9, 0x81);
pub const STORY_MARKER_DEFAULT: RgbColor = RgbColor::rgb(0xef, 0x44, 0x44);

pub const LABEL_INK: RgbColor = RgbColor::rgb(0x1e, 0x29, 0x3b);
pub const WHITE: RgbColor = RgbColor::rgb(0xff, 0xff, 0xff);

/// Paint for one filled, stroked shape.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LayerStyle {
    pub visible: bool,
    pub fill: RgbColor,
    pub stroke: RgbColor,
    pub stroke_width: f64,
    pub opacity: f64,
}

impl LayerStyle {
    pub const fn new(fill: RgbColor, stroke: RgbColor, stroke_width: f64, opacity: f64) -> Self {
        Self {
            visible: true,
            fill,
            stroke,
            stroke_width,
            opacity,
        }
    }
}

impl Default for LayerStyle {
    fn default() -> Self {
        Self::new(LAND_FILL, LAND_STROKE, 0.5, 1.0)
    }
}

/// One translucent ring drawn behind a marker core.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Halo {
    pub radius: f64,
    pub opacity: f64,
}

/// Marker look for one map surface. Sizes are in pixels at zoom 1.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerProfile {
    /// Outermost first.
    pub halos: Vec<Halo>,
    pub core_radius: f64,
    pub hover_radius: f64,
    pub stroke: RgbColor,
    pub stroke_width: f64,
    /// Distance from the point up to the label baseline.
    pub label_offset: f64,
    pub label_font_px: f64,
    pub label_weight: u16,
    pub label_fill: RgbColor,
    pub label_halo_px: f64,
    /// Divide sizes by the zoom scale so markers keep their pixel size.
    pub zoom_compensated: bool,
}

impl MarkerProfile {
    /// The interactive world map.
    pub fn full_map() -> Self {
        Self {
            halos: vec![
                Halo {
                    radius: 20.0,
                    opacity: 0.15,
                },
                Halo {
                    radius: 12.0,
                    opacity: 0.3,
                },
            ],
            core_radius: 7.0,
            hover_radius: 10.0,
            stroke: WHITE,
            stroke_width: 2.5,
            label_offset: 20.0,
            label_font_px: 12.0,
            label_weight: 700,
            label_fill: LABEL_INK,
            label_halo_px: 3.0,
            zoom_compensated: true,
        }
    }

    pub fn mini_map() -> Self {
        Self {
            halos: vec![Halo {
                radius: 15.0,
                opacity: 0.2,
            }],
            core_radius: 6.0,
            hover_radius: 6.0,
            stroke: WHITE,
            stroke_width: 2.0,
            label_offset: 12.0,
            label_font_px: 9.0,
            label_weight: 600,
            label_fill: LABEL_INK,
            label_halo_px: 2.0,
            zoom_compensated: false,
        }
    }

    pub fn story() -> Self {
        Self {
            halos: vec![Halo {
                radius: 20.0,
                opacity: 0.2,
            }],
            core_radius: 8.0,
            hover_radius: 8.0,
            stroke: WHITE,
            stroke_width: 2.0,
            label_offset: 25.0,
            label_font_px: 12.0,
            label_weight: 700,
            label_fill: WHITE,
            label_halo_px: 0.0,
            zoom_compensated: false,
        }
    }

    pub fn glow_radius(&self) -> f64 {
        self.halos
            .iter()
            .map(|h| h.radius)
            .fold(self.core_radius, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_map_profile_matches_marker_contract() {
        let p = MarkerProfile::full_map();
        assert_eq!(p.core_radius, 7.0);
        assert_eq!(p.hover_radius, 10.0);
        assert_eq!(p.glow_radius(), 20.0);
        assert_eq!(p.halos[1].opacity, 0.3);
        assert!(p.zoom_compensated);
    }

    #[test]
    fn fixed_surfaces_do_not_compensate_zoom() {
        assert!(!MarkerProfile::mini_map().zoom_compensated);
        assert!(!MarkerProfile::story().zoom_compensated);
        assert_eq!(MarkerProfile::mini_map().glow_radius(), 15.0);
    }
}
