use foundation::Aabb2;
use foundation::math::Vec2;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: Vec2, radius: f64) -> Self {
        Self { center, radius }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.distance(self.center) <= self.radius
    }
}

/// Deterministic hit-testing against shapes in draw order.
///
/// Ordering contract: shapes later in the slice are drawn on top, so the
/// highest index containing the point wins.
pub fn topmost_circle(circles: &[Circle], p: Vec2) -> Option<usize> {
    circles.iter().rposition(|c| c.contains(p))
}

pub fn topmost_rect(rects: &[Aabb2], p: Vec2) -> Option<usize> {
    rects.iter().rposition(|r| r.contains(p))
}

/// Even-odd test against one ring. The ring may or may not repeat its first
/// vertex.
pub fn point_in_ring(p: Vec2, ring: &[Vec2]) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (ring[i], ring[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Even-odd across every ring, so holes punch out of their outer ring.
pub fn point_in_polygon(p: Vec2, rings: &[Vec<Vec2>]) -> bool {
    rings.iter().filter(|r| point_in_ring(p, r)).count() % 2 == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64, size: f64) -> Vec<Vec2> {
        vec![
            Vec2::new(x0, y0),
            Vec2::new(x0 + size, y0),
            Vec2::new(x0 + size, y0 + size),
            Vec2::new(x0, y0 + size),
            Vec2::new(x0, y0),
        ]
    }

    #[test]
    fn later_circles_win_overlaps() {
        let circles = [
            Circle::new(Vec2::new(0.0, 0.0), 5.0),
            Circle::new(Vec2::new(3.0, 0.0), 5.0),
        ];
        assert_eq!(topmost_circle(&circles, Vec2::new(1.0, 0.0)), Some(1));
        assert_eq!(topmost_circle(&circles, Vec2::new(-4.0, 0.0)), Some(0));
        assert_eq!(topmost_circle(&circles, Vec2::new(0.0, 9.0)), None);
    }

    #[test]
    fn circle_edge_counts_as_inside() {
        assert!(Circle::new(Vec2::ZERO, 7.0).contains(Vec2::new(7.0, 0.0)));
    }

    #[test]
    fn rects_pick_topmost() {
        let rects = [
            Aabb2::new([0.0, 0.0], [10.0, 10.0]),
            Aabb2::new([5.0, 5.0], [15.0, 15.0]),
        ];
        assert_eq!(topmost_rect(&rects, Vec2::new(6.0, 6.0)), Some(1));
        assert_eq!(topmost_rect(&rects, Vec2::new(1.0, 1.0)), Some(0));
    }

    #[test]
    fn polygon_with_hole() {
        let rings = vec![square(0.0, 0.0, 10.0), square(4.0, 4.0, 2.0)];
        assert!(point_in_polygon(Vec2::new(1.0, 1.0), &rings));
        assert!(!point_in_polygon(Vec2::new(5.0, 5.0), &rings));
        assert!(!point_in_polygon(Vec2::new(11.0, 5.0), &rings));
    }

    #[test]
    fn degenerate_ring_contains_nothing() {
        let ring = vec![Vec2::ZERO, Vec2::new(1.0, 1.0)];
        assert!(!point_in_ring(Vec2::new(0.5, 0.5), &ring));
    }
}
