/// Planar point/vector. Screen and projected map coordinates both use it.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

/// A position in pixel space.
pub type ScreenPoint = Vec2;

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance; hover and hit radii are compared against it.
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Projection math yields NaN/inf at the antimeridian and poles.
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

macro_rules! componentwise {
    ($trait:ident, $method:ident, $op:tt) => {
        impl std::ops::$trait for Vec2 {
            type Output = Vec2;

            fn $method(self, rhs: Vec2) -> Vec2 {
                Vec2::new(self.x $op rhs.x, self.y $op rhs.y)
            }
        }
    };
}

componentwise!(Add, add, +);
componentwise!(Sub, sub, -);

impl std::ops::Mul<f64> for Vec2 {
    type Output = Vec2;

    fn mul(self, k: f64) -> Vec2 {
        Vec2::new(self.x * k, self.y * k)
    }
}
