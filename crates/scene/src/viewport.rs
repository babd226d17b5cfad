use foundation::math::Vec2;

/// Drawing surface size in pixels. Both sides are strictly positive.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewportError {
    pub width: f64,
    pub height: f64,
}

impl std::fmt::Display for ViewportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "viewport must be positive and finite, got {}x{}",
            self.width, self.height
        )
    }
}

impl std::error::Error for ViewportError {}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        debug_assert!(
            Self::try_new(width, height).is_ok(),
            "invalid viewport {width}x{height}"
        );
        Self { width, height }
    }

    pub fn try_new(width: f64, height: f64) -> Result<Self, ViewportError> {
        let ok = |v: f64| v.is_finite() && v > 0.0;
        if ok(width) && ok(height) {
            Ok(Self { width, height })
        } else {
            Err(ViewportError { width, height })
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    pub fn min_side(&self) -> f64 {
        self.width.min(self.height)
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= 0.0 && p.y >= 0.0 && p.x <= self.width && p.y <= self.height
    }
}

#[cfg(test)]
mod tests {
    use super::Viewport;

    #[test]
    fn rejects_degenerate_sizes() {
        assert!(Viewport::try_new(800.0, 600.0).is_ok());
        assert!(Viewport::try_new(0.0, 600.0).is_err());
        assert!(Viewport::try_new(800.0, -1.0).is_err());
        assert!(Viewport::try_new(f64::INFINITY, 600.0).is_err());
    }

    #[test]
    fn center_is_half_size() {
        let v = Viewport::new(800.0, 600.0);
        assert_eq!(v.center().x, 400.0);
        assert_eq!(v.center().y, 300.0);
        assert_eq!(v.min_side(), 600.0);
    }
}
