use foundation::{Time, TimeSpan};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Easing {
    Linear,
    /// d3's default transition easing.
    CubicInOut,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::CubicInOut => {
                let t2 = t * 2.0;
                if t2 <= 1.0 {
                    t2 * t2 * t2 / 2.0
                } else {
                    let u = t2 - 2.0;
                    (u * u * u + 2.0) / 2.0
                }
            }
        }
    }
}

/// One scalar animated from `from` to `to` over `span`.
///
/// Holds no callbacks: the value is a pure function of the sample time, so a
/// tween that has finished simply keeps returning `to`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Tween {
    pub span: TimeSpan,
    pub from: f64,
    pub to: f64,
    pub easing: Easing,
}

impl Tween {
    pub fn new(span: TimeSpan, from: f64, to: f64) -> Self {
        Self {
            span,
            from,
            to,
            easing: Easing::CubicInOut,
        }
    }

    /// Holds `value` for all time.
    pub fn constant(value: f64) -> Self {
        Self::new(TimeSpan::instant(Time(f64::NEG_INFINITY)), value, value)
    }

    /// Grows from zero starting `delay_s` after `start`.
    pub fn appear(start: Time, delay_s: f64, duration_s: f64, to: f64) -> Self {
        Self::new(TimeSpan::starting_at(start.offset(delay_s), duration_s), 0.0, to)
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn value_at(&self, t: Time) -> f64 {
        let p = self.easing.apply(self.span.progress(t));
        self.from + (self.to - self.from) * p
    }

    pub fn is_finished(&self, t: Time) -> bool {
        self.span.is_finished(t)
    }
}
