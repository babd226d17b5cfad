/// Time primitives
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
pub struct Time(pub f64); // seconds

impl Time {
    pub const ZERO: Time = Time(0.0);

    pub fn offset(self, seconds: f64) -> Self {
        Time(self.0 + seconds)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TimeSpan {
    pub start: Time,
    pub end: Time,
}

impl TimeSpan {
    pub fn instant(t: Time) -> Self {
        Self { start: t, end: t }
    }

    pub fn starting_at(start: Time, duration_s: f64) -> Self {
        Self {
            start,
            end: start.offset(duration_s.max(0.0)),
        }
    }

    pub fn duration(&self) -> f64 {
        (self.end.0 - self.start.0).max(0.0)
    }

    /// Linear progress of `t` through the span, clamped to `[0, 1]`.
    ///
    /// Zero-length spans jump straight from 0 to 1 at `start`.
    pub fn progress(&self, t: Time) -> f64 {
        if t.0 < self.start.0 {
            return 0.0;
        }
        let d = self.duration();
        if d <= 0.0 {
            return 1.0;
        }
        ((t.0 - self.start.0) / d).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self, t: Time) -> bool {
        t.0 >= self.end.0
    }
}

#[cfg(test)]
mod tests {
    use super::{Time, TimeSpan};

    #[test]
    fn progress_is_clamped() {
        let span = TimeSpan::starting_at(Time(1.0), 2.0);
        assert_eq!(span.progress(Time(0.0)), 0.0);
        assert_eq!(span.progress(Time(2.0)), 0.5);
        assert_eq!(span.progress(Time(9.0)), 1.0);
        assert!(span.is_finished(Time(3.0)));
    }

    #[test]
    fn instant_span_completes_at_start() {
        let span = TimeSpan::instant(Time(2.0));
        assert_eq!(span.progress(Time(1.9)), 0.0);
        assert_eq!(span.progress(Time(2.0)), 1.0);
    }
}
