use foundation::time::Time;

/// Deterministic frame metadata.
///
/// Animations (overlay appear effects, hover growth) are sampled against
/// `time`, so a recorded frame sequence replays identically.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Fixed delta time (seconds).
    pub dt_s: f64,
    /// Engine time at the start of the frame (seconds).
    pub time: Time,
}

impl Frame {
    pub fn new(index: u64, dt_s: f64) -> Self {
        Self {
            index,
            dt_s,
            time: Time(index as f64 * dt_s),
        }
    }

    /// The frame active on mount, at 60 Hz.
    pub fn first() -> Self {
        Self::new(0, 1.0 / 60.0)
    }

    pub fn next(self) -> Self {
        Self::new(self.index + 1, self.dt_s)
    }

    /// Advances until `time` reaches at least `seconds` past this frame.
    pub fn advance_by(self, seconds: f64) -> Self {
        if self.dt_s <= 0.0 {
            return self;
        }
        let steps = (seconds / self.dt_s).ceil().max(0.0) as u64;
        Self::new(self.index + steps, self.dt_s)
    }
}

#[cfg(test)]
mod tests {
    use super::Frame;
    use foundation::time::Time;

    #[test]
    fn first_frame_runs_at_sixty_hertz() {
        let f = Frame::first();
        assert_eq!(f.index, 0);
        assert_eq!(f.time, Time::ZERO);
        assert_eq!(f.next().time, Time(1.0 / 60.0));
    }

    #[test]
    fn replayed_frames_land_on_identical_times() {
        let stepped = (0..30).fold(Frame::new(0, 0.1), |f, _| f.next());
        assert_eq!(stepped, Frame::new(30, 0.1));
    }

    #[test]
    fn advance_by_covers_a_whole_tween() {
        let f = Frame::new(0, 0.25).advance_by(0.6);
        assert_eq!(f.index, 3);
        assert!(f.time.0 >= 0.6);
        let frozen = Frame::new(4, 0.0);
        assert_eq!(frozen.advance_by(1.0), frozen);
    }
}
