use crate::frame::Frame;

/// A recorded engine notification.
///
/// `kind` is a stable short tag for logs and assertions; `payload` carries the
/// typed data dependents react to.
#[derive(Debug, Clone, PartialEq)]
pub struct Event<E> {
    pub frame_index: u64,
    pub kind: &'static str,
    pub payload: E,
}

/// Ordered, single-threaded event queue.
///
/// Producers `emit` while handling an input; the host drains once per frame.
#[derive(Debug)]
pub struct EventBus<E> {
    events: Vec<Event<E>>,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self { events: Vec::new() }
    }
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, frame: Frame, kind: &'static str, payload: E) {
        tracing::trace!(frame = frame.index, kind, "event");
        self.events.push(Event {
            frame_index: frame.index,
            kind,
            payload,
        });
    }

    pub fn events(&self) -> &[Event<E>] {
        &self.events
    }

    pub fn last(&self) -> Option<&Event<E>> {
        self.events.last()
    }

    pub fn count_kind(&self, kind: &str) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }

    pub fn drain(&mut self) -> Vec<Event<E>> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::EventBus;
    use crate::frame::Frame;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Zoom {
        Changed(f64),
        Reset,
    }

    #[test]
    fn keeps_emission_order_and_frame() {
        let mut bus = EventBus::new();
        bus.emit(Frame::new(4, 0.1), "zoom.changed", Zoom::Changed(2.0));
        bus.emit(Frame::new(5, 0.1), "zoom.reset", Zoom::Reset);

        let kinds: Vec<_> = bus.events().iter().map(|e| (e.frame_index, e.kind)).collect();
        assert_eq!(kinds, vec![(4, "zoom.changed"), (5, "zoom.reset")]);
        assert_eq!(bus.last().map(|e| e.payload), Some(Zoom::Reset));
    }

    #[test]
    fn drain_hands_over_everything_once() {
        let mut bus = EventBus::new();
        for k in [1.5, 3.0] {
            bus.emit(Frame::first(), "zoom.changed", Zoom::Changed(k));
        }
        assert_eq!(bus.count_kind("zoom.changed"), 2);
        assert_eq!(bus.drain().len(), 2);
        assert!(bus.drain().is_empty());
        assert_eq!(bus.count_kind("zoom.changed"), 0);
    }
}
