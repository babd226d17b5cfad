/// Identity of a layer within one map surface.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct LayerId(pub u64);

/// What a layer draws. Surfaces paint in this order, bottom to top.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LayerKind {
    Boundaries,
    Markers,
    Overlay,
}

pub trait Layer {
    fn id(&self) -> LayerId;
    fn kind(&self) -> LayerKind;
}
