#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub u64);

pub trait Layer {
    fn id(&self) -> LayerId;

    fn visible(&self) -> bool;

    fn set_visible(&mut self, visible: bool);
}
