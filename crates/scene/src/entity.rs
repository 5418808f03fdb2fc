use foundation::handles::Handle;

/// Feature handle. The generation changes whenever the owning `World` is cleared,
/// so ids from a previous render never resolve.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureId(pub Handle);

impl FeatureId {
    pub fn index(&self) -> u32 {
        self.0.index()
    }

    pub fn generation(&self) -> u32 {
        self.0.generation()
    }
}
