/// Generational handle: (index, generation).
///
/// Indices are reused only after a container is cleared, at which point the
/// generation is bumped so stale handles never alias new entries.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u32, u32);

impl Handle {
    pub fn new(index: u32, generation: u32) -> Self {
        Handle(index, generation)
    }

    pub fn index(&self) -> u32 {
        self.0
    }

    pub fn generation(&self) -> u32 {
        self.1
    }
}

#[cfg(test)]
mod tests {
    use super::Handle;

    #[test]
    fn generation_distinguishes_handles() {
        let a = Handle::new(3, 0);
        let b = Handle::new(3, 1);
        assert_eq!(a.index(), b.index());
        assert_ne!(a, b);
    }
}
