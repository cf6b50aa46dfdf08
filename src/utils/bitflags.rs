/// Bit tests on raw register values.
pub trait BitflagsExt {
    /// Whether every bit of `mask` is set.
    fn contains(self, mask: Self) -> bool;
}

impl BitflagsExt for u8 {
    fn contains(self, mask: Self) -> bool {
        self & mask == mask
    }
}
