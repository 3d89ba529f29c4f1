bitflags::bitflags! {
    /// Validity bits of a display item's cached state.
    ///
    /// `RENDER_VALID` implies `BBOX_VALID`. Traversals report the bits that hold for every
    /// item they visited, so a parent can tell whether its whole subtree is ready.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ItemState: u8 {
        /// The device bounding box is current.
        const BBOX_VALID   = 0b0000_0001;
        /// Render state (device path, resolved paint) is current.
        const RENDER_VALID = 0b0000_0010;
        /// The item is in error; render returns this to abort a multi-tile render batch.
        const INVALID      = 0b0000_0100;
        /// Fully up to date.
        const ALL = Self::BBOX_VALID.bits() | Self::RENDER_VALID.bits();
    }
}

impl ItemState {
    /// Nothing cached.
    pub const NONE: Self = Self::empty();

    /// Both `BBOX_VALID` and `RENDER_VALID` are set.
    pub fn is_complete(self) -> bool {
        self.contains(Self::ALL)
    }
}

bitflags::bitflags! {
    /// Flags passed down a render traversal.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct RenderFlags: u8 {
        /// Do not reuse cached device paths; feed geometry from the source path instead.
        const NO_CACHE = 0b0000_0001;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/display/state.rs"]
mod tests;
