use crate::foundation::core::Affine;

/// Graphics context handed down a traversal.
///
/// Holds the cumulative user-to-device transform. Each item builds its children's context
/// from its own; the parent's value is never mutated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GraphicsContext {
    /// User-to-device transform in effect at this level.
    pub transform: Affine,
}

impl GraphicsContext {
    /// Context carrying the cumulative device `transform`.
    pub fn new(transform: Affine) -> Self {
        Self { transform }
    }

    /// Context with the identity transform.
    pub fn identity() -> Self {
        Self::new(Affine::IDENTITY)
    }

    /// Context for a child with optional local transform `local`.
    pub fn child(&self, local: Option<Affine>) -> Self {
        match local {
            Some(t) => Self::new(self.transform * t),
            None => *self,
        }
    }
}

impl Default for GraphicsContext {
    fn default() -> Self {
        Self::identity()
    }
}
