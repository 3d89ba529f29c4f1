use crate::display::item::ItemId;

/// Convenience result type used across the arena.
pub type ArenaResult<T> = Result<T, ArenaError>;

/// Top-level error taxonomy for structural arena operations.
///
/// Traversals (`update`, `render`, `clip`, `pick`) never fail with this type: incomplete
/// geometry or style is reported through [`crate::ItemState`] bits instead.
#[derive(thiserror::Error, Debug)]
pub enum ArenaError {
    /// Invalid user-provided data (options, styles, geometry).
    #[error("validation error: {0}")]
    Validation(String),

    /// The id does not name a live item of this arena.
    #[error("unknown item: {0:?}")]
    UnknownItem(ItemId),

    /// The item exists but is not of the kind the operation needs.
    #[error("wrong item kind: {item:?} is not a {expected}")]
    WrongKind {
        /// Offending item.
        item: ItemId,
        /// Kind the operation expected.
        expected: &'static str,
    },

    /// Tree surgery that would break ownership (cycles, double parents).
    #[error("structure error: {0}")]
    Structure(String),

    /// Drawing backend setup failures.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ArenaError {
    /// Build an [`ArenaError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build an [`ArenaError::Structure`] value.
    pub fn structure(msg: impl Into<String>) -> Self {
        Self::Structure(msg.into())
    }

    /// Build an [`ArenaError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build an [`ArenaError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
