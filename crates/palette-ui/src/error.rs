use thiserror::Error;

/// Contract violations reported by palette operations.
///
/// None of these are runtime faults: each one means the caller broke a
/// documented precondition.
#[derive(Debug, Error)]
pub enum PaletteError {
    /// A menu item index outside `0..menu_item_count()`.
    #[error("menu item index {index} out of range (palette has {count} items)")]
    OutOfRange { index: usize, count: usize },

    /// An unrecognized property name or an unusable property value.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// Configuration text could not be parsed.
    #[error("invalid palette configuration: {0}")]
    Config(#[from] toml::de::Error),
}

impl PaletteError {
    pub(crate) fn invariant(msg: impl Into<String>) -> Self {
        PaletteError::InvariantViolation(msg.into())
    }
}
