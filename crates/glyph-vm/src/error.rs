use thiserror::Error;

pub type Result<T> = std::result::Result<T, MachineError>;

/// Errors returned when constructing or configuring a [`crate::Machine`].
///
/// Execution itself never fails; these only cover building the initial state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MachineError {
    /// Memory must be a power of two no larger than the 8-bit address space.
    #[error("invalid memory_size={0}; must be a power of two in 1..=256")]
    InvalidMemorySize(usize),

    #[error("origin {origin:#04x} is outside memory of {memory_size} bytes")]
    OriginOutOfRange { origin: u8, memory_size: usize },

    #[error("program image of {len} bytes does not fit at origin {origin:#04x} ({capacity} bytes available)")]
    ImageTooLarge {
        len: usize,
        origin: u8,
        capacity: usize,
    },
}
