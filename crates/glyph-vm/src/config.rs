use crate::error::{MachineError, Result};

/// Largest supported memory; both the program counter and data addresses are one byte.
pub const MAX_MEMORY_SIZE: usize = 256;

/// Configuration for a [`crate::Machine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachineConfig {
    /// Memory size in bytes.
    ///
    /// Must be a power of two in `1..=256`. Data addresses are taken modulo this size,
    /// while instruction fetch at or beyond it halts the machine.
    pub memory_size: usize,
    /// Address the program image is copied to. The program counter starts here.
    pub origin: u8,
    /// Upper bound on the number of instructions a single [`crate::Machine::run`] may
    /// execute.
    ///
    /// `None` (the default) runs until the program halts, however long that takes. A limit
    /// is a host-side safety net for tests and untrusted programs; hitting it returns
    /// [`crate::RunExit::StepLimit`] without touching machine state, so the run can be
    /// resumed.
    pub max_steps: Option<u64>,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            memory_size: MAX_MEMORY_SIZE,
            origin: 0,
            max_steps: None,
        }
    }
}

impl MachineConfig {
    pub fn with_memory_size(mut self, memory_size: usize) -> Self {
        self.memory_size = memory_size;
        self
    }

    pub fn with_origin(mut self, origin: u8) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.memory_size == 0
            || self.memory_size > MAX_MEMORY_SIZE
            || !self.memory_size.is_power_of_two()
        {
            return Err(MachineError::InvalidMemorySize(self.memory_size));
        }
        if usize::from(self.origin) >= self.memory_size {
            return Err(MachineError::OriginOutOfRange {
                origin: self.origin,
                memory_size: self.memory_size,
            });
        }
        Ok(())
    }

    /// Number of image bytes that fit between the origin and the end of memory.
    pub fn image_capacity(&self) -> usize {
        self.memory_size.saturating_sub(usize::from(self.origin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = MachineConfig::default();
        config.validate().unwrap();
        assert_eq!(config.image_capacity(), 256);
    }

    #[test]
    fn memory_size_must_be_power_of_two_within_address_space() {
        for bad in [0usize, 3, 100, 512] {
            assert_eq!(
                MachineConfig::default().with_memory_size(bad).validate(),
                Err(MachineError::InvalidMemorySize(bad))
            );
        }
        for good in [1usize, 2, 64, 256] {
            MachineConfig::default()
                .with_memory_size(good)
                .validate()
                .unwrap();
        }
    }

    #[test]
    fn origin_must_lie_inside_memory() {
        let config = MachineConfig::default()
            .with_memory_size(16)
            .with_origin(16);
        assert_eq!(
            config.validate(),
            Err(MachineError::OriginOutOfRange {
                origin: 16,
                memory_size: 16
            })
        );
        assert_eq!(config.with_origin(4).image_capacity(), 12);
    }
}
