use crate::config::MachineConfig;
use crate::error::{MachineError, Result};

/// Flat byte memory holding code and data together.
///
/// The size is a power of two, so data addresses wrap with a mask. Instruction fetch goes
/// through [`Memory::fetch`] instead, which reports the end of memory rather than wrapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    bytes: Vec<u8>,
    mask: usize,
}

impl Memory {
    pub fn new(config: &MachineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            bytes: vec![0; config.memory_size],
            mask: config.memory_size - 1,
        })
    }

    /// Zeroes memory and copies `image` to `origin`.
    pub fn load_image(&mut self, origin: u8, image: &[u8]) -> Result<()> {
        let start = usize::from(origin);
        let capacity = self.bytes.len().saturating_sub(start);
        if image.len() > capacity {
            return Err(MachineError::ImageTooLarge {
                len: image.len(),
                origin,
                capacity,
            });
        }
        self.bytes.fill(0);
        self.bytes[start..start + image.len()].copy_from_slice(image);
        Ok(())
    }

    pub fn read(&self, addr: u8) -> u8 {
        self.bytes[usize::from(addr) & self.mask]
    }

    pub fn write(&mut self, addr: u8, value: u8) {
        self.bytes[usize::from(addr) & self.mask] = value;
    }

    /// Instruction fetch. `None` once `pc` is at or past the end of memory.
    pub fn fetch(&self, pc: usize) -> Option<u8> {
        self.bytes.get(pc).copied()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_addresses_wrap_modulo_size() {
        let mut mem = Memory::new(&MachineConfig::default().with_memory_size(16)).unwrap();
        mem.write(0x13, 7);
        assert_eq!(mem.read(0x03), 7);
        assert_eq!(mem.as_slice()[3], 7);
    }

    #[test]
    fn fetch_stops_at_end_of_memory() {
        let mem = Memory::new(&MachineConfig::default().with_memory_size(4)).unwrap();
        assert_eq!(mem.fetch(3), Some(0));
        assert_eq!(mem.fetch(4), None);
    }

    #[test]
    fn image_must_fit_after_origin() {
        let mut mem = Memory::new(&MachineConfig::default().with_memory_size(8)).unwrap();
        mem.load_image(4, b"abcd").unwrap();
        assert_eq!(&mem.as_slice()[4..], b"abcd");
        assert_eq!(
            mem.load_image(5, b"abcd"),
            Err(MachineError::ImageTooLarge {
                len: 4,
                origin: 5,
                capacity: 3
            })
        );
    }
}
