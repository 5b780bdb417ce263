/// 256 byte-wide device registers, separate from memory and the register file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortBank {
    values: [u8; 256],
}

impl Default for PortBank {
    fn default() -> Self {
        Self { values: [0; 256] }
    }
}

impl PortBank {
    pub fn read(&self, port: u8) -> u8 {
        self.values[usize::from(port)]
    }

    pub fn write(&mut self, port: u8, value: u8) {
        self.values[usize::from(port)] = value;
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.values
    }

    pub fn clear(&mut self) {
        self.values.fill(0);
    }
}

/// Host side of the port bank.
///
/// Hooks run synchronously inside the instruction that triggered them and only ever see
/// the port bank, never registers or memory. They must not drive the machine themselves.
pub trait PortHooks {
    /// Called after a `)` instruction has stored its value in `ports[port]`.
    fn emit(&mut self, _ports: &mut PortBank, _port: u8) {}

    /// Called before a `(` instruction reads `ports[port]`; the hook may refresh the value.
    fn hear(&mut self, _ports: &mut PortBank, _port: u8) {}
}

/// Hooks that do nothing: port instructions only touch the port bank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoHooks;

impl PortHooks for NoHooks {}

impl<H: PortHooks + ?Sized> PortHooks for &mut H {
    fn emit(&mut self, ports: &mut PortBank, port: u8) {
        (**self).emit(ports, port);
    }

    fn hear(&mut self, ports: &mut PortBank, port: u8) {
        (**self).hear(ports, port);
    }
}

impl<H: PortHooks + ?Sized> PortHooks for Box<H> {
    fn emit(&mut self, ports: &mut PortBank, port: u8) {
        (**self).emit(ports, port);
    }

    fn hear(&mut self, ports: &mut PortBank, port: u8) {
        (**self).hear(ports, port);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Latch {
        emitted: Vec<(u8, u8)>,
    }

    impl PortHooks for Latch {
        fn emit(&mut self, ports: &mut PortBank, port: u8) {
            self.emitted.push((port, ports.read(port)));
        }

        fn hear(&mut self, ports: &mut PortBank, port: u8) {
            ports.write(port, port.wrapping_mul(2));
        }
    }

    fn drive<H: PortHooks>(mut hooks: H, ports: &mut PortBank) {
        ports.write(3, 9);
        hooks.emit(ports, 3);
        hooks.hear(ports, 4);
    }

    #[test]
    fn forwarding_through_mut_ref_reaches_the_device() {
        let mut latch = Latch::default();
        let mut ports = PortBank::default();
        drive(&mut latch, &mut ports);
        assert_eq!(latch.emitted, vec![(3, 9)]);
        assert_eq!(ports.read(4), 8);
    }

    #[test]
    fn boxed_trait_objects_are_hooks() {
        let mut hooks: Box<dyn PortHooks> = Box::new(NoHooks);
        let mut ports = PortBank::default();
        hooks.emit(&mut ports, 0);
        hooks.hear(&mut ports, 0);
        assert!(ports.as_slice().iter().all(|&v| v == 0));
    }
}
