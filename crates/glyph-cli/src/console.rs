//! Console device wired to the machine's port hooks.
//!
//! | port | write (`)`)                     | read (`(`)                     |
//! |------|---------------------------------|--------------------------------|
//! | `c`  | byte to stdout, flushed         | next byte of stdin, 0 at EOF   |
//! | `e`  | byte to stderr, flushed         | -                              |
//! | `X`  | flush, exit with the byte value | -                              |
//!
//! Other ports are plain storage.

use std::io::{self, Read, Write};

use glyph_vm::{PortBank, PortHooks};
use tracing::{debug, trace};

pub const PORT_CONSOLE: u8 = b'c';
pub const PORT_ERROR: u8 = b'e';
pub const PORT_EXIT: u8 = b'X';

pub struct Console<R, W, E> {
    input: R,
    output: W,
    error: E,
    exit: Box<dyn FnMut(u8)>,
    /// First host I/O failure. Hooks cannot return errors, so it is reported by
    /// [`Console::finish`].
    failure: Option<io::Error>,
}

impl<R: Read, W: Write, E: Write> Console<R, W, E> {
    /// `exit` runs, after both outputs are flushed, when the program writes the exit port.
    pub fn new(input: R, output: W, error: E, exit: impl FnMut(u8) + 'static) -> Self {
        Self {
            input,
            output,
            error,
            exit: Box::new(exit),
            failure: None,
        }
    }

    /// Flushes both output streams and returns the first I/O error seen during the run.
    pub fn finish(&mut self) -> io::Result<()> {
        self.flush_outputs();
        match self.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn flush_outputs(&mut self) {
        let res = self.output.flush().and_then(|()| self.error.flush());
        self.record(res);
    }

    fn record(&mut self, res: io::Result<()>) {
        if let Err(err) = res {
            debug!(%err, "console I/O failed");
            self.failure.get_or_insert(err);
        }
    }

    fn read_byte(&mut self) -> u8 {
        let mut buf = [0u8; 1];
        loop {
            match self.input.read(&mut buf) {
                Ok(0) => return 0,
                Ok(_) => return buf[0],
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    self.record(Err(err));
                    return 0;
                }
            }
        }
    }
}

impl<R: Read, W: Write, E: Write> PortHooks for Console<R, W, E> {
    fn emit(&mut self, ports: &mut PortBank, port: u8) {
        let value = ports.read(port);
        match port {
            // Flushed per byte so a prompt is visible before the program blocks on input.
            PORT_CONSOLE => {
                let res = self.output.write_all(&[value]).and_then(|()| self.output.flush());
                self.record(res);
            }
            PORT_ERROR => {
                let res = self.error.write_all(&[value]).and_then(|()| self.error.flush());
                self.record(res);
            }
            PORT_EXIT => {
                debug!(code = value, "exit requested by program");
                self.flush_outputs();
                (self.exit)(value);
            }
            _ => trace!(port, value, "write to unmapped port"),
        }
    }

    fn hear(&mut self, ports: &mut PortBank, port: u8) {
        if port == PORT_CONSOLE {
            let byte = self.read_byte();
            ports.write(port, byte);
        }
    }
}
