const DEPTH: usize = 256;

/// Fixed 256-entry byte stack shared by the `,` register alias and call/return.
///
/// `top` is the next free slot and grows upward. Both directions wrap modulo the
/// capacity: pushing a 257th value overwrites the first, and popping an empty stack reads
/// the last slot. There is no fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stack {
    data: [u8; DEPTH],
    top: u8,
}

impl Default for Stack {
    fn default() -> Self {
        Self {
            data: [0; DEPTH],
            top: 0,
        }
    }
}

impl Stack {
    pub fn push(&mut self, value: u8) {
        self.data[usize::from(self.top)] = value;
        self.top = self.top.wrapping_add(1);
    }

    pub fn pop(&mut self) -> u8 {
        self.top = self.top.wrapping_sub(1);
        self.data[usize::from(self.top)]
    }

    /// Value the next [`Stack::pop`] would return, without popping it.
    pub fn peek(&self) -> u8 {
        self.data[usize::from(self.top.wrapping_sub(1))]
    }

    /// Index of the next free slot. Equals the number of live entries as long as the stack
    /// has not wrapped.
    pub fn top(&self) -> u8 {
        self.top
    }

    pub fn is_empty(&self) -> bool {
        self.top == 0
    }

    /// Live entries, bottom first.
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..usize::from(self.top)]
    }

    pub fn clear(&mut self) {
        self.data.fill(0);
        self.top = 0;
    }
}
