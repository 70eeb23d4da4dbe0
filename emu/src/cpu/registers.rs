use serde::{Deserialize, Serialize};

/// The 16 currently-visible registers.
///
/// Whether an index resolves here or in a banked slot is decided by the
/// processor according to the current mode; this file always holds the
/// User bank for r8-r14.
#[derive(Default, Serialize, Deserialize)]
pub(crate) struct Registers([u32; 16]);

impl Registers {
    pub fn program_counter(&self) -> u32 {
        self.0[15]
    }

    pub fn set_program_counter(&mut self, new_value: u32) {
        self.0[15] = new_value;
    }

    pub const fn register_at(&self, reg: usize) -> u32 {
        self.0[reg]
    }

    pub fn set_register_at(&mut self, reg: usize, new_value: u32) {
        self.0[reg] = new_value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn program_counter_is_r15() {
        let mut registers = Registers::default();
        registers.set_program_counter(4096);
        assert_eq!(registers.register_at(15), 4096);

        registers.set_register_at(15, 8);
        assert_eq!(registers.program_counter(), 8);
    }
}
