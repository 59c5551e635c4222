//! Faults that can surface from a [`crate::Chip8`] step.
//!
//! All of these are fatal to the running program: the machine makes no
//! attempt to continue past them, and the host decides whether to halt,
//! reset, or drop the instance.

/// An architectural fault raised while executing a CHIP-8 program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The fetched instruction word is not in the CHIP-8 opcode table.
    ///
    /// This includes 0NNN machine-code calls, which target a host CPU this
    /// machine does not model.
    #[error("unknown opcode {opcode:#06X} at {pc:#06X}")]
    UnknownOpcode { opcode: u16, pc: u16 },

    /// A 2NNN call was executed with the call stack already full.
    #[error("call stack overflow at {pc:#06X}")]
    StackOverflow { pc: u16 },

    /// A 00EE return was executed with no active subroutine call.
    #[error("return with empty call stack at {pc:#06X}")]
    StackUnderflow { pc: u16 },

    /// A memory access landed outside `[0, memory size)`.
    #[error("memory access out of bounds at address {address:#06X}")]
    AddressOutOfBounds { address: u16 },
}
