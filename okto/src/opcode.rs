//! Decoding of 16-bit CHIP-8 instruction words.
//!
//! Every instruction is two bytes, big-endian. Behavior is selected by the
//! top nibble plus, for some families, a discriminant in the low nibble or
//! low byte; the remaining nibbles carry operands:
//!
//! - `_X__`: the register VX, or the upper bound of a V0..=VX range
//! - `__Y_`: the register VY
//! - `___N`: a 4-bit immediate (sprite height)
//! - `__NN`: an 8-bit immediate
//! - `_NNN`: a 12-bit address

use std::fmt;

/// A fetched instruction word, decoded field by field on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode(u16);

impl Opcode {
    /// Combine the two bytes at PC and PC+1 into an instruction word.
    pub fn from_bytes(hi: u8, lo: u8) -> Self {
        Self(u16::from(hi) << 8 | u16::from(lo))
    }

    /// The raw instruction word.
    pub fn word(self) -> u16 {
        self.0
    }

    /// The top nibble, selecting the instruction family.
    pub fn family(self) -> u8 {
        (self.0 >> 12) as u8
    }

    /// The `_X__` register index, widened for direct indexing.
    pub fn x(self) -> usize {
        usize::from(self.0 >> 8 & 0xF)
    }

    /// The `__Y_` register index, widened for direct indexing.
    pub fn y(self) -> usize {
        usize::from(self.0 >> 4 & 0xF)
    }

    /// The `___N` nibble.
    pub fn n(self) -> u8 {
        (self.0 & 0xF) as u8
    }

    /// The `__NN` byte.
    pub fn nn(self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    /// The `_NNN` address.
    pub fn nnn(self) -> u16 {
        self.0 & 0xFFF
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}", self.0)
    }
}

impl From<u16> for Opcode {
    fn from(word: u16) -> Self {
        Self(word)
    }
}
