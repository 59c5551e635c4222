//! System memory: a flat byte store addressed by the interpreter.
//!
//! The size is fixed at construction (4096 bytes for the standard machine).
//! Accesses outside `[0, size)` are rejected with
//! [`Error::AddressOutOfBounds`] rather than wrapped: legitimate CHIP-8
//! programs never leave the range, so an out-of-range address means the
//! program (or the interpreter driving it) has gone wrong and the fault
//! should surface.

use crate::error::Error;

/// Builtin hex font, one 4x5 glyph per row. FX29 resolves the glyph for a
/// digit as `digit * 5`, so the table must sit at address 0x000.
const FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// The machine's byte-addressed store.
pub struct Memory {
    bytes: Vec<u8>,
}

impl Memory {
    /// Allocate `size` zeroed bytes and seed the font at address 0x000.
    pub fn new(size: usize) -> Self {
        let mut memory = Self { bytes: vec![0; size] };
        memory.seed_font();
        memory
    }

    /// Read the byte at `address`.
    pub fn read(&self, address: u16) -> Result<u8, Error> {
        self.bytes
            .get(usize::from(address))
            .copied()
            .ok_or(Error::AddressOutOfBounds { address })
    }

    /// Write `value` at `address`.
    pub fn write(&mut self, address: u16, value: u8) -> Result<(), Error> {
        match self.bytes.get_mut(usize::from(address)) {
            Some(cell) => {
                *cell = value;
                Ok(())
            }
            None => Err(Error::AddressOutOfBounds { address }),
        }
    }

    /// Zero every cell and reseed the font, returning the store to its
    /// power-on contents.
    pub fn clear(&mut self) {
        self.bytes.fill(0);
        self.seed_font();
    }

    /// Copy `data` byte-for-byte starting at `start`, stopping at the end
    /// of memory. Returns the number of bytes copied.
    pub fn load(&mut self, start: u16, data: &[u8]) -> usize {
        let start = usize::from(start);
        if start >= self.bytes.len() {
            log::warn!("program load address {start:#06X} is past the end of memory");
            return 0;
        }
        let count = data.len().min(self.bytes.len() - start);
        if count < data.len() {
            log::warn!(
                "program truncated: {} of {} bytes fit below the {:#06X} boundary",
                count,
                data.len(),
                self.bytes.len()
            );
        }
        self.bytes[start..start + count].copy_from_slice(&data[..count]);
        count
    }

    fn seed_font(&mut self) {
        let count = FONT.len().min(self.bytes.len());
        self.bytes[..count].copy_from_slice(&FONT[..count]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_back_written_byte() {
        let mut memory = Memory::new(4096);
        memory.write(0x200, 0xAB).unwrap();
        assert_eq!(memory.read(0x200).unwrap(), 0xAB);
    }

    #[test]
    fn rejects_out_of_range_access() {
        let mut memory = Memory::new(4096);
        assert_eq!(
            memory.read(0x1000),
            Err(Error::AddressOutOfBounds { address: 0x1000 })
        );
        assert_eq!(
            memory.write(0x1000, 0xFF),
            Err(Error::AddressOutOfBounds { address: 0x1000 })
        );
    }

    #[test]
    fn seeds_font_at_zero() {
        let memory = Memory::new(4096);
        // First row of the '0' glyph and first row of the 'F' glyph.
        assert_eq!(memory.read(0x000).unwrap(), 0xF0);
        assert_eq!(memory.read(0x04B).unwrap(), 0xF0);
    }

    #[test]
    fn clear_restores_power_on_contents() {
        let mut memory = Memory::new(4096);
        memory.write(0x300, 0x55).unwrap();
        memory.write(0x000, 0xAA).unwrap();
        memory.clear();
        assert_eq!(memory.read(0x300).unwrap(), 0);
        // The font comes back with the wipe.
        assert_eq!(memory.read(0x000).unwrap(), 0xF0);
    }

    #[test]
    fn load_copies_at_start_address() {
        let mut memory = Memory::new(4096);
        let copied = memory.load(0x200, &[0x60, 0x05, 0x70, 0x03]);
        assert_eq!(copied, 4);
        assert_eq!(memory.read(0x200).unwrap(), 0x60);
        assert_eq!(memory.read(0x203).unwrap(), 0x03);
    }

    #[test]
    fn load_truncates_at_memory_end() {
        let mut memory = Memory::new(4096);
        let oversized = vec![0xAA; 5000];
        let copied = memory.load(0x200, &oversized);
        assert_eq!(copied, 4096 - 0x200);
        assert_eq!(memory.read(0xFFF).unwrap(), 0xAA);
    }

    #[test]
    fn load_past_end_copies_nothing() {
        let mut memory = Memory::new(128);
        assert_eq!(memory.load(0x200, &[1, 2, 3]), 0);
    }
}
