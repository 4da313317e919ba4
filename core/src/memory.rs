use std::ops::Range;

use crate::constants::{MEMORY_SIZE, PROGRAM_START, SPRITE_SHEET, SPRITE_SHEET_START};
use crate::error::{Error, Result};

/// # Memory
/// 4096 bytes of addressable memory.
///
/// ```text
/// 0x000-0x04F  sprite sheet
/// 0x050-0x1FF  reserved for the interpreter
/// 0x200-0xFFF  program
/// ```
///
/// Every access is bounds checked; nothing wraps around the end of memory.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Memory([u8; MEMORY_SIZE]);

impl Memory {
    /// Power-on memory: zeroed apart from the sprite sheet
    pub fn new() -> Self {
        let mut bytes = [0; MEMORY_SIZE];
        let start = SPRITE_SHEET_START as usize;
        bytes[start..start + SPRITE_SHEET.len()].copy_from_slice(&SPRITE_SHEET);
        Memory(bytes)
    }

    /// Reads the byte at `addr`
    pub fn read(&self, addr: u16) -> Result<u8> {
        self.0
            .get(addr as usize)
            .copied()
            .ok_or(Error::OutOfRange { addr: addr as usize, len: 1 })
    }

    /// Writes `value` to `addr`
    pub fn write(&mut self, addr: u16, value: u8) -> Result<()> {
        let byte = self
            .0
            .get_mut(addr as usize)
            .ok_or(Error::OutOfRange { addr: addr as usize, len: 1 })?;
        *byte = value;
        Ok(())
    }

    /// Borrows `len` bytes starting at `addr`
    pub fn slice(&self, addr: u16, len: usize) -> Result<&[u8]> {
        let range = Self::range(addr, len)?;
        Ok(&self.0[range])
    }

    /// Mutably borrows `len` bytes starting at `addr`
    pub fn slice_mut(&mut self, addr: u16, len: usize) -> Result<&mut [u8]> {
        let range = Self::range(addr, len)?;
        Ok(&mut self.0[range])
    }

    /// Copies `data` into memory starting at `addr`
    pub fn write_all(&mut self, addr: u16, data: &[u8]) -> Result<()> {
        self.slice_mut(addr, data.len())?.copy_from_slice(data);
        Ok(())
    }

    /// Copies a program in at `PROGRAM_START`
    pub fn load_program(&mut self, program: &[u8]) -> Result<()> {
        self.write_all(PROGRAM_START, program)
    }

    /// The whole address space
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    fn range(addr: u16, len: usize) -> Result<Range<usize>> {
        let start = addr as usize;
        match start.checked_add(len) {
            Some(end) if end <= MEMORY_SIZE => Ok(start..end),
            _ => Err(Error::OutOfRange { addr: start, len }),
        }
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Memory({} bytes)", self.0.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_zeroed_from_program_start() {
        let m = Memory::new();
        // NB. memory below 0x200 holds the sprite sheet
        assert!(m.as_bytes()[PROGRAM_START as usize..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_sprite_sheet_loaded() {
        let m = Memory::new();
        assert_eq!(m.slice(0x0, 5).unwrap(), &[0xF0, 0x90, 0x90, 0x90, 0xF0]);
        assert_eq!(m.slice(0x4B, 5).unwrap(), &[0xF0, 0x80, 0xF0, 0x80, 0x80]);
    }

    #[test]
    fn test_write_all_ok() {
        let mut m = Memory::new();
        m.write_all(0x300, &[0, 1, 2, 3, 4, 5, 6, 7]).unwrap();
        assert_eq!(
            m.slice(0x2F8, 16).unwrap(),
            &[0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4, 5, 6, 7]
        );
    }

    #[test]
    fn test_last_byte_is_addressable() {
        let mut m = Memory::new();
        m.write(0xFFF, 0xAB).unwrap();
        assert_eq!(m.read(0xFFF), Ok(0xAB));
    }

    #[test]
    fn test_read_past_end_fails() {
        let m = Memory::new();
        assert_eq!(m.read(0x1000), Err(Error::OutOfRange { addr: 0x1000, len: 1 }));
        assert_eq!(m.slice(0xFFF, 2), Err(Error::OutOfRange { addr: 0xFFF, len: 2 }));
    }

    #[test]
    fn test_write_too_much_fails_without_writing() {
        let mut m = Memory::new();
        let result = m.write_all(0xFF9, &[0xFF; 8]);
        assert_eq!(result, Err(Error::OutOfRange { addr: 0xFF9, len: 8 }));
        assert!(m.as_bytes()[0xFF9..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_program_load_ok() {
        let mut m = Memory::new();
        m.load_program(&[0x00, 0xE0]).unwrap();
        assert_eq!(m.slice(0x200, 2).unwrap(), &[0x00, 0xE0]);
    }
}
