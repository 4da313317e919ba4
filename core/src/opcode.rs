use std::fmt;

/// # Opcodes
///
/// Chip-8 opcodes are 16 bits each, stored big-endian. Their behavior is cased
/// on some combination of:
/// - `(n, _, _, _)` broad categorization; applies to all opcodes
/// - `(_, _, _, n)` specific behavior within a category
/// - `(_, _, n, n)` more specific behavior within a category
/// - `(_, n, n, n)` some fixed function that doesn't require variables (e.g. CLS; clear screen)
///
/// Nibbles not used to determine the operation often (but not always) carry important data.
/// - `(_, n, n, n)` a 12-bit address
/// - `(_, _, n, n)` a byte assigned to and/or compared with Vx
/// - `(_, n, _, _)` the register Vx or the range of registers V0..=Vx
/// - `(_, _, n, _)` the register Vy
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Opcode(pub u16);

impl Opcode {
    /// Joins the two bytes of an instruction as they sit in memory
    pub fn from_bytes(high: u8, low: u8) -> Self {
        Opcode(u16::from_be_bytes([high, low]))
    }

    /// The component nibbles, most significant first.
    pub fn nibbles(self) -> (u8, u8, u8, u8) {
        (((self.0 & 0xF000) >> 12) as u8, self.x(), self.y(), self.n())
    }

    /// `[_x__]` as a register index
    pub fn x(self) -> u8 {
        ((self.0 & 0x0F00) >> 8) as u8
    }

    /// `[__y_]` as a register index
    pub fn y(self) -> u8 {
        ((self.0 & 0x00F0) >> 4) as u8
    }

    /// `[___n]`
    pub fn n(self) -> u8 {
        (self.0 & 0x000F) as u8
    }

    /// `[__kk]`
    pub fn kk(self) -> u8 {
        (self.0 & 0x00FF) as u8
    }

    /// `[_nnn]`
    pub fn addr(self) -> u16 {
        self.0 & 0x0FFF
    }

    /// Vx as an index into the register file
    pub fn vx(self) -> usize {
        self.x() as usize
    }

    /// Vy as an index into the register file
    pub fn vy(self) -> usize {
        self.y() as usize
    }
}

impl fmt::Debug for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Opcode({:04X})", self.0)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}", self.0)
    }
}
