use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while loading or running a ROM.
///
/// Only `UnknownOpcode` is recoverable: the program counter has already moved
/// past the offending instruction and the machine keeps running. Every other
/// variant halts the machine until it is reset or a new ROM is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("memory access of {len} byte(s) at {addr:#05X} is out of range")]
    OutOfRange { addr: usize, len: usize },

    #[error("program is {size} bytes but at most {max} fit in memory")]
    ProgramTooLarge { size: usize, max: usize },

    #[error("cannot fetch an instruction at {pc:#05X}")]
    InvalidFetch { pc: u16 },

    #[error("unknown opcode {opcode:04X} at {pc:#05X}")]
    UnknownOpcode { opcode: u16, pc: u16 },

    #[error("call at {pc:#05X} exceeds the maximum stack depth")]
    StackOverflow { pc: u16 },

    #[error("return at {pc:#05X} with an empty stack")]
    StackUnderflow { pc: u16 },

    #[error("machine is halted after a fatal error")]
    Halted,

    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

impl Error {
    /// Whether the machine must stop executing after this error
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::UnknownOpcode { .. })
    }
}
