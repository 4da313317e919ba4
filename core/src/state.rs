use crate::constants::{DISPLAY_HEIGHT, DISPLAY_SIZE, DISPLAY_WIDTH, PROGRAM_START, REGISTER_COUNT};
use crate::memory::Memory;
use crate::stack::Stack;

/// The FrameBuffer is indexed as [y][x]
pub type FrameBuffer = [[bool; DISPLAY_WIDTH]; DISPLAY_HEIGHT];

/// A snapshot of the Chip8 internal state
///
/// ## CPU
/// Registers
/// - (v) 16 primary 8-bit registers (V0..VF)
///     - the first 15 (V0..VE) are general purpose registers
///     - the 16th (VF) doubles as the carry, borrow and collision flag
/// - (i) a 16-bit memory address register
///
/// Counter
/// - (pc) a 16-bit program counter pointing at the next instruction
///
/// Timers
/// - 2 8-bit timers (delay & sound) counting down towards 0 at 60Hz
///
/// ## Memory
/// - a stack of up to 16 return addresses
/// - 4096 bytes of addressable memory
/// - 64x32 frame buffer
///
/// ## Input
/// - emulation halts while `awaiting_key` names the register that receives
///   the next key press
///
/// Instructions never mutate a State in place; they build the next one from
/// the current one, so a failing instruction leaves the machine untouched.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct State {
    pub v: [u8; REGISTER_COUNT],
    pub i: u16,
    pub pc: u16,
    pub stack: Stack,
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub memory: Memory,
    pub frame_buffer: FrameBuffer,
    pub draw_flag: bool,
    pub awaiting_key: Option<u8>,
}

impl State {
    /// Power-on state: sprite sheet in memory, everything else zeroed and the
    /// pc pointing at the start of the program
    pub fn new() -> Self {
        State {
            v: [0; REGISTER_COUNT],
            i: 0,
            pc: PROGRAM_START,
            stack: Stack::new(),
            delay_timer: 0,
            sound_timer: 0,
            memory: Memory::new(),
            frame_buffer: blank_frame(),
            draw_flag: false,
            awaiting_key: None,
        }
    }

    /// The frame buffer flattened row by row
    pub fn display_buffer(&self) -> [bool; DISPLAY_SIZE] {
        let mut pixels = [false; DISPLAY_SIZE];
        for (row, chunk) in self.frame_buffer.iter().zip(pixels.chunks_mut(DISPLAY_WIDTH)) {
            chunk.copy_from_slice(row);
        }
        pixels
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

/// A frame with every pixel unlit
pub fn blank_frame() -> FrameBuffer {
    [[false; DISPLAY_WIDTH]; DISPLAY_HEIGHT]
}
