/// Bytes of addressable memory
pub const MEMORY_SIZE: usize = 4096;

/// Highest addressable byte
pub const MAX_ADDRESS: u16 = (MEMORY_SIZE - 1) as u16;

/// Where ROMs are loaded into memory and where execution begins.
/// Everything below this is reserved for the interpreter.
pub const PROGRAM_START: u16 = 0x200;

/// The largest ROM that fits between `PROGRAM_START` and the end of memory
pub const MAX_PROGRAM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;

/// Number of V registers
pub const REGISTER_COUNT: usize = 16;

/// Index of the flag register VF
pub const VF: usize = 0xF;

/// Maximum number of nested subroutine calls
pub const STACK_DEPTH: usize = 16;

/// Number of keys on the hexadecimal keypad
pub const KEY_COUNT: usize = 16;

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;
pub const DISPLAY_SIZE: usize = DISPLAY_WIDTH * DISPLAY_HEIGHT;

/// Default CPU cycle time in nanoseconds (500Hz)
pub const CLOCK_SPEED: u64 = 2_000_000;

/// Rate at which the host should call `tick_timers`
pub const TIMER_HZ: u64 = 60;

/// Default number of past states kept for rewinding
pub const MAX_SAVED_STATES: usize = 600;

/// Where the sprite sheet lives in memory
pub const SPRITE_SHEET_START: u16 = 0x000;

/// Bytes per hexadecimal digit sprite
pub const SPRITE_HEIGHT: u16 = 5;

/// # Sprite Sheet
/// Sprites for the hexadecimal digits 0..F, each 8x5 pixels.
/// Only the upper nibble of each byte is used, e.g. for 0:
/// ```text
/// 0xF0  ****
/// 0x90  *  *
/// 0x90  *  *
/// 0x90  *  *
/// 0xF0  ****
/// ```
pub const SPRITE_SHEET: [u8; 80] = [
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
