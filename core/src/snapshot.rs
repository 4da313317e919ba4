//! Flat save-state images.
//!
//! Fields are laid out in a fixed order, 16-bit values big-endian:
//!
//! ```text
//! magic        4     "C8SS"
//! version      1
//! memory       4096
//! v            16
//! i            2
//! pc           2
//! stack depth  1
//! stack        32    all 16 slots
//! frame        2048  one byte per pixel, row-major
//! delay timer  1
//! sound timer  1
//! keys         16    one byte per key
//! awaiting key 1     register index, or 0xFF when not waiting
//! ```

use crate::constants::{DISPLAY_SIZE, DISPLAY_WIDTH, KEY_COUNT, MEMORY_SIZE, REGISTER_COUNT, STACK_DEPTH};
use crate::error::{Error, Result};
use crate::keypad::Keypad;
use crate::memory::Memory;
use crate::stack::Stack;
use crate::state::{blank_frame, State};

pub const SNAPSHOT_MAGIC: &[u8; 4] = b"C8SS";
pub const SNAPSHOT_VERSION: u8 = 1;
pub const SNAPSHOT_LEN: usize = 4
    + 1
    + MEMORY_SIZE
    + REGISTER_COUNT
    + 2
    + 2
    + 1
    + STACK_DEPTH * 2
    + DISPLAY_SIZE
    + 1
    + 1
    + KEY_COUNT
    + 1;

const NOT_AWAITING: u8 = 0xFF;

pub fn encode(state: &State, keypad: &Keypad) -> Vec<u8> {
    let mut buf = Vec::with_capacity(SNAPSHOT_LEN);
    buf.extend_from_slice(SNAPSHOT_MAGIC);
    buf.push(SNAPSHOT_VERSION);
    buf.extend_from_slice(state.memory.as_bytes());
    buf.extend_from_slice(&state.v);
    buf.extend_from_slice(&state.i.to_be_bytes());
    buf.extend_from_slice(&state.pc.to_be_bytes());
    buf.push(state.stack.depth() as u8);
    for slot in state.stack.slots() {
        buf.extend_from_slice(&slot.to_be_bytes());
    }
    buf.extend(state.display_buffer().iter().map(|&lit| lit as u8));
    buf.push(state.delay_timer);
    buf.push(state.sound_timer);
    buf.extend(keypad.keys().iter().map(|&pressed| pressed as u8));
    buf.push(state.awaiting_key.unwrap_or(NOT_AWAITING));
    buf
}

pub fn decode(image: &[u8]) -> Result<(State, Keypad)> {
    if image.len() != SNAPSHOT_LEN {
        return Err(invalid(format!(
            "expected {} bytes, got {}",
            SNAPSHOT_LEN,
            image.len()
        )));
    }
    let mut reader = Reader { image, pos: 0 };

    if reader.take(4) != SNAPSHOT_MAGIC {
        return Err(invalid("bad magic".to_string()));
    }
    let version = reader.byte();
    if version != SNAPSHOT_VERSION {
        return Err(invalid(format!("unsupported version {}", version)));
    }

    let mut memory = Memory::new();
    memory.write_all(0, reader.take(MEMORY_SIZE))?;

    let mut v = [0; REGISTER_COUNT];
    v.copy_from_slice(reader.take(REGISTER_COUNT));
    let i = reader.word();
    let pc = reader.word();

    let depth = reader.byte() as usize;
    let mut slots = [0; STACK_DEPTH];
    for slot in slots.iter_mut() {
        *slot = reader.word();
    }
    let stack = Stack::from_parts(slots, depth)
        .ok_or_else(|| invalid(format!("stack depth {} is too deep", depth)))?;

    let mut frame_buffer = blank_frame();
    for (n, &pixel) in reader.take(DISPLAY_SIZE).iter().enumerate() {
        frame_buffer[n / DISPLAY_WIDTH][n % DISPLAY_WIDTH] = flag(pixel, "pixel")?;
    }

    let delay_timer = reader.byte();
    let sound_timer = reader.byte();

    let mut keypad = Keypad::new();
    for (key, &pressed) in reader.take(KEY_COUNT).iter().enumerate() {
        keypad.set(key as u8, flag(pressed, "key")?)?;
    }

    let awaiting_key = match reader.byte() {
        NOT_AWAITING => None,
        register if (register as usize) < REGISTER_COUNT => Some(register),
        register => return Err(invalid(format!("no register {:#04X} to await a key", register))),
    };

    let state = State {
        v,
        i,
        pc,
        stack,
        delay_timer,
        sound_timer,
        memory,
        frame_buffer,
        draw_flag: true,
        awaiting_key,
    };
    Ok((state, keypad))
}

fn invalid(reason: String) -> Error {
    Error::InvalidSnapshot(reason)
}

fn flag(byte: u8, what: &str) -> Result<bool> {
    match byte {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(invalid(format!("{} byte {:#04X} is not 0 or 1", what, other))),
    }
}

/// Walks a buffer whose length has already been checked
struct Reader<'a> {
    image: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> &'a [u8] {
        let bytes = &self.image[self.pos..self.pos + len];
        self.pos += len;
        bytes
    }

    fn byte(&mut self) -> u8 {
        self.take(1)[0]
    }

    fn word(&mut self) -> u16 {
        let bytes = self.take(2);
        u16::from_be_bytes([bytes[0], bytes[1]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn busy_state() -> (State, Keypad) {
        let mut state = State::new();
        state.memory.write_all(0x200, &[0x12, 0x34, 0x56]).unwrap();
        state.v[0x3] = 0x33;
        state.i = 0x321;
        state.pc = 0x456;
        state.stack = state.stack.push(0x202).unwrap().push(0x304).unwrap();
        state.frame_buffer[4][5] = true;
        state.delay_timer = 9;
        state.sound_timer = 4;
        state.awaiting_key = Some(0x7);
        let mut keypad = Keypad::new();
        keypad.set(0xA, true).unwrap();
        (state, keypad)
    }

    #[test]
    fn test_encoded_length() {
        let (state, keypad) = busy_state();
        assert_eq!(encode(&state, &keypad).len(), SNAPSHOT_LEN);
    }

    #[test]
    fn test_layout_starts_with_header_then_memory() {
        let (state, keypad) = busy_state();
        let image = encode(&state, &keypad);
        assert_eq!(&image[..5], b"C8SS\x01");
        assert_eq!(&image[5 + 0x200..5 + 0x203], &[0x12, 0x34, 0x56]);
        // i then pc, big-endian, straight after the registers
        let regs_end = 5 + MEMORY_SIZE + REGISTER_COUNT;
        assert_eq!(&image[regs_end..regs_end + 4], &[0x03, 0x21, 0x04, 0x56]);
        assert_eq!(image[SNAPSHOT_LEN - 1], 0x7);
    }

    #[test]
    fn test_decode_restores_everything() {
        let (state, keypad) = busy_state();
        let (decoded, decoded_keys) = decode(&encode(&state, &keypad)).unwrap();
        assert_eq!(decoded, State { draw_flag: true, ..state });
        assert_eq!(decoded_keys, keypad);
    }

    #[test]
    fn test_rejects_truncated_images() {
        let (state, keypad) = busy_state();
        let image = encode(&state, &keypad);
        assert!(matches!(
            decode(&image[..SNAPSHOT_LEN - 1]),
            Err(Error::InvalidSnapshot(_))
        ));
    }

    #[test]
    fn test_rejects_bad_magic() {
        let (state, keypad) = busy_state();
        let mut image = encode(&state, &keypad);
        image[0] = b'X';
        assert_eq!(
            decode(&image),
            Err(Error::InvalidSnapshot("bad magic".to_string()))
        );
    }

    #[test]
    fn test_rejects_deep_stacks() {
        let (state, keypad) = busy_state();
        let mut image = encode(&state, &keypad);
        image[5 + MEMORY_SIZE + REGISTER_COUNT + 4] = STACK_DEPTH as u8 + 1;
        assert!(matches!(decode(&image), Err(Error::InvalidSnapshot(_))));
    }
}
