use std::collections::VecDeque;

use log::{debug, error, trace, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::Config;
use crate::constants::{DISPLAY_SIZE, MAX_ADDRESS, MAX_PROGRAM_SIZE, REGISTER_COUNT};
use crate::error::{Error, Result};
use crate::instruction::from_op;
use crate::keypad::Keypad;
use crate::opcode::Opcode;
use crate::operations::Context;
use crate::snapshot;
use crate::state::{FrameBuffer, State};

/// What a successful `tick` did
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Step {
    /// The instruction ran and the machine moved on
    Executed(Opcode),
    /// The machine is blocked on `LD Vx, K` until a key is pressed
    AwaitingKey,
}

/// # Chip-8
/// Chip-8 is a virtual machine and corresponding interpreted language.
///
/// Tracks:
///  - current `state`
///  - `previous_states` for rewinding
///  - `keypad` with public interfaces for manipulating it
///  - `stale_keys` already held when `LD Vx, K` began waiting
///  - whether a fatal error has `halted` execution
///
/// Supplies interfaces for:
/// - loading roms
/// - pressing and releasing keys
/// - advancing and reversing the CPU
/// - advancing its timers
/// - inspecting its frame buffer for rendering by some display
///
/// The host decides how often to call `tick` and `tick_timers` and must not
/// call them concurrently; a `Chip8` is a plain owned value with no interior
/// sharing.
pub struct Chip8 {
    state: State,
    previous_states: VecDeque<State>,
    keypad: Keypad,
    stale_keys: Keypad,
    config: Config,
    rng: StdRng,
    halted: bool,
}

impl Chip8 {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Chip8 {
            state: State::new(),
            previous_states: VecDeque::new(),
            keypad: Keypad::new(),
            stale_keys: Keypad::new(),
            rng: seeded_rng(config.seed),
            config,
            halted: false,
        }
    }

    /// Load a rom, replacing everything about the previous machine
    ///
    /// # Arguments
    /// * `program` the raw ROM image, copied in at 0x200
    pub fn load(&mut self, program: &[u8]) -> Result<()> {
        if program.len() > MAX_PROGRAM_SIZE {
            return Err(Error::ProgramTooLarge {
                size: program.len(),
                max: MAX_PROGRAM_SIZE,
            });
        }
        self.reset();
        self.state.memory.load_program(program)?;
        debug!("loaded {} byte program", program.len());
        Ok(())
    }

    /// Returns every piece of state to its power-on value.
    /// The sprite sheet is rewritten and any loaded program is wiped.
    pub fn reset(&mut self) {
        self.state = State::new();
        self.previous_states.clear();
        self.keypad.clear();
        self.stale_keys.clear();
        self.rng = seeded_rng(self.config.seed);
        self.halted = false;
        debug!("reset");
    }

    /// Advances the CPU by a single instruction
    /// - does nothing but report `AwaitingKey` while blocked on a key that
    ///   hasn't been pressed
    /// - otherwise gets and executes the next opcode
    ///
    /// An unknown opcode is skipped and reported as `Error::UnknownOpcode`.
    /// Any other error leaves the state as it was before the tick and halts
    /// the machine until the next `reset` or `load`.
    pub fn tick(&mut self) -> Result<Step> {
        if self.halted {
            return Err(Error::Halted);
        }
        if let Some(register) = self.state.awaiting_key {
            return Ok(self.receive_key(register));
        }

        let op = self.fetch().map_err(|e| self.halt(e))?;
        let instruction = match from_op(op) {
            Some(instruction) => instruction,
            None => {
                let pc = self.state.pc;
                warn!("skipping unknown opcode {} at {:#05X}", op, pc);
                self.save_state();
                self.state.pc += 0x2;
                return Err(Error::UnknownOpcode { opcode: op.0, pc });
            }
        };
        trace!(
            "{} {:<4} v{:02X?} i{:04X} pc{:04X}",
            op,
            instruction.mnemonic,
            self.state.v,
            self.state.i,
            self.state.pc
        );

        let mut ctx = Context {
            keypad: &self.keypad,
            quirks: &self.config.quirks,
            rng: &mut self.rng,
        };
        let next = (instruction.execute)(op, &self.state, &mut ctx).map_err(|e| self.halt(e))?;
        self.save_state();
        self.state = next;

        if self.state.awaiting_key.is_some() {
            self.stale_keys = self.keypad;
            Ok(Step::AwaitingKey)
        } else {
            Ok(Step::Executed(op))
        }
    }

    /// Completes a pending `LD Vx, K` with the lowest key pressed since the
    /// wait began, if any. Keys held from before must be released and
    /// pressed again.
    fn receive_key(&mut self, register: u8) -> Step {
        let key = match self.keypad.first_new_press(&self.stale_keys) {
            Some(key) => key,
            None => return Step::AwaitingKey,
        };
        debug!("key {:X} received into v{:X}", key, register);
        self.save_state();
        let op = Opcode(0xF00A | (u16::from(register) << 8));
        self.state.v[register as usize] = key;
        self.state.awaiting_key = None;
        self.state.pc += 0x2;
        Step::Executed(op)
    }

    /// Handles the delay and sound timers; meant to be called at 60Hz
    /// - decrements each timer that hasn't reached 0
    pub fn tick_timers(&mut self) {
        self.state.delay_timer = self.state.delay_timer.saturating_sub(1);
        self.state.sound_timer = self.state.sound_timer.saturating_sub(1);
    }

    /// Reverses the CPU by a single tick if possible
    /// - if there are previous_states, pops the last one and restores it
    pub fn rewind(&mut self) -> bool {
        match self.previous_states.pop_front() {
            Some(state) => {
                self.state = State {
                    draw_flag: true,
                    ..state
                };
                self.stale_keys = self.keypad;
                self.halted = false;
                true
            }
            None => false,
        }
    }

    /// Puts the current state in previous_states
    /// - if there are already `history_depth` saved then the oldest is dropped
    fn save_state(&mut self) {
        if self.config.history_depth == 0 {
            return;
        }
        if self.previous_states.len() == self.config.history_depth {
            self.previous_states.pop_back();
        }
        self.previous_states.push_front(self.state);
    }

    fn halt(&mut self, err: Error) -> Error {
        error!("halting at {:#05X}: {}", self.state.pc, err);
        self.halted = true;
        err
    }

    /// Gets the opcode currently pointed at by the pc.
    /// Memory is stored as bytes, but opcodes are 16 bits so we combine two subsequent bytes.
    fn fetch(&self) -> Result<Opcode> {
        let pc = self.state.pc;
        if pc >= MAX_ADDRESS {
            return Err(Error::InvalidFetch { pc });
        }
        let bytes = self.state.memory.slice(pc, 2)?;
        Ok(Opcode::from_bytes(bytes[0], bytes[1]))
    }

    /// Set the pressed status of key
    ///
    /// # Arguments
    /// * `key` the index of the key, 0x0..=0xF
    /// * `pressed` whether it is held down
    pub fn set_key(&mut self, key: u8, pressed: bool) -> Result<()> {
        self.keypad.set(key, pressed)?;
        if !pressed {
            self.stale_keys.set(key, false)?;
        }
        Ok(())
    }

    pub fn key_press(&mut self, key: u8) -> Result<()> {
        self.set_key(key, true)
    }

    pub fn key_release(&mut self, key: u8) -> Result<()> {
        self.set_key(key, false)
    }

    /// Returns the FrameBuffer if the display should be redrawn, clearing the
    /// draw flag
    pub fn get_frame(&mut self) -> Option<&FrameBuffer> {
        if self.take_draw_flag() {
            Some(&self.state.frame_buffer)
        } else {
            None
        }
    }

    /// Whether the display changed since the last call
    pub fn take_draw_flag(&mut self) -> bool {
        std::mem::take(&mut self.state.draw_flag)
    }

    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.state.frame_buffer
    }

    /// Every pixel, row by row
    pub fn display_buffer(&self) -> [bool; DISPLAY_SIZE] {
        self.state.display_buffer()
    }

    /// Whether the pixel at (x, y) is lit; `None` off screen
    pub fn pixel(&self, x: usize, y: usize) -> Option<bool> {
        self.state.frame_buffer.get(y)?.get(x).copied()
    }

    pub fn registers(&self) -> [u8; REGISTER_COUNT] {
        self.state.v
    }

    /// The value of Vx; `None` past VF
    pub fn register(&self, x: usize) -> Option<u8> {
        self.state.v.get(x).copied()
    }

    pub fn i(&self) -> u16 {
        self.state.i
    }

    pub fn pc(&self) -> u16 {
        self.state.pc
    }

    pub fn delay_timer(&self) -> u8 {
        self.state.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.state.sound_timer
    }

    /// Whether the host should be making a sound
    pub fn sound_active(&self) -> bool {
        self.state.sound_timer > 0
    }

    /// The register waiting on a key press, if any
    pub fn awaiting_key(&self) -> Option<u8> {
        self.state.awaiting_key
    }

    pub fn stack_depth(&self) -> usize {
        self.state.stack.depth()
    }

    pub fn memory(&self) -> &[u8] {
        self.state.memory.as_bytes()
    }

    pub fn keypad(&self) -> &Keypad {
        &self.keypad
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// The full machine state as a flat save-state image
    pub fn snapshot(&self) -> Vec<u8> {
        snapshot::encode(&self.state, &self.keypad)
    }

    /// Restores a save-state image made by `snapshot`.
    /// History is dropped and a halted machine resumes.
    pub fn restore(&mut self, image: &[u8]) -> Result<()> {
        let (state, keypad) = snapshot::decode(image)?;
        self.state = state;
        self.keypad = keypad;
        self.stale_keys = keypad;
        self.previous_states.clear();
        self.halted = false;
        debug!("restored snapshot at pc {:#05X}", self.state.pc);
        Ok(())
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Quirks;

    fn with_program(program: &[u8]) -> Chip8 {
        let mut chip8 = Chip8::new();
        chip8.load(program).unwrap();
        chip8
    }

    #[test]
    fn test_chip8_gets_op() {
        let chip8 = with_program(&[0xAA, 0xBB]);
        assert_eq!(chip8.fetch(), Ok(Opcode(0xAABB)));
    }

    #[test]
    fn test_fetch_past_memory_fails() {
        let mut chip8 = Chip8::new();
        chip8.state.pc = 0xFFF;
        assert_eq!(chip8.fetch(), Err(Error::InvalidFetch { pc: 0xFFF }));
        chip8.state.pc = 0xFFE;
        assert_eq!(chip8.fetch(), Ok(Opcode(0x0000)));
    }

    #[test]
    fn test_load_resets_state() {
        let mut chip8 = with_program(&[0x60, 0x05, 0x22, 0x00]);
        chip8.tick().unwrap();
        chip8.tick().unwrap();
        chip8.state.delay_timer = 3;
        chip8.key_press(0x4).unwrap();

        chip8.load(&[0x00, 0xE0]).unwrap();
        assert_eq!(chip8.pc(), 0x200);
        assert_eq!(chip8.registers(), [0; 16]);
        assert_eq!(chip8.stack_depth(), 0);
        assert_eq!(chip8.delay_timer(), 0);
        assert!(!chip8.keypad().is_pressed(0x4));
        assert_eq!(&chip8.memory()[0x200..0x204], &[0x00, 0xE0, 0x00, 0x00]);
    }

    #[test]
    fn test_load_rejects_large_programs() {
        let mut chip8 = with_program(&[0x12, 0x00]);
        let program = vec![0; MAX_PROGRAM_SIZE + 1];
        assert_eq!(
            chip8.load(&program),
            Err(Error::ProgramTooLarge {
                size: 0xE01,
                max: 0xE00
            })
        );
        // the previous program survives
        assert_eq!(&chip8.memory()[0x200..0x202], &[0x12, 0x00]);
    }

    #[test]
    fn test_load_accepts_largest_program() {
        let mut chip8 = Chip8::new();
        let program = vec![0xAB; MAX_PROGRAM_SIZE];
        chip8.load(&program).unwrap();
        assert_eq!(chip8.memory()[0xFFF], 0xAB);
    }

    #[test]
    fn test_cycles_while_no_register_needs_key() {
        let mut chip8 = with_program(&[0x00, 0xE0]);
        let starting_pc = chip8.pc();
        assert_eq!(chip8.tick(), Ok(Step::Executed(Opcode(0x00E0))));
        assert_eq!(chip8.pc(), starting_pc + 0x2);
    }

    #[test]
    fn test_doesnt_cycle_while_register_needs_key() {
        let mut chip8 = with_program(&[0xF1, 0x0A, 0x00, 0xE0]);
        assert_eq!(chip8.tick(), Ok(Step::AwaitingKey));
        assert_eq!(chip8.awaiting_key(), Some(0x1));
        for _ in 0..5 {
            assert_eq!(chip8.tick(), Ok(Step::AwaitingKey));
        }
        assert_eq!(chip8.pc(), 0x200);
    }

    #[test]
    fn test_captures_key_presses() {
        let mut chip8 = with_program(&[0xF1, 0x0A, 0x00, 0xE0]);
        chip8.tick().unwrap();
        chip8.key_press(0xE).unwrap();
        assert_eq!(chip8.tick(), Ok(Step::Executed(Opcode(0xF10A))));
        assert_eq!(chip8.awaiting_key(), None);
        assert_eq!(chip8.register(0x1), Some(0xE));
        assert_eq!(chip8.pc(), 0x202);
    }

    #[test]
    fn test_key_held_before_wait_is_ignored() {
        let mut chip8 = with_program(&[0xF1, 0x0A, 0x00, 0xE0]);
        chip8.key_press(0x5).unwrap();
        assert_eq!(chip8.tick(), Ok(Step::AwaitingKey));
        for _ in 0..5 {
            assert_eq!(chip8.tick(), Ok(Step::AwaitingKey));
        }

        // a different key still counts while 5 stays down
        chip8.key_press(0x9).unwrap();
        assert_eq!(chip8.tick(), Ok(Step::Executed(Opcode(0xF10A))));
        assert_eq!(chip8.register(0x1), Some(0x9));
    }

    #[test]
    fn test_held_key_counts_after_release_and_press() {
        let mut chip8 = with_program(&[0xF1, 0x0A, 0x00, 0xE0]);
        chip8.key_press(0x5).unwrap();
        chip8.tick().unwrap();
        chip8.key_release(0x5).unwrap();
        assert_eq!(chip8.tick(), Ok(Step::AwaitingKey));
        chip8.key_press(0x5).unwrap();
        assert_eq!(chip8.tick(), Ok(Step::Executed(Opcode(0xF10A))));
        assert_eq!(chip8.register(0x1), Some(0x5));
    }

    #[test]
    fn test_one_press_completes_one_wait() {
        // LD V0, K; ADD V1, 1; JP 0x200
        let mut chip8 = with_program(&[0xF0, 0x0A, 0x71, 0x01, 0x12, 0x00]);
        chip8.tick().unwrap();
        chip8.key_press(0x5).unwrap();
        for _ in 0..40 {
            chip8.tick().unwrap();
        }
        assert_eq!(chip8.register(0x1), Some(0x1));
        assert_eq!(chip8.awaiting_key(), Some(0x0));
    }

    #[test]
    fn test_register_past_vf() {
        let chip8 = with_program(&[0x6F, 0x01]);
        assert_eq!(chip8.register(0xF), Some(0x0));
        assert_eq!(chip8.register(0x10), None);
    }

    #[test]
    fn test_unknown_opcode_is_skipped() {
        let mut chip8 = with_program(&[0x51, 0x21, 0x61, 0x07]);
        assert_eq!(
            chip8.tick(),
            Err(Error::UnknownOpcode {
                opcode: 0x5121,
                pc: 0x200
            })
        );
        assert!(!chip8.is_halted());
        assert_eq!(chip8.pc(), 0x202);
        chip8.tick().unwrap();
        assert_eq!(chip8.register(0x1), Some(0x07));
    }

    #[test]
    fn test_fatal_error_halts_without_changing_state() {
        let mut chip8 = with_program(&[0x00, 0xEE]);
        let before = *chip8.state();
        assert_eq!(chip8.tick(), Err(Error::StackUnderflow { pc: 0x200 }));
        assert!(chip8.is_halted());
        assert_eq!(*chip8.state(), before);
        assert_eq!(chip8.tick(), Err(Error::Halted));

        chip8.reset();
        assert!(!chip8.is_halted());
    }

    #[test]
    fn test_timers_count_down_to_zero() {
        let mut chip8 = Chip8::new();
        chip8.state.delay_timer = 2;
        chip8.state.sound_timer = 1;
        assert!(chip8.sound_active());
        chip8.tick_timers();
        assert_eq!((chip8.delay_timer(), chip8.sound_timer()), (1, 0));
        assert!(!chip8.sound_active());
        chip8.tick_timers();
        chip8.tick_timers();
        assert_eq!((chip8.delay_timer(), chip8.sound_timer()), (0, 0));
    }

    #[test]
    fn test_get_frame_clears_draw_flag() {
        let mut chip8 = with_program(&[0x00, 0xE0]);
        assert!(chip8.get_frame().is_none());
        chip8.tick().unwrap();
        assert!(chip8.get_frame().is_some());
        assert!(chip8.get_frame().is_none());
    }

    #[test]
    fn test_rewind_requests_a_redraw() {
        let mut chip8 = with_program(&[0x61, 0x01]);
        chip8.tick().unwrap();
        assert!(!chip8.take_draw_flag());
        assert!(chip8.rewind());
        assert!(chip8.take_draw_flag());
        assert!(!chip8.take_draw_flag());
    }

    #[test]
    fn test_pixel_lookup() {
        let mut chip8 = Chip8::new();
        chip8.state.frame_buffer[2][3] = true;
        assert_eq!(chip8.pixel(3, 2), Some(true));
        assert_eq!(chip8.pixel(2, 3), Some(false));
        assert_eq!(chip8.pixel(64, 0), None);
    }

    #[test]
    fn test_rewind_restores_previous_tick() {
        let mut chip8 = with_program(&[0x61, 0x01, 0x71, 0x01]);
        chip8.tick().unwrap();
        chip8.tick().unwrap();
        assert_eq!(chip8.register(0x1), Some(0x2));
        assert!(chip8.rewind());
        assert_eq!(chip8.register(0x1), Some(0x1));
        assert_eq!(chip8.pc(), 0x202);
        assert!(chip8.rewind());
        assert_eq!(chip8.pc(), 0x200);
        assert!(!chip8.rewind());
    }

    #[test]
    fn test_chip8_drops_old_saved_states() {
        let mut chip8 = Chip8::with_config(Config {
            history_depth: 3,
            ..Config::default()
        });
        chip8.load(&[0x12, 0x00]).unwrap();
        for _ in 0..10 {
            chip8.tick().unwrap();
        }
        assert_eq!(chip8.previous_states.len(), 3);
    }

    #[test]
    fn test_no_history_without_depth() {
        let mut chip8 = Chip8::with_config(Config {
            history_depth: 0,
            ..Config::default()
        });
        chip8.load(&[0x12, 0x00]).unwrap();
        chip8.tick().unwrap();
        assert!(!chip8.rewind());
    }

    #[test]
    fn test_seeded_machines_agree() {
        let config = Config {
            seed: Some(8),
            ..Config::default()
        };
        let program = [0xC0, 0xFF, 0xC1, 0xFF, 0xC2, 0xFF];
        let mut a = Chip8::with_config(config);
        let mut b = Chip8::with_config(config);
        a.load(&program).unwrap();
        b.load(&program).unwrap();
        for _ in 0..3 {
            a.tick().unwrap();
            b.tick().unwrap();
        }
        assert_eq!(a.registers(), b.registers());

        // reloading replays the same sequence
        let first = a.registers();
        a.load(&program).unwrap();
        for _ in 0..3 {
            a.tick().unwrap();
        }
        assert_eq!(a.registers(), first);
    }

    #[test]
    fn test_quirks_reach_operations() {
        let mut chip8 = Chip8::with_config(Config {
            quirks: Quirks::cosmac_vip(),
            ..Config::default()
        });
        // V2 = 3; V1 = V2 >> 1
        chip8.load(&[0x62, 0x03, 0x81, 0x26]).unwrap();
        chip8.tick().unwrap();
        chip8.tick().unwrap();
        assert_eq!(chip8.register(0x1), Some(0x1));
        assert_eq!(chip8.register(0xF), Some(0x1));
    }
}
