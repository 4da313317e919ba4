//! The Chip-8 interpreter core.
//!
//! A host loads a ROM with [`Chip8::load`], calls [`Chip8::tick`] at its chosen
//! instruction rate and [`Chip8::tick_timers`] at 60Hz, forwards key state with
//! [`Chip8::set_key`], and renders [`Chip8::get_frame`] whenever it returns a
//! frame. Reading files, drawing pixels, pacing real time and making sound are
//! all left to the host.

pub use chip8::{Chip8, Step};
pub use config::{Config, Quirks};
pub use constants::{CLOCK_SPEED, TIMER_HZ};
pub use error::{Error, Result};
pub use keypad::Keypad;
pub use memory::Memory;
pub use opcode::Opcode;
pub use snapshot::SNAPSHOT_LEN;
pub use stack::Stack;

mod chip8;
mod config;
pub mod constants;
mod error;
mod instruction;
mod keypad;
mod memory;
mod opcode;
mod operations;
mod snapshot;
mod stack;
pub mod state;
