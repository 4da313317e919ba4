use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use sdl2::event::Event;

use display::Display;
use emu8_core::Chip8;

use crate::keymap::{input, Input};

/// How the host paces and draws the machine
#[derive(Debug, Copy, Clone)]
pub struct Settings {
    /// Instructions executed per second
    pub ips: u64,
    /// Timer decrements per second
    pub timer_hz: u64,
    /// Size multiplier for each Chip-8 pixel
    pub scale: u32,
}

impl Settings {
    /// Instructions to execute between timer decrements, at least one
    fn cycles_per_timer_tick(&self) -> u64 {
        (self.ips / self.timer_hz).max(1)
    }
}

pub fn run(chip8: &mut Chip8, settings: Settings) -> Result<()> {
    // Get SDL2 context
    let sdl = sdl2::init()
        .map_err(|e| anyhow!(e))
        .context("unable to initialise SDL")?;
    let mut display = Display::new(&sdl, settings.scale)
        .map_err(|e| anyhow!(e))
        .context("unable to open a window")?;
    let mut events = sdl.event_pump().map_err(|e| anyhow!(e))?;

    // Set initial timing
    let cycle_time = Duration::from_nanos(1_000_000_000 / settings.ips);
    let cycles_per_timer_tick = settings.cycles_per_timer_tick();
    let mut cycles: u64 = 0;
    let mut last_cycle = Instant::now();

    // Whether or not the default clock speed should be respected
    let mut fast_forward = false;
    // Whether the game's state should be cycled forwards or backwards
    let mut rewind = false;
    let mut sounding = false;

    'event: loop {
        // If the draw flag is set, unset it and render the current frame
        if let Some(frame) = chip8.get_frame() {
            display.render(frame).map_err(|e| anyhow!(e))?;
        }

        // Handle input
        for event in events.poll_iter() {
            let (key, pressed) = match event {
                Event::Quit { .. } => break 'event,
                Event::KeyDown {
                    keycode: Some(key), ..
                } => (key, true),
                Event::KeyUp {
                    keycode: Some(key), ..
                } => (key, false),
                _ => continue,
            };
            match input(key) {
                Some(Input::Key(pad)) => chip8.set_key(pad, pressed)?,
                Some(Input::FastForward) => fast_forward = pressed,
                Some(Input::Rewind) => rewind = pressed,
                None => continue,
            }
        }

        // Update state
        if rewind {
            chip8.rewind();
        } else if !chip8.is_halted() {
            if let Err(e) = chip8.tick() {
                if e.is_fatal() {
                    info!("machine halted; hold Escape to rewind or close the window to quit");
                }
            }
            cycles += 1;
            if cycles % cycles_per_timer_tick == 0 {
                chip8.tick_timers();
            }
        }

        if chip8.sound_active() != sounding {
            sounding = !sounding;
            debug!("sound {}", if sounding { "on" } else { "off" });
        }

        // Handle timing
        let current_time = Instant::now();
        let elapsed_cycle_time = current_time - last_cycle;
        if !fast_forward && cycle_time > elapsed_cycle_time {
            std::thread::sleep(cycle_time - elapsed_cycle_time);
        }
        last_cycle = Instant::now();
    }
    Ok(())
}
