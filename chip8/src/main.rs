use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use emu8_core::constants::MAX_SAVED_STATES;
use emu8_core::{Chip8, Config, Quirks, CLOCK_SPEED, TIMER_HZ};

mod keymap;
mod run;

const DEFAULT_IPS: u64 = 1_000_000_000 / CLOCK_SPEED;

#[derive(Parser, Debug)]
#[command(version, about = "A Chip-8 interpreter", long_about = None)]
struct Args {
    /// Path to the ROM file to run
    rom: PathBuf,

    /// Instructions per second
    #[arg(long, default_value_t = DEFAULT_IPS, value_parser = clap::value_parser!(u64).range(1..))]
    ips: u64,

    /// Delay and sound timer decrements per second
    #[arg(long, default_value_t = TIMER_HZ, value_parser = clap::value_parser!(u64).range(1..))]
    timer_hz: u64,

    /// Size multiplier for each Chip-8 pixel
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..=40))]
    scale: u32,

    /// Number of past instructions that can be rewound; 0 disables rewinding
    #[arg(long, default_value_t = MAX_SAVED_STATES)]
    rewind_depth: usize,

    /// Seed for the random number generator
    #[arg(long)]
    seed: Option<u64>,

    /// Use every COSMAC VIP quirk
    #[arg(long)]
    cosmac_vip: bool,

    /// Shift Vy into Vx for 8xy6 and 8xyE
    #[arg(long)]
    shift_uses_vy: bool,

    /// Clear VF after 8xy1, 8xy2 and 8xy3
    #[arg(long)]
    logic_resets_vf: bool,

    /// Advance I past the registers touched by Fx55 and Fx65
    #[arg(long)]
    load_store_increments_i: bool,
}

impl Args {
    fn config(&self) -> Config {
        let base = if self.cosmac_vip {
            Quirks::cosmac_vip()
        } else {
            Quirks::default()
        };
        Config {
            quirks: Quirks {
                shift_uses_vy: base.shift_uses_vy || self.shift_uses_vy,
                logic_resets_vf: base.logic_resets_vf || self.logic_resets_vf,
                load_store_increments_i: base.load_store_increments_i
                    || self.load_store_increments_i,
            },
            seed: self.seed,
            history_depth: self.rewind_depth,
        }
    }

    fn settings(&self) -> run::Settings {
        run::Settings {
            ips: self.ips,
            timer_hz: self.timer_hz,
            scale: self.scale,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let rom = fs::read(&args.rom)
        .with_context(|| format!("unable to read ROM {}", args.rom.display()))?;
    let mut chip8 = Chip8::with_config(args.config());
    chip8
        .load(&rom)
        .with_context(|| format!("unable to load ROM {}", args.rom.display()))?;
    info!("loaded {} ({} bytes)", args.rom.display(), rom.len());

    run::run(&mut chip8, args.settings())
}
