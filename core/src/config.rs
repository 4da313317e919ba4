use crate::constants::MAX_SAVED_STATES;

/// # Quirks
/// Behaviours that differ between historical interpreters. ROMs were written
/// against one or the other, so the choice is left to the host.
///
/// The defaults follow CHIP-48/SUPER-CHIP, which most ROMs in circulation
/// expect.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Quirks {
    /// `8xy6`/`8xyE` shift Vy into Vx (COSMAC VIP) instead of shifting Vx
    /// in place
    pub shift_uses_vy: bool,

    /// `8xy1`/`8xy2`/`8xy3` clear VF (COSMAC VIP)
    pub logic_resets_vf: bool,

    /// `Fx55`/`Fx65` leave I pointing past the last byte touched (COSMAC VIP)
    pub load_store_increments_i: bool,
}

impl Quirks {
    /// The behaviour of the original COSMAC VIP interpreter
    pub fn cosmac_vip() -> Self {
        Quirks {
            shift_uses_vy: true,
            logic_resets_vf: true,
            load_store_increments_i: true,
        }
    }
}

/// Construction-time settings for a `Chip8`
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Config {
    pub quirks: Quirks,

    /// Seed for `Cxkk`; a random seed is drawn when `None`
    pub seed: Option<u64>,

    /// How many past states to keep for rewinding; 0 disables rewinding
    pub history_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            quirks: Quirks::default(),
            seed: None,
            history_depth: MAX_SAVED_STATES,
        }
    }
}
