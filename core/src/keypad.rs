use crate::constants::KEY_COUNT;
use crate::error::{Error, Result};

/// # Keypad
/// Chip-8 input is generated with a hexadecimal keypad.
/// ```text
/// |1|2|3|C|
/// |4|5|6|D|
/// |7|8|9|E|
/// |A|0|B|F|
/// ```
/// The host owns the mapping from its own devices onto these 16 keys and sets
/// their state between ticks.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Keypad([bool; KEY_COUNT]);

impl Keypad {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the pressed status of `key`
    pub fn set(&mut self, key: u8, pressed: bool) -> Result<()> {
        let slot = self
            .0
            .get_mut(key as usize)
            .ok_or(Error::OutOfRange { addr: key as usize, len: 1 })?;
        *slot = pressed;
        Ok(())
    }

    /// Whether the key named by the low nibble of `key` is held down
    pub fn is_pressed(&self, key: u8) -> bool {
        self.0[(key & 0xF) as usize]
    }

    /// The lowest key held down here but not in `stale`
    pub fn first_new_press(&self, stale: &Keypad) -> Option<u8> {
        self.0
            .iter()
            .zip(stale.0.iter())
            .position(|(&now, &before)| now && !before)
            .map(|key| key as u8)
    }

    pub fn keys(&self) -> &[bool; KEY_COUNT] {
        &self.0
    }

    pub fn clear(&mut self) {
        self.0 = [false; KEY_COUNT];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_and_release() {
        let mut keypad = Keypad::new();
        keypad.set(0xE, true).unwrap();
        assert!(keypad.is_pressed(0xE));
        keypad.set(0xE, false).unwrap();
        assert!(!keypad.is_pressed(0xE));
    }

    #[test]
    fn test_rejects_keys_past_f() {
        let mut keypad = Keypad::new();
        assert_eq!(
            keypad.set(0x10, true),
            Err(Error::OutOfRange { addr: 0x10, len: 1 })
        );
    }

    #[test]
    fn test_lookup_uses_low_nibble() {
        let mut keypad = Keypad::new();
        keypad.set(0x3, true).unwrap();
        assert!(keypad.is_pressed(0x13));
    }

    #[test]
    fn test_first_new_press() {
        let mut keypad = Keypad::new();
        let none = Keypad::new();
        assert_eq!(keypad.first_new_press(&none), None);
        keypad.set(0xB, true).unwrap();
        keypad.set(0x4, true).unwrap();
        assert_eq!(keypad.first_new_press(&none), Some(0x4));
    }

    #[test]
    fn test_stale_keys_are_not_new_presses() {
        let mut stale = Keypad::new();
        stale.set(0x4, true).unwrap();
        let mut keypad = stale;
        assert_eq!(keypad.first_new_press(&stale), None);
        keypad.set(0xB, true).unwrap();
        assert_eq!(keypad.first_new_press(&stale), Some(0xB));
    }
}
