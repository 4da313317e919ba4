use sdl2::keyboard::Keycode;

/// What a host key does when held
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Input {
    /// One of the 16 Chip-8 keys
    Key(u8),
    /// Run without sleeping between cycles
    FastForward,
    /// Step backwards through saved states
    Rewind,
}

/// # Keymap
/// Chip-8 input is generated with a hexadecimal keypad.
///
/// This original layout is mapped to the left 4 alphanumeric columns.
/// ```text
/// |1|2|3|C|      |1|2|3|4|
/// |4|5|6|D|  ->  |Q|W|E|R|
/// |7|8|9|E|  ->  |A|S|D|F|
/// |A|0|B|F|      |Z|X|C|V|
/// ```
/// Space fast forwards and Escape rewinds.
pub fn input(key: Keycode) -> Option<Input> {
    let pad = match key {
        Keycode::X => 0x0,
        Keycode::Num1 => 0x1,
        Keycode::Num2 => 0x2,
        Keycode::Num3 => 0x3,
        Keycode::Q => 0x4,
        Keycode::W => 0x5,
        Keycode::E => 0x6,
        Keycode::A => 0x7,
        Keycode::S => 0x8,
        Keycode::D => 0x9,
        Keycode::Z => 0xA,
        Keycode::C => 0xB,
        Keycode::Num4 => 0xC,
        Keycode::R => 0xD,
        Keycode::F => 0xE,
        Keycode::V => 0xF,
        Keycode::Space => return Some(Input::FastForward),
        Keycode::Escape => return Some(Input::Rewind),
        _ => return None,
    };
    Some(Input::Key(pad))
}
