use rand::rngs::StdRng;
use rand::Rng;

use crate::config::Quirks;
use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH, SPRITE_HEIGHT, SPRITE_SHEET_START, VF};
use crate::error::{Error, Result};
use crate::keypad::Keypad;
use crate::opcode::Opcode;
use crate::state::{blank_frame, State};

/// What an operation may look at besides the machine state
pub struct Context<'a> {
    pub keypad: &'a Keypad,
    pub quirks: &'a Quirks,
    pub rng: &'a mut StdRng,
}

/// Builds the next State from the current one
pub type Operation = fn(op: Opcode, state: &State, ctx: &mut Context<'_>) -> Result<State>;

fn skip_if(condition: bool, state: &State) -> State {
    let pc = if condition {
        state.pc + 0x4
    } else {
        state.pc + 0x2
    };
    State { pc, ..*state }
}

/// call machine code routine at addr
/// Only meaningful on the original hardware; ignored
pub fn sys(_op: Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    Ok(State {
        pc: state.pc + 0x2,
        ..*state
    })
}

/// clear
pub fn clr(_op: Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    Ok(State {
        pc: state.pc + 0x2,
        frame_buffer: blank_frame(),
        draw_flag: true,
        ..*state
    })
}

/// PC = STACK.pop()
pub fn rts(_op: Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    let (pc, stack) = state
        .stack
        .pop()
        .ok_or(Error::StackUnderflow { pc: state.pc })?;
    Ok(State { pc, stack, ..*state })
}

/// PC = addr
pub fn jump(op: Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    Ok(State {
        pc: op.addr(),
        ..*state
    })
}

/// STACK.push(PC + 2); PC = addr
pub fn call(op: Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    let stack = state
        .stack
        .push(state.pc + 0x2)
        .ok_or(Error::StackOverflow { pc: state.pc })?;
    Ok(State {
        pc: op.addr(),
        stack,
        ..*state
    })
}

/// if Vx == kk then pc += 2
pub fn ske(op: Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    Ok(skip_if(state.v[op.vx()] == op.kk(), state))
}

/// if Vx != kk then pc += 2
pub fn skne(op: Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    Ok(skip_if(state.v[op.vx()] != op.kk(), state))
}

/// if Vx == Vy then pc += 2
pub fn skre(op: Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    Ok(skip_if(state.v[op.vx()] == state.v[op.vy()], state))
}

/// Vx = kk
pub fn load(op: Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    let mut v = state.v;
    v[op.vx()] = op.kk();
    Ok(State {
        pc: state.pc + 0x2,
        v,
        ..*state
    })
}

/// Vx += kk
/// Add kk to Vx; allow for overflow but implicitly drop it. VF is untouched.
pub fn add(op: Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    let mut v = state.v;
    v[op.vx()] = v[op.vx()].wrapping_add(op.kk());
    Ok(State {
        pc: state.pc + 0x2,
        v,
        ..*state
    })
}

/// Vx = Vy
pub fn mv(op: Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    let mut v = state.v;
    v[op.vx()] = v[op.vy()];
    Ok(State {
        pc: state.pc + 0x2,
        v,
        ..*state
    })
}

fn logic(op: Opcode, state: &State, quirks: &Quirks, f: fn(u8, u8) -> u8) -> State {
    let mut v = state.v;
    v[op.vx()] = f(v[op.vx()], v[op.vy()]);
    if quirks.logic_resets_vf {
        v[VF] = 0x0;
    }
    State {
        pc: state.pc + 0x2,
        v,
        ..*state
    }
}

/// Vx |= Vy
pub fn or(op: Opcode, state: &State, ctx: &mut Context) -> Result<State> {
    Ok(logic(op, state, ctx.quirks, |x, y| x | y))
}

/// Vx &= Vy
pub fn and(op: Opcode, state: &State, ctx: &mut Context) -> Result<State> {
    Ok(logic(op, state, ctx.quirks, |x, y| x & y))
}

/// Vx ^= Vy
pub fn xor(op: Opcode, state: &State, ctx: &mut Context) -> Result<State> {
    Ok(logic(op, state, ctx.quirks, |x, y| x ^ y))
}

/// Vx += Vy; VF = overflow
/// The flag is written last so it wins when x is F
pub fn addr(op: Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    let (res, over) = state.v[op.vx()].overflowing_add(state.v[op.vy()]);
    let mut v = state.v;
    v[op.vx()] = res;
    v[VF] = over as u8;
    Ok(State {
        pc: state.pc + 0x2,
        v,
        ..*state
    })
}

/// Vx -= Vy; VF = !underflow
pub fn sub(op: Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    let (res, under) = state.v[op.vx()].overflowing_sub(state.v[op.vy()]);
    let mut v = state.v;
    v[op.vx()] = res;
    v[VF] = !under as u8;
    Ok(State {
        pc: state.pc + 0x2,
        v,
        ..*state
    })
}

/// The register a shift reads from
fn shift_source(op: Opcode, state: &State, quirks: &Quirks) -> u8 {
    if quirks.shift_uses_vy {
        state.v[op.vy()]
    } else {
        state.v[op.vx()]
    }
}

/// Vx = src / 2; VF = the bit shifted out
pub fn shr(op: Opcode, state: &State, ctx: &mut Context) -> Result<State> {
    let src = shift_source(op, state, ctx.quirks);
    let mut v = state.v;
    v[op.vx()] = src >> 1;
    v[VF] = src & 0x1;
    Ok(State {
        pc: state.pc + 0x2,
        v,
        ..*state
    })
}

/// Vx = Vy - Vx; VF = !underflow
pub fn subn(op: Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    let (res, under) = state.v[op.vy()].overflowing_sub(state.v[op.vx()]);
    let mut v = state.v;
    v[op.vx()] = res;
    v[VF] = !under as u8;
    Ok(State {
        pc: state.pc + 0x2,
        v,
        ..*state
    })
}

/// Vx = src * 2; VF = the bit shifted out
pub fn shl(op: Opcode, state: &State, ctx: &mut Context) -> Result<State> {
    let src = shift_source(op, state, ctx.quirks);
    let mut v = state.v;
    v[op.vx()] = src << 1;
    v[VF] = src >> 7;
    Ok(State {
        pc: state.pc + 0x2,
        v,
        ..*state
    })
}

/// if Vx != Vy then pc += 2
pub fn skrne(op: Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    Ok(skip_if(state.v[op.vx()] != state.v[op.vy()], state))
}

/// I = addr
pub fn loadi(op: Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    Ok(State {
        pc: state.pc + 0x2,
        i: op.addr(),
        ..*state
    })
}

/// PC = V0 + addr
pub fn jumpi(op: Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    Ok(State {
        pc: u16::from(state.v[0x0]) + op.addr(),
        ..*state
    })
}

/// Vx = rand_byte & kk
pub fn rnd(op: Opcode, state: &State, ctx: &mut Context) -> Result<State> {
    let rand_byte: u8 = ctx.rng.gen();
    let mut v = state.v;
    v[op.vx()] = rand_byte & op.kk();
    Ok(State {
        pc: state.pc + 0x2,
        v,
        ..*state
    })
}

/// draw_sprite(x=Vx y=Vy size=n)
/// XORs a sprite from memory i..i+n at position x, y on the FrameBuffer with wrapping.
/// Sets VF if any pixels were erased
pub fn draw(op: Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    let sprite = state.memory.slice(state.i, op.n() as usize)?;
    let mut frame_buffer = state.frame_buffer;
    let mut collision = false;

    for (row, byte) in sprite.iter().enumerate() {
        let y = (state.v[op.vy()] as usize + row) % DISPLAY_HEIGHT;
        for bit in 0..8 {
            if (byte >> (7 - bit)) & 1 == 0 {
                continue;
            }
            let x = (state.v[op.vx()] as usize + bit) % DISPLAY_WIDTH;
            collision |= frame_buffer[y][x];
            frame_buffer[y][x] ^= true;
        }
    }

    let mut v = state.v;
    v[VF] = collision as u8;
    Ok(State {
        pc: state.pc + 0x2,
        draw_flag: true,
        v,
        frame_buffer,
        ..*state
    })
}

/// if Vx.pressed then pc += 2
pub fn skpr(op: Opcode, state: &State, ctx: &mut Context) -> Result<State> {
    Ok(skip_if(ctx.keypad.is_pressed(state.v[op.vx()]), state))
}

/// if !Vx.pressed then pc += 2
pub fn skup(op: Opcode, state: &State, ctx: &mut Context) -> Result<State> {
    Ok(skip_if(!ctx.keypad.is_pressed(state.v[op.vx()]), state))
}

/// Vx = DT
pub fn moved(op: Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    let mut v = state.v;
    v[op.vx()] = state.delay_timer;
    Ok(State {
        pc: state.pc + 0x2,
        v,
        ..*state
    })
}

/// await keypress for Vx
/// The pc stays put until the key arrives; see `Chip8::tick`
pub fn keyd(op: Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    Ok(State {
        awaiting_key: Some(op.x()),
        ..*state
    })
}

/// DT = Vx
pub fn setd(op: Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    Ok(State {
        pc: state.pc + 0x2,
        delay_timer: state.v[op.vx()],
        ..*state
    })
}

/// ST = Vx
pub fn sets(op: Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    Ok(State {
        pc: state.pc + 0x2,
        sound_timer: state.v[op.vx()],
        ..*state
    })
}

/// I += Vx
pub fn addi(op: Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    Ok(State {
        pc: state.pc + 0x2,
        i: state.i.wrapping_add(u16::from(state.v[op.vx()])),
        ..*state
    })
}

/// I = address of the sprite for the digit in Vx
/// See constants::SPRITE_SHEET for more details
pub fn ldspr(op: Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    let digit = u16::from(state.v[op.vx()] & 0xF);
    Ok(State {
        pc: state.pc + 0x2,
        i: SPRITE_SHEET_START + digit * SPRITE_HEIGHT,
        ..*state
    })
}

/// mem[I..I+3] = bcd(Vx)
/// Store BCD repr of Vx in memory starting at address i
pub fn bcd(op: Opcode, state: &State, _ctx: &mut Context) -> Result<State> {
    let value = state.v[op.vx()];
    let mut memory = state.memory;
    memory.write_all(state.i, &[value / 100, value / 10 % 10, value % 10])?;
    Ok(State {
        pc: state.pc + 0x2,
        memory,
        ..*state
    })
}

/// I after a bulk load/store of V0..=Vx
fn bulk_index(op: Opcode, state: &State, quirks: &Quirks) -> u16 {
    if quirks.load_store_increments_i {
        state.i.wrapping_add(u16::from(op.x()) + 1)
    } else {
        state.i
    }
}

/// mem[I..=I+x] = V0..=Vx
pub fn stor(op: Opcode, state: &State, ctx: &mut Context) -> Result<State> {
    let mut memory = state.memory;
    memory.write_all(state.i, &state.v[..=op.vx()])?;
    Ok(State {
        pc: state.pc + 0x2,
        i: bulk_index(op, state, ctx.quirks),
        memory,
        ..*state
    })
}

/// V0..=Vx = mem[I..=I+x]
pub fn read(op: Opcode, state: &State, ctx: &mut Context) -> Result<State> {
    let mut v = state.v;
    v[..=op.vx()].copy_from_slice(state.memory.slice(state.i, op.vx() + 1)?);
    Ok(State {
        pc: state.pc + 0x2,
        i: bulk_index(op, state, ctx.quirks),
        v,
        ..*state
    })
}
