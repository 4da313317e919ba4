use crate::opcode::Opcode;
use crate::operations::*;

/// A decoded instruction: its assembly mnemonic and the operation that
/// carries it out
#[derive(Copy, Clone)]
pub struct Instruction {
    pub mnemonic: &'static str,
    pub execute: Operation,
}

fn instruction(mnemonic: &'static str, execute: Operation) -> Instruction {
    Instruction { mnemonic, execute }
}

/// Selects the correct Instruction for a given Opcode, or `None` for an opcode
/// no Chip-8 instruction matches
pub fn from_op(op: Opcode) -> Option<Instruction> {
    let decoded = match op.nibbles() {
        (0x0, 0x0, 0xE, 0x0) => instruction("CLS", clr),
        (0x0, 0x0, 0xE, 0xE) => instruction("RET", rts),
        (0x0, ..) => instruction("SYS", sys),
        (0x1, ..) => instruction("JP", jump),
        (0x2, ..) => instruction("CALL", call),
        (0x3, ..) => instruction("SE", ske),
        (0x4, ..) => instruction("SNE", skne),
        (0x5, .., 0x0) => instruction("SE", skre),
        (0x6, ..) => instruction("LD", load),
        (0x7, ..) => instruction("ADD", add),
        (0x8, .., 0x0) => instruction("LD", mv),
        (0x8, .., 0x1) => instruction("OR", or),
        (0x8, .., 0x2) => instruction("AND", and),
        (0x8, .., 0x3) => instruction("XOR", xor),
        (0x8, .., 0x4) => instruction("ADD", addr),
        (0x8, .., 0x5) => instruction("SUB", sub),
        (0x8, .., 0x6) => instruction("SHR", shr),
        (0x8, .., 0x7) => instruction("SUBN", subn),
        (0x8, .., 0xE) => instruction("SHL", shl),
        (0x9, .., 0x0) => instruction("SNE", skrne),
        (0xA, ..) => instruction("LD", loadi),
        (0xB, ..) => instruction("JP", jumpi),
        (0xC, ..) => instruction("RND", rnd),
        (0xD, ..) => instruction("DRW", draw),
        (0xE, _, 0x9, 0xE) => instruction("SKP", skpr),
        (0xE, _, 0xA, 0x1) => instruction("SKNP", skup),
        (0xF, _, 0x0, 0x7) => instruction("LD", moved),
        (0xF, _, 0x0, 0xA) => instruction("LD", keyd),
        (0xF, _, 0x1, 0x5) => instruction("LD", setd),
        (0xF, _, 0x1, 0x8) => instruction("LD", sets),
        (0xF, _, 0x1, 0xE) => instruction("ADD", addi),
        (0xF, _, 0x2, 0x9) => instruction("LD", ldspr),
        (0xF, _, 0x3, 0x3) => instruction("LD", bcd),
        (0xF, _, 0x5, 0x5) => instruction("LD", stor),
        (0xF, _, 0x6, 0x5) => instruction("LD", read),
        _ => return None,
    };
    Some(decoded)
}
