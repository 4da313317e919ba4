use crate::constants::STACK_DEPTH;

/// Return addresses for nested subroutine calls.
///
/// Holds at most `STACK_DEPTH` entries; `push` and `pop` report overflow and
/// underflow by returning `None` so the caller can attach the faulting pc.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Stack {
    slots: [u16; STACK_DEPTH],
    sp: u8,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a return address, or `None` if the stack is full
    #[must_use]
    pub fn push(&self, addr: u16) -> Option<Stack> {
        let sp = self.sp as usize;
        if sp == STACK_DEPTH {
            return None;
        }
        let mut slots = self.slots;
        slots[sp] = addr;
        Some(Stack {
            slots,
            sp: self.sp + 1,
        })
    }

    /// Pops the most recent return address, or `None` if the stack is empty
    #[must_use]
    pub fn pop(&self) -> Option<(u16, Stack)> {
        let sp = self.sp.checked_sub(1)?;
        Some((
            self.slots[sp as usize],
            Stack {
                sp,
                ..*self
            },
        ))
    }

    /// Number of return addresses currently held
    pub fn depth(&self) -> usize {
        self.sp as usize
    }

    pub fn is_empty(&self) -> bool {
        self.sp == 0
    }

    /// Every slot including the ones above the stack pointer
    pub fn slots(&self) -> &[u16; STACK_DEPTH] {
        &self.slots
    }

    /// Rebuilds a stack from its raw parts, or `None` if `depth` is too deep
    pub fn from_parts(slots: [u16; STACK_DEPTH], depth: usize) -> Option<Stack> {
        if depth > STACK_DEPTH {
            return None;
        }
        Some(Stack {
            slots,
            sp: depth as u8,
        })
    }
}
