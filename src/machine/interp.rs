//! Fetch/decode/execute of exactly one instruction per call. The
//! interpreter owns no state and keeps no history: every read and write
//! goes through the caller-supplied [`Recorder`], which is what lets a
//! journaling recorder capture each mutation with its pre-value.

use crate::machine::opcode::Opcode;
use crate::machine::state::{Location, MachineState};
use crate::machine::word::{
    ADDRESS_MASK, VALUE_MASK, VALUE_WIDTH, Word, is_negative, mask_address, mask_value,
};

/// Read/write surface the interpreter executes against.
///
/// A write must be visible to subsequent reads within the same step.
pub trait Recorder {
    fn get(&self, location: Location) -> Word;
    fn set(&mut self, location: Location, value: Word);
}

/// Direct, unrecorded application. Useful for headless unit tests and
/// one-off state surgery outside a journaled run.
impl Recorder for MachineState {
    fn get(&self, location: Location) -> Word {
        MachineState::get(self, location)
    }

    fn set(&mut self, location: Location, value: Word) {
        MachineState::set(self, location, value)
    }
}

/// Whether the machine can take another step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    /// `HALT`, an unmapped opcode, or an unmapped extended code point.
    /// End of run, never an error: the machine visibly stops instead of
    /// crashing.
    Halted,
}

pub struct Interpreter;

impl Interpreter {
    /// Executes the instruction at `IAR`. Performs no writes when the
    /// outcome is [`StepOutcome::Halted`].
    pub fn step<R: Recorder>(rec: &mut R) -> StepOutcome {
        let word = rec.get(Location::Mem(mask_address(rec.get(Location::Iar))));
        let arg = word & ADDRESS_MASK;
        match Opcode::decode(word) {
            Some(Opcode::Ldc) => {
                // Top nibble is the (zero) opcode, so the full word is
                // the constant.
                rec.set(Location::Accu, word);
                Self::inc_iar(rec);
            }
            Some(Opcode::Ldv) => {
                let value = rec.get(Location::Mem(arg));
                rec.set(Location::Accu, value);
                Self::inc_iar(rec);
            }
            Some(Opcode::Stv) => {
                let value = rec.get(Location::Accu);
                rec.set(Location::Mem(arg), value);
                Self::inc_iar(rec);
            }
            Some(Opcode::Add) => Self::binary_op(rec, arg, |x, y| x + y),
            Some(Opcode::And) => Self::binary_op(rec, arg, |x, y| x & y),
            Some(Opcode::Or) => Self::binary_op(rec, arg, |x, y| x | y),
            Some(Opcode::Xor) => Self::binary_op(rec, arg, |x, y| x ^ y),
            Some(Opcode::Eql) => {
                Self::binary_op(rec, arg, |x, y| if x == y { VALUE_MASK } else { 0 })
            }
            Some(Opcode::Jmp) => rec.set(Location::Iar, arg),
            Some(Opcode::Jmn) => {
                if is_negative(rec.get(Location::Accu)) {
                    rec.set(Location::Iar, arg);
                } else {
                    Self::inc_iar(rec);
                }
            }
            Some(Opcode::Ldiv) => {
                // The cell may hold a full-width word; spurious high bits
                // must not leak into the dereference.
                let target = mask_address(rec.get(Location::Mem(arg)));
                let value = rec.get(Location::Mem(target));
                rec.set(Location::Accu, value);
                Self::inc_iar(rec);
            }
            Some(Opcode::Stiv) => {
                let target = mask_address(rec.get(Location::Mem(arg)));
                let value = rec.get(Location::Accu);
                rec.set(Location::Mem(target), value);
                Self::inc_iar(rec);
            }
            Some(Opcode::Jms) => {
                // Return address lands at the jump target's own cell; the
                // subroutine body starts one behind it.
                let return_addr = rec.get(Location::Iar) + 1;
                rec.set(Location::Mem(arg), return_addr);
                rec.set(Location::Iar, mask_address(arg + 1));
            }
            Some(Opcode::Jind) => {
                let target = mask_address(rec.get(Location::Mem(arg)));
                rec.set(Location::Iar, target);
            }
            Some(Opcode::Not) => {
                let value = mask_value(!rec.get(Location::Accu));
                rec.set(Location::Accu, value);
                Self::inc_iar(rec);
            }
            Some(Opcode::Rar) => {
                let accu = rec.get(Location::Accu);
                let rotated = (accu >> 1) | ((accu & 1) << (VALUE_WIDTH - 1));
                rec.set(Location::Accu, rotated);
                Self::inc_iar(rec);
            }
            Some(Opcode::Halt) | None => return StepOutcome::Halted,
        }
        StepOutcome::Continue
    }

    fn inc_iar<R: Recorder>(rec: &mut R) {
        let next = mask_address(rec.get(Location::Iar) + 1);
        rec.set(Location::Iar, next);
    }

    fn binary_op<R: Recorder>(rec: &mut R, arg: Word, f: impl Fn(Word, Word) -> Word) {
        let lhs = rec.get(Location::Accu);
        let rhs = rec.get(Location::Mem(arg));
        rec.set(Location::Accu, mask_value(f(lhs, rhs)));
        Self::inc_iar(rec);
    }
}
