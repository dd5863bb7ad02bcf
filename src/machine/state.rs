//! Mutable machine snapshot: the flat word memory plus the two registers
//! that live outside the addressable range.

use std::fmt;
use std::io::{self, Write};

use crate::machine::command::Command;
use crate::machine::opcode::{Opcode, describe};
use crate::machine::resolve::SymbolTable;
use crate::machine::word::{ADDRESS_MASK, Address, MEMORY_WORDS, VALUE_MASK, Word, mask_address};

/// Target of a read or write. The registers are deliberately not aliased
/// into the memory array; using dedicated variants instead of reserved
/// indices makes a collision with a real address unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    /// An addressable memory cell. The index is masked before every use.
    Mem(Address),
    /// Instruction address register: points at the next word to fetch.
    Iar,
    /// Accumulator: the sole general-purpose operand register.
    Accu,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Mem(addr) => write!(f, "mem[0x{:05x}]", addr & ADDRESS_MASK),
            Location::Iar => write!(f, "IAR"),
            Location::Accu => write!(f, "ACCU"),
        }
    }
}

/// Word-addressable memory with the IAR and ACCU held out of band.
///
/// Every read and write masks the memory index, so out-of-range
/// addressing cannot occur.
#[derive(Debug)]
pub struct MachineState {
    mem: Box<[Word]>,
    iar: Word,
    accu: Word,
}

impl MachineState {
    /// Zeroed memory and registers.
    pub fn new() -> Self {
        Self {
            mem: vec![0; MEMORY_WORDS].into_boxed_slice(),
            iar: 0,
            accu: 0,
        }
    }

    /// Encodes a resolved program into fresh memory.
    ///
    /// Each command's mnemonic selects the top bits of its cell; unless
    /// the instruction is one of the extended no-argument opcodes, the
    /// low 20 bits carry the numeric argument. A mnemonic missing from
    /// the table encodes as an all-ones word, which no opcode claims, so
    /// executing it ends the run.
    pub fn from_program(commands: &[Command]) -> Self {
        let mut state = Self::new();
        for command in commands {
            let Some(mnemonic) = command.mnemonic.as_deref() else {
                continue;
            };
            let encoded = match Opcode::from_mnemonic(mnemonic) {
                Some(op) => {
                    let mut word = op.base_word();
                    if op.takes_argument() {
                        word |= command.value_arg & ADDRESS_MASK;
                    }
                    word
                }
                None => VALUE_MASK,
            };
            state.mem[mask_address(command.address) as usize] = encoded;
        }
        state
    }

    pub fn get(&self, location: Location) -> Word {
        match location {
            Location::Mem(addr) => self.mem[mask_address(addr) as usize],
            Location::Iar => self.iar,
            Location::Accu => self.accu,
        }
    }

    pub fn set(&mut self, location: Location, value: Word) {
        match location {
            Location::Mem(addr) => self.mem[mask_address(addr) as usize] = value,
            Location::Iar => self.iar = value,
            Location::Accu => self.accu = value,
        }
    }

    /// Writes the registers and every symbol-table entry to `out`.
    /// Inspection only; mirrors what an interactive front end shows.
    pub fn write_summary<W: Write>(&self, symbols: &SymbolTable, out: &mut W) -> io::Result<()> {
        let at_iar = self.mem[mask_address(self.iar) as usize];
        writeln!(
            out,
            "IAR  = 0x{:06x} = {:8}\t(instruction there: {})",
            self.iar,
            self.iar,
            describe(at_iar)
        )?;
        writeln!(out, "ACCU = 0x{:06x} = {:8}", self.accu, self.accu)?;
        let mut entries: Vec<_> = symbols.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        for (name, location) in entries {
            let value = self.get(location);
            writeln!(
                out,
                "Label '{name}' at {location}  =  0x{value:06x} = {value:8} = {}",
                describe(value)
            )?;
        }
        Ok(())
    }

    /// Dumps the inclusive memory range `from..=to`, one cell per line.
    pub fn write_memory_range<W: Write>(
        &self,
        from: Address,
        to: Address,
        out: &mut W,
    ) -> io::Result<()> {
        let from = mask_address(from);
        let to = mask_address(to);
        for addr in from..=to {
            let value = self.mem[addr as usize];
            writeln!(
                out,
                "mem[0x{addr:05x}] = 0x{value:06x} = {value:8} = {}",
                describe(value)
            )?;
        }
        Ok(())
    }
}

impl Default for MachineState {
    fn default() -> Self {
        Self::new()
    }
}
