//! The unified store: key 0 is the register file, every other key is an area of sparse memory.
//! A location is always a `(key, index)` pair, so the operand logic never has to ask which of the
//! two backing stores it is talking to.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use crate::register::{Register, REGISTER_COUNT};

/// The one data type of the machine: register contents, memory contents and instructions.
pub type Word = i64;
/// An area of memory. Key 0 is reserved for the registers.
pub type Key = Word;
/// A location within a key's area.
pub type Index = Word;

pub const REGISTER_KEY: Key = 0;
/// Where `set_program` puts a program unless told otherwise.
pub const DEFAULT_PROGRAM_KEY: Key = 0xC0DE;

#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct CellAddress {
  pub key   : Key,
  pub index : Index
}

impl CellAddress {
  pub fn new(key: Key, index: Index) -> CellAddress {
    CellAddress{ key, index }
  }

  pub fn is_register(&self) -> bool {
    self.key == REGISTER_KEY
  }
}

impl Display for CellAddress {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self.is_register() {
      true  => write!(f, "{}", Register::from_nibble(self.index)),
      false => write!(f, "{:x}/{:x}", self.key, self.index)
    }
  }
}


#[derive(Clone, Debug, Default)]
pub struct AddressSpace {
  registers : [Word; REGISTER_COUNT],
  // Only cells that have been written occupy space.
  cells     : HashMap<CellAddress, Word>,
}

impl AddressSpace {

  pub fn new() -> AddressSpace {
    AddressSpace::default()
  }

  /// Reading never allocates; an absent cell reads as zero.
  pub fn read(&self, key: Key, index: Index) -> Word {
    match key == REGISTER_KEY {
      true  => self.registers[(index & 0xF) as usize],
      false => self.cells.get(&CellAddress::new(key, index)).copied().unwrap_or(0)
    }
  }

  /// The slot at `(key, index)`, creating it if it is an absent memory cell.
  pub fn write(&mut self, key: Key, index: Index) -> &mut Word {
    match key == REGISTER_KEY {
      true  => &mut self.registers[(index & 0xF) as usize],
      false => self.cells.entry(CellAddress::new(key, index)).or_insert(0)
    }
  }

  pub fn store(&mut self, key: Key, index: Index, value: Word) {
    *self.write(key, index) = value;
  }

  pub fn register(&self, register: Register) -> Word {
    self.registers[register.idx()]
  }

  pub fn set_register(&mut self, register: Register, value: Word) {
    self.registers[register.idx()] = value;
  }

  pub fn registers(&self) -> &[Word; REGISTER_COUNT] {
    &self.registers
  }

  pub fn is_allocated(&self, key: Key, index: Index) -> bool {
    key != REGISTER_KEY && self.cells.contains_key(&CellAddress::new(key, index))
  }

  /// Number of memory cells (registers excluded) that occupy space.
  pub fn allocated_cells(&self) -> usize {
    self.cells.len()
  }

  /// Every allocated memory cell, ordered by `(key, index)`.
  pub fn cells(&self) -> Vec<(CellAddress, Word)> {
    let mut cells: Vec<(CellAddress, Word)> =
      self.cells.iter().map(|(address, value)| (*address, *value)).collect();
    cells.sort();
    cells
  }

  /// Zeroes the registers and forgets all memory.
  pub fn clear(&mut self) {
    self.registers = [0; REGISTER_COUNT];
    self.cells.clear();
  }

  /**
    Copies `code` into `key` starting at index 0 and points `PK`/`PX` at its first word. Copying
    stops after the first zero word, the terminator; if `code` has none, one is written after the
    last word.
  */
  pub fn set_program(&mut self, code: &[Word], key: Key) {
    self.set_register(Register::PK, key);
    self.set_register(Register::PX, 0);

    let mut end: Index = 0;
    for word in code {
      self.store(key, end, *word);
      end += 1;
      if *word == 0 {
        return;
      }
    }
    self.store(key, end, 0);
  }

}
