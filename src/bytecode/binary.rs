/*!
  This module is responsible for the encoding and decoding of binary instructions. It is the only
  place that knows where the fields of an instruction word live.

  ```text
   63        44 43   40 39   36 35   32 31 28 27 24 23 20 19 16 15 12 11  8 7      0
  [ reserved  ][cmp A  ][cmp op ][cmp B  ][ DK ][ DX ][ AK ][ AX ][ BK ][ BX ][opcode]
  ```

  Each `K`/`X` pair is an operand override; how a pair is interpreted is decided by
  `Operand::from_fields`.
*/

use crate::address::Word;
use crate::register::{Comparison, Register};
use super::{Condition, Instruction, Operand};

/// Bits 44 and up are not part of any field.
pub const FIELD_BITS: u32 = 44;
pub const FIELD_MASK: Word = (1 << FIELD_BITS) - 1;

/// The fields of an instruction word, low bits first.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum Field {
  Opcode,
  BIndex,
  BKey,
  AIndex,
  AKey,
  DIndex,
  DKey,
  CompareB,
  CompareOp,
  CompareA,
}

impl Field {
  pub fn shift(&self) -> u32 {
    match self {
      Field::Opcode    => 0,
      Field::BIndex    => 8,
      Field::BKey      => 12,
      Field::AIndex    => 16,
      Field::AKey      => 20,
      Field::DIndex    => 24,
      Field::DKey      => 28,
      Field::CompareB  => 32,
      Field::CompareOp => 36,
      Field::CompareA  => 40,
    }
  }

  pub fn mask(&self) -> Word {
    match self {
      Field::Opcode => 0xFF,
      _             => 0xF
    }
  }

  /// Extracts this field from `word`.
  pub fn get(&self, word: Word) -> Word {
    (word >> self.shift()) & self.mask()
  }

  /// Returns `word` with this field replaced by `value`, truncated to the field width.
  pub fn set(&self, word: Word, value: Word) -> Word {
    (word & !(self.mask() << self.shift())) | ((value & self.mask()) << self.shift())
  }
}

/**
  A canonical encoding is nonzero (zero is the program terminator) and has nothing in the
  reserved bits.
*/
pub fn is_canonical(word: Word) -> bool {
  word != 0 && word & !FIELD_MASK == 0
}

/**
  Every word decodes. The opcode is kept as the raw byte, so an instruction with an illegal
  opcode can still be inspected and printed; it is the machine that refuses to execute it.
  Reserved bits are ignored.
*/
pub fn decode_instruction(word: Word) -> Instruction {
  let operand = |key: Field, index: Field| {
    Operand::from_fields(key.get(word), index.get(word))
  };

  Instruction {
    condition: Condition {
      a          : Register::from_nibble(Field::CompareA.get(word)),
      comparison : Comparison::from_nibble(Field::CompareOp.get(word)),
      b          : Register::from_nibble(Field::CompareB.get(word)),
    },
    opcode      : Field::Opcode.get(word) as u8,
    destination : operand(Field::DKey, Field::DIndex),
    source_a    : operand(Field::AKey, Field::AIndex),
    source_b    : operand(Field::BKey, Field::BIndex),
  }
}

/// Packs the instruction into a word. Reserved bits are always zero.
pub fn encode_instruction(instruction: &Instruction) -> Word {
  let (d_key, d_index) = instruction.destination.fields();
  let (a_key, a_index) = instruction.source_a.fields();
  let (b_key, b_index) = instruction.source_b.fields();
  let condition = &instruction.condition;

  [
    (Field::Opcode,    instruction.opcode as Word),
    (Field::BIndex,    b_index),
    (Field::BKey,      b_key),
    (Field::AIndex,    a_index),
    (Field::AKey,      a_key),
    (Field::DIndex,    d_index),
    (Field::DKey,      d_key),
    (Field::CompareB,  condition.b.number() as Word),
    (Field::CompareOp, condition.comparison.code() as Word),
    (Field::CompareA,  condition.a.number() as Word),
  ]
    .iter()
    .fold(0, |word, (field, value)| field.set(word, *value))
}
