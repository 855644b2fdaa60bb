use std::fmt::{Display, Formatter};

use strum_macros::{Display as StrumDisplay, EnumString, IntoStaticStr};
use num_enum::{TryFromPrimitive, IntoPrimitive};

use crate::address::Word;
use crate::register::{Comparison, Register};

/// The key nibble that selects constant mode. Register 8 is `PX`, which is why `PX` can never
/// be the key of an indirect operand.
pub const CONSTANT_KEY: Word = 8;
/// The key nibble that selects register-access mode.
pub const REGISTER_ACCESS_KEY: Word = 0;

/// The operations the machine executes, by opcode byte.
#[derive(
StrumDisplay, IntoStaticStr, EnumString, TryFromPrimitive, IntoPrimitive,
Clone,        Copy,          Eq, PartialEq,  Debug,            Hash
)]
#[repr(u8)]
pub enum Operation {
  /// D = A + B
  #[strum(serialize = "add")] Add = 0xFF,
  /// D = A - B
  #[strum(serialize = "sub")] Sub = 0xFE,
}

impl Operation {
  pub fn code(&self) -> u8 {
    Into::<u8>::into(*self)
  }

  /// Two's complement, so no operand values can trap.
  pub fn apply(&self, a: Word, b: Word) -> Word {
    match self {
      Operation::Add => a.wrapping_add(b),
      Operation::Sub => a.wrapping_sub(b),
    }
  }
}


/**
  One `(K, X)` override pair, interpreted by addressing mode:

    * `K == 0`: register access, the operand is `registers[X]`.
    * `K == 8`: constant, the operand is the number `X` itself and cannot be written.
    * otherwise: indirect, `K` and `X` name registers holding the key and index of a memory cell.
*/
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum Operand {
  Register(Register),
  Constant(u8),
  /// The key register is never `$0` or `PX`; those nibbles select the other two modes.
  Indirect {
    key   : Register,
    index : Register
  }
}

impl Operand {
  pub fn from_fields(key: Word, index: Word) -> Operand {
    match key & 0xF {
      REGISTER_ACCESS_KEY => Operand::Register(Register::from_nibble(index)),
      CONSTANT_KEY        => Operand::Constant((index & 0xF) as u8),
      _                   => Operand::Indirect {
        key   : Register::from_nibble(key),
        index : Register::from_nibble(index)
      }
    }
  }

  /// The `(K, X)` nibbles for this operand.
  pub fn fields(&self) -> (Word, Word) {
    match self {
      Operand::Register(register)   => (REGISTER_ACCESS_KEY, register.number() as Word),
      Operand::Constant(value)      => (CONSTANT_KEY, (value & 0xF) as Word),
      Operand::Indirect{key, index} => (key.number() as Word, index.number() as Word)
    }
  }

  pub fn is_constant(&self) -> bool {
    match self {
      Operand::Constant(_) => true,
      _                    => false
    }
  }
}

impl Display for Operand {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Operand::Register(register)   => write!(f, "{}", register),
      Operand::Constant(value)      => write!(f, "${:x}", value),
      Operand::Indirect{key, index} => write!(f, "hashtable[{}/{}]", key, index),
    }
  }
}


/// `if(A<op>B)`: the instruction only executes when the comparison holds.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub struct Condition {
  pub a          : Register,
  pub comparison : Comparison,
  pub b          : Register,
}

impl Condition {
  pub const ALWAYS: Condition = Condition {
    a          : Register::Zero,
    comparison : Comparison::Always,
    b          : Register::Zero
  };

  pub fn holds(&self, registers: &[Word]) -> bool {
    self.comparison.holds(registers[self.a.idx()], registers[self.b.idx()])
  }
}

impl Display for Condition {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "if({}{}{})", self.a, self.comparison, self.b)
  }
}


/// The unencoded components of an instruction word.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub struct Instruction {
  pub condition   : Condition,
  /// The raw opcode byte, which need not name an `Operation`.
  pub opcode      : u8,
  pub destination : Operand,
  pub source_a    : Operand,
  pub source_b    : Operand,
}

impl Instruction {
  pub fn new(operation: Operation, destination: Operand, source_a: Operand, source_b: Operand)
    -> Instruction
  {
    Instruction {
      condition: Condition::ALWAYS,
      opcode: operation.code(),
      destination,
      source_a,
      source_b
    }
  }

  /// `mov D, B` is `add D, $0, B`.
  pub fn mov(destination: Operand, source: Operand) -> Instruction {
    Instruction::new(Operation::Add, destination, Operand::Register(Register::Zero), source)
  }

  pub fn when(self, condition: Condition) -> Instruction {
    Instruction { condition, ..self }
  }

  pub fn operation(&self) -> Option<Operation> {
    Operation::try_from_primitive(self.opcode).ok()
  }

  pub fn is_conditional(&self) -> bool {
    self.condition.comparison != Comparison::Always
  }

  /// An `add` whose first source is the `$0` register prints as `mov`.
  pub fn is_mov(&self) -> bool {
    self.operation() == Some(Operation::Add)
      && self.source_a == Operand::Register(Register::Zero)
  }

  pub fn encode(&self) -> Word {
    super::encode_instruction(self)
  }
}

/// The assembly text of the instruction; this is what the assembler reads back.
impl Display for Instruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    if self.is_conditional() {
      write!(f, "{} ", self.condition)?;
    }

    match self.operation() {

      Some(Operation::Add) if self.is_mov() => {
        write!(f, "mov {}, {}", self.destination, self.source_b)
      }

      Some(operation) => {
        write!(f, "{} {}, {}, {}", operation, self.destination, self.source_a, self.source_b)
      }

      None => {
        write!(
          f,
          "unknown[{:#04x}] {}, {}, {}",
          self.opcode, self.destination, self.source_a, self.source_b
        )
      }

    }
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn operand_fields_select_modes(){
    assert_eq!(Operand::from_fields(0, 3), Operand::Register(Register::R3));
    assert_eq!(Operand::from_fields(8, 0xF), Operand::Constant(15));
    assert_eq!(
      Operand::from_fields(0xC, 0xD),
      Operand::Indirect{ key: Register::DK, index: Register::DX }
    );
    assert_eq!(Operand::Constant(6).fields(), (8, 6));
  }

  #[test]
  fn operations_wrap(){
    assert_eq!(Operation::Add.apply(Word::MAX, 1), Word::MIN);
    assert_eq!(Operation::Sub.apply(Word::MIN, 1), Word::MAX);
    assert_eq!(Operation::Sub.apply(2, 5), -3);
  }

  #[test]
  fn display_mov(){
    let instruction = Instruction::mov(Operand::Register(Register::DX), Operand::Constant(6));
    assert_eq!(instruction.to_string(), "mov DX, $6");
    assert_eq!(instruction.encode(), 0x0D0086FF);
  }

  #[test]
  fn display_conditional(){
    let instruction =
      Instruction::new(
        Operation::Add,
        Operand::Register(Register::R2),
        Operand::Constant(0xF),
        Operand::Constant(0xF)
      ).when(Condition{ a: Register::R3, comparison: Comparison::Less, b: Register::Zero });
    assert_eq!(instruction.to_string(), "if(r3<$0) add r2, $f, $f");
  }

  #[test]
  fn display_sub_from_zero_is_not_mov(){
    let instruction =
      Instruction::new(
        Operation::Sub,
        Operand::Register(Register::R1),
        Operand::Register(Register::Zero),
        Operand::Register(Register::R2)
      );
    assert_eq!(instruction.to_string(), "sub r1, $0, r2");
  }

  #[test]
  fn display_unknown_opcode(){
    let mut instruction =
      Instruction::mov(Operand::Register(Register::R1), Operand::Register(Register::R2));
    instruction.opcode = 0x7A;
    assert_eq!(instruction.to_string(), "unknown[0x7a] r1, $0, r2");
  }
}
