//! What can go wrong, either while turning text into instructions or while running them.

use thiserror::Error;

use crate::address::{CellAddress, Word};
use crate::bytecode::disassemble;
use crate::register::{RegisterDump, REGISTER_COUNT};

/// Every variant carries the token that could not be assembled.
#[derive(Error, Clone, Debug, Eq, PartialEq)]
pub enum AssemblyError {
  #[error("cannot parse instruction `{0}`")]
  MalformedInstruction(String),

  #[error("`{0}` is not a mnemonic (expected add, sub or mov)")]
  UnknownMnemonic(String),

  #[error("{mnemonic} takes {expected} operands but was given {found}")]
  WrongOperandCount {
    mnemonic : String,
    expected : usize,
    found    : usize
  },

  #[error("not a register: `{0}`")]
  UnknownRegisterName(String),

  #[error("cannot parse operand `{0}`")]
  MalformedOperand(String),

  #[error("constant `{0}` is not a single hex digit")]
  ConstantOutOfRange(String),

  #[error("can't use {register} as a key in `{operand}` ({reason})")]
  IllegalKeyRegister {
    operand  : String,
    register : String,
    reason   : &'static str
  },

  #[error("cannot write to constant `{0}`")]
  IllegalWriteTarget(String),

  #[error("cannot parse conditional `{0}`")]
  MalformedConditional(String),

  #[error("not a valid comparison operator: `{0}`")]
  UnknownComparison(String),

  #[error("unexpected `{0}` after instruction")]
  TrailingInput(String),

  #[error("error on line {line}: {source}")]
  OnLine {
    line   : usize,
    source : Box<AssemblyError>
  },
}

impl AssemblyError {
  pub fn on_line(self, line: usize) -> AssemblyError {
    AssemblyError::OnLine{ line, source: Box::new(self) }
  }
}


#[derive(Error, Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum FaultKind {
  #[error("not an instruction (opcode {0:#04x})")]
  IllegalOpcode(u8),

  #[error("write to constant ${0:x}")]
  IllegalWriteTarget(u8),

  #[error("ran too long")]
  RunLengthExceeded,
}

/**
  A machine fault. The machine is halted by the time one of these exists. It records the word
  being executed, where it was fetched from, and the register file at the moment of failure.
*/
#[derive(Error, Clone, Debug, Eq, PartialEq)]
#[error(
  "FATAL> {kind} at {address}: {word:#x} `{}`\n{}",
  disassembly(.word),
  RegisterDump(.registers)
)]
pub struct Fault {
  #[source]
  pub kind      : FaultKind,
  pub word      : Word,
  pub address   : CellAddress,
  pub registers : [Word; REGISTER_COUNT],
}

fn disassembly(word: &Word) -> String {
  disassemble(*word)
}
