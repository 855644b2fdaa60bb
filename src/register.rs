/*!
  Names for the sixteen slots of the register file and for the sixteen comparison codes of the
  conditional field. Both tables are fixed by the instruction set; the `strum` derives give us
  the text form used by the assembler and disassembler, and `num_enum` gives us the nibble.
*/

use std::fmt::{Display, Formatter};

use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::{Display as StrumDisplay, EnumIter, EnumString, IntoStaticStr};

use crate::address::Word;

pub const REGISTER_COUNT: usize = 16;

/**
  The register file, addressed as key 0 of the address space. Indices 10 through 15 double as the
  names of the operand override fields of an instruction, which is where their names come from.

  The order of the variants is the register number and is significant.
*/
#[derive(
StrumDisplay, IntoStaticStr, EnumString, EnumIter, TryFromPrimitive, IntoPrimitive,
Clone,        Copy,          Eq, PartialEq,  Ord, PartialOrd, Debug,     Hash
)]
#[repr(u8)]
pub enum Register {
  /// Reads as zero unless something stores into it. Never a valid key.
  #[strum(serialize = "$0")] Zero,
  #[strum(serialize = "r1")] R1,
  #[strum(serialize = "r2")] R2,
  #[strum(serialize = "r3")] R3,
  #[strum(serialize = "r4")] R4,
  #[strum(serialize = "r5")] R5,
  #[strum(serialize = "r6")] R6,
  #[strum(serialize = "r7")] R7,
  /// Program index, the instruction pointer within the program key.
  PX,
  /// Program key, the area of memory holding the running program.
  PK,
  AX, // source A index
  BX, // source B index
  DK, // destination key
  DX, // destination index
  AK, // source A key
  BK, // source B key
}

impl Register {
  pub const ALL: [Register; REGISTER_COUNT] = [
    Register::Zero, Register::R1, Register::R2, Register::R3,
    Register::R4,   Register::R5, Register::R6, Register::R7,
    Register::PX,   Register::PK, Register::AX, Register::BX,
    Register::DK,   Register::DX, Register::AK, Register::BK,
  ];

  /// Every nibble names a register, so this conversion is total.
  pub fn from_nibble(nibble: Word) -> Register {
    Register::ALL[(nibble & 0xF) as usize]
  }

  pub fn number(&self) -> u8 {
    Into::<u8>::into(*self)
  }

  pub fn idx(&self) -> usize {
    self.number() as usize
  }

  pub fn name(&self) -> &'static str {
    (*self).into()
  }
}


/**
  The comparison applied by the conditional field, `registers[A] <op> registers[B]`.

  Code 0 means "no condition." Codes 3 through 0xD are reserved: they have a placeholder
  spelling so that any word can be disassembled and reassembled, and they evaluate as true.
*/
#[derive(
StrumDisplay, IntoStaticStr, EnumString, EnumIter, TryFromPrimitive, IntoPrimitive,
Clone,        Copy,          Eq, PartialEq,  Debug,     Hash
)]
#[repr(u8)]
pub enum Comparison {
  #[strum(serialize = "")]   Always,
  #[strum(serialize = "<")]  Less,
  #[strum(serialize = "<=")] LessEqual,
  #[strum(serialize = "?3")] Reserved3,
  #[strum(serialize = "?4")] Reserved4,
  #[strum(serialize = "?5")] Reserved5,
  #[strum(serialize = "?6")] Reserved6,
  #[strum(serialize = "?7")] Reserved7,
  #[strum(serialize = "?8")] Reserved8,
  #[strum(serialize = "?9")] Reserved9,
  #[strum(serialize = "?a")] ReservedA,
  #[strum(serialize = "?b")] ReservedB,
  #[strum(serialize = "?c")] ReservedC,
  #[strum(serialize = "?d")] ReservedD,
  #[strum(serialize = "==")] Equal,
  #[strum(serialize = "!=")] NotEqual,
}

impl Comparison {
  pub const ALL: [Comparison; 16] = [
    Comparison::Always,    Comparison::Less,      Comparison::LessEqual, Comparison::Reserved3,
    Comparison::Reserved4, Comparison::Reserved5, Comparison::Reserved6, Comparison::Reserved7,
    Comparison::Reserved8, Comparison::Reserved9, Comparison::ReservedA, Comparison::ReservedB,
    Comparison::ReservedC, Comparison::ReservedD, Comparison::Equal,     Comparison::NotEqual,
  ];

  pub fn from_nibble(nibble: Word) -> Comparison {
    Comparison::ALL[(nibble & 0xF) as usize]
  }

  pub fn code(&self) -> u8 {
    Into::<u8>::into(*self)
  }

  pub fn symbol(&self) -> &'static str {
    (*self).into()
  }

  pub fn is_reserved(&self) -> bool {
    match self {
      | Comparison::Always
      | Comparison::Less
      | Comparison::LessEqual
      | Comparison::Equal
      | Comparison::NotEqual => false,
      _                      => true
    }
  }

  /// Reserved codes hold, so an instruction carrying one always executes.
  pub fn holds(&self, a: Word, b: Word) -> bool {
    match self {
      Comparison::Less      => a < b,
      Comparison::LessEqual => a <= b,
      Comparison::Equal     => a == b,
      Comparison::NotEqual  => a != b,
      _                     => true
    }
  }
}


/// A register file snapshot, printed the way the machine dumps it on a fault:
/// `$0=0 r1=2a r2=0 ...` in hex.
pub struct RegisterDump<'a>(pub &'a [Word; REGISTER_COUNT]);

impl<'a> Display for RegisterDump<'a> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let text =
      Register::ALL
        .iter()
        .zip(self.0.iter())
        .map(|(register, value)| format!("{}={:x}", register, value))
        .collect::<Vec<String>>()
        .join(" ");
    write!(f, "{}", text)
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use std::str::FromStr;
  use strum::IntoEnumIterator;

  #[test]
  fn register_names_round_trip(){
    for (i, register) in Register::iter().enumerate() {
      assert_eq!(register.idx(), i);
      assert_eq!(Register::from_str(register.name()), Ok(register));
      assert_eq!(Register::from_nibble(i as Word), register);
    }
    assert_eq!(Register::from_str("$0"), Ok(Register::Zero));
    assert_eq!(Register::from_str("DK"), Ok(Register::DK));
  }

  #[test]
  fn register_names_are_case_sensitive(){
    assert!(Register::from_str("R1").is_err());
    assert!(Register::from_str("px").is_err());
  }

  #[test]
  fn from_nibble_masks(){
    assert_eq!(Register::from_nibble(0x1D), Register::DX);
    assert_eq!(Comparison::from_nibble(0x21), Comparison::Less);
  }

  #[test]
  fn comparison_codes(){
    assert_eq!(Comparison::Less.code(), 0x1);
    assert_eq!(Comparison::LessEqual.code(), 0x2);
    assert_eq!(Comparison::Equal.code(), 0xE);
    assert_eq!(Comparison::NotEqual.code(), 0xF);
    for (i, comparison) in Comparison::iter().enumerate() {
      assert_eq!(comparison.code() as usize, i);
    }
  }

  #[test]
  fn comparisons_evaluate(){
    assert!( Comparison::Less.holds(2, 5));
    assert!(!Comparison::Less.holds(5, 5));
    assert!( Comparison::LessEqual.holds(5, 5));
    assert!( Comparison::Equal.holds(-1, -1));
    assert!( Comparison::NotEqual.holds(-1, 1));
  }

  #[test]
  fn reserved_comparisons_always_hold(){
    for comparison in Comparison::iter().filter(Comparison::is_reserved) {
      assert!(comparison.holds(5, 2), "{:?}", comparison);
      assert!(comparison.holds(2, 5), "{:?}", comparison);
    }
  }

  #[test]
  fn register_dump_format(){
    let mut registers = [0 as Word; REGISTER_COUNT];
    registers[1] = 42;
    registers[9] = 0xC0DE;
    let text = RegisterDump(&registers).to_string();
    assert!(text.starts_with("$0=0 r1=2a r2=0 "));
    assert!(text.contains("PK=c0de"));
    assert!(text.ends_with("BK=0"));
  }
}
