//! Instruction words back to text, either one at a time or by walking a program in memory.

use crate::address::{AddressSpace, Index, Key, Word};
use super::decode_instruction;

/// The assembly text of `word`. Illegal opcodes print as `unknown[0x..]` rather than failing.
pub fn disassemble(word: Word) -> String {
  decode_instruction(word).to_string()
}

/**
  The raw word in hex, split into its high and low 32 bits. When the high half is zero it is
  left blank so the low halves line up:

  ```text
  0x00000113080086ff
          0x0d0086ff
  ```
*/
pub fn hex_dump(word: Word) -> String {
  let high = (word >> 32) & 0xFFFF_FFFF;
  let low  = word & 0xFFFF_FFFF;
  match high {
    0 => format!("        0x{:08x}", low),
    _ => format!("0x{:08x}{:08x}", high, low)
  }
}

/// The hex dump of `word` followed by its assembly text.
pub fn listing_line(word: Word) -> String {
  format!("{}   {}", hex_dump(word), disassemble(word))
}

/**
  Walks forward from `(key, index)` until it reads a zero word, producing one listing line per
  instruction, each prefixed with its index in hex. The terminator itself is not listed.
*/
pub fn disassemble_program(space: &AddressSpace, key: Key, index: Index) -> Vec<String> {
  let mut lines = vec![];
  let mut cursor = index;

  loop {
    let word = space.read(key, cursor);
    if word == 0 {
      break;
    }
    lines.push(format!("{:>2x}: {}", cursor, listing_line(word)));
    cursor = cursor.wrapping_add(1);
  }

  lines
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::address::DEFAULT_PROGRAM_KEY;
  use crate::bytecode::{assemble, assemble_program};
  use pretty_assertions::assert_eq;
  use proptest::prelude::*;

  #[test]
  fn disassemble_sample_words(){
    assert_eq!(disassemble(0x028F8FFF),       "add r2, $f, $f");
    assert_eq!(disassemble(0x0D0086FF),       "mov DX, $6");
    assert_eq!(disassemble(0xCD0002FF),       "mov hashtable[DK/DX], r2");
    assert_eq!(disassemble(0x0100CDFF),       "mov r1, hashtable[DK/DX]");
    assert_eq!(disassemble(0x113_0800_86FF),  "if(r1<r3) mov PX, $6");
    assert_eq!(disassemble(0x010283FE),       "sub r1, r2, $3");
  }

  #[test]
  fn disassemble_unknown_opcode(){
    assert_eq!(disassemble(0x0100CD01), "unknown[0x01] r1, $0, hashtable[DK/DX]");
    assert_eq!(disassemble(0), "unknown[0x00] $0, $0, $0");
  }

  #[test]
  fn hex_dumps(){
    assert_eq!(hex_dump(0x0D0086FF),       "        0x0d0086ff");
    assert_eq!(hex_dump(0x113_0800_86FF),  "0x00000113080086ff");
    assert_eq!(
      listing_line(0x113_0800_86FF),
      "0x00000113080086ff   if(r1<r3) mov PX, $6"
    );
  }

  #[test]
  fn disassemble_whole_program(){
    let mut space = AddressSpace::new();
    let program = assemble_program("mov DX, $6\nmov DK, $1\nmov hashtable[DK/DX], r2").unwrap();
    space.set_program(&program, DEFAULT_PROGRAM_KEY);

    assert_eq!(
      disassemble_program(&space, DEFAULT_PROGRAM_KEY, 0),
      vec![
        " 0:         0x0d0086ff   mov DX, $6",
        " 1:         0x0c0081ff   mov DK, $1",
        " 2:         0xcd0002ff   mov hashtable[DK/DX], r2",
      ]
    );
    assert_eq!(disassemble_program(&space, DEFAULT_PROGRAM_KEY, 1).len(), 2);
    assert!(disassemble_program(&space, 7, 0).is_empty());
  }

  #[test]
  fn canonical_lines_round_trip(){
    let lines = [
      "add hashtable[AK/DX], r3, $5",
      "mov hashtable[r6/DX], $5",
      "mov hashtable[r2/DX], $f",
      "add r2, $f, $f",
      "if(r3<$0) add r2, $f, $f",
      "if(DX==$0) add r2, $f, $f",
      "if(DX<=$0) add r2, $f, $f",
      "if(r1!=BK) sub PX, PX, $2",
      "if(r7?cr1) mov r1, r2",
      "mov DX, $6",
      "sub r1, $0, r2",
    ];
    for line in lines.iter() {
      assert_eq!(disassemble(assemble(line).unwrap()), *line);
    }
  }

  fn register_name() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
      "$0", "r1", "r2", "r3", "r4", "r5", "r6", "r7",
      "PX", "PK", "AX", "BX", "DK", "DX", "AK", "BK",
    ])
  }

  fn key_register_name() -> impl Strategy<Value = &'static str> {
    register_name().prop_filter("$0 and PX select other modes", |name| *name != "$0" && *name != "PX")
  }

  fn operand() -> impl Strategy<Value = String> {
    prop_oneof![
      register_name().prop_map(str::to_string),
      (1u8..16).prop_map(|value| format!("${:x}", value)),
      (key_register_name(), register_name())
        .prop_map(|(key, index)| format!("hashtable[{}/{}]", key, index)),
    ]
  }

  fn destination() -> impl Strategy<Value = String> {
    prop_oneof![
      register_name().prop_map(str::to_string),
      (key_register_name(), register_name())
        .prop_map(|(key, index)| format!("hashtable[{}/{}]", key, index)),
    ]
  }

  fn condition() -> impl Strategy<Value = String> {
    let symbol = prop::sample::select(vec![
      "<", "<=", "?3", "?4", "?5", "?6", "?7", "?8", "?9", "?a", "?b", "?c", "?d", "==", "!=",
    ]);
    prop_oneof![
      Just(String::new()),
      (register_name(), symbol, register_name())
        .prop_map(|(a, symbol, b)| format!("if({}{}{}) ", a, symbol, b)),
    ]
  }

  /// Lines in the form the disassembler prints. `add D, $0, B` is left out because it prints as
  /// `mov`, and the constant `$0` is left out because `$0` names the register.
  fn canonical_line() -> impl Strategy<Value = String> {
    let add_source = operand().prop_filter("prints as mov", |a| a != "$0");
    prop_oneof![
      (condition(), destination(), add_source, operand())
        .prop_map(|(c, d, a, b)| format!("{}add {}, {}, {}", c, d, a, b)),
      (condition(), destination(), operand(), operand())
        .prop_map(|(c, d, a, b)| format!("{}sub {}, {}, {}", c, d, a, b)),
      (condition(), destination(), operand())
        .prop_map(|(c, d, b)| format!("{}mov {}, {}", c, d, b)),
    ]
  }

  proptest! {
    #[test]
    fn assembly_round_trips(line in canonical_line()) {
      let word = assemble(&line);
      prop_assert!(word.is_ok(), "{}: {:?}", line, word);
      let word = word.unwrap();
      prop_assert!(crate::bytecode::is_canonical(word));
      prop_assert_eq!(disassemble(word), line);
    }
  }
}
