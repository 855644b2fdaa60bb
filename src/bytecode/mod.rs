/*!

  Instructions are a single 64 bit word. The low byte is the opcode; above it sit three operand
  override pairs (destination, source A, source B), each a 4 bit key and a 4 bit index, and
  above those the 12 bit conditional field: two register numbers and the comparison between
  them. Bits 44 and up are reserved. See `binary` for the exact layout.

  The all-zero word is not an instruction. It terminates a program, and the machine stops when
  it fetches one. Since `add` is `0xFF` and `sub` is `0xFE`, no well-formed instruction
  encodes to zero.

  Three modules share the layout:

    * `binary` packs and unpacks words,
    * `assembly` turns a line of text into a word,
    * `disassembly` turns a word (or a program in memory) back into text.

  The text produced by `disassemble` is exactly the text `assemble` accepts, so for any line
  the disassembler prints, `disassemble(assemble(line)) == line`.

*/

mod binary;
mod instruction;
mod assembly;
mod disassembly;

pub use binary::{decode_instruction, encode_instruction, is_canonical, Field, FIELD_BITS,
                 FIELD_MASK};
pub use instruction::{Condition, Instruction, Operand, Operation, CONSTANT_KEY,
                      REGISTER_ACCESS_KEY};
pub use assembly::{assemble, assemble_instruction, assemble_program};
pub use disassembly::{disassemble, disassemble_program, hex_dump, listing_line};
