/*!
  A simulator for McSIS, a small 64 bit instruction set, together with its assembler and
  disassembler.

  Registers and memory are one address space, addressed by a `(key, index)` pair: key 0 is the
  register file and every other key is an unbounded area of sparse memory. A program is a zero
  terminated sequence of instruction words loaded into a key of its own; the machine fetches from
  `PK`/`PX` until it reads the zero word.

  ```text
  text  -> [assemble] -> words -> [AddressSpace::set_program] -> [Machine::run] -> r1
  words -> [disassemble] -> text
  ```
*/

#[macro_use] extern crate prettytable;
#[macro_use] extern crate lazy_static;

pub mod address;
pub mod bytecode;
pub mod config;
pub mod error;
pub mod machine;
pub mod register;

pub use address::{AddressSpace, CellAddress, Index, Key, Word, DEFAULT_PROGRAM_KEY};
pub use bytecode::{assemble, assemble_program, disassemble, disassemble_program, listing_line};
pub use config::{Config, FaultPolicy};
pub use error::{AssemblyError, Fault, FaultKind};
pub use machine::{Machine, State};
pub use register::{Comparison, Register};
