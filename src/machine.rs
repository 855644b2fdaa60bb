//! The McSIS machine: fetches instruction words from the program key, skips the ones whose
//! condition fails, and executes the rest against the address space.

use std::fmt::{Display, Formatter};

use log::{debug, error};
use prettytable::{format as TableFormat, Table};

use crate::address::{AddressSpace, CellAddress, Word, REGISTER_KEY};
use crate::bytecode::{decode_instruction, disassemble, listing_line, Operand};
use crate::config::{Config, FaultPolicy};
use crate::error::{Fault, FaultKind};
use crate::register::{Register, RegisterDump};

/// Log target of the debug trace.
pub const TRACE_TARGET: &str = "mcsis::trace";

#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum State {
  Running,
  /// Terminal. Reached by fetching the zero word or by a fault.
  Halted
}

impl Display for State {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      State::Running => write!(f, "Running"),
      State::Halted  => write!(f, "Halted")
    }
  }
}


pub struct Machine {
  space  : AddressSpace,
  config : Config,
  state  : State,
  leash  : u64, // Instructions remaining to execute
  steps  : u64, // Instructions executed (or skipped) so far
}

impl Machine {

  // region Display methods

  fn make_register_table(registers: &[Word], highlight: Register) -> Table {
    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Register", ubl->"Contents"]);

    for (register, value) in Register::ALL.iter().zip(registers.iter()) {
      match *register == highlight {

        true  => {
          table.add_row(row![r->format!("* --> {} =", register), format!("{:x}", value)]);
        }

        false => {
          table.add_row(row![r->format!("{} =", register), format!("{:x}", value)]);
        }

      } // end match on highlight
    } // end for
    table
  }

  fn make_memory_table(&self) -> Table {
    let mut table = Table::new();
    let program_key = self.space.register(Register::PK);

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Cell", ubl->"Contents"]);

    for (address, value) in self.space.cells() {
      let contents =
        match address.key == program_key && value != 0 {
          true  => format!("{:x}   {}", value, disassemble(value)),
          false => format!("{:x}", value)
        };
      table.add_row(row![r->format!("{} =", address), contents]);
    }
    table
  }

  // endregion

  // region Construction

  /// A machine with `program` loaded at `config.program_key`, registers zeroed.
  pub fn new(program: &[Word], config: Config) -> Machine {
    let mut space = AddressSpace::new();
    space.set_program(program, config.program_key);
    Machine::with_address_space(space, config)
  }

  /// A machine running whatever `PK`/`PX` in `space` point at.
  pub fn with_address_space(space: AddressSpace, config: Config) -> Machine {
    Machine {
      space,
      config,
      state: State::Running,
      leash: config.leash,
      steps: 0
    }
  }

  /// Discards all registers and memory, loads `program` and restores the budget.
  pub fn reload(&mut self, program: &[Word]) {
    self.space.clear();
    self.space.set_program(program, self.config.program_key);
    self.state = State::Running;
    self.leash = self.config.leash;
    self.steps = 0;
  }

  // endregion

  // region Accessors

  pub fn state(&self) -> State {
    self.state
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  /// Instructions left before the run is cut off.
  pub fn leash(&self) -> u64 {
    self.leash
  }

  pub fn steps_executed(&self) -> u64 {
    self.steps
  }

  pub fn address_space(&self) -> &AddressSpace {
    &self.space
  }

  pub fn address_space_mut(&mut self) -> &mut AddressSpace {
    &mut self.space
  }

  pub fn set_debug(&mut self, debug: bool) {
    self.config.debug = debug;
  }

  /// `$0=0 r1=2a r2=0 ...`, in hex.
  pub fn dump_registers(&self) -> String {
    RegisterDump(self.space.registers()).to_string()
  }

  // endregion

  // region Operands

  /// Where an operand lives. A constant lives nowhere, so its value comes back as the error.
  fn locate(&self, operand: &Operand) -> Result<CellAddress, Word> {
    match operand {
      Operand::Register(register)   => Ok(CellAddress::new(REGISTER_KEY, register.idx() as Word)),
      Operand::Constant(value)      => Err(*value as Word),
      Operand::Indirect{key, index} => Ok(CellAddress::new(
        self.space.register(*key),
        self.space.register(*index)
      ))
    }
  }

  fn read_operand(&self, operand: &Operand) -> Word {
    match self.locate(operand) {
      Err(constant) => constant,
      Ok(address)   => {
        if self.config.debug && !address.is_register() {
          debug!(target: TRACE_TARGET, "Reading hashtable at {}", address);
        }
        self.space.read(address.key, address.index)
      }
    }
  }

  fn write_operand(&mut self, operand: &Operand, value: Word) -> Result<(), FaultKind> {
    let address =
      self.locate(operand)
          .map_err(|constant| FaultKind::IllegalWriteTarget(constant as u8))?;

    if self.config.debug && !address.is_register() {
      debug!(target: TRACE_TARGET, "Writing hashtable at {}", address);
    }
    *self.space.write(address.key, address.index) = value;
    Ok(())
  }

  // endregion

  // region Execution

  /// Executes one decoded word. Nothing is written unless the whole instruction is legal.
  fn execute(&mut self, word: Word) -> Result<(), FaultKind> {
    let instruction = decode_instruction(word);

    if instruction.is_conditional() && !instruction.condition.holds(self.space.registers()) {
      if self.config.debug {
        debug!(target: TRACE_TARGET, "Skipped: {} is false", instruction.condition);
      }
      return Ok(());
    }

    let operation =
      instruction.operation().ok_or(FaultKind::IllegalOpcode(instruction.opcode))?;
    if let Operand::Constant(constant) = instruction.destination {
      return Err(FaultKind::IllegalWriteTarget(constant));
    }

    let a = self.read_operand(&instruction.source_a);
    let b = self.read_operand(&instruction.source_b);
    self.write_operand(&instruction.destination, operation.apply(a, b))
  }

  /**
    Halts the machine and packages up the diagnostic. Under `FaultPolicy::Panic` this does not
    return.
  */
  fn fault(&mut self, kind: FaultKind, word: Word, address: CellAddress) -> Fault {
    self.state = State::Halted;

    let fault = Fault {
      kind,
      word,
      address,
      registers: *self.space.registers()
    };
    error!("{}", fault);

    if self.config.fault_policy == FaultPolicy::Panic {
      panic!("{}", fault);
    }
    fault
  }

  /**
    Fetches and executes one instruction, returning the state afterward.

    Fetching advances `PX` before anything else happens, so an instruction that writes `PX`
    jumps. A zero word halts the machine without costing any budget. Every other word, whether it
    executes or its condition skips it, costs one unit of budget; if none is left, the machine
    faults instead. Stepping a halted machine does nothing.
  */
  pub fn step(&mut self) -> Result<State, Fault> {
    if self.state == State::Halted {
      return Ok(State::Halted);
    }

    let address = CellAddress::new(
      self.space.register(Register::PK),
      self.space.register(Register::PX)
    );
    self.space.set_register(Register::PX, address.index.wrapping_add(1));
    let word = self.space.read(address.key, address.index);

    if word == 0 {
      if self.config.debug {
        debug!(target: TRACE_TARGET, "{:>2x}: end of program", address.index);
      }
      self.state = State::Halted;
      return Ok(State::Halted);
    }

    if self.leash == 0 {
      return Err(self.fault(FaultKind::RunLengthExceeded, word, address));
    }
    self.leash -= 1;
    self.steps += 1;

    if self.config.debug {
      debug!(target: TRACE_TARGET, "{:>2x}: {}", address.index, listing_line(word));
    }

    if let Err(kind) = self.execute(word) {
      return Err(self.fault(kind, word, address));
    }

    if self.config.debug {
      debug!(target: TRACE_TARGET, "{}", self.dump_registers());
    }
    Ok(self.state)
  }

  /// Runs until the machine halts and returns the result of the program, register `r1`.
  pub fn run(&mut self) -> Result<Word, Fault> {
    while self.step()? == State::Running {}
    Ok(self.space.register(Register::R1))
  }

  // endregion

}


lazy_static! {
  static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
    .column_separator('│')
    .borders(' ')
    .separator(
      TableFormat::LinePosition::Title,
      TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
    )
    .separator(
      TableFormat::LinePosition::Bottom,
      TableFormat::LineSeparator::new('─', '┴', ' ', ' ')
    )
    .padding(1, 1)
    .build();
}

impl Display for Machine {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let r_table = Machine::make_register_table(self.space.registers(), Register::PX);
    let m_table = self.make_memory_table();

    let mut combined_table = table!([r_table, m_table]);

    combined_table.set_titles(row![ub->"Registers", ub->"Memory"]);
    combined_table.set_format(*TABLE_DISPLAY_FORMAT);

    write!(
      f,
      "State: {}\tLeash: {}\tSteps: {}\n{}",
      self.state, self.leash, self.steps, combined_table
    )
  }
}
