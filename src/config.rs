//! Settings for a run of the machine.

use crate::address::{Key, DEFAULT_PROGRAM_KEY};

/// How many instructions a run may execute unless told otherwise.
pub const DEFAULT_LEASH: u64 = 100;

/**
  What a fault does beyond halting the machine. A fault is always returned as an `Err` and
  always logged; under `Panic` the machine also panics with the diagnostic once it is halted.
*/
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum FaultPolicy {
  Return,
  Panic
}

#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub struct Config {
  /// The instruction budget of a run.
  pub leash        : u64,
  /// Trace every memory access, every fetched instruction and the register file after every
  /// instruction.
  pub debug        : bool,
  pub fault_policy : FaultPolicy,
  /// The key a program is loaded into.
  pub program_key  : Key,
}

impl Default for Config {
  fn default() -> Config {
    Config {
      leash        : DEFAULT_LEASH,
      debug        : cfg!(feature = "trace_computation"),
      fault_policy : FaultPolicy::Return,
      program_key  : DEFAULT_PROGRAM_KEY,
    }
  }
}

impl Config {
  pub fn with_leash(self, leash: u64) -> Config {
    Config { leash, ..self }
  }

  pub fn with_debug(self, debug: bool) -> Config {
    Config { debug, ..self }
  }

  pub fn with_fault_policy(self, fault_policy: FaultPolicy) -> Config {
    Config { fault_policy, ..self }
  }

  pub fn with_program_key(self, program_key: Key) -> Config {
    Config { program_key, ..self }
  }
}
