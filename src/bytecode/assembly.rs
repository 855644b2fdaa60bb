/*!
  The human readable textual form of an instruction is called assembly. A line has the shape

  ```text
  [if(A<op>B)] mnemonic D, A, B
  ```

  where the mnemonic is `add` or `sub`, or `mov D, B`, which is sugar for `add D, $0, B`. An
  operand is one of

    * a register name, exactly as the register table spells it (`$0`, `r1`..`r7`, `PX`, `PK`,
      `AX`, `BX`, `DK`, `DX`, `AK`, `BK`),
    * `$h`, a constant, where `h` is a single hex digit,
    * `hashtable[K/X]`, a memory cell whose key and index are in registers `K` and `X`.

  A register name takes precedence over a constant, so `$0` is the register, not the constant
  zero. Parsing is done in two steps: `nom` splits the line into tokens, then each token is
  resolved, so that every error can name the token at fault.
*/

use std::str::FromStr;

use nom::{
  IResult,
  branch::alt,
  bytes::complete::{is_a, is_not, tag, take_while1, take_while_m_n},
  character::complete::{alpha1, char as one_char, hex_digit1, space0, space1},
  combinator::{all_consuming, map, opt, recognize},
  error::ErrorKind,
  multi::separated_list,
  sequence::{delimited, pair, preceded, separated_pair, terminated, tuple},
};

use crate::address::Word;
use crate::error::AssemblyError;
use crate::register::{Comparison, Register};
use super::{Condition, Instruction, Operand, Operation};

type ParseResult<'a, O> = IResult<&'a str, O, (&'a str, ErrorKind)>;

/// Starts a comment that runs to the end of the line, in `assemble_program`.
const COMMENT_CHAR: char = '#';

// region Token parsers

fn is_name_char(c: char) -> bool {
  c.is_ascii_alphanumeric() || c == '$' || c == '_'
}

fn name_p(input: &str) -> ParseResult<&str> {
  take_while1(is_name_char)(input)
}

fn conditional_p(input: &str) -> ParseResult<&str> {
  recognize(tuple((tag("if("), is_not(")"), one_char(')'))))(input)
}

/// `if(A<op>B)` split into its three parts. Spaces are tolerated inside the parentheses.
fn condition_parts_p(input: &str) -> ParseResult<(&str, &str, &str)> {
  let comparison_p = alt((
    recognize(pair(one_char('?'), take_while_m_n(1, 1, |c: char| c.is_ascii_hexdigit()))),
    is_a("<>=!"),
  ));

  delimited(
    tag("if("),
    tuple((
      delimited(space0, name_p, space0),
      comparison_p,
      delimited(space0, name_p, space0),
    )),
    one_char(')')
  )(input)
}

fn operand_token_p(input: &str) -> ParseResult<&str> {
  is_not(", \t\r\n")(input)
}

/// Splits a line into its optional conditional, its mnemonic and its operand tokens.
fn line_p(input: &str) -> ParseResult<(Option<&str>, &str, Vec<&str>)> {
  tuple((
    preceded(space0, opt(terminated(conditional_p, space0))),
    alpha1,
    terminated(
      map(
        opt(preceded(
          space1,
          separated_list(delimited(space0, one_char(','), space0), operand_token_p)
        )),
        |tokens: Option<Vec<&str>>| tokens.unwrap_or_default()
      ),
      space0
    )
  ))(input)
}

fn constant_p(input: &str) -> ParseResult<&str> {
  preceded(one_char('$'), hex_digit1)(input)
}

fn hashtable_p(input: &str) -> ParseResult<(&str, &str)> {
  delimited(
    tag("hashtable["),
    separated_pair(name_p, one_char('/'), name_p),
    one_char(']')
  )(input)
}

// endregion

// region Token resolution

fn assemble_register(name: &str) -> Result<Register, AssemblyError> {
  Register::from_str(name).map_err(|_| AssemblyError::UnknownRegisterName(name.to_string()))
}

/// A register that can hold the key of an indirect operand.
fn assemble_key_register(name: &str, operand: &str) -> Result<Register, AssemblyError> {
  let illegal = |reason| {
    Err(AssemblyError::IllegalKeyRegister {
      operand: operand.to_string(),
      register: name.to_string(),
      reason
    })
  };

  match assemble_register(name)? {
    Register::Zero => illegal("key 0 means register access"),
    Register::PX   => illegal("key 8 means a constant"),
    register       => Ok(register)
  }
}

fn assemble_operand(token: &str) -> Result<Operand, AssemblyError> {
  if let Ok(register) = Register::from_str(token) {
    return Ok(Operand::Register(register));
  }

  if token.starts_with('$') {
    let (_, digits) =
      all_consuming(constant_p)(token)
        .map_err(|_: nom::Err<(&str, ErrorKind)>| AssemblyError::MalformedOperand(token.to_string()))?;
    // Exactly one digit, so `$05` and `$00` are rejected along with `$10`.
    return match (digits.len(), u8::from_str_radix(digits, 16)) {
      (1, Ok(value)) => Ok(Operand::Constant(value)),
      _ => Err(AssemblyError::ConstantOutOfRange(token.to_string()))
    };
  }

  if token.starts_with("hashtable") {
    let (_, (key, index)) =
      all_consuming(hashtable_p)(token)
        .map_err(|_: nom::Err<(&str, ErrorKind)>| AssemblyError::MalformedOperand(token.to_string()))?;
    return Ok(Operand::Indirect {
      key   : assemble_key_register(key, token)?,
      index : assemble_register(index)?
    });
  }

  match token.chars().all(is_name_char) {
    true  => Err(AssemblyError::UnknownRegisterName(token.to_string())),
    false => Err(AssemblyError::MalformedOperand(token.to_string()))
  }
}

fn assemble_condition(text: &str) -> Result<Condition, AssemblyError> {
  let (_, (a, symbol, b)) =
    all_consuming(condition_parts_p)(text)
      .map_err(|_: nom::Err<(&str, ErrorKind)>| AssemblyError::MalformedConditional(text.to_string()))?;

  let comparison =
    match Comparison::from_str(&symbol.to_ascii_lowercase()) {
      Ok(Comparison::Always) | Err(_) => {
        return Err(AssemblyError::UnknownComparison(symbol.to_string()));
      }
      Ok(comparison) => comparison
    };

  Ok(Condition {
    a: assemble_register(a)?,
    comparison,
    b: assemble_register(b)?
  })
}

fn check_operand_count(mnemonic: &str, tokens: &[&str], expected: usize)
  -> Result<(), AssemblyError>
{
  match tokens.len() == expected {
    true  => Ok(()),
    false => Err(AssemblyError::WrongOperandCount {
      mnemonic: mnemonic.to_string(),
      expected,
      found: tokens.len()
    })
  }
}

// endregion

/**
  Assembles one line of text into an `Instruction`. Nothing is produced unless the whole line
  is understood.
*/
pub fn assemble_instruction(line: &str) -> Result<Instruction, AssemblyError> {
  let trimmed = line.trim();

  // An unclosed `if(` would otherwise be read as the mnemonic `if`.
  if trimmed.starts_with("if(") && conditional_p(trimmed).is_err() {
    let token = trimmed.split_whitespace().next().unwrap_or(trimmed);
    return Err(AssemblyError::MalformedConditional(token.to_string()));
  }

  let (rest, (conditional, mnemonic, tokens)) =
    line_p(trimmed)
      .map_err(|_| AssemblyError::MalformedInstruction(trimmed.to_string()))?;

  if !rest.is_empty() {
    return Err(AssemblyError::TrailingInput(rest.to_string()));
  }

  let condition =
    match conditional {
      Some(text) => assemble_condition(text)?,
      None       => Condition::ALWAYS
    };

  let (operation, destination, source_a, source_b) =
    match mnemonic {

      "mov" => {
        check_operand_count(mnemonic, &tokens, 2)?;
        (Operation::Add, tokens[0], "$0", tokens[1])
      }

      _ => {
        let operation =
          Operation::from_str(mnemonic)
            .map_err(|_| AssemblyError::UnknownMnemonic(mnemonic.to_string()))?;
        check_operand_count(mnemonic, &tokens, 3)?;
        (operation, tokens[0], tokens[1], tokens[2])
      }

    };

  let destination = assemble_operand(destination)?;
  if destination.is_constant() {
    return Err(AssemblyError::IllegalWriteTarget(tokens[0].to_string()));
  }

  Ok(
    Instruction::new(
      operation,
      destination,
      assemble_operand(source_a)?,
      assemble_operand(source_b)?
    ).when(condition)
  )
}

/// Assembles one line of text into an instruction word.
pub fn assemble(line: &str) -> Result<Word, AssemblyError> {
  assemble_instruction(line).map(|instruction| instruction.encode())
}

/**
  Assembles a whole program, one instruction per line, into a zero terminated sequence of
  words ready for `AddressSpace::set_program`. Blank lines are skipped, and `#` starts a comment.
  Errors report the (1-based) line they occur on.
*/
pub fn assemble_program(text: &str) -> Result<Vec<Word>, AssemblyError> {
  let mut program = Vec::new();

  for (number, line) in text.lines().enumerate() {
    let code = match line.find(COMMENT_CHAR) {
      Some(start) => &line[..start],
      None        => line
    };
    if code.trim().is_empty() {
      continue;
    }
    program.push(assemble(code).map_err(|e| e.on_line(number + 1))?);
  }

  program.push(0);
  Ok(program)
}
