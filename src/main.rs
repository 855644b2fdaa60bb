use log::{error, info, LevelFilter};

use mcsis::{assemble, disassemble_program, listing_line, Config, Machine, Register, Word};

/// r2 = F+F, store it in cell 1/6, load it back into r1, count r1 up once.
const SAMPLE_PROGRAM: [Word; 9] = [
  0x028F8FFF,     // [0] r2 = F+F
  0x0D0086FF,     // [1] DX = 6
  0x0C0081FF,     // [2] DK = 1
  0xCD0002FF,     // [3] DK/DX = r2
  0x0100CDFF,     // [4] r1 = DK/DX
  0x030007FF,     // [5] r3 = r7
  0x010181FF,     // [6] r1++
  0x113_0800_86FF, // [7] if(r1<r3) PX = 6
  0x0             // terminating zero
];

const SAMPLE_LINES: [&str; 8] = [
  "add hashtable[AK/DX], r3, $5",
  "mov hashtable[r6/DX], $5",
  "mov hashtable[r2/DX], $F",
  "add r2, $f, $f",
  "if(r3<$0) add r2, $f, $f",
  "if(DX==$0) add r2, $f, $f",
  "if(DX<=$0) sub r2, $f, $f",
  "mov DX, $6",
];

fn init_logging() -> Result<(), fern::InitError> {
  fern::Dispatch::new()
    .format(|out, message, _record| out.finish(format_args!("{}", message)))
    .level(LevelFilter::Debug)
    .chain(std::io::stdout())
    .apply()?;
  Ok(())
}

fn main() {
  if let Err(e) = init_logging() {
    eprintln!("Could not start logging: {}", e);
  }

  println!("Assembly:");
  for line in SAMPLE_LINES.iter() {
    match assemble(line) {
      Ok(word) => println!("{}", listing_line(word)),
      Err(e)   => error!("{}", e)
    }
  }

  let mut machine = Machine::new(&SAMPLE_PROGRAM, Config::default().with_debug(true));

  println!("\nProgram:");
  let space = machine.address_space();
  for line in disassemble_program(space, space.register(Register::PK), 0) {
    println!("{}", line);
  }

  println!("\nRun:");
  match machine.run() {
    Ok(result) => info!("Result: {:x}", result),
    Err(fault) => error!("Run failed: {}", fault.kind)
  }
  println!("{}", machine);
}
