//! Command-line driver: compile one source file and print the IR.

use std::env;
use std::fs;
use std::process;

use log::info;

fn main() {
  let _ = simple_logger::init_with_level(log::Level::Info);

  let args: Vec<String> = env::args().collect();
  if args.len() != 2 {
    let program = args.first().map(String::as_str).unwrap_or("yalcc");
    eprintln!("usage: {program} <source-file>");
    process::exit(1);
  }

  let path = &args[1];
  let source = match fs::read_to_string(path) {
    Ok(source) => source,
    Err(err) => {
      eprintln!("cannot read {path}: {err}");
      process::exit(1);
    }
  };

  info!("compiling {path}");
  match yalcc::compile(&source) {
    Ok(ir) => print!("{ir}"),
    Err(err) => {
      eprintln!("{err}");
      process::exit(1);
    }
  }
}
