use std::{cell::RefCell,
          io,
          path::Path,
          rc::Rc};

use clap::Parser as ArgsParser;
use magpie::{interpreter::scope::OutputWriter, run_file, run_source};

/// magpie is a small dynamically-typed expression/statement language
/// with first-class closures, compound values and structs.
#[derive(ArgsParser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Treat CONTENTS as literal source instead of a script path.
    #[arg(short, long)]
    eval: bool,

    /// Pipe mode prints the value of the last evaluated statement.
    #[arg(short, long)]
    pipe_mode: bool,

    /// A path to a .mp script, or source text with --eval.
    contents: String,
}

fn main() {
    let args = Args::parse();

    let writer: OutputWriter = Rc::new(RefCell::new(io::stdout()));
    let result = if args.eval {
        run_source(&args.contents, writer)
    } else {
        run_file(Path::new(&args.contents), writer)
    };

    match result {
        Ok(value) => {
            if args.pipe_mode {
                println!("{value}");
            }
        },
        Err(error) => {
            eprintln!("{error}");
            std::process::exit(1);
        },
    }
}
