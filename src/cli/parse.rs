use std::path::PathBuf;
use std::process;

use clap::Args;

use bigo::parser;

#[derive(Args)]
pub struct ParseArgs {
    /// Source file to parse
    pub file: PathBuf,
}

pub fn cmd_parse(args: ParseArgs) {
    let source = super::read_source(&args.file);
    match parser::parse_program(&source, 0) {
        Ok(program) => println!("{program:#?}"),
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    }
}
