use std::path::PathBuf;
use std::process;

use clap::Args;

use bigo::{parser, vcgen};

#[derive(Args)]
pub struct RecurrencesArgs {
    /// Source file to analyze
    pub file: PathBuf,
}

pub fn cmd_recurrences(args: RecurrencesArgs) {
    let source = super::read_source(&args.file);
    let program = match parser::parse_program(&source, 0) {
        Ok(p) => p,
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    };
    let (_, tests) = match vcgen::generate(&program) {
        Ok(r) => r,
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    };

    for test in &tests {
        println!("{} — {} path(s)", test.name, test.paths.len());
        for (i, path) in test.paths.iter().enumerate() {
            if path.is_empty() {
                println!("  path {i}: (no calls)");
                continue;
            }
            let calls: Vec<String> = path
                .iter()
                .map(|c| {
                    let args: Vec<String> = c
                        .argmap
                        .iter()
                        .map(|a| a.as_ref().map(|s| s.to_string()).unwrap_or_else(|| "?".to_string()))
                        .collect();
                    format!("{}({})", c.callee, args.join(", "))
                })
                .collect();
            println!("  path {i}: {}", calls.join(" ; "));
        }
    }
}
