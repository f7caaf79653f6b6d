use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;

use clap::Args;
use serde::Serialize;

use bigo::{parser, smt::OrderOracle, vcgen, verify};

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Source file to analyze (single-file mode)
    pub path: Option<PathBuf>,
    /// Walk a directory of `.ml` files and emit a benchmark JSON blob
    #[arg(long)]
    pub all: bool,
    /// Directory to walk in `--all` mode
    #[arg(long, default_value = "examples")]
    pub dir: PathBuf,
    /// Where to write the benchmark JSON blob
    #[arg(long, default_value = "benchmark.json")]
    pub output: PathBuf,
}

#[derive(Serialize)]
struct BenchmarkFunction {
    name: String,
    num_paths: usize,
    total_calls: usize,
    max_path_length: usize,
    min_path_length: usize,
    avg_path_length: f64,
}

#[derive(Serialize)]
struct BenchmarkFile {
    file: String,
    parse_time: f64,
    vc_generation_time: f64,
    total_time: f64,
    num_functions: usize,
    functions: Vec<BenchmarkFunction>,
}

pub fn cmd_analyze(args: AnalyzeArgs) {
    if args.all {
        run_all(&args.dir, &args.output);
        return;
    }
    let Some(path) = args.path else {
        eprintln!("error: a source file is required unless --all is given");
        process::exit(1);
    };
    run_single(&path);
}

fn run_single(path: &Path) {
    let source = super::read_source(path);
    let start = Instant::now();
    let program = match parser::parse_program(&source, 0) {
        Ok(p) => p,
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    };
    let (defs, tests) = match vcgen::generate(&program) {
        Ok(r) => r,
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    };

    let mut any_rejected = false;
    for test in &tests {
        let test_start = Instant::now();
        match verify::verify_function(&defs, test, &mut OrderOracle::new()) {
            Ok(result) => {
                let verdict = if result.accepted { "ACCEPT" } else { "REJECT" };
                if !result.accepted {
                    any_rejected = true;
                }
                println!(
                    "{verdict}  {}  ({} path(s), {:.3}ms)",
                    test.name,
                    test.paths.len(),
                    test_start.elapsed().as_secs_f64() * 1000.0
                );
            }
            Err(err) => {
                any_rejected = true;
                println!("ERROR   {}  {err}", test.name);
            }
        }
    }
    println!("total: {:.3}ms", start.elapsed().as_secs_f64() * 1000.0);
    if any_rejected {
        process::exit(1);
    }
}

fn run_all(dir: &Path, output: &Path) {
    if !dir.is_dir() {
        eprintln!("error: '{}' is not a directory", dir.display());
        process::exit(1);
    }

    let mut files = Vec::new();
    collect_ml_files(dir, &mut files);
    files.sort();

    let mut results = Vec::new();
    for file in &files {
        match analyze_one(file) {
            Ok(entry) => results.push(entry),
            Err(err) => eprintln!("  SKIP  {}  ({err})", file.display()),
        }
    }

    let json = match serde_json::to_string_pretty(&results) {
        Ok(j) => j,
        Err(e) => {
            eprintln!("error: could not serialize benchmark results: {e}");
            process::exit(1);
        }
    };
    if let Err(e) = std::fs::write(output, json) {
        eprintln!("error: could not write {}: {e}", output.display());
        process::exit(1);
    }
    eprintln!("wrote {} file(s) to {}", results.len(), output.display());
}

fn collect_ml_files(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else { return };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_ml_files(&path, out);
        } else if path.extension().is_some_and(|e| e == "ml") {
            out.push(path);
        }
    }
}

fn analyze_one(path: &Path) -> Result<BenchmarkFile, String> {
    let source = std::fs::read_to_string(path).map_err(|e| e.to_string())?;

    let parse_start = Instant::now();
    let program = parser::parse_program(&source, 0).map_err(|e| e.to_string())?;
    let parse_time = parse_start.elapsed().as_secs_f64();

    let vc_start = Instant::now();
    let (_, tests) = vcgen::generate(&program).map_err(|e| e.to_string())?;
    let vc_generation_time = vc_start.elapsed().as_secs_f64();

    let functions = tests
        .iter()
        .map(|t| {
            let lengths: Vec<usize> = t.paths.iter().map(|p| p.len()).collect();
            let total_calls: usize = lengths.iter().sum();
            let max_path_length = lengths.iter().copied().max().unwrap_or(0);
            let min_path_length = lengths.iter().copied().min().unwrap_or(0);
            let avg_path_length = if lengths.is_empty() {
                0.0
            } else {
                total_calls as f64 / lengths.len() as f64
            };
            BenchmarkFunction {
                name: t.name.clone(),
                num_paths: t.paths.len(),
                total_calls,
                max_path_length,
                min_path_length,
                avg_path_length,
            }
        })
        .collect::<Vec<_>>();

    Ok(BenchmarkFile {
        file: path.display().to_string(),
        parse_time,
        vc_generation_time,
        total_time: parse_time + vc_generation_time,
        num_functions: functions.len(),
        functions,
    })
}
