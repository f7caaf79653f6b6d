pub mod ast;
pub mod cost;
pub mod diagnostic;
pub mod error;
pub mod lexeme;
pub mod lexer;
pub mod parser;
pub mod pathenum;
pub mod smt;
pub mod span;
pub mod sym;
pub mod vcgen;
pub mod verify;

pub use error::Error;

/// Parse, generate verification conditions, and verify every function in
/// `source` in one call — the library entry point the CLI and integration
/// tests drive (spec §4 pipeline: parse → VC generation → verify).
pub fn analyze(source: &str, file_id: u16) -> Result<Vec<verify::VerificationResult>, Error> {
    let program = parser::parse_program(source, file_id)?;
    let (defs, tests) = vcgen::generate(&program)?;
    verify::verify_all(&defs, &tests)
}
