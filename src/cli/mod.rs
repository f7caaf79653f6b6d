pub mod analyze;
pub mod parse;
pub mod recurrences;

use std::path::Path;
use std::process;

/// Read a source file or exit with a diagnostic, matching the teacher's
/// `resolve_input`-style fail-fast CLI error handling.
pub fn read_source(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: could not read {}: {e}", path.display());
            process::exit(1);
        }
    }
}
