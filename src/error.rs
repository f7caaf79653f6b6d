use crate::span::Span;
use std::fmt;

/// Top-level error kinds, per the error-handling design: every failure mode
/// surfaced by the pipeline is one of these, never a bare string or panic.
#[derive(Clone, Debug)]
pub enum Error {
    /// Malformed source text.
    ParseError { message: String, span: Span },
    /// A construct this version of the verifier does not support:
    /// higher-order arguments, nested `let rec`, custom measures,
    /// non-int refinements over non-int shapes, `forall`/`exists` in
    /// specs, multi-size callees, partial application.
    UnsupportedConstruct { what: String, span: Span },
    /// A cost or size expression falls outside the supported
    /// polynomial/log/exponential lattice.
    DomainError { reason: String },
    /// The SMT oracle returned `unknown`; treated as verification
    /// failure for that path.
    SolverUnknown { func: String, path_index: usize },
    /// All constraints were emitted but the solver returned `unsat`.
    VerificationFailure { func: String, path_index: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ParseError { message, .. } => write!(f, "parse error: {message}"),
            Error::UnsupportedConstruct { what, .. } => {
                write!(f, "unsupported construct: {what}")
            }
            Error::DomainError { reason } => write!(f, "domain error: {reason}"),
            Error::SolverUnknown { func, path_index } => write!(
                f,
                "solver returned unknown for {func}, path #{path_index}"
            ),
            Error::VerificationFailure { func, path_index } => write!(
                f,
                "verification failed for {func}, path #{path_index}"
            ),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
