//! An arithmetic-constraint compiler and trace checker for zero-knowledge
//! provers: a three-level lowering pipeline (HIR → MIR → AIR) over an
//! S-expression surface syntax, plus a checker that expands and verifies
//! traces against the lowered schema.
//!
//! # Features
//!
//! - `std` - Enable standard library features (default)
//!
//! # Components
//!
//! - `field` - Prime field abstraction and the Goldilocks implementation
//! - `trace` - The row/column trace model
//! - `context` - The module/multiplier evaluation-context lattice
//! - `air` - The bottom intermediate representation and its schema
//! - `mir` - The middle intermediate representation (typed columns, `Normalise`)
//! - `hir` - The surface intermediate representation (`IfZero`, `List`)
//! - `gadgets` - The pseudo-inverse and sorted-permutation gadgets
//! - `sexp` - The S-expression parser and schema builder
//! - `checker` - Trace expansion and constraint checking
//! - `config` - Checker configuration
//! - `util` - Shared small containers (`SortedSet`, `HashedSet`, `Bounds`)

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod air;
pub mod checker;
pub mod config;
pub mod context;
pub mod field;
pub mod gadgets;
pub mod hir;
pub mod mir;
pub mod sexp;
pub mod trace;
pub mod util;

pub use air::{AirExpr, AirSchema};
pub use checker::{accepts, expand_trace, CheckError};
pub use config::CheckerConfig;
pub use context::Context;
pub use field::{Field, Fp};
pub use hir::HirSchema;
pub use mir::MirSchema;
pub use sexp::{parse_schema, ParseError};
pub use trace::Trace;

/// Everything that can go wrong turning source text into a checkable schema:
/// either the surface syntax failed to parse, or the parsed schema's own
/// constraints are ill-formed (conflicting contexts, duplicate names).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompileError {
    Parse(ParseError),
    Schema(hir::SchemaError),
    Lowering(air::SchemaError),
}

impl core::fmt::Display for CompileError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CompileError::Parse(e) => write!(f, "{e}"),
            CompileError::Schema(e) => write!(f, "{e}"),
            CompileError::Lowering(e) => write!(f, "{e}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CompileError {}

impl From<ParseError> for CompileError {
    fn from(e: ParseError) -> Self {
        CompileError::Parse(e)
    }
}

impl From<air::SchemaError> for CompileError {
    fn from(e: air::SchemaError) -> Self {
        CompileError::Lowering(e)
    }
}

/// Parse and lower source text all the way to an [`AirSchema`]: the whole
/// HIR → MIR → AIR pipeline in one call, matching the abstract Checker API's
/// `parse` → `lower_hir_to_mir` → `lower_mir_to_air` chain.
#[cfg_attr(feature = "std", tracing::instrument(skip(src), fields(len = src.len())))]
pub fn compile<F: field::Field + core::fmt::Display>(src: &str) -> Result<AirSchema<F>, CompileError> {
    let hir = sexp::parse_schema::<F>(src)?;
    let mir = hir::lower_schema_to_mir(&hir);
    let air = mir::lower_schema_to_air(&mir)?;
    Ok(air)
}

/// Convenience re-exports for the common pipeline plus the default field.
pub mod prelude {
    pub use crate::air::{AirExpr, AirSchema};
    pub use crate::checker::{accepts, expand_trace, CheckError};
    pub use crate::compile;
    pub use crate::config::CheckerConfig;
    pub use crate::context::Context;
    pub use crate::field::{Field, Fp};
    pub use crate::sexp::parse_schema;
    pub use crate::trace::{Column, Trace};
}
