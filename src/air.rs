//! AIR: the bottom intermediate representation.
//!
//! An AIR schema is a closed term language the trace checker runs directly:
//! constants, shifted column reads, and n-ary `+`/`*` plus binary `-`. There
//! is no `Normalise`, no `IfZero`, no `List` — those are sugar that
//! [`crate::mir`] and [`crate::hir`] lower away before a schema reaches this
//! level.

#[cfg(not(feature = "std"))]
use alloc::{boxed::Box, format, string::String, vec::Vec};

use crate::context::{join_all, Context};
use crate::field::Field;
use crate::trace::{ColumnKind, Trace};
use crate::util::{combine_all, Bounds, SortedSet};
use core::fmt;
use tracing::debug;

/// An AIR-level expression.
#[derive(Clone, Debug)]
pub enum AirExpr<F: Field> {
    Const(F),
    ColumnAccess { column: usize, shift: i32 },
    /// `n >= 2` arguments.
    Add(Vec<AirExpr<F>>),
    /// Exactly two arguments.
    Sub(Box<AirExpr<F>>, Box<AirExpr<F>>),
    /// `n >= 2` arguments.
    Mul(Vec<AirExpr<F>>),
}

impl<F: Field> AirExpr<F> {
    pub fn constant(value: F) -> Self {
        AirExpr::Const(value)
    }

    pub fn column(column: usize, shift: i32) -> Self {
        AirExpr::ColumnAccess { column, shift }
    }

    pub fn add(args: Vec<AirExpr<F>>) -> Self {
        debug_assert!(args.len() >= 2, "Add requires at least 2 arguments");
        AirExpr::Add(args)
    }

    pub fn sub(lhs: AirExpr<F>, rhs: AirExpr<F>) -> Self {
        AirExpr::Sub(Box::new(lhs), Box::new(rhs))
    }

    pub fn mul(args: Vec<AirExpr<F>>) -> Self {
        debug_assert!(args.len() >= 2, "Mul requires at least 2 arguments");
        AirExpr::Mul(args)
    }

    /// Evaluate this expression at `row`. Total: every sub-read is a
    /// [`crate::trace::Column::get`], which never fails.
    pub fn eval_at(&self, trace: &Trace<F>, row: i64) -> F {
        match self {
            AirExpr::Const(c) => *c,
            AirExpr::ColumnAccess { column, shift } => trace.get(*column, row + *shift as i64),
            AirExpr::Add(args) => args
                .iter()
                .map(|a| a.eval_at(trace, row))
                .fold(F::ZERO, |acc, v| acc + v),
            AirExpr::Sub(lhs, rhs) => lhs.eval_at(trace, row) - rhs.eval_at(trace, row),
            AirExpr::Mul(args) => {
                let mut iter = args.iter();
                let first = iter
                    .next()
                    .expect("Mul requires at least 2 arguments")
                    .eval_at(trace, row);
                iter.fold(first, |acc, a| acc * a.eval_at(trace, row))
            }
        }
    }

    /// `(max_negative_shift, max_positive_shift)`, the monoidal maximum over
    /// sub-expressions.
    pub fn bounds(&self) -> Bounds {
        match self {
            AirExpr::Const(_) => Bounds::ZERO,
            AirExpr::ColumnAccess { shift, .. } => Bounds::of_shift(*shift),
            AirExpr::Add(args) | AirExpr::Mul(args) => combine_all(args.iter().map(AirExpr::bounds)),
            AirExpr::Sub(lhs, rhs) => lhs.bounds().combine(rhs.bounds()),
        }
    }

    /// The evaluation context of this expression, given the declared context
    /// of every column in the enclosing schema.
    pub fn context(&self, column_contexts: &[Context]) -> Context {
        match self {
            AirExpr::Const(_) => Context::Void,
            AirExpr::ColumnAccess { column, .. } => column_contexts[*column],
            AirExpr::Add(args) | AirExpr::Mul(args) => {
                join_all(args.iter().map(|a| a.context(column_contexts)))
            }
            AirExpr::Sub(lhs, rhs) => lhs.context(column_contexts).join(rhs.context(column_contexts)),
        }
    }

    /// The set of column ids read anywhere in this expression.
    pub fn required_columns(&self) -> SortedSet<usize> {
        let mut set = SortedSet::new();
        self.collect_required_columns(&mut set);
        set
    }

    fn collect_required_columns(&self, out: &mut SortedSet<usize>) {
        match self {
            AirExpr::Const(_) => {}
            AirExpr::ColumnAccess { column, .. } => out.insert(*column),
            AirExpr::Add(args) | AirExpr::Mul(args) => {
                for a in args {
                    a.collect_required_columns(out);
                }
            }
            AirExpr::Sub(lhs, rhs) => {
                lhs.collect_required_columns(out);
                rhs.collect_required_columns(out);
            }
        }
    }
}

impl<F: Field + fmt::Display> fmt::Display for AirExpr<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AirExpr::Const(c) => write!(f, "{c}"),
            AirExpr::ColumnAccess { column, shift } => {
                if *shift == 0 {
                    write!(f, "$r{column}")
                } else {
                    write!(f, "(shift $r{column} {shift})")
                }
            }
            AirExpr::Add(args) => write_sexpr(f, "+", args),
            AirExpr::Sub(lhs, rhs) => write!(f, "(- {lhs} {rhs})"),
            AirExpr::Mul(args) => write_sexpr(f, "*", args),
        }
    }
}

fn write_sexpr<F: Field + fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    op: &str,
    args: &[AirExpr<F>],
) -> fmt::Result {
    write!(f, "({op}")?;
    for a in args {
        write!(f, " {a}")?;
    }
    write!(f, ")")
}

/// Which rows a vanishing (or property) constraint must hold at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Domain {
    /// Every row `0..height`.
    All,
    /// A single row. Negative values index from the end (`-1` = last row).
    Row(i64),
}

/// A constraint whose expression must evaluate to zero, either at every row
/// (`domain == All`) or at one specific row.
#[derive(Clone, Debug)]
pub struct VanishingConstraint<F: Field> {
    pub handle: String,
    pub domain: Domain,
    pub context: Context,
    pub expr: AirExpr<F>,
}

/// A constraint that a single column's values, reduced to their canonical
/// representative, are strictly less than `bound`.
#[derive(Clone, Debug)]
pub struct RangeConstraint {
    pub handle: String,
    pub column: usize,
    pub bound: u64,
}

/// A constraint that the rows of `targets` are a (multiset) permutation of
/// the rows of `sources`, column-for-column.
#[derive(Clone, Debug)]
pub struct PermutationConstraint {
    pub handle: String,
    pub targets: Vec<usize>,
    pub sources: Vec<usize>,
}

/// Identical in semantics to [`VanishingConstraint`] but advisory: reported
/// distinctly and never lowered into prover constraints.
#[derive(Clone, Debug)]
pub struct PropertyAssertion<F: Field> {
    pub handle: String,
    pub domain: Domain,
    pub context: Context,
    pub expr: AirExpr<F>,
}

/// How a computed column's values are produced during expansion.
#[derive(Clone, Debug)]
pub enum Recipe<F: Field> {
    /// Evaluate `expr` at every row and append the result.
    Expression(AirExpr<F>),
    /// Evaluate `expr` at every row and append its pseudo-inverse
    /// (`Field::inverse`), used by the pseudo-inverse gadget's `inv` column.
    Inverse(AirExpr<F>),
    /// Sort the rows of `sources` lexicographically (per `signs`: `true` =
    /// ascending, `false` = descending on that column) and write the result,
    /// column-by-column, into the assignment's targets.
    SortedPermutation { sources: Vec<usize>, signs: Vec<bool> },
}

/// A recipe for one or more computed columns, registered in column-id order
/// so that expansion can simply walk assignments in order.
#[derive(Clone, Debug)]
pub struct Assignment<F: Field> {
    pub targets: Vec<usize>,
    pub recipe: Recipe<F>,
}

/// Declaration of a single column within an [`AirSchema`]: its context and
/// whether it is user-supplied or synthesised.
#[derive(Clone, Debug)]
pub struct ColumnDecl {
    pub name: String,
    pub context: Context,
    pub kind: ColumnKind,
}

/// Errors raised while an [`AirSchema`] is being built (append-only,
/// fail-fast — see §7).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SchemaError {
    UnknownColumn { name: String },
    DuplicateColumn { name: String },
    ContextConflict { expression: String },
    NonPowerOfTwoMultiplier { name: String },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::UnknownColumn { name } => write!(f, "unknown column `{name}`"),
            SchemaError::DuplicateColumn { name } => write!(f, "duplicate column `{name}`"),
            SchemaError::ContextConflict { expression } => {
                write!(f, "context conflict in expression `{expression}`")
            }
            SchemaError::NonPowerOfTwoMultiplier { name } => {
                write!(f, "column `{name}` has a context whose length multiplier is not a power of two")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SchemaError {}

/// The bottom-level schema: columns, plus every kind of constraint the
/// checker knows how to run, plus the recipes needed to expand a trace.
#[derive(Clone, Debug, Default)]
pub struct AirSchema<F: Field> {
    columns: Vec<ColumnDecl>,
    pub vanishing_constraints: Vec<VanishingConstraint<F>>,
    pub permutation_constraints: Vec<PermutationConstraint>,
    pub range_constraints: Vec<RangeConstraint>,
    pub property_assertions: Vec<PropertyAssertion<F>>,
    pub assignments: Vec<Assignment<F>>,
}

impl<F: Field + fmt::Display> AirSchema<F> {
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
            vanishing_constraints: Vec::new(),
            permutation_constraints: Vec::new(),
            range_constraints: Vec::new(),
            property_assertions: Vec::new(),
            assignments: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[ColumnDecl] {
        &self.columns
    }

    pub fn column_contexts(&self) -> Vec<Context> {
        self.columns.iter().map(|c| c.context).collect()
    }

    pub fn column_id_by_name(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Append a new column, returning its (dense) id.
    pub fn add_column(
        &mut self,
        name: impl Into<String>,
        context: Context,
        kind: ColumnKind,
    ) -> Result<usize, SchemaError> {
        let name = name.into();
        if self.column_id_by_name(&name).is_some() {
            return Err(SchemaError::DuplicateColumn { name });
        }
        if !context.has_power_of_two_multiplier() {
            return Err(SchemaError::NonPowerOfTwoMultiplier { name });
        }
        debug!(column = %name, id = self.columns.len(), ?kind, "registering column");
        self.columns.push(ColumnDecl { name, context, kind });
        Ok(self.columns.len() - 1)
    }

    /// Append a vanishing constraint, rejecting it if its expression's
    /// context is conflicted, or void while still reading columns (which
    /// would mean two of those columns disagree on context).
    pub fn add_vanishing_constraint(
        &mut self,
        handle: impl Into<String>,
        domain: Domain,
        context: Context,
        expr: AirExpr<F>,
    ) -> Result<(), SchemaError> {
        self.check_expr_context(&expr)?;
        let handle = handle.into();
        debug!(%handle, ?domain, "registering vanishing constraint");
        self.vanishing_constraints.push(VanishingConstraint {
            handle,
            domain,
            context,
            expr,
        });
        Ok(())
    }

    pub fn add_range_constraint(&mut self, handle: impl Into<String>, column: usize, bound: u64) {
        let handle = handle.into();
        debug!(%handle, column, bound, "registering range constraint");
        self.range_constraints.push(RangeConstraint {
            handle,
            column,
            bound,
        });
    }

    pub fn add_permutation_constraint(
        &mut self,
        handle: impl Into<String>,
        targets: Vec<usize>,
        sources: Vec<usize>,
    ) {
        let handle = handle.into();
        debug!(%handle, ?targets, ?sources, "registering permutation constraint");
        self.permutation_constraints.push(PermutationConstraint {
            handle,
            targets,
            sources,
        });
    }

    pub fn add_property_assertion(
        &mut self,
        handle: impl Into<String>,
        domain: Domain,
        context: Context,
        expr: AirExpr<F>,
    ) -> Result<(), SchemaError> {
        self.check_expr_context(&expr)?;
        let handle = handle.into();
        debug!(%handle, ?domain, "registering property assertion");
        self.property_assertions.push(PropertyAssertion {
            handle,
            domain,
            context,
            expr,
        });
        Ok(())
    }

    pub fn add_assignment(&mut self, assignment: Assignment<F>) {
        self.assignments.push(assignment);
    }

    fn check_expr_context(&self, expr: &AirExpr<F>) -> Result<(), SchemaError> {
        let ctx = expr.context(&self.column_contexts());
        let has_columns = !expr.required_columns().is_empty();
        if ctx.is_conflicted() || (ctx.is_void() && has_columns) {
            return Err(SchemaError::ContextConflict {
                expression: format!("{expr}"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Fp;
    use crate::trace::Column;

    fn make_trace(values: &[u64]) -> Trace<Fp> {
        let mut t = Trace::new();
        t.add_column(Column::new(
            "X",
            values.iter().copied().map(Fp::from_u64).collect(),
            Fp::ZERO,
            ColumnKind::Data,
            Context::new(0, 1),
        ));
        t
    }

    #[test]
    fn test_boolean_constraint_accepts_and_rejects() {
        let trace = make_trace(&[0, 1, 0, 1]);
        // X * (X - 1)
        let expr: AirExpr<Fp> = AirExpr::mul(vec![
            AirExpr::column(0, 0),
            AirExpr::sub(AirExpr::column(0, 0), AirExpr::constant(Fp::ONE)),
        ]);
        for row in 0..4 {
            assert!(expr.eval_at(&trace, row).is_zero());
        }

        let bad_trace = make_trace(&[0, 2]);
        assert!(!expr.eval_at(&bad_trace, 1).is_zero());
    }

    #[test]
    fn test_shift_reads_previous_row() {
        let trace = make_trace(&[1, 2, 4]);
        let expr: AirExpr<Fp> = AirExpr::sub(AirExpr::column(0, 0), AirExpr::column(0, -1));
        // row 0: X[0] - X[-1] = 1 - 0 = 1 (padding)
        assert_eq!(expr.eval_at(&trace, 0), Fp::ONE);
        // row 1: X[1] - X[0] = 2 - 1 = 1
        assert_eq!(expr.eval_at(&trace, 1), Fp::ONE);
        // row 2: X[2] - X[1] = 4 - 2 = 2
        assert_eq!(expr.eval_at(&trace, 2), Fp::from_u64(2));
    }

    #[test]
    fn test_bounds_tracks_max_shift_either_direction() {
        let expr: AirExpr<Fp> = AirExpr::add(vec![AirExpr::column(0, -3), AirExpr::column(0, 2)]);
        let b = expr.bounds();
        assert_eq!(b.max_negative, 3);
        assert_eq!(b.max_positive, 2);
    }

    #[test]
    fn test_required_columns_dedups() {
        let expr: AirExpr<Fp> = AirExpr::add(vec![
            AirExpr::column(1, 0),
            AirExpr::column(1, -1),
            AirExpr::column(0, 0),
        ]);
        let cols = expr.required_columns();
        assert_eq!(cols.as_slice(), &[0, 1]);
    }

    #[test]
    fn test_schema_rejects_duplicate_columns() {
        let mut schema: AirSchema<Fp> = AirSchema::new();
        schema.add_column("X", Context::new(0, 1), ColumnKind::Data).unwrap();
        let err = schema.add_column("X", Context::new(0, 1), ColumnKind::Data).unwrap_err();
        assert_eq!(err, SchemaError::DuplicateColumn { name: "X".into() });
    }

    #[test]
    fn test_schema_rejects_non_power_of_two_multiplier() {
        let mut schema: AirSchema<Fp> = AirSchema::new();
        let err = schema.add_column("X", Context::new(0, 3), ColumnKind::Data).unwrap_err();
        assert_eq!(err, SchemaError::NonPowerOfTwoMultiplier { name: "X".into() });
        assert!(schema.add_column("Y", Context::new(0, 4), ColumnKind::Data).is_ok());
    }

    #[test]
    fn test_schema_rejects_conflicted_context_constraint() {
        let mut schema: AirSchema<Fp> = AirSchema::new();
        schema.add_column("X", Context::new(0, 1), ColumnKind::Data).unwrap();
        schema.add_column("Y", Context::new(1, 1), ColumnKind::Data).unwrap();
        let expr = AirExpr::sub(AirExpr::column(0, 0), AirExpr::column(1, 0));
        let err = schema
            .add_vanishing_constraint("bad", Domain::All, Context::Conflicted, expr)
            .unwrap_err();
        assert!(matches!(err, SchemaError::ContextConflict { .. }));
    }
}
