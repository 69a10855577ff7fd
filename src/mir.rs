//! MIR: the middle intermediate representation.
//!
//! Adds exactly two things AIR does not have: typed columns (so a column can
//! be declared `uint(k)` and get its range constraint synthesised rather than
//! hand-written) and [`MirExpr::Normalise`], the non-polynomial "is this zero"
//! predicate that [`crate::gadgets::pseudo_inverse`] lowers into AIR.

#[cfg(not(feature = "std"))]
use alloc::{boxed::Box, format, string::String, vec::Vec};

use crate::air::{AirExpr, AirSchema, Domain, SchemaError};
use crate::context::{join_all, Context};
use crate::field::Field;
use crate::gadgets::{pseudo_inverse, sorted_permutation};
use crate::trace::ColumnKind;
use core::fmt;
use tracing::debug;

/// The declared type of a MIR column. `Untyped` columns carry no range
/// obligation; `Uint(k)` columns are constrained to `[0, 2^k)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnType {
    Untyped,
    Uint(u32),
}

/// A MIR-level expression: everything AIR has, plus `Normalise`.
#[derive(Clone, Debug)]
pub enum MirExpr<F: Field> {
    Const(F),
    ColumnAccess { column: usize, shift: i32 },
    Add(Vec<MirExpr<F>>),
    Sub(Box<MirExpr<F>>, Box<MirExpr<F>>),
    Mul(Vec<MirExpr<F>>),
    /// `1` if the operand is zero, `0` otherwise — the non-polynomial
    /// predicate lowered via the pseudo-inverse gadget. Note this is the
    /// *indicator*, not the value itself: `Normalise(e)` evaluates to `1`
    /// when `e == 0`.
    Normalise(Box<MirExpr<F>>),
}

impl<F: Field> MirExpr<F> {
    pub fn constant(value: F) -> Self {
        MirExpr::Const(value)
    }

    pub fn column(column: usize, shift: i32) -> Self {
        MirExpr::ColumnAccess { column, shift }
    }

    pub fn add(args: Vec<MirExpr<F>>) -> Self {
        MirExpr::Add(args)
    }

    pub fn sub(lhs: MirExpr<F>, rhs: MirExpr<F>) -> Self {
        MirExpr::Sub(Box::new(lhs), Box::new(rhs))
    }

    pub fn mul(args: Vec<MirExpr<F>>) -> Self {
        MirExpr::Mul(args)
    }

    pub fn normalise(inner: MirExpr<F>) -> Self {
        MirExpr::Normalise(Box::new(inner))
    }

    /// The evaluation context of this expression. `Normalise`'s context is
    /// that of its operand — it introduces no new column reads of its own.
    pub fn context(&self, column_contexts: &[Context]) -> Context {
        match self {
            MirExpr::Const(_) => Context::Void,
            MirExpr::ColumnAccess { column, .. } => column_contexts[*column],
            MirExpr::Add(args) | MirExpr::Mul(args) => {
                join_all(args.iter().map(|a| a.context(column_contexts)))
            }
            MirExpr::Sub(lhs, rhs) => lhs.context(column_contexts).join(rhs.context(column_contexts)),
            MirExpr::Normalise(inner) => inner.context(column_contexts),
        }
    }

    /// Lower this expression to AIR, threading `builder` through so that
    /// `Normalise` nodes can register the auxiliary computed column and
    /// directional constraints they need.
    pub fn lower_to_air(&self, builder: &mut LoweringBuilder<F>) -> AirExpr<F> {
        match self {
            MirExpr::Const(c) => AirExpr::constant(*c),
            MirExpr::ColumnAccess { column, shift } => AirExpr::column(*column, *shift),
            MirExpr::Add(args) => {
                AirExpr::add(args.iter().map(|a| a.lower_to_air(builder)).collect())
            }
            MirExpr::Sub(lhs, rhs) => {
                AirExpr::sub(lhs.lower_to_air(builder), rhs.lower_to_air(builder))
            }
            MirExpr::Mul(args) => {
                AirExpr::mul(args.iter().map(|a| a.lower_to_air(builder)).collect())
            }
            MirExpr::Normalise(inner) => {
                let inner_air = inner.lower_to_air(builder);
                let ctx = inner.context(&builder.column_contexts);
                pseudo_inverse(builder, inner_air, ctx)
            }
        }
    }
}

/// Declaration of a MIR-level column: its type, context, and storage kind.
#[derive(Clone, Debug)]
pub struct MirColumn {
    pub name: String,
    pub ty: ColumnType,
    pub context: Context,
    pub kind: ColumnKind,
}

/// A permutation obligation at the MIR level: `targets` must be filled in
/// (by [`crate::air::Recipe::SortedPermutation`]) as a sorted rearrangement
/// of `sources`, and the two must remain a permutation of each other.
#[derive(Clone, Debug)]
pub struct MirPermutation {
    pub handle: String,
    pub targets: Vec<usize>,
    pub sources: Vec<usize>,
    pub signs: Vec<bool>,
}

/// The schema produced by [`crate::hir::HirExpr::lower_to_mir`] and consumed
/// by [`lower_schema_to_air`].
#[derive(Clone, Debug, Default)]
pub struct MirSchema<F: Field> {
    pub columns: Vec<MirColumn>,
    pub vanishing_constraints: Vec<(String, Domain, Context, MirExpr<F>)>,
    pub permutations: Vec<MirPermutation>,
    pub property_assertions: Vec<(String, Domain, Context, MirExpr<F>)>,
    /// Explicit `(column, bound)` obligations from `definrange`, independent
    /// of any type tag the column was declared with.
    pub range_constraints: Vec<(usize, u64)>,
}

impl<F: Field> MirSchema<F> {
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
            vanishing_constraints: Vec::new(),
            permutations: Vec::new(),
            property_assertions: Vec::new(),
            range_constraints: Vec::new(),
        }
    }

    pub fn add_column(&mut self, name: impl Into<String>, ty: ColumnType, context: Context, kind: ColumnKind) -> usize {
        let name = name.into();
        debug!(column = %name, ?ty, ?kind, "registering column");
        self.columns.push(MirColumn { name, ty, context, kind });
        self.columns.len() - 1
    }

    pub fn add_vanishing_constraint(&mut self, handle: impl Into<String>, domain: Domain, context: Context, expr: MirExpr<F>) {
        let handle = handle.into();
        debug!(%handle, ?domain, "registering vanishing constraint");
        self.vanishing_constraints.push((handle, domain, context, expr));
    }

    pub fn add_permutation(&mut self, handle: impl Into<String>, targets: Vec<usize>, sources: Vec<usize>, signs: Vec<bool>) {
        let handle = handle.into();
        debug!(%handle, ?targets, ?sources, "registering permutation");
        self.permutations.push(MirPermutation {
            handle,
            targets,
            sources,
            signs,
        });
    }

    pub fn add_property_assertion(&mut self, handle: impl Into<String>, domain: Domain, context: Context, expr: MirExpr<F>) {
        let handle = handle.into();
        debug!(%handle, ?domain, "registering property assertion");
        self.property_assertions.push((handle, domain, context, expr));
    }

    pub fn add_range_constraint(&mut self, column: usize, bound: u64) {
        debug!(column, bound, "registering definrange obligation");
        self.range_constraints.push((column, bound));
    }

    fn column_contexts(&self) -> Vec<Context> {
        self.columns.iter().map(|c| c.context).collect()
    }
}

/// Threaded through lowering so gadgets can append new computed columns and
/// constraints to the [`AirSchema`] under construction, while deduplicating
/// structurally-identical pseudo-inverse gadgets.
pub struct LoweringBuilder<F: Field> {
    pub schema: AirSchema<F>,
    pub column_contexts: Vec<Context>,
    pub(crate) seen_inverses: crate::util::HashedSet<
        crate::gadgets::GadgetRecord,
        fn(&crate::gadgets::GadgetRecord) -> u64,
    >,
}

impl<F: Field + fmt::Display> LoweringBuilder<F> {
    pub(crate) fn new(column_contexts: Vec<Context>) -> Self {
        Self {
            schema: AirSchema::new(),
            column_contexts,
            seen_inverses: crate::util::HashedSet::new(crate::gadgets::hash_gadget_key),
        }
    }
}

/// Lower a full [`MirSchema`] to an [`AirSchema`], range-lowering typed
/// columns, carrying permutation obligations through as
/// [`crate::air::PermutationConstraint`]s plus sorting-gadget recipes, and
/// expanding every `Normalise` via the pseudo-inverse gadget.
///
/// Extends lowering to carry range and permutation constraints (not only
/// vanishing ones) all the way to AIR.
#[cfg_attr(feature = "std", tracing::instrument(skip(mir), fields(columns = mir.columns.len())))]
pub fn lower_schema_to_air<F: Field + fmt::Display>(mir: &MirSchema<F>) -> Result<AirSchema<F>, SchemaError> {
    let column_contexts = mir.column_contexts();
    let mut builder = LoweringBuilder::new(column_contexts);

    for (i, column) in mir.columns.iter().enumerate() {
        let id = builder
            .schema
            .add_column(column.name.clone(), column.context, column.kind)?;
        debug_assert_eq!(id, i, "MIR and AIR column ids must stay in lockstep");
        if let ColumnType::Uint(bits) = column.ty {
            if bits == 1 {
                let access = AirExpr::column(id, 0);
                let expr = AirExpr::mul(vec![access.clone(), AirExpr::sub(access, AirExpr::constant(F::ONE))]);
                builder
                    .schema
                    .add_vanishing_constraint(format!("{}.bool", column.name), Domain::All, column.context, expr)?;
            } else {
                let bound = 1u64 << bits;
                builder.schema.add_range_constraint(format!("{}.range", column.name), id, bound);
            }
        }
    }

    for (handle, domain, context, expr) in &mir.vanishing_constraints {
        let air_expr = expr.lower_to_air(&mut builder);
        builder
            .schema
            .add_vanishing_constraint(handle.clone(), *domain, *context, air_expr)?;
    }

    for perm in &mir.permutations {
        builder
            .schema
            .add_permutation_constraint(perm.handle.clone(), perm.targets.clone(), perm.sources.clone());
        sorted_permutation(&mut builder, perm);
    }

    for &(column, bound) in &mir.range_constraints {
        let handle = format!("{}.definrange", mir.columns[column].name);
        builder.schema.add_range_constraint(handle, column, bound);
    }

    for (handle, domain, context, expr) in &mir.property_assertions {
        let air_expr = expr.lower_to_air(&mut builder);
        builder
            .schema
            .add_property_assertion(handle.clone(), *domain, *context, air_expr)?;
    }

    Ok(builder.schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::air::Domain;
    use crate::field::Fp;

    #[test]
    fn test_typed_column_lowers_to_range_constraint() {
        let mut mir: MirSchema<Fp> = MirSchema::new();
        mir.add_column("BYTE", ColumnType::Uint(8), Context::new(0, 1), ColumnKind::Data);
        let air = lower_schema_to_air(&mir).unwrap();
        assert_eq!(air.range_constraints.len(), 1);
        assert_eq!(air.range_constraints[0].bound, 256);
        assert_eq!(air.range_constraints[0].column, 0);
    }

    #[test]
    fn test_uint1_column_lowers_to_boolean_vanishing_constraint_not_range() {
        let mut mir: MirSchema<Fp> = MirSchema::new();
        mir.add_column("BIT", ColumnType::Uint(1), Context::new(0, 1), ColumnKind::Data);
        let air = lower_schema_to_air(&mir).unwrap();
        assert!(air.range_constraints.is_empty());
        assert_eq!(air.vanishing_constraints.len(), 1);
        assert_eq!(air.vanishing_constraints[0].handle, "BIT.bool");
    }

    #[test]
    fn test_normalise_lowers_to_two_vanishing_constraints_and_one_column() {
        let mut mir: MirSchema<Fp> = MirSchema::new();
        mir.add_column("X", ColumnType::Untyped, Context::new(0, 1), ColumnKind::Data);
        mir.add_vanishing_constraint(
            "is_zero",
            Domain::All,
            Context::new(0, 1),
            MirExpr::normalise(MirExpr::column(0, 0)),
        );
        let air = lower_schema_to_air(&mir).unwrap();
        // One auxiliary inverse column appended after X.
        assert_eq!(air.columns().len(), 2);
        assert_eq!(air.vanishing_constraints.len(), 2);
    }

    #[test]
    fn test_vanishing_constraint_context_carries_through() {
        let mut mir: MirSchema<Fp> = MirSchema::new();
        mir.add_column("X", ColumnType::Untyped, Context::new(2, 4), ColumnKind::Data);
        mir.add_vanishing_constraint("c", Domain::All, Context::new(2, 4), MirExpr::column(0, 0));
        let air = lower_schema_to_air(&mir).unwrap();
        assert_eq!(air.vanishing_constraints[0].context, Context::new(2, 4));
    }
}
