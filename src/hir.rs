//! HIR: the surface-facing intermediate representation.
//!
//! Adds sugar that has no AIR/MIR counterpart: `IfZero` (expanded away via
//! the `Normalise` gadget already present at MIR) and `List`, a conjunction
//! marker legal only at a constraint's root.

#[cfg(not(feature = "std"))]
use alloc::{boxed::Box, format, string::String, vec, vec::Vec};

use crate::air::Domain;
use crate::context::Context;
use crate::field::Field;
use crate::mir::{ColumnType, MirExpr, MirSchema};
use crate::trace::ColumnKind;
use core::fmt;
use tracing::debug;

/// A HIR-level expression: everything MIR has, plus `IfZero` and `List`.
#[derive(Clone, Debug)]
pub enum HirExpr<F: Field> {
    Const(F),
    ColumnAccess { column: usize, shift: i32 },
    Add(Vec<HirExpr<F>>),
    Sub(Box<HirExpr<F>>, Box<HirExpr<F>>),
    Mul(Vec<HirExpr<F>>),
    Normalise(Box<HirExpr<F>>),
    /// Either branch may be absent. Lowers per §4.3's three cases.
    IfZero {
        cond: Box<HirExpr<F>>,
        then_branch: Option<Box<HirExpr<F>>>,
        else_branch: Option<Box<HirExpr<F>>>,
    },
    /// A conjunction of "must vanish" properties. Legal only as the direct
    /// body of a constraint; [`lower_constraint_body`] is the only place
    /// that may see one.
    List(Vec<HirExpr<F>>),
}

impl<F: Field> HirExpr<F> {
    pub fn constant(value: F) -> Self {
        HirExpr::Const(value)
    }

    pub fn column(column: usize, shift: i32) -> Self {
        HirExpr::ColumnAccess { column, shift }
    }

    pub fn add(args: Vec<HirExpr<F>>) -> Self {
        HirExpr::Add(args)
    }

    pub fn sub(lhs: HirExpr<F>, rhs: HirExpr<F>) -> Self {
        HirExpr::Sub(Box::new(lhs), Box::new(rhs))
    }

    pub fn mul(args: Vec<HirExpr<F>>) -> Self {
        HirExpr::Mul(args)
    }

    pub fn normalise(inner: HirExpr<F>) -> Self {
        HirExpr::Normalise(Box::new(inner))
    }

    pub fn if_zero(cond: HirExpr<F>, then_branch: Option<HirExpr<F>>, else_branch: Option<HirExpr<F>>) -> Self {
        HirExpr::IfZero {
            cond: Box::new(cond),
            then_branch: then_branch.map(Box::new),
            else_branch: else_branch.map(Box::new),
        }
    }

    pub fn list(args: Vec<HirExpr<F>>) -> Self {
        HirExpr::List(args)
    }

    /// Lower this expression to MIR. Panics if a `List` appears anywhere but
    /// the constraint root — lowering is total over well-formed input, and a
    /// nested `List` is an implementation bug in whatever built this HIR, not
    /// user error (the parser in [`crate::sexp`] never constructs one).
    pub fn lower_to_mir(&self) -> MirExpr<F> {
        match self {
            HirExpr::Const(c) => MirExpr::constant(*c),
            HirExpr::ColumnAccess { column, shift } => MirExpr::column(*column, *shift),
            HirExpr::Add(args) => MirExpr::add(args.iter().map(HirExpr::lower_to_mir).collect()),
            HirExpr::Sub(lhs, rhs) => MirExpr::sub(lhs.lower_to_mir(), rhs.lower_to_mir()),
            HirExpr::Mul(args) => MirExpr::mul(args.iter().map(HirExpr::lower_to_mir).collect()),
            HirExpr::Normalise(inner) => MirExpr::normalise(inner.lower_to_mir()),
            HirExpr::IfZero { cond, then_branch, else_branch } => {
                let cond = cond.lower_to_mir();
                match (then_branch, else_branch) {
                    (Some(t), Some(e)) => {
                        // NORMALISE(c) * e + (1 - NORMALISE(c)) * t
                        let norm_c = MirExpr::normalise(cond);
                        let t = t.lower_to_mir();
                        let e = e.lower_to_mir();
                        let one_minus_norm = MirExpr::sub(MirExpr::constant(F::ONE), norm_c.clone());
                        MirExpr::add(vec![
                            MirExpr::mul(vec![norm_c, e]),
                            MirExpr::mul(vec![one_minus_norm, t]),
                        ])
                    }
                    (Some(t), None) => {
                        // (1 - NORMALISE(c)) * t
                        let norm_c = MirExpr::normalise(cond);
                        let t = t.lower_to_mir();
                        let one_minus_norm = MirExpr::sub(MirExpr::constant(F::ONE), norm_c);
                        MirExpr::mul(vec![one_minus_norm, t])
                    }
                    (None, Some(e)) => {
                        // NORMALISE(c) * e
                        let norm_c = MirExpr::normalise(cond);
                        let e = e.lower_to_mir();
                        MirExpr::mul(vec![norm_c, e])
                    }
                    (None, None) => panic!("if-zero with neither branch is ill-formed"),
                }
            }
            HirExpr::List(_) => panic!("List is only legal at a constraint's root"),
        }
    }

    /// The evaluation context of this expression.
    pub fn context(&self, column_contexts: &[Context]) -> Context {
        match self {
            HirExpr::Const(_) => Context::Void,
            HirExpr::ColumnAccess { column, .. } => column_contexts[*column],
            HirExpr::Add(args) | HirExpr::Mul(args) => {
                args.iter().fold(Context::Void, |acc, a| acc.join(a.context(column_contexts)))
            }
            HirExpr::Sub(lhs, rhs) => lhs.context(column_contexts).join(rhs.context(column_contexts)),
            HirExpr::Normalise(inner) => inner.context(column_contexts),
            HirExpr::IfZero { cond, then_branch, else_branch } => {
                let mut ctx = cond.context(column_contexts);
                if let Some(t) = then_branch {
                    ctx = ctx.join(t.context(column_contexts));
                }
                if let Some(e) = else_branch {
                    ctx = ctx.join(e.context(column_contexts));
                }
                ctx
            }
            HirExpr::List(args) => {
                args.iter().fold(Context::Void, |acc, a| acc.join(a.context(column_contexts)))
            }
        }
    }
}

/// Declaration of a HIR-level column: its type and context. Storage kind is
/// always `Data` at this level — computed columns only appear from MIR
/// lowering onward.
#[derive(Clone, Debug)]
pub struct HirColumn {
    pub name: String,
    pub ty: ColumnType,
    pub context: Context,
}

/// A declared permutation at the HIR level, carried through to MIR
/// unchanged.
#[derive(Clone, Debug)]
pub struct HirPermutation {
    pub handle: String,
    pub targets: Vec<usize>,
    pub sources: Vec<usize>,
    pub signs: Vec<bool>,
}

/// Errors raised while a [`HirSchema`] is being built — the outermost,
/// user-facing fail-fast boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SchemaError {
    UnknownColumn { name: String },
    DuplicateColumn { name: String },
    ContextConflict { expression: String },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::UnknownColumn { name } => write!(f, "unknown column `{name}`"),
            SchemaError::DuplicateColumn { name } => write!(f, "duplicate column `{name}`"),
            SchemaError::ContextConflict { expression } => {
                write!(f, "context conflict in expression `{expression}`")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SchemaError {}

/// A parsed, not-yet-lowered schema: columns, permutations, and constraints
/// (either genuine vanishing constraints or advisory property assertions),
/// each carrying a root expression that may be a `List`.
#[derive(Clone, Debug, Default)]
pub struct HirSchema<F: Field> {
    pub columns: Vec<HirColumn>,
    pub permutations: Vec<HirPermutation>,
    pub vanishing_constraints: Vec<(String, Domain, Context, HirExpr<F>)>,
    pub property_assertions: Vec<(String, Domain, Context, HirExpr<F>)>,
    /// Explicit `(column, bound)` obligations from `definrange`, independent
    /// of any type tag the column was declared with.
    pub range_constraints: Vec<(usize, u64)>,
}

impl<F: Field> HirSchema<F> {
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
            permutations: Vec::new(),
            vanishing_constraints: Vec::new(),
            property_assertions: Vec::new(),
            range_constraints: Vec::new(),
        }
    }

    pub fn column_id_by_name(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn add_column(&mut self, name: impl Into<String>, ty: ColumnType, context: Context) -> Result<usize, SchemaError> {
        let name = name.into();
        if self.column_id_by_name(&name).is_some() {
            return Err(SchemaError::DuplicateColumn { name });
        }
        debug!(column = %name, ?ty, "registering column");
        self.columns.push(HirColumn { name, ty, context });
        Ok(self.columns.len() - 1)
    }

    pub fn add_permutation(&mut self, handle: impl Into<String>, targets: Vec<usize>, sources: Vec<usize>, signs: Vec<bool>) {
        let handle = handle.into();
        debug!(%handle, ?targets, ?sources, "registering permutation");
        self.permutations.push(HirPermutation {
            handle,
            targets,
            sources,
            signs,
        });
    }

    pub fn add_vanishing_constraint(&mut self, handle: impl Into<String>, domain: Domain, context: Context, body: HirExpr<F>) {
        let handle = handle.into();
        debug!(%handle, ?domain, "registering vanishing constraint");
        self.vanishing_constraints.push((handle, domain, context, body));
    }

    pub fn add_property_assertion(&mut self, handle: impl Into<String>, domain: Domain, context: Context, body: HirExpr<F>) {
        let handle = handle.into();
        debug!(%handle, ?domain, "registering property assertion");
        self.property_assertions.push((handle, domain, context, body));
    }

    pub fn add_range_constraint(&mut self, column: usize, bound: u64) {
        debug!(column, bound, "registering definrange obligation");
        self.range_constraints.push((column, bound));
    }
}

/// Flatten a constraint body into one or more `(handle, expr)` pairs: a
/// `List` at the root becomes one entry per argument, suffixed `#0`, `#1`,
/// …; anything else becomes a single entry under the unsuffixed handle.
fn flatten_constraint_body<F: Field>(handle: &str, body: &HirExpr<F>) -> Vec<(String, MirExpr<F>)> {
    match body {
        HirExpr::List(args) => args
            .iter()
            .enumerate()
            .map(|(i, arg)| (format!("{handle}#{i}"), arg.lower_to_mir()))
            .collect(),
        other => {
            let mut v = Vec::with_capacity(1);
            v.push((String::from(handle), other.lower_to_mir()));
            v
        }
    }
}

/// Lower a full [`HirSchema`] to a [`MirSchema`]. Column ids and contexts
/// carry over unchanged; `List`-rooted constraints are flattened per
/// [`flatten_constraint_body`].
#[cfg_attr(feature = "std", tracing::instrument(skip(hir), fields(columns = hir.columns.len())))]
pub fn lower_schema_to_mir<F: Field>(hir: &HirSchema<F>) -> MirSchema<F> {
    let mut mir = MirSchema::new();

    // Permutation targets are synthesised during expansion, never supplied
    // by the caller, so they become Computed columns rather than Data ones.
    let mut target_ids = crate::util::SortedSet::new();
    for perm in &hir.permutations {
        for &t in &perm.targets {
            target_ids.insert(t);
        }
    }

    for (i, column) in hir.columns.iter().enumerate() {
        let kind = if target_ids.contains(&i) {
            ColumnKind::Computed
        } else {
            ColumnKind::Data
        };
        mir.add_column(column.name.clone(), column.ty, column.context, kind);
    }

    for (handle, domain, context, body) in &hir.vanishing_constraints {
        for (sub_handle, expr) in flatten_constraint_body(handle, body) {
            mir.add_vanishing_constraint(sub_handle, *domain, *context, expr);
        }
    }

    for (handle, domain, context, body) in &hir.property_assertions {
        for (sub_handle, expr) in flatten_constraint_body(handle, body) {
            mir.add_property_assertion(sub_handle, *domain, *context, expr);
        }
    }

    for perm in &hir.permutations {
        mir.add_permutation(perm.handle.clone(), perm.targets.clone(), perm.sources.clone(), perm.signs.clone());
    }

    for &(column, bound) in &hir.range_constraints {
        mir.add_range_constraint(column, bound);
    }

    mir
}
