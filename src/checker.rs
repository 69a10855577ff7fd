//! The trace checker: [`expand_trace`] materialises computed columns into a
//! user-supplied trace, [`accepts`] runs every constraint kind against an
//! expanded trace and reports the first failure in declaration order.

#[cfg(not(feature = "std"))]
use alloc::{format, string::String, vec::Vec};

use crate::air::{AirSchema, Domain, Recipe};
use crate::config::CheckerConfig;
use crate::field::Field;
use crate::trace::{Column, ColumnKind, Trace};
use core::cmp::Ordering;
use core::fmt;
use tracing::{debug, trace};

/// Which constraint kind a [`CheckError::ConstraintFailure`] came from.
/// Permutation failures carry the column names involved (§4 of the
/// expanded spec: diagnostics should name columns, not just ids).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConstraintKind {
    Vanishing,
    Range,
    Permutation { targets: Vec<String>, sources: Vec<String> },
    Property,
}

/// Everything that can go wrong expanding or checking a trace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CheckError {
    MalformedTrace { reason: String },
    ConstraintFailure { handle: String, row: i64, kind: ConstraintKind },
    ExpansionFailure { column: String, reason: String },
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckError::MalformedTrace { reason } => write!(f, "malformed trace: {reason}"),
            CheckError::ConstraintFailure { handle, row, kind } => {
                write!(f, "constraint `{handle}` failed at row {row} ({kind:?})")
            }
            CheckError::ExpansionFailure { column, reason } => {
                write!(f, "failed to expand column `{column}`: {reason}")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CheckError {}

/// Re-key `trace` into the schema's column-id order, filling in missing
/// computed columns with an empty placeholder to be populated by
/// [`run_assignments`]. Rejects a trace missing a declared data column, and
/// (when `config.strict`) a trace carrying a column the schema does not
/// declare.
fn align_to_schema<F: Field + fmt::Display>(
    schema: &AirSchema<F>,
    trace: &Trace<F>,
    config: &CheckerConfig,
) -> Result<Trace<F>, CheckError> {
    if config.strict {
        for existing in trace.columns() {
            if schema.column_id_by_name(existing.name()).is_none() {
                return Err(CheckError::MalformedTrace {
                    reason: format!("unknown column `{}`", existing.name()),
                });
            }
        }
    }

    let mut ordered = Vec::with_capacity(schema.columns().len());
    for decl in schema.columns() {
        match trace.column_by_name(&decl.name) {
            Some(existing) => ordered.push(existing.clone()),
            None => match decl.kind {
                ColumnKind::Data => {
                    return Err(CheckError::MalformedTrace {
                        reason: format!("missing column `{}`", decl.name),
                    });
                }
                ColumnKind::Computed => {
                    ordered.push(Column::new(decl.name.clone(), Vec::new(), F::ZERO, ColumnKind::Computed, decl.context));
                }
            },
        }
    }
    Ok(Trace::from_columns(ordered))
}

/// The largest negative shift read anywhere in the schema's constraints,
/// i.e. how far a computed column's recipe might need to look back.
fn max_negative_shift<F: Field>(schema: &AirSchema<F>) -> u32 {
    let mut bound = 0;
    for vc in &schema.vanishing_constraints {
        bound = bound.max(vc.expr.bounds().max_negative);
    }
    for pa in &schema.property_assertions {
        bound = bound.max(pa.expr.bounds().max_negative);
    }
    for assignment in &schema.assignments {
        if let Recipe::Expression(e) | Recipe::Inverse(e) = &assignment.recipe {
            bound = bound.max(e.bounds().max_negative);
        }
    }
    bound
}

fn run_assignments<F: Field>(schema: &AirSchema<F>, trace: &mut Trace<F>) -> Result<(), CheckError> {
    let height = trace.height();
    for assignment in &schema.assignments {
        let already_filled = assignment
            .targets
            .iter()
            .all(|&t| trace.column_by_index(t).height() == height);
        if already_filled {
            continue;
        }

        trace!(targets = ?assignment.targets, "running assignment recipe");
        match &assignment.recipe {
            Recipe::Expression(expr) => {
                let values: Vec<F> = (0..height as i64).map(|r| expr.eval_at(trace, r)).collect();
                write_single_target(trace, &assignment.targets, values)?;
            }
            Recipe::Inverse(expr) => {
                let values: Vec<F> = (0..height as i64).map(|r| expr.eval_at(trace, r).inverse()).collect();
                write_single_target(trace, &assignment.targets, values)?;
            }
            Recipe::SortedPermutation { sources, signs } => {
                let mut rows: Vec<Vec<u64>> = (0..height)
                    .map(|r| sources.iter().map(|&c| trace.get(c, r as i64).to_canonical_u64()).collect())
                    .collect();
                rows.sort_by(|a, b| lexicographic_compare(a, b, signs));
                for (i, &target) in assignment.targets.iter().enumerate() {
                    let col = trace.column_by_index_mut(target);
                    for row in &rows {
                        col.push(F::from_u64(row[i]));
                    }
                }
            }
        }
    }
    Ok(())
}

fn write_single_target<F: Field>(trace: &mut Trace<F>, targets: &[usize], values: Vec<F>) -> Result<(), CheckError> {
    let &target = targets.first().ok_or_else(|| CheckError::ExpansionFailure {
        column: String::from("<unknown>"),
        reason: String::from("expression recipe has no target column"),
    })?;
    let col = trace.column_by_index_mut(target);
    for v in values {
        col.push(v);
    }
    Ok(())
}

fn lexicographic_compare(a: &[u64], b: &[u64], signs: &[bool]) -> Ordering {
    for (i, &ascending) in signs.iter().enumerate() {
        let cmp = a[i].cmp(&b[i]);
        if cmp != Ordering::Equal {
            return if ascending { cmp } else { cmp.reverse() };
        }
    }
    Ordering::Equal
}

/// Expand `trace` in place: align it to the schema's column order, pad for
/// negative shifts, and materialise every computed column. A trace whose
/// computed columns are already present with matching height is accepted
/// as-is (already expanded) — see §4.6 rule 4.
#[cfg_attr(feature = "std", tracing::instrument(skip(schema, trace, config), fields(columns = schema.columns().len())))]
pub fn expand_trace<F: Field + fmt::Display>(
    schema: &AirSchema<F>,
    trace: &mut Trace<F>,
    config: &CheckerConfig,
) -> Result<(), CheckError> {
    let mut aligned = align_to_schema(schema, trace, config)?;
    // Every `Column::get` is already total (out-of-bounds reads, negative or
    // positive, return the column's padding value), so no physical padding
    // is needed for shifted reads to stay defined — `max_negative_shift`
    // exists only so the bound can be logged for diagnostics.
    let max_negative = max_negative_shift(schema);
    debug!(max_negative_shift = max_negative, "aligned trace before expansion");
    run_assignments(schema, &mut aligned)?;
    *trace = aligned;
    Ok(())
}

fn domain_row(domain: Domain, height: usize) -> i64 {
    match domain {
        Domain::Row(r) if r < 0 => height as i64 + r,
        Domain::Row(r) => r,
        Domain::All => unreachable!("Domain::All has no single row"),
    }
}

fn check_domain<F: Field>(trace: &Trace<F>, domain: Domain, mut holds: impl FnMut(i64) -> bool) -> Result<(), i64> {
    match domain {
        Domain::All => {
            for r in 0..trace.height() as i64 {
                if !holds(r) {
                    return Err(r);
                }
            }
            Ok(())
        }
        Domain::Row(_) => {
            let row = domain_row(domain, trace.height());
            if !holds(row) {
                return Err(row);
            }
            Ok(())
        }
    }
}

fn column_names<F: Field>(schema: &AirSchema<F>, ids: &[usize]) -> Vec<String> {
    ids.iter().map(|&id| schema.columns()[id].name.clone()).collect()
}

/// Check every constraint in `schema` against `trace` (assumed already
/// expanded), in declaration order: vanishing, range, permutation, property.
/// Returns the first failure encountered.
#[cfg_attr(feature = "std", tracing::instrument(skip(schema, trace), fields(height = trace.height())))]
pub fn accepts<F: Field>(schema: &AirSchema<F>, trace: &Trace<F>) -> Result<(), CheckError> {
    for vc in &schema.vanishing_constraints {
        trace!(handle = %vc.handle, "checking vanishing constraint");
        check_domain(trace, vc.domain, |r| vc.expr.eval_at(trace, r).is_zero()).map_err(|row| {
            CheckError::ConstraintFailure {
                handle: vc.handle.clone(),
                row,
                kind: ConstraintKind::Vanishing,
            }
        })?;
    }

    for rc in &schema.range_constraints {
        trace!(handle = %rc.handle, bound = rc.bound, "checking range constraint");
        let col = trace.column_by_index(rc.column);
        for r in 0..col.height() {
            if col.get(r as i64).to_canonical_u64() >= rc.bound {
                return Err(CheckError::ConstraintFailure {
                    handle: rc.handle.clone(),
                    row: r as i64,
                    kind: ConstraintKind::Range,
                });
            }
        }
    }

    for pc in &schema.permutation_constraints {
        trace!(handle = %pc.handle, "checking permutation constraint");
        let height = trace.height();
        let target_rows: Vec<Vec<u64>> = (0..height)
            .map(|r| pc.targets.iter().map(|&c| trace.get(c, r as i64).to_canonical_u64()).collect())
            .collect();
        let source_rows: Vec<Vec<u64>> = (0..height)
            .map(|r| pc.sources.iter().map(|&c| trace.get(c, r as i64).to_canonical_u64()).collect())
            .collect();
        if !crate::util::is_permutation_of(&target_rows, &source_rows) {
            return Err(CheckError::ConstraintFailure {
                handle: pc.handle.clone(),
                row: -1,
                kind: ConstraintKind::Permutation {
                    targets: column_names(schema, &pc.targets),
                    sources: column_names(schema, &pc.sources),
                },
            });
        }
    }

    for pa in &schema.property_assertions {
        trace!(handle = %pa.handle, "checking property assertion");
        check_domain(trace, pa.domain, |r| pa.expr.eval_at(trace, r).is_zero()).map_err(|row| {
            CheckError::ConstraintFailure {
                handle: pa.handle.clone(),
                row,
                kind: ConstraintKind::Property,
            }
        })?;
    }

    debug!("trace accepted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::air::{AirExpr, AirSchema};
    use crate::context::Context;
    use crate::field::Fp;

    fn data_trace(cols: &[(&str, &[u64])]) -> Trace<Fp> {
        let mut t = Trace::new();
        for (name, values) in cols {
            t.add_column(Column::new(
                *name,
                values.iter().copied().map(Fp::from_u64).collect(),
                Fp::ZERO,
                ColumnKind::Data,
                Context::new(0, 1),
            ));
        }
        t
    }

    #[test]
    fn test_scenario_1_boolean_constraint() {
        let mut schema: AirSchema<Fp> = AirSchema::new();
        schema.add_column("X", Context::new(0, 1), ColumnKind::Data).unwrap();
        let expr = AirExpr::mul(vec![AirExpr::column(0, 0), AirExpr::sub(AirExpr::column(0, 0), AirExpr::constant(Fp::ONE))]);
        schema.add_vanishing_constraint("c", Domain::All, Context::new(0, 1), expr).unwrap();

        let mut good = data_trace(&[("X", &[0, 1, 0, 1])]);
        expand_trace(&schema, &mut good, &CheckerConfig::default()).unwrap();
        assert!(accepts(&schema, &good).is_ok());

        let mut bad = data_trace(&[("X", &[0, 2])]);
        expand_trace(&schema, &mut bad, &CheckerConfig::default()).unwrap();
        let err = accepts(&schema, &bad).unwrap_err();
        assert!(matches!(err, CheckError::ConstraintFailure { handle, .. } if handle == "c"));
    }

    #[test]
    fn test_expand_fills_inverse_column_from_recipe() {
        let mut mir: crate::mir::MirSchema<Fp> = crate::mir::MirSchema::new();
        mir.add_column("X", crate::mir::ColumnType::Untyped, Context::new(0, 1), ColumnKind::Data);
        mir.add_vanishing_constraint(
            "n",
            Domain::All,
            Context::new(0, 1),
            crate::mir::MirExpr::sub(crate::mir::MirExpr::constant(Fp::ONE), crate::mir::MirExpr::normalise(crate::mir::MirExpr::column(0, 0))),
        );
        let schema = crate::mir::lower_schema_to_air(&mir).unwrap();

        let mut accepted = data_trace(&[("X", &[5, 1, 9])]);
        expand_trace(&schema, &mut accepted, &CheckerConfig::default()).unwrap();
        assert!(accepts(&schema, &accepted).is_ok());

        let mut rejected = data_trace(&[("X", &[0])]);
        expand_trace(&schema, &mut rejected, &CheckerConfig::default()).unwrap();
        assert!(accepts(&schema, &rejected).is_err());
    }

    #[test]
    fn test_range_constraint_rejects_out_of_bound_value() {
        let mut schema: AirSchema<Fp> = AirSchema::new();
        schema.add_column("B", Context::new(0, 1), ColumnKind::Data).unwrap();
        schema.add_range_constraint("B.range", 0, 256);
        let mut trace = data_trace(&[("B", &[10, 300])]);
        expand_trace(&schema, &mut trace, &CheckerConfig::default()).unwrap();
        let err = accepts(&schema, &trace).unwrap_err();
        assert!(matches!(err, CheckError::ConstraintFailure { kind: ConstraintKind::Range, row: 1, .. }));
    }

    #[test]
    fn test_scenario_5_sorted_permutation_expands_and_accepts() {
        let mut hir: crate::hir::HirSchema<Fp> = crate::hir::HirSchema::new();
        hir.add_column("S", crate::mir::ColumnType::Untyped, Context::new(0, 1)).unwrap();
        hir.add_column("T", crate::mir::ColumnType::Untyped, Context::new(0, 1)).unwrap();
        hir.add_permutation("perm", vec![1], vec![0], vec![true]);
        let mir = crate::hir::lower_schema_to_mir(&hir);
        let schema = crate::mir::lower_schema_to_air(&mir).unwrap();

        let mut trace = data_trace(&[("S", &[3, 1, 2])]);
        expand_trace(&schema, &mut trace, &CheckerConfig::default()).unwrap();
        let t_col = trace.column_by_name("T").unwrap();
        assert_eq!(t_col.data(), &[Fp::from_u64(1), Fp::from_u64(2), Fp::from_u64(3)]);
        assert!(accepts(&schema, &trace).is_ok());
    }

    #[test]
    fn test_strict_mode_rejects_unknown_column() {
        let mut schema: AirSchema<Fp> = AirSchema::new();
        schema.add_column("X", Context::new(0, 1), ColumnKind::Data).unwrap();
        let mut trace = data_trace(&[("X", &[1]), ("Y", &[2])]);
        let err = expand_trace(&schema, &mut trace, &CheckerConfig::strict()).unwrap_err();
        assert!(matches!(err, CheckError::MalformedTrace { .. }));
    }

    #[test]
    fn test_lenient_mode_ignores_unknown_column() {
        let mut schema: AirSchema<Fp> = AirSchema::new();
        schema.add_column("X", Context::new(0, 1), ColumnKind::Data).unwrap();
        let mut trace = data_trace(&[("X", &[1]), ("Y", &[2])]);
        assert!(expand_trace(&schema, &mut trace, &CheckerConfig::lenient()).is_ok());
    }

    #[test]
    fn test_missing_data_column_is_malformed() {
        let mut schema: AirSchema<Fp> = AirSchema::new();
        schema.add_column("X", Context::new(0, 1), ColumnKind::Data).unwrap();
        let mut trace: Trace<Fp> = Trace::new();
        let err = expand_trace(&schema, &mut trace, &CheckerConfig::default()).unwrap_err();
        assert!(matches!(err, CheckError::MalformedTrace { .. }));
    }
}
