//! Small, reusable pieces of AIR assembled once per distinct expression
//! rather than once per use site.
//!
//! Two gadgets live here: the pseudo-inverse gadget, which turns
//! [`crate::mir::MirExpr::Normalise`] into two polynomial constraints plus an
//! auxiliary witness column, and the sorted-permutation gadget, which fills
//! in a permutation's target columns and pins their order with a delta range
//! check.

#[cfg(not(feature = "std"))]
use alloc::{format, string::String, vec};

use crate::air::{Assignment, AirExpr, Domain, Recipe};
use crate::context::Context;
use crate::field::Field;
use crate::mir::{LoweringBuilder, MirPermutation};
use core::fmt;

/// A deduplication record for the pseudo-inverse gadget: two gadgets built
/// from structurally identical expressions (compared via their `Display`
/// rendering, which is canonical for a given AIR tree) share one indicator
/// column rather than each allocating their own.
#[derive(Clone, Debug)]
pub(crate) struct GadgetRecord {
    pub(crate) key: String,
    pub(crate) inv_column: usize,
}

impl PartialEq for GadgetRecord {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

pub(crate) fn hash_gadget_key(record: &GadgetRecord) -> u64 {
    // FNV-1a over the canonical key; only the key participates in equality,
    // so only the key needs to participate in the hash.
    let mut h: u64 = 1469598103934665603;
    for byte in record.key.bytes() {
        h ^= byte as u64;
        h = h.wrapping_mul(1099511628211);
    }
    h
}

/// Lower a `Normalise(inner)` node. Returns the AIR expression
/// `inner * inv_inner`, which is `0` where `inner` is zero and `1` otherwise.
///
/// Introduces (at most once per distinct `inner`, keyed structurally) a
/// computed inverse column `inv` with recipe [`Recipe::Inverse`], and two
/// directional vanishing constraints pinning `inv` to the genuine
/// pseudo-inverse of `inner`:
///
/// - `{name}.le`: `inner * (1 - inner * inv) = 0` — if `inner != 0`, forces
///   `inner * inv = 1`.
/// - `{name}.ge`: `inv * (1 - inner * inv) = 0` — if `inv != 0`, forces
///   `inner * inv = 1`.
///
/// An honest prover sets `inv = inverse(inner)` (so `inv = 0` when
/// `inner = 0`, per the pseudo-inverse convention); the two constraints above
/// are what prevent a dishonest prover from picking any other `inv`.
pub fn pseudo_inverse<F: Field + fmt::Display>(
    builder: &mut LoweringBuilder<F>,
    inner: AirExpr<F>,
    context: Context,
) -> AirExpr<F> {
    let key = format!("{inner}");
    if let Some(existing) = builder
        .seen_inverses
        .get(&GadgetRecord { key: key.clone(), inv_column: 0 })
    {
        return AirExpr::mul(vec![inner, AirExpr::column(existing.inv_column, 0)]);
    }

    let index = builder.schema.columns().len();
    let inv_name = format!("norm#{index}.inv");

    let inv_col = builder
        .schema
        .add_column(inv_name.clone(), context, crate::trace::ColumnKind::Computed)
        .expect("gadget column names are freshly generated");

    builder.schema.add_assignment(Assignment {
        targets: vec![inv_col],
        recipe: Recipe::Inverse(inner.clone()),
    });

    let residual = AirExpr::sub(
        AirExpr::constant(F::ONE),
        AirExpr::mul(vec![inner.clone(), AirExpr::column(inv_col, 0)]),
    );

    builder
        .schema
        .add_vanishing_constraint(
            format!("{inv_name}.le"),
            Domain::All,
            context,
            AirExpr::mul(vec![inner.clone(), residual.clone()]),
        )
        .expect("gadget constraints share their operands' context");

    builder
        .schema
        .add_vanishing_constraint(
            format!("{inv_name}.ge"),
            Domain::All,
            context,
            AirExpr::mul(vec![AirExpr::column(inv_col, 0), residual]),
        )
        .expect("gadget constraints share their operands' context");

    builder.seen_inverses.insert(GadgetRecord { key, inv_column: inv_col });

    AirExpr::mul(vec![inner, AirExpr::column(inv_col, 0)])
}

/// Register the recipe that fills `perm.targets` in with a sorted
/// rearrangement of `perm.sources`, plus a delta column and range check on
/// the primary sort key that pins the resulting order.
///
/// Only the first target/sign pair drives the delta check; a fully general
/// lexicographic multi-column sort order would need a composite delta built
/// from all columns, which this crate does not need for the constraint kinds
/// it supports.
pub fn sorted_permutation<F: Field + fmt::Display>(builder: &mut LoweringBuilder<F>, perm: &MirPermutation) {
    builder.schema.add_assignment(Assignment {
        targets: perm.targets.clone(),
        recipe: Recipe::SortedPermutation {
            sources: perm.sources.clone(),
            signs: perm.signs.clone(),
        },
    });

    let (Some(&primary_target), Some(&ascending)) = (perm.targets.first(), perm.signs.first()) else {
        return;
    };

    let context = builder.column_contexts[primary_target];
    let delta_expr = if ascending {
        AirExpr::sub(AirExpr::column(primary_target, 0), AirExpr::column(primary_target, -1))
    } else {
        AirExpr::sub(AirExpr::column(primary_target, -1), AirExpr::column(primary_target, 0))
    };

    let delta_name = format!("{}.delta", perm.handle);
    let delta_col = builder
        .schema
        .add_column(delta_name.clone(), context, crate::trace::ColumnKind::Computed)
        .expect("gadget column names are freshly generated");
    builder.schema.add_assignment(Assignment {
        targets: vec![delta_col],
        recipe: Recipe::Expression(delta_expr),
    });

    // Bounding the step keeps the order check decidable without assuming
    // anything about the field's full modulus.
    builder.schema.add_range_constraint(format!("{delta_name}.range"), delta_col, 1u64 << 32);
}
