//! Universal properties from the testable-properties list: pseudo-inverse
//! correctness, context join laws, and trace-padding invariance.

use arc_check::context::{join_all, Context};
use arc_check::field::{Field, Fp};
use proptest::collection::vec as prop_vec;
use proptest::prelude::*;

fn arb_fp() -> impl Strategy<Value = Fp> {
    any::<u64>().prop_map(Fp::from_u64)
}

fn arb_context() -> impl Strategy<Value = Context> {
    prop_oneof![
        Just(Context::Void),
        Just(Context::Conflicted),
        (0usize..4, 1u32..8).prop_map(|(m, mult)| Context::new(m, mult)),
    ]
}

proptest! {
    #[test]
    fn pseudo_inverse_is_zero_or_one(v in arb_fp()) {
        let product = v * v.inverse();
        prop_assert!(product.is_zero() || product == Fp::ONE);
        if !v.is_zero() {
            prop_assert_eq!(product, Fp::ONE);
        } else {
            prop_assert!(product.is_zero());
        }
    }

    #[test]
    fn context_join_is_commutative(a in arb_context(), b in arb_context()) {
        prop_assert_eq!(a.join(b), b.join(a));
    }

    #[test]
    fn context_join_is_associative(a in arb_context(), b in arb_context(), c in arb_context()) {
        prop_assert_eq!(a.join(b).join(c), a.join(b.join(c)));
    }

    #[test]
    fn void_is_join_identity(a in arb_context()) {
        prop_assert_eq!(a.join(Context::Void), a);
        prop_assert_eq!(Context::Void.join(a), a);
    }

    #[test]
    fn conflicted_absorbs(a in arb_context()) {
        prop_assert!(a.join(Context::Conflicted).is_conflicted());
    }

    #[test]
    fn join_all_matches_manual_fold(ctxs in prop_vec(arb_context(), 0..6)) {
        let manual = ctxs.iter().fold(Context::Void, |acc, &c| acc.join(c));
        prop_assert_eq!(join_all(ctxs.iter().copied()), manual);
    }
}

mod padding_invariance {
    use super::*;
    use arc_check::trace::{Column, ColumnKind, Trace};
    use arc_check::{accepts, compile, expand_trace, CheckerConfig};

    proptest! {
        #[test]
        fn trace_padding_does_not_change_acceptance(values in prop_vec(0u64..1000, 1..12), pad in 0usize..5) {
            let schema = compile::<Fp>("(defcolumns X) (defconstraint s nil (- X (shift X -1)))").unwrap();

            let mut unpadded = Trace::new();
            unpadded.add_column(Column::new(
                "X",
                values.iter().copied().map(Fp::from_u64).collect(),
                Fp::ZERO,
                ColumnKind::Data,
                Context::new(0, 1),
            ));

            let mut padded = unpadded.clone();
            padded.pad(pad);

            expand_trace(&schema, &mut unpadded, &CheckerConfig::default()).unwrap();
            expand_trace(&schema, &mut padded, &CheckerConfig::default()).unwrap();

            let unpadded_result = accepts(&schema, &unpadded);
            let padded_result = accepts(&schema, &padded);

            // Trace::pad prepends each column's own out-of-bounds padding
            // value, which is exactly what a negative shift already reads
            // past row 0, so the added rows trivially satisfy the shift
            // constraint and every later row sees the same neighbour pair it
            // saw before padding: acceptance is unchanged in both directions.
            prop_assert_eq!(unpadded_result.is_ok(), padded_result.is_ok());
        }
    }
}
