//! The six end-to-end scenarios: source text in, trace accept/reject out,
//! exercising the whole `parse -> lower -> lower -> expand -> accepts` chain.

use arc_check::field::Fp;
use arc_check::trace::{Column, ColumnKind, Trace};
use arc_check::{accepts, compile, expand_trace, CheckerConfig};

fn trace_from(cols: &[(&str, &[u64])]) -> Trace<Fp> {
    let mut t = Trace::new();
    for (name, values) in cols {
        t.add_column(Column::new(
            *name,
            values.iter().copied().map(Fp::from_u64).collect(),
            Fp::ZERO,
            ColumnKind::Data,
            arc_check::Context::new(0, 1),
        ));
    }
    t
}

#[test]
fn scenario_1_boolean_constraint() {
    let schema = compile::<Fp>("(defcolumns X) (defconstraint c nil (* X (- X 1)))").unwrap();

    let mut good = trace_from(&[("X", &[0, 1, 0, 1])]);
    expand_trace(&schema, &mut good, &CheckerConfig::default()).unwrap();
    assert!(accepts(&schema, &good).is_ok());

    let mut bad = trace_from(&[("X", &[0, 2])]);
    expand_trace(&schema, &mut bad, &CheckerConfig::default()).unwrap();
    let err = accepts(&schema, &bad).unwrap_err();
    assert!(format!("{err}").contains('c'));
}

#[test]
fn scenario_2_byte_decomposition() {
    let schema = compile::<Fp>(
        "(defcolumns X (B0 :u8) (B1 :u8)) (defconstraint d nil (- X (+ B0 (* 256 B1))))",
    )
    .unwrap();
    let mut trace = trace_from(&[("X", &[258]), ("B0", &[2]), ("B1", &[1])]);
    expand_trace(&schema, &mut trace, &CheckerConfig::default()).unwrap();
    assert!(accepts(&schema, &trace).is_ok());
}

#[test]
fn scenario_3_if_zero_lowering() {
    let schema = compile::<Fp>("(defcolumns X Y) (defconstraint i nil (if-zero X Y (- Y 1)))").unwrap();

    let mut good = trace_from(&[("X", &[0, 1]), ("Y", &[0, 1])]);
    expand_trace(&schema, &mut good, &CheckerConfig::default()).unwrap();
    assert!(accepts(&schema, &good).is_ok());

    let mut bad = trace_from(&[("X", &[0, 1]), ("Y", &[1, 0])]);
    expand_trace(&schema, &mut bad, &CheckerConfig::default()).unwrap();
    assert!(accepts(&schema, &bad).is_err());
}

#[test]
fn scenario_4_shift_rejects() {
    let schema = compile::<Fp>("(defcolumns X) (defconstraint s nil (- X (shift X -1)))").unwrap();
    let mut trace = trace_from(&[("X", &[1, 2, 3])]);
    expand_trace(&schema, &mut trace, &CheckerConfig::default()).unwrap();
    assert!(accepts(&schema, &trace).is_err());
}

#[test]
fn scenario_5_sorted_permutation() {
    let schema = compile::<Fp>("(defcolumns S) (defpermutation (T) (+) (S))").unwrap();
    let mut trace = trace_from(&[("S", &[3, 1, 2])]);
    expand_trace(&schema, &mut trace, &CheckerConfig::default()).unwrap();
    let t = trace.column_by_name("T").unwrap();
    assert_eq!(t.data(), &[Fp::from_u64(1), Fp::from_u64(2), Fp::from_u64(3)]);
    assert!(accepts(&schema, &trace).is_ok());
}

#[test]
fn scenario_6_normalisation() {
    let schema = compile::<Fp>("(defcolumns X) (defconstraint n nil (- 1 (norm X)))").unwrap();

    let mut accepted = trace_from(&[("X", &[5, 1, 9])]);
    expand_trace(&schema, &mut accepted, &CheckerConfig::default()).unwrap();
    assert!(accepts(&schema, &accepted).is_ok());

    let mut rejected = trace_from(&[("X", &[0])]);
    expand_trace(&schema, &mut rejected, &CheckerConfig::default()).unwrap();
    assert!(accepts(&schema, &rejected).is_err());
}
