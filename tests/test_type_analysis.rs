use proptest::prelude::*;

use symath::analysis::rules::{self, UndefinedPolicy};
use symath::{
    analyze, AnalysisError, AngleUnit, BinaryKind, Expr, Operand, ResultType, TypeAnalyzer,
    UnaryKind, VariadicKind,
};

fn num(value: f64) -> Expr {
    Expr::number(value)
}

fn binary(kind: BinaryKind, left: Expr, right: Expr) -> Expr {
    Expr::binary(kind, left, right).unwrap()
}

fn variadic(kind: VariadicKind, args: Vec<Expr>) -> Expr {
    Expr::variadic(kind, args).unwrap()
}

fn vector(values: &[f64]) -> Expr {
    variadic(VariadicKind::Vector, values.iter().copied().map(num).collect())
}

fn matrix(rows: &[&[f64]]) -> Expr {
    variadic(VariadicKind::Matrix, rows.iter().map(|row| vector(row)).collect())
}

#[test]
fn test_add_numbers() {
    assert_eq!(analyze(&binary(BinaryKind::Add, num(1.0), num(2.0))), Ok(ResultType::NUMBER));
}

#[test]
fn test_add_number_and_vector_names_right_operand() {
    let err = analyze(&binary(BinaryKind::Add, num(1.0), vector(&[1.0, 2.0]))).unwrap_err();
    assert_eq!(err.side(), Some(Operand::Right));
    assert_eq!(err.expected, ResultType::VECTOR);
    assert_eq!(err.actual, ResultType::NUMBER);
}

#[test]
fn test_bitwise_mismatch_is_plain() {
    let err = analyze(&binary(BinaryKind::BitAnd, num(1.0), Expr::boolean(true))).unwrap_err();
    assert_eq!(err.position, None);
}

#[test]
fn test_if_forms() {
    let two = variadic(VariadicKind::If, vec![Expr::boolean(true), num(1.0)]);
    assert_eq!(analyze(&two), Ok(ResultType::UNDEFINED));

    let three = variadic(VariadicKind::If, vec![Expr::boolean(true), num(1.0), num(2.0)]);
    assert_eq!(analyze(&three), Ok(ResultType::NUMBER));

    let bad = variadic(VariadicKind::If, vec![num(0.0), num(1.0), num(2.0)]);
    assert_eq!(analyze(&bad).unwrap_err().index(), Some(0));
}

#[test]
fn test_avg() {
    let avg = variadic(VariadicKind::Avg, vec![num(1.0), num(2.0), num(3.0)]);
    assert_eq!(analyze(&avg), Ok(ResultType::NUMBER));

    let err = analyze(&variadic(VariadicKind::Avg, vec![num(1.0), Expr::boolean(true)])).unwrap_err();
    assert_eq!(err.index(), Some(1));
    assert_eq!(err.expected, ResultType::NUMBER);
    assert_eq!(err.actual, ResultType::BOOLEAN);

    let single = variadic(VariadicKind::Sum, vec![vector(&[1.0, 2.0])]);
    assert_eq!(analyze(&single), Ok(ResultType::NUMBER));
}

#[test]
fn test_sin_of_variable_is_undefined() {
    assert_eq!(analyze(&Expr::unary(UnaryKind::Sin, Expr::var("x"))), Ok(ResultType::UNDEFINED));
}

#[test]
fn test_leaf_categories() {
    assert_eq!(analyze(&Expr::string("hi")), Ok(ResultType::STRING));
    assert_eq!(analyze(&Expr::boolean(false)), Ok(ResultType::BOOLEAN));
    assert_eq!(analyze(&Expr::complex(1.0, -1.0)), Ok(ResultType::COMPLEX));
    assert_eq!(analyze(&Expr::angle(90.0, AngleUnit::Degree)), Ok(ResultType::ANGLE));
    assert_eq!(analyze(&Expr::delegate("ans")), Ok(ResultType::UNDEFINED));
    assert_eq!(analyze(&Expr::call("f", [num(1.0)])), Ok(ResultType::UNDEFINED));
}

#[test]
fn test_undefined_absorption_by_family() {
    let x = || Expr::var("x");
    let y = || Expr::var("y");

    assert_eq!(analyze(&binary(BinaryKind::Add, x(), y())), Ok(ResultType::UNDEFINED));
    assert_eq!(analyze(&binary(BinaryKind::And, x(), Expr::boolean(true))), Ok(ResultType::BOOLEAN));
    assert_eq!(analyze(&binary(BinaryKind::BitAnd, x(), num(1.0))), Ok(ResultType::UNDEFINED));
    assert_eq!(analyze(&binary(BinaryKind::Shl, x(), num(1.0))), Ok(ResultType::NUMBER));
    assert_eq!(analyze(&binary(BinaryKind::Lt, num(1.0), x())), Ok(ResultType::BOOLEAN));
}

#[test]
fn test_undefined_operand_short_circuits_arithmetic() {
    let x = || Expr::var("x");

    assert_eq!(analyze(&binary(BinaryKind::Add, x(), Expr::boolean(true))), Ok(ResultType::UNDEFINED));
    assert_eq!(analyze(&binary(BinaryKind::Mul, Expr::string("s"), x())), Ok(ResultType::UNDEFINED));
    assert_eq!(analyze(&binary(BinaryKind::Cross, x(), num(1.0))), Ok(ResultType::UNDEFINED));

    // Resolving families still check the known operand.
    let err = analyze(&binary(BinaryKind::Eq, x(), Expr::string("s"))).unwrap_err();
    assert_eq!(err.side(), Some(Operand::Right));
    assert_eq!(err.actual, ResultType::STRING);
}

#[test]
fn test_left_operand_blamed_first() {
    let err = analyze(&binary(BinaryKind::Sub, Expr::boolean(true), Expr::string("s"))).unwrap_err();
    assert_eq!(err.side(), Some(Operand::Left));
    assert_eq!(err.actual, ResultType::BOOLEAN);

    let err = analyze(&binary(BinaryKind::And, num(1.0), num(2.0))).unwrap_err();
    assert_eq!(err.side(), Some(Operand::Left));
}

#[test]
fn test_arithmetic_families() {
    let angle = || Expr::angle(1.0, AngleUnit::Radian);

    assert_eq!(analyze(&binary(BinaryKind::Add, num(1.0), angle())), Ok(ResultType::ANGLE));
    assert_eq!(analyze(&binary(BinaryKind::Sub, angle(), num(1.0))), Ok(ResultType::ANGLE));
    assert_eq!(
        analyze(&binary(BinaryKind::Add, num(1.0), Expr::complex(0.0, 1.0))),
        Ok(ResultType::COMPLEX)
    );
    assert_eq!(
        analyze(&binary(BinaryKind::Mul, num(2.0), matrix(&[&[1.0, 2.0], &[3.0, 4.0]]))),
        Ok(ResultType::MATRIX)
    );
    assert_eq!(
        analyze(&binary(BinaryKind::Mul, matrix(&[&[1.0]]), vector(&[1.0]))),
        Ok(ResultType::VECTOR)
    );

    let err = analyze(&binary(BinaryKind::Div, vector(&[1.0]), num(2.0))).unwrap_err();
    assert_eq!(err.side(), Some(Operand::Left));

    assert_eq!(analyze(&binary(BinaryKind::Pow, matrix(&[&[1.0]]), num(2.0))), Ok(ResultType::MATRIX));
    assert!(analyze(&binary(BinaryKind::Mod, num(1.0), angle())).is_err());
}

#[test]
fn test_division_with_angles() {
    let angle = || Expr::angle(90.0, AngleUnit::Degree);

    assert_eq!(analyze(&binary(BinaryKind::Div, angle(), angle())), Ok(ResultType::NUMBER));
    assert_eq!(analyze(&binary(BinaryKind::Div, angle(), num(2.0))), Ok(ResultType::ANGLE));

    // Both operands are admissible on their own; the pair is not.
    let err = analyze(&binary(BinaryKind::Div, num(1.0), angle())).unwrap_err();
    assert_eq!(err.side(), Some(Operand::Right));
    assert_eq!(err.expected, ResultType::ANGLE);
    assert_eq!(err.actual, ResultType::NUMBER);
}

#[test]
fn test_matrix_and_vector_ops() {
    let m = || matrix(&[&[1.0, 0.0], &[0.0, 1.0]]);

    assert_eq!(analyze(&Expr::unary(UnaryKind::Determinant, m())), Ok(ResultType::NUMBER));
    assert_eq!(analyze(&Expr::unary(UnaryKind::Transpose, m())), Ok(ResultType::MATRIX));
    assert!(analyze(&Expr::unary(UnaryKind::Inverse, num(1.0))).is_err());

    let v = || vector(&[1.0, 2.0, 3.0]);
    assert_eq!(analyze(&binary(BinaryKind::Dot, v(), v())), Ok(ResultType::NUMBER));
    assert_eq!(analyze(&binary(BinaryKind::Cross, v(), v())), Ok(ResultType::VECTOR));

    let err = analyze(&binary(BinaryKind::Dot, v(), num(1.0))).unwrap_err();
    assert_eq!(err.side(), Some(Operand::Right));

    let err = analyze(&variadic(VariadicKind::Matrix, vec![num(1.0)])).unwrap_err();
    assert_eq!(err.index(), Some(0));
    assert_eq!(err.expected, ResultType::VECTOR);
}

#[test]
fn test_unary_families() {
    let angle = || Expr::angle(30.0, AngleUnit::Degree);

    assert_eq!(analyze(&Expr::unary(UnaryKind::Floor, angle())), Ok(ResultType::ANGLE));
    assert_eq!(analyze(&Expr::unary(UnaryKind::Cos, angle())), Ok(ResultType::NUMBER));
    assert_eq!(analyze(&Expr::unary(UnaryKind::Arctan, num(1.0))), Ok(ResultType::ANGLE));
    assert_eq!(analyze(&Expr::unary(UnaryKind::Coth, angle())), Ok(ResultType::NUMBER));
    assert_eq!(analyze(&Expr::unary(UnaryKind::Csch, Expr::var("x"))), Ok(ResultType::UNDEFINED));
    assert_eq!(analyze(&Expr::unary(UnaryKind::Arcsch, num(1.0))), Ok(ResultType::ANGLE));
    assert_eq!(
        analyze(&Expr::unary(UnaryKind::Arcsec, Expr::boolean(true))).unwrap_err().expected,
        ResultType::NUMBER_OR_COMPLEX
    );
    assert_eq!(
        analyze(&Expr::unary(UnaryKind::Arcsin, Expr::complex(0.0, 1.0))),
        Ok(ResultType::COMPLEX)
    );
    assert_eq!(analyze(&Expr::unary(UnaryKind::ToRadian, num(1.0))), Ok(ResultType::ANGLE));
    assert_eq!(analyze(&Expr::unary(UnaryKind::Fact, Expr::var("n"))), Ok(ResultType::NUMBER));
    assert_eq!(analyze(&Expr::unary(UnaryKind::Abs, vector(&[3.0, 4.0]))), Ok(ResultType::NUMBER));
    assert_eq!(analyze(&Expr::unary(UnaryKind::Not, Expr::var("p"))), Ok(ResultType::BOOLEAN));

    let err = analyze(&Expr::unary(UnaryKind::Lb, Expr::string("x"))).unwrap_err();
    assert_eq!(err.position, None);
    assert_eq!(err.expected, ResultType::NUMBER);
}

#[test]
fn test_assignment_and_loops() {
    let define = binary(BinaryKind::Define, Expr::var("x"), num(2.0));
    assert_eq!(analyze(&define), Ok(ResultType::NUMBER));

    let err = analyze(&binary(BinaryKind::MulAssign, Expr::var("x"), Expr::boolean(true))).unwrap_err();
    assert_eq!(err.side(), Some(Operand::Right));

    let cond = binary(BinaryKind::Lt, Expr::var("i"), num(10.0));
    let step = binary(BinaryKind::AddAssign, Expr::var("i"), num(1.0));
    let for_loop = variadic(
        VariadicKind::For,
        vec![binary(BinaryKind::Define, Expr::var("i"), num(0.0)), cond.clone(), step, Expr::var("i")],
    );
    assert_eq!(analyze(&for_loop), Ok(ResultType::UNDEFINED));

    let while_loop = binary(BinaryKind::While, cond, Expr::var("i"));
    assert_eq!(analyze(&while_loop), Ok(ResultType::UNDEFINED));

    let err = analyze(&binary(BinaryKind::While, num(1.0), num(2.0))).unwrap_err();
    assert_eq!(err.side(), Some(Operand::Left));
    assert_eq!(err.expected, ResultType::BOOLEAN);
}

#[test]
fn test_first_error_in_left_to_right_order() {
    let left = Expr::unary(UnaryKind::Not, num(1.0));
    let right = Expr::unary(UnaryKind::Fact, Expr::boolean(true));
    let err = analyze(&binary(BinaryKind::Add, left, right)).unwrap_err();
    // Raised by `not`, not by `fact`.
    assert_eq!(err.expected, ResultType::BOOLEAN);
    assert_eq!(err.actual, ResultType::NUMBER);
}

#[test]
fn test_construction_rejects_wrong_arity() {
    use symath::{ConstructionError, NodeKind};

    let err = Expr::from_args(NodeKind::Binary(BinaryKind::Add), vec![num(1.0), num(2.0), num(3.0)])
        .unwrap_err();
    assert!(matches!(err, ConstructionError::Arity { found: 3, .. }));
}

#[test]
fn test_depth_cap() {
    let mut tree = Expr::var("x");
    for _ in 0..300 {
        tree = Expr::unary(UnaryKind::Neg, tree);
    }
    match TypeAnalyzer::new().check(&tree) {
        Err(AnalysisError::DepthExceeded { depth, limit }) => {
            assert_eq!(depth, 301);
            assert_eq!(limit, 256);
        }
        other => panic!("unexpected result {:?}", other),
    }
    assert_eq!(TypeAnalyzer::with_max_depth(512).check(&tree), Ok(ResultType::UNDEFINED));
}

#[test]
fn test_analyzer_is_shareable_across_threads() {
    let analyzer = TypeAnalyzer::new();
    let handles: Vec<_> = (0..4)
        .map(|i| {
            std::thread::spawn(move || {
                let tree = binary(BinaryKind::Mul, num(i as f64), vector(&[1.0, 2.0]));
                analyzer.check(&tree)
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), Ok(ResultType::VECTOR));
    }
}

fn category() -> impl Strategy<Value = ResultType> {
    prop_oneof![
        Just(ResultType::UNDEFINED),
        Just(ResultType::NUMBER),
        Just(ResultType::COMPLEX),
        Just(ResultType::BOOLEAN),
        Just(ResultType::VECTOR),
        Just(ResultType::MATRIX),
        Just(ResultType::ANGLE),
        Just(ResultType::STRING),
    ]
}

proptest! {
    #[test]
    fn prop_tabled_rules_blame_left_first(left in category(), right in category()) {
        for table in [&rules::ADD_SUB, &rules::MUL, &rules::DIV, &rules::COMPARISON, &rules::LOGICAL] {
            if table.undefined == UndefinedPolicy::Propagate
                && (left.is_undefined() || right.is_undefined())
            {
                prop_assert_eq!(rules::tabled(table, left, right), Ok(ResultType::UNDEFINED));
                continue;
            }
            let left_bad = !left.is_undefined() && !left.belongs_to(table.lefts());
            if let Err(err) = rules::tabled(table, left, right) {
                prop_assert_eq!(err.side() == Some(Operand::Left), left_bad);
            } else {
                prop_assert!(!left_bad);
            }
        }
    }

    #[test]
    fn prop_analysis_is_deterministic(values in prop::collection::vec(-1e6f64..1e6, 1..8), flag in any::<bool>()) {
        let args: Vec<Expr> = values.iter().copied().map(num).collect();
        let tree = binary(
            BinaryKind::Add,
            variadic(VariadicKind::Max, args.clone()),
            if flag { num(1.0) } else { Expr::boolean(true) },
        );
        prop_assert_eq!(analyze(&tree), analyze(&tree.clone()));
        prop_assert_eq!(analyze(&variadic(VariadicKind::Vector, args)), Ok(ResultType::VECTOR));
    }
}
