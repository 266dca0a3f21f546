//! End-to-end rendering across the built-in dialects

use proptest::prelude::*;
use sqlforge_dialect::{profiles, Dialect, Feature};
use sqlforge_ir::{CallNode, RexNode, SortKey, SqlType, TrimFlag, TypeName};
use sqlforge_registry::{ids, OperatorTable};

fn col(name: &str, ty: TypeName) -> RexNode {
    RexNode::input(0, name, SqlType::nullable(ty))
}

fn int_col(name: &str) -> RexNode {
    col(name, TypeName::Integer)
}

fn call(id: &str, operands: Vec<RexNode>) -> CallNode {
    CallNode::infer(OperatorTable::standard().require(id).unwrap(), operands).unwrap()
}

fn render(dialect: &Dialect, call: &CallNode) -> String {
    dialect.renderer().render_call(call, 0, 0)
}

#[test]
fn test_hive_limit_comma() {
    let hive = profiles::hive(2, 0);
    let r = hive.renderer();
    assert_eq!(
        r.emulate_limit_offset(Some(&RexNode::int(5)), Some(&RexNode::int(10))).as_deref(),
        Some("LIMIT 5, 10")
    );
    assert_eq!(r.emulate_limit_offset(None, Some(&RexNode::int(10))).as_deref(), Some("LIMIT 10"));
    assert_eq!(
        r.emulate_limit_offset(Some(&RexNode::int(5)), None).as_deref(),
        Some("LIMIT 5, 18446744073709551615")
    );
    assert_eq!(r.render_offset_fetch(None, Some(&RexNode::int(3))).as_deref(), Some("LIMIT 3"));
}

#[test]
fn test_subtraction_grouping() {
    let ansi = profiles::ansi();
    let (a, b, c) = (int_col("a"), int_col("b"), int_col("c"));

    let right_nested = call(ids::MINUS, vec![a.clone(), call(ids::MINUS, vec![b.clone(), c.clone()]).into()]);
    assert_eq!(render(&ansi, &right_nested), "a - (b - c)");

    let left_nested = call(ids::MINUS, vec![call(ids::MINUS, vec![a.clone(), b.clone()]).into(), c.clone()]);
    assert_eq!(render(&ansi, &left_nested), "a - b - c");

    let product_of_sum = call(ids::TIMES, vec![call(ids::PLUS, vec![a, b]).into(), c]);
    assert_eq!(render(&ansi, &product_of_sum), "(a + b) * c");
}

#[test]
fn test_hive_whitespace_trim() {
    let hive = profiles::hive(2, 0);
    let both = call(
        ids::TRIM,
        vec![RexNode::symbol(TrimFlag::Both), RexNode::string(" "), RexNode::string("x ")],
    );
    assert_eq!(render(&hive, &both), "TRIM('x ')");

    let s = col("s", TypeName::Varchar);
    let leading = call(ids::TRIM, vec![RexNode::symbol(TrimFlag::Leading), RexNode::string(" "), s.clone()]);
    assert_eq!(render(&hive, &leading), "LTRIM(s)");
    let trailing = call(ids::TRIM, vec![RexNode::symbol(TrimFlag::Trailing), RexNode::string("\t"), s]);
    assert_eq!(render(&hive, &trailing), "RTRIM(s)");
}

#[test]
fn test_hive_regexp_trim() {
    let hive = profiles::hive(2, 0);
    let s = col("s", TypeName::Varchar);

    let both = call(ids::TRIM, vec![RexNode::symbol(TrimFlag::Both), RexNode::string("a"), s.clone()]);
    assert_eq!(render(&hive, &both), "REGEXP_REPLACE(s, '^(a)*|(a)*$', '')");

    let leading = call(ids::TRIM, vec![RexNode::symbol(TrimFlag::Leading), RexNode::string("."), s]);
    assert_eq!(render(&hive, &leading), "REGEXP_REPLACE(s, '^(\\.)*', '')");
}

#[test]
fn test_trim_with_expression_chars_falls_back() {
    let hive = profiles::hive(2, 0);
    let trim = call(
        ids::TRIM,
        vec![RexNode::symbol(TrimFlag::Both), col("c", TypeName::Varchar), col("s", TypeName::Varchar)],
    );
    assert_eq!(render(&hive, &trim), "TRIM(BOTH c FROM s)");
}

#[test]
fn test_substring_forms() {
    let hive = profiles::hive(2, 0);
    let ansi = profiles::ansi();
    let s = col("s", TypeName::Varchar);

    let two = call(ids::SUBSTRING, vec![s.clone(), RexNode::int(2)]);
    let three = call(ids::SUBSTRING, vec![s, RexNode::int(2), RexNode::int(3)]);

    assert_eq!(render(&hive, &two), "SUBSTRING(s, 2)");
    assert_eq!(render(&hive, &three), "SUBSTRING(s, 2, 3)");
    assert_eq!(render(&ansi, &two), "SUBSTRING(s FROM 2)");
    assert_eq!(render(&ansi, &three), "SUBSTRING(s FROM 2 FOR 3)");
}

#[test]
fn test_pi_override() {
    let pi = call(ids::PI, vec![]);
    assert_eq!(render(&profiles::hive(3, 1), &pi), "PI()");
    assert_eq!(render(&profiles::ansi(), &pi), "PI");

    let doubled = call(ids::TIMES, vec![RexNode::int(2), pi.into()]);
    assert_eq!(render(&profiles::HIVE, &doubled), "2 * PI()");
}

#[test]
fn test_datetime_divide_prints_as_division() {
    let ansi = profiles::ansi();
    let a = col("a", TypeName::IntervalDayTime);
    let b = int_col("b");

    let dt = call(ids::DATETIME_DIVIDE, vec![a.clone(), b.clone()]);
    let plain = call(ids::DIVIDE, vec![a, b]);
    assert_eq!(render(&ansi, &dt), "a / b");
    assert_eq!(render(&ansi, &dt), render(&ansi, &plain));
    assert_eq!(dt.result_type().name, TypeName::BigInt);
}

#[test]
fn test_hive_null_ordering_by_version() {
    let x = int_col("x");
    let old = profiles::hive(2, 0);
    let new = profiles::hive(2, 1);

    assert!(old.emulate_null_ordering(&x, false, false).is_some());
    assert!(new.emulate_null_ordering(&x, false, false).is_none());
    assert!(new.has(Feature::NativeNullsOrdering));

    // Hive collates nulls low: ascending already puts them first.
    assert!(old.emulate_null_ordering(&x, true, false).is_none());
}

#[test]
fn test_order_by_rendering() {
    let x = int_col("x");
    let hive_old = profiles::hive(2, 0);
    let hive_new = profiles::hive(2, 1);
    let mysql = profiles::mysql(5, 7);

    let asc_nulls_last = [SortKey::asc(x.clone()).nulls_last()];
    assert_eq!(hive_old.renderer().render_order_by(&asc_nulls_last), "ORDER BY x IS NULL, x");
    assert_eq!(hive_new.renderer().render_order_by(&asc_nulls_last), "ORDER BY x NULLS LAST");
    assert_eq!(
        mysql.renderer().render_order_by(&asc_nulls_last),
        "ORDER BY CASE WHEN x IS NULL THEN 1 ELSE 0 END, x"
    );

    let desc_nulls_first = [SortKey::desc(x.clone()).nulls_first()];
    assert_eq!(
        hive_old.renderer().render_order_by(&desc_nulls_first),
        "ORDER BY x IS NULL DESC, x DESC"
    );

    let asc_nulls_first = [SortKey::asc(x).nulls_first()];
    assert_eq!(hive_old.renderer().render_order_by(&asc_nulls_first), "ORDER BY x");
    assert_eq!(hive_old.renderer().render_order_by(&[]), "");
}

#[test]
fn test_null_ordering_is_idempotent() {
    let hive = profiles::hive(2, 0);
    let keys = vec![
        SortKey::asc(int_col("x")).nulls_last(),
        SortKey::desc(int_col("y")).nulls_first(),
        SortKey::asc(int_col("z")),
    ];

    let once = hive.emulate_order_by(&keys);
    let twice = hive.emulate_order_by(&once);
    assert_eq!(once.len(), 5);
    assert_eq!(once, twice);

    let indicator = once[0].expr.clone();
    assert!(hive.emulate_null_ordering(&indicator, true, false).is_none());
    assert!(hive.emulate_null_ordering(&indicator, false, true).is_none());
}

#[test]
fn test_standard_profiles_are_shared() {
    for product in [
        sqlforge_dialect::DatabaseProduct::Ansi,
        sqlforge_dialect::DatabaseProduct::Hive,
        sqlforge_dialect::DatabaseProduct::BigQuery,
    ] {
        let a = Dialect::standard(product) as *const Dialect;
        let b = Dialect::standard(product) as *const Dialect;
        assert_eq!(a, b);
    }
}

/// Arithmetic over small integer literals.
#[derive(Debug, Clone)]
enum Arith {
    Lit(i64),
    Op(char, Box<Arith>, Box<Arith>),
}

fn arith() -> impl Strategy<Value = Arith> {
    let leaf = (0i64..10).prop_map(Arith::Lit);
    leaf.prop_recursive(5, 48, 2, |inner| {
        (prop_oneof![Just('+'), Just('-'), Just('*')], inner.clone(), inner)
            .prop_map(|(op, l, r)| Arith::Op(op, Box::new(l), Box::new(r)))
    })
}

fn apply(op: char, l: i64, r: i64) -> i64 {
    match op {
        '+' => l.wrapping_add(r),
        '-' => l.wrapping_sub(r),
        _ => l.wrapping_mul(r),
    }
}

fn eval(e: &Arith) -> i64 {
    match e {
        Arith::Lit(n) => *n,
        Arith::Op(op, l, r) => apply(*op, eval(l), eval(r)),
    }
}

fn to_rex(e: &Arith) -> RexNode {
    match e {
        Arith::Lit(n) => RexNode::int(*n),
        Arith::Op(op, l, r) => {
            let id = match op {
                '+' => ids::PLUS,
                '-' => ids::MINUS,
                _ => ids::TIMES,
            };
            call(id, vec![to_rex(l), to_rex(r)]).into()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Tok {
    Num(i64),
    Op(char),
    Open,
    Close,
}

fn tokenize(sql: &str) -> Vec<Tok> {
    let mut out = Vec::new();
    let mut chars = sql.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            ' ' => {}
            '(' => out.push(Tok::Open),
            ')' => out.push(Tok::Close),
            '+' | '-' | '*' => out.push(Tok::Op(c)),
            d if d.is_ascii_digit() => {
                let mut n = d.to_digit(10).unwrap() as i64;
                while let Some(next) = chars.peek().and_then(|c| c.to_digit(10)) {
                    n = n * 10 + next as i64;
                    chars.next();
                }
                out.push(Tok::Num(n));
            }
            other => panic!("unexpected character {other:?} in {sql}"),
        }
    }
    out
}

/// Standard SQL reading: `*` binds tighter than `+`/`-`, all left-associative.
fn parse(tokens: &[Tok], pos: &mut usize, min_bp: u8) -> i64 {
    let mut lhs = match tokens[*pos] {
        Tok::Num(n) => {
            *pos += 1;
            n
        }
        Tok::Open => {
            *pos += 1;
            let v = parse(tokens, pos, 0);
            assert_eq!(tokens[*pos], Tok::Close);
            *pos += 1;
            v
        }
        other => panic!("unexpected token {other:?}"),
    };
    while let Some(Tok::Op(op)) = tokens.get(*pos).copied() {
        let bp = if op == '*' { 2 } else { 1 };
        if bp <= min_bp {
            break;
        }
        *pos += 1;
        let rhs = parse(tokens, pos, bp);
        lhs = apply(op, lhs, rhs);
    }
    lhs
}

proptest! {
    #[test]
    fn test_rendering_preserves_grouping(e in arith()) {
        let sql = profiles::ANSI.renderer().render_rex(&to_rex(&e), 0, 0);
        let tokens = tokenize(&sql);
        let mut pos = 0;
        let value = parse(&tokens, &mut pos, 0);
        prop_assert_eq!(pos, tokens.len(), "trailing tokens in {}", sql);
        prop_assert_eq!(value, eval(&e), "{} misreads the tree", sql);
    }

    #[test]
    fn test_left_deep_chains_need_no_parens(lits in proptest::collection::vec(0i64..10, 2..8)) {
        let mut rex = RexNode::int(lits[0]);
        for n in &lits[1..] {
            rex = call(ids::MINUS, vec![rex, RexNode::int(*n)]).into();
        }
        let sql = profiles::ANSI.renderer().render_rex(&rex, 0, 0);
        prop_assert!(!sql.contains('('), "unexpected parens in {}", sql);
    }
}
