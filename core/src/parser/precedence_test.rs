use crate::ast::{Expr, ExprKind, Literal, StmtKind};
use bumpalo::Bump;
use pretty_assertions::assert_eq;

use super::parser::parse;

// Renders an expression as a prefix S-expression, dropping parentheses.
//
// We test precedence by comparing whether two expressions parenthesized in
// different ways yield the same tree.
fn sexpr(expr: &Expr<'_>) -> String {
    match &expr.kind {
        ExprKind::Literal(Literal::Int(i)) => i.to_string(),
        ExprKind::Literal(Literal::Float(x)) => format!("{x:?}"),
        ExprKind::Literal(Literal::Bool(b)) => b.to_string(),
        ExprKind::Literal(Literal::Str(s)) => format!("{s:?}"),
        ExprKind::Ident(name) => name.to_string(),
        ExprKind::Grouping(inner) => sexpr(inner),
        ExprKind::Unary { op, expr } => format!("({op} {})", sexpr(expr)),
        ExprKind::Binary { op, left, right } => {
            format!("({op} {} {})", sexpr(left), sexpr(right))
        }
        ExprKind::Assign { target, value } => format!("(= {} {})", target.name, sexpr(value)),
        ExprKind::Ternary {
            cond,
            then_branch,
            else_branch,
        } => format!(
            "(? {} {} {})",
            sexpr(cond),
            sexpr(then_branch),
            sexpr(else_branch)
        ),
    }
}

fn ast(source: &str) -> String {
    let arena = Bump::new();
    let statement = format!("{source};");
    let program = parse(&arena, &statement)
        .unwrap_or_else(|e| panic!("Expression parsing failed: {}\n{}", source, e));
    match &program.statements[0].kind {
        StmtKind::Expression(expr) => sexpr(expr),
        other => panic!("expected expression statement, got {other:?}"),
    }
}

#[test]
fn test_addition_vs_subtraction() {
    assert_eq!(ast("a + b - c"), ast("(a + b) - c"));
    assert_eq!(ast("a - b + c"), ast("(a - b) + c"));
    assert_eq!(
        ast("a + b - c + d - e + f"),
        ast("((((a + b) - c) + d) - e) + f")
    );
}

#[test]
fn test_multiplication_vs_division() {
    assert_eq!(ast("a * b / c"), ast("(a * b) / c"));
    assert_eq!(ast("a / b % c"), ast("(a / b) % c"));
    assert_eq!(ast("a % b * c"), ast("(a % b) * c"));
}

#[test]
fn test_addition_vs_multiplication() {
    assert_eq!(ast("a + b * c"), "(+ a (* b c))");
    assert_eq!(ast("a * b + c"), "(+ (* a b) c)");
    assert_eq!(ast("a - b % c"), "(- a (% b c))");
}

#[test]
fn test_concat_shares_additive_level() {
    assert_eq!(ast("a . b + c"), ast("(a . b) + c"));
    assert_eq!(ast("a + b . c"), ast("(a + b) . c"));
    assert_eq!(ast("a . b * c"), ast("a . (b * c)"));
}

#[test]
fn test_comparison_vs_arithmetic() {
    assert_eq!(ast("a + 1 < b * 2"), "(< (+ a 1) (* b 2))");
    assert_eq!(ast("a < b == c > d"), ast("(a < b) == (c > d)"));
    assert_eq!(ast("a == b != c"), ast("(a == b) != c"));
}

#[test]
fn test_and_vs_or() {
    assert_eq!(
        ast("true && false || true"),
        ast("(true && false) || true")
    );
    assert_eq!(
        ast("true || false && true"),
        ast("true || (false && true)")
    );
    assert_eq!(ast("a == b && c"), ast("(a == b) && c"));
}

#[test]
fn test_unary_vs_binary() {
    assert_eq!(ast("-a + b"), "(+ (- a) b)");
    assert_eq!(ast("-a * b"), "(* (- a) b)");
    assert_eq!(ast("!a && b"), "(&& (! a) b)");
    assert_eq!(ast("a - -b"), "(- a (- b))");
    assert_eq!(ast("!!a"), "(! (! a))");
}

#[test]
fn test_ternary_is_lowest_and_right_associative() {
    assert_eq!(ast("a || b ? 1 + 2 : 3"), "(? (|| a b) (+ 1 2) 3)");
    assert_eq!(ast("a ? b : c ? d : e"), ast("a ? b : (c ? d : e)"));
}

#[test]
fn test_assignment_is_right_associative() {
    assert_eq!(ast("a = b = 3"), "(= a (= b 3))");
    assert_eq!(ast("a = b ? 1 : 2"), "(= a (? b 1 2))");
    assert_eq!(ast("a = b == c"), "(= a (== b c))");
}
