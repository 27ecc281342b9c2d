use bumpalo::Bump;
use indoc::indoc;
use pretty_assertions::assert_eq;

use crate::ast::{BinaryOp, ExprKind, Literal, Program, StmtKind, UnaryOp};
use crate::parser::{MAX_NESTING_DEPTH, ParseErrorKind, parse, parse_with_max_depth};
use crate::types::Type;

fn parse_ok<'a>(arena: &'a Bump, source: &'a str) -> Program<'a> {
    parse(arena, source).unwrap_or_else(|e| panic!("Parsing failed: {}\n{}", source, e))
}

#[test]
fn test_empty_program() {
    let arena = Bump::new();
    assert!(parse_ok(&arena, "").statements.is_empty());
    assert!(parse_ok(&arena, "  // only a comment\n").statements.is_empty());
}

#[test]
fn test_declaration() {
    let arena = Bump::new();
    let program = parse_ok(&arena, "float a, b;");
    let StmtKind::Declaration { ty, names } = &program.statements[0].kind else {
        panic!("expected declaration");
    };
    assert_eq!(*ty, Type::Float);
    let names: Vec<_> = names.iter().map(|n| n.name).collect();
    assert_eq!(names, vec!["a", "b"]);
}

#[test]
fn test_statement_kinds() {
    let arena = Bump::new();
    let source = indoc! {r#"
        int i;
        read i;
        write i, "x";
        { ; }
        if (i > 0) i = 1; else i = 2;
        while (i < 3) i = i + 1;
        do i = i - 1; while (i > 0);
    "#};
    let program = parse_ok(&arena, source);
    let kinds: Vec<&str> = program
        .statements
        .iter()
        .map(|s| match s.kind {
            StmtKind::Empty => "empty",
            StmtKind::Declaration { .. } => "declaration",
            StmtKind::Expression(_) => "expression",
            StmtKind::Read(_) => "read",
            StmtKind::Write(_) => "write",
            StmtKind::Block(_) => "block",
            StmtKind::If { .. } => "if",
            StmtKind::While { .. } => "while",
            StmtKind::DoWhile { .. } => "do-while",
        })
        .collect();
    assert_eq!(
        kinds,
        vec!["declaration", "read", "write", "block", "if", "while", "do-while"]
    );

    let StmtKind::If { else_branch, .. } = &program.statements[4].kind else {
        panic!("expected if");
    };
    assert!(else_branch.is_some());
}

#[test]
fn test_dangling_else_binds_to_nearest_if() {
    let arena = Bump::new();
    let program = parse_ok(&arena, "if (a) if (b) x = 1; else x = 2;");
    let StmtKind::If {
        then_branch,
        else_branch,
        ..
    } = &program.statements[0].kind
    else {
        panic!("expected if");
    };
    assert!(else_branch.is_none());
    assert!(matches!(
        then_branch.kind,
        StmtKind::If {
            else_branch: Some(_),
            ..
        }
    ));
}

#[test]
fn test_literals() {
    let arena = Bump::new();
    let program = parse_ok(&arena, r#"write 7, 2.5, true, "a\tb\"c\\";"#);
    let StmtKind::Write(exprs) = &program.statements[0].kind else {
        panic!("expected write");
    };
    let literals: Vec<_> = exprs
        .iter()
        .map(|e| match &e.kind {
            ExprKind::Literal(lit) => lit.clone(),
            other => panic!("expected literal, got {other:?}"),
        })
        .collect();
    assert_eq!(
        literals,
        vec![
            Literal::Int(7),
            Literal::Float(2.5),
            Literal::Bool(true),
            Literal::Str("a\tb\"c\\"),
        ]
    );
}

#[test]
fn test_string_without_escapes_borrows_source() {
    let arena = Bump::new();
    let source = r#"write "plain";"#;
    let program = parse_ok(&arena, source);
    let StmtKind::Write(exprs) = &program.statements[0].kind else {
        panic!("expected write");
    };
    let ExprKind::Literal(Literal::Str(text)) = exprs[0].kind else {
        panic!("expected string");
    };
    assert_eq!(text, "plain");
    assert!(source.as_bytes().as_ptr_range().contains(&text.as_ptr()));
}

#[test]
fn test_expression_shapes() {
    let arena = Bump::new();
    let program = parse_ok(&arena, "x = -(a + 1) * b;");
    let StmtKind::Expression(expr) = &program.statements[0].kind else {
        panic!("expected expression statement");
    };
    let ExprKind::Assign { target, value } = &expr.kind else {
        panic!("expected assignment");
    };
    assert_eq!(target.name, "x");
    let ExprKind::Binary {
        op: BinaryOp::Mul,
        left,
        ..
    } = &value.kind
    else {
        panic!("expected multiplication");
    };
    let ExprKind::Unary {
        op: UnaryOp::Neg,
        expr: operand,
    } = &left.kind
    else {
        panic!("expected negation");
    };
    assert!(matches!(operand.kind, ExprKind::Grouping(_)));
}

#[test]
fn test_locations_are_one_based() {
    let arena = Bump::new();
    let source = "int a;\n  a = b + 1;";
    let program = parse_ok(&arena, source);

    let stmt = &program.statements[1];
    assert_eq!((stmt.loc.line, stmt.loc.column), (2, 3));

    let StmtKind::Expression(expr) = &stmt.kind else {
        panic!("expected expression statement");
    };
    let ExprKind::Assign { target, value } = &expr.kind else {
        panic!("expected assignment");
    };
    assert_eq!(target.loc.to_string(), "2:3");
    assert_eq!(value.loc.to_string(), "2:7");
    assert_eq!(value.loc.span.str_of(source), "b + 1");
}

#[test]
fn test_syntax_error_location() {
    let arena = Bump::new();
    let err = parse(&arena, "int x;\nx = ;").unwrap_err();
    assert_eq!((err.location.line, err.location.column), (2, 5));
    let ParseErrorKind::Syntax { found, .. } = &err.kind else {
        panic!("expected syntax error");
    };
    assert_eq!(found, "';'");
}

#[test]
fn test_syntax_error_at_end_of_input() {
    let arena = Bump::new();
    let err = parse(&arena, "write 1").unwrap_err();
    let ParseErrorKind::Syntax { found, .. } = &err.kind else {
        panic!("expected syntax error");
    };
    assert_eq!(found, "end of input");
}

#[test]
fn test_integer_out_of_range() {
    let arena = Bump::new();
    let err = parse(&arena, "x = 9223372036854775808;").unwrap_err();
    assert_eq!(
        err.kind,
        ParseErrorKind::InvalidNumber {
            text: "9223372036854775808".to_string()
        }
    );
    assert_eq!(err.location.to_string(), "1:5");
}

#[test]
fn test_float_out_of_range() {
    let arena = Bump::new();
    let source = format!("x = 1{}.0;", "0".repeat(400));
    let err = parse(&arena, &source).unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::InvalidNumber { .. }));
    assert_eq!(err.location.to_string(), "1:5");
}

#[test]
fn test_deep_brackets_rejected_before_parsing() {
    let arena = Bump::new();
    let source = format!("write {}1{};", "(".repeat(200), ")".repeat(200));
    let err = parse(&arena, &source).unwrap_err();
    assert_eq!(
        err.kind,
        ParseErrorKind::MaxDepthExceeded {
            depth: MAX_NESTING_DEPTH + 1,
            max_depth: MAX_NESTING_DEPTH,
        }
    );
    // The first bracket past the limit
    assert_eq!(err.location.to_string(), format!("1:{}", 7 + MAX_NESTING_DEPTH));
}

#[test]
fn test_moderate_nesting_accepted() {
    let arena = Bump::new();
    let source = format!("write {}1{};", "(-".repeat(10), ")".repeat(10));
    parse_ok(&arena, &source);
}

#[test]
fn test_max_depth_is_inclusive() {
    let arena = Bump::new();
    assert!(parse_with_max_depth(&arena, "write ((1));", 2).is_ok());

    let err = parse_with_max_depth(&arena, "write (((1)));", 2).unwrap_err();
    assert_eq!(
        err.kind,
        ParseErrorKind::MaxDepthExceeded {
            depth: 3,
            max_depth: 2
        }
    );
    assert_eq!(err.location.to_string(), "1:9");
}

#[test]
fn test_prefix_operator_runs_count_as_nesting() {
    let arena = Bump::new();
    assert!(parse_with_max_depth(&arena, "write !!true, a != b;", 2).is_ok());
    assert!(parse_with_max_depth(&arena, "write -(-1);", 3).is_ok());

    let err = parse_with_max_depth(&arena, "write !!!true;", 2).unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::MaxDepthExceeded { depth: 3, .. }));
    assert_eq!(err.location.to_string(), "1:9");

    let err = parse_with_max_depth(&arena, "write -(-(-1));", 4).unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::MaxDepthExceeded { depth: 5, .. }));
}

#[test]
fn test_brackets_in_strings_and_comments_ignored() {
    let arena = Bump::new();
    let source = r#"write "((((\"((" /* (((( */; // ((((("#;
    assert!(parse_with_max_depth(&arena, source, 1).is_ok());
}

#[test]
fn test_assignment_chain_depth() {
    let arena = Bump::new();
    assert!(parse_with_max_depth(&arena, "a = b = c = 1;", 3).is_ok());

    let err = parse_with_max_depth(&arena, "a = b = c = d = 1;", 3).unwrap_err();
    assert_eq!(
        err.kind,
        ParseErrorKind::MaxDepthExceeded {
            depth: 4,
            max_depth: 3
        }
    );
    assert_eq!(err.location.to_string(), "1:17");
}

#[test]
fn test_nested_statement_and_ternary_depth() {
    let arena = Bump::new();
    assert!(parse_with_max_depth(&arena, "if (a) if (b) ;", 2).is_ok());

    let err = parse_with_max_depth(&arena, "if (a) if (b) if (c) ;", 2).unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::MaxDepthExceeded { depth: 3, .. }));
    assert_eq!(err.location.to_string(), "1:22");

    let err = parse_with_max_depth(&arena, "write a ? b ? 1 : 2 : 3;", 1).unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::MaxDepthExceeded { depth: 2, .. }));
}
