/*
 * Type Error Reporting Tests
 *
 * Every semantic error in a program is reported, in source order, with the
 * line and column it was found at. One bad sub-expression yields exactly one
 * diagnostic however deeply it is nested.
 */

#[macro_use]
mod cases;

use indoc::indoc;

test_case! {
    name: assignment_float_to_int,
    input: "int y; y = 3.5;",
    errors: ["1:8 - Variable 'y' type is int, but the assigned value is float."],
}

test_case! {
    name: undeclared_variable,
    input: "write x + 1;",
    errors: ["1:7 - Variable 'x' was not declared."],
}

test_case! {
    name: redeclaration,
    input: "int a;\nstring a;\nint a;",
    errors: [
        "2:8 - Variable 'a' was already declared.",
        "3:5 - Variable 'a' was already declared.",
    ],
}

test_case! {
    name: numeric_operation_on_bool,
    input: "write true + false;",
    errors: ["1:7 - Operator '+' does not support type bool."],
}

test_case! {
    name: left_operand_reported_first,
    input: r#"write "a" * true;"#,
    errors: ["1:7 - Operator '*' does not support type string."],
}

test_case! {
    name: modulo_on_float,
    input: "write 1 % 2.0;",
    errors: ["1:7 - Operator '%' does not support type float."],
}

test_case! {
    name: concat_needs_strings,
    input: r#"write "n=" . 1;"#,
    errors: ["1:7 - Operator '.' does not support type int."],
}

test_case! {
    name: comparison_needs_numbers,
    input: r#"write "a" < "b";"#,
    errors: ["1:7 - Operator '<' does not support type string."],
}

test_case! {
    name: equality_of_different_kinds,
    input: r#"write true != "true";"#,
    errors: ["1:7 - Operator '!=' cannot be applied to bool and string."],
}

test_case! {
    name: logic_needs_bools,
    input: "write !(1 || true);",
    errors: ["1:9 - Operator '||' does not support type int."],
}

test_case! {
    name: negating_a_string,
    input: r#"write -"s";"#,
    errors: ["1:7 - Operator '-' does not support type string."],
}

test_case! {
    name: conditions_must_be_bool,
    input: indoc! {"
        int i;
        if (i) ;
        while (i + 1) ;
        do ; while (\"x\");
    "},
    errors: [
        "2:5 - Condition expression expected bool, got int.",
        "3:8 - Condition expression expected bool, got int.",
        "4:13 - Condition expression expected bool, got string.",
    ],
}

test_case! {
    name: ternary_branches_must_match,
    input: r#"write false ? 1 : true;"#,
    errors: ["1:7 - Ternary branches must have matching types, got int and bool."],
}

test_case! {
    name: read_into_undeclared,
    input: "int a; read a, b;",
    errors: ["1:16 - Variable 'b' was not declared."],
}

test_case! {
    name: one_error_per_bad_subexpression,
    input: "int x; x = ((y * 2) + 1 < 3) == true ? 1 : 2;",
    errors: ["1:14 - Variable 'y' was not declared."],
}

test_case! {
    name: errors_in_every_statement,
    input: indoc! {r#"
        int i; float f; string s;
        i = f;
        s = i;
        f = s . 1;
        write i, f, s;
    "#},
    errors: [
        "2:1 - Variable 'i' type is int, but the assigned value is float.",
        "3:1 - Variable 's' type is string, but the assigned value is int.",
        "4:5 - Operator '.' does not support type int.",
    ],
}
