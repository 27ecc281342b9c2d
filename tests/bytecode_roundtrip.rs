/*
 * Persisted Bytecode Tests
 *
 * Compiled programs saved as text or binary must load back to the same
 * instructions and behave the same when run.
 */

#[macro_use]
mod cases;

use bumpalo::Bump;
use indoc::indoc;
use pila::{Code, DecodeError, Instruction, TypeTag, Value};
use pretty_assertions::assert_eq;

const PROGRAM: &str = indoc! {r#"
    int n; float avg; string name; bool shout;
    read name, n;
    do {
        avg = n / 3.0;
        shout = n > 2;
        write shout ? name . "!" : name, " ", avg;
        n = n - 1;
    } while (n > 0 && !(n == 1));
"#};

fn compile(source: &str) -> Code {
    let arena = Bump::new();
    pila::compile(&arena, source).unwrap_or_else(|e| panic!("compile failed: {e}"))
}

#[test]
fn text_round_trip_preserves_behavior() {
    let code = compile(PROGRAM);
    let text = code.to_text();
    let loaded = Code::from_text(&text).unwrap();

    assert_eq!(loaded, code);
    assert_eq!(loaded.to_text(), text);
    assert_eq!(
        cases::run_code(&loaded, "pila\n3\n").unwrap(),
        cases::run_code(&code, "pila\n3\n").unwrap(),
    );
}

#[test]
fn binary_round_trip_preserves_behavior() {
    let code = compile(PROGRAM);
    let loaded = Code::from_bytes(&code.to_bytes().unwrap()).unwrap();

    assert_eq!(loaded, code);
    assert_eq!(
        cases::run_code(&loaded, "pila\n3\n").unwrap(),
        "pila! 1\npila 0.6666666666666666\n"
    );
}

#[test]
fn hand_written_listing_runs() {
    let code = Code::from_text(indoc! {r#"
        push S "count "
        push I 3
        save n
        label 0
        load n
        push I 0
        gt
        fjmp 1
        load n
        print 1
        load n
        push I 1
        sub I
        save n
        jmp 0
        label 1
        print 1
    "#})
    .unwrap();
    assert_eq!(cases::run_code(&code, "").unwrap(), "3\n2\n1\ncount \n");
}

#[test]
fn listing_escapes_strings() {
    let code = compile(r#"write "say \"hi\"\n";"#);
    assert_eq!(code.to_text(), "push S \"say \\\"hi\\\"\\n\"\nprint 1\n");
    assert_eq!(
        code.instructions,
        vec![
            Instruction::Push(Value::String("say \"hi\"\n".into())),
            Instruction::Print(1),
        ]
    );
}

#[test]
fn float_operands_keep_full_precision() {
    let code = compile("float f; f = 0.1 * 3;");
    let loaded = Code::from_text(&code.to_text()).unwrap();
    assert!(loaded.instructions.contains(&Instruction::Push(Value::Float(0.1))));
    assert!(loaded.instructions.contains(&Instruction::Mul(TypeTag::Float)));
}

#[test]
fn bad_listing_reports_line() {
    let err = Code::from_text("push I 1\nprint 1\nfrobnicate\n").unwrap_err();
    assert!(matches!(err, DecodeError::Text { line: 3, .. }));
    assert_eq!(err.to_string(), "line 3: unknown mnemonic 'frobnicate'");
}
