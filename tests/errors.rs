use teacup::{Definition, TeacupError};

fn err(src: &str) -> TeacupError {
    Definition::teacup().evaluate(src).unwrap_err()
}

#[test]
fn an_unclassifiable_character_is_a_lex_error() {
    assert!(matches!(err("1 ` 2"), TeacupError::Lex { .. }));
}

#[test]
fn a_missing_closing_keyword_is_a_syntax_error() {
    assert!(matches!(err("if true then 1"), TeacupError::UnexpectedToken { .. }));
}

#[test]
fn trailing_input_after_a_complete_expression_is_an_error() {
    assert!(matches!(err("1 + 2 3"), TeacupError::UnexpectedToken { .. }));
}

#[test]
fn referencing_an_unbound_name_is_a_reference_error() {
    assert!(matches!(err("undefined_name"), TeacupError::UndefinedVariable { .. }));
}

#[test]
fn adding_a_string_to_a_number_is_a_type_error() {
    assert!(matches!(err(r#"1 + "a""#), TeacupError::Type { .. }));
}

#[test]
fn indexing_a_number_is_a_type_error() {
    assert!(matches!(err("5[0]"), TeacupError::Type { .. }));
}

#[test]
fn calling_a_non_function_is_a_type_error() {
    assert!(matches!(err("let x = 1 in x(2) end"), TeacupError::Type { .. }));
}

#[test]
fn errors_carry_a_span_for_diagnostics() {
    match err("undefined_name") {
        TeacupError::UndefinedVariable { span, .. } => assert_eq!(span.start, 0),
        other => panic!("expected UndefinedVariable, got {:?}", other),
    }
}
