use teacup::{Definition, TeacupError};

#[test]
fn comments_run_to_end_of_line() {
    let def = Definition::teacup();
    assert_eq!(def.evaluate("1 + 2 # plus two\n").unwrap().to_string(), "3");
}

#[test]
fn string_escapes_are_unescaped() {
    let def = Definition::teacup();
    assert_eq!(def.evaluate(r#""a\nb""#).unwrap().to_string(), "a\nb");
}

#[test]
fn keywords_are_not_mistaken_for_identifier_prefixes() {
    let def = Definition::teacup();
    // `letter` must lex as one `word` token, not `let` + `ter`.
    assert!(matches!(
        def.evaluate("letter").unwrap_err(),
        TeacupError::UndefinedVariable { name, .. } if name == "letter"
    ));
}

#[test]
fn newlines_and_semicolons_sequence_expressions() {
    let def = Definition::teacup();
    assert_eq!(def.evaluate("1\n2\n3").unwrap().to_string(), "3");
    assert_eq!(def.evaluate("1; 2; 3").unwrap().to_string(), "3");
}

#[test]
fn an_empty_program_evaluates_to_unit() {
    let def = Definition::teacup();
    assert_eq!(def.evaluate("").unwrap().to_string(), "unit");
}
