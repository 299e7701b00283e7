use teacup::{Definition, Value};

fn eval(src: &str) -> Value {
    Definition::teacup().evaluate(src).unwrap()
}

#[test]
fn later_bindings_see_earlier_siblings() {
    assert_eq!(eval("let x = 10, y = x + 1 in y * 2 end"), Value::Number(22.0));
}

#[test]
fn bindings_shadow_outer_names() {
    assert_eq!(eval("let x = 1 in let x = x + 1 in x end end"), Value::Number(2.0));
}

#[test]
fn function_bindings_are_recursive() {
    assert_eq!(
        eval("let fact(n) = if n == 0 then 1 else n * fact(n - 1) end in fact(5) end"),
        Value::Number(120.0)
    );
}

#[test]
fn a_let_binding_does_not_leak_into_the_surrounding_scope() {
    let mut def = Definition::teacup();
    def.evaluate("let x = 1 in x end").unwrap();
    assert!(def.evaluate("x").is_err());
}

#[test]
fn closures_capture_the_frame_they_were_defined_in() {
    // `f` closes over the `y = 1` binding; a later shadowing `let y = 99`
    // creates a new frame rather than mutating the captured one.
    assert_eq!(
        eval("let y = 1, f = (x -> x + y) in let y = 99 in f(0) end end"),
        Value::Number(1.0)
    );
}
