use teacup::{Definition, Value};

fn eval(src: &str) -> Value {
    Definition::teacup().evaluate(src).unwrap()
}

#[test]
fn a_lambda_can_be_called_immediately() {
    assert_eq!(eval("(x -> x + 1)(41)"), Value::Number(42.0));
}

#[test]
fn a_lambda_closes_over_its_defining_environment() {
    assert_eq!(eval("let n = 10 in let add_n = (x -> x + n) in add_n(5) end end"), Value::Number(15.0));
}

#[test]
fn a_lambda_can_be_passed_as_a_value() {
    assert_eq!(
        eval("let apply_twice(f, x) = f(f(x)) in apply_twice(y -> y * 2, 3) end"),
        Value::Number(12.0)
    );
}

#[test]
fn multi_parameter_lambdas_take_a_comma_separated_list() {
    assert_eq!(eval("((a, b) -> a - b)(10, 4)"), Value::Number(6.0));
}

#[test]
fn calling_a_lambda_with_the_wrong_arity_is_a_type_error() {
    assert!(Definition::teacup().evaluate("(x -> x)(1, 2)").is_err());
}
