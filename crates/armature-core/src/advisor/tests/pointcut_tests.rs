use crate::advisor::error::AdvisorError;
use crate::advisor::pointcut::{
    ExpressionPointcut, Pointcut, TruePointcut, TypePatternPointcut, glob_match,
};

#[test]
fn test_glob_match_basics() {
    assert!(glob_match("OrderService", "OrderService"));
    assert!(!glob_match("OrderService", "OrderServices"));
    assert!(glob_match("*", "anything::at::all"));
    assert!(glob_match("*Service", "OrderService"));
    assert!(glob_match("Order*", "OrderService"));
    assert!(glob_match("Order*Service", "OrderFulfillmentService"));
    assert!(glob_match("*Order*", "BackOrderQueue"));
    assert!(glob_match("**", "x"));
    assert!(glob_match("*", ""));
    assert!(!glob_match("Order*Service", "OrderRepository"));
    assert!(!glob_match("", "x"));
    assert!(glob_match("", ""));
}

#[test]
fn test_true_pointcut_matches_everything() {
    let pointcut = TruePointcut;
    assert!(pointcut.matches_type("Anything"));
    assert!(pointcut.matches_method("Anything", "any_method"));
    assert!(pointcut.expression().is_none());
}

#[test]
fn test_type_pattern_pointcut_matches_all_methods_of_matched_types() {
    let pointcut = TypePatternPointcut::new("*Service");
    assert_eq!(pointcut.pattern(), "*Service");
    assert!(pointcut.matches_type("OrderService"));
    assert!(!pointcut.matches_type("OrderRepository"));
    assert!(pointcut.matches_method("OrderService", "whatever"));
    assert!(!pointcut.matches_method("OrderRepository", "whatever"));
}

#[test]
fn test_expression_parse_with_args_suffix() {
    let pointcut =
        ExpressionPointcut::parse("execution(orders::OrderService::place_order(..))").unwrap();
    assert_eq!(pointcut.type_pattern(), "orders::OrderService");
    assert_eq!(pointcut.method_pattern(), "place_order");
    assert_eq!(
        pointcut.expression(),
        Some("execution(orders::OrderService::place_order(..))")
    );
    assert!(pointcut.matches_method("orders::OrderService", "place_order"));
    assert!(!pointcut.matches_method("orders::OrderService", "cancel_order"));
    assert!(!pointcut.matches_method("billing::Invoicer", "place_order"));
}

#[test]
fn test_expression_parse_with_wildcards() {
    let pointcut = ExpressionPointcut::parse("execution(*Service::find*)").unwrap();
    assert!(pointcut.matches_type("OrderService"));
    assert!(pointcut.matches_method("OrderService", "find_by_id"));
    assert!(pointcut.matches_method("UserService", "find_all"));
    assert!(!pointcut.matches_method("OrderService", "save"));
}

#[test]
fn test_expression_parse_trims_surrounding_whitespace() {
    let pointcut = ExpressionPointcut::parse("  execution(Svc::run)  ").unwrap();
    assert_eq!(pointcut.expression(), Some("execution(Svc::run)"));
}

#[test]
fn test_expression_parse_rejects_malformed_input() {
    for expression in [
        "Svc::run",
        "execution(Svc::run",
        "execution(no_separator)",
        "execution(::run)",
        "execution(Svc::)",
        "execution(Sv c::run)",
        "execution(Svc::ru n)",
        "execution(Svc::run-now)",
    ] {
        let err = ExpressionPointcut::parse(expression).unwrap_err();
        assert!(
            matches!(err, AdvisorError::MalformedExpression { .. }),
            "expected malformed expression for {expression:?}"
        );
    }
}
