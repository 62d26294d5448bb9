use issue_expression_matching::{ExprError, ExpressionMatcher, IssueBuilder, Value};

// Every source here must fail the same way through both paths: a hard
// compile error from `compile()`, a soft fallback from `run(...)`.
fn assert_rejected(source: &str) {
    let matcher = ExpressionMatcher::new(source, Value::Bool(false));
    let first = matcher.compile().err();
    assert!(
        matches!(first, Some(ExprError::Compile(_))),
        "`{source}` should fail to compile, got {first:?}"
    );
    // Deterministic and repeatable.
    assert_eq!(matcher.compile().err(), first);

    let fresh = ExpressionMatcher::new(source, Value::Bool(false));
    assert_eq!(
        fresh.run(None, IssueBuilder::new(), 0, "f"),
        Value::Bool(false)
    );
}

#[test]
fn rejects_stray_tokens() {
    assert_rejected("0:0");
    assert_rejected("true true");
}

#[test]
fn rejects_empty_and_bare_return() {
    assert_rejected("");
    assert_rejected("return");
}

#[test]
fn rejects_unterminated_strings() {
    assert_rejected("return \"abc");
    assert_rejected("'half");
}

#[test]
fn rejects_dangling_operators_and_delimiters() {
    assert_rejected("1 +");
    assert_rejected("(1 + 2");
    assert_rejected("builder.");
    assert_rejected("contains(\"a\",");
}

#[test]
fn compile_error_messages_name_the_problem() {
    let matcher = ExpressionMatcher::new("0:0", Value::Null);
    let err = matcher.compile().unwrap_err();
    assert_eq!(err.to_string(), "compile error: trailing input");
}
