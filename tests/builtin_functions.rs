use issue_expression_matching as iem;
use issue_expression_matching::{
    ExpressionMatcher, Function, IssueBuilder, Registry, Value,
};

fn issue_with_message(message: &str) -> iem::Issue {
    IssueBuilder::new()
        .file_name("report.txt")
        .message(message)
        .build()
}

#[test]
fn case_mapping() {
    let issue = issue_with_message("OverFlow");
    assert!(iem::matches("lower(issue.message) == \"overflow\"", &issue));
    assert!(iem::matches("upper(issue.message) == \"OVERFLOW\"", &issue));
}

#[test]
fn substring_predicates() {
    let issue = issue_with_message("unused variable `tmp`");
    assert!(iem::matches("contains(issue.message, \"variable\")", &issue));
    assert!(iem::matches("starts_with(issue.message, \"unused\")", &issue));
    assert!(iem::matches("ends_with(file_name, \".txt\")", &issue));
}

#[test]
fn regex_matching() {
    let issue = issue_with_message("CWE-476: null dereference");
    assert!(iem::matches(r#"matches(issue.message, "CWE-\d+")"#, &issue));
    assert!(!iem::matches(r#"matches(issue.message, "^null")"#, &issue));
}

#[test]
fn invalid_regex_is_soft() {
    let issue = issue_with_message("anything");
    assert!(!iem::matches(r#"matches(issue.message, "(")"#, &issue));
}

#[test]
fn length_counts_characters() {
    let issue = issue_with_message("abcd");
    assert!(iem::matches("length(issue.message) == 4", &issue));
}

#[test]
fn fail_aborts_evaluation() {
    let issue = issue_with_message("anything");
    assert!(!iem::matches("fail(\"kill this rule\")", &issue));
    assert!(!iem::matches("fail()", &issue));
}

#[test]
fn unknown_function_is_soft() {
    let issue = issue_with_message("anything");
    assert!(!iem::matches("no_such_fn(1)", &issue));
}

#[test]
fn arity_mismatch_is_soft() {
    let issue = issue_with_message("anything");
    assert!(!iem::matches("contains(issue.message)", &issue));
}

#[test]
fn hosts_can_register_custom_functions() {
    struct Answer;
    impl Function for Answer {
        fn name(&self) -> &'static str {
            "answer"
        }
        fn arity(&self) -> std::ops::RangeInclusive<usize> {
            0..=0
        }
        fn call(&self, _args: &[Value]) -> iem::Result<Value> {
            Ok(Value::Int(42))
        }
    }

    let mut registry = Registry::with_builtins();
    registry.register(Answer);
    let matcher =
        ExpressionMatcher::new("answer() == 42", Value::Bool(false)).with_registry(registry);
    assert!(matcher.matches(None, IssueBuilder::new(), 0, "f"));
}
