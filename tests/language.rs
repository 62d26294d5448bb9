use issue_expression_matching as iem;
use issue_expression_matching::{ExpressionMatcher, IssueBuilder, Severity, Value};

fn sample_issue() -> iem::Issue {
    IssueBuilder::new()
        .file_name("src/lexer.c")
        .line_start(120)
        .category("style")
        .kind("UnusedVariable")
        .severity(Severity::High)
        .message("variable `tmp` is never read")
        .build()
}

#[test]
fn arithmetic_follows_precedence() {
    let issue = sample_issue();
    assert_eq!(iem::evaluate("1 + 2 * 3 == 7", &issue), Value::Bool(true));
    assert_eq!(iem::evaluate("(1 + 2) * 3 == 9", &issue), Value::Bool(true));
}

#[test]
fn string_concatenation_mixes_types() {
    let issue = sample_issue();
    assert!(iem::matches(
        "\"at line \" + line_number == \"at line 120\"",
        &issue
    ));
}

#[test]
fn predicates_over_issue_fields() {
    let issue = sample_issue();
    assert!(iem::matches("issue.severity == \"high\"", &issue));
    assert!(iem::matches("issue.line_start > 100 && issue.line_start <= 120", &issue));
    assert!(iem::matches("issue.kind != \"DeadCode\"", &issue));
    assert!(!iem::matches("issue.category == \"security\"", &issue));
}

#[test]
fn negation_and_grouping() {
    let issue = sample_issue();
    assert!(iem::matches("!(issue.line_start < 10)", &issue));
    assert!(iem::matches("!false", &issue));
}

#[test]
fn division_by_zero_is_soft() {
    let issue = sample_issue();
    // The one-shot helpers fall back to `false`.
    assert!(!iem::matches("1 / 0 == 1", &issue));
}

#[test]
fn ordering_unlike_types_is_soft() {
    let issue = sample_issue();
    assert!(!iem::matches("issue.message < 5", &issue));
}

#[test]
fn null_comparisons() {
    let issue = sample_issue();
    assert!(iem::matches("issue != null", &issue));

    let matcher = ExpressionMatcher::new("return issue == null", Value::Bool(false));
    assert_eq!(
        matcher.run(None, IssueBuilder::new(), 0, "f"),
        Value::Bool(true)
    );
}

#[test]
fn derived_issue_keeps_builder_defaults() {
    let matcher = ExpressionMatcher::new(
        "return builder.line_start(3).column_start(9).file_name(file_name).severity(\"error\").build()",
        Value::Bool(false),
    );
    let result = matcher.run(None, IssueBuilder::new(), 0, "gen.c");
    let Value::Issue(issue) = result else {
        panic!("expected an issue, got {result:?}");
    };
    assert_eq!(issue.line_end, 3);
    assert_eq!(issue.column_end, 9);
    assert_eq!(issue.severity, Severity::Error);
    assert_eq!(issue.file_name, "gen.c");
}

#[test]
fn derived_issue_from_the_current_one() {
    let issue = sample_issue();
    let matcher = ExpressionMatcher::new(
        "return builder.file_name(issue.file_name).line_start(issue.line_start + 1).message(\"shifted: \" + issue.message).build()",
        Value::Bool(false),
    );
    let result = matcher.run(Some(&issue), IssueBuilder::new(), 0, "ignored.c");
    let Value::Issue(derived) = result else {
        panic!("expected an issue, got {result:?}");
    };
    assert_eq!(derived.file_name, "src/lexer.c");
    assert_eq!(derived.line_start, 121);
    assert_eq!(derived.message, "shifted: variable `tmp` is never read");
}

#[test]
fn optional_return_and_semicolon() {
    let issue = sample_issue();
    assert_eq!(iem::evaluate("true", &issue), Value::Bool(true));
    assert_eq!(iem::evaluate("return true;", &issue), Value::Bool(true));
}

#[test]
fn truthiness_of_non_boolean_operands() {
    let issue = sample_issue();
    assert!(iem::matches("issue && true", &issue));
    assert!(iem::matches("\"text\" || false", &issue));
    assert!(!iem::matches("0 && true", &issue));
}
