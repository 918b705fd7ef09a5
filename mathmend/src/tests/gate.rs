use crate::ast::{Span, TreeNode};
use crate::config::PipelineConfig;
use crate::gate::{classify_text, classify_tree, CorruptionReport, Violation};

fn config() -> PipelineConfig {
    PipelineConfig::default()
}

#[test]
fn shredded_command_is_flagged() {
    let report = classify_text("f_r a_c 1 n", &config());
    assert!(
        report.contains("shredded-command"),
        "interleaved command fragments must be flagged: {:?}",
        report
    );
}

#[test]
fn legitimate_subscripts_are_not_flagged() {
    let report = classify_text("x_i", &config());
    assert!(
        report.is_clean(),
        "a lone subscripted identifier is valid notation: {:?}",
        report
    );
    let report = classify_text("x_i y_j", &config());
    assert!(
        report.is_clean(),
        "adjacent subscripted identifiers are valid notation: {:?}",
        report
    );
}

#[test]
fn spelled_operators_are_flagged() {
    let report = classify_text("x <= y", &config());
    assert!(report.contains("spelled-operator"));
    let report = classify_text("the frac of", &config());
    assert!(report.contains("spelled-operator"));
}

#[test]
fn backslash_prefixed_commands_are_not_spelled_operators() {
    let report = classify_text("\\frac{1}{2}", &config());
    assert!(report.is_clean(), "complete markup is clean: {:?}", report);
}

#[test]
fn unbalanced_delimiters_are_flagged() {
    assert!(classify_text("{x", &config()).contains("unbalanced-braces"));
    assert!(classify_text("(x", &config()).contains("unbalanced-brackets"));
    assert!(classify_text("\\left( x", &config()).contains("unmatched-scope-delimiters"));
}

#[test]
fn arrow_commands_are_not_scope_delimiters() {
    assert!(classify_text("x \\rightarrow y", &config()).is_clean());
    assert!(classify_text("f \\leftarrow g", &config()).is_clean());
}

#[test]
fn escaped_delimiters_do_not_count() {
    assert!(classify_text("\\{ x \\}", &config()).is_clean());
    assert!(classify_text("\\{ x", &config()).is_clean());
}

#[test]
fn upright_command_arguments_are_not_spelled_operators() {
    assert!(classify_text("\\mathrm{sum}", &config()).is_clean());
    assert!(classify_text("\\text{int}", &config()).is_clean());
}

#[test]
fn tree_violations_route_through_the_same_report() {
    let tree = TreeNode::Text("\\frac{1}{2}".to_string());
    assert!(classify_tree(&tree).contains("escaped-command-in-text"));

    let tree = TreeNode::Row(vec![
        TreeNode::Identifier("s".to_string()),
        TreeNode::Identifier("u".to_string()),
        TreeNode::Identifier("m".to_string()),
    ]);
    assert!(classify_tree(&tree).contains("shredded-word"));
}

#[test]
fn merge_drops_exact_duplicates() {
    let mut a = CorruptionReport::new();
    a.push(Violation::new("unbalanced-braces", Span::new(0, 4)));
    let mut b = CorruptionReport::new();
    b.push(Violation::new("unbalanced-braces", Span::new(0, 4)));
    b.push(Violation::new("unbalanced-braces", Span::new(2, 6)));
    a.merge(b);
    assert_eq!(a.len(), 2, "only the identical violation is dropped");
}

#[test]
fn report_serializes_as_a_bare_list() {
    let mut report = CorruptionReport::new();
    report.push(Violation::new("shredded-command", Span::new(0, 7)));
    let json = serde_json::to_string(&report).unwrap();
    assert!(
        json.starts_with('['),
        "the report is transparent over its violation list: {}",
        json
    );
    assert!(json.contains("\"shredded-command\""));
}
