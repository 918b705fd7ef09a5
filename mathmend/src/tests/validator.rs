use crate::ast::TreeNode;
use crate::validator::{check_tree, contains_escaped_command};

fn id(s: &str) -> TreeNode {
    TreeNode::Identifier(s.to_string())
}

#[test]
fn escaped_command_inside_text_is_a_violation() {
    let tree = TreeNode::Text("\\frac{1}{2}".to_string());
    assert!(check_tree(&tree).contains("escaped-command-in-text"));
}

#[test]
fn plain_text_nodes_are_fine() {
    let tree = TreeNode::Text("where n is even".to_string());
    assert!(check_tree(&tree).is_clean());
}

#[test]
fn operator_glyph_as_identifier_is_a_violation() {
    assert!(check_tree(&id("=")).contains("operator-as-identifier"));
    assert!(check_tree(&id("x")).is_clean());
}

#[test]
fn identifier_run_spelling_a_command_is_shredded() {
    let tree = TreeNode::Row(vec![id("s"), id("u"), id("m")]);
    assert!(check_tree(&tree).contains("shredded-word"));
}

#[test]
fn short_products_of_identifiers_are_fine() {
    // abc is an ordinary product, not a shredded word
    let tree = TreeNode::Row(vec![id("a"), id("b"), id("c")]);
    assert!(check_tree(&tree).is_clean());
}

#[test]
fn long_vowel_bearing_runs_are_shredded() {
    let tree = TreeNode::Row(vec![id("h"), id("e"), id("l"), id("l"), id("o")]);
    assert!(check_tree(&tree).contains("shredded-word"));
}

#[test]
fn operators_break_identifier_runs() {
    let tree = TreeNode::Row(vec![
        id("s"),
        TreeNode::Operator("+".to_string()),
        id("u"),
        id("m"),
    ]);
    assert!(check_tree(&tree).is_clean());
}

#[test]
fn escaped_command_scan_matches_backslash_letter_only() {
    assert!(contains_escaped_command("\\sum"));
    assert!(!contains_escaped_command("a \\, b"), "escaped punctuation is not a command");
    assert!(!contains_escaped_command("plain words"));
}
