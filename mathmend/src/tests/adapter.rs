use crate::adapter::compile;
use crate::ast::TreeNode;

fn num(s: &str) -> TreeNode {
    TreeNode::Number(s.to_string())
}

#[test]
fn empty_and_truncated_markup_is_rejected() {
    assert!(compile("").is_err());
    assert!(compile("   ").is_err());
    assert!(compile("{x").is_err(), "unbalanced braces never reach the compiler");
}

#[test]
fn escaped_braces_pass_the_balance_precheck() {
    let out = compile("\\{ x").unwrap();
    assert_eq!(
        out.root,
        TreeNode::Row(vec![
            TreeNode::Operator("{".to_string()),
            TreeNode::Identifier("x".to_string()),
        ])
    );
}

#[test]
fn plain_markup_compiles_through() {
    let out = compile("x+1").unwrap();
    assert!(out.scrubbed.is_empty());
    assert!(out.placeholder_cells.is_empty());
    assert_eq!(
        out.root,
        TreeNode::Row(vec![
            TreeNode::Identifier("x".to_string()),
            TreeNode::Operator("+".to_string()),
            num("1"),
        ])
    );
}

#[test]
fn block_environments_compile_per_cell() {
    let out = compile("\\begin{matrix} 1 & 2 \\\\ 3 & 4 \\end{matrix}").unwrap();
    assert_eq!(
        out.root,
        TreeNode::Table(vec![vec![num("1"), num("2")], vec![num("3"), num("4")]])
    );
}

#[test]
fn uncompilable_cells_become_placeholders_without_losing_shape() {
    let out = compile("\\begin{matrix} 1 & # \\\\ 3 & 4 \\end{matrix}").unwrap();
    assert_eq!(out.placeholder_cells.len(), 1);
    let TreeNode::Table(rows) = &out.root else {
        panic!("expected a table");
    };
    assert_eq!(rows.len(), 2, "row count survives the bad cell");
    assert_eq!(rows[0].len(), 2, "cell count survives the bad cell");
    assert!(matches!(rows[0][1], TreeNode::Error(_)));
}

#[test]
fn mismatched_environment_names_are_rejected() {
    assert!(compile("\\begin{matrix} x \\end{array}").is_err());
}

#[test]
fn content_around_an_environment_joins_the_row() {
    let out = compile("A = \\begin{matrix} 1 & 2 \\end{matrix}").unwrap();
    let TreeNode::Row(children) = &out.root else {
        panic!("expected a row");
    };
    assert_eq!(children.len(), 2);
    assert!(matches!(children[1], TreeNode::Table(_)));
}

#[test]
fn leaked_commands_are_scrubbed_to_error_markers() {
    let out = compile("\\foo x").unwrap();
    assert_eq!(out.scrubbed, vec!["\\foo".to_string()]);
    let TreeNode::Row(children) = &out.root else {
        panic!("expected a row");
    };
    let TreeNode::Error(message) = &children[0] else {
        panic!("expected an error marker, got {:?}", children[0]);
    };
    assert!(
        !message.contains('\\'),
        "marker text must not carry escaped syntax: {}",
        message
    );
}

#[test]
fn operator_glyphs_mistagged_as_identifiers_are_reclassified() {
    // \mathrm{=} flattens to an identifier carrying an operator glyph
    let out = compile("\\mathrm{=}").unwrap();
    assert_eq!(out.root, TreeNode::Operator("=".to_string()));
}

#[test]
fn nested_rows_flatten() {
    let out = compile("{{x}}").unwrap();
    assert_eq!(out.root, TreeNode::Identifier("x".to_string()));
}
