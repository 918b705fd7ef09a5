use crate::ast::TreeNode;
use crate::mathml::{extract_payload, parse, render};

fn id(s: &str) -> TreeNode {
    TreeNode::Identifier(s.to_string())
}

fn op(s: &str) -> TreeNode {
    TreeNode::Operator(s.to_string())
}

fn num(s: &str) -> TreeNode {
    TreeNode::Number(s.to_string())
}

#[test]
fn renders_with_namespace_and_display_on_the_root_only() {
    let tree = TreeNode::Row(vec![id("x"), op("+"), num("1")]);
    let markup = render(&tree);
    assert_eq!(
        markup,
        "<math xmlns=\"http://www.w3.org/1998/Math/MathML\" display=\"block\">\
         <mrow><mi>x</mi><mo>+</mo><mn>1</mn></mrow></math>"
    );
    assert_eq!(markup.matches("xmlns").count(), 1);
    assert_eq!(markup.matches("display=").count(), 1);
}

#[test]
fn leaf_text_is_escaped() {
    let markup = render(&op("<"));
    assert!(markup.contains("<mo>&lt;</mo>"), "got {}", markup);
}

#[test]
fn error_nodes_render_as_merror() {
    let markup = render(&TreeNode::Error("bad cell".to_string()));
    assert!(markup.contains("<merror><mtext>bad cell</mtext></merror>"));
}

#[test]
fn parse_inverts_render() {
    let tree = TreeNode::Row(vec![
        TreeNode::Frac(Box::new(num("1")), Box::new(id("n"))),
        op("+"),
        TreeNode::SubSup {
            base: Box::new(id("x")),
            sub: Box::new(id("i")),
            sup: Box::new(num("2")),
        },
    ]);
    let parsed = parse(&render(&tree)).unwrap();
    assert_eq!(parsed, tree);
}

#[test]
fn sibling_leaves_without_a_wrapper_become_a_row() {
    let parsed = parse("<math><mi>x</mi><mi>y</mi></math>").unwrap();
    assert_eq!(parsed, TreeNode::Row(vec![id("x"), id("y")]));
}

#[test]
fn bare_fragments_parse_without_a_math_wrapper() {
    let parsed = parse("<mi>x</mi>").unwrap();
    assert_eq!(parsed, id("x"));
}

#[test]
fn wrong_child_count_fails_closed() {
    assert!(parse("<math><mfrac><mn>1</mn></mfrac></math>").is_err());
    assert!(parse("<math><msub><mi>x</mi></msub></math>").is_err());
}

#[test]
fn unknown_tags_fail_closed() {
    assert!(parse("<blink>x</blink>").is_err());
}

#[test]
fn unclosed_elements_fail_closed() {
    assert!(parse("<math><mi>x</mi>").is_err());
}

#[test]
fn named_and_numeric_entities_decode() {
    let parsed = parse("<mo>&lt;</mo>").unwrap();
    assert_eq!(parsed, op("<"));
    let parsed = parse("<mo>&#x2264;</mo>").unwrap();
    assert_eq!(parsed, op("\u{2264}"));
    assert!(parse("<mo>&bogus;</mo>").is_err());
}

#[test]
fn namespace_prefixes_are_tolerated() {
    let parsed = parse("<m:math><m:mi>x</m:mi></m:math>").unwrap();
    assert_eq!(parsed, id("x"));
}

#[test]
fn tables_parse_rows_and_cells() {
    let parsed = parse(
        "<math><mtable><mtr><mtd><mn>1</mn></mtd><mtd><mn>2</mn></mtd></mtr>\
         <mtr><mtd><mn>3</mn></mtd><mtd><mn>4</mn></mtd></mtr></mtable></math>",
    )
    .unwrap();
    assert_eq!(
        parsed,
        TreeNode::Table(vec![
            vec![num("1"), num("2")],
            vec![num("3"), num("4")],
        ])
    );
}

#[test]
fn wrappers_flatten_to_rows() {
    let parsed = parse("<math><mstyle><mi>x</mi><mo>+</mo><mn>1</mn></mstyle></math>").unwrap();
    assert_eq!(parsed, TreeNode::Row(vec![id("x"), op("+"), num("1")]));
}

#[test]
fn comments_and_processing_instructions_are_skipped() {
    let parsed =
        parse("<?xml version=\"1.0\"?><!-- generated --><math><mi>x</mi></math>").unwrap();
    assert_eq!(parsed, id("x"));
}

#[test]
fn payload_extraction_strips_tags_and_decodes() {
    assert_eq!(
        extract_payload("<mi>x</mi><mo>&lt;</mo><mn>1</mn>"),
        "x < 1"
    );
    assert_eq!(extract_payload("<mtext>\\frac{1}{2}</mtext>"), "\\frac{1}{2}");
}
