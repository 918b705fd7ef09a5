use crate::ast::SourceKind;
use crate::cleaner::{classify, clean, collapse_whitespace};

#[test]
fn strips_zero_width_and_control_noise() {
    assert_eq!(clean("x\u{200b}y"), "xy", "zero-width space must vanish");
    assert_eq!(clean("a\u{feff}b"), "ab", "byte order mark must vanish");
    assert_eq!(clean("a\u{0007}b"), "ab", "control characters must vanish");
}

#[test]
fn irregular_whitespace_becomes_single_spaces() {
    assert_eq!(clean("a\u{00a0}b"), "a b");
    assert_eq!(clean("a\tb\nc"), "a b c");
    assert_eq!(clean("  a   b  "), "a b");
}

#[test]
fn lookalike_punctuation_is_normalized() {
    assert_eq!(clean("x \u{2212} y"), "x - y", "unicode minus becomes hyphen");
    assert_eq!(clean("f\u{2032}"), "f'", "prime mark becomes apostrophe");
}

#[test]
fn math_glyphs_fold_to_command_spelling() {
    assert_eq!(clean("x \u{2264} y"), "x \\le y");
    assert_eq!(clean("\u{2211} x"), "\\sum x");
    assert_eq!(clean("a \u{2026} b"), "a \\ldots b");
}

#[test]
fn accented_letters_fold_to_their_base() {
    assert_eq!(clean("caf\u{e9}"), "cafe");
    assert_eq!(clean("\u{d6}\u{fc}"), "Ou");
}

#[test]
fn noise_glyphs_and_math_delimiters_vanish() {
    assert_eq!(clean("x \u{2022} y"), "x y");
    assert_eq!(clean("$x+1$"), "x+1");
    assert_eq!(clean("\\(a\\) \\[b\\]"), "a b");
}

#[test]
fn row_spacing_survives_wrapper_stripping() {
    assert_eq!(clean("a \\\\[2pt] b"), "a \\\\[2pt] b");
    assert_eq!(clean("\\[x+y\\]"), "x+y");
}

#[test]
fn stuttered_operators_collapse() {
    assert_eq!(clean("a ++ b"), "a + b");
    assert_eq!(clean("a === b"), "a = b");
    assert_eq!(clean("x <= y"), "x <= y", "comparison digraphs are not stutter");
}

#[test]
fn spaces_inside_digit_runs_close_up() {
    assert_eq!(clean("1 234"), "1234");
    assert_eq!(clean("1 2 3"), "123");
    assert_eq!(clean("x 2"), "x 2", "a digit after a letter keeps its space");
}

#[test]
fn collapse_trims_and_merges() {
    assert_eq!(collapse_whitespace("  a  b "), "a b");
    assert_eq!(collapse_whitespace(""), "");
}

#[test]
fn empty_and_blank_input_classifies_as_empty() {
    assert_eq!(classify(""), SourceKind::Empty);
    assert_eq!(classify("   "), SourceKind::Empty);
}

#[test]
fn tag_input_classifies_as_semantic_tree() {
    assert_eq!(
        classify("<math><mi>x</mi></math>"),
        SourceKind::SemanticTree
    );
    assert_eq!(classify("<mrow><mn>1</mn></mrow>"), SourceKind::SemanticTree);
}

#[test]
fn command_and_script_syntax_classifies_as_formula() {
    assert_eq!(classify("\\frac{1}{2}"), SourceKind::FormulaMarkup);
    assert_eq!(classify("x_i"), SourceKind::FormulaMarkup);
    assert_eq!(classify("a = b + c"), SourceKind::FormulaMarkup);
}

#[test]
fn prose_classifies_as_plain_text() {
    assert_eq!(classify("see the appendix"), SourceKind::PlainText);
}
