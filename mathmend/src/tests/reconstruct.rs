use crate::config::PipelineConfig;
use crate::reconstruct::{find_shreds, reconstruct};

fn config() -> PipelineConfig {
    PipelineConfig::default()
}

#[test]
fn interleaved_fragments_collapse_to_a_command() {
    let out = reconstruct("f_r a_c 1 n", &config());
    assert_eq!(out.text, "\\frac 1 n");
    assert!(out.converged);
    assert_eq!(out.passes, 1);
}

#[test]
fn trailing_bare_letter_completes_the_command() {
    let out = reconstruct("e_q u_i v s_u m", &config());
    assert_eq!(out.text, "\\equiv \\sum");
}

#[test]
fn chained_subscripts_resolve_in_place() {
    let out = reconstruct("s_u_m t=0", &config());
    assert_eq!(out.text, "\\sum t=0");
}

#[test]
fn stray_backslash_on_a_fragment_is_absorbed() {
    let out = reconstruct("\\l_e f_t", &config());
    assert_eq!(out.text, "\\left");
}

#[test]
fn ambiguous_two_letter_runs_stay_notation() {
    // p with subscript i must never become the constant pi
    let out = reconstruct("p_i", &config());
    assert!(!out.text.contains("\\pi"), "got {}", out.text);
    assert_eq!(out.text, "p_{i}", "the subscript is braced, nothing more");
}

#[test]
fn digraph_operators_are_rewritten() {
    assert_eq!(reconstruct("x <= y", &config()).text, "x \\le y");
    assert_eq!(reconstruct("a != b", &config()).text, "a \\neq b");
    assert_eq!(reconstruct("x ... y", &config()).text, "x \\ldots y");
}

#[test]
fn spelled_operator_words_gain_their_backslash() {
    assert_eq!(reconstruct("frac 1 2", &config()).text, "\\frac 1 2");
    let out = reconstruct("a cdot b", &config());
    assert_eq!(out.text, "a \\cdot b");
}

#[test]
fn stuttered_script_markers_collapse() {
    assert_eq!(reconstruct("a__b", &config()).text, "a_{b}");
    assert_eq!(reconstruct("x^^2", &config()).text, "x^2");
}

#[test]
fn dangling_script_markers_are_dropped() {
    assert_eq!(reconstruct("x_, y", &config()).text, "x, y");
    assert_eq!(reconstruct("x^", &config()).text, "x");
}

#[test]
fn nested_duplicate_scripts_flatten() {
    assert_eq!(reconstruct("x_{_{t=0}}", &config()).text, "x_{t=0}");
    assert_eq!(reconstruct("x^{^{2}}", &config()).text, "x^{2}");
}

#[test]
fn spelled_big_operators_gain_their_backslash() {
    assert_eq!(reconstruct("the sum x", &config()).text, "the \\sum x");
    assert_eq!(reconstruct("int f dx", &config()).text, "\\int f dx");
}

#[test]
fn upright_command_arguments_keep_their_letters() {
    let out = reconstruct("\\mathrm{sum}", &config());
    assert_eq!(out.text, "\\mathrm{sum}", "text content is not an operator");
    assert_eq!(out.passes, 0);
}

#[test]
fn arrow_commands_survive_doubled_scope_collapse() {
    let out = reconstruct("\\leftarrow \\leftarrow", &config());
    assert_eq!(out.text, "\\leftarrow \\leftarrow");
    assert_eq!(out.passes, 0);
}

#[test]
fn already_canonical_markup_converges_immediately() {
    let out = reconstruct("\\frac{1}{n} \\le P", &config());
    assert_eq!(out.text, "\\frac{1}{n} \\le P");
    assert_eq!(out.passes, 0);
    assert!(out.converged);
}

#[test]
fn repair_records_carry_before_and_after() {
    let out = reconstruct("f_r a_c 1 n", &config());
    assert_eq!(out.records.len(), 1);
    assert_eq!(out.records[0].before, "f_r a_c 1 n");
    assert_eq!(out.records[0].after, "\\frac 1 n");
}

#[test]
fn shred_scanner_skips_runs_inside_larger_constructs() {
    // the run sits after an opening brace, so it belongs to a group
    assert!(find_shreds("{f_r a_c}", 3).is_empty());
    // a chained subscript spelling nothing stays put
    assert!(find_shreds("x_f_r", 3).is_empty());
}

#[test]
fn shred_scanner_reports_exact_spans() {
    let shreds = find_shreds("see f_r a_c here", 3);
    assert_eq!(shreds.len(), 1);
    assert_eq!(&"see f_r a_c here"[shreds[0].start..shreds[0].end], "f_r a_c");
    assert_eq!(shreds[0].replacement, "\\frac");
}

#[test]
fn unknown_long_fragments_become_roman_words() {
    let out = reconstruct("w_h e_r e_a s", &config());
    assert!(
        out.text.starts_with("\\mathrm{"),
        "three or more vowel-bearing fragments wrap as a word: {}",
        out.text
    );
}
