//! Tree validation
//!
//! Walks a semantic tree enforcing the shape invariants every emitted
//! tree must satisfy. Used both by the corruption gate (on parsed tree
//! input) and after compilation (on our own compiler's output).

use crate::ast::{Span, TreeNode};
use crate::gate::{CorruptionReport, Violation};
use crate::lexicon;

/// Check a tree against the shape invariants
///
/// Forbidden shapes: free-text nodes carrying escaped command syntax,
/// operator characters tagged as identifiers, and runs of single-letter
/// identifier nodes that spell a command word (the tree-level signature
/// of a shredded word).
pub fn check_tree(root: &TreeNode) -> CorruptionReport {
    let mut report = CorruptionReport::new();
    walk(root, &mut report);
    report
}

fn walk(node: &TreeNode, report: &mut CorruptionReport) {
    match node {
        TreeNode::Text(text) => {
            if contains_escaped_command(text) {
                report.push(Violation::new("escaped-command-in-text", Span::new(0, 0)));
            }
        }
        TreeNode::Identifier(text) => {
            if lexicon::is_operator_glyph(text) {
                report.push(Violation::new("operator-as-identifier", Span::new(0, 0)));
            }
        }
        TreeNode::Row(children) => {
            check_identifier_runs(children, report);
            for child in children {
                walk(child, report);
            }
        }
        TreeNode::Frac(num, den) => {
            walk(num, report);
            walk(den, report);
        }
        TreeNode::Sqrt(inner) => walk(inner, report),
        TreeNode::Sub { base, sub } => {
            walk(base, report);
            walk(sub, report);
        }
        TreeNode::Sup { base, sup } => {
            walk(base, report);
            walk(sup, report);
        }
        TreeNode::SubSup { base, sub, sup } => {
            walk(base, report);
            walk(sub, report);
            walk(sup, report);
        }
        TreeNode::Table(rows) => {
            for row in rows {
                check_identifier_runs(row, report);
                for cell in row {
                    walk(cell, report);
                }
            }
        }
        TreeNode::Number(_) | TreeNode::Operator(_) | TreeNode::Error(_) => {}
    }
}

/// True when `text` holds a backslash followed by a command name
pub fn contains_escaped_command(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.iter().enumerate().any(|(i, b)| {
        *b == b'\\' && bytes.get(i + 1).is_some_and(|n| n.is_ascii_alphabetic())
    })
}

// A run of single-letter identifier siblings that spells a known command
// is a shredded word. Adjacent single letters are otherwise ordinary
// implicit products, so an unknown spelling needs a long, vowel-bearing
// run before it counts.
fn check_identifier_runs(children: &[TreeNode], report: &mut CorruptionReport) {
    let mut run = String::new();
    for child in children {
        match child {
            TreeNode::Identifier(text) if text.chars().count() == 1 => {
                run.push_str(text);
            }
            _ => {
                flag_run(&run, report);
                run.clear();
            }
        }
    }
    flag_run(&run, report);
}

fn flag_run(run: &str, report: &mut CorruptionReport) {
    let shredded_command = run.len() >= 3 && lexicon::lookup_command(run).is_some();
    let shredded_word = run.len() >= 5 && lexicon::has_vowel(run);
    if shredded_command || shredded_word {
        report.push(Violation::new("shredded-word", Span::new(0, run.len())));
    }
}
