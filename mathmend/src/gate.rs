//! Corruption gate
//!
//! Pattern-matching classifier run before any rewriting. The lexical pass
//! hunts known corruption signatures in raw text; the tree pass walks
//! parsed semantic trees for forbidden shapes. A clean verdict requires
//! both passes to find nothing; violations from either pass are unioned.

use crate::ast::{Span, TreeNode};
use crate::config::PipelineConfig;
use crate::reconstruct;
use crate::structure;
use crate::validator;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// One named violation with the span that triggered it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub name: String,
    pub span: Span,
}

impl Violation {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// Set of violations found in one input; empty means the gate passes
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CorruptionReport {
    violations: Vec<Violation>,
}

impl CorruptionReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Union with another report, dropping exact duplicates
    pub fn merge(&mut self, other: CorruptionReport) {
        for violation in other.violations {
            if !self.violations.contains(&violation) {
                self.violations.push(violation);
            }
        }
    }

    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.violations.iter().any(|v| v.name == name)
    }
}

fn spelled_word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // `{` on the left exempts command arguments like `\mathrm{sum}`
        let words = crate::lexicon::SPELLED_OPERATOR_WORDS.join("|");
        Regex::new(&format!(r"(^|[^\\{{A-Za-z])({})($|[^A-Za-z])", words)).unwrap()
    })
}

fn spelled_digraph_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<=|>=|!=|\.{3,}").unwrap())
}

/// Lexical pass over cleaned formula text
pub fn classify_text(text: &str, config: &PipelineConfig) -> CorruptionReport {
    let mut report = CorruptionReport::new();

    for shred in reconstruct::find_shreds(text, config.min_shred_letters) {
        report.push(Violation::new(
            "shredded-command",
            Span::new(shred.start, shred.end),
        ));
    }

    if let Some(cap) = spelled_word_re().captures(text) {
        if let Some(word) = cap.get(2) {
            report.push(Violation::new(
                "spelled-operator",
                Span::new(word.start(), word.end()),
            ));
        }
    }
    if let Some(m) = spelled_digraph_re().find(text) {
        report.push(Violation::new(
            "spelled-operator",
            Span::new(m.start(), m.end()),
        ));
    }

    check_counts(text, &mut report);
    report
}

fn check_counts(text: &str, report: &mut CorruptionReport) {
    let full = Span::new(0, text.len());
    // escaped literals and \left/\right-bound delimiters never group
    let countable = structure::countable_copy(text);
    let count = |c: char| countable.chars().filter(|x| *x == c).count();

    if count('{') != count('}') {
        report.push(Violation::new("unbalanced-braces", full));
    }
    if count('[') != count(']') || count('(') != count(')') {
        report.push(Violation::new("unbalanced-brackets", full));
    }
    let mut lefts = 0usize;
    let mut rights = 0usize;
    for caps in structure::scope_word_re().captures_iter(text) {
        if &caps[1] == "left" {
            lefts += 1;
        } else {
            rights += 1;
        }
    }
    if lefts != rights {
        report.push(Violation::new("unmatched-scope-delimiters", full));
    }
}

/// Tree pass over a parsed semantic tree
///
/// Delegates to the validator's invariant walk so the gate and the
/// post-compile validator can never disagree about what a forbidden
/// shape is.
pub fn classify_tree(root: &TreeNode) -> CorruptionReport {
    validator::check_tree(root)
}
