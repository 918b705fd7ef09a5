//! Structural repair
//!
//! Rebuilds structure the recognizer flattened (fraction arguments, big
//! operator bounds, stretchy bracket pairs), balances delimiters when the
//! deficit is small enough to be truncation, classifies block
//! environments, and re-renders the result through the token layer so the
//! emitted markup is canonically spaced.

use crate::ast::Token;
use crate::config::PipelineConfig;
use crate::gate::{CorruptionReport, Violation};
use crate::ast::Span;
use crate::reconstruct::RepairRecord;
use regex::Regex;
use std::sync::OnceLock;

/// Result of structural repair over one formula
#[derive(Debug, Clone)]
pub struct StructureOutcome {
    pub markup: String,
    pub report: CorruptionReport,
    pub records: Vec<RepairRecord>,
}

struct RebuildRule {
    name: &'static str,
    pattern: &'static str,
    replacement: &'static str,
}

// Ordered; every rule's output fails its own pattern, so a single sweep
// per rule suffices.
const REBUILD_RULES: &[RebuildRule] = &[
    RebuildRule {
        name: "slash fraction",
        pattern: r"([A-Za-z0-9]+)/([A-Za-z0-9]+)",
        replacement: r"\frac{$1}{$2}",
    },
    RebuildRule {
        name: "fraction arguments",
        pattern: r"\\frac +([A-Za-z0-9]) +([A-Za-z0-9])($|[^A-Za-z0-9])",
        replacement: r"\frac{$1}{$2}$3",
    },
    RebuildRule {
        name: "big operator lower bound",
        pattern: r"\\(sum|prod|int) +([A-Za-z0-9]) *= *([A-Za-z0-9]+)",
        replacement: r"\${1}_{$2=$3}",
    },
    RebuildRule {
        name: "big operator upper bound",
        pattern: r"(\\(?:sum|prod|int)_\{[^}]*\}) +([A-Za-z0-9]+(?:[+-][A-Za-z0-9]+)*) +(\[|\(|\\left)",
        replacement: r"$1^{$2} $3",
    },
];

fn compiled_rebuild_rules() -> &'static Vec<(&'static str, Regex, &'static str)> {
    static RULES: OnceLock<Vec<(&'static str, Regex, &'static str)>> = OnceLock::new();
    RULES.get_or_init(|| {
        REBUILD_RULES
            .iter()
            .map(|rule| {
                (
                    rule.name,
                    Regex::new(rule.pattern).unwrap(),
                    rule.replacement,
                )
            })
            .collect()
    })
}

fn bracket_pair_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[([^\[\]]*)\]").unwrap())
}

// the word boundary keeps \leftarrow and \rightarrow out
fn scope_delim_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\\(left|right)\b *(\(|\)|\[|\]|\\\{|\\\}|\||\.)?").unwrap())
}

pub(crate) fn scope_word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\\(left|right)\b").unwrap())
}

fn escaped_delim_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\\\\|\\[{}\[\]()]").unwrap())
}

/// Copy of `text` with every delimiter dropped that never participates
/// in grouping: those bound to `\left`/`\right`, backslash-escaped
/// literals, and the `\\` row separator ahead of either.
pub(crate) fn countable_copy(text: &str) -> String {
    let stripped = scope_delim_re().replace_all(text, "");
    escaped_delim_re().replace_all(&stripped, "").into_owned()
}

fn env_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\\begin\{([A-Za-z]+\*?)\}(.*?)\\end\{([A-Za-z]+\*?)\}").unwrap()
    })
}

fn env_open_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\\begin\{([A-Za-z]+\*?)\}").unwrap())
}

/// Repair the structure of reconstructed formula text
pub fn repair(text: &str, config: &PipelineConfig) -> StructureOutcome {
    let mut report = CorruptionReport::new();
    let mut records = Vec::new();
    let mut current = text.to_string();

    for (name, re, replacement) in compiled_rebuild_rules() {
        let next = re.replace_all(&current, *replacement).into_owned();
        record_step(name, &mut current, next, &mut records);
    }

    let next = repair_environments(&current, config, &mut report);
    record_step("block environment", &mut current, next, &mut records);

    // pairing first, so the per-kind counters below see the closers the
    // pairer restores instead of inventing their own
    let next = pair_scope_delimiters(&current, config, &mut report);
    record_step("scope delimiter pairing", &mut current, next, &mut records);

    let next = balance_delimiters(&current, config, &mut report);
    record_step("delimiter balancing", &mut current, next, &mut records);

    let next = promote_brackets(&current);
    record_step("stretchy brackets", &mut current, next, &mut records);

    let rendered = render(&tokenize(&current));
    record_step("token rendering", &mut current, rendered, &mut records);

    StructureOutcome {
        markup: current,
        report,
        records,
    }
}

fn record_step(
    stage: &str,
    current: &mut String,
    next: String,
    records: &mut Vec<RepairRecord>,
) {
    if next != *current {
        records.push(RepairRecord {
            stage: stage.to_string(),
            before: current.clone(),
            after: next.clone(),
        });
        *current = next;
    }
}

// Single-row block content is a plain equation wearing a wrapper;
// multi-row content becomes a canonical matrix with labeled header and
// empty edge cells dropped.
fn repair_environments(
    text: &str,
    _config: &PipelineConfig,
    report: &mut CorruptionReport,
) -> String {
    let mut out = text.to_string();

    // a begin without its end is truncation; close it so the body survives
    if let Some(cap) = env_open_re().captures(&out) {
        let name = cap[1].to_string();
        if !out.contains(&format!("\\end{{{}}}", name)) {
            out.push_str(&format!(" \\end{{{}}}", name));
        }
    }

    while let Some(caps) = env_re().captures(&out) {
        let whole = caps.get(0).map(|g| (g.start(), g.end()));
        let Some((start, end)) = whole else { break };
        if caps[1] != caps[3] {
            report.push(Violation::new("unmatched-scope-delimiters", Span::new(start, end)));
            break;
        }
        let body = strip_column_spec(caps[2].trim());
        let replacement = if body.contains("\\\\") {
            let rows = parse_rows(&body);
            render_matrix(&rows)
        } else {
            body
        };
        out.replace_range(start..end, &replacement);
        // canonical matrices are not re-examined
        if replacement.starts_with("\\begin{matrix}") {
            break;
        }
    }
    out
}

fn strip_column_spec(body: &str) -> String {
    if let Some(rest) = body.strip_prefix('{') {
        if let Some((spec, tail)) = rest.split_once('}') {
            if !spec.is_empty() && spec.chars().all(|c| matches!(c, 'l' | 'c' | 'r' | '|')) {
                return tail.trim().to_string();
            }
        }
    }
    body.to_string()
}

fn parse_rows(body: &str) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = body
        .split("\\\\")
        .map(|row| {
            let mut cells: Vec<String> =
                row.split('&').map(|cell| cell.trim().to_string()).collect();
            while cells.first().is_some_and(|c| c.is_empty()) {
                cells.remove(0);
            }
            while cells.last().is_some_and(|c| c.is_empty()) {
                cells.pop();
            }
            cells
        })
        .filter(|cells| !cells.is_empty())
        .collect();

    // a lone label row ahead of real content is a caption, not data
    if rows.len() > 1 && rows[0].len() == 1 && is_label(&rows[0][0]) {
        rows.remove(0);
    }
    rows
}

fn is_label(cell: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"^\(?([ivxlcdmIVXLCDM]+|[A-Za-z]|[0-9]+)[).]?$").unwrap()
    });
    re.is_match(cell)
}

fn render_matrix(rows: &[Vec<String>]) -> String {
    let body = rows
        .iter()
        .map(|cells| cells.join(" & "))
        .collect::<Vec<_>>()
        .join(" \\\\ ");
    format!("\\begin{{matrix}} {} \\end{{matrix}}", body)
}

// Counts opens against closes per delimiter kind; small deficits at a
// string boundary are truncation and get repaired, anything larger is a
// violation to surface, not a guess to make.
fn balance_delimiters(
    text: &str,
    config: &PipelineConfig,
    report: &mut CorruptionReport,
) -> String {
    let mut out = text.to_string();
    for (open, close, violation) in [
        ('{', '}', "unbalanced-braces"),
        ('[', ']', "unbalanced-brackets"),
        ('(', ')', "unbalanced-brackets"),
    ] {
        let countable = countable_copy(&out);
        let opens = countable.chars().filter(|c| *c == open).count();
        let closes = countable.chars().filter(|c| *c == close).count();
        let deficit = opens.abs_diff(closes);
        if deficit == 0 {
            continue;
        }
        if deficit > config.max_balance_deficit {
            report.push(Violation::new(violation, Span::new(0, out.len())));
            continue;
        }
        if opens > closes {
            out.extend(std::iter::repeat(close).take(deficit));
        } else {
            let mut prefix: String = std::iter::repeat(open).take(deficit).collect();
            prefix.push_str(&out);
            out = prefix;
        }
    }
    out
}

// Plain bracket pairs become stretchy once the text has no scope
// delimiters of its own; the guard keeps the rewrite from ever running
// twice.
fn promote_brackets(text: &str) -> String {
    if scope_word_re().is_match(text) {
        return text.to_string();
    }
    bracket_pair_re()
        .replace_all(text, r"\left[$1\right]")
        .into_owned()
}

fn pair_scope_delimiters(
    text: &str,
    config: &PipelineConfig,
    report: &mut CorruptionReport,
) -> String {
    let mut stack: Vec<&str> = Vec::new();
    let mut unmatched_right = 0usize;
    for caps in scope_delim_re().captures_iter(text) {
        let which = &caps[1];
        let delim = caps.get(2).map(|g| g.as_str()).unwrap_or(".");
        if which == "left" {
            stack.push(delim);
        } else if stack.pop().is_none() {
            unmatched_right += 1;
        }
    }
    if stack.is_empty() && unmatched_right == 0 {
        return text.to_string();
    }
    if stack.len().max(unmatched_right) > config.max_balance_deficit {
        report.push(Violation::new(
            "unmatched-scope-delimiters",
            Span::new(0, text.len()),
        ));
        return text.to_string();
    }
    let mut out = text.to_string();
    for delim in stack.iter().rev() {
        out.push_str(" \\right");
        out.push_str(closer_for(delim));
    }
    for _ in 0..unmatched_right {
        out.insert_str(0, "\\left. ");
    }
    out
}

// Each opener has exactly one valid closer kind.
fn closer_for(opener: &str) -> &'static str {
    match opener {
        "(" => ")",
        "[" => "]",
        "\\{" => "\\}",
        "|" => "|",
        _ => ".",
    }
}

/// Split formula markup into its token sequence
///
/// Letters become single identifiers, digit runs numbers, commands keep
/// their name, and `\mathrm` wrapping a letter run collapses to one word
/// token. Whitespace is dropped; rendering reinserts it only where the
/// grammar requires separation.
pub fn tokenize(text: &str) -> Vec<Token> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        if c == '\\' {
            let mut j = i + 1;
            while j < chars.len() && chars[j].is_ascii_alphabetic() {
                j += 1;
            }
            if j > i + 1 {
                let name: String = chars[i + 1..j].iter().collect();
                i = j;
                if name == "mathrm" {
                    if let Some((word, next)) = braced_word(&chars, i) {
                        tokens.push(Token::Word(word));
                        i = next;
                        continue;
                    }
                }
                tokens.push(Token::Command(name));
            } else if j < chars.len() {
                // escaped single character, including the \\ row separator
                tokens.push(Token::Operator(format!("\\{}", chars[j])));
                i = j + 1;
            } else {
                tokens.push(Token::Operator("\\".to_string()));
                i = j;
            }
            continue;
        }
        if c.is_ascii_digit() {
            let mut j = i;
            while j < chars.len() && (chars[j].is_ascii_digit() || chars[j] == '.') {
                j += 1;
            }
            // a trailing dot is punctuation, not part of the number
            while j > i && chars[j - 1] == '.' {
                j -= 1;
            }
            tokens.push(Token::Number(chars[i..j].iter().collect()));
            i = j;
            continue;
        }
        if c.is_alphabetic() {
            tokens.push(Token::Identifier(c.to_string()));
            i += 1;
            continue;
        }
        tokens.push(Token::Operator(c.to_string()));
        i += 1;
    }
    tokens
}

fn braced_word(chars: &[char], at: usize) -> Option<(String, usize)> {
    if *chars.get(at)? != '{' {
        return None;
    }
    let mut j = at + 1;
    let mut word = String::new();
    while let Some(c) = chars.get(j) {
        if *c == '}' {
            return if word.is_empty() { None } else { Some((word, j + 1)) };
        }
        if !c.is_ascii_alphabetic() {
            return None;
        }
        word.push(*c);
        j += 1;
    }
    None
}

/// Render a token sequence back to canonically spaced markup
pub fn render(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut prev: Option<&Token> = None;
    for token in tokens {
        let piece = token.to_markup();
        if let Some(prev) = prev {
            if needs_space(prev, &piece) {
                out.push(' ');
            }
        }
        out.push_str(&piece);
        prev = Some(token);
    }
    out
}

// A command name would swallow a following letter, and two number tokens
// would fuse into one.
fn needs_space(prev: &Token, next_piece: &str) -> bool {
    let next_alnum = next_piece
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric());
    match prev {
        Token::Command(_) => next_alnum,
        Token::Number(_) => next_piece
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit()),
        _ => false,
    }
}
