//! Lexical cleaning and source classification
//!
//! Strips recognizer noise before any pattern matching runs: stray control
//! and zero-width characters, typographic lookalikes, and irregular
//! whitespace. Unicode math glyphs are canonicalized to their command
//! spelling so the downstream rule tables only ever see one form.

use crate::ast::SourceKind;
use regex::Regex;
use std::sync::OnceLock;

/// Typographic lookalikes the recognizer emits for plain ASCII
const ASCII_LOOKALIKES: &[(char, &str)] = &[
    ('\u{2212}', "-"),
    ('\u{2013}', "-"),
    ('\u{2014}', "-"),
    ('\u{2018}', "'"),
    ('\u{2019}', "'"),
    ('\u{201c}', "\""),
    ('\u{201d}', "\""),
    ('\u{2032}', "'"),
    ('\u{2044}', "/"),
    ('\u{00b7}', "\\cdot "),
];

/// Accented letters folded to their base letter
const ACCENT_FOLDS: &[(char, char)] = &[
    ('\u{e1}', 'a'),
    ('\u{e0}', 'a'),
    ('\u{e2}', 'a'),
    ('\u{e4}', 'a'),
    ('\u{e5}', 'a'),
    ('\u{e9}', 'e'),
    ('\u{e8}', 'e'),
    ('\u{ea}', 'e'),
    ('\u{eb}', 'e'),
    ('\u{ed}', 'i'),
    ('\u{ec}', 'i'),
    ('\u{ee}', 'i'),
    ('\u{ef}', 'i'),
    ('\u{f3}', 'o'),
    ('\u{f2}', 'o'),
    ('\u{f4}', 'o'),
    ('\u{f6}', 'o'),
    ('\u{fa}', 'u'),
    ('\u{f9}', 'u'),
    ('\u{fb}', 'u'),
    ('\u{fc}', 'u'),
    ('\u{f1}', 'n'),
    ('\u{e7}', 'c'),
    ('\u{c9}', 'E'),
    ('\u{c1}', 'A'),
    ('\u{d6}', 'O'),
    ('\u{dc}', 'U'),
];

/// Glyphs the recognizer hallucinates that carry no mathematical content
const NOISE_GLYPHS: &str = "\u{a5}\u{20ac}\u{a2}\u{a9}\u{ae}\u{2122}\u{2022}\u{ab}\u{bb}\u{a6}";

/// Math glyphs canonicalized to their command spelling
const GLYPH_COMMANDS: &[(char, &str)] = &[
    ('\u{2264}', "\\le "),
    ('\u{2265}', "\\ge "),
    ('\u{2260}', "\\neq "),
    ('\u{2261}', "\\equiv "),
    ('\u{2248}', "\\approx "),
    ('\u{00b1}', "\\pm "),
    ('\u{00d7}', "\\times "),
    ('\u{22c5}', "\\cdot "),
    ('\u{221e}', "\\infty "),
    ('\u{2026}', "\\ldots "),
    ('\u{2192}', "\\to "),
    ('\u{2208}', "\\in "),
    ('\u{2211}', "\\sum "),
    ('\u{220f}', "\\prod "),
    ('\u{222b}', "\\int "),
    ('\u{221a}', "\\sqrt "),
];

/// Normalize raw recognizer output to canonical formula text
///
/// Applied to formula and plain-text input only; semantic tree input is
/// parsed as-is so its text nodes survive untouched.
pub fn clean(input: &str) -> String {
    // math delimiters are transport wrapping, not content; the guard
    // leaves row spacing like \\[2pt] alone
    let input = sweep(math_wrapper_re(), input, "$1");

    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        // zero-width and control noise vanishes entirely
        if matches!(c, '\u{200b}'..='\u{200d}' | '\u{feff}' | '\u{00ad}') {
            continue;
        }
        if c.is_control() && c != '\n' && c != '\t' {
            continue;
        }
        if c == '$' || NOISE_GLYPHS.contains(c) {
            continue;
        }
        if c == '\u{00a0}' || c == '\t' || c == '\n' {
            out.push(' ');
            continue;
        }
        if let Some((_, folded)) = ACCENT_FOLDS.iter().find(|(from, _)| *from == c) {
            out.push(*folded);
            continue;
        }
        if let Some((_, repl)) = ASCII_LOOKALIKES.iter().find(|(from, _)| *from == c) {
            out.push_str(repl);
            continue;
        }
        if let Some((_, repl)) = GLYPH_COMMANDS.iter().find(|(from, _)| *from == c) {
            out.push_str(repl);
            continue;
        }
        out.push(c);
    }

    let out = repeated_plus_re().replace_all(&out, "+").into_owned();
    let out = repeated_eq_re().replace_all(&out, "=").into_owned();
    let out = sweep(split_digits_re(), &out, "$1$2");
    collapse_whitespace(&out)
}

fn math_wrapper_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(^|[^\\])\\[()\[\]]").unwrap())
}

fn repeated_plus_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\+{2,}").unwrap())
}

fn repeated_eq_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"={2,}").unwrap())
}

fn split_digits_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d) (\d)").unwrap())
}

// adjacent matches share boundary characters, so a single replace_all
// can leave work behind
fn sweep(re: &Regex, text: &str, replacement: &str) -> String {
    let mut out = text.to_string();
    loop {
        let next = re.replace_all(&out, replacement).into_owned();
        if next == out {
            return out;
        }
        out = next;
    }
}

/// Collapse runs of spaces to one and trim the ends
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_space = true;
    for c in text.chars() {
        if c == ' ' {
            if !last_space {
                out.push(' ');
            }
            last_space = true;
        } else {
            out.push(c);
            last_space = false;
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Decide what shape of input we were handed
///
/// Tag-like input with known tree element names is a semantic tree; text
/// with command or script syntax is formula markup; everything else left
/// over is plain prose.
pub fn classify(input: &str) -> SourceKind {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return SourceKind::Empty;
    }
    if trimmed.starts_with('<') && looks_like_tree(trimmed) {
        return SourceKind::SemanticTree;
    }
    if looks_like_formula(trimmed) {
        return SourceKind::FormulaMarkup;
    }
    SourceKind::PlainText
}

fn looks_like_tree(text: &str) -> bool {
    const TREE_TAGS: &[&str] = &[
        "<math", "<mrow", "<mi", "<mo", "<mn", "<mtext", "<mfrac", "<msub", "<msup", "<msqrt",
        "<mtable", "<mstyle", "<semantics",
    ];
    TREE_TAGS.iter().any(|tag| text.contains(tag))
}

fn looks_like_formula(text: &str) -> bool {
    // a backslash followed by a letter is command syntax
    let bytes = text.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b == b'\\' && bytes.get(i + 1).is_some_and(|n| n.is_ascii_alphabetic()) {
            return true;
        }
    }
    if text.contains('_') || text.contains('^') || text.contains('{') || text.contains('}') {
        return true;
    }
    // bare arithmetic still counts when an operator joins two operands
    let has_operator = text
        .chars()
        .any(|c| matches!(c, '=' | '+' | '<' | '>' | '/') );
    let has_operand = text.chars().any(|c| c.is_ascii_alphanumeric());
    has_operator && has_operand
}
