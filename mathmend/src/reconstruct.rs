//! Token reconstruction
//!
//! Collapses shredded command fragments back into canonical tokens and
//! normalizes spelled-out operators. The same shred scanner backs the
//! corruption gate, so the gate flags exactly what reconstruction would
//! rewrite and nothing more.
//!
//! `reconstruct` is idempotent: every rewrite produces text none of the
//! rules match again, and the fixed-point loop stops at the first pass
//! that changes nothing.

use crate::config::PipelineConfig;
use crate::lexicon;
use regex::Regex;
use std::sync::OnceLock;

/// One shredded run the scanner resolved, with its replacement
#[derive(Debug, Clone, PartialEq)]
pub struct ShredMatch {
    pub start: usize,
    pub end: usize,
    pub replacement: String,
}

/// Before/after text per repair pass, append-only within one run
#[derive(Debug, Clone, PartialEq)]
pub struct RepairRecord {
    pub stage: String,
    pub before: String,
    pub after: String,
}

/// Outcome of the fixed-point reconstruction loop
#[derive(Debug, Clone)]
pub struct Reconstruction {
    pub text: String,
    pub passes: usize,
    pub converged: bool,
    pub records: Vec<RepairRecord>,
}

// A unit is one letter carrying one or more single-letter subscripts,
// optionally led by a stray backslash. A run is whitespace-separated units.
fn unit_run_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"\\?[A-Za-z](?:_\{?[A-Za-z]\}?)+(?: \\?[A-Za-z](?:_\{?[A-Za-z]\}?)+)*",
        )
        .unwrap()
    })
}

fn bare_letter_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^ ([A-Za-z])($|[ ,)\]}.])").unwrap())
}

/// Scan `text` for shredded command runs that reconstruction would rewrite
///
/// A run only qualifies when its collected letters resolve: an exact or
/// case-insensitive command lookup, or three or more fragments spelling a
/// vowel-bearing word. Single subscripted letters and ambiguous two-letter
/// candidates never qualify; they are legitimate notation.
pub fn find_shreds(text: &str, min_letters: usize) -> Vec<ShredMatch> {
    let mut matches = Vec::new();
    for m in unit_run_re().find_iter(text) {
        if !starts_cleanly(text, m.start()) {
            continue;
        }
        let units: Vec<&str> = m.as_str().split(' ').collect();
        let candidate: String = units.iter().map(|u| letters_of(u)).collect();

        // prefer the run as-is when it already spells a command
        if candidate.len() >= min_letters {
            if let Some(cmd) = lexicon::lookup_command(&candidate) {
                matches.push(ShredMatch {
                    start: m.start(),
                    end: m.end(),
                    replacement: format!("\\{}", cmd),
                });
                continue;
            }
        }

        // a trailing bare letter may complete the command (`s_u m`)
        if let Some(cap) = bare_letter_re().captures(&text[m.end()..]) {
            let extended = format!("{}{}", candidate, &cap[1]);
            if extended.len() >= min_letters {
                if let Some(cmd) = lexicon::lookup_command(&extended) {
                    let letter_end = m.end() + cap.get(1).map(|g| g.end()).unwrap_or(0);
                    matches.push(ShredMatch {
                        start: m.start(),
                        end: letter_end,
                        replacement: format!("\\{}", cmd),
                    });
                    continue;
                }
            }
        }

        // unknown words need more evidence before they are un-shredded
        if units.len() >= 3 && candidate.len() >= min_letters && lexicon::has_vowel(&candidate) {
            matches.push(ShredMatch {
                start: m.start(),
                end: m.end(),
                replacement: format!("\\mathrm{{{}}}", candidate),
            });
        }
    }
    matches
}

// The run must not start in the middle of a larger construct. A leading
// backslash is fine; a preceding letter, script marker or opening brace
// means we are inside one.
fn starts_cleanly(text: &str, start: usize) -> bool {
    if text[start..].starts_with('\\') {
        return true;
    }
    match text[..start].chars().next_back() {
        None => true,
        Some(prev) => {
            !prev.is_ascii_alphanumeric() && !matches!(prev, '\\' | '_' | '^' | '{')
        }
    }
}

fn letters_of(unit: &str) -> String {
    unit.chars().filter(|c| c.is_ascii_alphabetic()).collect()
}

struct RewriteRule {
    pattern: &'static str,
    replacement: &'static str,
}

// Ordered, each chosen so its output never matches any rule again.
const REWRITE_RULES: &[RewriteRule] = &[
    // ASCII digraphs for comparison operators
    RewriteRule {
        pattern: r"<=",
        replacement: r"\le ",
    },
    RewriteRule {
        pattern: r">=",
        replacement: r"\ge ",
    },
    RewriteRule {
        pattern: r"!=",
        replacement: r"\neq ",
    },
    RewriteRule {
        pattern: r"\.{3,}",
        replacement: r"\ldots ",
    },
    // operator names spelled without their backslash; `{` on the left
    // exempts command arguments like \mathrm{sum}
    RewriteRule {
        pattern: r"(^|[^\\{A-Za-z])(frac|sqrt|sum|prod|int|cdot|ldots|infty|times|leq|geq|neq|equiv)($|[^A-Za-z])",
        replacement: r"$1\$2$3",
    },
    // doubled script markers and scope openers left by stuttering recognizers
    RewriteRule {
        pattern: r"__+",
        replacement: r"_",
    },
    RewriteRule {
        pattern: r"\^\^+",
        replacement: r"^",
    },
    // a script marker with nothing to govern is noise
    RewriteRule {
        pattern: r"[_^]($|[,)\]}.])",
        replacement: r"$1",
    },
    // stuttered scripts nest a duplicate marker inside the braces
    RewriteRule {
        pattern: r"_\{_\{([^{}]*)\}\}",
        replacement: r"_{$1}",
    },
    RewriteRule {
        pattern: r"\^\{\^\{([^{}]*)\}\}",
        replacement: r"^{$1}",
    },
    // the word boundary keeps \leftarrow and \rightarrow out
    RewriteRule {
        pattern: r"\\left( *\\left)+\b",
        replacement: r"\left",
    },
    RewriteRule {
        pattern: r"\\right( *\\right)+\b",
        replacement: r"\right",
    },
    // brace bare single-character subscripts
    RewriteRule {
        pattern: r"_([A-Za-z0-9])",
        replacement: r"_{$1}",
    },
];

fn compiled_rules() -> &'static Vec<(Regex, &'static str)> {
    static RULES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    RULES.get_or_init(|| {
        REWRITE_RULES
            .iter()
            .map(|rule| {
                let re = Regex::new(rule.pattern).unwrap();
                (re, rule.replacement)
            })
            .collect()
    })
}

/// Run fixed-point reconstruction passes over `text`
///
/// Each pass collapses shredded runs first, then applies the ordered
/// rewrite rules. Passes repeat until a pass changes nothing or the
/// configured ceiling is reached; hitting the ceiling is reported through
/// `converged`, never silently accepted.
pub fn reconstruct(text: &str, config: &PipelineConfig) -> Reconstruction {
    let mut current = text.to_string();
    let mut records = Vec::new();
    let mut passes = 0;
    let mut converged = false;

    while passes < config.max_reconstruct_passes {
        passes += 1;
        let before = current.clone();
        current = reconstruct_pass(&current, config);
        if current == before {
            converged = true;
            passes -= 1;
            break;
        }
        records.push(RepairRecord {
            stage: format!("reconstruct pass {}", passes),
            before,
            after: current.clone(),
        });
    }
    if !converged {
        // one extra comparison decides whether the ceiling mattered
        converged = reconstruct_pass(&current, config) == current;
    }

    Reconstruction {
        text: current,
        passes,
        converged,
        records,
    }
}

fn reconstruct_pass(text: &str, config: &PipelineConfig) -> String {
    let mut out = text.to_string();

    let mut shreds = find_shreds(&out, config.min_shred_letters);
    shreds.sort_by_key(|s| s.start);
    for shred in shreds.iter().rev() {
        out.replace_range(shred.start..shred.end, &shred.replacement);
    }

    for (re, replacement) in compiled_rules() {
        // adjacent matches share boundary characters, so one sweep may
        // leave work behind; sweep until the rule is quiet
        loop {
            let next = re.replace_all(&out, *replacement).into_owned();
            if next == out {
                break;
            }
            out = next;
        }
    }

    crate::cleaner::collapse_whitespace(&out)
}
