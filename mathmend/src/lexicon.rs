//! Static token and pattern library
//!
//! Maps letter sequences recovered from shredded fragments back to the
//! canonical command they spell, and classifies command names and glyphs
//! for the compiler and validator. All tables are read-only.

/// How a command renders in the semantic tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlyphClass {
    Operator,
    Identifier,
}

/// Canonical command words that shredded letter runs may spell
///
/// Lowercase except where the canonical command itself is cased (`Pr`).
/// Two-letter entries exist for completeness; the reconstructor's minimum
/// letter threshold keeps them from ever firing on shredded input.
const COMMAND_WORDS: &[&str] = &[
    "frac", "sqrt", "sum", "prod", "int", "left", "right", "cdot", "ldots", "dots", "times",
    "infty", "equiv", "approx", "neq", "leq", "geq", "le", "ge", "in", "notin", "subset",
    "subseteq", "cup", "cap", "mapsto", "partial", "nabla", "alpha", "beta", "gamma", "delta",
    "epsilon", "zeta", "eta", "theta", "iota", "kappa", "lambda", "mu", "nu", "xi", "pi", "rho",
    "sigma", "tau", "phi", "chi", "psi", "omega", "sin", "cos", "tan", "cot", "sec", "csc", "exp",
    "log", "ln", "lim", "min", "max", "det", "gcd", "mod", "Pr", "mathbb", "mathbf", "mathrm",
    "mathcal", "text",
];

/// Operator names that corrupt input spells out without a backslash
pub const SPELLED_OPERATOR_WORDS: &[&str] = &[
    "frac", "sqrt", "sum", "prod", "int", "cdot", "ldots", "infty", "times", "leq", "geq",
    "neq", "equiv",
];

/// Rendered glyph and node class per command, for the compiler back end
const COMMAND_GLYPHS: &[(&str, &str, GlyphClass)] = &[
    ("sum", "\u{2211}", GlyphClass::Operator),
    ("prod", "\u{220f}", GlyphClass::Operator),
    ("int", "\u{222b}", GlyphClass::Operator),
    ("cdot", "\u{22c5}", GlyphClass::Operator),
    ("ldots", "\u{2026}", GlyphClass::Operator),
    ("dots", "\u{2026}", GlyphClass::Operator),
    ("times", "\u{d7}", GlyphClass::Operator),
    ("pm", "\u{b1}", GlyphClass::Operator),
    ("le", "\u{2264}", GlyphClass::Operator),
    ("leq", "\u{2264}", GlyphClass::Operator),
    ("ge", "\u{2265}", GlyphClass::Operator),
    ("geq", "\u{2265}", GlyphClass::Operator),
    ("ne", "\u{2260}", GlyphClass::Operator),
    ("neq", "\u{2260}", GlyphClass::Operator),
    ("equiv", "\u{2261}", GlyphClass::Operator),
    ("approx", "\u{2248}", GlyphClass::Operator),
    ("in", "\u{2208}", GlyphClass::Operator),
    ("notin", "\u{2209}", GlyphClass::Operator),
    ("subset", "\u{2282}", GlyphClass::Operator),
    ("subseteq", "\u{2286}", GlyphClass::Operator),
    ("cup", "\u{222a}", GlyphClass::Operator),
    ("cap", "\u{2229}", GlyphClass::Operator),
    ("to", "\u{2192}", GlyphClass::Operator),
    ("rightarrow", "\u{2192}", GlyphClass::Operator),
    ("mapsto", "\u{21a6}", GlyphClass::Operator),
    ("partial", "\u{2202}", GlyphClass::Operator),
    ("nabla", "\u{2207}", GlyphClass::Operator),
    ("infty", "\u{221e}", GlyphClass::Identifier),
    ("alpha", "\u{3b1}", GlyphClass::Identifier),
    ("beta", "\u{3b2}", GlyphClass::Identifier),
    ("gamma", "\u{3b3}", GlyphClass::Identifier),
    ("delta", "\u{3b4}", GlyphClass::Identifier),
    ("epsilon", "\u{3b5}", GlyphClass::Identifier),
    ("zeta", "\u{3b6}", GlyphClass::Identifier),
    ("eta", "\u{3b7}", GlyphClass::Identifier),
    ("theta", "\u{3b8}", GlyphClass::Identifier),
    ("iota", "\u{3b9}", GlyphClass::Identifier),
    ("kappa", "\u{3ba}", GlyphClass::Identifier),
    ("lambda", "\u{3bb}", GlyphClass::Identifier),
    ("mu", "\u{3bc}", GlyphClass::Identifier),
    ("nu", "\u{3bd}", GlyphClass::Identifier),
    ("xi", "\u{3be}", GlyphClass::Identifier),
    ("pi", "\u{3c0}", GlyphClass::Identifier),
    ("rho", "\u{3c1}", GlyphClass::Identifier),
    ("sigma", "\u{3c3}", GlyphClass::Identifier),
    ("tau", "\u{3c4}", GlyphClass::Identifier),
    ("phi", "\u{3c6}", GlyphClass::Identifier),
    ("chi", "\u{3c7}", GlyphClass::Identifier),
    ("psi", "\u{3c8}", GlyphClass::Identifier),
    ("omega", "\u{3c9}", GlyphClass::Identifier),
    ("Gamma", "\u{393}", GlyphClass::Identifier),
    ("Delta", "\u{394}", GlyphClass::Identifier),
    ("Theta", "\u{398}", GlyphClass::Identifier),
    ("Lambda", "\u{39b}", GlyphClass::Identifier),
    ("Pi", "\u{3a0}", GlyphClass::Identifier),
    ("Sigma", "\u{3a3}", GlyphClass::Identifier),
    ("Phi", "\u{3a6}", GlyphClass::Identifier),
    ("Psi", "\u{3a8}", GlyphClass::Identifier),
    ("Omega", "\u{3a9}", GlyphClass::Identifier),
    ("sin", "sin", GlyphClass::Identifier),
    ("cos", "cos", GlyphClass::Identifier),
    ("tan", "tan", GlyphClass::Identifier),
    ("cot", "cot", GlyphClass::Identifier),
    ("sec", "sec", GlyphClass::Identifier),
    ("csc", "csc", GlyphClass::Identifier),
    ("exp", "exp", GlyphClass::Identifier),
    ("log", "log", GlyphClass::Identifier),
    ("ln", "ln", GlyphClass::Identifier),
    ("lim", "lim", GlyphClass::Identifier),
    ("min", "min", GlyphClass::Identifier),
    ("max", "max", GlyphClass::Identifier),
    ("det", "det", GlyphClass::Identifier),
    ("gcd", "gcd", GlyphClass::Identifier),
    ("Pr", "Pr", GlyphClass::Identifier),
];

/// Single characters that are operators, never identifiers
const OPERATOR_CHARS: &str = "+-*/=<>(),.![]|;:?&\u{2211}\u{220f}\u{222b}\u{22c5}\u{2026}\
\u{d7}\u{b1}\u{2264}\u{2265}\u{2260}\u{2261}\u{2248}\u{2208}\u{2209}\u{2282}\u{2286}\u{222a}\
\u{2229}\u{2192}\u{21a6}\u{2202}\u{2207}";

/// Resolve a candidate letter sequence to a canonical command name
///
/// Exact match first, then case-insensitive, matching how upstream
/// recognizers randomly capitalize fragments.
pub fn lookup_command(candidate: &str) -> Option<&'static str> {
    if let Some(name) = COMMAND_WORDS.iter().find(|w| **w == candidate) {
        return Some(name);
    }
    let lower = candidate.to_lowercase();
    COMMAND_WORDS.iter().find(|w| **w == lower).copied()
}

/// Rendered glyph and node class for a command, if one is known
pub fn command_glyph(name: &str) -> Option<(&'static str, GlyphClass)> {
    COMMAND_GLYPHS
        .iter()
        .find(|(cmd, _, _)| *cmd == name)
        .map(|(_, glyph, class)| (*glyph, *class))
}

/// Canonical command spelling for a rendered glyph, if one exists
///
/// First table entry wins, so `\le` is preferred over `\leq`.
pub fn glyph_command(glyph: &str) -> Option<&'static str> {
    COMMAND_GLYPHS
        .iter()
        .find(|(cmd, g, _)| *g == glyph && *g != *cmd)
        .map(|(cmd, _, _)| *cmd)
}

/// True when `text` is a single operator character or glyph
pub fn is_operator_glyph(text: &str) -> bool {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => OPERATOR_CHARS.contains(c),
        _ => false,
    }
}

/// True when `word` contains at least one vowel
///
/// Letter soup without a vowel is almost never an English command or word,
/// so vowel-free candidates are left alone.
pub fn has_vowel(word: &str) -> bool {
    word.chars()
        .any(|c| "aeiouyAEIOUY".contains(c))
}
