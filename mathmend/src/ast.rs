use serde::Serialize;

/// Byte range into the text a diagnostic refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Detected shape of raw input, fixed once classified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    FormulaMarkup,
    SemanticTree,
    PlainText,
    Empty,
}

/// One lexical unit of formula markup
///
/// Sequence order is significant and preserved through every repair stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Identifier(String),
    Operator(String),
    Number(String),
    Command(String),
    Word(String),
}

impl Token {
    /// Render the token back to formula markup
    pub fn to_markup(&self) -> String {
        match self {
            Token::Identifier(s) | Token::Operator(s) | Token::Number(s) => s.clone(),
            Token::Command(name) => format!("\\{}", name),
            Token::Word(w) => format!("\\mathrm{{{}}}", w),
        }
    }
}

/// A node of the compiled semantic tree
///
/// The shape mirrors presentation tree markup: `Row` is an ordered
/// sequence, leaf variants carry their text, and the layout variants carry
/// their fixed-arity children.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeNode {
    Row(Vec<TreeNode>),
    Identifier(String),
    Operator(String),
    Number(String),
    Text(String),
    Frac(Box<TreeNode>, Box<TreeNode>),
    Sqrt(Box<TreeNode>),
    Sub {
        base: Box<TreeNode>,
        sub: Box<TreeNode>,
    },
    Sup {
        base: Box<TreeNode>,
        sup: Box<TreeNode>,
    },
    SubSup {
        base: Box<TreeNode>,
        sub: Box<TreeNode>,
        sup: Box<TreeNode>,
    },
    Table(Vec<Vec<TreeNode>>),
    /// Explicit placeholder for content that could not be compiled
    Error(String),
}

impl TreeNode {
    /// Wrap a list of nodes in a row, flattening the trivial single-child case
    pub fn row(mut children: Vec<TreeNode>) -> TreeNode {
        if children.len() == 1 {
            children.remove(0)
        } else {
            TreeNode::Row(children)
        }
    }

    /// Depth-first walk over this node and all descendants
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a TreeNode)) {
        visit(self);
        match self {
            TreeNode::Row(children) => {
                for child in children {
                    child.walk(visit);
                }
            }
            TreeNode::Frac(num, den) => {
                num.walk(visit);
                den.walk(visit);
            }
            TreeNode::Sqrt(inner) => inner.walk(visit),
            TreeNode::Sub { base, sub } => {
                base.walk(visit);
                sub.walk(visit);
            }
            TreeNode::Sup { base, sup } => {
                base.walk(visit);
                sup.walk(visit);
            }
            TreeNode::SubSup { base, sub, sup } => {
                base.walk(visit);
                sub.walk(visit);
                sup.walk(visit);
            }
            TreeNode::Table(rows) => {
                for row in rows {
                    for cell in row {
                        cell.walk(visit);
                    }
                }
            }
            TreeNode::Identifier(_)
            | TreeNode::Operator(_)
            | TreeNode::Number(_)
            | TreeNode::Text(_)
            | TreeNode::Error(_) => {}
        }
    }

    /// Derive formula markup from the tree
    ///
    /// Inverse of compilation for the node shapes the compiler emits;
    /// glyphs fold back to their command spelling.
    pub fn to_markup(&self) -> String {
        match self {
            TreeNode::Row(children) => {
                let parts: Vec<String> = children.iter().map(|c| c.to_markup()).collect();
                parts.join(" ")
            }
            TreeNode::Identifier(s) | TreeNode::Operator(s) => {
                match crate::lexicon::glyph_command(s) {
                    Some(cmd) => format!("\\{}", cmd),
                    None => s.clone(),
                }
            }
            TreeNode::Number(s) => s.clone(),
            TreeNode::Text(s) => format!("\\text{{{}}}", s),
            TreeNode::Frac(num, den) => {
                format!("\\frac{{{}}}{{{}}}", num.to_markup(), den.to_markup())
            }
            TreeNode::Sqrt(inner) => format!("\\sqrt{{{}}}", inner.to_markup()),
            TreeNode::Sub { base, sub } => {
                format!("{}_{{{}}}", base.to_markup(), sub.to_markup())
            }
            TreeNode::Sup { base, sup } => {
                format!("{}^{{{}}}", base.to_markup(), sup.to_markup())
            }
            TreeNode::SubSup { base, sub, sup } => format!(
                "{}_{{{}}}^{{{}}}",
                base.to_markup(),
                sub.to_markup(),
                sup.to_markup()
            ),
            TreeNode::Table(rows) => {
                let body = rows
                    .iter()
                    .map(|row| {
                        row.iter()
                            .map(|c| c.to_markup())
                            .collect::<Vec<_>>()
                            .join(" & ")
                    })
                    .collect::<Vec<_>>()
                    .join(" \\\\ ");
                format!("\\begin{{matrix}} {} \\end{{matrix}}", body)
            }
            TreeNode::Error(_) => String::new(),
        }
    }

    /// Best-effort human-readable rendering of the tree
    ///
    /// Uses plain glyphs where they exist and parenthesized layout where
    /// they do not. Populated even for invalid results, so the output is
    /// readable but never authoritative.
    pub fn to_plain_text(&self) -> String {
        match self {
            TreeNode::Row(children) => {
                let parts: Vec<String> = children.iter().map(|c| c.to_plain_text()).collect();
                parts.join(" ")
            }
            TreeNode::Identifier(s) | TreeNode::Operator(s) | TreeNode::Number(s) => s.clone(),
            TreeNode::Text(s) => s.clone(),
            TreeNode::Frac(num, den) => {
                format!("({})/({})", num.to_plain_text(), den.to_plain_text())
            }
            TreeNode::Sqrt(inner) => format!("\u{221a}({})", inner.to_plain_text()),
            TreeNode::Sub { base, sub } => {
                format!("{}_{}", base.to_plain_text(), brace(&sub.to_plain_text()))
            }
            TreeNode::Sup { base, sup } => {
                format!("{}^{}", base.to_plain_text(), brace(&sup.to_plain_text()))
            }
            TreeNode::SubSup { base, sub, sup } => format!(
                "{}_{}^{}",
                base.to_plain_text(),
                brace(&sub.to_plain_text()),
                brace(&sup.to_plain_text())
            ),
            TreeNode::Table(rows) => {
                let lines: Vec<String> = rows
                    .iter()
                    .map(|row| {
                        let cells: Vec<String> = row.iter().map(|c| c.to_plain_text()).collect();
                        cells.join(" | ")
                    })
                    .collect();
                lines.join("; ")
            }
            TreeNode::Error(_) => "?".to_string(),
        }
    }
}

fn brace(text: &str) -> String {
    if text.chars().count() <= 1 {
        text.to_string()
    } else {
        format!("{{{}}}", text)
    }
}
