//! Deterministic formula compiler
//!
//! Parses the formula markup subset into a semantic tree. The grammar
//! tokenizes commands generically; this module interprets command names,
//! consumes their arguments and maps known names to glyphs. Unknown
//! commands become text nodes carrying their escaped spelling, which the
//! adapter treats as leakage and scrubs.

use crate::ast::TreeNode;
use crate::error::MendError;
use crate::lexicon::{self, GlyphClass};
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "src/compiler/formula.pest"]
struct FormulaParser;

/// Compile formula markup into a semantic tree
///
/// Pure and deterministic; rejects empty input and anything outside the
/// grammar with a `Compile` error rather than guessing.
pub fn parse(markup: &str) -> Result<TreeNode, MendError> {
    let trimmed = markup.trim();
    if trimmed.is_empty() {
        return Err(MendError::Compile("empty input".to_string()));
    }
    let mut pairs = FormulaParser::parse(Rule::formula, trimmed)
        .map_err(|e| MendError::Compile(e.to_string()))?;
    let formula = pairs
        .next()
        .ok_or_else(|| MendError::Compile("no parse output".to_string()))?;
    let items: Vec<Pair<Rule>> = formula
        .into_inner()
        .filter(|p| p.as_rule() != Rule::EOI)
        .collect();
    let nodes = build_sequence(&items)?;
    if nodes.is_empty() {
        return Err(MendError::Compile("empty input".to_string()));
    }
    Ok(TreeNode::row(nodes))
}

fn build_sequence(items: &[Pair<Rule>]) -> Result<Vec<TreeNode>, MendError> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < items.len() {
        let (node, consumed) = build_item(items, i)?;
        if let Some(node) = node {
            out.push(node);
        }
        i += consumed;
    }
    Ok(out)
}

// Builds the item at `from`, consuming following siblings when the item
// is a command that takes arguments. Returns the node (None for spacing
// commands) and how many items were consumed.
fn build_item(
    items: &[Pair<Rule>],
    from: usize,
) -> Result<(Option<TreeNode>, usize), MendError> {
    let pair = &items[from];
    let mut inner = pair.clone().into_inner();
    let atom = inner
        .next()
        .ok_or_else(|| MendError::Compile("empty scripted item".to_string()))?;
    let scripts: Vec<Pair<Rule>> = inner.collect();

    let (base, consumed) = match atom.as_rule() {
        Rule::command => build_command(&atom, items, from)?,
        _ => (build_atom(&atom)?, 1),
    };
    let Some(base) = base else {
        return Ok((None, consumed));
    };
    Ok((Some(attach_scripts(base, &scripts)?), consumed))
}

// Atoms that are self-contained, also used for script arguments where
// sibling consumption is impossible.
fn build_atom(pair: &Pair<Rule>) -> Result<Option<TreeNode>, MendError> {
    match pair.as_rule() {
        Rule::group => {
            let items: Vec<Pair<Rule>> = pair.clone().into_inner().collect();
            Ok(Some(TreeNode::row(build_sequence(&items)?)))
        }
        Rule::row_sep => Err(MendError::Compile(
            "row separator outside a block environment".to_string(),
        )),
        Rule::number => Ok(Some(TreeNode::Number(pair.as_str().to_string()))),
        Rule::identifier => Ok(Some(TreeNode::Identifier(pair.as_str().to_string()))),
        Rule::operator => Ok(Some(TreeNode::Operator(pair.as_str().to_string()))),
        Rule::command => Ok(command_leaf(command_name(pair))),
        rule => Err(MendError::Compile(format!(
            "unexpected parse node {:?}",
            rule
        ))),
    }
}

fn command_name<'a>(pair: &'a Pair<Rule>) -> &'a str {
    &pair.as_str()[1..]
}

// Commands at item level may consume sibling arguments.
fn build_command(
    atom: &Pair<Rule>,
    items: &[Pair<Rule>],
    from: usize,
) -> Result<(Option<TreeNode>, usize), MendError> {
    let name = command_name(atom);
    match name {
        "frac" => {
            let (num, used_a) = argument(items, from + 1)?;
            let (den, used_b) = argument(items, from + 1 + used_a)?;
            Ok((
                Some(TreeNode::Frac(Box::new(num), Box::new(den))),
                1 + used_a + used_b,
            ))
        }
        "sqrt" => {
            let (inner, used) = argument(items, from + 1)?;
            Ok((Some(TreeNode::Sqrt(Box::new(inner))), 1 + used))
        }
        "mathrm" | "mathbf" | "mathbb" | "mathcal" | "operatorname" => {
            let (arg, used) = argument(items, from + 1)?;
            Ok((Some(TreeNode::Identifier(flatten_text(&arg))), 1 + used))
        }
        "text" => {
            let (arg, used) = argument(items, from + 1)?;
            Ok((Some(TreeNode::Text(flatten_text(&arg))), 1 + used))
        }
        "left" | "right" => {
            // the marker itself vanishes; the delimiter it qualifies stays,
            // scripts and all
            match items.get(from + 1) {
                Some(_) => {
                    let (node, used) = build_item(items, from + 1)?;
                    Ok((node, 1 + used))
                }
                None => Ok((Some(TreeNode::Text(format!("\\{}", name))), 1)),
            }
        }
        _ => Ok((command_leaf(name), 1)),
    }
}

fn command_leaf(name: &str) -> Option<TreeNode> {
    match name {
        "{" | "}" | "|" => Some(TreeNode::Operator(name.to_string())),
        "," | ";" => None,
        _ => match lexicon::command_glyph(name) {
            Some((glyph, GlyphClass::Operator)) => Some(TreeNode::Operator(glyph.to_string())),
            Some((glyph, GlyphClass::Identifier)) => {
                Some(TreeNode::Identifier(glyph.to_string()))
            }
            None => Some(TreeNode::Text(format!("\\{}", name))),
        },
    }
}

// A command argument is the next item; a missing argument is a compile
// error, not a guess.
fn argument(items: &[Pair<Rule>], at: usize) -> Result<(TreeNode, usize), MendError> {
    if at >= items.len() {
        return Err(MendError::Compile("missing command argument".to_string()));
    }
    let (node, consumed) = build_item(items, at)?;
    match node {
        Some(node) => Ok((node, consumed)),
        None => Err(MendError::Compile("missing command argument".to_string())),
    }
}

fn attach_scripts(base: TreeNode, scripts: &[Pair<Rule>]) -> Result<TreeNode, MendError> {
    let mut node = base;
    let mut i = 0;
    while i < scripts.len() {
        let script = &scripts[i];
        let arg = script_argument(script)?;
        let next_rule = scripts.get(i + 1).map(|s| s.as_rule());
        match (script.as_rule(), next_rule) {
            (Rule::subscript, Some(Rule::superscript)) => {
                let sup = script_argument(&scripts[i + 1])?;
                node = TreeNode::SubSup {
                    base: Box::new(node),
                    sub: Box::new(arg),
                    sup: Box::new(sup),
                };
                i += 2;
            }
            (Rule::subscript, _) => {
                node = TreeNode::Sub {
                    base: Box::new(node),
                    sub: Box::new(arg),
                };
                i += 1;
            }
            (Rule::superscript, _) => {
                node = TreeNode::Sup {
                    base: Box::new(node),
                    sup: Box::new(arg),
                };
                i += 1;
            }
            (rule, _) => {
                return Err(MendError::Compile(format!(
                    "unexpected script node {:?}",
                    rule
                )))
            }
        }
    }
    Ok(node)
}

fn script_argument(script: &Pair<Rule>) -> Result<TreeNode, MendError> {
    let atom = script
        .clone()
        .into_inner()
        .next()
        .ok_or_else(|| MendError::Compile("empty script".to_string()))?;
    match build_atom(&atom)? {
        Some(node) => Ok(node),
        None => Err(MendError::Compile("empty script".to_string())),
    }
}

// Grouped letters arrive as sibling leaves with their spacing already
// gone, so flattening concatenates them back into one word.
fn flatten_text(node: &TreeNode) -> String {
    match node {
        TreeNode::Row(children) => children.iter().map(flatten_text).collect(),
        TreeNode::Identifier(s) | TreeNode::Operator(s) | TreeNode::Number(s) => s.clone(),
        TreeNode::Text(s) => s.clone(),
        other => other.to_plain_text(),
    }
}
