//! Markup compiler adapter
//!
//! Front door to the deterministic compiler. Handles block environments by
//! compiling per cell, then normalizes the compiled tree: nested duplicate
//! rows are flattened, operator glyphs mistagged as identifiers are
//! reclassified, and text nodes leaking escaped command syntax are
//! replaced with explicit error markers.

use crate::ast::TreeNode;
use crate::compiler;
use crate::error::MendError;
use crate::lexicon;
use regex::Regex;
use std::sync::OnceLock;

/// Compiled and normalized tree plus what normalization had to scrub
#[derive(Debug, Clone)]
pub struct CompiledTree {
    pub root: TreeNode,
    /// escaped-command fragments removed from text nodes
    pub scrubbed: Vec<String>,
    /// cells that failed to compile and were replaced by placeholders
    pub placeholder_cells: Vec<String>,
}

fn environment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\\begin\{([A-Za-z]+\*?)\}(.*)\\end\{([A-Za-z]+\*?)\}").unwrap()
    })
}

/// Compile formula markup to a normalized semantic tree
///
/// Empty and structurally truncated input is rejected before the compiler
/// runs; compiler rejection propagates as `Compile`, never as a
/// best-effort tree.
pub fn compile(markup: &str) -> Result<CompiledTree, MendError> {
    let trimmed = markup.trim();
    if trimmed.is_empty() {
        return Err(MendError::Compile("empty input".to_string()));
    }
    precheck_balance(trimmed)?;

    let mut placeholder_cells = Vec::new();
    let root = match environment_re().captures(trimmed) {
        Some(caps) => compile_environment(trimmed, &caps, &mut placeholder_cells)?,
        None => compiler::parse(trimmed)?,
    };

    let mut scrubbed = Vec::new();
    let root = normalize(root, &mut scrubbed);
    Ok(CompiledTree {
        root,
        scrubbed,
        placeholder_cells,
    })
}

fn precheck_balance(text: &str) -> Result<(), MendError> {
    // escaped braces are literal glyphs, not grouping
    let countable = crate::structure::countable_copy(text);
    let count = |c: char| countable.chars().filter(|x| *x == c).count();
    if count('{') != count('}') {
        return Err(MendError::Compile("unbalanced braces".to_string()));
    }
    Ok(())
}

fn compile_environment(
    text: &str,
    caps: &regex::Captures,
    placeholder_cells: &mut Vec<String>,
) -> Result<TreeNode, MendError> {
    let open = &caps[1];
    let close = &caps[3];
    if open != close {
        return Err(MendError::Compile(format!(
            "mismatched environment: begin {} but end {}",
            open, close
        )));
    }
    let body = strip_column_spec(&caps[2]);

    let mut rows = Vec::new();
    for row_text in body.split("\\\\") {
        let mut cells = Vec::new();
        for cell_text in row_text.split('&') {
            let cell_text = cell_text.trim();
            if cell_text.is_empty() {
                cells.push(TreeNode::Row(Vec::new()));
                continue;
            }
            match compiler::parse(cell_text) {
                Ok(node) => cells.push(node),
                Err(err) => {
                    placeholder_cells.push(format!("{}: {}", cell_text, err));
                    // the marker text must not leak escaped command syntax
                    cells.push(TreeNode::Error(format!(
                        "could not compile cell: {}",
                        cell_text.replace('\\', "")
                    )));
                }
            }
        }
        if !cells.is_empty() {
            rows.push(cells);
        }
    }
    if rows.is_empty() {
        return Err(MendError::Compile("empty block environment".to_string()));
    }
    let table = TreeNode::Table(rows);

    // content around the environment joins it in one row
    let m = caps.get(0).map(|g| (g.start(), g.end())).unwrap_or((0, 0));
    let prefix = text[..m.0].trim();
    let suffix = text[m.1..].trim();
    let mut nodes = Vec::new();
    if !prefix.is_empty() {
        nodes.push(compiler::parse(prefix)?);
    }
    nodes.push(table);
    if !suffix.is_empty() {
        nodes.push(compiler::parse(suffix)?);
    }
    Ok(TreeNode::row(nodes))
}

// `array` bodies open with a column alignment group; it is layout, not
// content
fn strip_column_spec(body: &str) -> String {
    let trimmed = body.trim();
    if let Some(rest) = trimmed.strip_prefix('{') {
        if let Some((spec, tail)) = rest.split_once('}') {
            if !spec.is_empty() && spec.chars().all(|c| matches!(c, 'l' | 'c' | 'r' | '|')) {
                return tail.to_string();
            }
        }
    }
    trimmed.to_string()
}

fn normalize(node: TreeNode, scrubbed: &mut Vec<String>) -> TreeNode {
    match node {
        TreeNode::Row(children) => {
            let children: Vec<TreeNode> = children
                .into_iter()
                .map(|c| normalize(c, scrubbed))
                .collect();
            TreeNode::row(children)
        }
        TreeNode::Identifier(text) => {
            if lexicon::is_operator_glyph(&text) {
                TreeNode::Operator(text)
            } else {
                TreeNode::Identifier(text)
            }
        }
        TreeNode::Text(text) => {
            if crate::validator::contains_escaped_command(&text) {
                scrubbed.push(text.clone());
                // the marker keeps the name but drops the escape so no
                // command syntax survives into a text node
                TreeNode::Error(format!("unrecognized command: {}", text.replace('\\', "")))
            } else {
                TreeNode::Text(text)
            }
        }
        TreeNode::Frac(num, den) => TreeNode::Frac(
            Box::new(normalize(*num, scrubbed)),
            Box::new(normalize(*den, scrubbed)),
        ),
        TreeNode::Sqrt(inner) => TreeNode::Sqrt(Box::new(normalize(*inner, scrubbed))),
        TreeNode::Sub { base, sub } => TreeNode::Sub {
            base: Box::new(normalize(*base, scrubbed)),
            sub: Box::new(normalize(*sub, scrubbed)),
        },
        TreeNode::Sup { base, sup } => TreeNode::Sup {
            base: Box::new(normalize(*base, scrubbed)),
            sup: Box::new(normalize(*sup, scrubbed)),
        },
        TreeNode::SubSup { base, sub, sup } => TreeNode::SubSup {
            base: Box::new(normalize(*base, scrubbed)),
            sub: Box::new(normalize(*sub, scrubbed)),
            sup: Box::new(normalize(*sup, scrubbed)),
        },
        TreeNode::Table(rows) => TreeNode::Table(
            rows.into_iter()
                .map(|row| row.into_iter().map(|c| normalize(c, scrubbed)).collect())
                .collect(),
        ),
        leaf => leaf,
    }
}
