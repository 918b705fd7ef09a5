//! Semantic tree markup
//!
//! Renders a `TreeNode` to presentation tree markup and parses incoming
//! tree markup back into nodes. The parser is deliberately conservative:
//! unknown tags, arity mismatches and undecodable entities are parse
//! errors, because a tree we cannot fully account for is exactly the kind
//! of input the gate must fail closed on.

use crate::ast::TreeNode;
use crate::error::MendError;

const NAMESPACE: &str = "http://www.w3.org/1998/Math/MathML";

/// Render a tree to markup with the namespace and display attributes
/// carried exactly once, on the root
pub fn render(root: &TreeNode) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "<math xmlns=\"{}\" display=\"block\">",
        NAMESPACE
    ));
    render_node(root, &mut out);
    out.push_str("</math>");
    out
}

fn render_node(node: &TreeNode, out: &mut String) {
    match node {
        TreeNode::Row(children) => {
            out.push_str("<mrow>");
            for child in children {
                render_node(child, out);
            }
            out.push_str("</mrow>");
        }
        TreeNode::Identifier(text) => leaf(out, "mi", text),
        TreeNode::Operator(text) => leaf(out, "mo", text),
        TreeNode::Number(text) => leaf(out, "mn", text),
        TreeNode::Text(text) => leaf(out, "mtext", text),
        TreeNode::Frac(num, den) => {
            out.push_str("<mfrac>");
            render_node(num, out);
            render_node(den, out);
            out.push_str("</mfrac>");
        }
        TreeNode::Sqrt(inner) => {
            out.push_str("<msqrt>");
            render_node(inner, out);
            out.push_str("</msqrt>");
        }
        TreeNode::Sub { base, sub } => {
            out.push_str("<msub>");
            render_node(base, out);
            render_node(sub, out);
            out.push_str("</msub>");
        }
        TreeNode::Sup { base, sup } => {
            out.push_str("<msup>");
            render_node(base, out);
            render_node(sup, out);
            out.push_str("</msup>");
        }
        TreeNode::SubSup { base, sub, sup } => {
            out.push_str("<msubsup>");
            render_node(base, out);
            render_node(sub, out);
            render_node(sup, out);
            out.push_str("</msubsup>");
        }
        TreeNode::Table(rows) => {
            out.push_str("<mtable>");
            for row in rows {
                out.push_str("<mtr>");
                for cell in row {
                    out.push_str("<mtd>");
                    render_node(cell, out);
                    out.push_str("</mtd>");
                }
                out.push_str("</mtr>");
            }
            out.push_str("</mtable>");
        }
        TreeNode::Error(message) => {
            out.push_str("<merror>");
            leaf(out, "mtext", message);
            out.push_str("</merror>");
        }
    }
}

fn leaf(out: &mut String, tag: &str, text: &str) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    out.push_str(&escape(text));
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq)]
enum XmlToken {
    Open(String),
    SelfClose(String),
    Close(String),
    Text(String),
}

/// Parse tree markup into a `TreeNode`, failing closed on anything the
/// renderer could not have produced
pub fn parse(input: &str) -> Result<TreeNode, MendError> {
    let tokens = tokenize(input)?;
    let mut pos = 0;
    // optional outer wrapper; everything else must sit inside it
    let root = if matches!(tokens.get(pos), Some(XmlToken::Open(tag)) if tag == "math") {
        pos += 1;
        let children = parse_children(&tokens, &mut pos, "math")?;
        TreeNode::row(children)
    } else {
        let children = parse_siblings(&tokens, &mut pos)?;
        TreeNode::row(children)
    };
    if pos != tokens.len() {
        return Err(MendError::TreeInvariant(
            "content after document root".to_string(),
        ));
    }
    Ok(root)
}

// Children of `parent`, consuming the closing tag.
fn parse_children(
    tokens: &[XmlToken],
    pos: &mut usize,
    parent: &str,
) -> Result<Vec<TreeNode>, MendError> {
    let mut children = Vec::new();
    loop {
        match tokens.get(*pos) {
            Some(XmlToken::Close(tag)) if tag == parent => {
                *pos += 1;
                return Ok(children);
            }
            Some(_) => {
                if let Some(node) = parse_element(tokens, pos)? {
                    children.push(node);
                }
            }
            None => {
                return Err(MendError::TreeInvariant(format!(
                    "unclosed element <{}>",
                    parent
                )))
            }
        }
    }
}

fn parse_siblings(tokens: &[XmlToken], pos: &mut usize) -> Result<Vec<TreeNode>, MendError> {
    let mut nodes = Vec::new();
    while *pos < tokens.len() {
        match &tokens[*pos] {
            XmlToken::Close(tag) => {
                return Err(MendError::TreeInvariant(format!(
                    "unmatched closing tag </{}>",
                    tag
                )))
            }
            _ => {
                if let Some(node) = parse_element(tokens, pos)? {
                    nodes.push(node);
                }
            }
        }
    }
    Ok(nodes)
}

fn parse_element(tokens: &[XmlToken], pos: &mut usize) -> Result<Option<TreeNode>, MendError> {
    match tokens.get(*pos) {
        Some(XmlToken::SelfClose(tag)) if tag == "mspace" => {
            *pos += 1;
            Ok(None)
        }
        Some(XmlToken::Text(text)) => {
            if text.trim().is_empty() {
                *pos += 1;
                Ok(None)
            } else {
                Err(MendError::TreeInvariant(format!(
                    "stray text outside a leaf element: {:?}",
                    text.trim()
                )))
            }
        }
        Some(XmlToken::Open(tag)) => {
            let tag = tag.clone();
            *pos += 1;
            build_element(tokens, pos, &tag).map(Some)
        }
        Some(XmlToken::SelfClose(tag)) => Err(MendError::TreeInvariant(format!(
            "unknown element <{}/>",
            tag
        ))),
        Some(XmlToken::Close(tag)) => Err(MendError::TreeInvariant(format!(
            "unmatched closing tag </{}>",
            tag
        ))),
        None => Err(MendError::TreeInvariant("truncated markup".to_string())),
    }
}

fn build_element(
    tokens: &[XmlToken],
    pos: &mut usize,
    tag: &str,
) -> Result<TreeNode, MendError> {
    match tag {
        "mi" => Ok(TreeNode::Identifier(leaf_text(tokens, pos, tag)?)),
        "mo" => Ok(TreeNode::Operator(leaf_text(tokens, pos, tag)?)),
        "mn" => Ok(TreeNode::Number(leaf_text(tokens, pos, tag)?)),
        "mtext" => Ok(TreeNode::Text(leaf_text(tokens, pos, tag)?)),
        "mrow" | "mstyle" | "semantics" | "mpadded" => {
            let children = parse_children(tokens, pos, tag)?;
            Ok(TreeNode::row(children))
        }
        "msqrt" => {
            let children = parse_children(tokens, pos, tag)?;
            Ok(TreeNode::Sqrt(Box::new(TreeNode::row(children))))
        }
        "mfrac" => {
            let children = fixed_arity(tokens, pos, tag, 2)?;
            let mut it = children.into_iter();
            Ok(TreeNode::Frac(
                Box::new(it.next().ok_or_else(|| arity_error(tag))?),
                Box::new(it.next().ok_or_else(|| arity_error(tag))?),
            ))
        }
        "msub" => {
            let children = fixed_arity(tokens, pos, tag, 2)?;
            let mut it = children.into_iter();
            Ok(TreeNode::Sub {
                base: Box::new(it.next().ok_or_else(|| arity_error(tag))?),
                sub: Box::new(it.next().ok_or_else(|| arity_error(tag))?),
            })
        }
        "msup" => {
            let children = fixed_arity(tokens, pos, tag, 2)?;
            let mut it = children.into_iter();
            Ok(TreeNode::Sup {
                base: Box::new(it.next().ok_or_else(|| arity_error(tag))?),
                sup: Box::new(it.next().ok_or_else(|| arity_error(tag))?),
            })
        }
        "msubsup" => {
            let children = fixed_arity(tokens, pos, tag, 3)?;
            let mut it = children.into_iter();
            Ok(TreeNode::SubSup {
                base: Box::new(it.next().ok_or_else(|| arity_error(tag))?),
                sub: Box::new(it.next().ok_or_else(|| arity_error(tag))?),
                sup: Box::new(it.next().ok_or_else(|| arity_error(tag))?),
            })
        }
        "merror" => {
            let children = parse_children(tokens, pos, tag)?;
            Ok(TreeNode::Error(
                TreeNode::row(children).to_plain_text(),
            ))
        }
        "mtable" => {
            let mut rows = Vec::new();
            loop {
                match tokens.get(*pos) {
                    Some(XmlToken::Close(t)) if t == tag => {
                        *pos += 1;
                        return Ok(TreeNode::Table(rows));
                    }
                    Some(XmlToken::Open(t)) if t == "mtr" => {
                        *pos += 1;
                        rows.push(parse_table_row(tokens, pos)?);
                    }
                    Some(XmlToken::Text(text)) if text.trim().is_empty() => *pos += 1,
                    _ => {
                        return Err(MendError::TreeInvariant(
                            "mtable may only contain mtr rows".to_string(),
                        ))
                    }
                }
            }
        }
        _ => Err(MendError::TreeInvariant(format!(
            "unknown element <{}>",
            tag
        ))),
    }
}

fn parse_table_row(tokens: &[XmlToken], pos: &mut usize) -> Result<Vec<TreeNode>, MendError> {
    let mut cells = Vec::new();
    loop {
        match tokens.get(*pos) {
            Some(XmlToken::Close(t)) if t == "mtr" => {
                *pos += 1;
                return Ok(cells);
            }
            Some(XmlToken::Open(t)) if t == "mtd" => {
                *pos += 1;
                let children = parse_children(tokens, pos, "mtd")?;
                cells.push(TreeNode::row(children));
            }
            Some(XmlToken::Text(text)) if text.trim().is_empty() => *pos += 1,
            _ => {
                return Err(MendError::TreeInvariant(
                    "mtr may only contain mtd cells".to_string(),
                ))
            }
        }
    }
}

fn fixed_arity(
    tokens: &[XmlToken],
    pos: &mut usize,
    tag: &str,
    arity: usize,
) -> Result<Vec<TreeNode>, MendError> {
    let children = parse_children(tokens, pos, tag)?;
    if children.len() != arity {
        return Err(arity_error(tag));
    }
    Ok(children)
}

fn arity_error(tag: &str) -> MendError {
    MendError::TreeInvariant(format!("wrong child count for <{}>", tag))
}

fn leaf_text(tokens: &[XmlToken], pos: &mut usize, tag: &str) -> Result<String, MendError> {
    let mut text = String::new();
    loop {
        match tokens.get(*pos) {
            Some(XmlToken::Text(t)) => {
                text.push_str(t);
                *pos += 1;
            }
            Some(XmlToken::Close(t)) if t == tag => {
                *pos += 1;
                return Ok(text);
            }
            _ => {
                return Err(MendError::TreeInvariant(format!(
                    "<{}> may only contain text",
                    tag
                )))
            }
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<XmlToken>, MendError> {
    let mut tokens = Vec::new();
    let mut rest = input.trim();
    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("<!--") {
            rest = after
                .split_once("-->")
                .ok_or_else(|| MendError::TreeInvariant("unterminated comment".to_string()))?
                .1;
            continue;
        }
        if rest.starts_with("<?") {
            rest = rest
                .split_once("?>")
                .ok_or_else(|| {
                    MendError::TreeInvariant("unterminated processing instruction".to_string())
                })?
                .1;
            continue;
        }
        if let Some(after) = rest.strip_prefix('<') {
            let (body, remainder) = after
                .split_once('>')
                .ok_or_else(|| MendError::TreeInvariant("unterminated tag".to_string()))?;
            tokens.push(tag_token(body)?);
            rest = remainder;
            continue;
        }
        let end = rest.find('<').unwrap_or(rest.len());
        tokens.push(XmlToken::Text(decode_entities(&rest[..end])?));
        rest = &rest[end..];
    }
    Ok(tokens)
}

fn tag_token(body: &str) -> Result<XmlToken, MendError> {
    let body = body.trim();
    if let Some(name) = body.strip_prefix('/') {
        return Ok(XmlToken::Close(local_name(name.trim())));
    }
    let self_closing = body.ends_with('/');
    let body = body.trim_end_matches('/').trim();
    let name = body.split_whitespace().next().unwrap_or_default();
    if name.is_empty() {
        return Err(MendError::TreeInvariant("empty tag".to_string()));
    }
    let name = local_name(name);
    if self_closing {
        Ok(XmlToken::SelfClose(name))
    } else {
        Ok(XmlToken::Open(name))
    }
}

// Prefixed tags like <m:mi> carry the same local element
fn local_name(name: &str) -> String {
    match name.rsplit_once(':') {
        Some((_, local)) => local.to_string(),
        None => name.to_string(),
    }
}

fn decode_entities(text: &str) -> Result<String, MendError> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(idx) = rest.find('&') {
        out.push_str(&rest[..idx]);
        let tail = &rest[idx + 1..];
        let end = tail
            .find(';')
            .ok_or_else(|| MendError::TreeInvariant("unterminated entity".to_string()))?;
        let entity = &tail[..end];
        match entity {
            "amp" => out.push('&'),
            "lt" => out.push('<'),
            "gt" => out.push('>'),
            "quot" => out.push('"'),
            "apos" => out.push('\''),
            "nbsp" => out.push(' '),
            _ => {
                let code = entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .map(|hex| u32::from_str_radix(hex, 16))
                    .or_else(|| entity.strip_prefix('#').map(|dec| dec.parse::<u32>()));
                match code {
                    Some(Ok(code)) => match char::from_u32(code) {
                        Some(c) => out.push(c),
                        None => {
                            return Err(MendError::TreeInvariant(format!(
                                "invalid character reference &{};",
                                entity
                            )))
                        }
                    },
                    _ => {
                        return Err(MendError::TreeInvariant(format!(
                            "unknown entity &{};",
                            entity
                        )))
                    }
                }
            }
        }
        rest = &tail[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Pull the raw text payload out of tree markup that failed to parse
///
/// Used for the recovery path: a corrupted tree still carries its leaf
/// text, which can be re-run through the formula pipeline. Tags are
/// dropped, entities decoded best-effort, whitespace collapsed.
pub fn extract_payload(input: &str) -> String {
    let mut out = String::new();
    let mut in_tag = false;
    for c in input.chars() {
        match c {
            '<' => in_tag = true,
            '>' => {
                in_tag = false;
                out.push(' ');
            }
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    let decoded = decode_entities(&out).unwrap_or(out);
    crate::cleaner::collapse_whitespace(&decoded.replace(['\n', '\t'], " "))
}
