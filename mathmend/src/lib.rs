//! # Mathmend Engine
//!
//! **Repair pipeline for noisy mathematical notation**
//!
//! Mathmend takes untrusted recognizer output, decides whether it shows
//! known corruption signatures, repairs it when it does, and emits clean
//! formula markup, a semantic tree, and a human-readable rendering with a
//! confidence score and full diagnostics.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mathmend::Pipeline;
//!
//! let pipeline = Pipeline::new();
//! let result = pipeline.process_formula_text(r"f_r a_c 1 n s_u_m t=0");
//!
//! assert!(result.clean_markup.contains(r"\frac"));
//! println!("{}", result.semantic_tree);
//! ```
//!
//! ## Core Concepts
//!
//! ### Corruption gate
//! Before any rewriting, a pattern-matching classifier hunts known
//! corruption signatures: shredded command fragments, spelled-out
//! operators, unbalanced delimiters, and forbidden tree shapes. A clean
//! verdict skips reconstruction entirely.
//!
//! ### Reconstruction
//! Fixed-point repair passes collapse shredded commands back into
//! canonical tokens, then structural repair rebuilds fractions, operator
//! bounds and delimiter pairs.
//!
//! ### Escalation
//! When local repair cannot produce a valid tree, an optionally injected
//! external rewrite capability gets one timed attempt. Without one, the
//! run terminates as an explicit failure; the pipeline never emits a
//! best-effort malformed artifact.

pub mod adapter;
pub mod ast;
pub mod cleaner;
pub mod compiler;
pub mod config;
pub mod error;
pub mod gate;
pub mod lexicon;
pub mod mathml;
pub mod pipeline;
pub mod reconstruct;
pub mod response;
pub mod rewrite;
pub mod structure;
pub mod validator;

pub use ast::{SourceKind, Span, Token, TreeNode};
pub use config::PipelineConfig;
pub use error::MendError;
pub use gate::{CorruptionReport, Violation};
pub use pipeline::Pipeline;
pub use response::PipelineResult;
pub use rewrite::{NoRewrite, SemanticRewrite};

/// Result type for mathmend operations
pub type MendResult<T> = Result<T, MendError>;

#[cfg(test)]
mod tests;
