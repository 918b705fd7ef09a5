//! Confidence scoring and escalation orchestration
//!
//! Drives one input through the stage machine: classification, the
//! corruption gate, reconstruction and structural repair when the gate
//! fails, compilation, validation, and at most one escalation to the
//! external rewrite capability. Every run terminates in `Done` with a
//! fully constructed `PipelineResult`; no error crosses the public
//! boundary for well-formed input.

use crate::adapter;
use crate::ast::{SourceKind, Span, TreeNode};
use crate::cleaner;
use crate::config::PipelineConfig;
use crate::gate::{self, CorruptionReport, Violation};
use crate::mathml;
use crate::reconstruct;
use crate::response::PipelineResult;
use crate::rewrite::{EscalationDeadline, SemanticRewrite};
use crate::structure;
use crate::validator;
use std::sync::Arc;

const GATE_WEIGHT: f64 = 0.5;
const COMPILE_BONUS: f64 = 0.3;
const STRUCTURE_BONUS: f64 = 0.2;
const PASS_PENALTY: f64 = 0.05;
const ESCALATION_PENALTY: f64 = 0.2;

/// Stage machine for one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Classified,
    GateChecked,
    Clean,
    Reconstructing,
    Compiled,
    Validated,
    Accepted,
    Escalating,
    Done,
}

/// Repair and validation pipeline
///
/// Stateless per invocation; one configured instance can serve
/// concurrent requests without locking.
pub struct Pipeline {
    config: PipelineConfig,
    rewriter: Option<Arc<dyn SemanticRewrite>>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self::with_config(PipelineConfig::default())
    }

    pub fn with_config(config: PipelineConfig) -> Self {
        Self {
            config,
            rewriter: None,
        }
    }

    /// Attach an external semantic rewrite capability
    pub fn with_rewriter(mut self, rewriter: Arc<dyn SemanticRewrite>) -> Self {
        self.rewriter = Some(rewriter);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Repair and validate formula markup
    pub fn process_formula_text(&self, input: &str) -> PipelineResult {
        let mut log = Vec::new();
        match self.check_contract(input, &mut log) {
            Some(result) => result,
            None => match cleaner::classify(input) {
                SourceKind::Empty => {
                    log.push("empty input".to_string());
                    self.finish(PipelineResult::failed(log, CorruptionReport::new()))
                }
                SourceKind::SemanticTree => {
                    log.push("input classified as semantic tree".to_string());
                    self.run_tree(input, log)
                }
                SourceKind::PlainText => {
                    log.push(
                        "input classified as plain text; handling as formula markup".to_string(),
                    );
                    self.run_formula(input, log)
                }
                SourceKind::FormulaMarkup => self.run_formula(input, log),
            },
        }
    }

    /// Validate and normalize semantic tree markup
    pub fn process_semantic_tree(&self, input: &str) -> PipelineResult {
        let mut log = Vec::new();
        match self.check_contract(input, &mut log) {
            Some(result) => result,
            None => {
                if cleaner::classify(input) == SourceKind::Empty {
                    log.push("empty input".to_string());
                    return self.finish(PipelineResult::failed(log, CorruptionReport::new()));
                }
                self.run_tree(input, log)
            }
        }
    }

    fn check_contract(&self, input: &str, log: &mut Vec<String>) -> Option<PipelineResult> {
        if input.len() > self.config.max_input_bytes {
            log.push(format!(
                "input of {} bytes exceeds the {} byte limit",
                input.len(),
                self.config.max_input_bytes
            ));
            return Some(self.finish(PipelineResult::failed(
                log.clone(),
                CorruptionReport::new(),
            )));
        }
        None
    }

    fn run_formula(&self, input: &str, mut log: Vec<String>) -> PipelineResult {
        let mut stage = Stage::Classified;
        let cleaned = cleaner::clean(input);

        let mut markup = cleaned.clone();
        let mut passes = 0usize;
        let mut extra_violations = CorruptionReport::new();
        let mut compiled: Option<adapter::CompiledTree> = None;
        let mut report = CorruptionReport::new();
        let mut used_escalation = false;
        let mut compile_failure: Option<String> = None;

        while stage != Stage::Done {
            stage = match stage {
                Stage::Classified => Stage::GateChecked,
                Stage::GateChecked => {
                    let pre_report = gate::classify_text(&cleaned, &self.config);
                    for violation in pre_report.iter() {
                        log.push(format!(
                            "gate violation: {} at {}..{}",
                            violation.name, violation.span.start, violation.span.end
                        ));
                    }
                    if pre_report.is_clean() {
                        log.push("gate clean; skipping reconstruction".to_string());
                        Stage::Clean
                    } else {
                        Stage::Reconstructing
                    }
                }
                Stage::Clean => Stage::Compiled,
                Stage::Reconstructing => {
                    let recon = reconstruct::reconstruct(&cleaned, &self.config);
                    passes = recon.passes;
                    for record in &recon.records {
                        log.push(format!(
                            "{}: {:?} -> {:?}",
                            record.stage, record.before, record.after
                        ));
                    }
                    if !recon.converged {
                        log.push(format!(
                            "reconstruction did not converge after {} passes",
                            recon.passes
                        ));
                        extra_violations.push(Violation::new(
                            "non-convergent-reconstruction",
                            Span::new(0, recon.text.len()),
                        ));
                    }

                    let outcome = structure::repair(&recon.text, &self.config);
                    for record in &outcome.records {
                        log.push(format!(
                            "{}: {:?} -> {:?}",
                            record.stage, record.before, record.after
                        ));
                    }
                    extra_violations.merge(outcome.report);
                    markup = outcome.markup;
                    Stage::Compiled
                }
                Stage::Compiled => {
                    match adapter::compile(&markup) {
                        Ok(tree) => {
                            for scrub in &tree.scrubbed {
                                log.push(format!(
                                    "scrubbed escaped command from text node: {:?}",
                                    scrub
                                ));
                            }
                            for cell in &tree.placeholder_cells {
                                log.push(format!("cell replaced with placeholder: {}", cell));
                            }
                            compiled = Some(tree);
                            compile_failure = None;
                            Stage::Validated
                        }
                        Err(err) => {
                            log.push(format!("{}", err));
                            compile_failure = Some(err.to_string());
                            self.next_after_failure(used_escalation)
                        }
                    }
                }
                Stage::Validated => {
                    report = gate::classify_text(&markup, &self.config);
                    report.merge(extra_violations.clone());
                    if let Some(tree) = &compiled {
                        report.merge(validator::check_tree(&tree.root));
                        for scrub in &tree.scrubbed {
                            report.push(Violation::new(
                                "escaped-command-in-text",
                                Span::new(0, scrub.len()),
                            ));
                        }
                    }
                    if report.is_clean() {
                        Stage::Accepted
                    } else {
                        for violation in report.iter() {
                            log.push(format!(
                                "post-repair violation: {}",
                                violation.name
                            ));
                        }
                        self.next_after_failure(used_escalation)
                    }
                }
                Stage::Accepted => Stage::Done,
                Stage::Escalating => {
                    used_escalation = true;
                    match self.escalate(&markup, &mut log) {
                        Some(rewritten) => {
                            markup = rewritten;
                            compiled = None;
                            extra_violations = CorruptionReport::new();
                            Stage::Compiled
                        }
                        None => Stage::Done,
                    }
                }
                Stage::Done => Stage::Done,
            };
        }

        if compiled.is_none() {
            // the run ended on a compile failure; surface what still
            // looks wrong with the markup we were left holding
            report = gate::classify_text(&markup, &self.config);
            report.merge(extra_violations.clone());
        }
        let is_valid = compile_failure.is_none() && compiled.is_some() && report.is_clean();
        let (semantic_tree, human_readable) = match &compiled {
            Some(tree) => (mathml::render(&tree.root), tree.root.to_plain_text()),
            None => (String::new(), markup.clone()),
        };
        let confidence = self.score(
            report.is_clean(),
            compiled.is_some(),
            compiled.as_ref().map(|t| &t.root),
            passes,
            used_escalation,
        );

        self.finish(PipelineResult {
            clean_markup: markup,
            semantic_tree,
            human_readable,
            is_valid,
            confidence,
            corruption: report,
            used_escalation,
            log,
        })
    }

    // A compile or validation failure escalates once when a rewriter is
    // configured; afterwards the run terminates as a failure.
    fn next_after_failure(&self, already_escalated: bool) -> Stage {
        if self.rewriter.is_some() && !already_escalated {
            Stage::Escalating
        } else {
            Stage::Done
        }
    }

    fn escalate(&self, markup: &str, log: &mut Vec<String>) -> Option<String> {
        let rewriter = self.rewriter.as_ref()?;
        log.push("escalating to external semantic rewrite".to_string());
        let deadline = EscalationDeadline::start();
        let outcome = rewriter
            .rewrite(markup, EscalationDeadline::budget(&self.config))
            .and_then(|text| deadline.check(&self.config).map(|_| text));
        match outcome {
            Ok(text) => {
                log.push("escalation produced rewritten markup".to_string());
                Some(cleaner::clean(&text))
            }
            Err(err) => {
                log.push(format!("{}", err));
                None
            }
        }
    }

    fn run_tree(&self, input: &str, mut log: Vec<String>) -> PipelineResult {
        match mathml::parse(input) {
            Ok(root) => {
                let tree_report = gate::classify_tree(&root);
                if tree_report.is_clean() {
                    log.push("tree input passed the gate".to_string());
                    let confidence = self.score(true, true, Some(&root), 0, false);
                    return self.finish(PipelineResult {
                        clean_markup: root.to_markup(),
                        semantic_tree: mathml::render(&root),
                        human_readable: root.to_plain_text(),
                        is_valid: true,
                        confidence,
                        corruption: tree_report,
                        used_escalation: false,
                        log,
                    });
                }
                for violation in tree_report.iter() {
                    log.push(format!("tree gate violation: {}", violation.name));
                }
                log.push("recovering formula payload from corrupted tree".to_string());
                self.recover_from_tree(input, log)
            }
            Err(err) => {
                log.push(format!("{}", err));
                log.push("tree parse failed; recovering formula payload".to_string());
                let mut result = self.recover_from_tree(input, log);
                if !result.is_valid {
                    result.corruption.push(Violation::new(
                        "tree-parse-failure",
                        Span::new(0, input.len()),
                    ));
                }
                self.finish(result)
            }
        }
    }

    // Fail-closed recovery: strip the tree wrapper and run what is left
    // through the formula path.
    fn recover_from_tree(&self, input: &str, mut log: Vec<String>) -> PipelineResult {
        let payload = mathml::extract_payload(input);
        if payload.is_empty() {
            log.push("no recoverable payload in tree input".to_string());
            let mut report = CorruptionReport::new();
            report.push(Violation::new(
                "tree-parse-failure",
                Span::new(0, input.len()),
            ));
            return self.finish(PipelineResult::failed(log, report));
        }
        self.run_formula(&payload, log)
    }

    // Weighted signal sum, clamped to [0, 1]. Every extra repair attempt
    // subtracts; nothing can push the score past what a clean gate and a
    // successful compile provide.
    fn score(
        &self,
        gate_clean: bool,
        compiled: bool,
        tree: Option<&TreeNode>,
        passes: usize,
        used_escalation: bool,
    ) -> f64 {
        let mut score = 0.0;
        if gate_clean {
            score += GATE_WEIGHT;
        }
        if compiled {
            score += COMPILE_BONUS;
        }
        if tree.is_some_and(has_structural_operator) {
            score += STRUCTURE_BONUS;
        }
        score -= PASS_PENALTY * passes as f64;
        if used_escalation {
            score -= ESCALATION_PENALTY;
        }
        score.clamp(0.0, 1.0)
    }

    fn finish(&self, mut result: PipelineResult) -> PipelineResult {
        if result.log.len() > self.config.max_log_entries {
            result.log.truncate(self.config.max_log_entries);
            result.log.push("log truncated".to_string());
        }
        result
    }
}

// Recognizable structure: an operator node or any layout node.
fn has_structural_operator(root: &TreeNode) -> bool {
    let mut found = false;
    root.walk(&mut |node| {
        if matches!(
            node,
            TreeNode::Operator(_)
                | TreeNode::Frac(_, _)
                | TreeNode::Sqrt(_)
                | TreeNode::SubSup { .. }
                | TreeNode::Table(_)
        ) {
            found = true;
        }
    });
    found
}
